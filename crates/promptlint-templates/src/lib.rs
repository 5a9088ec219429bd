//! Template-expression analysis for prompt text.
//!
//! Prompts embed jinja2 (or go-template) regions in free-form text. This
//! crate finds those regions, checks them, and reports the result as plain
//! spans and typed errors for an editor or a command line to present.
//!
//! ## Pipeline
//!
//! 1. **Lexing**: [`tokenize`] yields the expression, statement and comment
//!    regions of a text, in order.
//! 2. **Validation**: each region is checked for delimiter balance
//!    ([`is_balanced`]), block keyword pairing ([`check_pairs`]), filter
//!    names ([`is_known_filter`]) and its root variable
//!    ([`resolve_root_variable`], [`VariableResolver`]). Delimiters left
//!    outside every region are reported from [`unmatched_delimiters`].
//! 3. **Annotation**: [`analyze`] collects verdicts and [`TemplateError`]s;
//!    [`annotate`] returns only the sorted, non-overlapping spans.
//!
//! The multimodal transform ([`split`], [`join`]) is independent of the
//! pipeline and works on raw message text.
//!
//! ## Example
//!
//! ```
//! use promptlint_templates::{annotate, AnalyzeOptions, SpanClass, VariableDef};
//!
//! let variables = [VariableDef::new("name")];
//! let spans = annotate("Hello {{ name }}", &variables, AnalyzeOptions::default());
//!
//! assert_eq!(spans.len(), 1);
//! assert_eq!((spans[0].from, spans[0].to), (9, 13));
//! assert_eq!(spans[0].class, SpanClass::Valid);
//! ```

mod annotate;
mod balance;
mod error;
mod filters;
mod lexer;
pub mod multimodal;
mod pairs;
pub mod prompt;
mod quotes;
mod tokens;
mod variables;

pub use annotate::analyze;
pub use annotate::annotate;
pub use annotate::AnalyzeOptions;
pub use annotate::Analysis;
pub use annotate::AnnotatedSpan;
pub use annotate::SpanAnnotator;
pub use annotate::SpanClass;
pub use annotate::ValidationVerdict;
pub use balance::is_balanced;
pub use balance::unmatched_delimiters;
pub use error::TemplateError;
pub use filters::filters;
pub use filters::is_known_filter;
pub use filters::Filter;
pub use filters::KNOWN_FILTERS;
pub use lexer::tokenize;
pub use lexer::Lexer;
pub use multimodal::join;
pub use multimodal::split;
pub use multimodal::ContentPart;
pub use multimodal::ContentType;
pub use pairs::check_pairs;
pub use pairs::pairs_balanced;
pub use pairs::PairIssue;
pub use pairs::BLOCK_PAIRS;
pub use promptlint_conf::TemplateSyntax;
pub use promptlint_conf::VariableDialect;
pub use tokens::RegionKind;
pub use tokens::TemplateRegion;
pub use variables::is_identifier;
pub use variables::resolve_root_variable;
pub use variables::VariableDef;
pub use variables::VariableResolver;
