use promptlint_conf::Settings;
use promptlint_conf::TemplateSyntax;
use promptlint_conf::VariableDialect;
use promptlint_conf::DEFAULT_MAX_VARIABLE_LEN;
use promptlint_source::Span;
use serde::Serialize;

use crate::balance::is_balanced;
use crate::balance::unmatched_delimiters;
use crate::error::TemplateError;
use crate::filters::filters;
use crate::filters::is_known_filter;
use crate::lexer::tokenize;
use crate::lexer::EXPRESSION_END;
use crate::lexer::EXPRESSION_START;
use crate::pairs::check_pairs;
use crate::pairs::PairIssue;
use crate::quotes::before_unquoted;
use crate::tokens::is_identifier_char;
use crate::tokens::RegionKind;
use crate::tokens::TemplateRegion;
use crate::tokens::DELIMITER_LEN;
use crate::variables::resolve_root_variable;
use crate::variables::VariableDef;
use crate::variables::VariableResolver;

/// Inputs that shape an analysis besides the text and the variables.
///
/// The fields are independent: `highlight` only controls whether spans are
/// produced, never which errors are found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalyzeOptions {
    pub syntax: TemplateSyntax,
    pub dialect: VariableDialect,
    pub highlight: bool,
    pub max_variable_len: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            syntax: TemplateSyntax::default(),
            dialect: VariableDialect::default(),
            highlight: true,
            max_variable_len: DEFAULT_MAX_VARIABLE_LEN,
        }
    }
}

impl AnalyzeOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            syntax: settings.syntax(),
            dialect: settings.dialect(),
            highlight: settings.highlight(),
            max_variable_len: settings.max_variable_len(),
        }
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: TemplateSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_dialect(mut self, dialect: VariableDialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanClass {
    Valid,
    Invalid,
}

/// A byte range of the analyzed text and how to present it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AnnotatedSpan {
    pub from: usize,
    pub to: usize,
    pub class: SpanClass,
}

impl AnnotatedSpan {
    fn new(span: Span, class: SpanClass) -> Self {
        Self {
            from: span.start_usize(),
            to: span.end_usize(),
            class,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationVerdict {
    fn from_errors(errors: &[TemplateError]) -> Self {
        Self {
            valid: errors.is_empty(),
            reason: errors.first().map(ToString::to_string),
        }
    }
}

/// Everything one pass over a text produced. `verdicts[i]` judges
/// `regions[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub regions: Vec<TemplateRegion>,
    pub verdicts: Vec<ValidationVerdict>,
    pub spans: Vec<AnnotatedSpan>,
    pub errors: Vec<TemplateError>,
}

impl Analysis {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the validators over every region of a text and turns their verdicts
/// into spans.
pub struct SpanAnnotator<'a> {
    text: &'a str,
    options: AnalyzeOptions,
    resolver: VariableResolver<'a>,
    keys: Vec<&'a str>,
}

impl<'a> SpanAnnotator<'a> {
    #[must_use]
    pub fn new(text: &'a str, variables: &'a [VariableDef], options: AnalyzeOptions) -> Self {
        let resolver = VariableResolver::new(variables, options.dialect, options.max_variable_len);
        let keys = resolver
            .declared_keys()
            .into_iter()
            .filter(|key| !key.is_empty())
            .collect();
        Self {
            text,
            options,
            resolver,
            keys,
        }
    }

    #[must_use]
    pub fn analyze(self) -> Analysis {
        let regions = tokenize(self.text, self.options.syntax);
        let mut pair_issues = check_pairs(&regions, self.options.syntax).into_iter().peekable();

        let mut verdicts = Vec::with_capacity(regions.len());
        let mut spans = Vec::new();
        let mut errors = Vec::new();

        for (index, region) in regions.iter().enumerate() {
            let region_errors = match region.kind {
                RegionKind::Comment => Vec::new(),
                RegionKind::Statement => {
                    let mut found = self.check_balance(region);
                    while let Some(issue) = pair_issues.next_if(|issue| issue.region() == index) {
                        found.push(pair_error(issue));
                    }
                    if found.is_empty() {
                        spans.extend(self.variable_spans(region));
                    } else {
                        spans.push(AnnotatedSpan::new(visible_span(region), SpanClass::Invalid));
                    }
                    found
                }
                RegionKind::Expression => {
                    let found = self.check_expression(region);
                    let class = if found.is_empty() {
                        SpanClass::Valid
                    } else {
                        SpanClass::Invalid
                    };
                    spans.push(AnnotatedSpan::new(visible_span(region), class));
                    found
                }
            };

            tracing::trace!(
                kind = ?region.kind,
                start = region.start,
                end = region.end,
                errors = region_errors.len(),
                "checked template region"
            );

            verdicts.push(ValidationVerdict::from_errors(&region_errors));
            errors.extend(region_errors);
        }

        let stray = self.stray_delimiters(&regions);
        if !stray.is_empty() {
            spans.extend(
                stray
                    .iter()
                    .map(|error| AnnotatedSpan::new(error.span(), SpanClass::Invalid)),
            );
            errors.extend(stray);
            errors.sort_by_key(|error| error.span().start());
        }

        if self.options.highlight {
            spans.sort_by_key(|span| (span.from, span.to));
        } else {
            spans.clear();
        }

        tracing::debug!(
            regions = regions.len(),
            errors = errors.len(),
            spans = spans.len(),
            syntax = %self.options.syntax,
            "analyzed template text"
        );

        Analysis {
            regions,
            verdicts,
            spans,
            errors,
        }
    }

    /// Delimiters outside every region: openers the tokenizer never saw
    /// closed and closers with nothing to close. Raw block bodies are
    /// literal text.
    fn stray_delimiters(&self, regions: &[TemplateRegion]) -> Vec<TemplateError> {
        let mut errors = Vec::new();
        let mut gap_start = 0;
        let mut literal = false;

        for region in regions.iter().map(Some).chain(std::iter::once(None)) {
            let gap_end = region.map_or(self.text.len(), |region| region.start);
            if !literal {
                self.check_gap(gap_start, gap_end, &mut errors);
            }

            if let Some(region) = region {
                gap_start = region.end;
                literal = self.options.syntax == TemplateSyntax::Jinja2
                    && region.keyword() == Some("raw");
            }
        }

        errors
    }

    fn check_gap(&self, from: usize, to: usize, errors: &mut Vec<TemplateError>) {
        let gap = &self.text[from..to];

        for at in unmatched_delimiters(gap) {
            let delimiter = &gap[at..at + DELIMITER_LEN];
            // Go templates only delimit with braces.
            if self.options.syntax == TemplateSyntax::GoTemplate
                && delimiter != EXPRESSION_START
                && delimiter != EXPRESSION_END
            {
                continue;
            }
            errors.push(TemplateError::UnbalancedDelimiters {
                span: Span::from_parts(at, DELIMITER_LEN).offset_by(from),
            });
        }
    }

    fn check_balance(&self, region: &TemplateRegion) -> Vec<TemplateError> {
        if is_balanced(&self.text[region.start..region.end]) {
            Vec::new()
        } else {
            vec![TemplateError::UnbalancedDelimiters {
                span: region.span(),
            }]
        }
    }

    fn check_expression(&self, region: &TemplateRegion) -> Vec<TemplateError> {
        let mut errors = self.check_balance(region);
        let content = region.content();

        if content.is_empty() {
            errors.push(TemplateError::EmptyExpression {
                span: region.span(),
            });
            return errors;
        }

        let content_start = region.content_span().start_usize();

        if self.options.syntax == TemplateSyntax::Jinja2 {
            for filter in filters(content, content_start) {
                if filter.is_empty() {
                    errors.push(TemplateError::EmptyFilter { span: filter.span });
                } else if !is_known_filter(&filter.name) {
                    errors.push(TemplateError::UnknownFilter {
                        name: filter.name,
                        span: filter.span,
                    });
                }
            }
        }

        let head = before_unquoted(content, '|');
        let root = match self.options.syntax {
            TemplateSyntax::Jinja2 => Some((resolve_root_variable(head), content_start)),
            TemplateSyntax::GoTemplate => go_field_root(head).map(|root| (root, content_start + 1)),
        };

        if let Some((name, start)) = root {
            if let Some(error) = self.check_variable(name, start, region) {
                errors.push(error);
            }
        }

        errors
    }

    fn check_variable(
        &self,
        name: &str,
        start: usize,
        region: &TemplateRegion,
    ) -> Option<TemplateError> {
        if self.resolver.accepts(name) {
            return None;
        }

        let span = if name.is_empty() {
            region.content_span()
        } else {
            Span::from_parts(start, name.len())
        };

        Some(match self.options.dialect {
            VariableDialect::VariableBound => TemplateError::UndeclaredVariable {
                name: name.to_string(),
                span,
            },
            VariableDialect::Normal => TemplateError::InvalidVariableName {
                name: name.to_string(),
                span,
            },
        })
    }

    /// Valid spans over whole-word occurrences of declared keys in a
    /// statement, earliest first, never overlapping.
    fn variable_spans(&self, region: &TemplateRegion) -> Vec<AnnotatedSpan> {
        let base = region.start + DELIMITER_LEN;
        let inner = region.inner.as_str();

        let mut found: Vec<Span> = self
            .keys
            .iter()
            .flat_map(|key| {
                inner
                    .match_indices(key)
                    .filter(move |(at, _)| is_whole_word(inner, *at, key.len()))
                    .map(move |(at, _)| Span::from_parts(at, key.len()).offset_by(base))
            })
            .collect();

        // Same start: the longer key wins.
        found.sort_by(|a, b| a.start().cmp(&b.start()).then(b.length().cmp(&a.length())));

        let mut kept: Vec<Span> = Vec::with_capacity(found.len());
        for span in found {
            if kept.last().is_some_and(|last| last.overlaps(span)) {
                continue;
            }
            kept.push(span);
        }

        kept.into_iter()
            .map(|span| AnnotatedSpan::new(span, SpanClass::Valid))
            .collect()
    }
}

/// The trimmed inner text, or the whole region when that is empty.
fn visible_span(region: &TemplateRegion) -> Span {
    let content = region.content_span();
    if content.is_empty() {
        region.span()
    } else {
        content
    }
}

fn is_whole_word(text: &str, at: usize, len: usize) -> bool {
    let before = text[..at].chars().next_back();
    let after = text[at + len..].chars().next();
    !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char)
}

/// The field a go-template pipeline head reads from the root context:
/// `User` for `.User.Name`. Bare `.`, `$` variables, function calls and
/// literals reference no declared variable.
fn go_field_root(head: &str) -> Option<&str> {
    let first = head.split_whitespace().next()?;
    if first == "." || first.starts_with('$') {
        return None;
    }
    first
        .strip_prefix('.')
        .map(resolve_root_variable)
}

fn pair_error(issue: PairIssue) -> TemplateError {
    match issue {
        PairIssue::Unclosed {
            tag,
            span,
            closed_by,
            ..
        } => TemplateError::UnclosedBlock {
            tag,
            span,
            closed_by,
        },
        PairIssue::UnexpectedEnd { tag, span, .. } => TemplateError::UnexpectedEndTag { tag, span },
    }
}

/// Analyze `text`: regions, a verdict per region, spans and typed errors.
#[must_use]
pub fn analyze(text: &str, variables: &[VariableDef], options: AnalyzeOptions) -> Analysis {
    SpanAnnotator::new(text, variables, options).analyze()
}

/// Sorted, non-overlapping spans for `text`; empty when highlighting is off.
#[must_use]
pub fn annotate(text: &str, variables: &[VariableDef], options: AnalyzeOptions) -> Vec<AnnotatedSpan> {
    if !options.highlight {
        return Vec::new();
    }
    analyze(text, variables, options).spans
}
