use promptlint_conf::TemplateSyntax;
use promptlint_source::Span;
use serde::Serialize;

use crate::lexer::tokenize;
use crate::tokens::TemplateRegion;

/// Block keywords and the keyword that closes each of them.
pub const BLOCK_PAIRS: &[(&str, &str)] = &[
    ("if", "endif"),
    ("for", "endfor"),
    ("set", "endset"),
    ("block", "endblock"),
    ("macro", "endmacro"),
    ("call", "endcall"),
    ("filter", "endfilter"),
    ("with", "endwith"),
    ("autoescape", "endautoescape"),
    ("raw", "endraw"),
];

/// Go-template actions that open a block closed by `{{ end }}`.
const GO_BLOCK_OPENERS: &[&str] = &["if", "range", "with", "define", "block"];
const GO_BLOCK_CLOSER: &str = "end";

/// A control-structure problem, attributed to the statement region it was
/// found in. `region` indexes the slice passed to [`check_pairs`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PairIssue {
    /// `closed_by` is the keyword of an outer block's closer that ended this
    /// block implicitly, `None` when the text simply ran out.
    Unclosed {
        tag: String,
        region: usize,
        span: Span,
        closed_by: Option<Span>,
    },
    UnexpectedEnd { tag: String, region: usize, span: Span },
}

impl PairIssue {
    #[must_use]
    pub fn region(&self) -> usize {
        match self {
            Self::Unclosed { region, .. } | Self::UnexpectedEnd { region, .. } => *region,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenBlock<'a> {
    tag: &'a str,
    region: usize,
    span: Span,
}

struct PairValidator<'a> {
    syntax: TemplateSyntax,
    stack: Vec<OpenBlock<'a>>,
    issues: Vec<PairIssue>,
}

impl<'a> PairValidator<'a> {
    fn new(syntax: TemplateSyntax) -> Self {
        Self {
            syntax,
            stack: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn validate(mut self, regions: &'a [TemplateRegion]) -> Vec<PairIssue> {
        for (index, region) in regions.iter().enumerate() {
            let (Some(keyword), Some(span)) = (region.keyword(), region.keyword_span()) else {
                continue;
            };

            let block = OpenBlock {
                tag: keyword,
                region: index,
                span,
            };

            if self.is_opener(keyword) {
                self.stack.push(block);
            } else if let Some(opener) = self.opener_for(keyword) {
                self.handle_closer(opener, block);
            }
        }

        while let Some(unclosed) = self.stack.pop() {
            self.issues.push(PairIssue::Unclosed {
                tag: unclosed.tag.to_string(),
                region: unclosed.region,
                span: unclosed.span,
                closed_by: None,
            });
        }

        self.issues.sort_by_key(PairIssue::region);
        self.issues
    }

    fn is_opener(&self, keyword: &str) -> bool {
        match self.syntax {
            TemplateSyntax::Jinja2 => BLOCK_PAIRS.iter().any(|(open, _)| *open == keyword),
            TemplateSyntax::GoTemplate => GO_BLOCK_OPENERS.contains(&keyword),
        }
    }

    /// The opener a closing keyword expects, `None` if it closes nothing.
    /// Go's `end` closes any block, reported as the empty tag.
    fn opener_for(&self, keyword: &str) -> Option<&'static str> {
        match self.syntax {
            TemplateSyntax::Jinja2 => BLOCK_PAIRS
                .iter()
                .find(|(_, close)| *close == keyword)
                .map(|(open, _)| *open),
            TemplateSyntax::GoTemplate => (keyword == GO_BLOCK_CLOSER).then_some(""),
        }
    }

    fn handle_closer(&mut self, opener: &str, closer: OpenBlock<'a>) {
        let found = self
            .stack
            .iter()
            .rposition(|open| opener.is_empty() || open.tag == opener);

        let Some(index) = found else {
            self.issues.push(PairIssue::UnexpectedEnd {
                tag: closer.tag.to_string(),
                region: closer.region,
                span: closer.span,
            });
            return;
        };

        // Everything opened after the match was never closed.
        while self.stack.len() > index + 1 {
            if let Some(unclosed) = self.stack.pop() {
                self.issues.push(PairIssue::Unclosed {
                    tag: unclosed.tag.to_string(),
                    region: unclosed.region,
                    span: unclosed.span,
                    closed_by: Some(closer.span),
                });
            }
        }
        self.stack.pop();
    }
}

/// Match block keywords against their closers across `regions`.
#[must_use]
pub fn check_pairs(regions: &[TemplateRegion], syntax: TemplateSyntax) -> Vec<PairIssue> {
    PairValidator::new(syntax).validate(regions)
}

/// Whether every block keyword in the jinja statements of `text` is closed
/// by its own end keyword, in nesting order.
#[must_use]
pub fn pairs_balanced(text: &str) -> bool {
    check_pairs(&tokenize(text, TemplateSyntax::Jinja2), TemplateSyntax::Jinja2).is_empty()
}
