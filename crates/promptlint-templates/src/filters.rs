use promptlint_source::Span;
use serde::Serialize;

use crate::quotes::unquoted_positions;
use crate::tokens::leading_word;

/// Built-in jinja2 filters, sorted.
pub const KNOWN_FILTERS: &[&str] = &[
    "abs",
    "attr",
    "batch",
    "capitalize",
    "center",
    "count",
    "d",
    "default",
    "dictsort",
    "e",
    "escape",
    "filesizeformat",
    "first",
    "float",
    "forceescape",
    "format",
    "groupby",
    "indent",
    "int",
    "items",
    "join",
    "last",
    "length",
    "list",
    "lower",
    "map",
    "max",
    "min",
    "pprint",
    "random",
    "reject",
    "rejectattr",
    "replace",
    "reverse",
    "round",
    "safe",
    "select",
    "selectattr",
    "slice",
    "sort",
    "string",
    "striptags",
    "sum",
    "title",
    "tojson",
    "trim",
    "truncate",
    "unique",
    "upper",
    "urlencode",
    "urlize",
    "wordcount",
    "wordwrap",
    "xmlattr",
];

#[must_use]
pub fn is_known_filter(name: &str) -> bool {
    KNOWN_FILTERS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}

/// One `|name` application inside an expression.
///
/// `name` is empty for a bare pipe; its span then covers the pipe itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Filter {
    pub name: String,
    pub span: Span,
}

impl Filter {
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Split an expression on unquoted `|` into `(segment, offset)` pairs.
/// The first segment is the filtered value itself.
pub(crate) fn split_variable_expression(content: &str) -> Vec<(&str, usize)> {
    let mut segments = Vec::new();
    let mut start = 0;

    for idx in unquoted_positions(content, '|') {
        segments.push((&content[start..idx], start));
        start = idx + 1;
    }

    segments.push((&content[start..], start));
    segments
}

/// Filters applied in `content`, with spans shifted by `base` (the source
/// offset of `content`).
#[must_use]
pub fn filters(content: &str, base: usize) -> Vec<Filter> {
    split_variable_expression(content)
        .into_iter()
        .skip(1)
        .map(|(segment, offset)| {
            let leading = segment.len() - segment.trim_start().len();
            let name = leading_word(segment.trim_start());

            if name.is_empty() {
                let pipe = base + offset - 1;
                Filter::new("", Span::from_parts(pipe, 1))
            } else {
                Filter::new(name, Span::from_parts(offset + leading, name.len()).offset_by(base))
            }
        })
        .collect()
}
