use promptlint_source::Span;
use serde::Serialize;

pub(crate) const DELIMITER_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RegionKind {
    Expression,
    Statement,
    Comment,
}

/// A delimited template construct found by the [`Lexer`](crate::Lexer).
///
/// `start..end` covers the delimiters; `inner` is the raw text between
/// them, never re-tokenized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TemplateRegion {
    pub kind: RegionKind,
    pub start: usize,
    pub end: usize,
    pub inner: String,
}

impl TemplateRegion {
    #[must_use]
    pub fn new(kind: RegionKind, start: usize, end: usize, inner: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            inner: inner.into(),
        }
    }

    /// Span of the whole region, delimiters included.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::from_bounds(self.start, self.end)
    }

    /// Span of the raw inner text.
    #[must_use]
    pub fn inner_span(&self) -> Span {
        Span::from_bounds(self.start + DELIMITER_LEN, self.end - DELIMITER_LEN)
    }

    /// The inner text with whitespace-control markers (`-`, `+`) and
    /// surrounding whitespace removed.
    #[must_use]
    pub fn content(&self) -> &str {
        let (from, to) = self.content_bounds();
        &self.inner[from..to]
    }

    /// Span of [`content`](Self::content) within the source.
    #[must_use]
    pub fn content_span(&self) -> Span {
        let (from, to) = self.content_bounds();
        let base = self.start + DELIMITER_LEN;
        Span::from_bounds(base + from, base + to)
    }

    /// Leading keyword of a statement (`if`, `endfor`, `range`, ...).
    #[must_use]
    pub fn keyword(&self) -> Option<&str> {
        if self.kind != RegionKind::Statement {
            return None;
        }
        let word = leading_word(self.content());
        (!word.is_empty()).then_some(word)
    }

    /// Span of [`keyword`](Self::keyword) within the source.
    #[must_use]
    pub fn keyword_span(&self) -> Option<Span> {
        let keyword = self.keyword()?;
        let start = self.content_span().start_usize();
        Some(Span::from_parts(start, keyword.len()))
    }

    fn content_bounds(&self) -> (usize, usize) {
        let inner = self.inner.as_str();
        let mut from = 0;
        let mut to = inner.len();

        if inner.starts_with(['-', '+']) {
            from = 1;
        }
        if to > from && inner[from..].ends_with(['-', '+']) {
            to -= 1;
        }

        let trimmed = &inner[from..to];
        let leading = trimmed.len() - trimmed.trim_start().len();
        let body = trimmed.trim();
        from += leading;
        (from, from + body.len())
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(text.len());
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_of_an_expression() {
        let region = TemplateRegion::new(RegionKind::Expression, 6, 16, " name ");
        assert_eq!(region.span(), Span::new(6, 10));
        assert_eq!(region.inner_span(), Span::new(8, 6));
        assert_eq!(region.content(), "name");
        assert_eq!(region.content_span(), Span::new(9, 4));
    }

    #[test]
    fn whitespace_control_markers_are_not_content() {
        let region = TemplateRegion::new(RegionKind::Statement, 0, 12, "- if a -");
        assert_eq!(region.content(), "if a");
        assert_eq!(region.content_span(), Span::new(4, 4));
        assert_eq!(region.keyword(), Some("if"));
        assert_eq!(region.keyword_span(), Some(Span::new(4, 2)));
    }

    #[test]
    fn empty_inner() {
        let region = TemplateRegion::new(RegionKind::Expression, 0, 5, " ");
        assert_eq!(region.content(), "");
        assert_eq!(region.content_span().length(), 0);
    }

    #[test]
    fn keyword_only_for_statements() {
        let expression = TemplateRegion::new(RegionKind::Expression, 0, 8, " if ");
        assert_eq!(expression.keyword(), None);

        let statement = TemplateRegion::new(RegionKind::Statement, 0, 12, " endfor ");
        assert_eq!(statement.keyword(), Some("endfor"));
    }

    #[test]
    fn bare_marker_is_empty() {
        let region = TemplateRegion::new(RegionKind::Expression, 0, 5, "-");
        assert_eq!(region.content(), "");
    }
}
