use crate::Span;

/// A zero-based line and column position within a text document.
///
/// Columns count UTF-8 bytes from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    line: u32,
    column: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }
}

/// Byte offsets of every line start in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    length: u32,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut pos: u32 = 0;

        for c in text.chars() {
            pos += u32::try_from(c.len_utf8()).unwrap_or(0);
            if c == '\n' {
                line_starts.push(pos);
            }
        }

        Self {
            line_starts,
            length: pos,
        }
    }

    /// Convert a byte offset to a line/column pair, clamping past-the-end
    /// offsets to the end of the document.
    #[must_use]
    pub fn to_line_col(&self, offset: u32) -> LineCol {
        let offset = offset.min(self.length);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        LineCol::new(u32::try_from(line).unwrap_or(u32::MAX), column)
    }

    /// Start and end positions of a span.
    #[must_use]
    pub fn span_to_line_col(&self, span: Span) -> (LineCol, LineCol) {
        (self.to_line_col(span.start()), self.to_line_col(span.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let index = LineIndex::new("Hello {{ name }}");
        assert_eq!(index.to_line_col(9), LineCol::new(0, 9));
    }

    #[test]
    fn multiple_lines() {
        let index = LineIndex::new("{% if a %}\nx\n{% endif %}");
        assert_eq!(index.to_line_col(11), LineCol::new(1, 0));
        assert_eq!(index.to_line_col(13), LineCol::new(2, 0));
        assert_eq!(index.to_line_col(16), LineCol::new(2, 3));
    }

    #[test]
    fn multibyte_columns_count_bytes() {
        let index = LineIndex::new("a\nbé{{ x }}");
        assert_eq!(index.to_line_col(5), LineCol::new(1, 3));
    }

    #[test]
    fn clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.to_line_col(40), LineCol::new(0, 2));
    }

    #[test]
    fn span_positions() {
        let index = LineIndex::new("one\n{{ two }}");
        let (start, end) = index.span_to_line_col(Span::new(4, 9));
        assert_eq!(start, LineCol::new(1, 0));
        assert_eq!(end, LineCol::new(1, 9));
    }
}
