use crate::lexer::EXPRESSION_END;
use crate::lexer::EXPRESSION_START;
use crate::lexer::STATEMENT_END;
use crate::lexer::STATEMENT_START;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Delimiter {
    Expression,
    Statement,
}

/// Whether every `{{`/`{%` in `text` is closed by its own `}}`/`%}`, in
/// nesting order.
///
/// Crossed regions such as `{{ {% }} %}` fail even though each delimiter
/// kind is numerically balanced. Text with no delimiters is balanced.
#[must_use]
pub fn is_balanced(text: &str) -> bool {
    unmatched_delimiters(text).is_empty()
}

/// Byte offsets of the delimiters in `text` that close nothing or are never
/// closed, in ascending order.
///
/// A single left-to-right pass with a stack: openers push, and a closer pops
/// down to the nearest opener of its own kind. Openers popped past on the way
/// are unmatched, as is a closer with no such opener and every opener left
/// at the end.
#[must_use]
pub fn unmatched_delimiters(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<(Delimiter, usize)> = Vec::new();
    let mut unmatched = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        let pair = &bytes[i..i + 2];
        let token = if pair == EXPRESSION_START.as_bytes() {
            Some((Delimiter::Expression, true))
        } else if pair == STATEMENT_START.as_bytes() {
            Some((Delimiter::Statement, true))
        } else if pair == EXPRESSION_END.as_bytes() {
            Some((Delimiter::Expression, false))
        } else if pair == STATEMENT_END.as_bytes() {
            Some((Delimiter::Statement, false))
        } else {
            None
        };

        let Some((kind, opens)) = token else {
            i += 1;
            continue;
        };

        if opens {
            stack.push((kind, i));
        } else if let Some(depth) = stack.iter().rposition(|(open, _)| *open == kind) {
            unmatched.extend(stack.drain(depth + 1..).map(|(_, at)| at));
            stack.pop();
        } else {
            unmatched.push(i);
        }

        i += 2;
    }

    unmatched.extend(stack.into_iter().map(|(_, at)| at));
    unmatched.sort_unstable();
    unmatched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delimiters_is_balanced() {
        assert!(is_balanced(""));
        assert!(is_balanced("plain prompt text with { single } braces"));
    }

    #[test]
    fn matched_regions() {
        assert!(is_balanced("Hello {{ name }}"));
        assert!(is_balanced("{% if a %}{{ a }}{% endif %}"));
    }

    #[test]
    fn count_mismatch() {
        assert!(!is_balanced("{{ name"));
        assert!(!is_balanced("name }}"));
        assert!(!is_balanced("{{ a }} }}"));
        assert!(!is_balanced("{{ {{ a }}"));
        assert!(!is_balanced("{% if a"));
    }

    #[test]
    fn crossed_regions_rejected() {
        assert!(!is_balanced("{{ {% }} %}"));
        assert!(!is_balanced("{% a }}"));
    }

    #[test]
    fn nested_in_order_is_balanced() {
        assert!(is_balanced("{{ {% %} }}"));
    }

    #[test]
    fn multibyte_text() {
        assert!(is_balanced("é{{ ü }}ß"));
        assert!(!is_balanced("é{{ ü ß"));
    }

    #[test]
    fn unmatched_offsets() {
        assert!(unmatched_delimiters("Hello {{ name }}").is_empty());
        assert_eq!(unmatched_delimiters("Hello {{ name }} and {{ oops"), vec![21]);
        assert_eq!(unmatched_delimiters("a }} b"), vec![2]);
        assert_eq!(unmatched_delimiters("{{ {% }} %}"), vec![3, 9]);
        assert_eq!(unmatched_delimiters("{% a }}"), vec![0, 5]);
    }

    #[test]
    fn triple_brace_steps_by_pair() {
        // `{{{` is one opener followed by a literal brace
        assert!(is_balanced("{{{ a }}"));
    }
}
