use promptlint_conf::TemplateSyntax;

use crate::tokens::leading_word;
use crate::tokens::RegionKind;
use crate::tokens::TemplateRegion;
use crate::tokens::DELIMITER_LEN;

pub(crate) const STATEMENT_START: &str = "{%";
pub(crate) const STATEMENT_END: &str = "%}";
pub(crate) const EXPRESSION_START: &str = "{{";
pub(crate) const EXPRESSION_END: &str = "}}";
pub(crate) const COMMENT_START: &str = "{#";
pub(crate) const COMMENT_END: &str = "#}";

const GO_COMMENT_START: &str = "/*";
const GO_COMMENT_END: &str = "*/";

/// Actions that make a go-template `{{ ... }}` a statement rather than an
/// expression.
pub(crate) const GO_KEYWORDS: &[&str] = &[
    "block", "break", "continue", "define", "else", "end", "if", "range", "template", "with",
];

/// Scans prompt text for template regions.
///
/// Unterminated openers produce no region; scanning resumes right after
/// them, so a later well-formed region is still found.
pub struct Lexer<'a> {
    source: &'a str,
    syntax: TemplateSyntax,
    current: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str, syntax: TemplateSyntax) -> Self {
        Lexer {
            source,
            syntax,
            current: 0,
        }
    }

    #[must_use]
    pub fn tokenize(mut self) -> Vec<TemplateRegion> {
        let mut regions = Vec::new();

        while let Some((start, kind)) = self.next_opener() {
            let region = match self.syntax {
                TemplateSyntax::Jinja2 => self.lex_jinja(start, kind),
                TemplateSyntax::GoTemplate => self.lex_go(start),
            };

            let Some(region) = region else {
                tracing::trace!(offset = start, "unterminated template delimiter");
                self.current = start + DELIMITER_LEN;
                continue;
            };

            self.current = region.end;
            let is_raw = self.syntax == TemplateSyntax::Jinja2 && region.keyword() == Some("raw");
            regions.push(region);

            if is_raw {
                self.skip_raw();
            }
        }

        regions
    }

    /// Position and kind of the next opening delimiter at or after `current`.
    fn next_opener(&self) -> Option<(usize, RegionKind)> {
        let mut offset = self.current;

        while let Some(found) = self.source.get(offset..)?.find('{') {
            let at = offset + found;
            let rest = &self.source[at..];

            let kind = if rest.starts_with(EXPRESSION_START) {
                Some(RegionKind::Expression)
            } else if self.syntax == TemplateSyntax::Jinja2 && rest.starts_with(STATEMENT_START) {
                Some(RegionKind::Statement)
            } else if self.syntax == TemplateSyntax::Jinja2 && rest.starts_with(COMMENT_START) {
                Some(RegionKind::Comment)
            } else {
                None
            };

            if let Some(kind) = kind {
                return Some((at, kind));
            }
            offset = at + 1;
        }

        None
    }

    fn lex_jinja(&self, start: usize, kind: RegionKind) -> Option<TemplateRegion> {
        let end_delimiter = match kind {
            RegionKind::Expression => EXPRESSION_END,
            RegionKind::Statement => STATEMENT_END,
            RegionKind::Comment => COMMENT_END,
        };
        self.lex_until(start, kind, end_delimiter)
    }

    fn lex_go(&self, start: usize) -> Option<TemplateRegion> {
        if let Some(comment) = self.lex_go_comment(start) {
            return Some(comment);
        }

        let mut region = self.lex_until(start, RegionKind::Expression, EXPRESSION_END)?;
        if GO_KEYWORDS.contains(&leading_word(region.content())) {
            region.kind = RegionKind::Statement;
        }
        Some(region)
    }

    /// `{{/* ... */}}`, optionally with `-` trim markers around the comment.
    fn lex_go_comment(&self, start: usize) -> Option<TemplateRegion> {
        let body_start = start + DELIMITER_LEN;
        let body = &self.source[body_start..];
        let opened = body
            .strip_prefix('-')
            .map_or(body, str::trim_start)
            .strip_prefix(GO_COMMENT_START)?;

        let close = opened.find(GO_COMMENT_END)?;
        let after = &opened[close + GO_COMMENT_END.len()..];
        let tail = after.trim_start();
        let tail = tail.strip_prefix('-').unwrap_or(tail);
        let tail = tail.strip_prefix(EXPRESSION_END)?;

        let end = self.source.len() - tail.len();
        let inner = &self.source[body_start..end - DELIMITER_LEN];
        Some(TemplateRegion::new(RegionKind::Comment, start, end, inner))
    }

    fn lex_until(&self, start: usize, kind: RegionKind, end_delimiter: &str) -> Option<TemplateRegion> {
        let body_start = start + DELIMITER_LEN;
        let close = self.source[body_start..].find(end_delimiter)?;
        let inner = &self.source[body_start..body_start + close];
        let end = body_start + close + end_delimiter.len();
        Some(TemplateRegion::new(kind, start, end, inner))
    }

    /// Move past the literal body of a `{% raw %}` block, stopping at the
    /// matching `{% endraw %}` so it is lexed as a normal statement.
    fn skip_raw(&mut self) {
        let mut offset = self.current;

        while let Some(found) = self.source[offset..].find(STATEMENT_START) {
            let at = offset + found;
            match self.lex_until(at, RegionKind::Statement, STATEMENT_END) {
                Some(region) if region.keyword() == Some("endraw") => {
                    self.current = at;
                    return;
                }
                Some(region) => offset = region.end,
                None => break,
            }
        }

        tracing::trace!(offset = self.current, "raw block runs to end of text");
        self.current = self.source.len();
    }
}

/// Tokenize `text` into its template regions, in source order.
#[must_use]
pub fn tokenize(text: &str, syntax: TemplateSyntax) -> Vec<TemplateRegion> {
    Lexer::new(text, syntax).tokenize()
}
