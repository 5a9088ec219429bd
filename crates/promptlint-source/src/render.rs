use annotate_snippets::AnnotationKind;
use annotate_snippets::Level;
use annotate_snippets::Renderer;
use annotate_snippets::Snippet;

use crate::Span;

/// Severity level for rendered diagnostics.
///
/// Kept separate from `promptlint_conf::DiagnosticSeverity`: the renderer
/// only needs to know what label to print, and never sees `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

/// A single annotation to render on a source snippet.
///
/// The `primary` flag controls whether it gets `^^^` (primary) or `---`
/// (context) underline treatment.
#[derive(Debug, Clone)]
pub struct DiagnosticAnnotation<'a> {
    pub span: Span,
    pub label: &'a str,
    pub primary: bool,
}

/// A diagnostic ready for rendering.
#[derive(Debug)]
pub struct Diagnostic<'a> {
    pub source: &'a str,
    pub path: &'a str,
    pub code: &'a str,
    pub message: &'a str,
    pub severity: Severity,
    pub annotations: Vec<DiagnosticAnnotation<'a>>,
    pub notes: Vec<&'a str>,
}

impl<'a> Diagnostic<'a> {
    /// Create a diagnostic with a single primary annotation.
    #[must_use]
    pub fn new(
        source: &'a str,
        path: &'a str,
        code: &'a str,
        message: &'a str,
        severity: Severity,
        span: Span,
        label: &'a str,
    ) -> Self {
        Self {
            source,
            path,
            code,
            message,
            severity,
            annotations: vec![DiagnosticAnnotation {
                span,
                label,
                primary: true,
            }],
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn annotation(mut self, span: Span, label: &'a str, primary: bool) -> Self {
        self.annotations.push(DiagnosticAnnotation {
            span,
            label,
            primary,
        });
        self
    }

    #[must_use]
    pub fn note(mut self, note: &'a str) -> Self {
        self.notes.push(note);
        self
    }
}

/// Renders diagnostics as formatted text using `annotate-snippets`.
///
/// - **Plain**: no ANSI colors, for tests and piped output
/// - **Styled**: ANSI colors, for terminal display
#[derive(Debug)]
pub struct DiagnosticRenderer {
    renderer: Renderer,
}

impl DiagnosticRenderer {
    #[must_use]
    pub fn plain() -> Self {
        Self {
            renderer: Renderer::plain(),
        }
    }

    #[must_use]
    pub fn styled() -> Self {
        Self {
            renderer: Renderer::styled(),
        }
    }

    /// Render one diagnostic. Annotation ranges are clamped to the source
    /// length.
    #[must_use]
    pub fn render(&self, diagnostic: &Diagnostic<'_>) -> String {
        let level = match diagnostic.severity {
            Severity::Error => Level::ERROR,
            Severity::Warning => Level::WARNING,
            Severity::Info => Level::INFO,
            Severity::Hint => Level::HELP,
        };

        let len = diagnostic.source.len();
        let snippet = diagnostic.annotations.iter().fold(
            Snippet::source(diagnostic.source)
                .path(diagnostic.path)
                .line_start(1),
            |snippet, annotation| {
                let kind = if annotation.primary {
                    AnnotationKind::Primary
                } else {
                    AnnotationKind::Context
                };
                let range = annotation.span.start_usize().min(len)..annotation.span.end_usize().min(len);
                snippet.annotation(kind.span(range).label(annotation.label))
            },
        );

        let group = diagnostic.notes.iter().fold(
            level
                .primary_title(diagnostic.message)
                .id(diagnostic.code)
                .element(snippet),
            |group, note| group.element(Level::NOTE.message(*note)),
        );

        self.renderer.render(&[group])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> DiagnosticRenderer {
        DiagnosticRenderer::plain()
    }

    #[test]
    fn single_line_span() {
        let source = "Hello {{ nmae }}\n";

        let diag = Diagnostic::new(
            source,
            "prompts/greeting.txt",
            "T105",
            "Undeclared variable 'nmae'",
            Severity::Error,
            Span::new(9, 4),
            "not in the declared variables",
        );
        let output = plain().render(&diag);

        assert!(output.contains("error[T105]"), "should have error header");
        assert!(
            output.contains("Undeclared variable 'nmae'"),
            "should have message"
        );
        assert!(
            output.contains("prompts/greeting.txt"),
            "should have file path"
        );
        assert!(output.contains("Hello {{ nmae }}"), "should show source line");
        assert!(
            output.contains("not in the declared variables"),
            "should have label"
        );
        assert!(output.contains("^^^^"), "should have underline carets");
    }

    #[test]
    fn two_annotations_different_lines() {
        let source = "{% for item in items %}\n{{ item }}\n{% endif %}\n";

        let diag = Diagnostic::new(
            source,
            "prompts/list.txt",
            "T101",
            "Unclosed block 'for'",
            Severity::Error,
            Span::new(3, 19),
            "this block is never closed",
        )
        .annotation(Span::new(38, 5), "closed by this tag instead", false);

        let output = plain().render(&diag);

        assert!(output.contains("error[T101]"));
        assert!(output.contains("this block is never closed"));
        assert!(output.contains("closed by this tag instead"));
        assert!(output.contains("{% endif %}"));
    }

    #[test]
    fn with_note() {
        let source = "{{ text|shout }}\n";

        let diag = Diagnostic::new(
            source,
            "prompts/filters.txt",
            "T103",
            "Unknown filter 'shout'",
            Severity::Error,
            Span::new(8, 5),
            "not a known filter",
        )
        .note("did you mean 'upper'?");

        let output = plain().render(&diag);

        assert!(output.contains("error[T103]"));
        assert!(output.contains("not a known filter"));
        assert!(output.contains("note: did you mean 'upper'?"));
    }

    #[test]
    fn warning_severity() {
        let source = "{{ user.name }}\n";

        let diag = Diagnostic::new(
            source,
            "prompts/user.txt",
            "T105",
            "Undeclared variable 'user'",
            Severity::Warning,
            Span::new(3, 9),
            "not declared",
        );
        let output = plain().render(&diag);

        assert!(output.contains("warning[T105]"), "should use warning level");
    }

    #[test]
    fn out_of_range_span_is_clamped() {
        let source = "{{ a";

        let diag = Diagnostic::new(
            source,
            "prompts/short.txt",
            "T100",
            "Unbalanced delimiters",
            Severity::Error,
            Span::new(0, 40),
            "here",
        );
        let output = plain().render(&diag);

        assert!(output.contains("error[T100]"));
    }

    #[test]
    fn styled_produces_ansi() {
        let source = "{% if a %}\n";
        let renderer = DiagnosticRenderer::styled();

        let diag = Diagnostic::new(
            source,
            "test.txt",
            "T101",
            "Unclosed block 'if'",
            Severity::Error,
            Span::new(3, 4),
            "never closed",
        );
        let output = renderer.render(&diag);

        assert!(
            output.contains("\x1b["),
            "styled output should contain ANSI escape codes"
        );
    }

    #[test]
    fn plain_no_ansi() {
        let source = "{% if a %}\n";

        let diag = Diagnostic::new(
            source,
            "test.txt",
            "T101",
            "Unclosed block 'if'",
            Severity::Error,
            Span::new(3, 4),
            "never closed",
        );
        let output = plain().render(&diag);

        assert!(
            !output.contains("\x1b["),
            "plain output should not contain ANSI escape codes"
        );
    }
}
