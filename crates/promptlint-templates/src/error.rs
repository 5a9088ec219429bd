use promptlint_source::Span;
use serde::Serialize;
use thiserror::Error;

/// Why a template region is invalid.
///
/// Every variant carries the span a diagnostic should point at and a
/// stable code (see [`TemplateError::code`]) that severity configuration
/// keys on.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
pub enum TemplateError {
    /// Delimiters in the region do not close in nesting order.
    ///
    /// ```jinja
    /// {{ user {% if %} }}
    /// ```
    #[error("Unbalanced template delimiters")]
    UnbalancedDelimiters { span: Span },

    /// A block keyword is never closed by its end keyword. `closed_by`
    /// points at an outer block's closer that ended it implicitly.
    ///
    /// ```jinja
    /// {% for x in xs %}{% if x %}{% endfor %}
    /// ```
    #[error("Unclosed block '{tag}'")]
    UnclosedBlock {
        tag: String,
        span: Span,
        closed_by: Option<Span>,
    },

    /// An end keyword has no open block to close.
    #[error("Unexpected '{tag}' with no open block")]
    UnexpectedEndTag { tag: String, span: Span },

    #[error("Unknown filter '{name}'")]
    UnknownFilter { name: String, span: Span },

    /// A pipe with no filter name after it.
    #[error("Missing filter name after '|'")]
    EmptyFilter { span: Span },

    /// The root variable is not in the declared variable set.
    #[error("Undeclared variable '{name}'")]
    UndeclaredVariable { name: String, span: Span },

    /// The root variable is not a well-formed identifier.
    #[error("Invalid variable name '{name}'")]
    InvalidVariableName { name: String, span: Span },

    #[error("Empty expression")]
    EmptyExpression { span: Span },
}

impl TemplateError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnbalancedDelimiters { .. } => "T100",
            Self::UnclosedBlock { .. } => "T101",
            Self::UnexpectedEndTag { .. } => "T102",
            Self::UnknownFilter { .. } => "T103",
            Self::EmptyFilter { .. } => "T104",
            Self::UndeclaredVariable { .. } => "T105",
            Self::InvalidVariableName { .. } => "T106",
            Self::EmptyExpression { .. } => "T107",
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::UnbalancedDelimiters { span }
            | Self::UnclosedBlock { span, .. }
            | Self::UnexpectedEndTag { span, .. }
            | Self::UnknownFilter { span, .. }
            | Self::EmptyFilter { span }
            | Self::UndeclaredVariable { span, .. }
            | Self::InvalidVariableName { span, .. }
            | Self::EmptyExpression { span } => *span,
        }
    }

    /// Short label for the annotated span in a rendered diagnostic.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnbalancedDelimiters { .. } => "delimiters do not match",
            Self::UnclosedBlock { .. } => "opened here",
            Self::UnexpectedEndTag { .. } => "nothing to close",
            Self::UnknownFilter { .. } => "not a built-in filter",
            Self::EmptyFilter { .. } => "expected a filter name",
            Self::UndeclaredVariable { .. } => "not declared",
            Self::InvalidVariableName { .. } => "not an identifier",
            Self::EmptyExpression { .. } => "nothing to evaluate",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_messages() {
        let error = TemplateError::UnknownFilter {
            name: "shout".to_string(),
            span: Span::new(8, 5),
        };
        assert_eq!(error.code(), "T103");
        assert_eq!(error.span(), Span::new(8, 5));
        assert_eq!(error.to_string(), "Unknown filter 'shout'");

        let error = TemplateError::UnclosedBlock {
            tag: "for".to_string(),
            span: Span::new(3, 3),
            closed_by: None,
        };
        assert_eq!(error.code(), "T101");
        assert_eq!(error.to_string(), "Unclosed block 'for'");
    }

    #[test]
    fn codes_are_distinct() {
        let span = Span::default();
        let all = [
            TemplateError::UnbalancedDelimiters { span },
            TemplateError::UnclosedBlock {
                tag: String::new(),
                span,
                closed_by: None,
            },
            TemplateError::UnexpectedEndTag { tag: String::new(), span },
            TemplateError::UnknownFilter { name: String::new(), span },
            TemplateError::EmptyFilter { span },
            TemplateError::UndeclaredVariable { name: String::new(), span },
            TemplateError::InvalidVariableName { name: String::new(), span },
            TemplateError::EmptyExpression { span },
        ];
        let mut codes: Vec<_> = all.iter().map(TemplateError::code).collect();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
