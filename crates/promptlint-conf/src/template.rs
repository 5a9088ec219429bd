use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Default upper bound on variable name length.
pub const DEFAULT_MAX_VARIABLE_LEN: usize = 50;

/// Which delimiter grammar a prompt template is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSyntax {
    #[default]
    #[serde(alias = "jinja")]
    Jinja2,
    GoTemplate,
}

/// How expression variable references are judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableDialect {
    /// Any well-formed identifier is accepted.
    Normal,
    /// Only names present in the declared variable set are accepted.
    #[default]
    VariableBound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseOptionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for TemplateSyntax {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "jinja" | "jinja2" => Ok(Self::Jinja2),
            "go_template" | "go" => Ok(Self::GoTemplate),
            _ => Err(ParseOptionError {
                kind: "template syntax",
                value: s.to_string(),
                expected: "jinja2, go_template",
            }),
        }
    }
}

impl fmt::Display for TemplateSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jinja2 => f.write_str("jinja2"),
            Self::GoTemplate => f.write_str("go_template"),
        }
    }
}

impl FromStr for VariableDialect {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "normal" => Ok(Self::Normal),
            "variable_bound" | "bound" => Ok(Self::VariableBound),
            _ => Err(ParseOptionError {
                kind: "variable dialect",
                value: s.to_string(),
                expected: "normal, variable_bound",
            }),
        }
    }
}

impl fmt::Display for VariableDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::VariableBound => f.write_str("variable_bound"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_syntax() {
        assert_eq!("jinja2".parse(), Ok(TemplateSyntax::Jinja2));
        assert_eq!("go-template".parse(), Ok(TemplateSyntax::GoTemplate));
        assert!("mustache".parse::<TemplateSyntax>().is_err());
    }

    #[test]
    fn parse_dialect() {
        assert_eq!("Normal".parse(), Ok(VariableDialect::Normal));
        assert_eq!("variable_bound".parse(), Ok(VariableDialect::VariableBound));
        let err = "loose".parse::<VariableDialect>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown variable dialect 'loose', expected one of: normal, variable_bound"
        );
    }

    #[test]
    fn display_matches_serde_names() {
        assert_eq!(TemplateSyntax::GoTemplate.to_string(), "go_template");
        assert_eq!(VariableDialect::VariableBound.to_string(), "variable_bound");
    }
}
