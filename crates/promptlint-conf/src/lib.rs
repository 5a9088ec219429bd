mod diagnostics;
mod template;

use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticSeverity;
pub use crate::diagnostics::DiagnosticsConfig;
pub use crate::template::ParseOptionError;
pub use crate::template::TemplateSyntax;
pub use crate::template::VariableDialect;
pub use crate::template::DEFAULT_MAX_VARIABLE_LEN;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    debug: bool,
    syntax: TemplateSyntax,
    dialect: VariableDialect,
    highlight: bool,
    max_variable_len: usize,
    variables: Vec<String>,
    diagnostics: DiagnosticsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            syntax: TemplateSyntax::default(),
            dialect: VariableDialect::default(),
            highlight: true,
            max_variable_len: DEFAULT_MAX_VARIABLE_LEN,
            variables: Vec::new(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings for a project, layering (lowest to highest priority):
    /// the user config file, `.promptlint.toml`, then `promptlint.toml`.
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("dev", "promptlint", "promptlint")
            .map(|proj_dirs| proj_dirs.config_dir().join("promptlint.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!(path = %path.display(), "adding user config source");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            File::from(project_root.join(".promptlint.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("promptlint.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        tracing::debug!(
            syntax = %settings.syntax,
            dialect = %settings.dialect,
            variables = settings.variables.len(),
            "loaded settings"
        );

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_variable_len == 0 {
            return Err(ConfigError::Invalid {
                key: "max_variable_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn syntax(&self) -> TemplateSyntax {
        self.syntax
    }

    #[must_use]
    pub fn dialect(&self) -> VariableDialect {
        self.dialect
    }

    #[must_use]
    pub fn highlight(&self) -> bool {
        self.highlight
    }

    #[must_use]
    pub fn max_variable_len(&self) -> usize {
        self.max_variable_len
    }

    /// Keys of the declared variables.
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticsConfig {
        &self.diagnostics
    }
}
