use std::io::IsTerminal;
use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use promptlint_conf::DiagnosticSeverity;
use promptlint_conf::DiagnosticsConfig;
use promptlint_conf::Settings;
use promptlint_source::Diagnostic;
use promptlint_source::DiagnosticRenderer;
use promptlint_source::LineIndex;
use promptlint_source::Severity;
use promptlint_templates::analyze;
use promptlint_templates::AnalyzeOptions;
use promptlint_templates::TemplateError;
use promptlint_templates::TemplateSyntax;
use promptlint_templates::VariableDef;
use promptlint_templates::VariableDialect;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::walk::walk_files;
use crate::walk::WalkOptions;

const PROMPT_EXTENSIONS: &[&str] = &["txt", "md", "j2", "jinja", "jinja2", "tmpl", "prompt"];

#[derive(Debug, Parser)]
pub struct Check {
    /// Files or directories to check, or `-` for stdin. If omitted, reads
    /// piped stdin when it is non-empty, otherwise checks the current
    /// directory.
    paths: Vec<Utf8PathBuf>,

    /// JSON file with the declared variables, e.g. `[{"key": "name"}]`.
    #[arg(long)]
    variables: Option<Utf8PathBuf>,

    /// Template syntax (jinja2, go_template). Overrides the config file.
    #[arg(long)]
    syntax: Option<TemplateSyntax>,

    /// Variable dialect (normal, variable_bound). Overrides the config file.
    #[arg(long)]
    dialect: Option<VariableDialect>,

    /// Select specific diagnostic codes to enable (e.g. T103,T105).
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,

    /// Ignore specific diagnostic codes (e.g. T105,T106).
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Include hidden files and directories.
    #[arg(long)]
    hidden: bool,

    /// Don't respect `.gitignore`, `.ignore` and other ignore files.
    #[arg(long)]
    no_ignore: bool,

    /// Follow symbolic links while walking directories.
    #[arg(long)]
    follow_links: bool,
}

impl Command for Check {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let project_root = resolve_project_root()?;
        let settings =
            Settings::new(project_root.as_std_path()).context("Failed to load settings")?;
        if settings.debug() {
            eprintln!("{settings:#?}");
        }

        let mut options = AnalyzeOptions::from_settings(&settings);
        if let Some(syntax) = self.syntax {
            options.syntax = syntax;
        }
        if let Some(dialect) = self.dialect {
            options.dialect = dialect;
        }

        let variables = self.load_variables(&settings)?;
        let config = build_diagnostics_config(&settings, &self.select, &self.ignore);
        let fmt = pick_renderer();

        tracing::info!(
            syntax = %options.syntax,
            dialect = %options.dialect,
            variables = variables.len(),
            "checking prompts"
        );

        let stdin = self.read_stdin()?;
        let results = if let Some(source) = stdin {
            vec![FileCheckResult::new(
                Utf8PathBuf::from("<stdin>"),
                source,
                &variables,
                options,
            )]
        } else {
            let roots = if self.paths.is_empty() {
                vec![project_root.clone()]
            } else {
                self.paths
                    .iter()
                    .map(|path| {
                        if path.is_relative() {
                            project_root.join(path)
                        } else {
                            path.clone()
                        }
                    })
                    .collect()
            };

            let walk = WalkOptions {
                hidden: self.hidden,
                no_ignore: self.no_ignore,
                follow_links: self.follow_links,
            };

            let mut results = Vec::new();
            for path in walk_files(&roots, is_prompt_file, walk)? {
                let source = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {path}"))?;
                results.push(FileCheckResult::new(path, source, &variables, options));
            }
            results
        };

        let declared = declared_note(&variables);
        let mut error_count: usize = 0;
        let mut file_count: usize = 0;

        for result in &results {
            let rendered = result.render(&config, &fmt, &declared);
            if !rendered.is_empty() {
                file_count += 1;
            }
            for (severity, output) in &rendered {
                println!("{output}\n");
                if *severity == Severity::Error {
                    error_count += 1;
                }
            }
        }

        if error_count > 0 {
            let file_word = if file_count == 1 { "file" } else { "files" };
            let error_word = if error_count == 1 { "error" } else { "errors" };
            Ok(Exit::error().with_message(format!(
                "Found {error_count} {error_word} in {file_count} {file_word}."
            )))
        } else {
            Ok(Exit::success())
        }
    }
}

impl Check {
    /// Stdin contents when it is the input: an explicit `-`, or no paths and
    /// a piped stdin that is not empty.
    fn read_stdin(&self) -> Result<Option<String>> {
        let explicit = self.paths.len() == 1 && self.paths[0].as_str() == "-";
        if !explicit && (!self.paths.is_empty() || std::io::stdin().is_terminal()) {
            return Ok(None);
        }

        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;

        if source.is_empty() && !explicit {
            tracing::debug!("stdin is empty, checking the project instead");
            return Ok(None);
        }
        Ok(Some(source))
    }

    /// Keys from the config file, extended by the `--variables` file.
    fn load_variables(&self, settings: &Settings) -> Result<Vec<VariableDef>> {
        let mut variables: Vec<VariableDef> = settings
            .variables()
            .iter()
            .map(VariableDef::new)
            .collect();

        if let Some(path) = &self.variables {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read variables file {path}"))?;
            let declared: Vec<VariableDef> = serde_json::from_str(&contents)
                .with_context(|| format!("Invalid variables file {path}"))?;
            variables.extend(declared);
        }

        Ok(variables)
    }
}

struct FileCheckResult {
    path: Utf8PathBuf,
    source: String,
    errors: Vec<TemplateError>,
}

impl FileCheckResult {
    fn new(
        path: Utf8PathBuf,
        source: String,
        variables: &[VariableDef],
        options: AnalyzeOptions,
    ) -> Self {
        let errors = analyze(&source, variables, options).errors;
        tracing::debug!(%path, errors = errors.len(), "checked file");

        if tracing::enabled!(tracing::Level::TRACE) {
            let index = LineIndex::new(&source);
            for error in &errors {
                let (start, end) = index.span_to_line_col(error.span());
                tracing::trace!(
                    %path,
                    code = error.code(),
                    line = start.line() + 1,
                    column = start.column() + 1,
                    end_line = end.line() + 1,
                    end_column = end.column() + 1,
                    "{error}"
                );
            }
        }
        Self {
            path,
            source,
            errors,
        }
    }

    /// Rendered diagnostics with their severity. `declared` is the note
    /// attached to undeclared-variable errors.
    fn render(
        &self,
        config: &DiagnosticsConfig,
        fmt: &DiagnosticRenderer,
        declared: &str,
    ) -> Vec<(Severity, String)> {
        let mut results = Vec::new();

        for error in &self.errors {
            let code = error.code();
            let Some(severity) = to_render_severity(config.get_severity(code)) else {
                continue;
            };
            let message = error.to_string();
            let mut diagnostic = Diagnostic::new(
                &self.source,
                self.path.as_str(),
                code,
                &message,
                severity,
                error.span(),
                error.label(),
            );
            match error {
                TemplateError::UnclosedBlock {
                    closed_by: Some(closer),
                    ..
                } => {
                    diagnostic = diagnostic.annotation(*closer, "outer block closed here", false);
                }
                TemplateError::UndeclaredVariable { .. } => {
                    diagnostic = diagnostic.note(declared);
                }
                _ => {}
            }
            results.push((severity, fmt.render(&diagnostic)));
        }

        results
    }
}

fn declared_note(variables: &[VariableDef]) -> String {
    let mut keys: Vec<&str> = variables.iter().map(|variable| variable.key.as_str()).collect();
    keys.sort_unstable();
    keys.dedup();

    if keys.is_empty() {
        "no variables are declared, list them under `variables` in promptlint.toml or pass --variables".to_string()
    } else {
        format!("declared variables: {}", keys.join(", "))
    }
}

fn to_render_severity(severity: DiagnosticSeverity) -> Option<Severity> {
    match severity {
        DiagnosticSeverity::Off => None,
        DiagnosticSeverity::Error => Some(Severity::Error),
        DiagnosticSeverity::Warning => Some(Severity::Warning),
        DiagnosticSeverity::Info => Some(Severity::Info),
        DiagnosticSeverity::Hint => Some(Severity::Hint),
    }
}

fn build_diagnostics_config(
    settings: &Settings,
    select: &[String],
    ignore: &[String],
) -> DiagnosticsConfig {
    let mut config = settings.diagnostics().clone();

    for code in select {
        config.set_severity(code, DiagnosticSeverity::Error);
    }

    for code in ignore {
        config.set_severity(code, DiagnosticSeverity::Off);
    }

    config
}

fn is_prompt_file(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| PROMPT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}
