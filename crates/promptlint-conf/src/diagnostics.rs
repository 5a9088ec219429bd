use std::collections::HashMap;

use serde::Deserialize;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

/// Configuration for diagnostic severity levels.
///
/// All diagnostics are enabled by default at "error" severity.
/// Configure severity per diagnostic code or prefix pattern.
/// Specific codes override prefix patterns.
///
/// Example configuration:
/// ```toml
/// [diagnostics.severity]
/// # Individual codes
/// T105 = "warning"
/// T106 = "off"
///
/// # Prefixes for bulk configuration
/// "T1" = "hint"
/// T100 = "error"   # specific overrides prefix
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub severity: HashMap<String, DiagnosticSeverity>,
}

impl DiagnosticsConfig {
    /// Get the severity level for a diagnostic code.
    ///
    /// Resolution order (most specific wins):
    /// 1. Exact match (e.g., "T105")
    /// 2. Longest prefix match (e.g., "T10" over "T")
    /// 3. Default: Error
    ///
    /// # Examples
    /// ```
    /// # use promptlint_conf::{DiagnosticsConfig, DiagnosticSeverity};
    /// # use std::collections::HashMap;
    /// let mut severity = HashMap::new();
    /// severity.insert("T".to_string(), DiagnosticSeverity::Warning);
    /// severity.insert("T10".to_string(), DiagnosticSeverity::Off);
    /// severity.insert("T103".to_string(), DiagnosticSeverity::Error);
    ///
    /// let config = DiagnosticsConfig { severity };
    ///
    /// assert_eq!(config.get_severity("T103"), DiagnosticSeverity::Error);   // Exact
    /// assert_eq!(config.get_severity("T105"), DiagnosticSeverity::Off);     // "T10" prefix
    /// assert_eq!(config.get_severity("T200"), DiagnosticSeverity::Warning); // "T" prefix
    /// assert_eq!(config.get_severity("X100"), DiagnosticSeverity::Error);   // Default
    /// ```
    #[must_use]
    pub fn get_severity(&self, code: &str) -> DiagnosticSeverity {
        // Case-insensitive: `config` lowercases table keys. A full code is
        // the longest prefix of itself, so exact entries win.
        self.severity
            .iter()
            .filter(|(pattern, _)| {
                code.get(..pattern.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(pattern))
            })
            .max_by_key(|(pattern, _)| pattern.len())
            .map_or(DiagnosticSeverity::Error, |(_, &severity)| severity)
    }

    /// Check if a diagnostic should be shown (severity is not Off).
    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_severity(code) != DiagnosticSeverity::Off
    }

    /// Override the severity for a code or prefix.
    pub fn set_severity(&mut self, code: &str, severity: DiagnosticSeverity) {
        self.severity
            .retain(|pattern, _| !pattern.eq_ignore_ascii_case(code));
        self.severity.insert(code.to_string(), severity);
    }
}
