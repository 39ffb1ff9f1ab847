//! Rule scanning raw manifest text for literal credentials.
//!
//! Runs over the file text rather than parsed documents so that it also
//! sees templates that do not parse, and so `${VAR}` placeholders can be
//! told apart from literal values.
//!
//! # Detected Patterns
//!
//! - `password: hunter2`
//! - `secret: "abc"`
//! - `token: <20+ base64 characters>`

use capi_lint_core::{Finding, Severity, SourceRule, SourceText};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rule code for hardcoded-credentials.
pub const CODE: &str = "CL007";

/// Rule name for hardcoded-credentials.
pub const NAME: &str = "hardcoded-credentials";

const PATTERNS: &[&str] = &[
    r#"(?i)password:\s*['"]?[^${\s'"]+['"]?"#,
    r#"(?i)secret:\s*['"]?[^${\s'"]+['"]?"#,
    r#"(?i)token:\s*['"]?[a-zA-Z0-9+/=]{20,}['"]?"#,
];

static CREDENTIAL_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| PATTERNS.iter().filter_map(|p| Regex::new(p).ok()).collect());

/// Flags lines that assign a literal to a password, secret or token key.
#[derive(Debug, Clone)]
pub struct HardcodedCredentials {
    /// Severity level.
    pub severity: Severity,
}

impl Default for HardcodedCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl HardcodedCredentials {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl SourceRule for HardcodedCredentials {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Flags literal passwords, secrets and tokens in manifests"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check_source(&self, source: &SourceText<'_>) -> Vec<Finding> {
        source
            .content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim_start().starts_with('#'))
            .filter(|(_, line)| CREDENTIAL_PATTERNS.iter().any(|re| re.is_match(line)))
            .map(|(idx, _)| {
                Finding::new(
                    self.severity,
                    "Secrets",
                    source.path.display().to_string(),
                    "Possible hardcoded credential detected",
                )
                .with_recommendation("Use ${VARIABLE} substitution or reference a Secret")
                .at_line(idx + 1)
            })
            .collect()
    }
}
