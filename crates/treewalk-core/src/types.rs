//! Core types for violations and run results.

use crate::token::TokenType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity level of a violation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Recorded but never reported to listeners by default.
    Ignore,
    /// Informational message.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// A single finding produced while checking one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based after tab expansion, 0 when line-only).
    pub column: usize,
    /// Severity of this violation.
    pub severity: Severity,
    /// Message key, e.g. `function.too.long`.
    pub key: String,
    /// Arguments substituted into the message template.
    pub args: Vec<String>,
    /// Rendered message.
    pub message: String,
    /// Configured id of the originating module, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Full name of the originating module.
    pub source: String,
    /// Token type of the node the violation was logged against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

impl Violation {
    /// Creates a violation with no module id and no token type.
    #[must_use]
    pub fn new(
        line: usize,
        column: usize,
        severity: Severity,
        key: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            severity,
            key: key.into(),
            args: Vec::new(),
            message: message.into(),
            module_id: None,
            source: source.into(),
            token_type: None,
        }
    }

    /// Sets the module id.
    #[must_use]
    pub fn with_module_id(mut self, id: Option<String>) -> Self {
        self.module_id = id;
        self
    }

    /// Sets the message arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, ty: Option<TokenType>) -> Self {
        self.token_type = ty;
        self
    }
}

impl Ord for Violation {
    /// Line, column, module id (`None` last), source, message; remaining
    /// fields only break ties so the order stays total.
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
            .then_with(|| match (&self.module_id, &other.module_id) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.key.cmp(&other.key))
            .then_with(|| self.args.cmp(&other.args))
            .then(self.severity.cmp(&other.severity))
            .then(self.token_type.cmp(&other.token_type))
    }
}

impl PartialOrd for Violation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {} {}", self.line, self.column, self.severity, self.message)?;
        match &self.module_id {
            Some(id) => write!(f, " [{id}]"),
            None => write!(f, " [{}]", short_name(&self.source)),
        }
    }
}

/// Returns the last path segment of a module name.
#[must_use]
pub(crate) fn short_name(source: &str) -> &str {
    source.rsplit("::").next().unwrap_or(source)
}

/// Counters describing one audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    /// Files that went through the pipeline (cached ones included).
    pub files_processed: usize,
    /// Files skipped because the cache reported them unchanged.
    pub files_cached: usize,
    /// Files skipped because of their extension.
    pub files_skipped: usize,
    /// Violations delivered to listeners at or above the failure threshold.
    pub error_count: usize,
    /// Violations delivered to listeners, any severity.
    pub violation_count: usize,
    /// Listener callbacks that failed or panicked.
    pub listener_failures: usize,
    /// True if the run was cancelled before every file was started.
    pub cancelled: bool,
}
