//! Diagnostic types for lint findings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rule id carried by the clean-run sentinel
pub const CLEAN_RULE_ID: &str = "no-issues";

/// Rule id carried by the unsupported-language sentinel
pub const UNSUPPORTED_RULE_ID: &str = "unsupported-language";

/// Message of the unsupported-language sentinel
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported language.";

/// Severity level for diagnostics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - potential issue
    #[default]
    Warning,
    /// Error - likely bug
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(()),
        }
    }
}

/// Where in the input a finding points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-based)
    pub line: usize,
    /// The trimmed source line
    pub snippet: String,
}

impl Location {
    pub fn new(line: usize, snippet: &str) -> Self {
        Self {
            line,
            snippet: snippet.to_string(),
        }
    }
}

/// A lint diagnostic. Immutable once built; the builder methods consume `self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule ID that produced this diagnostic
    pub rule_id: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Optional line/snippet hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(rule_id: &str, severity: Severity, message: &str) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.to_string(),
            location: None,
        }
    }

    /// The "ran cleanly" sentinel
    pub fn clean(message: &str) -> Self {
        Self::new(CLEAN_RULE_ID, Severity::Info, message)
    }

    /// The "no rule set for this language" sentinel
    pub fn unsupported() -> Self {
        Self::new(UNSUPPORTED_RULE_ID, Severity::Info, UNSUPPORTED_MESSAGE)
    }

    /// Attach a location hint
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Line number, if the diagnostic has one
    pub fn line(&self) -> Option<usize> {
        self.location.as_ref().map(|l| l.line)
    }

    pub fn is_clean_sentinel(&self) -> bool {
        self.rule_id == CLEAN_RULE_ID
    }

    pub fn is_unsupported_sentinel(&self) -> bool {
        self.rule_id == UNSUPPORTED_RULE_ID
    }

    /// Check if this is either sentinel rather than a real finding
    pub fn is_sentinel(&self) -> bool {
        self.is_clean_sentinel() || self.is_unsupported_sentinel()
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Check if this is a warning
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(
                f,
                "{}:{} [{}] {}",
                line, self.severity, self.rule_id, self.message
            ),
            None => write!(f, "{} [{}] {}", self.severity, self.rule_id, self.message),
        }
    }
}
