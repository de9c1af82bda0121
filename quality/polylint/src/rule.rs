//! Rule definition
//!
//! A rule is a named, pure check over the whole input text. It returns
//! [`Finding`]s; the engine turns those into [`crate::Diagnostic`]s carrying
//! the rule id and (possibly overridden) severity.

use crate::diagnostic::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature of a rule check
pub type CheckFn = fn(&str) -> Vec<Finding>;

/// Rule category for grouping related rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Code that is definitely wrong or useless
    Correctness,
    /// Code that is likely wrong or suspicious
    Suspicious,
    /// Idiomatic and consistent style rules
    #[default]
    Style,
    /// Naming and layout conventions of the language community
    Convention,
    /// Extra strict rules that may have false positives
    Pedantic,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Correctness => write!(f, "correctness"),
            RuleCategory::Suspicious => write!(f, "suspicious"),
            RuleCategory::Style => write!(f, "style"),
            RuleCategory::Convention => write!(f, "convention"),
            RuleCategory::Pedantic => write!(f, "pedantic"),
        }
    }
}

/// A single match reported by a rule check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: String,
    /// Line number (1-based)
    pub line: Option<usize>,
    /// Trimmed source line
    pub snippet: Option<String>,
}

impl Finding {
    /// A finding about the input as a whole
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            snippet: None,
        }
    }

    /// A finding pointing at one line
    pub fn at(line: usize, snippet: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            snippet: Some(snippet.to_string()),
        }
    }
}

/// A lint rule definition
#[derive(Debug, Clone)]
pub struct Rule {
    /// Rule identifier, unique within one language (e.g., "no-var")
    pub id: &'static str,

    /// What the rule looks for
    pub description: &'static str,

    /// Default severity level
    pub severity: Severity,

    /// Rule category
    pub category: RuleCategory,

    /// The check itself
    pub check: CheckFn,
}

impl Rule {
    /// Create a new rule with default severity (warning) and category (style)
    pub fn new(id: &'static str, description: &'static str, check: CheckFn) -> Self {
        Self {
            id,
            description,
            severity: Severity::Warning,
            category: RuleCategory::default(),
            check,
        }
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the rule category
    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    /// Run the check against the input
    pub fn evaluate(&self, text: &str) -> Vec<Finding> {
        (self.check)(text)
    }
}
