//! Output formatters for lint results

mod compact;
mod json;
mod plain;
mod text;

pub use compact::CompactFormatter;
pub use json::JsonFormatter;
pub use plain::PlainFormatter;
pub use text::TextFormatter;

use crate::linter::{FileReport, LintResult};

/// Output formatter trait
pub trait OutputFormatter: Send + Sync {
    /// Format the entire lint result
    fn format(&self, result: &LintResult) -> String;

    /// Format the report of a single input
    fn format_report(&self, report: &FileReport) -> String;
}
