//! Lint report for one input

use crate::diagnostic::Diagnostic;
use code_detector::Language;
use serde::Serialize;

/// Display string of a report with no parser behind it
pub const UNSUPPORTED_DISPLAY: &str = "Unsupported language or no issues found";

/// Display string of a clean run
pub const CLEAN_DISPLAY: &str = "No issues found";

/// Delimiter between messages in the display string
pub const DISPLAY_DELIMITER: &str = ", ";

/// Structured outcome of linting one input.
///
/// `diagnostics` is never empty: it holds the findings in rule order, the
/// clean-run sentinel, or the unsupported sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub language: Language,
    pub diagnostics: Vec<Diagnostic>,
    /// Whether a parser was registered for `language`
    pub supported: bool,
    /// Rules that failed on this input and were skipped
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faulted_rules: Vec<String>,
}

impl Report {
    /// Report for a language with no registered parser
    pub fn unsupported(language: Language) -> Self {
        Self {
            language,
            diagnostics: vec![Diagnostic::unsupported()],
            supported: false,
            faulted_rules: Vec::new(),
        }
    }

    /// Ran and found nothing
    pub fn is_clean(&self) -> bool {
        self.supported && self.diagnostics.iter().all(Diagnostic::is_clean_sentinel)
    }

    /// Real findings, without sentinels
    pub fn findings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_sentinel())
    }

    /// Reduce the report to a single line
    pub fn to_display_string(&self) -> String {
        match self.diagnostics.as_slice() {
            [only] if only.is_unsupported_sentinel() => UNSUPPORTED_DISPLAY.to_string(),
            [only] if only.is_clean_sentinel() => CLEAN_DISPLAY.to_string(),
            diagnostics => diagnostics
                .iter()
                .map(|d| d.message.as_str())
                .collect::<Vec<_>>()
                .join(DISPLAY_DELIMITER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;

    fn report(diagnostics: Vec<Diagnostic>) -> Report {
        Report {
            language: Language::Go,
            diagnostics,
            supported: true,
            faulted_rules: Vec::new(),
        }
    }

    #[test]
    fn test_unsupported_display() {
        let report = Report::unsupported(Language::Unknown);
        assert!(!report.is_clean());
        assert_eq!(report.findings().count(), 0);
        assert_eq!(report.to_display_string(), UNSUPPORTED_DISPLAY);
    }

    #[test]
    fn test_clean_display() {
        let report = report(vec![Diagnostic::clean("No Go issues found.")]);
        assert!(report.is_clean());
        assert_eq!(report.to_display_string(), CLEAN_DISPLAY);
    }

    #[test]
    fn test_findings_joined() {
        let report = report(vec![
            Diagnostic::new("a", Severity::Warning, "first"),
            Diagnostic::new("b", Severity::Error, "second"),
        ]);
        assert!(!report.is_clean());
        assert_eq!(report.findings().count(), 2);
        assert_eq!(report.to_display_string(), "first, second");
    }

    #[test]
    fn test_serialize_skips_empty_faults() {
        let json = serde_json::to_value(report(vec![Diagnostic::clean("ok")])).unwrap();
        assert_eq!(json["language"], "go");
        assert_eq!(json["supported"], true);
        assert!(json.get("faulted_rules").is_none());
    }
}
