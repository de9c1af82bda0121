//! JSON output formatter

use super::OutputFormatter;
use crate::linter::{FileReport, LintResult};
use serde::Serialize;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter {
    /// Pretty print with indentation
    pub pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        if self.pretty {
            serde_json::to_string_pretty(value).unwrap_or_default()
        } else {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    reports: &'a [FileReport],
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    files_processed: usize,
    files_with_findings: usize,
    unsupported_files: usize,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
    duration_ms: u128,
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &LintResult) -> String {
        let output = JsonOutput {
            reports: &result.reports,
            summary: JsonSummary {
                files_processed: result.files_processed,
                files_with_findings: result
                    .reports
                    .iter()
                    .filter(|r| r.report.findings().next().is_some())
                    .count(),
                unsupported_files: result.reports.iter().filter(|r| !r.report.supported).count(),
                error_count: result.error_count,
                warning_count: result.warning_count,
                info_count: result.info_count,
                duration_ms: result.duration.as_millis(),
            },
        };

        self.to_json(&output)
    }

    fn format_report(&self, report: &FileReport) -> String {
        self.to_json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, Location, Severity};
    use crate::report::Report;
    use code_detector::Language;
    use std::path::PathBuf;
    use std::time::Duration;

    fn php_report() -> FileReport {
        FileReport {
            path: PathBuf::from("index.php"),
            report: Report {
                language: Language::Php,
                diagnostics: vec![Diagnostic::new("variable-naming", Severity::Warning, "bad name")
                    .with_location(Location::new(2, "$Foo = 1;"))],
                supported: true,
                faulted_rules: Vec::new(),
            },
        }
    }

    #[test]
    fn test_json_format_report() {
        let output = JsonFormatter::new().format_report(&php_report());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["path"], "index.php");
        assert_eq!(value["language"], "php");
        assert_eq!(value["supported"], true);
        assert_eq!(value["diagnostics"][0]["rule_id"], "variable-naming");
        assert_eq!(value["diagnostics"][0]["severity"], "warning");
        assert_eq!(value["diagnostics"][0]["location"]["line"], 2);
    }

    #[test]
    fn test_json_format_result() {
        let reports = vec![
            php_report(),
            FileReport {
                path: PathBuf::from("notes.txt"),
                report: Report::unsupported(Language::Unknown),
            },
        ];
        let result = LintResult::from_reports(reports, Duration::from_millis(5));

        let output = JsonFormatter::new().format(&result);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["reports"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["summary"]["files_processed"], 2);
        assert_eq!(value["summary"]["files_with_findings"], 1);
        assert_eq!(value["summary"]["unsupported_files"], 1);
        assert_eq!(value["summary"]["warning_count"], 1);
        // Sentinels are not counted
        assert_eq!(value["summary"]["info_count"], 0);
    }

    #[test]
    fn test_json_pretty() {
        let output = JsonFormatter::new().pretty().format_report(&php_report());
        assert!(output.contains('\n'));
    }
}
