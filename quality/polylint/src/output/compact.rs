//! Compact output formatter
//!
//! One line per finding, minimal output for scripting.

use super::OutputFormatter;
use crate::diagnostic::Diagnostic;
use crate::linter::{FileReport, LintResult};
use std::path::Path;

/// Compact one-line-per-finding formatter: `path[:line]: severity: rule: message`
#[derive(Default)]
pub struct CompactFormatter;

impl CompactFormatter {
    /// Create a new compact formatter
    pub fn new() -> Self {
        Self
    }

    fn format_diagnostic(&self, path: &Path, diagnostic: &Diagnostic) -> String {
        // file[:line]
        let position = match diagnostic.line() {
            Some(line) => format!("{}:{}", path.display(), line),
            None => path.display().to_string(),
        };

        [
            position,
            diagnostic.severity.to_string(),
            diagnostic.rule_id.clone(),
            diagnostic.message.clone(),
        ]
        .join(": ")
    }
}

impl OutputFormatter for CompactFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in &result.reports {
            output.push_str(&self.format_report(report));
        }

        output
    }

    /// Clean and unsupported inputs print nothing
    fn format_report(&self, report: &FileReport) -> String {
        let mut output = String::new();

        for diag in report.report.findings() {
            output.push_str(&self.format_diagnostic(&report.path, diag));
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Location, Severity};
    use crate::report::Report;
    use code_detector::Language;
    use std::path::PathBuf;
    use std::time::Duration;

    fn cpp_report() -> FileReport {
        FileReport {
            path: PathBuf::from("main.cpp"),
            report: Report {
                language: Language::Cpp,
                diagnostics: vec![
                    Diagnostic::new("using-namespace-std", Severity::Warning, "Avoid it.")
                        .with_location(Location::new(1, "using namespace std;")),
                    Diagnostic::new("missing-include", Severity::Info, "No includes."),
                ],
                supported: true,
                faulted_rules: Vec::new(),
            },
        }
    }

    #[test]
    fn test_compact_format() {
        let output = CompactFormatter::new().format_report(&cpp_report());
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "main.cpp:1: warning: using-namespace-std: Avoid it.",
                "main.cpp: info: missing-include: No includes.",
            ]
        );
    }

    #[test]
    fn test_compact_skips_sentinels() {
        let reports = vec![
            cpp_report(),
            FileReport {
                path: PathBuf::from("notes.txt"),
                report: Report::unsupported(Language::Unknown),
            },
        ];
        let result = LintResult::from_reports(reports, Duration::from_millis(1));

        let output = CompactFormatter::new().format(&result);
        assert_eq!(output.lines().count(), 2);
        assert!(!output.contains("notes.txt"));
    }
}
