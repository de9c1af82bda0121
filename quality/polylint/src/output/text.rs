//! Human-readable text output formatter

use super::OutputFormatter;
use crate::diagnostic::{Diagnostic, Severity};
use crate::linter::{FileReport, LintResult};
use colored::*;

/// Text formatter with optional color support
pub struct TextFormatter {
    /// Enable colored output
    pub colored: bool,

    /// Show the offending source line under each finding
    pub show_source: bool,

    /// Show statistics
    pub show_stats: bool,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            colored: true,
            show_source: true,
            show_stats: true,
        }
    }
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable colors
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Hide the statistics footer
    pub fn without_stats(mut self) -> Self {
        self.show_stats = false;
        self
    }

    fn severity_str(&self, severity: Severity) -> ColoredString {
        let s = format!("{}", severity);
        if !self.colored {
            return s.normal();
        }
        match severity {
            Severity::Error => s.red().bold(),
            Severity::Warning => s.yellow().bold(),
            Severity::Info => s.blue(),
        }
    }

    fn paint(&self, text: &str, paint: fn(&str) -> ColoredString) -> String {
        if self.colored {
            paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_diagnostic(&self, diag: &Diagnostic) -> String {
        let position = match diag.line() {
            Some(line) => format!("{:>4}", line),
            None => "   -".to_string(),
        };

        let mut output = format!(
            "{}: {}[{}]: {}\n",
            position,
            self.severity_str(diag.severity),
            self.paint(&diag.rule_id, |s| s.cyan()),
            diag.message
        );

        if self.show_source {
            if let Some(location) = &diag.location {
                output.push_str(&format!(
                    "     {} {}\n",
                    self.paint("|", |s| s.blue()),
                    location.snippet
                ));
            }
        }

        output
    }

    fn count_str(
        &self,
        count: usize,
        singular: &str,
        plural: &str,
        paint: fn(&str) -> ColoredString,
    ) -> Option<String> {
        if count == 0 {
            return None;
        }
        let s = format!("{} {}", count, if count == 1 { singular } else { plural });
        Some(self.paint(&s, paint))
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();

        for report in &result.reports {
            output.push_str(&self.format_report(report));
            output.push('\n');
        }

        if self.show_stats {
            output.push_str(&format!(
                "{} {} processed",
                result.files_processed,
                if result.files_processed == 1 {
                    "file"
                } else {
                    "files"
                }
            ));

            let counts: Vec<String> = [
                self.count_str(result.error_count, "error", "errors", |s| s.red()),
                self.count_str(result.warning_count, "warning", "warnings", |s| s.yellow()),
                self.count_str(result.info_count, "info", "infos", |s| s.blue()),
            ]
            .into_iter()
            .flatten()
            .collect();

            if !counts.is_empty() {
                output.push_str(&format!(": {}", counts.join(", ")));
            }
            output.push('\n');

            output.push_str(&format!(
                "Finished in {:.2}s\n",
                result.duration.as_secs_f64()
            ));
        }

        output
    }

    fn format_report(&self, file: &FileReport) -> String {
        let report = &file.report;
        let header = format!("{} ({})", file.path.display(), report.language.display_name());
        let mut output = format!("{}\n", self.paint(&header, |s| s.underline()));

        if report.findings().next().is_none() {
            // Sentinel only
            output.push_str(&format!(
                "     {}\n",
                self.paint(&report.to_display_string(), |s| s.dimmed())
            ));
        } else {
            for diag in report.findings() {
                output.push_str(&self.format_diagnostic(diag));
            }
        }

        for rule in &report.faulted_rules {
            output.push_str(&format!(
                "     {} rule {} failed on this input and was skipped\n",
                self.paint("note:", |s| s.magenta()),
                rule
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Location;
    use crate::report::{Report, CLEAN_DISPLAY, UNSUPPORTED_DISPLAY};
    use code_detector::Language;
    use std::path::PathBuf;
    use std::time::Duration;

    fn file_report(path: &str, report: Report) -> FileReport {
        FileReport {
            path: PathBuf::from(path),
            report,
        }
    }

    #[test]
    fn test_format_finding() {
        let formatter = TextFormatter::new().without_color();
        let report = Report {
            language: Language::Php,
            diagnostics: vec![Diagnostic::new(
                "variable-naming",
                Severity::Warning,
                "Variable name \"$Foo\" should follow snake_case convention.",
            )
            .with_location(Location::new(2, "$Foo = 1;"))],
            supported: true,
            faulted_rules: vec!["echo-output".to_string()],
        };

        let output = formatter.format_report(&file_report("index.php", report));
        assert!(output.starts_with("index.php (PHP)\n"));
        assert!(output.contains("   2: warning[variable-naming]: Variable name"));
        assert!(output.contains("| $Foo = 1;"));
        assert!(output.contains("rule echo-output failed"));
    }

    #[test]
    fn test_format_sentinels() {
        let formatter = TextFormatter::new().without_color();

        let unsupported =
            formatter.format_report(&file_report("a.txt", Report::unsupported(Language::Unknown)));
        assert!(unsupported.contains(UNSUPPORTED_DISPLAY));

        let clean = Report {
            language: Language::Go,
            diagnostics: vec![Diagnostic::clean("No Go issues found.")],
            supported: true,
            faulted_rules: Vec::new(),
        };
        assert!(formatter.format_report(&file_report("main.go", clean)).contains(CLEAN_DISPLAY));
    }

    #[test]
    fn test_format_result_stats() {
        let formatter = TextFormatter::new().without_color();
        let result = LintResult {
            reports: vec![file_report("a.txt", Report::unsupported(Language::Unknown))],
            files_processed: 1,
            error_count: 2,
            warning_count: 1,
            duration: Duration::from_millis(10),
            ..Default::default()
        };

        let output = formatter.format(&result);
        assert!(output.contains("1 file processed: 2 errors, 1 warning"));
        assert!(output.contains("Finished in 0.01s"));
    }

    #[test]
    fn test_without_stats() {
        let formatter = TextFormatter::new().without_color().without_stats();
        let output = formatter.format(&LintResult::default());
        assert!(output.is_empty());
    }
}
