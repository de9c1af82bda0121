//! Display-string formatter: one line per input, the same text
//! [`Report::to_display_string`](crate::report::Report::to_display_string) produces.

use super::OutputFormatter;
use crate::linter::{FileReport, LintResult};

#[derive(Default)]
pub struct PlainFormatter {
    /// Prefix each line with the input path
    pub show_path: bool,
}

impl PlainFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix each line with `path: `
    pub fn with_path(mut self) -> Self {
        self.show_path = true;
        self
    }
}

impl OutputFormatter for PlainFormatter {
    fn format(&self, result: &LintResult) -> String {
        let mut output = String::new();
        for report in &result.reports {
            output.push_str(&self.format_report(report));
            output.push('\n');
        }
        output
    }

    fn format_report(&self, report: &FileReport) -> String {
        let line = report.report.to_display_string();
        if self.show_path {
            format!("{}: {}", report.path.display(), line)
        } else {
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Report, UNSUPPORTED_DISPLAY};
    use code_detector::Language;
    use std::path::PathBuf;
    use std::time::Duration;

    fn unsupported(path: &str) -> FileReport {
        FileReport {
            path: PathBuf::from(path),
            report: Report::unsupported(Language::Unknown),
        }
    }

    #[test]
    fn test_plain_report() {
        let output = PlainFormatter::new().format_report(&unsupported("a.txt"));
        assert_eq!(output, UNSUPPORTED_DISPLAY);
    }

    #[test]
    fn test_plain_with_path() {
        let output = PlainFormatter::new().with_path().format_report(&unsupported("a.txt"));
        assert_eq!(output, format!("a.txt: {}", UNSUPPORTED_DISPLAY));
    }

    #[test]
    fn test_plain_one_line_per_input() {
        let result = LintResult::from_reports(
            vec![unsupported("a.txt"), unsupported("b.txt")],
            Duration::ZERO,
        );
        assert_eq!(PlainFormatter::new().format(&result).lines().count(), 2);
    }
}
