//! Lint orchestrator
//!
//! Detects the language of an input, resolves its parser from the registry
//! and runs it. Inputs with no parser get the unsupported sentinel; nothing
//! on this path returns an error.

use crate::config::Config;
use crate::diagnostic::{Diagnostic, Severity};
use crate::engine::{run_rules, RuleFilter};
use crate::registry::ParserRegistry;
use crate::report::Report;
use code_detector::Language;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rule id of the diagnostic reported for an unreadable file
pub const FILE_READ_ERROR_ID: &str = "file-read-error";

/// Report for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: Report,
}

/// Result of linting a batch of files
#[derive(Debug, Default)]
pub struct LintResult {
    /// One report per input, in input order
    pub reports: Vec<FileReport>,

    /// Files processed
    pub files_processed: usize,

    /// Total errors
    pub error_count: usize,

    /// Total warnings
    pub warning_count: usize,

    /// Total info messages
    pub info_count: usize,

    /// Processing duration
    pub duration: Duration,
}

impl LintResult {
    /// Tally findings of already linted inputs
    pub fn from_reports(reports: Vec<FileReport>, duration: Duration) -> Self {
        let mut result = Self {
            files_processed: reports.len(),
            duration,
            ..Self::default()
        };
        for diag in reports.iter().flat_map(|r| r.report.findings()) {
            match diag.severity {
                Severity::Error => result.error_count += 1,
                Severity::Warning => result.warning_count += 1,
                Severity::Info => result.info_count += 1,
            }
        }
        result.reports = reports;
        result
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Total findings across all files
    pub fn finding_count(&self) -> usize {
        self.error_count + self.warning_count + self.info_count
    }

    /// Check if result is clean (no findings at all)
    pub fn is_clean(&self) -> bool {
        self.finding_count() == 0
    }
}

/// The lint orchestrator
pub struct Linter {
    registry: Arc<ParserRegistry>,
    config: Config,
    filter: RuleFilter,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(Arc::new(ParserRegistry::builtin()), Config::default())
    }
}

impl Linter {
    /// Create a linter over a registry built at startup
    pub fn new(registry: Arc<ParserRegistry>, config: Config) -> Self {
        let filter = RuleFilter::from_config(&config.rules);
        Self {
            registry,
            config,
            filter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Classify a snippet
    pub fn detect(&self, text: &str) -> Language {
        code_detector::detect(text)
    }

    /// Lint a snippet, detecting its language unless the configuration
    /// forces one
    pub fn lint(&self, text: &str) -> Report {
        let language = match self.config.language {
            Some(language) => language,
            None => self.detect(text),
        };
        self.lint_as(language, text)
    }

    /// Lint a snippet as the given language, skipping detection
    pub fn lint_as(&self, language: Language, text: &str) -> Report {
        let Some(parser) = self.registry.resolve(language) else {
            log::debug!("No parser registered for {}", language);
            return Report::unsupported(language);
        };

        let run = run_rules(parser.as_ref(), text, &self.filter);
        Report {
            language,
            diagnostics: run.diagnostics,
            supported: true,
            faulted_rules: run.faulted,
        }
    }

    /// Lint a snippet and reduce the report to one display line
    pub fn lint_to_display_string(&self, text: &str) -> String {
        self.lint(text).to_display_string()
    }

    /// Lint one file. Content signatures win over the file extension;
    /// `forced` (or the configured language) skips detection.
    pub fn lint_file(&self, path: &Path, forced: Option<Language>) -> FileReport {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                let diag = Diagnostic::new(
                    FILE_READ_ERROR_ID,
                    Severity::Error,
                    &format!("Failed to read file: {}", e),
                );
                return FileReport {
                    path: path.to_path_buf(),
                    report: Report {
                        language: forced.unwrap_or_default(),
                        diagnostics: vec![diag],
                        supported: false,
                        faulted_rules: Vec::new(),
                    },
                };
            }
        };

        let language = match forced.or(self.config.language) {
            Some(language) => language,
            None => {
                let detection = code_detector::detect_with_path(path, &content);
                log::debug!(
                    "{}: detected {} ({})",
                    path.display(),
                    detection.language,
                    detection.reason
                );
                detection.language
            }
        };

        FileReport {
            path: path.to_path_buf(),
            report: self.lint_as(language, &content),
        }
    }

    /// Lint many files, in parallel unless disabled. Reports keep input order.
    pub fn lint_files(&self, files: &[PathBuf], forced: Option<Language>) -> LintResult {
        let start = Instant::now();

        let reports: Vec<FileReport> = if self.config.engine.parallel && files.len() > 1 {
            let threads = if self.config.engine.jobs > 0 {
                self.config.engine.jobs
            } else {
                num_cpus::get()
            };
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(|| {
                    files
                        .par_iter()
                        .map(|f| self.lint_file(f, forced))
                        .collect()
                }),
                Err(e) => {
                    log::warn!("Could not start thread pool, linting sequentially: {}", e);
                    files.iter().map(|f| self.lint_file(f, forced)).collect()
                }
            }
        } else {
            files.iter().map(|f| self.lint_file(f, forced)).collect()
        };

        LintResult::from_reports(reports, start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CLEAN_DISPLAY, UNSUPPORTED_DISPLAY};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lint_detects_language() {
        let linter = Linter::default();
        let report = linter.lint("using namespace std;\nint main(){return 0;}");
        assert_eq!(report.language, Language::Cpp);
        assert!(report.supported);
        assert_eq!(report.diagnostics[0].rule_id, "using-namespace-std");
    }

    #[test]
    fn test_lint_unknown_is_unsupported() {
        let linter = Linter::default();
        let report = linter.lint("");
        assert_eq!(report.language, Language::Unknown);
        assert!(!report.supported);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].is_unsupported_sentinel());
        assert_eq!(linter.lint_to_display_string(""), UNSUPPORTED_DISPLAY);
    }

    #[test]
    fn test_unregistered_language_is_unsupported() {
        let linter = Linter::new(Arc::new(ParserRegistry::new()), Config::default());
        let report = linter.lint("package main\nfunc main() {\n}");
        assert_eq!(report.language, Language::Go);
        assert!(!report.supported);
    }

    #[test]
    fn test_configured_language_skips_detection() {
        let config = Config {
            language: Some(Language::Html),
            ..Config::default()
        };
        let linter = Linter::new(Arc::new(ParserRegistry::builtin()), config);
        assert_eq!(linter.lint("let a = 1;").language, Language::Html);
    }

    #[test]
    fn test_disabled_rules_from_config() {
        let mut config = Config::default();
        config.rules.disabled = vec!["echo-output".to_string(), "php/variable-naming".to_string()];
        let linter = Linter::new(Arc::new(ParserRegistry::builtin()), config);
        let report = linter.lint("<?php\n$Foo = 1;");
        assert!(report.is_clean());
        assert_eq!(report.to_display_string(), CLEAN_DISPLAY);
    }

    #[test]
    fn test_lint_files_keeps_order_and_counts() {
        let dir = TempDir::new().unwrap();
        let go = dir.path().join("main.go");
        let php = dir.path().join("index.php");
        let missing = dir.path().join("missing.py");
        fs::write(&go, "package main\nfunc main() {\n fmt.Println(\"hi\")\n}").unwrap();
        fs::write(&php, "<?php\n$Foo = 1;").unwrap();

        let files = vec![go.clone(), php.clone(), missing.clone()];
        let result = Linter::default().lint_files(&files, None);

        let paths: Vec<_> = result.reports.iter().map(|r| r.path.clone()).collect();
        assert_eq!(paths, files);
        assert_eq!(result.files_processed, 3);
        assert!(result.reports[0].report.is_clean());
        assert_eq!(result.reports[1].report.language, Language::Php);
        assert_eq!(result.reports[2].report.diagnostics[0].rule_id, FILE_READ_ERROR_ID);

        // echo-output (info), variable-naming (warning), read failure (error)
        assert_eq!(result.info_count, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.error_count, 1);
        assert!(result.has_errors());
    }

    #[test]
    fn test_lint_file_falls_back_to_extension() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("index.html");
        fs::write(&page, "<p>hello</p>").unwrap();

        let report = Linter::default().lint_file(&page, None);
        assert_eq!(report.report.language, Language::Html);
        assert!(report.report.supported);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("f{}.js", i));
                fs::write(&path, format!("var x{} = {};", i, i)).unwrap();
                path
            })
            .collect();

        let mut config = Config::default();
        config.engine.parallel = false;
        let sequential = Linter::new(Arc::new(ParserRegistry::builtin()), config).lint_files(&files, None);
        let parallel = Linter::default().lint_files(&files, None);
        assert_eq!(sequential.reports, parallel.reports);
    }
}
