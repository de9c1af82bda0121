//! Polylint - Heuristic Multi-Language Linter
//!
//! Guesses the language of a source snippet from textual signatures and runs
//! a fixed, ordered set of pattern rules for that language. Rules are
//! line- and regex-based heuristics; no input is ever parsed into a syntax
//! tree, and no input is ever rejected.
//!
//! # Architecture
//!
//! ```text
//! CLI/API -> Linter -> code_detector::detect -> ParserRegistry -> LanguageParser -> Rule
//! ```
//!
//! Every call yields a [`Report`]: the findings in rule order, the clean-run
//! sentinel, or the unsupported-language sentinel. [`Report::to_display_string`]
//! reduces it to one line.
//!
//! ```
//! assert_eq!(polylint::lint_to_display_string(""), "Unsupported language or no issues found");
//! assert_eq!(polylint::detect_language("<?php echo 1;"), polylint::Language::Php);
//! ```

pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod linter;
pub mod output;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod report;
pub mod rule;
mod scan;

use std::sync::LazyLock;

// Re-export main types
pub use code_detector::Language;
pub use config::{ColorMode, Config, ConfigError, OutputFormat};
pub use diagnostic::{Diagnostic, Location, Severity};
pub use engine::RuleFilter;
pub use linter::{FileReport, LintResult, Linter};
pub use output::{CompactFormatter, JsonFormatter, OutputFormatter, PlainFormatter, TextFormatter};
pub use parser::LanguageParser;
pub use registry::ParserRegistry;
pub use report::{Report, CLEAN_DISPLAY, UNSUPPORTED_DISPLAY};
pub use rule::{Finding, Rule, RuleCategory};

static DEFAULT_LINTER: LazyLock<Linter> = LazyLock::new(Linter::default);

/// Classify a snippet with the ordered signature checks
pub fn detect_language(text: &str) -> Language {
    code_detector::detect(text)
}

/// Lint a snippet with the built-in parsers and default configuration
pub fn lint(text: &str) -> Report {
    DEFAULT_LINTER.lint(text)
}

/// Lint a snippet and reduce the result to one line
pub fn lint_to_display_string(text: &str) -> String {
    DEFAULT_LINTER.lint_to_display_string(text)
}
