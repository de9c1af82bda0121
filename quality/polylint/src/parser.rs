//! The language parser capability
//!
//! A language parser owns the ordered rule set for one language. Running it
//! evaluates every rule in declared order and concatenates their diagnostics.

use crate::diagnostic::Diagnostic;
use crate::engine::{run_rules, RuleFilter};
use crate::rule::Rule;
use code_detector::Language;

/// Per-language rule set with a single entry point
pub trait LanguageParser: Send + Sync {
    /// Language this parser lints
    fn language(&self) -> Language;

    /// Rules in emission order
    fn rules(&self) -> &[Rule];

    /// Message of the sentinel returned when no rule fires
    fn clean_message(&self) -> String {
        format!("No {} issues found.", self.language().display_name())
    }

    /// Run every rule over `text`.
    ///
    /// Never returns an empty list: a clean run yields the single
    /// clean-run sentinel.
    fn run(&self, text: &str) -> Vec<Diagnostic> {
        run_rules(self, text, &RuleFilter::default()).diagnostics
    }

    /// Look up a rule by id
    fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules().iter().find(|r| r.id == id)
    }
}
