//! Rule engine
//!
//! Evaluates a parser's rules in declared order. Each rule runs behind its
//! own unwind boundary, so a rule that panics on odd input loses only its
//! own findings.
//!
//! The unwind boundary does not silence the process panic hook: with the
//! default hook, each faulting rule still prints its `thread '..' panicked`
//! line to stderr next to the `warn!` record. Embedders that want quiet
//! faults install their own hook with [`std::panic::set_hook`].

use crate::config::RulesConfig;
use crate::diagnostic::{Diagnostic, Location, Severity};
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule};
use code_detector::Language;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

/// Which rules to skip and which severities to override.
///
/// Ids may be plain (`no-var`, every language) or qualified with the
/// language (`typescript/no-var`).
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    disabled: HashSet<String>,
    severity: HashMap<String, Severity>,
}

impl RuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from the `rules` section of the configuration
    pub fn from_config(config: &RulesConfig) -> Self {
        Self {
            disabled: config.disabled.iter().cloned().collect(),
            severity: config.severity.clone(),
        }
    }

    /// Disable a rule
    pub fn disable(mut self, id: &str) -> Self {
        self.disabled.insert(id.to_string());
        self
    }

    /// Override a rule's severity
    pub fn with_severity(mut self, id: &str, severity: Severity) -> Self {
        self.severity.insert(id.to_string(), severity);
        self
    }

    /// Check if a rule is enabled for the given language
    pub fn is_enabled(&self, language: Language, rule_id: &str) -> bool {
        !self.disabled.contains(rule_id) && !self.disabled.contains(&qualified(language, rule_id))
    }

    /// Effective severity of a rule; the qualified override wins
    pub fn severity_for(&self, language: Language, rule: &Rule) -> Severity {
        self.severity
            .get(&qualified(language, rule.id))
            .or_else(|| self.severity.get(rule.id))
            .copied()
            .unwrap_or(rule.severity)
    }
}

/// `language/rule-id`
pub fn qualified(language: Language, rule_id: &str) -> String {
    format!("{}/{}", language.as_str(), rule_id)
}

/// Outcome of running one parser
#[derive(Debug, Clone, Default)]
pub struct RuleRun {
    /// Diagnostics in rule order, or the clean-run sentinel
    pub diagnostics: Vec<Diagnostic>,
    /// Ids of rules that panicked and were dropped
    pub faulted: Vec<String>,
}

/// Run every enabled rule of `parser` over `text`.
///
/// A panicking rule is reported through the panic hook and a `warn!` log,
/// then listed in [`RuleRun::faulted`].
pub fn run_rules<P>(parser: &P, text: &str, filter: &RuleFilter) -> RuleRun
where
    P: LanguageParser + ?Sized,
{
    let language = parser.language();
    let mut run = RuleRun::default();

    for rule in parser.rules() {
        if !filter.is_enabled(language, rule.id) {
            log::debug!("Skipping disabled rule {}", qualified(language, rule.id));
            continue;
        }

        let findings = match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(text))) {
            Ok(findings) => findings,
            Err(_) => {
                log::warn!(
                    "Rule {} failed on this input; its findings are dropped",
                    qualified(language, rule.id)
                );
                run.faulted.push(rule.id.to_string());
                continue;
            }
        };

        let severity = filter.severity_for(language, rule);
        run.diagnostics
            .extend(findings.into_iter().map(|f| to_diagnostic(rule.id, severity, f)));
    }

    if run.diagnostics.is_empty() {
        run.diagnostics.push(Diagnostic::clean(&parser.clean_message()));
    }
    run
}

fn to_diagnostic(rule_id: &str, severity: Severity, finding: Finding) -> Diagnostic {
    let diag = Diagnostic::new(rule_id, severity, &finding.message);
    match finding.line {
        Some(line) => diag.with_location(Location::new(
            line,
            finding.snippet.as_deref().unwrap_or_default(),
        )),
        None => diag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Finding;

    struct TestParser {
        rules: Vec<Rule>,
    }

    impl LanguageParser for TestParser {
        fn language(&self) -> Language {
            Language::Go
        }

        fn rules(&self) -> &[Rule] {
            &self.rules
        }
    }

    fn first(text: &str) -> Vec<Finding> {
        if text.contains('a') {
            vec![Finding::new("first-1"), Finding::new("first-2")]
        } else {
            Vec::new()
        }
    }

    fn second(text: &str) -> Vec<Finding> {
        if text.contains('b') {
            vec![Finding::at(2, "b", "second")]
        } else {
            Vec::new()
        }
    }

    fn boom(text: &str) -> Vec<Finding> {
        let index = text.len() + 10;
        vec![Finding::new(&text[index..])]
    }

    fn parser() -> TestParser {
        TestParser {
            rules: vec![
                Rule::new("first", "first rule", first),
                Rule::new("boom", "always panics", boom),
                Rule::new("second", "second rule", second).with_severity(Severity::Error),
            ],
        }
    }

    #[test]
    fn test_rule_order_is_emission_order() {
        let run = run_rules(&parser(), "b a", &RuleFilter::default());
        let messages: Vec<_> = run.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first-1", "first-2", "second"]);
    }

    #[test]
    fn test_faulting_rule_is_isolated() {
        let run = run_rules(&parser(), "ab", &RuleFilter::default());
        assert_eq!(run.faulted, vec!["boom".to_string()]);
        assert_eq!(run.diagnostics.len(), 3);
        assert!(run.diagnostics.iter().all(|d| d.rule_id != "boom"));
    }

    #[test]
    fn test_clean_run_sentinel() {
        let run = run_rules(&parser(), "xyz", &RuleFilter::default());
        assert_eq!(run.diagnostics.len(), 1);
        assert!(run.diagnostics[0].is_clean_sentinel());
        assert_eq!(run.diagnostics[0].message, "No Go issues found.");
    }

    #[test]
    fn test_location_and_severity_are_stamped() {
        let run = run_rules(&parser(), "b", &RuleFilter::default());
        let diag = &run.diagnostics[0];
        assert_eq!(diag.rule_id, "second");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.line(), Some(2));
    }

    #[test]
    fn test_filter_disables_plain_and_qualified_ids() {
        let filter = RuleFilter::new().disable("first").disable("go/second");
        let run = run_rules(&parser(), "ab", &filter);
        assert_eq!(run.diagnostics.len(), 1);
        assert!(run.diagnostics[0].is_clean_sentinel());

        // Qualified ids for another language do not apply
        let filter = RuleFilter::new().disable("php/first");
        let run = run_rules(&parser(), "a", &filter);
        assert_eq!(run.diagnostics.len(), 2);
    }

    #[test]
    fn test_filter_severity_override() {
        let filter = RuleFilter::new()
            .with_severity("first", Severity::Info)
            .with_severity("go/second", Severity::Warning);
        let run = run_rules(&parser(), "ab", &filter);
        assert_eq!(run.diagnostics[0].severity, Severity::Info);
        assert_eq!(run.diagnostics[2].severity, Severity::Warning);
    }

    #[test]
    fn test_parser_run_uses_empty_filter() {
        let diagnostics = parser().run("a");
        assert_eq!(diagnostics.len(), 2);
    }
}
