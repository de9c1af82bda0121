//! JavaScript rules, modelled on common ESLint checks

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static VAR_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bvar\s+[\w$]").unwrap());

static USE_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]use strict['"]"#).unwrap());

static CONSOLE_LOG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bconsole\.log\b").unwrap());

static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:let|const|var)\s+([A-Za-z_]\w*)").unwrap());

static CALL_OR_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\s*\(([^()]*)\)").unwrap());

static IMPORT_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+.*?\s+from\s+['"]([^'"]+)['"]"#).unwrap()
});

static EVAL_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\beval\s*\(").unwrap());

static BARE_RETURN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breturn\s*;").unwrap());

static VALUE_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\s+[^;\s}]").unwrap());

const MAX_PARAMS: usize = 5;
const MAX_NESTING: usize = 3;

/// ESLint-style JavaScript parser
pub struct JavaScriptParser {
    rules: Vec<Rule>,
}

impl JavaScriptParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("no-var", "Prefer let/const over var", check_no_var),
                Rule::new("semicolon", "Statements should end with a semicolon", check_semicolon)
                    .with_severity(Severity::Info),
                Rule::new("use-strict", "Scripts should opt into strict mode", check_use_strict)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
                Rule::new("no-console", "console.log left in code", check_no_console),
                Rule::new("no-unused-vars", "Declared variables should be used", check_unused_vars)
                    .with_category(RuleCategory::Suspicious),
                Rule::new(
                    "inconsistent-indentation",
                    "Lines should share the first line's indentation",
                    scan::inconsistent_indentation,
                )
                .with_category(RuleCategory::Convention),
                Rule::new("eqeqeq", "Use strict equality operators", check_eqeqeq)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("no-unreachable", "Code after return never runs", check_unreachable)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("max-params", "Functions should take at most five parameters", check_max_params),
                Rule::new("no-duplicate-imports", "Import each module once", check_duplicate_imports),
                Rule::new("max-nested-blocks", "Limit block nesting depth", check_nested_blocks)
                    .with_severity(Severity::Info),
                Rule::new("no-eval", "eval() executes arbitrary code", check_no_eval)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new(
                    "consistent-return",
                    "Either always or never return a value",
                    check_consistent_return,
                )
                .with_category(RuleCategory::Suspicious),
            ],
        }
    }
}

impl Default for JavaScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for JavaScriptParser {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_no_var(text: &str) -> Vec<Finding> {
    if VAR_DECL.is_match(text) {
        vec![Finding::new("Avoid using `var`. Use `let` or `const` instead.")]
    } else {
        Vec::new()
    }
}

fn check_semicolon(text: &str) -> Vec<Finding> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.ends_with(';')
        || trimmed.ends_with('}')
    {
        return Vec::new();
    }
    vec![Finding::new("Consider adding semicolons for consistency.")]
}

fn check_use_strict(text: &str) -> Vec<Finding> {
    if USE_STRICT.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new(
            "Consider adding \"use strict\" at the beginning of your code.",
        )]
    }
}

fn check_no_console(text: &str) -> Vec<Finding> {
    CONSOLE_LOG
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Avoid using `console.log` in production code."))
        .collect()
}

fn check_unused_vars(text: &str) -> Vec<Finding> {
    DECLARATION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| !scan::is_referenced_elsewhere(text, name.as_str(), name.range()))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Unused variable detected: {}", name.as_str()),
            )
        })
        .collect()
}

fn check_eqeqeq(text: &str) -> Vec<Finding> {
    scan::loose_equality(text)
        .into_iter()
        .map(|(offset, op)| {
            let message = if op == "==" {
                "Avoid using `==` for equality check. Use `===` for strict equality."
            } else {
                "Avoid using `!=` for inequality check. Use `!==` for strict inequality."
            };
            scan::finding_at(text, offset, message)
        })
        .collect()
}

fn check_unreachable(text: &str) -> Vec<Finding> {
    scan::unreachable_after_return(text)
        .into_iter()
        .map(|offset| scan::finding_at(text, offset, "Unreachable code detected after return statement."))
        .collect()
}

fn check_max_params(text: &str) -> Vec<Finding> {
    CALL_OR_SIGNATURE
        .captures_iter(text)
        .filter(|caps| {
            caps.get(1)
                .map(|params| params.as_str().split(',').filter(|p| !p.trim().is_empty()).count())
                .unwrap_or(0)
                > MAX_PARAMS
        })
        .filter_map(|caps| caps.get(0))
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                format!("Function has too many parameters: {}", scan::excerpt(m.as_str(), 30)),
            )
        })
        .collect()
}

fn check_duplicate_imports(text: &str) -> Vec<Finding> {
    let mut seen = HashSet::new();
    IMPORT_FROM
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|source| !seen.insert(source.as_str()))
        .map(|source| {
            scan::finding_at(
                text,
                source.start(),
                format!("Duplicate import detected: '{}'", source.as_str()),
            )
        })
        .collect()
}

fn check_nested_blocks(text: &str) -> Vec<Finding> {
    let depth = scan::max_brace_depth(text);
    if depth > MAX_NESTING {
        vec![Finding::new(format!(
            "Too many nested blocks (depth {}). Consider simplifying.",
            depth
        ))]
    } else {
        Vec::new()
    }
}

fn check_no_eval(text: &str) -> Vec<Finding> {
    EVAL_CALL
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Avoid using `eval()`. It can introduce security risks."))
        .collect()
}

fn check_consistent_return(text: &str) -> Vec<Finding> {
    if BARE_RETURN.is_match(text) && VALUE_RETURN.is_match(text) {
        vec![Finding::new(
            "Inconsistent return: some paths return a value and others return nothing.",
        )]
    } else {
        Vec::new()
    }
}
