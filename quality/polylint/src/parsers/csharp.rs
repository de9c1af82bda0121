//! C# rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::sync::LazyLock;

static NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnamespace\s+[\w.]+").unwrap());

static USING_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*using\s+(?:static\s+)?[\w.]+\s*;").unwrap());

static MAIN_METHOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bMain\s*\(").unwrap());

static VARIABLE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:var|int|long|float|double|decimal|string|bool)\s+([A-Za-z_]\w*)\s*(?:=|;)")
        .unwrap()
});

static ASYNC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\basync\s+[\w<>\[\],]+\s+(\w+)\s*\([^)]*\)\s*\{([^}]*)\}").unwrap()
});

static AWAIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bawait\b").unwrap());

static EMPTY_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:void|int|bool|string|float|double|Task)\s+(\w+)\s*\([^)]*\)\s*\{\s*\}")
        .unwrap()
});

static CONTROL_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:else\s+)?(?:if|for|foreach|while)\s*\(").unwrap()
});

static METHOD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|private|protected|internal|static|async|override|virtual|abstract|sealed|new)[ \t]+)*)([\w<>\[\],.?]+)[ \t]+(\w+)[ \t]*\([^)\n]*\)[ \t]*(?:\{.*)?$",
    )
    .unwrap()
});

static ACCESS_MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:public|private|protected|internal)\b").unwrap());

static EMPTY_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+(\w+)[^{;]*\{\s*\}").unwrap());

static CATCH_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcatch\s*\(\s*[\w.]+\s+(\w+)\s*\)\s*\{([^}]*)\}").unwrap()
});

/// C# parser
pub struct CSharpParser {
    rules: Vec<Rule>,
}

impl CSharpParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("require-namespace", "Code belongs in a namespace", check_namespace),
                Rule::new("require-using", "Import namespaces with using", check_using)
                    .with_severity(Severity::Info),
                Rule::new("require-main", "Applications need a Main method", check_main)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("unused-variable", "Declared variables should be used", check_unused_variables)
                    .with_category(RuleCategory::Suspicious),
                Rule::new(
                    "async-without-await",
                    "async methods should await something",
                    check_async_without_await,
                )
                .with_category(RuleCategory::Suspicious),
                Rule::new("magic-number", "Use named constants for numeric literals", check_magic_numbers)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
                Rule::new("empty-method", "Methods should have a body", check_empty_methods),
                Rule::new(
                    "control-braces",
                    "Control statements should use braces",
                    check_control_braces,
                ),
                Rule::new(
                    "method-access-modifier",
                    "Methods should declare their accessibility",
                    check_method_access,
                )
                .with_severity(Severity::Info)
                .with_category(RuleCategory::Convention),
                Rule::new("empty-class", "Classes should have members", check_empty_classes),
                Rule::new(
                    "unused-exception-variable",
                    "Caught exceptions should be used or unnamed",
                    check_unused_exception_variables,
                )
                .with_category(RuleCategory::Suspicious),
            ],
        }
    }
}

impl Default for CSharpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for CSharpParser {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_namespace(text: &str) -> Vec<Finding> {
    if NAMESPACE.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("C# programs should be inside a namespace.")]
    }
}

fn check_using(text: &str) -> Vec<Finding> {
    if USING_DIRECTIVE.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new(
            "Consider importing necessary namespaces using \"using\" statements.",
        )]
    }
}

fn check_main(text: &str) -> Vec<Finding> {
    if MAIN_METHOD.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("C# applications should have a \"static void Main\" method.")]
    }
}

fn check_unused_variables(text: &str) -> Vec<Finding> {
    VARIABLE_DECL
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

fn check_async_without_await(text: &str) -> Vec<Finding> {
    ASYNC_METHOD
        .captures_iter(text)
        .filter(|caps| !AWAIT.is_match(caps.get(2).map_or("", |m| m.as_str())))
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Async method \"{}\" has no await statement.", name.as_str()),
            )
        })
        .collect()
}

fn check_magic_numbers(text: &str) -> Vec<Finding> {
    let mut literals: Vec<&str> = Vec::new();
    for (_, literal) in scan::numeric_literals(text) {
        if !literals.contains(&literal) {
            literals.push(literal);
        }
    }
    if literals.is_empty() {
        return Vec::new();
    }
    vec![Finding::new(format!(
        "Avoid using magic numbers ({}). Use named constants instead.",
        literals.join(", ")
    ))]
}

fn check_empty_methods(text: &str) -> Vec<Finding> {
    EMPTY_METHOD
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(text, name.start(), format!("Empty method detected: {}", name.as_str()))
        })
        .collect()
}

fn check_control_braces(text: &str) -> Vec<Finding> {
    let lines: Vec<&str> = text.lines().collect();
    let mut findings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !CONTROL_HEADER.is_match(line) || line.contains('{') {
            continue;
        }
        let next_opens_block = lines[index + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .is_some_and(|l| l.starts_with('{'));
        if !next_opens_block {
            findings.push(Finding::at(
                index + 1,
                line.trim(),
                format!("Missing curly braces for control structure at line {}.", index + 1),
            ));
        }
    }
    findings
}

fn check_method_access(text: &str) -> Vec<Finding> {
    METHOD_DECL
        .captures_iter(text)
        .filter(|caps| {
            let return_type = caps.get(2).map_or("", |m| m.as_str());
            let name = caps.get(3).map_or("", |m| m.as_str());
            let modifiers = caps.get(1).map_or("", |m| m.as_str());
            !matches!(
                return_type,
                "public" | "private" | "protected" | "internal" | "new" | "return" | "else" | "await" | "throw"
            ) && !matches!(name, "if" | "for" | "foreach" | "while" | "switch" | "catch" | "using" | "lock")
                && !ACCESS_MODIFIER.is_match(modifiers)
        })
        .filter_map(|caps| caps.get(3))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Method \"{}\" should declare an access modifier.", name.as_str()),
            )
        })
        .collect()
}

fn check_empty_classes(text: &str) -> Vec<Finding> {
    EMPTY_CLASS
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(text, name.start(), format!("Empty class detected: {}", name.as_str()))
        })
        .collect()
}

fn check_unused_exception_variables(text: &str) -> Vec<Finding> {
    CATCH_BLOCK
        .captures_iter(text)
        .filter(|caps| {
            let body = caps.get(2).map_or("", |m| m.as_str());
            !scan::is_referenced_elsewhere(body, &caps[1], 0..0)
        })
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Unused exception variable in catch block: {}", name.as_str()),
            )
        })
        .collect()
}
