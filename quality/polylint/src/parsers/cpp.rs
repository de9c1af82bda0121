//! C++ rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static USING_STD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\busing\s+namespace\s+std\s*;").unwrap());

static VALUE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:int|long|float|double|char|bool)\s+(\w+)\s*\([^)]*\)\s*(?:const\s*)?\{([^}]*)\}")
        .unwrap()
});

static RETURN_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\breturn\b").unwrap());

static DECL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:const\s+|static\s+)*(?:int|long|float|double|char|bool|string|auto)\s+\w+")
        .unwrap()
});

static CONTROL_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:if|for|while|switch)\b").unwrap());

static GLOBAL_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:static\s+)?(?:int|long|float|double|char|bool|string)\s+(\w+)\s*(?:=[^;(]*)?;")
        .unwrap()
});

static UNINITIALIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:int|long|float|double|char|bool|string)\s+(\w+)\s*;").unwrap()
});

static INCLUDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"#include\s*[<"]"#).unwrap());

static VARIABLE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:int|long|float|double|char|bool|string|auto)\s+([A-Za-z_]\w*)\s*(?:=|;|\[)")
        .unwrap()
});

static EMPTY_CATCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcatch\s*\([^)]*\)\s*\{\s*\}").unwrap());

static NEW_EXPR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bnew\s+\w").unwrap());

static DELETE_EXPR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bdelete\b").unwrap());

static EMPTY_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\w+\s+(\w+)\s*\([^)]*\)\s*(?:const\s*)?\{\s*\}").unwrap()
});

static CONST_WITHOUT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bconst\s+\w+\s+(\w+)\s*;").unwrap());

/// C++ parser
pub struct CppParser {
    rules: Vec<Rule>,
}

impl CppParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "using-namespace-std",
                    "Avoid importing all of std into the global namespace",
                    check_using_namespace_std,
                ),
                Rule::new(
                    "missing-return",
                    "Value-returning functions should return a value",
                    check_missing_return,
                )
                .with_severity(Severity::Error)
                .with_category(RuleCategory::Correctness),
                Rule::new(
                    "missing-semicolon",
                    "Declarations should end with a semicolon",
                    check_missing_semicolon,
                ),
                Rule::new("global-variable", "Avoid mutable global state", check_global_variables)
                    .with_category(RuleCategory::Suspicious),
                Rule::new(
                    "uninitialized-variable",
                    "Initialize variables where they are declared",
                    check_uninitialized,
                )
                .with_category(RuleCategory::Suspicious),
                Rule::new("magic-number", "Use named constants for numeric literals", check_magic_numbers)
                    .with_category(RuleCategory::Pedantic),
                Rule::new("missing-include", "Include the headers you depend on", check_includes)
                    .with_severity(Severity::Info),
                Rule::new("unused-variable", "Declared variables should be used", check_unused_variables)
                    .with_category(RuleCategory::Suspicious),
                Rule::new(
                    "inconsistent-indentation",
                    "Lines should share the first line's indentation",
                    scan::inconsistent_indentation,
                )
                .with_category(RuleCategory::Convention),
                Rule::new("empty-catch", "Do not swallow exceptions", check_empty_catch)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("memory-leak", "Every new needs a matching delete", check_memory_leak)
                    .with_category(RuleCategory::Correctness),
                Rule::new("empty-function", "Functions should have a body", check_empty_functions),
                Rule::new("unreachable-code", "Code after return never runs", check_unreachable)
                    .with_category(RuleCategory::Correctness),
                Rule::new("brace-balance", "Opening and closing braces should match", check_brace_balance)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new(
                    "const-initialization",
                    "const variables must be initialized",
                    check_const_initialization,
                )
                .with_category(RuleCategory::Correctness),
            ],
        }
    }
}

impl Default for CppParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for CppParser {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_using_namespace_std(text: &str) -> Vec<Finding> {
    USING_STD
        .find_iter(text)
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "Avoid using `using namespace std;` in the global scope.",
            )
        })
        .collect()
}

fn check_missing_return(text: &str) -> Vec<Finding> {
    VALUE_FUNCTION
        .captures_iter(text)
        .filter(|caps| &caps[1] != "main" && !RETURN_VALUE.is_match(&caps[2]))
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Function \"{}\" is missing a return statement.", name.as_str()),
            )
        })
        .collect()
}

fn check_missing_semicolon(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter(|(_, line)| DECL_LINE.is_match(line) && !CONTROL_KEYWORD.is_match(line))
        .filter(|(_, line)| {
            let trimmed = line.trim_end();
            !(trimmed.ends_with([';', '{', '}', ',', ')']) || trimmed.contains("//"))
        })
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!("Possible missing semicolon at line {}: \"{}\"", number, trimmed),
            )
        })
        .collect()
}

fn check_global_variables(text: &str) -> Vec<Finding> {
    let depths = scan::line_depths(text);
    scan::numbered_lines(text)
        .zip(depths)
        .filter(|(_, depth)| *depth == 0)
        .filter_map(|((number, line), _)| {
            let caps = GLOBAL_DECL.captures(line)?;
            let trimmed = line.trim();
            Some(Finding::at(
                number,
                trimmed,
                format!(
                    "Avoid using global variables: {} at line {}: \"{}\"",
                    &caps[1], number, trimmed
                ),
            ))
        })
        .collect()
}

fn check_uninitialized(text: &str) -> Vec<Finding> {
    UNINITIALIZED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Uninitialized variable detected: {}", name.as_str()),
            )
        })
        .collect()
}

fn check_magic_numbers(text: &str) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut findings = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        // preprocessor lines are where constants get named
        if !line.trim_start().starts_with('#') {
            for (start, literal) in scan::numeric_literals(line) {
                if seen.insert(literal) {
                    findings.push(scan::finding_at(
                        text,
                        offset + start,
                        format!("Avoid using magic number `{}`. Use a named constant instead.", literal),
                    ));
                }
            }
        }
        offset += line.len();
    }
    findings
}

fn check_includes(text: &str) -> Vec<Finding> {
    if INCLUDE.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new(
            "Missing standard library includes. Ensure all required headers are included.",
        )]
    }
}

fn check_unused_variables(text: &str) -> Vec<Finding> {
    VARIABLE_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| !scan::is_referenced_elsewhere(text, name.as_str(), name.range()))
        .map(|name| {
            scan::finding_at(text, name.start(), format!("Unused variable: {}", name.as_str()))
        })
        .collect()
}

fn check_empty_catch(text: &str) -> Vec<Finding> {
    EMPTY_CATCH
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Empty catch block swallows the exception."))
        .collect()
}

fn check_memory_leak(text: &str) -> Vec<Finding> {
    let allocations = NEW_EXPR.find_iter(text).count();
    let releases = DELETE_EXPR.find_iter(text).count();
    if allocations > releases {
        vec![Finding::new(format!(
            "Potential memory leak detected: {} `new` but {} `delete`.",
            allocations, releases
        ))]
    } else {
        Vec::new()
    }
}

fn check_empty_functions(text: &str) -> Vec<Finding> {
    EMPTY_FUNCTION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| !matches!(name.as_str(), "if" | "for" | "while" | "switch" | "catch"))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Empty function detected: {}", name.as_str()),
            )
        })
        .collect()
}

fn check_unreachable(text: &str) -> Vec<Finding> {
    scan::unreachable_after_return(text)
        .into_iter()
        .map(|offset| scan::finding_at(text, offset, "Unreachable code detected after return statement."))
        .collect()
}

fn check_brace_balance(text: &str) -> Vec<Finding> {
    let (open, close) = scan::brace_counts(text);
    if open == close {
        Vec::new()
    } else {
        vec![Finding::new(format!(
            "Braces mismatch detected: {} opening and {} closing.",
            open, close
        ))]
    }
}

fn check_const_initialization(text: &str) -> Vec<Finding> {
    CONST_WITHOUT_VALUE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("const variable \"{}\" must be initialized.", name.as_str()),
            )
        })
        .collect()
}
