//! PHP rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\?php\b").unwrap());

static ECHO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\becho\b").unwrap());

static FUNCTION_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+&?\s*(\w+)\s*\(").unwrap());

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([A-Za-z_]\w*)").unwrap());

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)//[^\n]*|/\*.*?\*/").unwrap());

static TODO_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:TODO|FIXME)\b").unwrap());

static ARRAY_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\barray\s*\(").unwrap());

const SUPERGLOBALS: &[&str] = &[
    "GLOBALS", "_SERVER", "_GET", "_POST", "_FILES", "_COOKIE", "_SESSION", "_REQUEST", "_ENV",
];

/// PHP parser
pub struct PhpParser {
    rules: Vec<Rule>,
}

impl PhpParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("open-tag", "Scripts open with <?php", check_open_tag)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("require-semicolon", "Statements end with semicolons", check_semicolon),
                Rule::new("echo-output", "Use echo for output", check_echo)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
                Rule::new("function-naming", "Function names are snake_case", check_function_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new("variable-naming", "Variable names are snake_case", check_variable_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new("strict-comparison", "Compare with === and !==", check_strict_comparison)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("short-open-tag", "Do not use short open tags", check_short_tags),
                Rule::new("closing-tag", "Omit the trailing ?> tag", check_closing_tag)
                    .with_severity(Severity::Info),
                Rule::new("todo-comment", "Resolve TODO and FIXME comments", check_todo_comments)
                    .with_severity(Severity::Info),
                Rule::new("short-array-syntax", "Use [] instead of array()", check_array_syntax),
            ],
        }
    }
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PhpParser {
    fn language(&self) -> Language {
        Language::Php
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_open_tag(text: &str) -> Vec<Finding> {
    if OPEN_TAG.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("PHP scripts should start with \"<?php\".")]
    }
}

fn check_semicolon(text: &str) -> Vec<Finding> {
    if text.contains(';') {
        Vec::new()
    } else {
        vec![Finding::new("PHP statements should end with a semicolon.")]
    }
}

fn check_echo(text: &str) -> Vec<Finding> {
    if ECHO.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Consider using \"echo\" for output in PHP.")]
    }
}

fn check_function_naming(text: &str) -> Vec<Finding> {
    FUNCTION_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| !scan::is_snake_case(name.as_str()))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Function name \"{}\" should follow snake_case convention.", name.as_str()),
            )
        })
        .collect()
}

fn check_variable_naming(text: &str) -> Vec<Finding> {
    let mut seen = HashSet::new();
    VARIABLE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| {
            let name = name.as_str();
            name != "this" && !SUPERGLOBALS.contains(&name) && !scan::is_snake_case(name)
        })
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Variable name \"${}\" should follow snake_case convention.", name.as_str()),
            )
        })
        .collect()
}

fn check_strict_comparison(text: &str) -> Vec<Finding> {
    scan::loose_equality(text)
        .into_iter()
        .map(|(offset, op)| {
            let message = if op == "==" {
                "Use strict comparison (===) instead of loose comparison (==)."
            } else {
                "Use strict comparison (!==) instead of loose comparison (!=)."
            };
            scan::finding_at(text, offset, message)
        })
        .collect()
}

fn check_short_tags(text: &str) -> Vec<Finding> {
    text.match_indices("<?")
        .filter(|(offset, _)| {
            let rest = &text[offset + 2..];
            !(rest.starts_with("php") || rest.starts_with('=') || rest.starts_with("xml"))
        })
        .map(|(offset, _)| {
            scan::finding_at(
                text,
                offset,
                "Avoid using PHP short tags (\"<?\"). Always use \"<?php\".",
            )
        })
        .collect()
}

fn check_closing_tag(text: &str) -> Vec<Finding> {
    let trimmed = text.trim_end();
    if trimmed.ends_with("?>") {
        vec![scan::finding_at(
            text,
            trimmed.len() - 2,
            "PHP files should omit the closing tag (?>).",
        )]
    } else {
        Vec::new()
    }
}

fn check_todo_comments(text: &str) -> Vec<Finding> {
    COMMENT
        .find_iter(text)
        .filter(|m| TODO_MARKER.is_match(m.as_str()))
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "Resolve or remove TODO/FIXME comments before shipping.",
            )
        })
        .collect()
}

fn check_array_syntax(text: &str) -> Vec<Finding> {
    ARRAY_CALL
        .find_iter(text)
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "Use \"[]\" instead of \"array()\" for array declarations in PHP.",
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_case_variable() {
        let diagnostics = PhpParser::new().run("<?php\n$Foo = 1;");
        let ids: Vec<_> = diagnostics.iter().map(|d| d.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["echo-output", "variable-naming"]);
        assert_eq!(
            diagnostics[1].message,
            "Variable name \"$Foo\" should follow snake_case convention."
        );
        assert_eq!(diagnostics[1].line(), Some(2));
    }

    #[test]
    fn test_clean_script() {
        let code = "<?php\nfunction greet_user($user_name) {\n    echo \"Hello \" . $user_name;\n}\n";
        let diagnostics = PhpParser::new().run(code);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].message, "No PHP issues found.");
    }

    #[test]
    fn test_function_naming() {
        let findings = check_function_naming("function getUser() {}\nfunction get_user() {}");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Function name \"getUser\" should follow snake_case convention."
        );
    }

    #[test]
    fn test_variable_naming_exemptions() {
        let code = "$this->x = $_POST['a'];\n$userName = $GLOBALS['b'];\necho $userName;";
        let findings = check_variable_naming(code);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("$userName"));
    }

    #[test]
    fn test_strict_comparison() {
        let findings = check_strict_comparison("if ($a == $b) {}\nif ($a === $b) {}\nif ($a != 1) {}");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[1].line, Some(3));
    }

    #[test]
    fn test_tags() {
        assert_eq!(check_short_tags("<? echo 1; ?>").len(), 1);
        assert!(check_short_tags("<?php echo 1;\n<?= $a ?>\n<?xml version=\"1.0\"?>").is_empty());

        assert_eq!(check_closing_tag("<?php\necho 1;\n?>\n").len(), 1);
        assert!(check_closing_tag("<?php\necho 1;\n").is_empty());
    }

    #[test]
    fn test_todo_and_array() {
        let code = "<?php\n// TODO: remove\n/* FIXME\n later */\n// fine\n$a = array(1, 2);";
        let todos = check_todo_comments(code);
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[1].line, Some(3));

        assert_eq!(check_array_syntax(code).len(), 1);
        assert!(check_array_syntax("$a = [1, 2];").is_empty());
    }
}
