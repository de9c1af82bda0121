//! Python rules, modelled on common Pylint/PEP 8 checks

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::sync::LazyLock;

static PRINT_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bprint\(.+\)").unwrap());

static DEF_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\((.*)\)\s*(?:->\s*[^:]+)?:\s*$").unwrap()
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+([\w.]+)(?:[ \t]+as[ \t]+(\w+))?[ \t]*$").unwrap()
});

static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*from[ \t]+[\w.]+[ \t]+import[ \t]+([\w \t,]+)$").unwrap()
});

static MULTI_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+[\w.]+\s*,").unwrap());

static GLOBAL_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*(?::[^=]+)?=[^=]").unwrap());

static PAREN_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*return\s+\(.*\)\s*$").unwrap());

static PAREN_IF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:el)?if\s*\(.*\)\s*:").unwrap());

const MAX_LINE_LENGTH: usize = 79;
const INDENT_UNIT: usize = 4;

/// Pylint-style Python parser
pub struct PythonParser {
    rules: Vec<Rule>,
}

impl PythonParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("no-print", "Use logging instead of print", check_no_print),
                Rule::new("missing-docstring", "Functions should have docstrings", check_docstrings)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Convention),
                Rule::new("argument-naming", "Arguments should be snake_case", check_argument_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new("line-too-long", "Lines should not exceed 79 characters", check_line_length)
                    .with_severity(Severity::Info),
                Rule::new("unused-import", "Imported names should be used", check_unused_imports)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("multiple-imports", "One import per line", check_multiple_imports)
                    .with_severity(Severity::Info),
                Rule::new(
                    "indentation-width",
                    "Indent with multiples of four spaces",
                    check_indentation_width,
                )
                .with_category(RuleCategory::Convention),
                Rule::new(
                    "variable-naming",
                    "Module-level variables should be snake_case",
                    check_variable_naming,
                )
                .with_category(RuleCategory::Convention),
                Rule::new(
                    "superfluous-parens",
                    "Avoid parentheses around return values and conditions",
                    check_superfluous_parens,
                )
                .with_severity(Severity::Info),
            ],
        }
    }
}

impl Default for PythonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_no_print(text: &str) -> Vec<Finding> {
    if PRINT_CALL.is_match(text) {
        vec![Finding::new("Avoid print statements. Use the logging module instead.")]
    } else {
        Vec::new()
    }
}

fn check_docstrings(text: &str) -> Vec<Finding> {
    let lines: Vec<&str> = text.lines().collect();
    let mut findings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let Some(caps) = DEF_HEADER.captures(line) else {
            continue;
        };
        let has_docstring = lines[index + 1..]
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
            .is_some_and(|l| l.starts_with("\"\"\"") || l.starts_with("'''"));
        if !has_docstring {
            findings.push(Finding::at(
                index + 1,
                line.trim(),
                format!("Function \"{}\" should have a docstring.", &caps[1]),
            ));
        }
    }
    findings
}

fn check_argument_naming(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (number, line) in scan::numbered_lines(text) {
        let Some(caps) = DEF_HEADER.captures(line) else {
            continue;
        };
        for arg in caps[2].split(',') {
            let name = arg
                .split([':', '='])
                .next()
                .unwrap_or_default()
                .trim()
                .trim_start_matches('*');
            if !name.is_empty() && !scan::is_snake_case(name) {
                findings.push(Finding::at(
                    number,
                    line.trim(),
                    format!("Function argument \"{}\" should follow snake_case convention.", name),
                ));
            }
        }
    }
    findings
}

fn check_line_length(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter(|(_, line)| line.chars().count() > MAX_LINE_LENGTH)
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!(
                    "Line {} exceeds {} characters. Please limit line length: \"{}\"",
                    number, MAX_LINE_LENGTH, trimmed
                ),
            )
        })
        .collect()
}

fn check_unused_imports(text: &str) -> Vec<Finding> {
    let mut bound = Vec::new();

    for caps in IMPORT.captures_iter(text) {
        let (Some(module), alias) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = match alias {
            Some(alias) => alias,
            None => module,
        };
        // `import os.path` binds `os`
        let ident = name.as_str().split('.').next().unwrap_or_default();
        bound.push((ident, name.start()..name.start() + ident.len(), module.as_str()));
    }

    for caps in FROM_IMPORT.captures_iter(text) {
        let Some(names) = caps.get(1) else {
            continue;
        };
        let mut offset = names.start();
        for part in names.as_str().split(',') {
            let ident = part.split_whitespace().last().unwrap_or_default();
            if !ident.is_empty() {
                let start = offset + part.rfind(ident).unwrap_or(0);
                bound.push((ident, start..start + ident.len(), ident));
            }
            offset += part.len() + 1;
        }
    }

    bound
        .into_iter()
        .filter(|(ident, decl, _)| !scan::is_referenced_elsewhere(text, ident, decl.clone()))
        .map(|(_, decl, imported)| {
            scan::finding_at(text, decl.start, format!("Unused import detected: {}.", imported))
        })
        .collect()
}

fn check_multiple_imports(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter(|(_, line)| MULTI_IMPORT.is_match(line))
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!(
                    "Avoid multiple imports on a single line at line {}: \"{}\". Use separate lines for each import.",
                    number, trimmed
                ),
            )
        })
        .collect()
}

fn check_indentation_width(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter(|(_, line)| !line.trim().is_empty())
        .filter(|(_, line)| {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            indent.contains('\t') || indent.chars().count() % INDENT_UNIT != 0
        })
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!(
                    "Use 4 spaces for indentation at line {}: \"{}\"",
                    number, trimmed
                ),
            )
        })
        .collect()
}

fn check_variable_naming(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter_map(|(number, line)| {
            let caps = GLOBAL_ASSIGN.captures(line)?;
            let name = caps.get(1)?.as_str();
            // UPPER_CASE module constants are fine
            let is_constant = name == name.to_uppercase();
            if scan::is_snake_case(name) || is_constant {
                return None;
            }
            let trimmed = line.trim();
            Some(Finding::at(
                number,
                trimmed,
                format!(
                    "Global variable \"{}\" should follow snake_case convention at line {}: \"{}\"",
                    name, number, trimmed
                ),
            ))
        })
        .collect()
}

fn check_superfluous_parens(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (number, line) in scan::numbered_lines(text) {
        let construct = if PAREN_RETURN.is_match(line) {
            "return statements"
        } else if PAREN_IF.is_match(line) {
            "if conditions"
        } else {
            continue;
        };
        let trimmed = line.trim();
        findings.push(Finding::at(
            number,
            trimmed,
            format!(
                "Avoid unnecessary parentheses in {} at line {}: \"{}\"",
                construct, number, trimmed
            ),
        ));
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_module() {
        let code = "import logging\n\n\ndef greet(name):\n    \"\"\"Say hello.\"\"\"\n    logging.info(name)\n";
        let diagnostics = PythonParser::new().run(code);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].message, "No Python issues found.");
    }

    #[test]
    fn test_print_and_docstring() {
        let code = "def greet(name):\n    print(name)";
        assert_eq!(check_no_print(code).len(), 1);

        let findings = check_docstrings(code);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Function \"greet\" should have a docstring.");
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn test_argument_naming() {
        let findings = check_argument_naming("def f(self, userName: str, *Args, retry_count=3):");
        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Function argument \"userName\" should follow snake_case convention.",
                "Function argument \"Args\" should follow snake_case convention.",
            ]
        );
    }

    #[test]
    fn test_line_length() {
        let long = format!("x = \"{}\"", "a".repeat(80));
        let findings = check_line_length(&format!("ok = 1\n{}", long));
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            format!("Line 2 exceeds 79 characters. Please limit line length: \"{}\"", long)
        );
    }

    #[test]
    fn test_unused_imports() {
        let code = "import os\nimport sys\nimport numpy as np\nfrom typing import List, Dict\n\nprint(sys.argv, np, List)";
        let messages: Vec<_> = check_unused_imports(code)
            .into_iter()
            .map(|f| f.message)
            .collect();
        assert_eq!(
            messages,
            vec!["Unused import detected: os.", "Unused import detected: Dict."]
        );
    }

    #[test]
    fn test_dotted_import_binds_first_segment() {
        assert!(check_unused_imports("import os.path\nos.path.join('a')").is_empty());
    }

    #[test]
    fn test_multiple_imports() {
        let findings = check_multiple_imports("import os, sys");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(1));
        assert!(findings[0].message.contains("at line 1: \"import os, sys\""));
    }

    #[test]
    fn test_indentation_width() {
        let code = "def f():\n  x = 1\n    y = 2\n\tz = 3";
        let lines: Vec<_> = check_indentation_width(code)
            .into_iter()
            .filter_map(|f| f.line)
            .collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_variable_naming() {
        let findings = check_variable_naming("userName = 'a'\nMAX_SIZE = 3\ncount = 1\n    Inner = 2");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Global variable \"userName\" should follow snake_case convention at line 1: \"userName = 'a'\""
        );
    }

    #[test]
    fn test_line_findings_name_line_and_text() {
        let long = format!("value = \"{}\"", "b".repeat(80));
        let code = format!("import os, sys\nif (x):\n  return (y)\nBadName = 1\n{}\n", long);
        let line_rules = [
            "line-too-long",
            "multiple-imports",
            "indentation-width",
            "variable-naming",
            "superfluous-parens",
        ];

        let diagnostics: Vec<_> = PythonParser::new()
            .run(&code)
            .into_iter()
            .filter(|d| line_rules.contains(&d.rule_id.as_str()))
            .collect();
        assert_eq!(diagnostics.len(), 6, "{:?}", diagnostics);

        for diag in diagnostics {
            let location = diag.location.as_ref().unwrap();
            assert!(
                diag.message
                    .to_lowercase()
                    .contains(&format!("line {}", location.line)),
                "{}",
                diag.message
            );
            assert!(diag.message.contains(&location.snippet), "{}", diag.message);
        }
    }

    #[test]
    fn test_superfluous_parens() {
        let findings = check_superfluous_parens("if (x > 1):\n    return (x)\nif x:\n    return x");
        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[0].message,
            "Avoid unnecessary parentheses in if conditions at line 1: \"if (x > 1):\""
        );
        assert_eq!(findings[1].line, Some(2));
    }
}
