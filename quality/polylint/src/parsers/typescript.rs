//! TypeScript rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::sync::LazyLock;

static VAR_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bvar\s+\w").unwrap());

static BLOCK_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:let|const)\s+([A-Za-z_]\w*)").unwrap());

static FUNCTION_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+\w+\s*\(.*\)\s*(?::[^{]*)?\{").unwrap());

static EXPLICIT_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*any\b|<any>|\bas\s+any\b").unwrap());

static CLASS_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\s+(\w+)[^{]*\{([^}]*)\}").unwrap());

static METHOD_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(\w+)\s*\([^)]*\)\s*(?::[^{]*)?\{").unwrap());

static MODIFIED_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:public|private|protected)\s+(?:static\s+|async\s+|readonly\s+)*\w+\s*\(")
        .unwrap()
});

/// TypeScript parser
pub struct TypeScriptParser {
    rules: Vec<Rule>,
}

impl TypeScriptParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("require-export", "Modules should export something", check_export)
                    .with_severity(Severity::Info),
                Rule::new("no-var", "Prefer let/const over var", check_no_var),
                Rule::new(
                    "type-annotations",
                    "Use explicit type annotations",
                    check_type_annotations,
                )
                .with_severity(Severity::Info)
                .with_category(RuleCategory::Pedantic),
                Rule::new("no-unused-vars", "Declared variables should be used", check_unused_vars)
                    .with_category(RuleCategory::Suspicious),
                Rule::new(
                    "prefer-arrow-functions",
                    "Prefer arrow functions to function declarations",
                    check_arrow_functions,
                ),
                Rule::new("no-explicit-any", "Avoid the any type", check_explicit_any)
                    .with_severity(Severity::Error),
                Rule::new("strict-mode", "Enable strict compiler checks", check_strict_mode)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
                Rule::new(
                    "member-access",
                    "Class methods should declare their accessibility",
                    check_member_access,
                )
                .with_category(RuleCategory::Convention),
            ],
        }
    }
}

impl Default for TypeScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for TypeScriptParser {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_export(text: &str) -> Vec<Finding> {
    if text.contains("export ") {
        Vec::new()
    } else {
        vec![Finding::new(
            "TypeScript modules should use \"export\" to expose functionality.",
        )]
    }
}

fn check_no_var(text: &str) -> Vec<Finding> {
    VAR_DECL
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Avoid \"var\", use \"let\" or \"const\" instead."))
        .collect()
}

fn check_type_annotations(text: &str) -> Vec<Finding> {
    if text.contains(':') {
        Vec::new()
    } else {
        vec![Finding::new(
            "TypeScript supports explicit type annotations. Consider adding them.",
        )]
    }
}

fn check_unused_vars(text: &str) -> Vec<Finding> {
    BLOCK_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| !scan::is_referenced_elsewhere(text, name.as_str(), name.range()))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Variable \"{}\" is declared but not used.", name.as_str()),
            )
        })
        .collect()
}

fn check_arrow_functions(text: &str) -> Vec<Finding> {
    FUNCTION_DECL
        .find_iter(text)
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "Use arrow functions instead of traditional function expressions.",
            )
        })
        .collect()
}

fn check_explicit_any(text: &str) -> Vec<Finding> {
    EXPLICIT_ANY
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Avoid using the \"any\" type. Use more specific types."))
        .collect()
}

fn check_strict_mode(text: &str) -> Vec<Finding> {
    if text.contains("\"strict\": true") {
        Vec::new()
    } else {
        vec![Finding::new(
            "Enable \"strict\" mode in your tsconfig.json for better type checking.",
        )]
    }
}

fn check_member_access(text: &str) -> Vec<Finding> {
    CLASS_BODY
        .captures_iter(text)
        .filter(|caps| {
            let body = caps.get(2).map_or("", |m| m.as_str());
            let has_methods = METHOD_HEADER
                .captures_iter(body)
                .filter_map(|c| c.get(1))
                .any(|name| !matches!(name.as_str(), "if" | "for" | "while" | "switch" | "catch"));
            has_methods && !MODIFIED_METHOD.is_match(body)
        })
        .filter_map(|caps| caps.get(1))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!(
                    "Class \"{}\" methods should have appropriate access modifiers (public, private, protected).",
                    name.as_str()
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_module() {
        let code = "// \"strict\": true\nexport const answer: number = 42;\nexport const doubled: number = answer * 2;\nconsole.log(doubled);";
        let diagnostics = TypeScriptParser::new().run(code);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].message, "No TypeScript issues found.");
    }

    #[test]
    fn test_missing_export_and_annotations() {
        assert_eq!(check_export("const a = 1;").len(), 1);
        assert!(check_export("export const a = 1;").is_empty());
        assert_eq!(check_type_annotations("let a = 1;").len(), 1);
        assert!(check_type_annotations("let a: number = 1;").is_empty());
    }

    #[test]
    fn test_unused_vars() {
        let findings = check_unused_vars("const used = 1;\nconst unused = used;");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].message, "Variable \"unused\" is declared but not used.");
    }

    #[test]
    fn test_arrow_and_any() {
        assert_eq!(check_arrow_functions("function f(a: number): number {\n return a;\n}").len(), 1);
        assert!(check_arrow_functions("const f = (a: number) => a;").is_empty());
        assert_eq!(check_explicit_any("let a: any = 1;\nlet b = c as any;").len(), 2);
        assert!(check_explicit_any("let company: string;").is_empty());
    }

    #[test]
    fn test_member_access() {
        let code = "class Greeter {\n  greet(name: string) {\n    return name;\n  }\n}";
        let findings = check_member_access(code);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("Greeter"));

        let code = "class Greeter {\n  public greet(name: string) {\n    return name;\n  }\n}";
        assert!(check_member_access(code).is_empty());
    }
}
