//! Java rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::{Match, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static TYPE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:class|interface|enum|record)\s+\w").unwrap());

static MAIN_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpublic\s+static\s+void\s+main\s*\(").unwrap());

static CLASS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*((?:\w+[ \t]+)*)class\s+(\w+)").unwrap());

static METHOD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((?:(?:public|private|protected|static|final|abstract|synchronized|native)\s+)*)([\w<>\[\],.]+)\s+(\w+)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\{",
    )
    .unwrap()
});

static ACCESS_MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:public|private|protected)\b").unwrap());

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import\s+(?:static\s+)?([\w.]+)\s*;").unwrap()
});

static TRY_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btry\s*[({]").unwrap());

static CATCH_OR_FINALLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcatch\s*\(|\bfinally\s*\{").unwrap());

static TRY_WITH_RESOURCES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btry\s*\(").unwrap());

static RESOURCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bnew\s+(FileReader|FileWriter|FileInputStream|FileOutputStream|BufferedReader|BufferedWriter|Scanner)\s*\(")
        .unwrap()
});

static CLOSE_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.close\s*\(\s*\)").unwrap());

const MAGIC_RANGE: std::ops::RangeInclusive<u32> = 1..=99;

/// Java parser
pub struct JavaParser {
    rules: Vec<Rule>,
}

impl JavaParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("require-class", "Java sources declare at least one class", check_class)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("require-main", "Programs need a main method", check_main),
                Rule::new("require-semicolon", "Statements end with semicolons", check_semicolon),
                Rule::new("class-naming", "Class names are PascalCase", check_class_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new("method-naming", "Method names are camelCase", check_method_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new(
                    "class-access-modifier",
                    "Classes should declare their accessibility",
                    check_class_access,
                )
                .with_severity(Severity::Info)
                .with_category(RuleCategory::Convention),
                Rule::new(
                    "method-access-modifier",
                    "Methods should declare their accessibility",
                    check_method_access,
                )
                .with_severity(Severity::Info)
                .with_category(RuleCategory::Convention),
                Rule::new("unused-import", "Imported types should be used", check_unused_imports)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("duplicate-import", "Import each type once", check_duplicate_imports),
                Rule::new("try-without-catch", "try blocks need error handling", check_try_catch)
                    .with_category(RuleCategory::Suspicious),
                Rule::new("magic-number", "Use named constants for numeric literals", check_magic_numbers)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
                Rule::new("resource-leak", "Close the resources you open", check_resource_leak)
                    .with_category(RuleCategory::Correctness),
            ],
        }
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for JavaParser {
    fn language(&self) -> Language {
        Language::Java
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

struct MethodDecl<'t> {
    modifiers: &'t str,
    name: Match<'t>,
}

/// Method headers, with constructors and control statements filtered out
fn method_declarations(text: &str) -> Vec<MethodDecl<'_>> {
    let classes: HashSet<&str> = CLASS_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .collect();

    METHOD_DECL
        .captures_iter(text)
        .filter_map(|caps| {
            let modifiers = caps.get(1).map_or("", |m| m.as_str());
            let return_type = caps.get(2)?.as_str();
            let name = caps.get(3)?;
            let not_a_method = matches!(
                return_type,
                "public" | "private" | "protected" | "new" | "return" | "else" | "throw"
            ) || matches!(name.as_str(), "if" | "for" | "while" | "switch" | "catch" | "synchronized")
                || classes.contains(name.as_str());
            (!not_a_method).then_some(MethodDecl { modifiers, name })
        })
        .collect()
}

fn check_class(text: &str) -> Vec<Finding> {
    if TYPE_DECL.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Java files should contain at least one class definition.")]
    }
}

fn check_main(text: &str) -> Vec<Finding> {
    if MAIN_METHOD.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new(
            "Java programs usually have a \"public static void main\" method.",
        )]
    }
}

fn check_semicolon(text: &str) -> Vec<Finding> {
    if text.contains(';') {
        Vec::new()
    } else {
        vec![Finding::new("Java statements should end with a semicolon.")]
    }
}

fn check_class_naming(text: &str) -> Vec<Finding> {
    CLASS_DECL
        .captures_iter(text)
        .filter_map(|caps| caps.get(2))
        .filter(|name| !scan::starts_uppercase(name.as_str()))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Class name \"{}\" should follow Pascal case convention.", name.as_str()),
            )
        })
        .collect()
}

fn check_method_naming(text: &str) -> Vec<Finding> {
    method_declarations(text)
        .into_iter()
        .filter(|decl| scan::starts_uppercase(decl.name.as_str()) || decl.name.as_str().contains('_'))
        .map(|decl| {
            scan::finding_at(
                text,
                decl.name.start(),
                format!(
                    "Method name \"{}\" should follow camel case convention.",
                    decl.name.as_str()
                ),
            )
        })
        .collect()
}

fn check_class_access(text: &str) -> Vec<Finding> {
    CLASS_DECL
        .captures_iter(text)
        .filter(|caps| !ACCESS_MODIFIER.is_match(caps.get(1).map_or("", |m| m.as_str())))
        .filter_map(|caps| caps.get(2))
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!("Class \"{}\" lacks an access modifier.", name.as_str()),
            )
        })
        .collect()
}

fn check_method_access(text: &str) -> Vec<Finding> {
    method_declarations(text)
        .into_iter()
        .filter(|decl| !ACCESS_MODIFIER.is_match(decl.modifiers))
        .map(|decl| {
            scan::finding_at(
                text,
                decl.name.start(),
                format!(
                    "Method \"{}\" should have an access modifier (public/private/protected).",
                    decl.name.as_str()
                ),
            )
        })
        .collect()
}

fn check_unused_imports(text: &str) -> Vec<Finding> {
    IMPORT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|path| {
            let simple = path.as_str().rsplit('.').next().unwrap_or_default();
            let offset = path.start() + path.as_str().len() - simple.len();
            !simple.is_empty()
                && !scan::is_referenced_elsewhere(text, simple, offset..offset + simple.len())
        })
        .map(|path| {
            scan::finding_at(text, path.start(), format!("Unused import: {}", path.as_str()))
        })
        .collect()
}

fn check_duplicate_imports(text: &str) -> Vec<Finding> {
    let mut seen = HashSet::new();
    IMPORT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|path| !seen.insert(path.as_str()))
        .map(|path| {
            scan::finding_at(text, path.start(), format!("Duplicate import: {}", path.as_str()))
        })
        .collect()
}

fn check_try_catch(text: &str) -> Vec<Finding> {
    match TRY_BLOCK.find(text) {
        Some(m) if !CATCH_OR_FINALLY.is_match(text) => vec![scan::finding_at(
            text,
            m.start(),
            "Missing catch block after try block. Ensure error handling.",
        )],
        _ => Vec::new(),
    }
}

fn check_magic_numbers(text: &str) -> Vec<Finding> {
    scan::numeric_literals(text)
        .into_iter()
        .filter(|(_, literal)| literal.parse::<u32>().is_ok_and(|n| MAGIC_RANGE.contains(&n)))
        .map(|(offset, literal)| {
            scan::finding_at(
                text,
                offset,
                format!("Consider replacing magic number \"{}\" with a named constant.", literal),
            )
        })
        .collect()
}

fn check_resource_leak(text: &str) -> Vec<Finding> {
    if CLOSE_CALL.is_match(text) || TRY_WITH_RESOURCES.is_match(text) {
        return Vec::new();
    }
    RESOURCE_OPEN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|kind| {
            scan::finding_at(
                text,
                kind.start(),
                format!("Ensure the {} is closed after use.", kind.as_str()),
            )
        })
        .collect()
}
