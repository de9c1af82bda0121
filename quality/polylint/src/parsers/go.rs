//! Go rules

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static PACKAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+\w+").unwrap());

static FUNC_MAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunc\s+main\s*\(\s*\)").unwrap());

static FOR_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*for\s").unwrap());

static ERR_ASSIGN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\berr\s*:?=[^=]").unwrap());

static ERR_CHECK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\berr\s*!=\s*nil\b").unwrap());

static PANIC_CALL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bpanic\s*\(").unwrap());

static IMPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimport\s*\(([^)]*)\)").unwrap());

static IMPORT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*import\s+(\w+\s+)?("[^"]+")"#).unwrap());

static EMPTY_MAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunc\s+main\s*\(\s*\)\s*\{\s*\}").unwrap());

static FUNC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunc\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\(").unwrap()
});

static IF_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\}\s*else\s+)?if\s").unwrap());

static RESOURCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:os\.(?:Open|OpenFile|Create)|sql\.Open|net\.Dial)\s*\(").unwrap()
});

static DEFER_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdefer\s+[\w.]*\.?Close\s*\(").unwrap());

const MAX_IF_DEPTH: usize = 3;

/// Go parser
pub struct GoParser {
    rules: Vec<Rule>,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("package-declaration", "Files start with a package clause", check_package)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("func-main", "Programs define func main()", check_func_main),
                Rule::new("no-semicolons", "Go inserts semicolons itself", check_semicolons)
                    .with_category(RuleCategory::Style),
                Rule::new("unchecked-error", "Errors should be compared against nil", check_error_handling)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("no-panic", "Return errors instead of panicking", check_panic),
                Rule::new(
                    "mixed-indentation",
                    "Do not mix tabs and spaces for indentation",
                    check_mixed_indentation,
                )
                .with_category(RuleCategory::Convention),
                Rule::new("redundant-import", "Import each package once", check_redundant_imports),
                Rule::new("empty-main", "main should do something", check_empty_main),
                Rule::new("function-naming", "Use MixedCaps for function names", check_function_naming)
                    .with_category(RuleCategory::Convention),
                Rule::new("nested-if", "Limit if nesting depth", check_nested_ifs)
                    .with_severity(Severity::Info),
                Rule::new("defer-close", "Defer Close() on opened resources", check_defer_close)
                    .with_category(RuleCategory::Suspicious),
            ],
        }
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for GoParser {
    fn language(&self) -> Language {
        Language::Go
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_package(text: &str) -> Vec<Finding> {
    if PACKAGE.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Go programs should start with a package declaration.")]
    }
}

fn check_func_main(text: &str) -> Vec<Finding> {
    if FUNC_MAIN.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Go programs usually have a \"func main()\" function.")]
    }
}

fn check_semicolons(text: &str) -> Vec<Finding> {
    scan::numbered_lines(text)
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            line.contains(';') && !FOR_HEADER.is_match(line) && !trimmed.starts_with("//")
        })
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!("Unnecessary semicolon at line {}: \"{}\"", number, trimmed),
            )
        })
        .collect()
}

fn check_error_handling(text: &str) -> Vec<Finding> {
    match ERR_ASSIGN.find(text) {
        Some(m) if !ERR_CHECK.is_match(text) => vec![scan::finding_at(
            text,
            m.start(),
            "Missing error handling. Check \"err != nil\" after calls that return an error.",
        )],
        _ => Vec::new(),
    }
}

fn check_panic(text: &str) -> Vec<Finding> {
    PANIC_CALL
        .find_iter(text)
        .map(|m| scan::finding_at(text, m.start(), "Avoid using `panic()` unless absolutely necessary."))
        .collect()
}

fn check_mixed_indentation(text: &str) -> Vec<Finding> {
    let mut baseline: Option<char> = None;
    let mut findings = Vec::new();

    for (number, line) in scan::numbered_lines(text) {
        if line.trim().is_empty() {
            continue;
        }
        let indent: Vec<char> = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        let Some(&first) = indent.first() else {
            continue;
        };
        let style = *baseline.get_or_insert(first);
        if indent.iter().any(|c| *c != style) {
            let trimmed = line.trim();
            findings.push(Finding::at(
                number,
                trimmed,
                format!("Mixed tabs and spaces in indentation at line {}: \"{}\"", number, trimmed),
            ));
        }
    }
    findings
}

fn check_redundant_imports(text: &str) -> Vec<Finding> {
    let mut imports = Vec::new();
    for caps in IMPORT_BLOCK.captures_iter(text) {
        let Some(block) = caps.get(1) else {
            continue;
        };
        let mut offset = block.start();
        for line in block.as_str().split_inclusive('\n') {
            let spec = line.trim();
            if !spec.is_empty() && !spec.starts_with("//") {
                imports.push((offset + line.find(spec).unwrap_or(0), spec));
            }
            offset += line.len();
        }
    }
    for caps in IMPORT_LINE.captures_iter(text) {
        if let (Some(whole), Some(path)) = (caps.get(0), caps.get(2)) {
            let spec = &text[whole.start()..path.end()];
            let spec = spec.trim_start().trim_start_matches("import").trim();
            imports.push((path.start(), spec));
        }
    }
    imports.sort_by_key(|(offset, _)| *offset);

    let mut seen = HashSet::new();
    imports
        .into_iter()
        .filter(|(_, spec)| !seen.insert(*spec))
        .map(|(offset, spec)| {
            scan::finding_at(text, offset, format!("Redundant import detected: {}", spec))
        })
        .collect()
}

fn check_empty_main(text: &str) -> Vec<Finding> {
    EMPTY_MAIN
        .find_iter(text)
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "The \"main\" function is empty. Ensure it has a meaningful body.",
            )
        })
        .collect()
}

fn check_function_naming(text: &str) -> Vec<Finding> {
    FUNC_NAME
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter(|name| name.as_str().contains('_') && name.as_str() != "_")
        .map(|name| {
            scan::finding_at(
                text,
                name.start(),
                format!(
                    "Function \"{}\" should use MixedCaps instead of underscores.",
                    name.as_str()
                ),
            )
        })
        .collect()
}

fn check_nested_ifs(text: &str) -> Vec<Finding> {
    // one entry per open brace: was it opened by an if header?
    let mut frames: Vec<bool> = Vec::new();

    for (number, line) in scan::numbered_lines(text) {
        let is_if = IF_HEADER.is_match(line);
        for c in line.chars() {
            match c {
                '{' => frames.push(is_if),
                '}' => {
                    frames.pop();
                }
                _ => {}
            }
        }

        let depth = frames.iter().filter(|opened_by_if| **opened_by_if).count();
        if is_if && depth > MAX_IF_DEPTH {
            return vec![Finding::at(
                number,
                line.trim(),
                format!(
                    "Too many nested `if` statements (depth {}). Consider refactoring.",
                    depth
                ),
            )];
        }
    }
    Vec::new()
}

fn check_defer_close(text: &str) -> Vec<Finding> {
    if DEFER_CLOSE.is_match(text) {
        return Vec::new();
    }
    RESOURCE_OPEN
        .find_iter(text)
        .map(|m| {
            scan::finding_at(
                text,
                m.start(),
                "Use `defer` to close resources (files, connections) after opening them.",
            )
        })
        .collect()
}
