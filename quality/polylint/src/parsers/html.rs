//! HTML rules
//!
//! Markup is never produced by language detection; this parser is reached
//! through an explicit language or a `.html` file.

use crate::diagnostic::Severity;
use crate::parser::LanguageParser;
use crate::rule::{Finding, Rule, RuleCategory};
use crate::scan;
use code_detector::Language;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE\s+html").unwrap());

static HTML_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<html\b[^>]*>.*</html\s*>").unwrap());

static BODY_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>.*</body\s*>").unwrap());

static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][\w-]*)([^>]*)>").unwrap());

static CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</([A-Za-z][\w-]*)\s*>").unwrap());

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\sstyle\s*=").unwrap());

static ALT_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\salt\s*=").unwrap());

static UNQUOTED_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s([\w:-]+)\s*=\s*([^"'\s>/][^\s>]*)"#).unwrap());

static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\ssrc\s*=").unwrap());

static ASYNC_OR_DEFER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s(?:async|defer)\b").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const MAX_BR_TAGS: usize = 3;

/// HTML parser
pub struct HtmlParser {
    rules: Vec<Rule>,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Rule::new("doctype", "Documents declare <!DOCTYPE html>", check_doctype),
                Rule::new("html-element", "Documents have an <html> element", check_html_element),
                Rule::new("body-element", "Documents have a <body> element", check_body_element),
                Rule::new("no-inline-style", "Move styles to CSS", check_inline_styles),
                Rule::new("img-alt", "Images need alternative text", check_img_alt)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("quoted-attributes", "Quote attribute values", check_quoted_attributes),
                Rule::new("closing-tags", "Close every non-void element", check_closing_tags)
                    .with_severity(Severity::Error)
                    .with_category(RuleCategory::Correctness),
                Rule::new("excessive-br", "Use CSS rather than <br> for layout", check_br_tags)
                    .with_severity(Severity::Info),
                Rule::new("script-loading", "External scripts load async or deferred", check_script_loading)
                    .with_severity(Severity::Info)
                    .with_category(RuleCategory::Pedantic),
            ],
        }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageParser for HtmlParser {
    fn language(&self) -> Language {
        Language::Html
    }

    fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn check_doctype(text: &str) -> Vec<Finding> {
    if DOCTYPE.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new(
            "Missing DOCTYPE declaration. Include \"<!DOCTYPE html>\" at the top of the document.",
        )]
    }
}

fn check_html_element(text: &str) -> Vec<Finding> {
    if HTML_ELEMENT.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Missing <html> tags.")]
    }
}

fn check_body_element(text: &str) -> Vec<Finding> {
    if BODY_ELEMENT.is_match(text) {
        Vec::new()
    } else {
        vec![Finding::new("Missing <body> tags.")]
    }
}

fn check_inline_styles(text: &str) -> Vec<Finding> {
    OPEN_TAG
        .captures_iter(text)
        .filter(|caps| STYLE_ATTR.is_match(&caps[2]))
        .filter_map(|caps| caps.get(0))
        .map(|tag| {
            scan::finding_at(
                text,
                tag.start(),
                "Inline styles detected. Consider moving styles to an external CSS file.",
            )
        })
        .collect()
}

fn check_img_alt(text: &str) -> Vec<Finding> {
    OPEN_TAG
        .captures_iter(text)
        .filter(|caps| caps[1].eq_ignore_ascii_case("img") && !ALT_ATTR.is_match(&caps[2]))
        .filter_map(|caps| caps.get(0))
        .map(|tag| {
            scan::finding_at(
                text,
                tag.start(),
                "Missing alt attribute in <img> tag. This is important for accessibility.",
            )
        })
        .collect()
}

fn check_quoted_attributes(text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    for caps in OPEN_TAG.captures_iter(text) {
        let Some(attrs) = caps.get(2) else {
            continue;
        };
        for attr in UNQUOTED_ATTR.captures_iter(attrs.as_str()) {
            let Some(name) = attr.get(1) else {
                continue;
            };
            findings.push(scan::finding_at(
                text,
                attrs.start() + name.start(),
                format!("Unquoted value for attribute \"{}\". Always quote attribute values.", name.as_str()),
            ));
        }
    }
    findings
}

fn check_closing_tags(text: &str) -> Vec<Finding> {
    // tag name -> (opened, closed); BTreeMap keeps the message stable
    let mut balance: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for caps in OPEN_TAG.captures_iter(text) {
        let name = caps[1].to_ascii_lowercase();
        let self_closing = caps[2].trim_end().ends_with('/');
        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        }
        balance.entry(name).or_default().0 += 1;
    }
    for caps in CLOSE_TAG.captures_iter(text) {
        balance.entry(caps[1].to_ascii_lowercase()).or_default().1 += 1;
    }

    let unclosed: Vec<String> = balance
        .into_iter()
        .filter(|(_, (opened, closed))| opened > closed)
        .map(|(name, _)| format!("<{}>", name))
        .collect();

    if unclosed.is_empty() {
        Vec::new()
    } else {
        vec![Finding::new(format!(
            "Missing closing tags for the following elements: {}",
            unclosed.join(", ")
        ))]
    }
}

fn check_br_tags(text: &str) -> Vec<Finding> {
    let count = BR_TAG.find_iter(text).count();
    if count > MAX_BR_TAGS {
        vec![Finding::new(format!(
            "Too many <br> tags used ({}). Consider using CSS for layout instead.",
            count
        ))]
    } else {
        Vec::new()
    }
}

fn check_script_loading(text: &str) -> Vec<Finding> {
    OPEN_TAG
        .captures_iter(text)
        .filter(|caps| {
            caps[1].eq_ignore_ascii_case("script")
                && SRC_ATTR.is_match(&caps[2])
                && !ASYNC_OR_DEFER.is_match(&caps[2])
        })
        .filter_map(|caps| caps.get(0))
        .map(|tag| {
            scan::finding_at(
                text,
                tag.start(),
                "Script tags without async or defer may block rendering. Consider adding async or defer.",
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Demo</title></head>\n<body>\n<p class=\"intro\">Hello</p>\n<img src=\"a.png\" alt=\"A\">\n<script src=\"app.js\" defer></script>\n</body>\n</html>";

    #[test]
    fn test_clean_page() {
        let diagnostics = HtmlParser::new().run(PAGE);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].message, "No HTML issues found.");
    }

    #[test]
    fn test_fragment_structure() {
        let ids: Vec<_> = HtmlParser::new()
            .run("<p>hi</p>")
            .into_iter()
            .map(|d| d.rule_id)
            .collect();
        assert_eq!(ids, vec!["doctype", "html-element", "body-element"]);
    }

    #[test]
    fn test_inline_style_and_alt() {
        let code = "<div style=\"color: red\">x</div>\n<img src=\"a.png\">\n<img src=\"b.png\" alt=\"\">";
        assert_eq!(check_inline_styles(code).len(), 1);

        let findings = check_img_alt(code);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
    }

    #[test]
    fn test_quoted_attributes() {
        let findings = check_quoted_attributes("<input type=text name=\"q\" disabled>");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("\"type\""));
    }

    #[test]
    fn test_closing_tags() {
        let findings = check_closing_tags("<div><p>one<br><span/>\n</div>\n<ul><li>a</li>");
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Missing closing tags for the following elements: <p>, <ul>"
        );
    }

    #[test]
    fn test_br_and_scripts() {
        assert_eq!(check_br_tags("a<br>b<br/>c<br />d<BR>").len(), 1);
        assert!(check_br_tags("a<br>b<br>c<br>").is_empty());

        assert_eq!(check_script_loading("<script src=\"a.js\"></script>").len(), 1);
        assert!(check_script_loading("<script src=\"a.js\" async></script>").is_empty());
        assert!(check_script_loading("<script>init();</script>").is_empty());
    }
}
