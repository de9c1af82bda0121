//! Text scanning helpers shared by the rule sets
//!
//! Everything here works on raw text. None of it is aware of strings,
//! comments or scopes; rules built on these helpers are approximate.

use crate::rule::Finding;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

static RETURN_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\b[^;{}]*;").unwrap());

/// Iterate over lines with their 1-based numbers
pub fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().map(|(i, line)| (i + 1, line))
}

/// Width of the leading whitespace, one per character
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// 1-based line number of a byte offset
pub fn line_number(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// 1-based line number and trimmed line text at a byte offset
pub fn line_at(text: &str, offset: usize) -> (usize, &str) {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    (line_number(text, offset), text[start..end].trim())
}

/// A finding anchored at the line containing `offset`
pub fn finding_at(text: &str, offset: usize, message: impl Into<String>) -> Finding {
    let (line, snippet) = line_at(text, offset);
    Finding::at(line, snippet, message)
}

/// First `max` characters of `s`, with "..." appended when truncated
pub fn excerpt(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Flag every non-blank line whose indentation differs from the first
/// non-blank line's
pub fn inconsistent_indentation(text: &str) -> Vec<Finding> {
    let mut lines = numbered_lines(text).filter(|(_, line)| !line.trim().is_empty());
    let baseline = match lines.next() {
        Some((_, line)) => indent_width(line),
        None => return Vec::new(),
    };

    lines
        .filter(|(_, line)| indent_width(line) != baseline)
        .map(|(number, line)| {
            let trimmed = line.trim();
            Finding::at(
                number,
                trimmed,
                format!("Inconsistent indentation at line {}: \"{}\"", number, trimmed),
            )
        })
        .collect()
}

/// Count of `{` and `}` in the text
pub fn brace_counts(text: &str) -> (usize, usize) {
    text.chars().fold((0, 0), |(open, close), c| match c {
        '{' => (open + 1, close),
        '}' => (open, close + 1),
        _ => (open, close),
    })
}

/// Deepest `{` nesting reached anywhere in the text
pub fn max_brace_depth(text: &str) -> usize {
    let mut depth: usize = 0;
    let mut max = 0;
    for c in text.chars() {
        match c {
            '{' => {
                depth += 1;
                max = max.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Brace depth at the start of each line (index 0 is line 1)
pub fn line_depths(text: &str) -> Vec<usize> {
    let mut depth: usize = 0;
    text.lines()
        .map(|line| {
            let at_start = depth;
            for c in line.chars() {
                match c {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            at_start
        })
        .collect()
}

/// Bare numeric literals with their byte offsets
pub fn numeric_literals(text: &str) -> Vec<(usize, &str)> {
    NUMERIC_LITERAL
        .find_iter(text)
        .map(|m| (m.start(), m.as_str()))
        .collect()
}

/// Whether `name` appears as a whole word anywhere outside `declaration`
pub fn is_referenced_elsewhere(text: &str, name: &str, declaration: Range<usize>) -> bool {
    let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) else {
        return true;
    };
    let used = re
        .find_iter(text)
        .any(|m| m.start() < declaration.start || m.start() >= declaration.end);
    used
}

/// Byte offsets of loose `==` and `!=` operators, excluding `===`/`!==`
/// and `<=`/`>=`
pub fn loose_equality(text: &str) -> Vec<(usize, &'static str)> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        let next_is_eq = bytes.get(i + 2) == Some(&b'=');
        match (bytes[i], bytes[i + 1]) {
            (b'=', b'=') => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                if next_is_eq || matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    // part of a longer operator; skip the whole run
                    while i < bytes.len() && bytes[i] == b'=' {
                        i += 1;
                    }
                    continue;
                }
                found.push((i, "=="));
                i += 2;
            }
            (b'!', b'=') => {
                if next_is_eq {
                    i += 3;
                    continue;
                }
                found.push((i, "!="));
                i += 2;
            }
            _ => i += 1,
        }
    }
    found
}

/// Byte offsets of statements that directly follow an unconditional
/// `return ...;` in the same block
pub fn unreachable_after_return(text: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    for m in RETURN_STATEMENT.find_iter(text) {
        if is_conditional_return(text, m.start()) {
            continue;
        }

        let rest = &text[m.end()..];
        let next = rest.trim_start();
        let ends_block = next.is_empty()
            || next.starts_with('}')
            || next.starts_with("case ")
            || next.starts_with("default")
            || next.starts_with("//")
            || next.starts_with("/*")
            || next.starts_with('#');
        if !ends_block {
            offsets.push(text.len() - next.len());
        }
    }
    offsets
}

/// A `return` guarded by a braceless `if`/`else`/loop on the same or
/// previous line
fn is_conditional_return(text: &str, return_start: usize) -> bool {
    let line_start = text[..return_start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = text[line_start..return_start].trim();
    if !prefix.is_empty() {
        return !(prefix.ends_with('{') || prefix.ends_with(';') || prefix.ends_with('}'));
    }

    let previous = text[..line_start]
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());
    matches!(previous, Some(line) if line.ends_with(')') || line.ends_with("else"))
}

/// Whether a name is already lower snake case
pub fn is_snake_case(name: &str) -> bool {
    name == name.to_lowercase()
}

/// Whether a name starts with an uppercase letter
pub fn starts_uppercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("    x"), 4);
        assert_eq!(indent_width("\tx"), 1);
        assert_eq!(indent_width("x"), 0);
    }

    #[test]
    fn test_line_number_and_line_at() {
        let text = "a\n  bb\nccc";
        assert_eq!(line_number(text, 0), 1);
        assert_eq!(line_number(text, 4), 2);
        assert_eq!(line_at(text, 4), (2, "bb"));
        assert_eq!(line_at(text, text.len()), (3, "ccc"));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 30), "short");
        assert_eq!(excerpt("abcdef", 3), "abc...");
        assert_eq!(excerpt("héllo", 2), "hé...");
    }

    #[test]
    fn test_inconsistent_indentation_reports_later_line() {
        let text = "  first\n\n    second\n  third";
        let findings = inconsistent_indentation(text);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(3));
        assert_eq!(findings[0].snippet.as_deref(), Some("second"));
        assert_eq!(
            findings[0].message,
            "Inconsistent indentation at line 3: \"second\""
        );
    }

    #[test]
    fn test_inconsistent_indentation_baseline_skips_blank_lines() {
        let text = "\n\n  a\n  b";
        assert!(inconsistent_indentation(text).is_empty());
        assert!(inconsistent_indentation("").is_empty());
    }

    #[test]
    fn test_brace_helpers() {
        assert_eq!(brace_counts("{ { } "), (2, 1));
        assert_eq!(max_brace_depth("a { b { c } } { }"), 2);
        assert_eq!(line_depths("x {\n y\n}\nz"), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_numeric_literals() {
        let literals: Vec<_> = numeric_literals("x1 = 42 + 7;")
            .into_iter()
            .map(|(_, n)| n)
            .collect();
        assert_eq!(literals, vec!["42", "7"]);
    }

    #[test]
    fn test_is_referenced_elsewhere() {
        let text = "let a = 1; let b = a;";
        assert!(is_referenced_elsewhere(text, "a", 4..5));
        assert!(!is_referenced_elsewhere(text, "b", 15..16));
        // substrings of other words do not count
        assert!(!is_referenced_elsewhere("let ab = 1; abc();", "ab", 4..6));
    }

    #[test]
    fn test_loose_equality() {
        let ops: Vec<_> = loose_equality("a == b; c === d; e != f; g !== h; i <= j")
            .into_iter()
            .map(|(_, op)| op)
            .collect();
        assert_eq!(ops, vec!["==", "!="]);
    }

    #[test]
    fn test_unreachable_after_return() {
        let text = "int f() {\n  return 1;\n  x++;\n}";
        let offsets = unreachable_after_return(text);
        assert_eq!(offsets.len(), 1);
        assert_eq!(line_at(text, offsets[0]), (3, "x++;"));

        assert!(unreachable_after_return("int f() { return 0; }").is_empty());
        assert!(unreachable_after_return("if (x) return 1;\ny();").is_empty());
        assert!(unreachable_after_return("if (x)\n  return 1;\ny();").is_empty());
        assert!(unreachable_after_return("case 1: return 1;\ncase 2: return 2;").is_empty());
    }

    #[test]
    fn test_naming_helpers() {
        assert!(is_snake_case("user_name"));
        assert!(!is_snake_case("userName"));
        assert!(starts_uppercase("Main"));
        assert!(!starts_uppercase("main"));
        assert!(!starts_uppercase(""));
    }
}
