//! Signature-based language detection for source snippets
//!
//! Classifies raw text by testing a fixed, ordered list of signatures and
//! returning the language of the first one that matches. The order encodes
//! priority, so a snippet that satisfies several signatures is attributed to
//! the earliest one:
//!
//! 1. JavaScript - function declaration, or a `const`/`let`/`var` declaration
//! 2. Python - `def` header, or a `print(...)` call
//! 3. C++ - `#include <...>`, or an `int main(...) {` signature
//! 4. Java - `public class`, or `System.out.println`
//! 5. C# - `using System`, or a `namespace` declaration
//! 6. Go - `package main`, or `fmt.Println`
//! 7. PHP - `<?php`, or an `echo "...";` statement
//! 8. TypeScript - `import x from '...'`, or an exported declaration
//!
//! Anything else is [`Language::Unknown`].
//!
//! Because the JavaScript signature is checked first, TypeScript that declares
//! anything with `const`/`let`/`var` is reported as JavaScript. This is a known
//! limitation of first-match-wins detection.
//!
//! # Example
//!
//! ```
//! use code_detector::{detect, Language};
//!
//! assert_eq!(detect("package main\nfunc main() {}"), Language::Go);
//! assert_eq!(detect(""), Language::Unknown);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Languages the detector can report
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cpp,
    Java,
    CSharp,
    Go,
    Php,
    TypeScript,
    JavaScript,
    Python,
    Html,

    /// No signature matched
    #[default]
    Unknown,
}

impl Language {
    /// Every language, `Unknown` last
    pub const ALL: [Language; 10] = [
        Language::Cpp,
        Language::Java,
        Language::CSharp,
        Language::Go,
        Language::Php,
        Language::TypeScript,
        Language::JavaScript,
        Language::Python,
        Language::Html,
        Language::Unknown,
    ];

    /// Get the language identifier as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::Go => "go",
            Language::Php => "php",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Html => "html",
            Language::Unknown => "unknown",
        }
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Php => "PHP",
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Html => "HTML",
            Language::Unknown => "Unknown",
        }
    }

    /// Get common file extensions for this language
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hxx", "h"],
            Language::Java => &["java"],
            Language::CSharp => &["cs"],
            Language::Go => &["go"],
            Language::Php => &["php", "phtml"],
            Language::TypeScript => &["ts", "mts", "cts", "tsx"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Language::Python => &["py", "pyw", "pyi"],
            Language::Html => &["html", "htm", "xhtml"],
            Language::Unknown => &[],
        }
    }

    /// Look up a language by file extension (without the dot)
    pub fn from_extension(ext: &str) -> Language {
        let ext = ext.to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .unwrap_or(Language::Unknown)
    }

    pub fn is_unknown(&self) -> bool {
        *self == Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl std::str::FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpp" | "c++" | "cxx" | "cc" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "csharp" | "c#" | "cs" => Ok(Language::CSharp),
            "go" | "golang" => Ok(Language::Go),
            "php" => Ok(Language::Php),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "javascript" | "js" => Ok(Language::JavaScript),
            "python" | "py" => Ok(Language::Python),
            "html" | "htm" => Ok(Language::Html),
            "unknown" => Ok(Language::Unknown),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Detection result naming the signature that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub language: Language,
    pub reason: &'static str,
}

impl DetectionResult {
    pub fn new(language: Language, reason: &'static str) -> Self {
        Self { language, reason }
    }
}

/// One detection heuristic: any of its patterns matching selects the language
struct Signature {
    language: Language,
    patterns: Vec<(Regex, &'static str)>,
}

impl Signature {
    fn new(language: Language, patterns: &[(&str, &'static str)]) -> Self {
        Self {
            language,
            patterns: patterns
                .iter()
                .map(|(pattern, reason)| (Regex::new(pattern).unwrap(), *reason))
                .collect(),
        }
    }

    fn matches(&self, content: &str) -> Option<&'static str> {
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(content))
            .map(|(_, reason)| *reason)
    }
}

/// Ordered signature table; earlier entries take priority
static SIGNATURES: LazyLock<Vec<Signature>> = LazyLock::new(|| {
    vec![
        Signature::new(
            Language::JavaScript,
            &[
                (r"\bfunction\s+\w+\s*\(.*\)\s*\{", "JavaScript function declaration"),
                (r"\b(?:const|let|var)\s+[\w$\[{]", "JavaScript variable declaration"),
            ],
        ),
        Signature::new(
            Language::Python,
            &[
                (r"\bdef\s+\w+\s*\(.*\)\s*(?:->\s*[^:]+)?:", "Python def header"),
                (r"\bprint\(.+\)", "Python print call"),
            ],
        ),
        Signature::new(
            Language::Cpp,
            &[
                (r"#include\s*<.+>", "C++ system include"),
                (r"\bint\s+main\s*\(.*\)\s*\{", "C++ int main signature"),
            ],
        ),
        Signature::new(
            Language::Java,
            &[
                (r"\bpublic\s+class\s+\w+", "Java public class"),
                (r"System\.out\.println", "Java console print"),
            ],
        ),
        Signature::new(
            Language::CSharp,
            &[
                (r"\busing\s+System\b", "C# using System"),
                (r"\bnamespace\s+\w+", "C# namespace declaration"),
            ],
        ),
        Signature::new(
            Language::Go,
            &[
                (r"\bpackage\s+main\b", "Go package main"),
                (r"\bfmt\.Println\b", "Go fmt.Println call"),
            ],
        ),
        Signature::new(
            Language::Php,
            &[
                (r"<\?php", "PHP open tag"),
                (r#"\becho\s+["'].*["']\s*;"#, "PHP echo statement"),
            ],
        ),
        Signature::new(
            Language::TypeScript,
            &[
                (
                    r#"\bimport\s+[\w{}\s,*]+\s+from\s+['"].+['"]"#,
                    "ES module import",
                ),
                (r"\bexport\s+(?:const|let|var)\b", "Exported declaration"),
            ],
        ),
    ]
});

/// Detect the language of a snippet. Total: returns `Unknown` when nothing matches.
pub fn detect(content: &str) -> Language {
    detect_with_reason(content).language
}

/// Detect the language and report which signature matched
pub fn detect_with_reason(content: &str) -> DetectionResult {
    SIGNATURES
        .iter()
        .find_map(|sig| {
            sig.matches(content)
                .map(|reason| DetectionResult::new(sig.language, reason))
        })
        .unwrap_or_else(|| DetectionResult::new(Language::Unknown, "No signature matched"))
}

/// Detect from content first, falling back to the file extension when no
/// signature matches
pub fn detect_with_path(path: &Path, content: &str) -> DetectionResult {
    let content_result = detect_with_reason(content);
    if !content_result.language.is_unknown() {
        return content_result;
    }

    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or_default();

    if by_extension.is_unknown() {
        content_result
    } else {
        DetectionResult::new(by_extension, "File extension")
    }
}
