//! Parser registry
//!
//! Maps each language to the parser that lints it. The registry is filled
//! once at startup and then shared read-only (usually behind an `Arc`).

use crate::parser::LanguageParser;
use crate::parsers;
use code_detector::Language;
use std::collections::HashMap;
use std::sync::Arc;

/// Language -> parser lookup
#[derive(Default, Clone)]
pub struct ParserRegistry {
    parsers: HashMap<Language, Arc<dyn LanguageParser>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in parser
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for parser in parsers::builtin_parsers() {
            registry.register(parser);
        }
        registry
    }

    /// Register a parser under its own language, returning the parser it replaced.
    ///
    /// Parsers claiming [`Language::Unknown`] are ignored.
    pub fn register(&mut self, parser: Arc<dyn LanguageParser>) -> Option<Arc<dyn LanguageParser>> {
        let language = parser.language();
        if language.is_unknown() {
            log::warn!("Ignoring parser registered for the unknown language");
            return None;
        }

        log::debug!(
            "Registered {} parser with {} rules",
            language.display_name(),
            parser.rules().len()
        );
        self.parsers.insert(language, parser)
    }

    /// Parser for a language, if one is registered
    pub fn resolve(&self, language: Language) -> Option<Arc<dyn LanguageParser>> {
        self.parsers.get(&language).cloned()
    }

    /// Registered languages in a stable order
    pub fn languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.parsers.keys().copied().collect();
        languages.sort();
        languages
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    struct NamedParser {
        language: Language,
        rules: Vec<Rule>,
    }

    impl LanguageParser for NamedParser {
        fn language(&self) -> Language {
            self.language
        }

        fn rules(&self) -> &[Rule] {
            &self.rules
        }
    }

    fn named(language: Language) -> Arc<dyn LanguageParser> {
        Arc::new(NamedParser {
            language,
            rules: Vec::new(),
        })
    }

    #[test]
    fn test_builtin_registry() {
        let registry = ParserRegistry::builtin();
        assert_eq!(registry.len(), 9);
        assert!(registry.resolve(Language::Unknown).is_none());
        assert_eq!(
            registry.resolve(Language::Cpp).map(|p| p.language()),
            Some(Language::Cpp)
        );
        assert!(registry.resolve(Language::Html).is_some());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ParserRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve(Language::Go).is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ParserRegistry::new();
        assert!(registry.register(named(Language::Go)).is_none());
        assert!(registry.register(named(Language::Go)).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_is_ignored() {
        let mut registry = ParserRegistry::new();
        assert!(registry.register(named(Language::Unknown)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_languages_sorted() {
        let mut registry = ParserRegistry::new();
        registry.register(named(Language::Python));
        registry.register(named(Language::Cpp));
        registry.register(named(Language::Go));
        assert_eq!(
            registry.languages(),
            vec![Language::Cpp, Language::Go, Language::Python]
        );
    }
}
