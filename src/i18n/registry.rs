//! Language registry: Single source of truth for all content languages.
//!
//! Every page is edited in the same three languages. The registry records their
//! metadata and the display fallback order, and is initialized once through a
//! `OnceLock` singleton.

use crate::i18n::LanguageStrings;
use std::sync::OnceLock;

/// Configuration for a supported content language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "fr", "ar", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "French", "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "Français", "العربية")
    pub native_name: &'static str,

    /// Whether this is the canonical language (legacy payloads belong to it)
    pub is_canonical: bool,

    /// Whether this language is enabled for editing and display
    pub enabled: bool,

    /// Whether text in this language is written right-to-left
    pub rtl: bool,

    /// Position in the display fallback order (0 is tried first)
    pub fallback_rank: u8,

    /// Localized editor-facing messages
    pub strings: LanguageStrings,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages, in fallback order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.fallback_order()
            .into_iter()
            .filter(|lang| lang.enabled)
            .collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Languages sorted by `fallback_rank`: the order in which stored
    /// translations stand in for a language that has no content of its own.
    pub fn fallback_order(&self) -> Vec<&LanguageConfig> {
        let mut ordered: Vec<_> = self.languages.iter().collect();
        ordered.sort_by_key(|lang| lang.fallback_rank);
        ordered
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if zero or several canonical languages are defined (this
    /// indicates a configuration error in `default_languages`).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Default language configurations: French (canonical), Arabic, English.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_canonical: true,
            enabled: true,
            rtl: false,
            fallback_rank: 0,
            strings: LanguageStrings::french(),
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
            is_canonical: false,
            enabled: true,
            rtl: true,
            fallback_rank: 1,
            strings: LanguageStrings::arabic(),
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: false,
            enabled: true,
            rtl: false,
            fallback_rank: 2,
            strings: LanguageStrings::english(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_french() {
        let config = LanguageRegistry::get().get_by_code("fr").unwrap();
        assert_eq!(config.name, "French");
        assert_eq!(config.native_name, "Français");
        assert!(config.is_canonical);
        assert!(!config.rtl);
    }

    #[test]
    fn test_get_by_code_arabic_is_rtl() {
        let config = LanguageRegistry::get().get_by_code("ar").unwrap();
        assert_eq!(config.name, "Arabic");
        assert!(config.rtl);
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("es").is_none());
    }

    #[test]
    fn test_fallback_order_is_fr_ar_en() {
        let codes: Vec<_> = LanguageRegistry::get()
            .fallback_order()
            .iter()
            .map(|lang| lang.code)
            .collect();
        assert_eq!(codes, vec!["fr", "ar", "en"]);
    }

    #[test]
    fn test_list_enabled_contains_all_three() {
        let enabled = LanguageRegistry::get().list_enabled();
        assert_eq!(enabled.len(), 3);
        assert_eq!(LanguageRegistry::get().list_all().len(), 3);
    }

    #[test]
    fn test_canonical_returns_french() {
        assert_eq!(LanguageRegistry::get().canonical().code, "fr");
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("fr"));
        assert!(registry.is_enabled("ar"));
        assert!(registry.is_enabled("en"));
        assert!(!registry.is_enabled("de"));
    }

    #[test]
    fn test_fallback_ranks_are_unique() {
        let mut ranks: Vec<_> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| lang.fallback_rank)
            .collect();
        ranks.sort_unstable();
        ranks.dedup();
        assert_eq!(ranks.len(), 3);
    }
}
