//! Language type: validated representation of a content language.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A validated content language.
///
/// Only languages present and enabled in the registry can be constructed.
/// Languages order by their position in the display fallback order, so maps
/// keyed by `Language` iterate fr, ar, en.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "fr", "ar")
    code: &'static str,
}

impl Language {
    pub const FRENCH: Language = Language { code: "fr" };
    pub const ARABIC: Language = Language { code: "ar" };
    pub const ENGLISH: Language = Language { code: "en" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the canonical language (French). Legacy single-language payloads
    /// are always attributed to it.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    /// All enabled languages in display fallback order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Check if this is the canonical language.
    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }

    /// Check if this language is written right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.config().rtl
    }

    fn rank(&self) -> u8 {
        self.config().fallback_rank
    }
}

impl PartialOrd for Language {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Language {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_french_constant() {
        let french = Language::FRENCH;
        assert_eq!(french.code(), "fr");
        assert_eq!(french.name(), "French");
        assert!(french.is_canonical());
    }

    #[test]
    fn test_arabic_constant() {
        let arabic = Language::ARABIC;
        assert_eq!(arabic.code(), "ar");
        assert_eq!(arabic.native_name(), "العربية");
        assert!(arabic.is_rtl());
        assert!(!arabic.is_canonical());
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_english() {
        let language = Language::from_code("en").expect("Should succeed");
        assert_eq!(language, Language::ENGLISH);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("es");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_canonical_returns_french() {
        assert_eq!(Language::canonical(), Language::FRENCH);
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_all_in_fallback_order() {
        assert_eq!(
            Language::all(),
            vec![Language::FRENCH, Language::ARABIC, Language::ENGLISH]
        );
    }

    #[test]
    fn test_ordering_follows_fallback_rank() {
        let mut langs = vec![Language::ENGLISH, Language::FRENCH, Language::ARABIC];
        langs.sort();
        assert_eq!(
            langs,
            vec![Language::FRENCH, Language::ARABIC, Language::ENGLISH]
        );
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&Language::ARABIC).unwrap();
        assert_eq!(json, "\"ar\"");
    }

    #[test]
    fn test_deserialize_rejects_unknown_code() {
        let result: std::result::Result<Language, _> = serde_json::from_str("\"de\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::ENGLISH.to_string(), "en");
    }
}
