//! Cross-language completeness checks.
//!
//! The report never blocks a save. It tells the editor which languages will
//! fall back on the public site, where list lengths drifted apart between
//! languages and which link fields hold something that is not a link.

use super::Language;
use crate::record::{LanguageRecord, Translations};
use crate::schema::{is_blank, FieldKind, FieldSpec, Schema};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a set of translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems the editor should fix before publishing
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation completeness.
pub struct TranslationValidator;

static LINK_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    /// Check a full set of translations against its schema.
    ///
    /// This function checks that:
    /// - the canonical language has content of its own (error otherwise)
    /// - every other language has content, or warns that it will fall back
    /// - top-level list lengths match the canonical language
    /// - link fields hold absolute, root-relative, `mailto:` or `tel:` links
    pub fn validate(schema: &Schema, translations: &Translations) -> ValidationReport {
        let mut report = ValidationReport::new();
        let canonical = Language::canonical();
        let canonical_record = translations.get(canonical);

        match canonical_record {
            Some(record) if record.has_presence(schema) => {}
            _ => report.errors.push(format!(
                "{} content is empty; it is the language every other one falls back to",
                canonical.name()
            )),
        }

        for language in Language::all() {
            let record = translations.get(language);

            if language != canonical && !record.is_some_and(|r| r.has_presence(schema)) {
                report.warnings.push(format!(
                    "{} has no content and will fall back to another language",
                    language.name()
                ));
            }

            if let (Some(record), Some(reference)) = (record, canonical_record) {
                if language != canonical {
                    Self::check_list_lengths(schema, language, record, reference, &mut report);
                }
            }

            if let Some(record) = record {
                let mut path = Vec::new();
                Self::check_links(&schema.fields, record.as_map(), &mut path, language, &mut report);
            }
        }

        report
    }

    fn check_list_lengths(
        schema: &Schema,
        language: Language,
        record: &LanguageRecord,
        reference: &LanguageRecord,
        report: &mut ValidationReport,
    ) {
        for field in schema.fields.iter().filter(|field| field.is_list()) {
            let len = list_len(record, field.name);
            let expected = list_len(reference, field.name);
            if len > 0 && expected > 0 && len != expected {
                report.warnings.push(format!(
                    "'{}' has {} entries in {} but {} in {}",
                    field.name,
                    len,
                    language.name(),
                    expected,
                    Language::canonical().name()
                ));
            }
        }
    }

    fn check_links(
        fields: &[FieldSpec],
        map: &Map<String, Value>,
        path: &mut Vec<String>,
        language: Language,
        report: &mut ValidationReport,
    ) {
        for field in fields {
            let Some(value) = map.get(field.name) else {
                continue;
            };
            path.push(field.name.to_string());

            match &field.kind {
                FieldKind::Scalar { .. } if field.url => {
                    Self::check_link(value, path, language, report);
                }
                FieldKind::FlatList { .. } if field.url => {
                    for item in value.as_array().into_iter().flatten() {
                        Self::check_link(item, path, language, report);
                    }
                }
                FieldKind::GroupList { fields: nested, .. } => {
                    let entries = value.as_array().into_iter().flatten();
                    for (index, entry) in entries.enumerate() {
                        if let Some(entry) = entry.as_object() {
                            path.push(index.to_string());
                            Self::check_links(nested, entry, path, language, report);
                            path.pop();
                        }
                    }
                }
                _ => {}
            }

            path.pop();
        }
    }

    fn check_link(value: &Value, path: &[String], language: Language, report: &mut ValidationReport) {
        if is_blank(value) {
            return;
        }
        let text = value.as_str().map(str::trim).unwrap_or_default();
        if !Self::is_link(text) {
            report.warnings.push(format!(
                "'{}' in {} is not a valid link: {}",
                path.join("."),
                language.name(),
                value
            ));
        }
    }

    /// Whether `text` looks like a link an editor meant to enter.
    fn is_link(text: &str) -> bool {
        let regex = LINK_REGEX.get_or_init(|| {
            Regex::new(r"^(https?://[^\s/?#]+\.[^\s]*|https?://localhost[^\s]*|/[^\s]*|mailto:[^\s@]+@[^\s]+|tel:\+?[0-9 ().-]+)$")
                .unwrap()
        });
        regex.is_match(text)
    }
}

fn list_len(record: &LanguageRecord, field: &str) -> usize {
    record
        .get(field)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeepRule, PresenceRule};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("media")
            .field(FieldSpec::scalar("heroTitle"))
            .field(
                FieldSpec::group_list(
                    "articles",
                    vec![
                        FieldSpec::scalar("label"),
                        FieldSpec::flat_list("links").url(),
                    ],
                )
                .keep(KeepRule::AnyOf(vec!["label", "links"])),
            )
            .field(FieldSpec::scalar("website").url())
            .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
    }

    fn translations(fr: Value, ar: Value, en: Value) -> Translations {
        Translations::from_value(&json!({"fr": fr, "ar": ar, "en": en}))
    }

    // ==================== Link Pattern Tests ====================

    #[test]
    fn test_is_link_accepts_common_forms() {
        assert!(TranslationValidator::is_link("https://example.org/page"));
        assert!(TranslationValidator::is_link("http://localhost:3000"));
        assert!(TranslationValidator::is_link("/contact"));
        assert!(TranslationValidator::is_link("mailto:info@example.org"));
        assert!(TranslationValidator::is_link("tel:+212 5 22 00 00 00"));
    }

    #[test]
    fn test_is_link_rejects_plain_text() {
        assert!(!TranslationValidator::is_link("example"));
        assert!(!TranslationValidator::is_link("www example org"));
        assert!(!TranslationValidator::is_link("https://"));
    }

    // ==================== Completeness Tests ====================

    #[test]
    fn test_complete_translations_are_clean() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(
                json!({"heroTitle": "Médias", "website": "https://a.org"}),
                json!({"heroTitle": "إعلام"}),
                json!({"heroTitle": "Media"}),
            ),
        );
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_empty_canonical_is_an_error() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(json!({}), json!({"heroTitle": "إعلام"}), json!({"heroTitle": "Media"})),
        );
        assert!(report.has_errors());
        assert!(report.errors[0].contains("French"));
    }

    #[test]
    fn test_missing_language_warns_about_fallback() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(json!({"heroTitle": "Médias"}), json!({"heroTitle": "إعلام"}), json!(null)),
        );
        assert!(!report.has_errors());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("English"));
        assert!(report.warnings[0].contains("fall back"));
    }

    #[test]
    fn test_list_length_mismatch_warns() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(
                json!({"heroTitle": "M", "articles": [{"label": "a"}, {"label": "b"}]}),
                json!({"heroTitle": "M", "articles": [{"label": "a"}]}),
                json!({"heroTitle": "M", "articles": []}),
            ),
        );
        assert_eq!(report.warnings.len(), 1, "{report:?}");
        assert!(report.warnings[0].contains("'articles' has 1 entries in Arabic but 2"));
    }

    #[test]
    fn test_invalid_nested_link_reported_with_path() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(
                json!({"heroTitle": "M", "articles": [{"label": "a", "links": ["https://ok.org", "not a link", ""]}]}),
                json!({"heroTitle": "M"}),
                json!({"heroTitle": "M"}),
            ),
        );
        assert_eq!(report.warnings.len(), 1, "{report:?}");
        assert!(report.warnings[0].contains("'articles.0.links' in French"));
    }

    #[test]
    fn test_non_string_link_reported() {
        let report = TranslationValidator::validate(
            &schema(),
            &translations(
                json!({"heroTitle": "M", "website": 42}),
                json!({"heroTitle": "M"}),
                json!({"heroTitle": "M"}),
            ),
        );
        assert!(report.warnings.iter().any(|w| w.contains("'website'")));
    }
}
