use crate::i18n::Language;
use crate::schema::{is_blank, FieldKind, PresenceRule, Schema};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Schema-shaped content for one language of one page.
///
/// Field order follows insertion order, which the engine keeps equal to
/// schema order when it builds records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LanguageRecord(Map<String, Value>);

impl LanguageRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value. Anything other than an object yields
    /// `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// A record with every schema field present and empty: scalars as empty
    /// string, lists as empty arrays.
    pub fn empty(schema: &Schema) -> Self {
        let mut map = Map::new();
        for field in &schema.fields {
            let value = match field.kind {
                FieldKind::Scalar { .. } | FieldKind::Sequence => Value::String(String::new()),
                FieldKind::FlatList { .. } | FieldKind::GroupList { .. } => {
                    Value::Array(Vec::new())
                }
            };
            map.insert(field.name.to_string(), value);
        }
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Text of a scalar field, or "" when absent or not a string.
    pub fn text(&self, field: &str) -> &str {
        self.0.get(field).and_then(Value::as_str).unwrap_or("")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Whether this record has content of its own under the schema's
    /// presence rule.
    pub fn has_presence(&self, schema: &Schema) -> bool {
        let filled = |name: &str| match (self.0.get(name), schema.find(name)) {
            (Some(value), Some(field)) => field.has_content(value),
            (Some(value), None) => !is_blank(value),
            (None, _) => false,
        };

        match &schema.presence {
            PresenceRule::Fields(fields) => fields.iter().any(|name| filled(name)),
            PresenceRule::FieldsOrFirstList(fields) => {
                fields.iter().any(|name| filled(name))
                    || schema.first_list().is_some_and(|list| filled(list.name))
            }
        }
    }
}

impl From<Map<String, Value>> for LanguageRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Stored records keyed by language, iterated in fallback order (fr, ar, en).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    records: BTreeMap<Language, LanguageRecord>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a stored `translations` object.
    ///
    /// Lossy by construction: unknown language codes and non-object records are
    /// skipped with a warning rather than failing the whole page.
    pub fn from_value(value: &Value) -> Self {
        let mut translations = Self::new();
        let Some(map) = value.as_object() else {
            warn!("Stored translations are not an object, ignoring them");
            return translations;
        };

        for (code, record) in map {
            let Ok(language) = Language::from_code(code) else {
                warn!("Skipping stored translation for unsupported language '{}'", code);
                continue;
            };
            match LanguageRecord::from_value(record.clone()) {
                Some(record) => translations.insert(language, record),
                None if record.is_null() => {}
                None => warn!(
                    "Stored translation for '{}' is not an object, treating it as absent",
                    code
                ),
            }
        }

        translations
    }

    pub fn get(&self, language: Language) -> Option<&LanguageRecord> {
        self.records.get(&language)
    }

    pub fn insert(&mut self, language: Language, record: LanguageRecord) {
        self.records.insert(language, record);
    }

    pub fn contains(&self, language: Language) -> bool {
        self.records.contains_key(&language)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &LanguageRecord)> {
        self.records.iter().map(|(language, record)| (*language, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fill every absent language with an empty schema-shaped record. Present
    /// records are left untouched.
    pub fn complete(mut self, schema: &Schema) -> Self {
        for language in Language::all() {
            self.records
                .entry(language)
                .or_insert_with(|| LanguageRecord::empty(schema));
        }
        self
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .records
            .iter()
            .map(|(language, record)| (language.code().to_string(), record.clone().into_value()))
            .collect();
        Value::Object(map)
    }
}

impl Serialize for Translations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.records.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn home_schema() -> Schema {
        Schema::new("home")
            .field(FieldSpec::scalar("heroTitle"))
            .field(FieldSpec::flat_list("items"))
            .field(FieldSpec::group_list(
                "steps",
                vec![FieldSpec::sequence("stepNumber"), FieldSpec::scalar("title")],
            ))
            .presence(PresenceRule::FieldsOrFirstList(vec!["heroTitle"]))
    }

    // ==================== LanguageRecord Tests ====================

    #[test]
    fn test_empty_record_is_schema_shaped() {
        let record = LanguageRecord::empty(&home_schema());
        assert_eq!(
            record.into_value(),
            json!({"heroTitle": "", "items": [], "steps": []})
        );
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(LanguageRecord::from_value(json!([1, 2])).is_none());
        assert!(LanguageRecord::from_value(json!("text")).is_none());
        assert!(LanguageRecord::from_value(json!({})).is_some());
    }

    #[test]
    fn test_text_defaults_to_empty() {
        let record = LanguageRecord::from_value(json!({"heroTitle": "T", "n": 3})).unwrap();
        assert_eq!(record.text("heroTitle"), "T");
        assert_eq!(record.text("n"), "");
        assert_eq!(record.text("missing"), "");
    }

    #[test]
    fn test_presence_by_title() {
        let schema = home_schema();
        let record = LanguageRecord::from_value(json!({"heroTitle": "Bonjour"})).unwrap();
        assert!(record.has_presence(&schema));
    }

    #[test]
    fn test_presence_by_first_list() {
        let schema = home_schema();
        let record = LanguageRecord::from_value(json!({"heroTitle": "", "items": ["a"]})).unwrap();
        assert!(record.has_presence(&schema));
    }

    #[test]
    fn test_blank_list_entries_are_not_presence() {
        let schema = home_schema();
        let blank_items = LanguageRecord::from_value(json!({"heroTitle": "", "items": ["", " "]})).unwrap();
        assert!(!blank_items.has_presence(&schema));

        let schema = Schema::new("steps")
            .field(FieldSpec::group_list(
                "steps",
                vec![FieldSpec::sequence("stepNumber"), FieldSpec::scalar("title")],
            ))
            .presence(PresenceRule::FieldsOrFirstList(vec![]));
        let numbered_only =
            LanguageRecord::from_value(json!({"steps": [{"stepNumber": 1, "title": ""}]})).unwrap();
        assert!(!numbered_only.has_presence(&schema));
    }

    #[test]
    fn test_presence_fields_only_ignores_lists() {
        let schema = home_schema().presence(PresenceRule::Fields(vec!["heroTitle"]));
        let record = LanguageRecord::from_value(json!({"heroTitle": " ", "items": ["a"]})).unwrap();
        assert!(!record.has_presence(&schema));
    }

    #[test]
    fn test_empty_record_has_no_presence() {
        let schema = home_schema();
        assert!(!LanguageRecord::empty(&schema).has_presence(&schema));
    }

    // ==================== Translations Tests ====================

    #[test]
    fn test_from_value_skips_unknown_languages_and_non_objects() {
        let stored = json!({
            "fr": {"heroTitle": "Bonjour"},
            "es": {"heroTitle": "Hola"},
            "ar": "oops",
            "en": null
        });
        let translations = Translations::from_value(&stored);
        assert_eq!(translations.len(), 1);
        assert!(translations.contains(Language::FRENCH));
        assert!(!translations.contains(Language::ARABIC));
    }

    #[test]
    fn test_complete_fills_only_missing() {
        let schema = home_schema();
        let mut translations = Translations::new();
        let fr = LanguageRecord::from_value(json!({"heroTitle": "T"})).unwrap();
        translations.insert(Language::FRENCH, fr.clone());

        let completed = translations.complete(&schema);
        assert_eq!(completed.len(), 3);
        assert_eq!(completed.get(Language::FRENCH), Some(&fr));
        assert_eq!(
            completed.get(Language::ENGLISH),
            Some(&LanguageRecord::empty(&schema))
        );
    }

    #[test]
    fn test_serializes_in_fallback_order() {
        let schema = home_schema();
        let translations = Translations::new().complete(&schema);
        let json = serde_json::to_string(&translations).unwrap();
        let fr = json.find("\"fr\"").unwrap();
        let ar = json.find("\"ar\"").unwrap();
        let en = json.find("\"en\"").unwrap();
        assert!(fr < ar && ar < en);
        assert_eq!(serde_json::to_value(&translations).unwrap(), translations.to_value());
    }
}
