use crate::i18n::{Language, SyncMetrics};
use crate::record::{LanguageRecord, Translations};
use crate::schema::Schema;
use serde_json::Value;
use tracing::{debug, warn};

/// Key marking the multi-language envelope format.
pub const TRANSLATIONS_KEY: &str = "translations";

/// A stored content payload, classified by format.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredPayload {
    /// Single-language content written before translations existed
    Legacy(LanguageRecord),

    /// Multi-language envelope (`{"translations": {...}}`)
    Current(Translations),

    /// Content that is not a JSON object
    Malformed { reason: String },
}

impl StoredPayload {
    /// Classify a stored content string.
    ///
    /// Blank content is a page with nothing entered yet, not an error.
    pub fn parse(content: &str) -> Self {
        if content.trim().is_empty() {
            debug!("Stored content is blank, treating it as an empty envelope");
            return StoredPayload::Current(Translations::new());
        }

        match serde_json::from_str::<Value>(content) {
            Ok(value) => Self::from_value(value),
            Err(e) => StoredPayload::Malformed {
                reason: format!("invalid JSON: {}", e),
            },
        }
    }

    /// Classify an already-decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove(TRANSLATIONS_KEY) {
                Some(translations) => {
                    StoredPayload::Current(Translations::from_value(&translations))
                }
                None => StoredPayload::Legacy(LanguageRecord::from(map)),
            },
            other => StoredPayload::Malformed {
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            },
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredPayload::Legacy(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, StoredPayload::Malformed { .. })
    }
}

/// Bring a stored payload to the current format: one record per language.
///
/// * Current payloads keep their stored records; only absent languages are
///   synthesized as empty schema-shaped records.
/// * Legacy payloads become the canonical (French) record, with the other
///   languages empty.
/// * Malformed payloads are logged and replaced by empty records everywhere.
pub fn migrate(payload: StoredPayload, schema: &Schema) -> Translations {
    match payload {
        StoredPayload::Current(translations) => translations.complete(schema),
        StoredPayload::Legacy(record) => {
            debug!(
                "Migrating legacy single-language content for '{}' to {}",
                schema.name,
                Language::canonical()
            );
            SyncMetrics::global().record_legacy_migration();
            let mut translations = Translations::new();
            translations.insert(Language::canonical(), record);
            translations.complete(schema)
        }
        StoredPayload::Malformed { reason } => {
            warn!(
                "Stored content for '{}' is unreadable ({}), starting from empty records",
                schema.name, reason
            );
            SyncMetrics::global().record_malformed_recovery();
            Translations::new().complete(schema)
        }
    }
}

/// Parse and migrate a stored content string in one step.
pub fn migrate_content(content: &str, schema: &Schema) -> Translations {
    migrate(StoredPayload::parse(content), schema)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
