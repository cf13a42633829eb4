use crate::i18n::{Language, SyncMetrics};
use crate::record::{LanguageRecord, Translations};
use crate::schema::{FieldKind, FieldSpec, Schema};
use serde_json::{Map, Value};
use tracing::debug;

/// The record chosen for display and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: LanguageRecord,

    /// Language whose stored record was used; `None` when nothing had content
    pub source: Option<Language>,

    pub requested: Language,
}

impl Resolution {
    /// Whether the record shown is not the requested language's own content.
    pub fn is_fallback(&self) -> bool {
        self.source != Some(self.requested)
    }
}

/// Pick the record to display for `requested`.
///
/// The requested language's record is used if it has real content under the
/// schema's presence rule; otherwise the first record with content in fallback
/// order (fr, ar, en); otherwise an empty schema-shaped record. The stored map
/// is never modified.
pub fn resolve(schema: &Schema, translations: &Translations, requested: Language) -> LanguageRecord {
    resolve_with_source(schema, translations, requested).record
}

/// Same as [`resolve`], also reporting which language supplied the content.
pub fn resolve_with_source(
    schema: &Schema,
    translations: &Translations,
    requested: Language,
) -> Resolution {
    let candidates = std::iter::once(requested)
        .chain(Language::all().into_iter().filter(|lang| *lang != requested));

    for language in candidates {
        let Some(stored) = translations.get(language) else {
            continue;
        };
        let record = normalize_aliases(schema, stored);
        if record.has_presence(schema) {
            return Resolution {
                record,
                source: Some(language),
                requested,
            };
        }
    }

    Resolution {
        record: LanguageRecord::empty(schema),
        source: None,
        requested,
    }
}

/// Display path for the public site: resolve and count fallbacks.
pub fn resolve_for_display(
    schema: &Schema,
    translations: &Translations,
    requested: Language,
) -> Resolution {
    let resolution = resolve_with_source(schema, translations, requested);
    if resolution.is_fallback() {
        debug!(
            "No {} content for '{}', displaying {}",
            requested,
            schema.name,
            resolution
                .source
                .map(|lang| lang.code())
                .unwrap_or("empty record")
        );
        SyncMetrics::global().record_fallback_resolution();
    }
    resolution
}

/// Rewrite a stored record into the schema's current shape.
///
/// Values stored under a legacy alias move to the current field name (the
/// current name wins when both exist), a singular alias holding one value is
/// wrapped into a one-element list, and fields the schema does not know are
/// dropped. Fields absent from the source stay absent.
pub fn normalize_aliases(schema: &Schema, record: &LanguageRecord) -> LanguageRecord {
    LanguageRecord::from(normalize_group(&schema.fields, record.as_map()))
}

/// Normalize one group's fields against their specs.
pub(crate) fn normalize_group(fields: &[FieldSpec], source: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::new();
    for field in fields {
        let Some(raw) = lookup(field, source) else {
            continue;
        };
        if let Some(value) = normalize_value(field, raw) {
            normalized.insert(field.name.to_string(), value);
        }
    }
    normalized
}

fn lookup<'a>(field: &FieldSpec, source: &'a Map<String, Value>) -> Option<&'a Value> {
    std::iter::once(field.name)
        .chain(field.aliases.iter().copied())
        .filter_map(|name| source.get(name))
        .find(|value| !value.is_null())
}

fn normalize_value(field: &FieldSpec, raw: &Value) -> Option<Value> {
    match &field.kind {
        FieldKind::Scalar { .. } => match raw {
            Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(raw.clone()),
            _ => None,
        },
        FieldKind::Sequence => match raw {
            Value::Number(_) => Some(raw.clone()),
            Value::String(text) => text.trim().parse::<u64>().ok().map(Value::from),
            _ => None,
        },
        FieldKind::FlatList { .. } => {
            let items = match raw {
                Value::Array(items) => items
                    .iter()
                    .filter(|item| is_scalar(item))
                    .cloned()
                    .collect(),
                scalar if is_scalar(scalar) => vec![scalar.clone()],
                _ => return None,
            };
            Some(Value::Array(items))
        }
        FieldKind::GroupList { fields, .. } => {
            let groups = match raw {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|group| Value::Object(normalize_group(fields, group)))
                    .collect(),
                Value::Object(group) => vec![Value::Object(normalize_group(fields, group))],
                _ => return None,
            };
            Some(Value::Array(groups))
        }
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
