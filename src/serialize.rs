use crate::form::{FormGroup, FormNode, FormTree};
use crate::i18n::Language;
use crate::migrate::TRANSLATIONS_KEY;
use crate::record::{LanguageRecord, Translations};
use crate::schema::{is_blank, keeps_group, FieldKind, FieldSpec, Schema};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Serialized translations ready to store, with the promoted display title.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub translations: Translations,

    /// First non-empty title field across fr → ar → en ("" if none)
    pub title: String,
}

impl Envelope {
    /// JSON text stored in the page's `content` field.
    pub fn content_json(&self) -> String {
        json!({ TRANSLATIONS_KEY: self.translations.to_value() }).to_string()
    }
}

/// Serialize one language of the tree into a record.
pub fn serialize(tree: &FormTree<'_>, language: Language) -> LanguageRecord {
    let schema = tree.schema();
    match tree.group(language) {
        Some(group) => LanguageRecord::from(serialize_group(&schema.fields, group)),
        None => LanguageRecord::empty(schema),
    }
}

/// Serialize every language of the tree.
pub fn serialize_all(tree: &FormTree<'_>) -> Translations {
    let mut translations = Translations::new();
    for language in Language::all() {
        translations.insert(language, serialize(tree, language));
    }
    translations
}

/// Wrap per-language records into an envelope and promote the display title.
pub fn build_envelope(schema: &Schema, records: Translations) -> Envelope {
    let title = records
        .iter()
        .flat_map(|(_, record)| {
            schema
                .title_fields
                .iter()
                .map(move |field| record.text(field).trim())
        })
        .find(|title| !title.is_empty())
        .unwrap_or_default()
        .to_string();

    debug!("Built envelope for '{}' with title '{}'", schema.name, title);
    Envelope {
        translations: records,
        title,
    }
}

fn serialize_group(fields: &[FieldSpec], group: &FormGroup) -> Map<String, Value> {
    let mut map = Map::new();
    for field in fields {
        let node = group.get(field.name);
        let value = match &field.kind {
            FieldKind::Scalar { .. } | FieldKind::Sequence => node
                .and_then(FormNode::as_value)
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            FieldKind::FlatList { allow_blank, .. } => {
                let items = node
                    .and_then(FormNode::as_list)
                    .into_iter()
                    .flat_map(|array| array.iter())
                    .filter_map(FormNode::as_value)
                    .filter(|item| *allow_blank || !is_blank(item))
                    .cloned()
                    .collect();
                Value::Array(items)
            }
            FieldKind::GroupList { fields, keep } => {
                let mut kept: Vec<Map<String, Value>> = node
                    .and_then(FormNode::as_list)
                    .into_iter()
                    .flat_map(|array| array.iter())
                    .filter_map(FormNode::as_group)
                    .map(|entry| serialize_group(fields, entry))
                    .filter(|entry| keeps_group(fields, keep, entry))
                    .collect();

                if let Some(sequence) = field.sequence_field() {
                    for (position, entry) in kept.iter_mut().enumerate() {
                        entry.insert(sequence.to_string(), Value::from(position + 1));
                    }
                }
                Value::Array(kept.into_iter().map(Value::Object).collect())
            }
        };
        map.insert(field.name.to_string(), value);
    }
    map
}
