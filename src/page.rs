use crate::catalog::PageType;
use crate::migrate::{migrate, StoredPayload};
use crate::record::Translations;
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One stored page.
///
/// `content` is opaque JSON text owned by the engine: the API stores and
/// returns it without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub slug: String,
    pub page_type: PageType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageContent {
    /// Classify the stored content string.
    pub fn payload(&self) -> StoredPayload {
        StoredPayload::parse(&self.content)
    }

    /// Stored content brought to the current format for `schema`.
    pub fn translations(&self, schema: &Schema) -> Translations {
        migrate(self.payload(), schema)
    }

    pub fn flags(&self) -> PageFlags {
        PageFlags {
            is_published: self.is_published,
            is_active: self.is_active,
        }
    }
}

/// Page-level visibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFlags {
    pub is_published: bool,
    pub is_active: bool,
}

impl Default for PageFlags {
    fn default() -> Self {
        Self {
            is_published: false,
            is_active: true,
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub slug: String,
    pub page_type: PageType,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub is_active: bool,
}

/// Body of an update request; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
