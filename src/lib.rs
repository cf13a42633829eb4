//! Multilingual page content engine.
//!
//! Pages store their content as opaque JSON text. This crate owns that text:
//! it reads legacy single-language payloads and current `{"translations": …}`
//! envelopes, picks what to display for a language with fr → ar → en
//! fallback, keeps an editable form tree in sync with per-language records,
//! and writes the tree back as a clean envelope with a promoted title.
//!
//! Every page type runs through the same engine; a [`schema::Schema`] is all
//! that differs between them.
//!
//! ```rust,ignore
//! use page_content_engine::{catalog::SchemaCatalog, form::*, i18n::Language, migrate, serialize};
//!
//! let schema = SchemaCatalog::get().schema("home").unwrap();
//! let translations = migrate::migrate_content(r#"{"heroTitle":"T"}"#, schema);
//! let mut tree = FormTree::from_translations(schema, &translations, DesyncPolicy::default());
//! tree.add_entry(Language::ENGLISH, "items", Some(&"c".into()));
//! let envelope = serialize::build_envelope(schema, serialize::serialize_all(&tree));
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod i18n;
pub mod migrate;
pub mod page;
pub mod record;
pub mod resolve;
pub mod retry;
pub mod schema;
pub mod serialize;

pub use error::{ApiStatusError, LoadError, SaveError, SyncError};
pub use form::{DesyncPolicy, FieldPath, FormTree};
pub use i18n::Language;
pub use migrate::{migrate, StoredPayload};
pub use record::{LanguageRecord, Translations};
pub use resolve::resolve;
pub use schema::Schema;
pub use serialize::{build_envelope, serialize, Envelope};
