//! Internationalization (i18n) module for multi-language page content.
//!
//! All language-related knowledge used by the content engine lives here: which
//! languages a page carries, the order in which they stand in for each other on
//! the public site, the localized status messages shown to editors, and the
//! completeness checks run across translations before a save.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and fallback order
//! - `language`: Type-safe `Language` validated against the registry
//! - `strings`: Localized editor-facing status messages
//! - `validator`: Cross-language completeness report
//! - `metrics`: Engine observability counters
//!
//! # Example
//!
//! ```rust,ignore
//! use page_content_engine::i18n::{Language, LanguageRegistry};
//!
//! let canonical = Language::canonical(); // French
//! let arabic = Language::from_code("ar")?;
//! let order = LanguageRegistry::get().fallback_order();
//! ```

mod language;
mod metrics;
mod registry;
mod strings;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, SyncMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
pub use validator::{TranslationValidator, ValidationReport};
