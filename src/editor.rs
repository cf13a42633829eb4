use crate::catalog::PageType;
use crate::client::ContentApi;
use crate::error::{LoadError, SaveError};
use crate::form::{DesyncPolicy, FormTree};
use crate::i18n::{Language, SyncMetrics, TranslationValidator, ValidationReport};
use crate::migrate::migrate;
use crate::page::{PageContent, PageFlags, PageUpdate};
use crate::record::Translations;
use crate::schema::Schema;
use crate::serialize::{build_envelope, serialize_all, Envelope};
use tracing::{info, warn};

/// How the session's content was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Loaded from a stored page
    Existing,

    /// No page with this slug yet; the first save creates it
    New,

    /// Stored content was unreadable; editing starts from empty records
    Recovered,
}

pub struct PageEditor<'s> {
    slug: String,
    page_type: PageType,
    page: Option<PageContent>,
    tree: FormTree<'s>,
    state: LoadState,
}

impl<'s> PageEditor<'s> {
    /// Fetch `slug` and build its edit tree.
    ///
    /// A missing page opens as a new, empty session. A transport failure opens
    /// nothing and returns the localized load-failed message: starting blank
    /// there would create a second page on the next save.
    pub async fn open(
        api: &ContentApi,
        slug: &str,
        page_type: PageType,
        schema: &'s Schema,
        policy: DesyncPolicy,
        ui_language: Language,
    ) -> Result<Self, LoadError> {
        match api.fetch_page_by_slug(slug).await {
            Ok(Some(page)) => Ok(Self::from_page(page, schema, policy)),
            Ok(None) => {
                info!("Page '{}' does not exist yet, starting a new one", slug);
                Ok(Self::blank(slug, page_type, schema, policy))
            }
            Err(e) => {
                let detail = format!("{:#}", e);
                warn!("Loading page '{}' failed: {}", slug, detail);
                Err(LoadError {
                    slug: slug.to_string(),
                    user_message: ui_language.config().strings.format_load_failed(&detail),
                    detail,
                })
            }
        }
    }

    /// A session for a page that has never been saved.
    pub fn blank(slug: &str, page_type: PageType, schema: &'s Schema, policy: DesyncPolicy) -> Self {
        let translations = Translations::new().complete(schema);
        Self {
            slug: slug.to_string(),
            page_type,
            page: None,
            tree: FormTree::from_translations(schema, &translations, policy),
            state: LoadState::New,
        }
    }

    /// A session for a page already fetched.
    pub fn from_page(page: PageContent, schema: &'s Schema, policy: DesyncPolicy) -> Self {
        let payload = page.payload();
        let state = if payload.is_malformed() {
            LoadState::Recovered
        } else {
            LoadState::Existing
        };
        let translations = migrate(payload, schema);

        Self {
            slug: page.slug.clone(),
            page_type: page.page_type,
            tree: FormTree::from_translations(schema, &translations, policy),
            page: Some(page),
            state,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn page(&self) -> Option<&PageContent> {
        self.page.as_ref()
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn tree(&self) -> &FormTree<'s> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut FormTree<'s> {
        &mut self.tree
    }

    /// Status line to show when the session opens, if any.
    pub fn notice(&self, ui_language: Language) -> Option<&'static str> {
        let strings = &ui_language.config().strings;
        match self.state {
            LoadState::Existing => None,
            LoadState::New => Some(strings.page_new_notice),
            LoadState::Recovered => Some(strings.load_fallback_notice),
        }
    }

    /// Current tree contents as a storable envelope.
    pub fn envelope(&self) -> Envelope {
        build_envelope(self.tree.schema(), serialize_all(&self.tree))
    }

    pub fn validate(&self) -> ValidationReport {
        TranslationValidator::validate(self.tree.schema(), &serialize_all(&self.tree))
    }

    /// Save the tree: create the page on first save, update it afterwards.
    ///
    /// On success the tree is reloaded from what was stored, and the localized
    /// confirmation is returned. On failure the tree is left as it was.
    pub async fn save(
        &mut self,
        api: &ContentApi,
        ui_language: Language,
    ) -> Result<&'static str, SaveError> {
        let envelope = self.envelope();
        self.log_report(&envelope.translations);

        let result = match &self.page {
            Some(page) => {
                let update = PageUpdate {
                    title: Some(envelope.title.clone()),
                    content: Some(envelope.content_json()),
                    ..Default::default()
                };
                api.update_page(&page.id, &update).await
            }
            None => {
                api.create_page(&self.slug, self.page_type, &envelope, PageFlags::default())
                    .await
            }
        };

        match result {
            Ok(page) => {
                SyncMetrics::global().record_save();
                for language in Language::all() {
                    self.tree.populate(language, envelope.translations.get(language));
                }
                self.page = Some(page);
                self.state = LoadState::Existing;
                Ok(ui_language.config().strings.save_success)
            }
            Err(e) => {
                SyncMetrics::global().record_save_failure();
                Err(self.save_error(format!("{:#}", e), ui_language))
            }
        }
    }

    pub async fn publish(
        &mut self,
        api: &ContentApi,
        ui_language: Language,
    ) -> Result<&'static str, SaveError> {
        let id = self.saved_id(ui_language)?;
        let page = api
            .publish(&id)
            .await
            .map_err(|e| self.save_error(format!("{:#}", e), ui_language))?;
        info!("Published page '{}'", self.slug);
        self.page = Some(page);
        Ok(ui_language.config().strings.publish_success)
    }

    pub async fn unpublish(
        &mut self,
        api: &ContentApi,
        ui_language: Language,
    ) -> Result<&'static str, SaveError> {
        let id = self.saved_id(ui_language)?;
        let page = api
            .unpublish(&id)
            .await
            .map_err(|e| self.save_error(format!("{:#}", e), ui_language))?;
        info!("Unpublished page '{}'", self.slug);
        self.page = Some(page);
        Ok(ui_language.config().strings.unpublish_success)
    }

    fn saved_id(&self, ui_language: Language) -> Result<String, SaveError> {
        self.page
            .as_ref()
            .map(|page| page.id.clone())
            .ok_or_else(|| self.save_error("page has not been saved yet".to_string(), ui_language))
    }

    fn save_error(&self, detail: String, ui_language: Language) -> SaveError {
        warn!("Saving page '{}' failed: {}", self.slug, detail);
        SaveError {
            slug: self.slug.clone(),
            user_message: ui_language.config().strings.format_save_failed(&detail),
            detail,
        }
    }

    fn log_report(&self, translations: &Translations) {
        let report = TranslationValidator::validate(self.tree.schema(), translations);
        if report.has_warnings() {
            warn!(
                "Translation warnings for '{}': {:?}",
                self.slug, report.warnings
            );
        }
        if report.has_errors() {
            warn!("Translation errors for '{}': {:?}", self.slug, report.errors);
        }
    }
}
