//! Normalize stored page content.
//!
//! Fetches each page, runs it through the engine (migration, alias
//! convergence, empty-entry filtering, renumbering) and writes back the
//! canonical envelope when it differs from what is stored.
//!
//! Usage:
//!   content-normalize                # every catalogued page
//!   content-normalize home faq       # selected slugs
//!   content-normalize --dry-run      # report without writing
//!
//! Required environment variables:
//! - CONTENT_API_URL

use anyhow::{Context, Result};
use page_content_engine::catalog::{CatalogEntry, SchemaCatalog};
use page_content_engine::client::ContentApi;
use page_content_engine::config::Config;
use page_content_engine::form::FormTree;
use page_content_engine::i18n::SyncMetrics;
use page_content_engine::migrate::migrate;
use page_content_engine::page::PageUpdate;
use page_content_engine::serialize::{build_envelope, serialize_all};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_content_engine=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let dry_run = args.iter().any(|arg| arg == "--dry-run");
    let catalog = SchemaCatalog::get();

    let slugs: Vec<String> = args
        .iter()
        .filter(|arg| !arg.starts_with("--"))
        .cloned()
        .collect();
    let entries: Vec<&CatalogEntry> = if slugs.is_empty() {
        catalog
            .slugs()
            .into_iter()
            .filter_map(|slug| catalog.entry(slug))
            .collect()
    } else {
        slugs
            .iter()
            .map(|slug| {
                catalog
                    .entry(slug)
                    .with_context(|| format!("Unknown page slug: {}", slug))
            })
            .collect::<Result<_>>()?
    };

    let config = Config::from_env()?;
    let api = ContentApi::new(&config)?;

    info!(
        "Normalizing {} page(s){}",
        entries.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    let mut changed = 0;
    let mut failed = 0;
    for entry in entries {
        match normalize_page(&api, &config, entry, dry_run).await {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to normalize '{}': {:#}", entry.slug, e);
                failed += 1;
            }
        }
    }

    info!("{} page(s) rewritten, {} failed", changed, failed);
    info!("{}", SyncMetrics::global().report().summary_line());

    if failed > 0 {
        anyhow::bail!("{} page(s) could not be normalized", failed);
    }
    Ok(())
}

/// Returns whether the page needed rewriting.
async fn normalize_page(
    api: &ContentApi,
    config: &Config,
    entry: &CatalogEntry,
    dry_run: bool,
) -> Result<bool> {
    let Some(page) = api.fetch_page_by_slug(entry.slug).await? else {
        info!("'{}' does not exist, nothing to normalize", entry.slug);
        return Ok(false);
    };

    let schema = &entry.schema;
    let translations = migrate(page.payload(), schema);
    let tree = FormTree::from_translations(schema, &translations, config.desync_policy());
    let envelope = build_envelope(schema, serialize_all(&tree));
    let content = envelope.content_json();

    if content == page.content && envelope.title == page.title {
        info!("'{}' is already canonical", entry.slug);
        return Ok(false);
    }

    if dry_run {
        info!("'{}' would be rewritten (title '{}')", entry.slug, envelope.title);
        return Ok(true);
    }

    let update = PageUpdate {
        title: Some(envelope.title),
        content: Some(content),
        ..Default::default()
    };
    api.update_page(&page.id, &update).await?;
    info!("'{}' rewritten", entry.slug);
    Ok(true)
}
