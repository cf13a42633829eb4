//! Preview page binary - shows what the public site displays for a page
//!
//! Usage:
//!   content-preview <slug> [language]     # language defaults to CONTENT_DEFAULT_LANGUAGE
//!   content-preview faq ar
//!
//! Required environment variables:
//! - CONTENT_API_URL

use anyhow::{Context, Result};
use page_content_engine::catalog::SchemaCatalog;
use page_content_engine::client::ContentApi;
use page_content_engine::config::Config;
use page_content_engine::i18n::Language;
use page_content_engine::migrate::migrate;
use page_content_engine::record::Translations;
use page_content_engine::resolve::resolve_for_display;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_content_engine=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let slug = args
        .next()
        .context("Usage: content-preview <slug> [language]")?;

    let config = Config::from_env()?;
    let language = match args.next() {
        Some(code) => Language::from_code(&code)?,
        None => config.default_language,
    };

    let schema = SchemaCatalog::get()
        .schema(&slug)
        .with_context(|| format!("Unknown page slug: {}", slug))?;

    let api = ContentApi::new(&config)?;
    let translations = match api.fetch_page_by_slug(&slug).await? {
        Some(page) => {
            info!("Loaded '{}' (id {}, published: {})", slug, page.id, page.is_published);
            migrate(page.payload(), schema)
        }
        None => {
            info!("'{}' does not exist yet, previewing empty content", slug);
            Translations::new().complete(schema)
        }
    };

    let resolution = resolve_for_display(schema, &translations, language);

    println!("\n{}", "=".repeat(60));
    println!("PAGE: {} [{}]", slug, language.native_name());
    if resolution.is_fallback() {
        let badge = match resolution.source {
            Some(source) => language
                .config()
                .strings
                .format_fallback_badge(source.native_name()),
            None => "(no content in any language)".to_string(),
        };
        println!("{}", badge);
    }
    println!("{}\n", "=".repeat(60));
    println!(
        "{}",
        serde_json::to_string_pretty(&resolution.record)
            .context("Failed to render resolved record")?
    );

    Ok(())
}
