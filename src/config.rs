use crate::form::DesyncPolicy;
use crate::i18n::Language;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Content API
    pub api_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,

    // Editing
    pub strict_sync: bool,
    pub default_language: Language,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("CONTENT_DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .context("CONTENT_DEFAULT_LANGUAGE is not a supported language")?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            // Content API
            api_url: std::env::var("CONTENT_API_URL")
                .context("CONTENT_API_URL not set")?
                .trim_end_matches('/')
                .to_string(),
            api_token: std::env::var("CONTENT_API_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            request_timeout_secs: std::env::var("CONTENT_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15),

            // Editing
            strict_sync: std::env::var("CONTENT_STRICT_SYNC")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(cfg!(debug_assertions)),
            default_language,
        })
    }

    /// Desync policy for edit trees built under this configuration.
    pub fn desync_policy(&self) -> DesyncPolicy {
        if self.strict_sync {
            DesyncPolicy::Panic
        } else {
            DesyncPolicy::Ignore
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
