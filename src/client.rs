use crate::catalog::PageType;
use crate::config::Config;
use crate::error::ApiStatusError;
use crate::page::{NewPage, PageContent, PageFlags, PageUpdate};
use crate::retry::{with_retry_if, RetryConfig};
use crate::serialize::Envelope;
use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// Client for the content API, relative to `CONTENT_API_URL`:
/// - `GET    /pages/slug/{slug}`       fetch, 404 when the page does not exist
/// - `POST   /pages`                   create
/// - `PATCH  /pages/{id}`              partial update
/// - `POST   /pages/{id}/publish`      publish
/// - `POST   /pages/{id}/unpublish`    unpublish
#[derive(Debug, Clone)]
pub struct ContentApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry: RetryConfig,
}

impl ContentApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(
            client,
            &config.api_url,
            config.api_token.clone(),
        ))
    }

    /// Build from an existing client (tests point this at a mock server).
    pub fn with_client(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            retry: RetryConfig::content_api(),
        }
    }

    /// Override the retry policy used for idempotent calls.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch a page by slug. `Ok(None)` means the page does not exist yet.
    pub async fn fetch_page_by_slug(&self, slug: &str) -> Result<Option<PageContent>> {
        let url = format!("{}/pages/slug/{}", self.base_url, slug);

        with_retry_if(
            &self.retry,
            &format!("Fetch page '{}'", slug),
            || async {
                let response = self
                    .authorized(self.client.get(&url))
                    .send()
                    .await
                    .context("Failed to send fetch request to content API")?;

                if response.status() == StatusCode::NOT_FOUND {
                    debug!("Page '{}' not found", slug);
                    return Ok(None);
                }

                let page = parse_page(response).await?;
                Ok(Some(page))
            },
            is_retryable_error,
        )
        .await
    }

    /// Create a page. Runs a single attempt: a lost response would otherwise create twice.
    pub async fn create_page(
        &self,
        slug: &str,
        page_type: PageType,
        envelope: &Envelope,
        flags: PageFlags,
    ) -> Result<PageContent> {
        let url = format!("{}/pages", self.base_url);
        let body = NewPage {
            slug: slug.to_string(),
            page_type,
            title: envelope.title.clone(),
            content: envelope.content_json(),
            is_published: flags.is_published,
            is_active: flags.is_active,
        };

        let page = with_retry_if(
            &RetryConfig::once(),
            &format!("Create page '{}'", slug),
            || async {
                let response = self
                    .authorized(self.client.post(&url))
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to send create request to content API")?;
                parse_page(response).await
            },
            is_retryable_error,
        )
        .await?;

        info!("Created page '{}' (id {})", page.slug, page.id);
        Ok(page)
    }

    /// Apply a partial update to an existing page.
    pub async fn update_page(&self, id: &str, update: &PageUpdate) -> Result<PageContent> {
        let url = format!("{}/pages/{}", self.base_url, id);

        let page = with_retry_if(
            &self.retry,
            &format!("Update page {}", id),
            || async {
                let response = self
                    .authorized(self.client.patch(&url))
                    .json(update)
                    .send()
                    .await
                    .context("Failed to send update request to content API")?;
                parse_page(response).await
            },
            is_retryable_error,
        )
        .await?;

        info!("Updated page '{}' (id {})", page.slug, page.id);
        Ok(page)
    }

    pub async fn publish(&self, id: &str) -> Result<PageContent> {
        self.post_action(id, "publish").await
    }

    pub async fn unpublish(&self, id: &str) -> Result<PageContent> {
        self.post_action(id, "unpublish").await
    }

    async fn post_action(&self, id: &str, action: &str) -> Result<PageContent> {
        let url = format!("{}/pages/{}/{}", self.base_url, id, action);

        with_retry_if(
            &self.retry,
            &format!("{} page {}", action, id),
            || async {
                let response = self
                    .authorized(self.client.post(&url))
                    .send()
                    .await
                    .with_context(|| format!("Failed to send {} request to content API", action))?;
                parse_page(response).await
            },
            is_retryable_error,
        )
        .await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn parse_page(response: Response) -> Result<PageContent> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(ApiStatusError {
            status: status.as_u16(),
            body,
        }
        .into());
    }

    response
        .json()
        .await
        .context("Failed to parse content API page response")
}

/// Retry 429 and 5xx responses plus transport failures; other statuses and
/// unreadable responses will fail the same way again.
fn is_retryable_error(error: &anyhow::Error) -> bool {
    if let Some(status) = error.downcast_ref::<ApiStatusError>() {
        return status.is_retryable();
    }
    error
        .chain()
        .any(|cause| cause.downcast_ref::<reqwest::Error>().is_some_and(|e| !e.is_decode()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Translations;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn api(server: &MockServer, token: Option<&str>) -> ContentApi {
        ContentApi::with_client(
            reqwest::Client::new(),
            &server.uri(),
            token.map(str::to_string),
        )
        .with_retry(RetryConfig::new(3, Duration::from_millis(5)))
    }

    fn page_json(id: &str, content: &str) -> serde_json::Value {
        json!({
            "id": id,
            "slug": "faq",
            "pageType": "FAQ",
            "title": "FAQ",
            "content": content,
            "isPublished": false,
            "isActive": true
        })
    }

    // ==================== Fetch Tests ====================

    #[tokio::test]
    async fn test_fetch_existing_page_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/slug/faq"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json("7", "{}")))
            .expect(1)
            .mount(&server)
            .await;

        let page = api(&server, Some("secret"))
            .fetch_page_by_slug("faq")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.id, "7");
        assert_eq!(page.page_type, PageType::Faq);
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/slug/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let page = api(&server, None).fetch_page_by_slug("missing").await.unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_fetch_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/slug/faq"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pages/slug/faq"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json("7", "{}")))
            .mount(&server)
            .await;

        let page = api(&server, None).fetch_page_by_slug("faq").await.unwrap();
        assert!(page.is_some());
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/slug/faq"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let err = api(&server, None).fetch_page_by_slug("faq").await.unwrap_err();
        let status = err.downcast_ref::<ApiStatusError>().unwrap();
        assert_eq!(status.status, 401);
        assert_eq!(status.body, "unauthorized");
    }

    // ==================== Write Tests ====================

    #[tokio::test]
    async fn test_create_page_sends_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(body_partial_json(json!({
                "slug": "faq",
                "pageType": "FAQ",
                "title": "Questions",
                "isPublished": false,
                "isActive": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(page_json("9", "{}")))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = Envelope {
            translations: Translations::new(),
            title: "Questions".to_string(),
        };
        let page = api(&server, None)
            .create_page("faq", PageType::Faq, &envelope, PageFlags::default())
            .await
            .unwrap();
        assert_eq!(page.id, "9");
    }

    #[tokio::test]
    async fn test_create_page_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = Envelope {
            translations: Translations::new(),
            title: String::new(),
        };
        let result = api(&server, None)
            .create_page("faq", PageType::Faq, &envelope, PageFlags::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_page_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/pages/9"))
            .and(body_partial_json(json!({"content": "{\"translations\":{}}"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json("9", "{\"translations\":{}}")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let update = PageUpdate {
            content: Some("{\"translations\":{}}".to_string()),
            ..Default::default()
        };
        let page = api(&server, None).update_page("9", &update).await.unwrap();
        assert_eq!(page.content, "{\"translations\":{}}");
    }

    #[tokio::test]
    async fn test_publish_and_unpublish() {
        let server = MockServer::start().await;
        let mut published = page_json("9", "{}");
        published["isPublished"] = json!(true);

        Mock::given(method("POST"))
            .and(path("/pages/9/publish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&published))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pages/9/unpublish"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json("9", "{}")))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server, None);
        assert!(api.publish("9").await.unwrap().is_published);
        assert!(!api.unpublish("9").await.unwrap().is_published);
    }

    // ==================== Retry Predicate Tests ====================

    #[test]
    fn test_is_retryable_error() {
        let server_error: anyhow::Error = ApiStatusError {
            status: 502,
            body: String::new(),
        }
        .into();
        assert!(is_retryable_error(&server_error));

        let client_error: anyhow::Error = ApiStatusError {
            status: 422,
            body: String::new(),
        }
        .into();
        assert!(!is_retryable_error(&client_error));

        assert!(!is_retryable_error(&anyhow::anyhow!("unexpected shape")));
    }
}
