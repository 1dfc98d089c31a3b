use std::env;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::types::RawResult;

const API_BASE: &str = "https://serpapi.com";
const SEARCH_PATH: &str = "/search.json";
const SEED_ENGINE: &str = "google";
const RELATED_ENGINE: &str = "google_related_questions";
const ERROR_SNIPPET_CHARS: usize = 200;

/// SerpApi answers an empty Google result page with 200 and this error text.
const NO_RESULTS_NOTICE: &str = "Google hasn't returned any results";

#[derive(Debug, thiserror::Error)]
pub enum SerpApiError {
    #[error("SERPAPI_API_KEY not set. Get one at https://serpapi.com/manage-api-key")]
    ApiKeyNotSet,

    #[error("SerpApi rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("SerpApi rejected the request: {0}")]
    Unauthorized(String),

    #[error("SerpApi error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// The two calls the tree builder needs from a search provider.
/// Implemented by `SerpApiClient` for production; mock implementations used in tests.
pub trait SearchClient {
    /// Seed search for `query`.
    async fn search(&self, query: &str, force_fresh: bool) -> Result<RawResult, SerpApiError>;

    /// Follow-up questions for a question's continuation token.
    async fn fetch_more(&self, token: &str, force_fresh: bool)
        -> Result<RawResult, SerpApiError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Optional `hl` / `gl` parameters sent with every request.
#[derive(Debug, Clone, Default)]
pub struct Locale {
    pub hl: Option<String>,
    pub gl: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SerpApiClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    locale: Locale,
}

impl SerpApiClient {
    pub fn from_env(http: Client) -> Result<Self, SerpApiError> {
        let api_key = env::var("SERPAPI_API_KEY").map_err(|_| SerpApiError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(SerpApiError::ApiKeyNotSet);
        }
        let base_url = env::var("SERPAPI_BASE_URL")
            .ok()
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| API_BASE.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url,
            locale: Locale::default(),
        })
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.to_string(),
            locale: Locale::default(),
        }
    }

    async fn get(
        &self,
        engine: &str,
        params: &[(&str, &str)],
        force_fresh: bool,
    ) -> Result<RawResult, SerpApiError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);

        let mut query: Vec<(&str, &str)> = vec![("engine", engine)];
        query.extend_from_slice(params);
        if let Some(hl) = self.locale.hl.as_deref() {
            query.push(("hl", hl));
        }
        if let Some(gl) = self.locale.gl.as_deref() {
            query.push(("gl", gl));
        }
        if force_fresh {
            query.push(("no_cache", "true"));
        }
        query.push(("api_key", self.api_key.0.as_str()));

        // reqwest errors embed the request URL, which carries the key.
        let response = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .query(&query)
            .send()
            .await
            .map_err(|e| SerpApiError::Network(e.without_url()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(engine, "SerpApi rate limited");
            return Err(SerpApiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let classified = classify_status(status.as_u16(), error_message(&text));
            warn!(engine, error = %classified, "SerpApi error");
            return Err(classified);
        }

        let mut body: RawResult = response
            .json()
            .await
            .map_err(|e| SerpApiError::Network(e.without_url()))?;

        if let Some(message) = body.error.take() {
            if message.starts_with(NO_RESULTS_NOTICE) {
                debug!(engine, "SerpApi returned no results");
                return Ok(RawResult::default());
            }
            warn!(engine, %message, "SerpApi error in 200 response");
            return Err(SerpApiError::Api {
                code: status.as_u16(),
                message,
            });
        }

        debug!(
            engine,
            questions = body.related_questions.as_ref().map_or(0, Vec::len),
            "SerpApi call complete"
        );
        Ok(body)
    }
}

impl SearchClient for SerpApiClient {
    async fn search(&self, query: &str, force_fresh: bool) -> Result<RawResult, SerpApiError> {
        self.get(SEED_ENGINE, &[("q", query)], force_fresh).await
    }

    async fn fetch_more(
        &self,
        token: &str,
        force_fresh: bool,
    ) -> Result<RawResult, SerpApiError> {
        self.get(RELATED_ENGINE, &[("next_page_token", token)], force_fresh)
            .await
    }
}

/// Pulls `error` out of a JSON error body, else returns a short snippet of the raw text.
fn error_message(text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<RawResult>(text)
        && let Some(message) = body.error
    {
        return message;
    }
    let end = text.floor_char_boundary(ERROR_SNIPPET_CHARS);
    text[..end].to_string()
}

fn classify_status(code: u16, message: String) -> SerpApiError {
    match code {
        429 => SerpApiError::RateLimited,
        401 | 403 => SerpApiError::Unauthorized(message),
        _ => SerpApiError::Api { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_401_and_403_as_unauthorized() {
        assert!(matches!(
            classify_status(401, "Invalid API key.".into()),
            SerpApiError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_status(403, "Quota exceeded".into()),
            SerpApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn classify_500_as_generic_api_error() {
        match classify_status(500, "boom".into()) {
            SerpApiError::Api { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn error_message_prefers_json_error_field() {
        assert_eq!(
            error_message(r#"{"error": "Invalid API key."}"#),
            "Invalid API key."
        );
    }

    #[test]
    fn error_message_truncates_plain_text() {
        let text = "é".repeat(300);
        let message = error_message(&text);
        assert!(message.len() <= ERROR_SNIPPET_CHARS);
        assert!(message.starts_with('é'));
    }

    #[test]
    fn debug_output_redacts_key() {
        let client = SerpApiClient::with_base_url(Client::new(), "http://localhost");
        let printed = format!("{client:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("test-key"));
    }
}
