use std::time::Duration;

use async_trait::async_trait;
use guard_core::{GuardError, LlmConfig, Result};
use serde::Serialize;
use tracing::debug;

use crate::verdict::FAILED_VERDICT;

/// Anything that can turn a prompt into a verdict.
///
/// Implementations never fail: a backend that cannot produce an answer
/// returns [`FAILED_VERDICT`] so the push is blocked.
#[async_trait]
pub trait VerdictBackend: Send + Sync {
    /// Send `prompt` and return the reply text.
    async fn verdict(&self, prompt: &str) -> String;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Google Gemini `generateContent` client.
///
/// Sends one request per call, with no retries and no generation
/// parameters; the request is bounded by `timeout_secs`.
///
/// # Examples
///
/// ```
/// use guard_core::LlmConfig;
/// use guard_review::llm::GeminiClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = GeminiClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gemini-1.5-flash");
/// ```
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl GeminiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Config`] if no API key is set, or
    /// [`GuardError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GuardError::Config("Gemini API key not found".into()))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GuardError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send one `generateContent` request and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Llm`] on transport errors, timeouts, non-2xx
    /// statuses, or a response without candidate text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        debug!(%url, prompt_len = prompt.len(), "sending generateContent request");

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GuardError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(GuardError::Llm(format!("HTTP {status}: {body_text}")));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GuardError::Llm(format!("failed to parse response: {e}")))?;

        extract_text(&response_body).ok_or_else(|| {
            GuardError::Llm(format!("unexpected response structure: {response_body}"))
        })
    }
}

#[async_trait]
impl VerdictBackend for GeminiClient {
    async fn verdict(&self, prompt: &str) -> String {
        match self.generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "AI check failed, blocking");
                eprintln!("{e}");
                FAILED_VERDICT.to_string()
            }
        }
    }
}

/// Concatenate the text parts of the first candidate, trimmed.
fn extract_text(body: &serde_json::Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: String) -> LlmConfig {
        LlmConfig {
            api_key: Some("test-key".into()),
            base_url,
            timeout_secs: 5,
            ..LlmConfig::default()
        }
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = GeminiClient::new(&LlmConfig::default()).err().unwrap();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn blank_key_is_a_config_error() {
        let config = LlmConfig {
            api_key: Some("   ".into()),
            ..LlmConfig::default()
        };
        assert!(GeminiClient::new(&config).is_err());
    }

    #[test]
    fn endpoint_uses_model_and_strips_slash() {
        let client = GeminiClient::new(&config_for("http://localhost:9/".into())).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn extract_text_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "SAFE " }, { "text": "TO RELEASE\n" }] } }]
        });
        assert_eq!(extract_text(&body).as_deref(), Some("SAFE TO RELEASE"));
        assert_eq!(extract_text(&serde_json::json!({ "candidates": [] })), None);
    }

    #[tokio::test]
    async fn verdict_returns_model_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{ "parts": [{ "text": "review me" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("  SAFE TO RELEASE \n")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(server.uri())).unwrap();
        assert_eq!(client.verdict("review me").await, "SAFE TO RELEASE");
    }

    #[tokio::test]
    async fn http_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(server.uri())).unwrap();
        let err = client.generate("x").await.unwrap_err();
        assert!(matches!(err, GuardError::Llm(_)));
        assert_eq!(
            err.to_string(),
            "Gemini API error: HTTP 500 Internal Server Error: boom"
        );
    }

    #[tokio::test]
    async fn http_error_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(server.uri())).unwrap();
        assert_eq!(client.verdict("x").await, FAILED_VERDICT);
    }

    #[tokio::test]
    async fn malformed_body_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "oops": true })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config_for(server.uri())).unwrap();
        assert_eq!(client.verdict("x").await, FAILED_VERDICT);
    }

    #[tokio::test]
    async fn timeout_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("SAFE TO RELEASE"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = LlmConfig {
            timeout_secs: 1,
            ..config_for(server.uri())
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(client.verdict("x").await, FAILED_VERDICT);
    }

    #[tokio::test]
    async fn unreachable_host_fails_closed() {
        let client = GeminiClient::new(&config_for("http://127.0.0.1:1".into())).unwrap();
        assert_eq!(client.verdict("x").await, FAILED_VERDICT);
    }
}
