//! Minimal OpenAI chat-completions client.
//!
//! One reused [`reqwest::Client`] per [`ChatClient`]; a completion is a
//! single-turn exchange with one system-role message and default sampling
//! parameters. No retry: the first transport failure is fatal to the run.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use pepsum_shared::{OpenAiConfig, PepsumError, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("pepsum/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Handle to the chat-completions endpoint, reused across both LLM calls.
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new client for the configured endpoint and model.
    pub fn new(config: &OpenAiConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PepsumError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// The model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Submit a single system-role message and return the raw model text.
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PepsumError::Transport(format!("chat completion request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PepsumError::Transport(format!(
                "LLM endpoint returned HTTP {status}: {}",
                truncate_on_char_boundary(&body, 200)
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            PepsumError::Transport(format!("LLM endpoint returned an unexpected body: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                PepsumError::Transport("LLM endpoint returned no completion choices".into())
            })?;

        debug!(response_len = content.len(), "completion received");
        Ok(content)
    }
}

/// Cap error-body diagnostics at `max` bytes without splitting a multi-byte
/// character.
fn truncate_on_char_boundary(body: &str, max: usize) -> &str {
    let mut cut = body.len().min(max);
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    &body[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> OpenAiConfig {
        OpenAiConfig {
            api_key_env: "UNUSED".into(),
            model: "gpt-3.5-turbo".into(),
            base_url: server.uri(),
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "system", "content": "hello"}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[8, 572]")))
            .mount(&server)
            .await;

        let client = ChatClient::new(&test_config(&server), "test-key".into()).unwrap();
        let text = client.complete("hello").await.unwrap();
        assert_eq!(text, "[8, 572]");
    }

    #[tokio::test]
    async fn complete_maps_http_error_to_transport() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = ChatClient::new(&test_config(&server), "bad-key".into()).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, PepsumError::Transport(_)));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn complete_truncates_non_ascii_error_body_safely() {
        let server = MockServer::start().await;

        // 199 ASCII bytes followed by a two-byte char puts the truncation
        // cap inside 'é'; the diagnostic must back off to a char boundary
        // rather than panic.
        let body = format!("{}é and more error text", "a".repeat(199));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string(body))
            .mount(&server)
            .await;

        let client = ChatClient::new(&test_config(&server), "test-key".into()).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, PepsumError::Transport(_)));
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains(&"a".repeat(199)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_on_char_boundary("short", 200), "short");
        let s = format!("{}éé", "a".repeat(199));
        assert_eq!(truncate_on_char_boundary(&s, 200), &s[..199]);
        assert_eq!(truncate_on_char_boundary(&s, 201), &s[..201]);
    }

    #[tokio::test]
    async fn complete_rejects_malformed_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let client = ChatClient::new(&test_config(&server), "test-key".into()).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, PepsumError::Transport(_)));
    }

    #[tokio::test]
    async fn complete_rejects_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(&test_config(&server), "test-key".into()).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("no completion choices"));
    }
}
