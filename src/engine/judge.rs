//! Judge client - the hosted LLM that scores content.
//!
//! The evaluator only needs "send a prompt, get text back". The production
//! client talks to the Anthropic Messages API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::JudgeConfig;
use crate::error::{EvalError, EvalResult};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Trait for judge implementations.
///
/// A call either returns the judge's raw text or fails with
/// [`EvalError::JudgeUnavailable`].
pub trait JudgeClient: Send + Sync {
    fn send(&self, prompt: &str) -> EvalResult<String>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}

/// Request to the Messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Messages API.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
    }
}

/// Judge backed by the Anthropic Messages API.
pub struct AnthropicJudge {
    config: JudgeConfig,
    client: Client,
}

impl AnthropicJudge {
    /// Create a new client. Fails if the API key is missing.
    pub fn new(config: JudgeConfig) -> EvalResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(EvalError::Config(
                "judge API key is not configured (set ANTHROPIC_API_KEY)".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EvalError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Send one prompt and return the first text block of the reply.
    pub async fn complete(&self, prompt: &str) -> EvalResult<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvalError::JudgeUnavailable(format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    EvalError::JudgeUnavailable(format!("request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EvalError::JudgeUnavailable(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| EvalError::JudgeUnavailable(format!("failed to decode response: {}", e)))?;

        body.first_text().ok_or_else(|| {
            EvalError::JudgeUnavailable("response contained no text content".to_string())
        })
    }
}

/// Blocking wrapper so the evaluator can treat the judge as a plain call.
///
/// Requires a multi-threaded tokio runtime.
pub struct SyncAnthropicJudge {
    inner: AnthropicJudge,
}

impl SyncAnthropicJudge {
    pub fn new(config: JudgeConfig) -> EvalResult<Self> {
        Ok(Self {
            inner: AnthropicJudge::new(config)?,
        })
    }
}

impl JudgeClient for SyncAnthropicJudge {
    fn send(&self, prompt: &str) -> EvalResult<String> {
        tracing::debug!(
            model = %self.inner.config.model,
            prompt_len = prompt.len(),
            "Sending prompt to judge"
        );

        let result = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(self.inner.complete(prompt))
        });

        if let Ok(text) = &result {
            tracing::debug!(response_len = text.len(), "Judge response received");
        }
        result
    }

    fn model(&self) -> &str {
        &self.inner.config.model
    }
}

/// In-process judges for pipeline and API tests.
#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::JudgeClient;
    use crate::error::{EvalError, EvalResult};

    /// Returns the same response for every prompt and counts calls.
    pub struct StaticJudge {
        response: String,
        calls: Arc<AtomicUsize>,
    }

    impl StaticJudge {
        pub fn new(response: impl Into<String>) -> Self {
            Self {
                response: response.into(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    impl JudgeClient for StaticJudge {
        fn send(&self, _prompt: &str) -> EvalResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }

        fn model(&self) -> &str {
            "static-judge"
        }
    }

    /// Always fails as if the API were unreachable.
    pub struct UnavailableJudge;

    impl JudgeClient for UnavailableJudge {
        fn send(&self, _prompt: &str) -> EvalResult<String> {
            Err(EvalError::JudgeUnavailable("connection refused".to_string()))
        }

        fn model(&self) -> &str {
            "unavailable-judge"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> JudgeConfig {
        JudgeConfig {
            api_key: "test-key".to_string(),
            api_url: format!("{}/v1/messages", server.uri()),
            timeout_secs: 5,
            ..JudgeConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = JudgeConfig {
            api_key: "  ".to_string(),
            ..JudgeConfig::default()
        };
        assert!(matches!(
            AnthropicJudge::new(config),
            Err(EvalError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "{\"fluency\": {\"score\": 4}}"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new(config_for(&server)).unwrap();
        let text = judge.complete("score this").await.unwrap();
        assert_eq!(text, "{\"fluency\": {\"score\": 4}}");
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new(config_for(&server)).unwrap();
        let err = judge.complete("score this").await.unwrap_err();
        assert!(matches!(err, EvalError::JudgeUnavailable(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_empty_content_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        let judge = AnthropicJudge::new(config_for(&server)).unwrap();
        assert!(matches!(
            judge.complete("score this").await,
            Err(EvalError::JudgeUnavailable(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_wrapper_blocks_on_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .mount(&server)
            .await;

        let judge = SyncAnthropicJudge::new(config_for(&server)).unwrap();
        assert_eq!(judge.send("prompt").unwrap(), "ok");
        assert_eq!(judge.model(), JudgeConfig::default().model);
    }
}
