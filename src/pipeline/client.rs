//! Upstream client: the chat-completion call that reads the document.
//!
//! This is the pipeline's only suspension point and its only network I/O.
//! The call always carries the fixed system instruction from
//! [`crate::prompts`], a low sampling temperature, and a bounded max-token
//! ceiling — the reply must be deterministic-leaning and bounded in size
//! because every later stage scans the full text.
//!
//! [`CompletionClient`] is a trait so the pipeline can be exercised against
//! a substitute client in tests; [`OpenAiCompatClient`] is the production
//! implementation for any OpenAI-compatible `/chat/completions` endpoint.

use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::pipeline::request::RequestPayload;
use crate::prompts::SYSTEM_PROMPT;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// The raw, untrusted reply text. Produced once per request, immutable.
#[derive(Debug, Clone)]
pub struct RawModelReply {
    pub text: String,
}

/// Abstraction over the completion endpoint.
///
/// One call per extraction attempt; no retry policy lives behind this seam —
/// callers that want retries re-invoke the whole pipeline.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the fixed system instruction plus the built payload; return the
    /// reply text or a transport/configuration failure.
    async fn complete(&self, payload: &RequestPayload) -> Result<RawModelReply, ExtractError>;
}

/// Production client for an OpenAI-compatible chat-completion endpoint.
///
/// Credentials and endpoint are injected at construction from
/// [`ExtractorConfig`] — never read from ambient state at call time.
#[derive(Debug)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatClient {
    /// Build the client from configuration.
    ///
    /// # Errors
    /// [`ExtractError::UpstreamUnavailable`] when the API key or base URL is
    /// missing — a configuration error, not a per-request one.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ExtractError::UpstreamUnavailable {
                reason: "no API key configured (set DOC2INVOICE_API_KEY)".into(),
            })?;
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ExtractError::UpstreamUnavailable {
                reason: "no completion endpoint configured (set DOC2INVOICE_BASE_URL)".into(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| ExtractError::UpstreamUnavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// The resolved completion endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, payload: &RequestPayload) -> Result<RawModelReply, ExtractError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": [
                    { "type": "text", "text": payload.instruction },
                    { "type": "image_url", "image_url": { "url": payload.data_uri } }
                ]}
            ]
        });

        debug!(model = %self.model, endpoint = %self.endpoint, "sending extraction request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::UpstreamError {
                status: None,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion endpoint returned an error");
            return Err(ExtractError::UpstreamError {
                status: Some(status.as_u16()),
                detail: truncate_detail(&detail),
            });
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| ExtractError::UpstreamError {
                    status: Some(status.as_u16()),
                    detail: format!("unreadable completion response: {e}"),
                })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!(reply_chars = text.len(), "received completion reply");
        Ok(RawModelReply { text })
    }
}

/// Upstream error bodies can be arbitrarily large; keep enough for an
/// operator to diagnose without flooding logs or envelopes.
fn truncate_detail(detail: &str) -> String {
    const MAX: usize = 600;
    if detail.len() <= MAX {
        detail.to_string()
    } else {
        let mut cut = MAX;
        while !detail.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &detail[..cut])
    }
}
