//! Configuration for the extraction pipeline.
//!
//! Everything the upstream client needs — credentials, endpoint, model,
//! sampling knobs — lives in one [`ExtractorConfig`] injected at
//! construction, never in ambient mutable state. That keeps the pipeline
//! testable with a substitute client and makes two deployments diffable by
//! comparing their configs.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on well-documented
//! defaults for the rest; new knobs never break existing call sites.

use crate::error::ExtractError;
use std::fmt;

/// Configuration for invoice extraction.
///
/// Built via [`ExtractorConfig::builder()`] or loaded from the environment
/// with [`ExtractorConfig::from_env()`].
///
/// # Example
/// ```rust
/// use doc2invoice::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .api_key("sk-...")
///     .base_url("https://api.openai.com/v1")
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractorConfig {
    /// Bearer token for the completion endpoint. Both this and `base_url`
    /// must be set or client construction fails with `UpstreamUnavailable`.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API, without the
    /// `/chat/completions` suffix.
    pub base_url: Option<String>,

    /// Model identifier. A configuration value, not a hard dependency of the
    /// algorithm. Default: `gpt-4o-mini`.
    pub model: String,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature keeps the model deterministic-leaning and faithful to
    /// what is printed on the document — exactly what extraction wants.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2048.
    ///
    /// This bounds the reply size, which matters downstream: every later
    /// pipeline stage scans the full reply text. 2048 covers dense
    /// multi-page line-item lists with room to spare.
    pub max_tokens: u32,

    /// Per-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2048,
            api_timeout_secs: 60,
        }
    }
}

// Manual Debug: never print the API key into logs.
impl fmt::Debug for ExtractorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl ExtractorConfig {
    /// Create a new builder.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// `DOC2INVOICE_API_KEY` / `DOC2INVOICE_BASE_URL` / `DOC2INVOICE_MODEL`
    /// take priority; `OPENAI_API_KEY` is accepted as a fallback key, in
    /// which case the base URL defaults to the OpenAI endpoint.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = non_empty_var("DOC2INVOICE_API_KEY");
        config.base_url = non_empty_var("DOC2INVOICE_BASE_URL");

        if config.api_key.is_none() {
            if let Some(key) = non_empty_var("OPENAI_API_KEY") {
                config.api_key = Some(key);
                config
                    .base_url
                    .get_or_insert_with(|| "https://api.openai.com/v1".to_string());
            }
        }

        if let Some(model) = non_empty_var("DOC2INVOICE_MODEL") {
            config.model = model;
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractorConfig, ExtractError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if let Some(url) = c.base_url.as_deref() {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ExtractError::InvalidConfig(format!(
                    "base_url must be an HTTP(S) URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}
