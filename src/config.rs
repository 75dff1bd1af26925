//! Configuration types for resume analysis.
//!
//! Every knob lives in [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. The service credential is an ordinary field:
//! it is read once (from the environment or a CLI flag) and handed to the
//! analyzer at construction, where its absence becomes a typed error.

use crate::error::ResumeError;
use crate::pipeline::llm::CompletionBackend;
use std::fmt;
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// OpenAI-compatible endpoint of the default backend.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable holding the default backend's API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "RESUME_REVIEW_MODEL";

/// Environment variable overriding the endpoint base URL.
pub const BASE_URL_ENV: &str = "RESUME_REVIEW_BASE_URL";

/// Environment variable selecting an edgequake-llm provider by name.
pub const PROVIDER_ENV: &str = "RESUME_REVIEW_PROVIDER";

/// Configuration for a resume analysis.
///
/// # Example
/// ```rust
/// use resume_review::AnalyzerConfig;
///
/// let config = AnalyzerConfig::builder()
///     .api_key("gsk_test")
///     .temperature(0.2)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "llama-3.3-70b-versatile");
/// ```
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// Bearer key for the default OpenAI-compatible backend.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint. Default: Groq.
    pub base_url: String,

    /// Model identifier. Default: `llama-3.3-70b-versatile`.
    pub model: String,

    /// edgequake-llm provider name ("openai", "anthropic", "gemini", …).
    /// When set, the provider factory is used instead of the default backend
    /// and reads its own key variable (`OPENAI_API_KEY`, …).
    pub provider_name: Option<String>,

    /// Pre-constructed backend. Takes precedence over everything else.
    pub backend: Option<Arc<dyn CompletionBackend>>,

    /// Sampling temperature. Default: 0.3.
    ///
    /// The reply must be machine-parseable, so literal output is preferred
    /// over variety.
    pub temperature: f32,

    /// Cap on generated tokens. `None` leaves it to the provider.
    pub max_tokens: Option<usize>,

    /// Custom system prompt. If None, uses the built-in schema prompt.
    pub system_prompt: Option<String>,

    /// Timeout for the single completion call, in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider_name: None,
            backend: None,
            temperature: 0.3,
            max_tokens: None,
            system_prompt: None,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a config from the process environment.
    ///
    /// Reads [`API_KEY_ENV`], [`MODEL_ENV`], [`BASE_URL_ENV`] and
    /// [`PROVIDER_ENV`]. Empty values count as unset. A missing key is not an
    /// error here; [`crate::Analyzer::new`] reports it when the default
    /// backend is actually selected.
    pub fn from_env() -> Result<Self, ResumeError> {
        let mut builder = Self::builder();
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            builder = builder.api_key(key);
        }
        if let Some(model) = non_empty_env(MODEL_ENV) {
            builder = builder.model(model);
        }
        if let Some(url) = non_empty_env(BASE_URL_ENV) {
            builder = builder.base_url(url);
        }
        if let Some(provider) = non_empty_env(PROVIDER_ENV) {
            builder = builder.provider_name(provider);
        }
        builder.build()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`AnalyzerConfig`].
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl fmt::Debug for AnalyzerConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl AnalyzerConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, ResumeError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ResumeError::InvalidConfig("Model must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ResumeError::InvalidConfig(format!(
                "Base URL must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(ResumeError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_tokens == Some(0) {
            return Err(ResumeError::InvalidConfig(
                "Max tokens must be ≥ 1 when set".into(),
            ));
        }
        if matches!(c.system_prompt.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(ResumeError::InvalidConfig(
                "Custom system prompt is empty".into(),
            ));
        }
        Ok(self.config)
    }
}
