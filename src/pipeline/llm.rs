//! Model interaction: one chat-completion round trip per analysis.
//!
//! [`CompletionBackend`] is the seam between the analyzer and whatever
//! serves completions. Two implementations ship with the crate:
//!
//! * [`GroqBackend`] — a plain OpenAI-compatible `POST /chat/completions`
//!   over `reqwest`, authenticated with the configured key. Pointing
//!   `base_url` elsewhere works for any compatible server.
//! * [`ProviderBackend`] — wraps an `edgequake_llm::LLMProvider` so every
//!   provider that crate knows about is available by name.
//!
//! Backends never retry. A failure is classified into a
//! [`ServiceErrorKind`] and handed back to the analyzer, which folds it into
//! the error shape.

use crate::config::AnalyzerConfig;
use crate::error::{ResumeError, ServiceError, ServiceErrorKind};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Everything a backend needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
}

/// A service that turns one request into one text completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short name used in logs and stats ("groq", "openai", …).
    fn name(&self) -> &str;

    /// Perform the call and return the completion text as received.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;
}

// ── OpenAI-compatible HTTP backend ───────────────────────────────────────

/// Chat-completions client for Groq or any OpenAI-compatible endpoint.
pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqBackend {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ResumeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResumeError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

fn wire_body(request: &CompletionRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: &request.model,
        messages: vec![
            WireMessage {
                role: "system",
                content: &request.system_prompt,
            },
            WireMessage {
                role: "user",
                content: &request.user_prompt,
            },
        ],
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    let kind = if e.is_timeout() {
        ServiceErrorKind::Timeout
    } else if e.is_connect() {
        ServiceErrorKind::Connection
    } else {
        ServiceErrorKind::Other
    };
    ServiceError::new(kind, e.to_string())
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let start = Instant::now();
        debug!(model = %request.model, endpoint = %self.endpoint(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&wire_body(request))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ServiceError::new(
                ServiceErrorKind::Other,
                format!("malformed completion envelope: {e}"),
            )
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "{} input tokens, {} output tokens, {:?}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                start.elapsed()
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| {
                ServiceError::new(ServiceErrorKind::EmptyReply, "response contained no choices")
            })
    }
}

// ── edgequake-llm provider backend ───────────────────────────────────────

/// Adapter from an `edgequake_llm` provider to [`CompletionBackend`].
pub struct ProviderBackend {
    name: String,
    provider: Arc<dyn LLMProvider>,
}

impl ProviderBackend {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }

    /// Build a named provider through [`ProviderFactory`].
    ///
    /// The factory reads the provider's own key variable
    /// (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …).
    pub fn from_factory(provider_name: &str, model: &str) -> Result<Self, ResumeError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            ResumeError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(provider_name, provider))
    }
}

/// Build `CompletionOptions` from the request.
fn build_options(request: &CompletionRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: request.max_tokens,
        ..Default::default()
    }
}

#[async_trait]
impl CompletionBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let messages = vec![
            ChatMessage::system(&request.system_prompt),
            ChatMessage::user(&request.user_prompt),
        ];
        let options = build_options(request);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| ServiceError::classify(&e.to_string()))?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.name, response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

// ── Backend resolution ───────────────────────────────────────────────────

/// Resolve the backend, from most-specific to least-specific:
///
/// 1. **Pre-built backend** (`config.backend`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) — built by edgequake-llm.
/// 3. **Default** — [`GroqBackend`] with `config.api_key`; a missing key is
///    [`ResumeError::MissingCredential`].
pub fn resolve_backend(config: &AnalyzerConfig) -> Result<Arc<dyn CompletionBackend>, ResumeError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref name) = config.provider_name {
        return Ok(Arc::new(ProviderBackend::from_factory(name, &config.model)?));
    }

    let key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ResumeError::MissingCredential {
            backend: "groq".to_string(),
            env_var: crate::config::API_KEY_ENV.to_string(),
        })?;

    Ok(Arc::new(GroqBackend::new(
        key,
        config.base_url.clone(),
        Duration::from_secs(config.api_timeout_secs),
    )?))
}
