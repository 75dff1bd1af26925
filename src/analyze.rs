//! Analysis entry points.
//!
//! [`Analyzer`] owns the resolved backend and turns extracted text into an
//! [`AnalysisResult`]. The free functions chain the whole pipeline:
//!
//! ```text
//! resolve_input ──▶ extract_text ──▶ Analyzer::analyze ──▶ AnalysisOutput
//! ```
//!
//! Only configuration, input and extraction problems come back as `Err`.
//! Once the request is sent, every outcome is an `Ok(AnalysisResult)`.

use crate::config::AnalyzerConfig;
use crate::document::{ExtractedText, UploadedDocument};
use crate::error::{ResumeError, ServiceError, ServiceErrorKind};
use crate::output::{AnalysisFailure, AnalysisOutput, AnalysisResult, AnalysisStats};
use crate::pipeline::llm::{resolve_backend, CompletionBackend, CompletionRequest};
use crate::pipeline::{extract, input, validate};
use crate::prompts::{user_message, DEFAULT_SYSTEM_PROMPT};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Sends extracted text to the model and validates the reply.
pub struct Analyzer {
    backend: Arc<dyn CompletionBackend>,
    config: AnalyzerConfig,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Analyzer {
    /// Resolve the backend once.
    ///
    /// # Errors
    /// [`ResumeError::MissingCredential`] when the default backend is
    /// selected without an API key, [`ResumeError::ProviderNotConfigured`]
    /// when a named provider cannot be built.
    pub fn new(config: AnalyzerConfig) -> Result<Self, ResumeError> {
        let backend = resolve_backend(&config)?;
        Ok(Self { backend, config })
    }

    /// Use an explicit backend, ignoring the config's backend selection.
    pub fn with_backend(config: AnalyzerConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend, config }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The request that [`Analyzer::analyze`] would send for `text`.
    pub fn request_for(&self, text: &ExtractedText) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: self
                .config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            user_prompt: user_message(text.as_str()),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Run the single completion call and validate the reply.
    ///
    /// Never fails: service errors, unparsable replies and incomplete
    /// replies all come back as [`AnalysisResult::Failure`].
    pub async fn analyze(&self, text: &ExtractedText) -> AnalysisResult {
        if text.is_empty() {
            warn!("Analysing an empty resume text");
        }

        let request = self.request_for(text);
        let limit = Duration::from_secs(self.config.api_timeout_secs);
        let start = Instant::now();
        info!(
            "Requesting analysis from '{}' (model {})",
            self.backend.name(),
            request.model
        );

        let reply = match tokio::time::timeout(limit, self.backend.complete(&request)).await {
            Ok(reply) => reply,
            Err(_) => Err(ServiceError::new(
                ServiceErrorKind::Timeout,
                format!("no reply within {}s", limit.as_secs()),
            )),
        };

        match reply {
            Ok(raw) => {
                info!(
                    "Received {} byte reply in {}ms",
                    raw.len(),
                    start.elapsed().as_millis()
                );
                let result = validate::parse_reply(&raw);
                if let AnalysisResult::Failure(ref f) = result {
                    warn!("Model reply rejected: {}", f.message);
                }
                result
            }
            Err(e) => {
                warn!("Completion call failed: {}", e);
                AnalysisResult::Failure(AnalysisFailure::service(&e))
            }
        }
    }
}

/// Analyse an in-memory document.
///
/// The analyzer is built first so configuration problems surface before any
/// parsing; extraction errors then halt the pipeline before the network call.
pub async fn analyze_document(
    doc: UploadedDocument,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, ResumeError> {
    let analyzer = Analyzer::new(config.clone())?;
    run_pipeline(&analyzer, doc).await
}

/// Analyse a resume given as a local path or HTTP/HTTPS URL.
pub async fn analyze_file(
    input_str: impl AsRef<str>,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, ResumeError> {
    let analyzer = Analyzer::new(config.clone())?;
    let doc = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    run_pipeline(&analyzer, doc).await
}

/// Synchronous wrapper around [`analyze_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalyzerConfig,
) -> Result<AnalysisOutput, ResumeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ResumeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze_file(input_str, config))
}

/// Resolve and extract a resume without analysing it.
///
/// Does not require an API key.
pub async fn extract_only(
    input_str: impl AsRef<str>,
    download_timeout_secs: u64,
) -> Result<ExtractedText, ResumeError> {
    let doc = input::resolve_input(input_str.as_ref(), download_timeout_secs).await?;
    extract::extract_text(doc).await
}

/// Extract, analyse and collect stats with an already-built analyzer.
pub async fn run_pipeline(
    analyzer: &Analyzer,
    doc: UploadedDocument,
) -> Result<AnalysisOutput, ResumeError> {
    let total_start = Instant::now();
    let mut stats = AnalysisStats {
        document_name: doc.name.clone(),
        media_type: Some(doc.media_type),
        document_bytes: doc.len(),
        backend: analyzer.backend_name().to_string(),
        model: analyzer.config().model.clone(),
        ..Default::default()
    };
    info!("Starting analysis: {} ({})", doc.name, doc.media_type);

    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let text = extract::extract_text(doc).await?;
    stats.extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    stats.extracted_chars = text.as_str().chars().count();

    // ── Step 2: Analyse ──────────────────────────────────────────────────
    let llm_start = Instant::now();
    let result = analyzer.analyze(&text).await;
    stats.llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Analysis {} in {}ms",
        if result.is_success() { "complete" } else { "failed" },
        stats.total_duration_ms
    );

    Ok(AnalysisOutput { result, stats })
}
