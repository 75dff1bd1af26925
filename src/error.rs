//! Error types for the resume-review library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ResumeError`] — **Fatal**: no analysis can be attempted at all (file
//!   missing, document corrupt, credential not configured). Returned as
//!   `Err(ResumeError)` from the top-level `analyze*` functions, always before
//!   any request reaches the model service.
//!
//! * [`ServiceError`] — **Captured**: the single completion call failed
//!   (timeout, bad key, 5xx). It never escapes the analyzer; it is folded into
//!   the error shape of [`crate::output::AnalysisResult`] so the presenter
//!   always has something to render.

use crate::document::MediaType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the resume-review library.
#[derive(Debug, Error)]
pub enum ResumeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Resume file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read (a directory, an I/O fault).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// Neither the extension nor the leading bytes identify a PDF or `.docx`.
    #[error("Unsupported document '{name}': only PDF and Word (.docx) files are accepted")]
    UnsupportedDocument { name: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The format reader could not parse the document.
    #[error("{media_type} document '{name}' could not be read: {detail}")]
    CorruptDocument {
        name: String,
        media_type: MediaType,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// The default backend needs an API key and none was configured.
    #[error("No API key configured for the '{backend}' backend.\nSet {env_var} or pass --api-key.")]
    MissingCredential { backend: String, env_var: String },

    /// A named provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The analysis could not be serialised for export.
    #[error("Failed to serialise analysis: {0}")]
    ExportFailed(#[from] serde_json::Error),

    /// Could not create or write the export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResumeError {
    /// True for errors raised while reading the document itself.
    pub fn is_extraction_error(&self) -> bool {
        matches!(self, ResumeError::CorruptDocument { .. })
    }
}

/// Category of a failed completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// 401/403, missing or rejected key.
    Authentication,
    /// 429 from the provider.
    RateLimited,
    /// No answer within the configured timeout.
    Timeout,
    /// DNS, TLS or TCP failure before any HTTP status.
    Connection,
    /// 5xx from the provider.
    Server,
    /// HTTP success but no completion choice in the body.
    EmptyReply,
    /// Anything else (4xx validation errors, malformed envelopes).
    Other,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceErrorKind::Authentication => "authentication failure",
            ServiceErrorKind::RateLimited => "rate limited",
            ServiceErrorKind::Timeout => "timed out",
            ServiceErrorKind::Connection => "connection failure",
            ServiceErrorKind::Server => "service error",
            ServiceErrorKind::EmptyReply => "empty reply",
            ServiceErrorKind::Other => "request failed",
        };
        f.write_str(s)
    }
}

/// A failed completion call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub detail: String,
}

static RE_HTTP_STATUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([45]\d\d)\b").unwrap());

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ServiceErrorKind::Authentication,
            408 => ServiceErrorKind::Timeout,
            429 => ServiceErrorKind::RateLimited,
            500..=599 => ServiceErrorKind::Server,
            _ => ServiceErrorKind::Other,
        };
        let body = body.trim();
        let detail = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        Self { kind, detail }
    }

    /// Classify a provider error that only exposes a message.
    ///
    /// An embedded 4xx/5xx status wins; otherwise keywords decide.
    pub fn classify(message: &str) -> Self {
        if let Some(status) = RE_HTTP_STATUS
            .captures(message)
            .and_then(|c| c[1].parse::<u16>().ok())
        {
            let kind = Self::from_status(status, "").kind;
            if kind != ServiceErrorKind::Other {
                return Self::new(kind, message);
            }
        }

        let lower = message.to_lowercase();
        let kind = if ["api key", "api_key", "unauthorized", "authentication", "forbidden"]
            .iter()
            .any(|k| lower.contains(k))
        {
            ServiceErrorKind::Authentication
        } else if lower.contains("rate limit") || lower.contains("too many requests") {
            ServiceErrorKind::RateLimited
        } else if lower.contains("timed out") || lower.contains("timeout") {
            ServiceErrorKind::Timeout
        } else if lower.contains("connect") || lower.contains("dns") || lower.contains("network")
        {
            ServiceErrorKind::Connection
        } else {
            ServiceErrorKind::Other
        };
        Self::new(kind, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_document_display() {
        let e = ResumeError::CorruptDocument {
            name: "cv.docx".into(),
            media_type: MediaType::Docx,
            detail: "invalid zip header".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("Word document 'cv.docx'"), "got: {msg}");
        assert!(msg.contains("invalid zip header"));
        assert!(e.is_extraction_error());
    }

    #[test]
    fn missing_credential_names_env_var() {
        let e = ResumeError::MissingCredential {
            backend: "groq".into(),
            env_var: "GROQ_API_KEY".into(),
        };
        assert!(e.to_string().contains("GROQ_API_KEY"));
        assert!(!e.is_extraction_error());
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            ServiceError::from_status(401, "").kind,
            ServiceErrorKind::Authentication
        );
        assert_eq!(
            ServiceError::from_status(429, "slow down").kind,
            ServiceErrorKind::RateLimited
        );
        assert_eq!(
            ServiceError::from_status(503, "").kind,
            ServiceErrorKind::Server
        );
        assert_eq!(
            ServiceError::from_status(400, "bad model").kind,
            ServiceErrorKind::Other
        );
        assert_eq!(ServiceError::from_status(502, " ").detail, "HTTP 502");
    }

    #[test]
    fn message_classification() {
        assert_eq!(
            ServiceError::classify("API error 401: invalid key").kind,
            ServiceErrorKind::Authentication
        );
        assert_eq!(
            ServiceError::classify("Missing API key for provider openai").kind,
            ServiceErrorKind::Authentication
        );
        assert_eq!(
            ServiceError::classify("Rate limit exceeded").kind,
            ServiceErrorKind::RateLimited
        );
        assert_eq!(
            ServiceError::classify("request timed out").kind,
            ServiceErrorKind::Timeout
        );
        assert_eq!(
            ServiceError::classify("error trying to connect: dns error").kind,
            ServiceErrorKind::Connection
        );
        assert_eq!(
            ServiceError::classify("something odd").kind,
            ServiceErrorKind::Other
        );
    }

    #[test]
    fn service_error_display() {
        let e = ServiceError::new(ServiceErrorKind::Timeout, "no answer after 60s");
        assert_eq!(e.to_string(), "timed out: no answer after 60s");
    }
}
