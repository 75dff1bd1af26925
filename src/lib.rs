//! # resume-review
//!
//! Analyse a resume (PDF or Word `.docx`) with a Large Language Model and
//! render the structured feedback as a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume
//!  │
//!  ├─ 1. Input     resolve local file or download from URL, detect PDF/DOCX
//!  ├─ 2. Extract   plain text via pdf-extract / docx-rs (spawn_blocking)
//!  ├─ 3. Analyze   one chat completion with a fixed JSON-schema prompt
//!  ├─ 4. Validate  JSON parse + eight required fields, fail closed
//!  └─ 5. Present   terminal / Markdown report, `resume_analysis.json` export
//! ```
//!
//! Configuration, input and extraction problems are returned as `Err` before
//! any request is sent. Anything that goes wrong after that comes back as the
//! error shape of [`AnalysisResult`], so there is always something to show.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_review::{analyze_file, render_report, AnalyzerConfig, ReportOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY (and optional RESUME_REVIEW_* overrides)
//!     let config = AnalyzerConfig::from_env()?;
//!     let output = analyze_file("resume.pdf", &config).await?;
//!     println!("{}", render_report(&output.result, &ReportOptions::default()));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-review` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_document, analyze_file, analyze_sync, extract_only, run_pipeline, Analyzer};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use document::{ExtractedText, MediaType, UploadedDocument};
pub use error::{ResumeError, ServiceError, ServiceErrorKind};
pub use output::{
    AnalysisFailure, AnalysisOutput, AnalysisResult, AnalysisStats, FailureKind, Narrative,
    ResumeAnalysis, EXPORT_FILE_NAME, REQUIRED_FIELDS,
};
pub use pipeline::extract::extract_text;
pub use pipeline::input::resolve_input;
pub use pipeline::llm::{CompletionBackend, CompletionRequest, GroqBackend, ProviderBackend};
pub use report::{export_json, render_report, write_export, ReportOptions, ReportStyle};
