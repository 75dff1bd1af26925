//! Pipeline integration tests against a scripted in-memory backend.
//!
//! No network access: every completion comes from [`ScriptedBackend`], which
//! also records how often it was called and what it was sent.
//!
//! Run with:
//!   cargo test --test pipeline

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use resume_review::prompts::DEFAULT_SYSTEM_PROMPT;
use resume_review::{
    analyze_document, analyze_file, export_json, render_report, write_export, AnalysisResult,
    Analyzer, AnalyzerConfig, CompletionBackend, CompletionRequest, ExtractedText, FailureKind,
    MediaType, ReportOptions, ResumeAnalysis, ResumeError, ServiceError, ServiceErrorKind,
    UploadedDocument, EXPORT_FILE_NAME,
};
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

struct ScriptedBackend {
    reply: Result<String, ServiceError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedBackend {
    fn new(reply: Result<String, ServiceError>, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn replying(reply: impl Into<String>) -> Arc<Self> {
        Self::new(Ok(reply.into()), None)
    }

    fn failing(error: ServiceError) -> Arc<Self> {
        Self::new(Err(error), None)
    }

    /// Replies only after `delay`.
    fn stalling(reply: impl Into<String>, delay: Duration) -> Arc<Self> {
        Self::new(Ok(reply.into()), Some(delay))
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> CompletionRequest {
        self.last_request
            .lock()
            .unwrap()
            .clone()
            .expect("backend was never called")
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

fn config_with(backend: Arc<ScriptedBackend>) -> AnalyzerConfig {
    AnalyzerConfig::builder()
        .backend(backend)
        .build()
        .expect("valid config")
}

fn full_reply() -> serde_json::Value {
    json!({
        "Overall Score": 82,
        "Key Strengths": ["clarity", "impact metrics"],
        "Areas for Improvement": ["summary is generic"],
        "Skills Assessment": "Strong backend skills; little frontend exposure.",
        "Experience Analysis": "Five years of progressive roles.",
        "Education Analysis": "BSc Computer Science.",
        "Format and Presentation": "Clean, one page.",
        "Specific Recommendations": ["quantify results", "trim hobbies"]
    })
}

fn jane_doe_docx() -> UploadedDocument {
    let docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Software Engineer")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("5 years experience")));
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).expect("pack docx");
    UploadedDocument::new("jane-doe.docx", MediaType::Docx, buf.into_inner())
}

/// A minimal one-page PDF showing `text` in Helvetica.
fn one_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_at = pdf.len();
    let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        tail.push_str(&format!("{off:010} 00000 n \n"));
    }
    tail.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(tail.as_bytes());
    pdf
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn docx_text_reaches_the_model_line_by_line() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let output = analyze_document(jane_doe_docx(), &config_with(backend.clone()))
        .await
        .expect("pipeline should run");

    assert!(output.result.is_success());
    assert_eq!(backend.calls(), 1);
    assert_eq!(
        backend.last_request().user_prompt,
        "Here is the resume to analyze:\n\nJane Doe\nSoftware Engineer\n5 years experience"
    );
    assert_eq!(output.stats.media_type, Some(MediaType::Docx));
    assert_eq!(output.stats.backend, "scripted");
}

#[tokio::test]
async fn pdf_text_reaches_the_model() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let doc = UploadedDocument::new("jane-doe.pdf", MediaType::Pdf, one_page_pdf("Jane Doe"));

    let output = analyze_document(doc, &config_with(backend.clone()))
        .await
        .expect("pipeline should run");

    assert!(output.result.is_success());
    assert_eq!(backend.calls(), 1);
    let prompt = backend.last_request().user_prompt;
    assert!(
        prompt.starts_with("Here is the resume to analyze:\n\n"),
        "got: {prompt:?}"
    );
    assert!(prompt.contains("Jane Doe"), "got: {prompt:?}");
    assert_eq!(output.stats.media_type, Some(MediaType::Pdf));
    assert!(output.stats.extracted_chars >= "Jane Doe".len());
}

#[tokio::test]
async fn corrupt_pdf_halts_before_the_model_call() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let doc = UploadedDocument::new("cv.pdf", MediaType::Pdf, b"%PDF-1.4\nnot really".to_vec());

    let err = analyze_document(doc, &config_with(backend.clone()))
        .await
        .expect_err("corrupt PDF must fail");

    assert!(err.is_extraction_error(), "got: {err}");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn corrupt_docx_halts_before_the_model_call() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let doc = UploadedDocument::new("cv.docx", MediaType::Docx, b"PK\x03\x04broken".to_vec());

    let err = analyze_document(doc, &config_with(backend.clone()))
        .await
        .expect_err("corrupt DOCX must fail");

    assert!(
        matches!(
            err,
            ResumeError::CorruptDocument {
                media_type: MediaType::Docx,
                ..
            }
        ),
        "got: {err}"
    );
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn unsupported_file_is_rejected_before_extraction() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cv.txt");
    std::fs::write(&path, "Jane Doe, plain text").unwrap();

    let err = analyze_file(path.to_str().unwrap(), &config_with(backend.clone()))
        .await
        .expect_err("plain text is not a supported document");

    assert!(
        matches!(err, ResumeError::UnsupportedDocument { .. }),
        "got: {err}"
    );
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn docx_on_disk_goes_through_analyze_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jane-doe.docx");
    std::fs::write(&path, &jane_doe_docx().bytes).unwrap();

    let backend = ScriptedBackend::replying(full_reply().to_string());
    let output = analyze_file(path.to_str().unwrap(), &config_with(backend.clone()))
        .await
        .unwrap();

    assert!(output.result.is_success());
    assert_eq!(output.stats.document_name, "jane-doe.docx");
    assert_eq!(backend.calls(), 1);
}

// ── Analysis ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn request_carries_model_temperature_and_prompt() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend.clone());

    analyzer.analyze(&ExtractedText::new("Jane Doe")).await;

    let request = backend.last_request();
    assert_eq!(request.model, "llama-3.3-70b-versatile");
    assert!((request.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(request.system_prompt, DEFAULT_SYSTEM_PROMPT);
    assert_eq!(request.user_prompt, "Here is the resume to analyze:\n\nJane Doe");
}

#[tokio::test]
async fn custom_system_prompt_replaces_the_default() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let config = AnalyzerConfig::builder()
        .backend(backend.clone())
        .system_prompt("Reply with the schema only.")
        .build()
        .unwrap();

    Analyzer::new(config)
        .unwrap()
        .analyze(&ExtractedText::new("Jane Doe"))
        .await;

    assert_eq!(
        backend.last_request().system_prompt,
        "Reply with the schema only."
    );
}

#[tokio::test]
async fn complete_reply_comes_back_unchanged() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend);

    let analysis = analyzer
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .expect("success shape");

    assert_eq!(analysis.overall_score.as_u64(), Some(82));
    assert_eq!(analysis.key_strengths, vec!["clarity", "impact metrics"]);
    assert_eq!(
        analysis.specific_recommendations,
        vec!["quantify results", "trim hobbies"]
    );
}

#[tokio::test]
async fn non_json_reply_is_a_parse_failure_with_raw_text() {
    let backend = ScriptedBackend::replying("not json at all");
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend);

    let failure = analyzer
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .expect_err("error shape");

    assert_eq!(failure.kind, FailureKind::Parse);
    assert_eq!(
        failure.message,
        "Failed to parse AI response as JSON. Please try again."
    );
    assert_eq!(failure.raw_response.as_deref(), Some("not json at all"));
}

#[tokio::test]
async fn score_only_reply_names_key_strengths() {
    let backend = ScriptedBackend::replying(r#"{"Overall Score": 70}"#);
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend);

    let failure = analyzer
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .expect_err("error shape");

    assert_eq!(failure.field(), Some("Key Strengths"));
    assert!(failure.message.contains("Key Strengths"));
    assert_eq!(
        failure.raw_response.as_deref(),
        Some(r#"{"Overall Score": 70}"#)
    );
}

#[tokio::test]
async fn authentication_failure_has_no_raw_reply() {
    let backend = ScriptedBackend::failing(ServiceError::from_status(401, "invalid api key"));
    let output = analyze_document(jane_doe_docx(), &config_with(backend.clone()))
        .await
        .expect("service errors are not fatal");

    let failure = output.result.failure().expect("error shape");
    assert_eq!(
        failure.kind,
        FailureKind::Service {
            category: ServiceErrorKind::Authentication
        }
    );
    assert!(failure.message.starts_with("API Error"));
    assert!(failure.raw_response.is_none());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn rate_limit_is_reported_as_such() {
    let backend = ScriptedBackend::failing(ServiceError::from_status(429, ""));
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend.clone());

    let failure = analyzer
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(
        failure.kind,
        FailureKind::Service {
            category: ServiceErrorKind::RateLimited
        }
    );
    assert_eq!(backend.calls(), 1, "no retry");
}

#[tokio::test]
async fn slow_reply_times_out_without_retry() {
    let backend = ScriptedBackend::stalling(full_reply().to_string(), Duration::from_secs(5));
    let config = AnalyzerConfig::builder()
        .backend(backend.clone())
        .api_timeout_secs(1)
        .build()
        .unwrap();

    let failure = Analyzer::new(config)
        .unwrap()
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .expect_err("error shape");

    assert_eq!(
        failure.kind,
        FailureKind::Service {
            category: ServiceErrorKind::Timeout
        }
    );
    assert!(failure.raw_response.is_none());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn reply_with_unexpected_value_types_is_still_a_success() {
    let mut reply = full_reply();
    reply["Overall Score"] = json!("82");
    reply["Key Strengths"] = json!([{"point": "clarity"}]);
    let backend = ScriptedBackend::replying(reply.to_string());
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend);

    let analysis = analyzer
        .analyze(&ExtractedText::new("Jane Doe"))
        .await
        .into_result()
        .expect("all eight fields are present");

    let exported: serde_json::Value =
        serde_json::from_str(&export_json(&analysis).unwrap()).unwrap();
    assert_eq!(exported["Overall Score"], json!("82"));
    assert_eq!(exported["Key Strengths"], json!([{"point": "clarity"}]));
}

// ── Configuration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_key_fails_before_extraction() {
    let config = AnalyzerConfig::default();
    let err = analyze_document(jane_doe_docx(), &config)
        .await
        .expect_err("no credential");

    match err {
        ResumeError::MissingCredential { env_var, .. } => assert_eq!(env_var, "GROQ_API_KEY"),
        other => panic!("expected MissingCredential, got: {other}"),
    }
}

// ── Presentation & export ────────────────────────────────────────────────────

#[tokio::test]
async fn export_round_trips_to_an_equal_analysis() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let output = analyze_document(jane_doe_docx(), &config_with(backend))
        .await
        .unwrap();
    let analysis = output.result.analysis().expect("success shape");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(EXPORT_FILE_NAME);
    write_export(analysis, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let back: ResumeAnalysis = serde_json::from_str(&text).unwrap();
    assert_eq!(&back, analysis);
    assert_eq!(text.trim_end(), export_json(analysis).unwrap());
}

#[tokio::test]
async fn report_lists_sections_in_order() {
    let backend = ScriptedBackend::replying(full_reply().to_string());
    let output = analyze_document(jane_doe_docx(), &config_with(backend))
        .await
        .unwrap();

    let report = render_report(&output.result, &ReportOptions::default());
    let pos = |needle: &str| {
        report
            .find(needle)
            .unwrap_or_else(|| panic!("report lacks {needle:?}:\n{report}"))
    };

    assert!(pos("82/100") < pos("Key Strengths"));
    assert!(pos("clarity") < pos("impact metrics"));
    assert!(pos("Skills Assessment") < pos("Experience Analysis"));
    assert!(pos("Experience Analysis") < pos("Education Analysis"));
    assert!(pos("Format and Presentation") < pos("Specific Recommendations"));
    assert!(pos("quantify results") < pos("trim hobbies"));
}

#[tokio::test]
async fn failure_report_hides_raw_reply_by_default() {
    let backend = ScriptedBackend::replying("Sure! Here is my analysis: great resume");
    let analyzer = Analyzer::with_backend(AnalyzerConfig::default(), backend);
    let result = analyzer.analyze(&ExtractedText::new("Jane Doe")).await;
    assert!(matches!(result, AnalysisResult::Failure(_)));

    let hidden = render_report(&result, &ReportOptions::default());
    assert!(hidden.contains("Failed to parse AI response as JSON"));
    assert!(!hidden.contains("great resume"));

    let shown = render_report(
        &result,
        &ReportOptions {
            show_raw: true,
            ..Default::default()
        },
    );
    assert!(shown.contains("great resume"));
}
