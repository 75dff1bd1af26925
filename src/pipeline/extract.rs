//! Text extraction: the only stage that understands document formats.
//!
//! * PDF goes through `pdf-extract`, which yields text in the order its
//!   layout analysis finds it. No page selection, no OCR: an image-only scan
//!   simply produces little or no text.
//! * Word goes through `docx-rs`. Each top-level body paragraph contributes
//!   the text of its runs; paragraphs are joined with `'\n'`. Tables,
//!   headers, footers and embedded objects are skipped.
//!
//! Both readers are synchronous and CPU-bound, so the async entry point runs
//! them under `spawn_blocking`. A reader that panics on hostile input is
//! reported as a corrupt document rather than taking the process down.

use crate::document::{ExtractedText, MediaType, UploadedDocument};
use crate::error::ResumeError;
use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::{debug, info, warn};

/// Extract plain text from an uploaded document.
pub async fn extract_text(doc: UploadedDocument) -> Result<ExtractedText, ResumeError> {
    let name = doc.name.clone();
    let media_type = doc.media_type;

    tokio::task::spawn_blocking(move || extract_blocking(&doc))
        .await
        .map_err(|e| ResumeError::CorruptDocument {
            name,
            media_type,
            detail: format!("reader aborted: {e}"),
        })?
}

/// Blocking implementation of [`extract_text`].
pub fn extract_blocking(doc: &UploadedDocument) -> Result<ExtractedText, ResumeError> {
    debug!(
        "Extracting text from {} document '{}' ({} bytes)",
        doc.media_type,
        doc.name,
        doc.len()
    );

    let text = match doc.media_type {
        MediaType::Pdf => pdf_text(&doc.bytes),
        MediaType::Docx => docx_text(&doc.bytes),
    }
    .map_err(|detail| ResumeError::CorruptDocument {
        name: doc.name.clone(),
        media_type: doc.media_type,
        detail,
    })?;

    if text.trim().is_empty() {
        warn!(
            "No text found in '{}'; image-only documents are not OCR'd",
            doc.name
        );
    } else {
        info!("Extracted {} characters from '{}'", text.chars().count(), doc.name);
    }

    Ok(ExtractedText::new(text))
}

fn pdf_text(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

fn docx_text(bytes: &[u8]) -> Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    push_paragraph_children(&paragraph.children, &mut out);
    out
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}
