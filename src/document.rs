//! Input-side types: the uploaded document and the text extracted from it.
//!
//! Only two formats are accepted. Anything else is rejected while the input
//! is resolved, so the extractor never sees an unknown media type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// MIME type of a Word-processor (Office Open XML) document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of a PDF document.
pub const PDF_MIME: &str = "application/pdf";

/// The two document formats a resume may be uploaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Portable Document Format.
    Pdf,
    /// Word-processor document (`.docx`).
    Docx,
}

impl MediaType {
    /// Parse a declared MIME type. Parameters (`; charset=…`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(MediaType::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(MediaType::Docx)
        } else {
            None
        }
    }

    /// Map a file extension (without the dot) to a media type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "docx" => Some(MediaType::Docx),
            _ => None,
        }
    }

    /// Map a path's extension to a media type.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Sniff the leading bytes.
    ///
    /// A `.docx` file is a ZIP container, so `PK\x03\x04` is accepted as
    /// Word; the reader rejects any other ZIP later as corrupt.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            Some(MediaType::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(MediaType::Docx)
        } else {
            None
        }
    }

    /// Canonical MIME type.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => PDF_MIME,
            MediaType::Docx => DOCX_MIME,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Pdf => f.write_str("PDF"),
            MediaType::Docx => f.write_str("Word"),
        }
    }
}

/// A document handed to the pipeline for one analysis.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Display name, usually the file name.
    pub name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Plain text produced by the extractor and consumed once by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExtractedText {
    fn from(s: String) -> Self {
        Self(s)
    }
}
