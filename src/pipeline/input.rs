//! Input resolution: turn a user-supplied path or URL into an
//! [`UploadedDocument`].
//!
//! The media type is settled here, before extraction: from the server's
//! `Content-Type` for downloads, else the file extension, else the leading
//! bytes. Anything that is neither a PDF
//! nor a `.docx` is rejected with [`ResumeError::UnsupportedDocument`].

use crate::document::{MediaType, UploadedDocument};
use crate::error::ResumeError;
use std::path::Path;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
///
/// If the input is a URL, it is downloaded with the given timeout.
/// If the input is a local file, it is read in full.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<UploadedDocument, ResumeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ResumeError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        load_local(Path::new(input)).await
    }
}

/// Pick the media type from a declared MIME type, the name, or the bytes.
pub fn detect_media_type(
    name: &str,
    declared_mime: Option<&str>,
    bytes: &[u8],
) -> Result<MediaType, ResumeError> {
    declared_mime
        .and_then(MediaType::from_mime)
        .or_else(|| MediaType::from_path(Path::new(name)))
        .or_else(|| MediaType::sniff(bytes))
        .ok_or_else(|| ResumeError::UnsupportedDocument {
            name: name.to_string(),
        })
}

/// Read a local file into memory.
async fn load_local(path: &Path) -> Result<UploadedDocument, ResumeError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ResumeError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ResumeError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ResumeError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = detect_media_type(&name, None, &bytes)?;

    debug!(
        "Resolved local {} document: {} ({} bytes)",
        media_type,
        path.display(),
        bytes.len()
    );
    Ok(UploadedDocument::new(name, media_type, bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, ResumeError> {
    info!("Downloading resume from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ResumeError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ResumeError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ResumeError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ResumeError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let filename = extract_filename(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ResumeError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    let media_type = detect_media_type(&filename, content_type.as_deref(), &bytes)?;
    info!("Downloaded {} ({} bytes, {})", filename, bytes.len(), media_type);

    Ok(UploadedDocument::new(filename, media_type, bytes))
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded-resume".to_string()
}
