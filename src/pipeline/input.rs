//! Input resolution for the CLI: turn a path or URL into an [`Artifact`].
//!
//! Uploads through the HTTP server arrive as artifacts already; this module
//! covers `qpsolve solve <INPUT>`, where INPUT may be a local file or an
//! http(s) URL. URLs are downloaded straight into memory since artifacts
//! are never written to disk.
//!
//! The content type is taken, in order, from the caller's override, the
//! server's `Content-Type` header (URLs only, when it names an accepted
//! type), then the file extension. Anything unresolved is labelled
//! `application/octet-stream` and rejected later by the dispatcher.

use crate::artifact::{Artifact, DocumentKind};
use crate::error::SolveError;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const UNKNOWN_MIME: &str = "application/octet-stream";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve `input` into an artifact of at most `max_bytes`.
pub async fn resolve_input(
    input: &str,
    content_type: Option<&str>,
    max_bytes: usize,
    timeout_secs: u64,
) -> Result<Artifact, SolveError> {
    if is_url(input) {
        download_url(input, content_type, max_bytes, timeout_secs).await
    } else {
        read_local(input, content_type, max_bytes).await
    }
}

/// Read a local file after checking its size on disk.
async fn read_local(
    path_str: &str,
    content_type: Option<&str>,
    max_bytes: usize,
) -> Result<Artifact, SolveError> {
    let path = Path::new(path_str);
    let unavailable = |reason: String| SolveError::InputUnavailable {
        input: path_str.to_string(),
        reason,
    };

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| unavailable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unavailable("not a regular file".into()));
    }
    if meta.len() > max_bytes as u64 {
        return Err(SolveError::PayloadTooLarge {
            size: meta.len() as usize,
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let mime = content_type
        .map(str::to_string)
        .or_else(|| DocumentKind::from_extension(path).map(|k| k.as_mime().to_string()))
        .unwrap_or_else(|| UNKNOWN_MIME.to_string());

    debug!("Read local input {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(Artifact::new(bytes, mime, file_name(path_str)))
}

/// Download a URL into memory.
async fn download_url(
    url: &str,
    content_type: Option<&str>,
    max_bytes: usize,
    timeout_secs: u64,
) -> Result<Artifact, SolveError> {
    info!("Downloading question paper from: {}", url);
    let unavailable = |reason: String| SolveError::InputUnavailable {
        input: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| unavailable(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            unavailable(format!("download timed out after {timeout_secs}s"))
        } else {
            unavailable(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(unavailable(format!("HTTP {}", response.status())));
    }
    if let Some(len) = response.content_length() {
        if len > max_bytes as u64 {
            return Err(SolveError::PayloadTooLarge {
                size: len as usize,
                limit: max_bytes,
            });
        }
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| DocumentKind::from_mime(v).is_some())
        .map(str::to_string);

    let filename = url_file_name(url);
    let bytes = response
        .bytes()
        .await
        .map_err(|e| unavailable(e.to_string()))?;

    let mime = content_type
        .map(str::to_string)
        .or(header_mime)
        .or_else(|| {
            DocumentKind::from_extension(Path::new(&filename)).map(|k| k.as_mime().to_string())
        })
        .unwrap_or_else(|| UNKNOWN_MIME.to_string());

    info!("Downloaded {} bytes ({})", bytes.len(), mime);
    Ok(Artifact::new(bytes.to_vec(), mime, filename))
}

fn file_name(path_str: &str) -> String {
    Path::new(path_str)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path_str)
        .to_string()
}

/// Last non-empty URL path segment, or `download` when there is none.
fn url_file_name(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "download".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/paper.pdf"));
        assert!(is_url("http://example.com/paper.pdf"));
        assert!(!is_url("/tmp/paper.pdf"));
        assert!(!is_url("paper.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn url_file_names() {
        assert_eq!(url_file_name("https://x.org/exams/2024/maths.pdf"), "maths.pdf");
        assert_eq!(url_file_name("https://x.org/"), "download");
        assert_eq!(url_file_name("not a url"), "download");
    }

    #[tokio::test]
    async fn reads_local_file_with_extension_type() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(b"Q1. 2+2=?").unwrap();

        let a = resolve_input(tmp.path().to_str().unwrap(), None, 1024, 5)
            .await
            .unwrap();
        assert_eq!(a.content_type(), "text/plain");
        assert_eq!(a.bytes(), b"Q1. 2+2=?");
        assert!(a.filename().ends_with(".txt"));
    }

    #[tokio::test]
    async fn explicit_content_type_wins() {
        let mut tmp = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4").unwrap();

        let a = resolve_input(tmp.path().to_str().unwrap(), Some("application/pdf"), 1024, 5)
            .await
            .unwrap();
        assert_eq!(a.content_type(), "application/pdf");
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let tmp = tempfile::Builder::new().suffix(".zip").tempfile().unwrap();
        let a = resolve_input(tmp.path().to_str().unwrap(), None, 1024, 5)
            .await
            .unwrap();
        assert_eq!(a.content_type(), UNKNOWN_MIME);
        assert!(a.kind().is_none());
    }

    #[tokio::test]
    async fn oversized_local_file_is_rejected() {
        let mut tmp = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        tmp.write_all(&[b'x'; 64]).unwrap();
        let err = resolve_input(tmp.path().to_str().unwrap(), None, 16, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SolveError::PayloadTooLarge { size: 64, limit: 16 }));
    }

    #[tokio::test]
    async fn missing_file_is_input_unavailable() {
        let err = resolve_input("/definitely/not/here.pdf", None, 1024, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SolveError::InputUnavailable { .. }));
    }
}
