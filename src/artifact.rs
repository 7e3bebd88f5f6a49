//! The uploaded unit and its classification.
//!
//! An [`Artifact`] is built at the request boundary (multipart field, CLI
//! file, downloaded URL) and lives only for the duration of one request.
//! Its declared content type is mapped onto the closed [`DocumentKind`]
//! enumeration; anything that does not map is rejected before extraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Upload limit applied when the config does not override it: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// The accepted document types. Exhaustive on purpose: adding a variant must
/// force every dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Png,
    Jpeg,
    PlainText,
}

impl DocumentKind {
    /// Classify a declared MIME type.
    ///
    /// Parameters (`; charset=utf-8`) and case are ignored. JPEG accepts the
    /// `image/jpg` and `image/pjpeg` aliases browsers still send.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            "image/png" => Some(DocumentKind::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(DocumentKind::Jpeg),
            "text/plain" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    /// Guess a kind from a file extension (CLI inputs without a declared type).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" => Some(DocumentKind::Png),
            "jpg" | "jpeg" => Some(DocumentKind::Jpeg),
            "txt" | "text" | "md" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    /// Canonical MIME type for this kind.
    pub fn as_mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Png => "image/png",
            DocumentKind::Jpeg => "image/jpeg",
            DocumentKind::PlainText => "text/plain",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentKind::Png | DocumentKind::Jpeg)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Png => "PNG",
            DocumentKind::Jpeg => "JPEG",
            DocumentKind::PlainText => "text",
        };
        f.write_str(label)
    }
}

/// One uploaded document: bytes + declared type + original filename.
#[derive(Clone)]
pub struct Artifact {
    bytes: Vec<u8>,
    content_type: String,
    filename: String,
}

impl Artifact {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The content type exactly as declared by the sender.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Classified kind, or `None` when the declared type is not accepted.
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_mime(&self.content_type)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Normalised text produced by exactly one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing but whitespace was extracted.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
