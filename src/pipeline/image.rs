//! Image extraction: validate a PNG/JPEG upload, then OCR it.
//!
//! Validation only parses the image header (format + dimensions), so a
//! corrupt or mislabelled upload is rejected in microseconds instead of
//! after a paid vision call. The declared label may disagree with the
//! bytes (phones happily label JPEGs `image/png`); the detected format wins
//! as long as it is PNG or JPEG.

use crate::artifact::{Artifact, DocumentKind, ExtractedText};
use crate::capability::OcrEngine;
use crate::error::SolveError;
use crate::pipeline::postprocess::clean_transcription;
use crate::pipeline::with_timeout;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};

/// Header facts gathered during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub kind: DocumentKind,
    pub width: u32,
    pub height: u32,
}

/// Validates image uploads and runs them through an [`OcrEngine`].
#[derive(Clone)]
pub struct ImageExtractor {
    ocr: Arc<dyn OcrEngine>,
    max_bytes: usize,
    timeout_secs: u64,
}

impl ImageExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, max_bytes: usize, timeout_secs: u64) -> Self {
        Self {
            ocr,
            max_bytes,
            timeout_secs,
        }
    }

    /// Check size and header sanity without decoding pixel data.
    pub fn validate(&self, artifact: &Artifact) -> Result<ImageInfo, SolveError> {
        let declared = artifact
            .kind()
            .filter(DocumentKind::is_image)
            .unwrap_or(DocumentKind::Png);
        let invalid = |reason: String| SolveError::InvalidDocument {
            kind: declared,
            reason,
        };

        if artifact.size() == 0 {
            return Err(invalid("file is empty".into()));
        }
        if artifact.size() > self.max_bytes {
            return Err(invalid(format!(
                "file is {} bytes, limit is {} bytes",
                artifact.size(),
                self.max_bytes
            )));
        }

        let info = probe(artifact.bytes()).map_err(invalid)?;
        debug!(
            "Image validated: {} {}x{} px ({} bytes)",
            info.kind,
            info.width,
            info.height,
            artifact.size()
        );
        Ok(info)
    }

    /// OCR the image. Call [`ImageExtractor::validate`] first.
    pub async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, SolveError> {
        let info = probe(bytes).map_err(|reason| SolveError::InvalidDocument {
            kind: DocumentKind::Png,
            reason,
        })?;
        let mime = info.kind.as_mime();

        let raw = with_timeout(self.timeout_secs, self.ocr.recognize(bytes, mime))
            .await
            .map_err(|e| SolveError::extraction(info.kind, e))?;

        let text = clean_transcription(&raw);
        info!("OCR extracted {} chars from {} image", text.len(), info.kind);
        Ok(ExtractedText::new(text))
    }
}

/// Read format and dimensions from the image header.
fn probe(bytes: &[u8]) -> Result<ImageInfo, String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("cannot read image: {e}"))?;

    let kind = match reader.format() {
        Some(ImageFormat::Png) => DocumentKind::Png,
        Some(ImageFormat::Jpeg) => DocumentKind::Jpeg,
        Some(other) => return Err(format!("expected PNG or JPEG data, found {other:?}")),
        None => return Err("unrecognised image data".into()),
    };

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("corrupt image header: {e}"))?;
    if width == 0 || height == 0 {
        return Err(format!("image has no pixels ({width}x{height})"));
    }

    Ok(ImageInfo {
        kind,
        width,
        height,
    })
}
