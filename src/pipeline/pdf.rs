//! PDF extraction: validate the upload, then read its text layer.
//!
//! Validation checks the `%PDF` magic bytes before anything touches pdfium,
//! so a renamed ZIP or an empty upload fails fast with a clear message
//! instead of a pdfium parse error.
//!
//! Scanned PDFs without a text layer yield blank text here; the orchestrator
//! reports that as an empty extraction. There is deliberately no fallback to
//! OCR: one strategy per document type.

use crate::artifact::{Artifact, DocumentKind, ExtractedText};
use crate::capability::PdfTextEngine;
use crate::error::SolveError;
use crate::pipeline::postprocess::normalise_text;
use crate::pipeline::with_timeout;
use std::sync::Arc;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validates PDF uploads and reads them through a [`PdfTextEngine`].
#[derive(Clone)]
pub struct PdfExtractor {
    engine: Arc<dyn PdfTextEngine>,
    max_bytes: usize,
    timeout_secs: u64,
}

impl PdfExtractor {
    pub fn new(engine: Arc<dyn PdfTextEngine>, max_bytes: usize, timeout_secs: u64) -> Self {
        Self {
            engine,
            max_bytes,
            timeout_secs,
        }
    }

    /// Check size and magic bytes.
    pub fn validate(&self, artifact: &Artifact) -> Result<(), SolveError> {
        let invalid = |reason: String| SolveError::InvalidDocument {
            kind: DocumentKind::Pdf,
            reason,
        };
        let bytes = artifact.bytes();

        if bytes.is_empty() {
            return Err(invalid("file is empty".into()));
        }
        if bytes.len() > self.max_bytes {
            return Err(invalid(format!(
                "file is {} bytes, limit is {} bytes",
                bytes.len(),
                self.max_bytes
            )));
        }
        if bytes.len() < PDF_MAGIC.len() || &bytes[..4] != PDF_MAGIC {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(4);
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(invalid(format!("not a PDF, first bytes: {magic:?}")));
        }

        debug!("PDF validated: {} bytes", bytes.len());
        Ok(())
    }

    /// Extract the text layer. Call [`PdfExtractor::validate`] first.
    pub async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, SolveError> {
        let raw = with_timeout(self.timeout_secs, self.engine.extract_text(bytes))
            .await
            .map_err(|e| SolveError::extraction(DocumentKind::Pdf, e))?;

        let text = normalise_text(&raw);
        info!("PDF text layer: {} chars", text.len());
        Ok(ExtractedText::new(text))
    }
}
