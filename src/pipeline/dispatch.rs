//! Extraction dispatcher: route an artifact to exactly one extractor.
//!
//! ```text
//! Artifact ──▶ size check ──▶ DocumentKind::from_mime
//!                                 ├─ Pdf        ─▶ PdfExtractor   (validate → extract)
//!                                 ├─ Png | Jpeg ─▶ ImageExtractor (validate → extract)
//!                                 ├─ PlainText  ─▶ text::extract
//!                                 └─ None       ─▶ UnsupportedType
//! ```
//!
//! The size check runs first so an oversized upload never reaches a
//! capability, whatever type it claims to be.

use crate::artifact::{Artifact, DocumentKind, ExtractedText};
use crate::capability::{OcrEngine, PdfTextEngine};
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::pipeline::image::ImageExtractor;
use crate::pipeline::pdf::PdfExtractor;
use crate::pipeline::text;
use std::sync::Arc;
use tracing::{debug, warn};

/// Output of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub kind: DocumentKind,
    pub text: ExtractedText,
}

/// Classifies artifacts and invokes the matching extractor.
#[derive(Clone)]
pub struct ExtractionDispatcher {
    pdf: PdfExtractor,
    image: ImageExtractor,
    max_bytes: usize,
}

impl ExtractionDispatcher {
    pub fn new(
        config: &SolverConfig,
        ocr: Arc<dyn OcrEngine>,
        pdf: Arc<dyn PdfTextEngine>,
    ) -> Self {
        let max_bytes = config.max_upload_bytes;
        let timeout = config.extraction_timeout_secs;
        Self {
            pdf: PdfExtractor::new(pdf, max_bytes, timeout),
            image: ImageExtractor::new(ocr, max_bytes, timeout),
            max_bytes,
        }
    }

    /// Check the size limit and classify the declared content type.
    ///
    /// Runs no capability, so a request can be rejected before any
    /// expensive work starts.
    pub fn classify(&self, artifact: &Artifact) -> Result<DocumentKind, SolveError> {
        if artifact.size() > self.max_bytes {
            warn!(
                "Rejecting '{}': {} bytes exceeds limit of {}",
                artifact.filename(),
                artifact.size(),
                self.max_bytes
            );
            return Err(SolveError::PayloadTooLarge {
                size: artifact.size(),
                limit: self.max_bytes,
            });
        }

        artifact.kind().ok_or_else(|| {
            warn!(
                "Rejecting '{}': unsupported content type '{}'",
                artifact.filename(),
                artifact.content_type()
            );
            SolveError::UnsupportedType {
                content_type: artifact.content_type().to_string(),
            }
        })
    }

    /// Extract text from `artifact` using the strategy for its declared type.
    pub async fn extract(&self, artifact: &Artifact) -> Result<Extraction, SolveError> {
        let kind = self.classify(artifact)?;

        debug!(
            "Dispatching '{}' ({} bytes) as {}",
            artifact.filename(),
            artifact.size(),
            kind
        );

        let text = match kind {
            DocumentKind::Pdf => {
                self.pdf.validate(artifact)?;
                self.pdf.extract(artifact.bytes()).await?
            }
            DocumentKind::Png | DocumentKind::Jpeg => {
                self.image.validate(artifact)?;
                self.image.extract(artifact.bytes()).await?
            }
            DocumentKind::PlainText => text::extract(artifact.bytes()),
        };

        Ok(Extraction { kind, text })
    }
}
