//! Narrow interfaces over the external capabilities the pipeline consumes.
//!
//! The pipeline never talks to an LLM SDK or to pdfium directly. It holds
//! `Arc<dyn …>` handles to these three traits, which lets tests substitute
//! fakes and lets deployments swap engines (a different OCR backend, a local
//! model) without touching extraction or orchestration logic.
//!
//! Production implementations live in [`crate::providers`].

use crate::error::CapabilityError;
use async_trait::async_trait;
use std::sync::Arc;

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion for `prompt`.
    ///
    /// `Ok(None)` means the call succeeded but the model returned no text.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, CapabilityError>;
}

/// Reads text out of an encoded image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// `mime` is the detected image format (`image/png` or `image/jpeg`).
    async fn recognize(&self, image: &[u8], mime: &str) -> Result<String, CapabilityError>;
}

/// Reads the text layer of a PDF document.
#[async_trait]
pub trait PdfTextEngine: Send + Sync {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String, CapabilityError>;
}

/// The set of capability handles a [`crate::Solver`] is built from.
#[derive(Clone)]
pub struct Capabilities {
    pub model: Arc<dyn LanguageModel>,
    pub ocr: Arc<dyn OcrEngine>,
    pub pdf: Arc<dyn PdfTextEngine>,
}
