//! Production implementations of the capability traits.
//!
//! | Capability                               | Implementation         | Backend                |
//! |------------------------------------------|------------------------|------------------------|
//! | [`LanguageModel`](crate::LanguageModel)  | [`LlmSolver`]          | any `edgequake-llm` provider |
//! | [`OcrEngine`](crate::OcrEngine)          | [`VisionOcr`]          | a vision-capable provider    |
//! | [`PdfTextEngine`](crate::PdfTextEngine)  | [`PdfiumText`]         | pdfium via `pdfium-auto`     |
//!
//! [`default_capabilities`] wires all three from a [`SolverConfig`].

pub mod encode;
pub mod llm;
pub mod pdfium;

pub use llm::{resolve_provider, LlmSolver, VisionOcr};
pub use pdfium::PdfiumText;

use crate::capability::Capabilities;
use crate::config::SolverConfig;
use crate::error::SolveError;
use std::sync::Arc;

/// Build the production capability set.
///
/// The same provider serves solution generation and OCR, so one API key is
/// enough to run the whole service.
pub fn default_capabilities(config: &SolverConfig) -> Result<Capabilities, SolveError> {
    let provider = resolve_provider(config)?;
    Ok(Capabilities {
        model: Arc::new(LlmSolver::new(Arc::clone(&provider), config)),
        ocr: Arc::new(VisionOcr::new(provider, config)),
        pdf: Arc::new(PdfiumText::new()),
    })
}
