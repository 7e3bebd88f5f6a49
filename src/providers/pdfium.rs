//! PDF text-layer extraction with pdfium.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a synchronous C library and parsing a long paper can take
//! hundreds of milliseconds. Running it on the async executor would stall
//! every other in-flight request, so the whole bind → load → read sequence
//! runs on tokio's blocking pool.
//!
//! The library is located by `pdfium-auto`: `PDFIUM_LIB_PATH`, then the
//! per-user cache, then a one-time download.

use crate::capability::PdfTextEngine;
use crate::error::CapabilityError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// [`PdfTextEngine`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumText {
    library_path: Option<PathBuf>,
}

impl PdfiumText {
    /// Locate pdfium through `pdfium-auto`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the pdfium shared library at `path`.
    pub fn with_library(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }
}

#[async_trait]
impl PdfTextEngine for PdfiumText {
    async fn extract_text(&self, pdf: &[u8]) -> Result<String, CapabilityError> {
        let bytes = pdf.to_vec();
        let library = self.library_path.clone();

        tokio::task::spawn_blocking(move || extract_blocking(&bytes, library.as_deref()))
            .await
            .map_err(|e| CapabilityError::Failed(format!("PDF task panicked: {}", e)))?
    }
}

fn bind(library: Option<&std::path::Path>) -> Result<Pdfium, CapabilityError> {
    let bound = match library {
        Some(path) => pdfium_auto::bind_pdfium_from_path(path),
        None => pdfium_auto::bind_pdfium_silent(),
    };
    bound.map_err(|e| CapabilityError::Unavailable(format!("PDF engine: {}", e)))
}

/// Blocking implementation of text extraction. Pages with no text layer
/// are skipped; the rest are joined with a blank line.
fn extract_blocking(
    bytes: &[u8],
    library: Option<&std::path::Path>,
) -> Result<String, CapabilityError> {
    let pdfium = bind(library)?;

    let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            CapabilityError::Failed("document is password-protected".to_string())
        } else {
            CapabilityError::Failed(format!("corrupt or unreadable PDF ({})", err_str))
        }
    })?;

    let pages = document.pages();
    let total = pages.len() as usize;
    let mut texts = Vec::with_capacity(total);

    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| CapabilityError::Failed(format!("page {}: {:?}", idx + 1, e)))?
            .all();
        if text.trim().is_empty() {
            debug!("Page {} has no text layer", idx + 1);
            continue;
        }
        texts.push(text);
    }

    info!(
        "Read text from {}/{} PDF pages",
        texts.len(),
        total
    );
    Ok(texts.join("\n\n"))
}
