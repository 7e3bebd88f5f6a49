//! Pipeline stages for solving a question paper.
//!
//! Each submodule implements one step, so every step can be tested with a
//! fake capability and swapped without touching its neighbours.
//!
//! ## Data Flow
//!
//! ```text
//! Artifact ──▶ dispatch ──▶ text | image | pdf ──▶ postprocess ──▶ generate
//!              (by type)    (extract)              (normalise)     (LLM)
//! ```
//!
//! 1. [`dispatch`]   : size check, classify by content type, call one extractor
//! 2. [`text`]       : UTF-8 decode, no capability
//! 3. [`image`]      : header validation + OCR capability
//! 4. [`pdf`]        : magic-byte validation + PDF text capability
//! 5. [`postprocess`]: deterministic cleanup of extracted and generated text
//! 6. [`generate`]   : prompt the language model for worked solutions
//! 7. [`input`]      : resolve CLI paths and URLs into artifacts

pub mod dispatch;
pub mod generate;
pub mod image;
pub mod input;
pub mod pdf;
pub mod postprocess;
pub mod text;

use crate::error::CapabilityError;
use std::future::Future;
use std::time::Duration;

/// Run a capability call under a deadline.
pub(crate) async fn with_timeout<T, F>(secs: u64, call: F) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    tokio::time::timeout(Duration::from_secs(secs), call)
        .await
        .map_err(|_| CapabilityError::TimedOut { secs })?
}
