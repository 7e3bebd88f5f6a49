//! Error types for the edgequake-qpsolve library.
//!
//! Two error types reflect two layers of the pipeline:
//!
//! * [`CapabilityError`]: raised by an external capability (LLM provider,
//!   OCR engine, pdfium). Never returned to callers directly: every pipeline
//!   stage rewraps it with context into a [`SolveError`].
//!
//! * [`SolveError`]: the request-level failure taxonomy. Every variant maps
//!   to a stable [`ErrorKind`] and an HTTP-equivalent status code so the CLI
//!   and the HTTP server report the same failure the same way.
//!
//! No variant is process-fatal: a failed request leaves the [`crate::Solver`]
//! ready for the next one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::DocumentKind;

/// Message used when a file upload names a type outside the accepted set.
pub const UNSUPPORTED_TYPE_MESSAGE: &str =
    "Unsupported file type. Please upload PDF, PNG, JPG, or TXT files.";

/// Message used when the generator ran but returned nothing.
pub const NO_SOLUTION_MESSAGE: &str = "No solution generated from AI model";

/// A single schema violation on an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `["text"]`. Empty for the body itself.
    pub path: Vec<String>,
    /// Machine-readable code: `invalid_type`, `too_small`, `invalid_json`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl FieldError {
    pub fn new(path: &[&str], code: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Failure reported by an external capability.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// The capability could not be reached or initialised (no library, no key).
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The capability ran and reported an error.
    #[error("{0}")]
    Failed(String),

    /// The call did not complete within the configured timeout.
    #[error("timed out after {secs}s")]
    TimedOut { secs: u64 },
}

/// Stable classification of a [`SolveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    MissingFile,
    InputUnavailable,
    PayloadTooLarge,
    UnsupportedType,
    InvalidDocument,
    ExtractionFailure,
    EmptyExtraction,
    InvalidInput,
    GenerationFailure,
    Configuration,
    Internal,
}

/// All errors a solve request can end with.
#[derive(Debug, Error)]
pub enum SolveError {
    // ── Request validation ────────────────────────────────────────────────
    /// The request body failed schema validation.
    #[error("Invalid input data")]
    Validation { errors: Vec<FieldError> },

    /// A file request arrived without a file.
    #[error("No file uploaded")]
    MissingFile,

    /// A CLI input path or URL could not be read.
    #[error("Cannot read input '{input}': {reason}")]
    InputUnavailable { input: String, reason: String },

    /// The artifact exceeds the upload limit.
    #[error("File is too large: {size} bytes (limit is {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Declared content type is not one of PDF, PNG, JPG, TXT.
    #[error("{}", UNSUPPORTED_TYPE_MESSAGE)]
    UnsupportedType { content_type: String },

    // ── Extraction ────────────────────────────────────────────────────────
    /// Structural or size precondition failed before extraction.
    #[error("Invalid {kind} file: {reason}")]
    InvalidDocument { kind: DocumentKind, reason: String },

    /// The OCR or PDF capability could not produce text.
    #[error("Failed to extract text from {kind}: {reason}")]
    ExtractionFailure { kind: DocumentKind, reason: String },

    /// Extraction succeeded but produced only whitespace.
    #[error("No text could be extracted from the uploaded file")]
    EmptyExtraction,

    // ── Generation ────────────────────────────────────────────────────────
    /// Blank question text reached the generator.
    #[error("Question text is required")]
    InvalidInput,

    /// The language model errored or produced nothing.
    #[error("Failed to generate solutions: {0}")]
    GenerationFailure(String),

    // ── Configuration ─────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked task, runtime failure).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SolveError {
    /// Wrap a capability error raised while extracting `kind`.
    pub fn extraction(kind: DocumentKind, err: CapabilityError) -> Self {
        SolveError::ExtractionFailure {
            kind,
            reason: err.to_string(),
        }
    }

    /// Wrap a capability error raised by the language model.
    pub fn generation(err: CapabilityError) -> Self {
        SolveError::GenerationFailure(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::Validation { .. } => ErrorKind::ValidationError,
            SolveError::MissingFile => ErrorKind::MissingFile,
            SolveError::InputUnavailable { .. } => ErrorKind::InputUnavailable,
            SolveError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            SolveError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            SolveError::InvalidDocument { .. } => ErrorKind::InvalidDocument,
            SolveError::ExtractionFailure { .. } => ErrorKind::ExtractionFailure,
            SolveError::EmptyExtraction => ErrorKind::EmptyExtraction,
            SolveError::InvalidInput => ErrorKind::InvalidInput,
            SolveError::GenerationFailure(_) => ErrorKind::GenerationFailure,
            SolveError::ProviderNotConfigured { .. } | SolveError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            SolveError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-equivalent status code for this failure.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::ValidationError
            | ErrorKind::MissingFile
            | ErrorKind::InputUnavailable
            | ErrorKind::UnsupportedType
            | ErrorKind::InvalidDocument
            | ErrorKind::EmptyExtraction
            | ErrorKind::InvalidInput => 400,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::ExtractionFailure
            | ErrorKind::GenerationFailure
            | ErrorKind::Configuration
            | ErrorKind::Internal => 500,
        }
    }

    /// Structured field errors, present only for schema validation failures.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            SolveError::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}
