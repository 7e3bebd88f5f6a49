//! # edgequake-qpsolve
//!
//! Solve question papers with Language Models: upload a PDF, a photo of an
//! exam page, or plain text, and get back step-by-step worked solutions in
//! Markdown.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Artifact (PDF | PNG | JPEG | text)
//!  │
//!  ├─ 1. Validate  presence, size limit, declared content type
//!  ├─ 2. Extract   pdfium text layer | vision-model OCR | UTF-8 decode
//!  ├─ 3. Check     blank extraction stops here, the model is never called
//!  ├─ 4. Solve     one LLM call with the tutoring prompt
//!  └─ 5. Respond   ResponseEnvelope {extractedText, solutions, …}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_qpsolve::{Artifact, Solver, SolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / ANTHROPIC_API_KEY
//!     let solver = Solver::from_config(SolverConfig::default())?;
//!     let bytes = std::fs::read("midterm.pdf")?;
//!     let artifact = Artifact::new(bytes, "application/pdf", "midterm.pdf");
//!     let envelope = solver.process_file(Some(artifact)).await?;
//!     println!("{}", envelope.solutions);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `server`  | on      | axum HTTP server ([`server`]) |
//! | `cli`     | on      | the `qpsolve` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `bundled` | off     | embed the pdfium shared library at compile time |
//!
//! Disable the defaults when using only the library:
//! ```toml
//! edgequake-qpsolve = { version = "0.1", default-features = false }
//! ```
//!
//! ## Testing without a provider
//!
//! Every external dependency sits behind a capability trait
//! ([`LanguageModel`], [`OcrEngine`], [`PdfTextEngine`]). Build a
//! [`Solver`] with [`Solver::new`] and your own [`Capabilities`] to run the
//! full pipeline against fakes.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod capability;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod request;
#[cfg(feature = "server")]
pub mod server;
pub mod solver;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{Artifact, DocumentKind, ExtractedText, DEFAULT_MAX_UPLOAD_BYTES};
pub use capability::{Capabilities, LanguageModel, OcrEngine, PdfTextEngine};
pub use config::{SolverConfig, SolverConfigBuilder, DEFAULT_GEMINI_MODEL};
pub use error::{CapabilityError, ErrorKind, FieldError, SolveError};
pub use output::{ErrorBody, HealthReport, JobStatus, ResponseEnvelope};
pub use pipeline::input::resolve_input;
pub use progress::{Stage, StageCallback, StageCallbackRef};
pub use request::ProcessTextRequest;
pub use solver::Solver;
