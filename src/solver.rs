//! Request orchestration: validate → extract → generate → envelope.
//!
//! ## Why one shared `Solver`?
//!
//! A `Solver` holds only immutable configuration and `Arc` capability
//! handles, so the HTTP server wraps a single instance in an `Arc` and serves
//! every request from it. Requests never share mutable state and one failing
//! request cannot affect another.
//!
//! ## Failure boundary
//!
//! Each public operation runs its pipeline inside `catch_unwind`. A panic in
//! a capability (a buggy OCR adapter, say) becomes [`SolveError::Internal`]
//! for that request only; the process and the shared solver carry on.

use crate::artifact::Artifact;
use crate::capability::Capabilities;
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::output::{HealthReport, JobStatus, ResponseEnvelope};
use crate::pipeline::dispatch::ExtractionDispatcher;
use crate::pipeline::generate::SolutionGenerator;
use crate::progress::{Stage, StageCallbackRef};
use crate::providers;
use crate::request::ProcessTextRequest;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Solves question papers end to end.
///
/// # Example
///
/// ```rust,no_run
/// use edgequake_qpsolve::{ProcessTextRequest, Solver, SolverConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
///     let solver = Solver::from_config(SolverConfig::default())?;
///     let envelope = solver
///         .process_text(ProcessTextRequest::new("Q1. Solve 2x + 3 = 7."))
///         .await?;
///     println!("{}", envelope.solutions);
///     Ok(())
/// }
/// ```
pub struct Solver {
    config: SolverConfig,
    dispatcher: ExtractionDispatcher,
    generator: SolutionGenerator,
    callback: Option<StageCallbackRef>,
}

impl Solver {
    /// Build a solver from explicit capabilities.
    pub fn new(config: SolverConfig, capabilities: Capabilities) -> Self {
        let dispatcher = ExtractionDispatcher::new(&config, capabilities.ocr, capabilities.pdf);
        let generator = SolutionGenerator::new(&config, capabilities.model);
        let callback = config.stage_callback.clone();
        Self {
            config,
            dispatcher,
            generator,
            callback,
        }
    }

    /// Build a solver with the production capabilities: the resolved LLM
    /// provider for solutions and OCR, pdfium for PDF text.
    ///
    /// # Errors
    /// [`SolveError::ProviderNotConfigured`] when no provider can be resolved.
    pub fn from_config(config: SolverConfig) -> Result<Self, SolveError> {
        let capabilities = providers::default_capabilities(&config)?;
        Ok(Self::new(config, capabilities))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a typed-in question paper.
    ///
    /// # Errors
    /// - [`SolveError::Validation`] when `text` is empty
    /// - [`SolveError::InvalidInput`] when `text` is only whitespace
    /// - [`SolveError::GenerationFailure`] when the model fails
    pub async fn process_text(
        &self,
        request: ProcessTextRequest,
    ) -> Result<ResponseEnvelope, SolveError> {
        self.run(async move {
            request.validate()?;
            self.enter(Stage::Validated);

            let solutions = self.generator.generate(&request.text).await?;
            self.enter(Stage::Generated);

            Ok(ResponseEnvelope::for_text(
                request.text,
                solutions,
                request.filename,
            ))
        })
        .await
    }

    /// Solve an uploaded question paper.
    ///
    /// `None` models a file request that arrived without a file.
    ///
    /// # Errors
    /// - [`SolveError::MissingFile`] when no artifact was supplied
    /// - [`SolveError::PayloadTooLarge`] / [`SolveError::UnsupportedType`]
    ///   before any extractor runs
    /// - [`SolveError::InvalidDocument`] / [`SolveError::ExtractionFailure`]
    ///   from the extractor
    /// - [`SolveError::EmptyExtraction`] when nothing but whitespace was read;
    ///   the model is not called
    /// - [`SolveError::GenerationFailure`] when the model fails
    pub async fn process_file(
        &self,
        artifact: Option<Artifact>,
    ) -> Result<ResponseEnvelope, SolveError> {
        self.run(async move {
            let artifact = artifact.ok_or(SolveError::MissingFile)?;
            self.dispatcher.classify(&artifact)?;
            self.enter(Stage::Validated);

            let start = Instant::now();
            let extraction = self.dispatcher.extract(&artifact).await?;
            let chars = extraction.text.as_str().chars().count();
            if let Some(ref cb) = self.callback {
                cb.on_extracted(chars);
            }
            info!(
                "Extracted {} chars from '{}' ({}) in {:?}",
                chars,
                artifact.filename(),
                extraction.kind,
                start.elapsed()
            );

            if extraction.text.is_blank() {
                return Err(SolveError::EmptyExtraction);
            }
            self.enter(Stage::Extracted);

            let solutions = self.generator.generate(extraction.text.as_str()).await?;
            self.enter(Stage::Generated);

            Ok(ResponseEnvelope::for_file(
                artifact.filename(),
                artifact.content_type(),
                extraction.text.into_inner(),
                solutions,
            ))
        })
        .await
    }

    /// Health report with a live connectivity probe of the language model.
    pub async fn health(&self) -> HealthReport {
        let connected = self.generator.probe().await;
        debug!("Health probe: llm_connected={}", connected);
        HealthReport::ok(connected)
    }

    /// Status of a job. Processing is synchronous, so every job is complete.
    pub fn job_status(&self, job_id: &str) -> JobStatus {
        JobStatus::completed(job_id)
    }

    /// Drive one request through the stage machine.
    async fn run<F>(&self, pipeline: F) -> Result<ResponseEnvelope, SolveError>
    where
        F: Future<Output = Result<ResponseEnvelope, SolveError>>,
    {
        self.enter(Stage::Received);
        let start = Instant::now();

        let result = match AssertUnwindSafe(pipeline).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(SolveError::Internal(panic_message(panic.as_ref()))),
        };

        match &result {
            Ok(envelope) => {
                self.enter(Stage::Responded);
                info!(
                    "Solved '{}' in {:?} ({} chars of solutions)",
                    envelope.filename,
                    start.elapsed(),
                    envelope.solutions.len()
                );
            }
            Err(e) => {
                warn!("Request failed after {:?}: {}", start.elapsed(), e);
                self.enter(Stage::Failed(e.kind()));
            }
        }
        result
    }

    fn enter(&self, stage: Stage) {
        debug!("Request stage: {}", stage);
        if let Some(ref cb) = self.callback {
            cb.on_stage(stage);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("request processing panicked: {}", detail)
}
