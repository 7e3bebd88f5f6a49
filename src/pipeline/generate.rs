//! Solution generation: prompt the language model for worked solutions.
//!
//! One call per request, no retries. A model that answers with nothing is
//! reported as a failure rather than an empty success, since a blank
//! solutions panel is indistinguishable from a broken service for the user.

use crate::capability::LanguageModel;
use crate::config::SolverConfig;
use crate::error::{SolveError, NO_SOLUTION_MESSAGE};
use crate::pipeline::postprocess::clean_solution;
use crate::pipeline::with_timeout;
use crate::prompts::{solution_prompt, DEFAULT_SOLUTION_PROMPT, PROBE_PROMPT};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Wraps a [`LanguageModel`] with the tutoring prompt.
#[derive(Clone)]
pub struct SolutionGenerator {
    model: Arc<dyn LanguageModel>,
    template: String,
    timeout_secs: u64,
}

impl SolutionGenerator {
    pub fn new(config: &SolverConfig, model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            template: config
                .solution_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SOLUTION_PROMPT.to_string()),
            timeout_secs: config.api_timeout_secs,
        }
    }

    /// Generate Markdown solutions for `question_text`.
    ///
    /// # Errors
    /// - [`SolveError::InvalidInput`] when the text is blank
    /// - [`SolveError::GenerationFailure`] when the model errors, times out or
    ///   returns nothing
    pub async fn generate(&self, question_text: &str) -> Result<String, SolveError> {
        if question_text.trim().is_empty() {
            return Err(SolveError::InvalidInput);
        }

        let prompt = solution_prompt(&self.template, question_text);
        let start = Instant::now();
        debug!("Requesting solutions: prompt is {} chars", prompt.len());

        let reply = with_timeout(self.timeout_secs, self.model.generate(&prompt))
            .await
            .map_err(|e| {
                warn!("Solution generation failed: {}", e);
                SolveError::generation(e)
            })?;

        let solution = match reply {
            Some(text) if !text.trim().is_empty() => clean_solution(&text),
            _ => {
                warn!("Model returned no solution text");
                return Err(SolveError::GenerationFailure(NO_SOLUTION_MESSAGE.into()));
            }
        };

        info!(
            "Generated {} chars of solutions in {:?}",
            solution.len(),
            start.elapsed()
        );
        Ok(solution)
    }

    /// Connectivity probe: true when a minimal prompt gets a non-empty reply.
    ///
    /// Never fails; any error is logged and reported as `false`.
    pub async fn probe(&self) -> bool {
        match with_timeout(self.timeout_secs, self.model.generate(PROBE_PROMPT)).await {
            Ok(Some(text)) => !text.trim().is_empty(),
            Ok(None) => {
                warn!("Probe: model returned an empty response");
                false
            }
            Err(e) => {
                warn!("Probe: language model unreachable: {}", e);
                false
            }
        }
    }
}
