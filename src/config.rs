//! Configuration for the solve pipeline.
//!
//! Every knob lives in [`SolverConfig`], built via [`SolverConfigBuilder`].
//! The config is read once when a [`crate::Solver`] is constructed and is
//! immutable afterwards, so a single solver can be shared across concurrent
//! requests without locking.

use crate::artifact::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::SolveError;
use crate::progress::StageCallbackRef;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when the provider is auto-detected from `GEMINI_API_KEY`.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the solve pipeline.
///
/// # Example
/// ```rust
/// use edgequake_qpsolve::SolverConfig;
///
/// let config = SolverConfig::builder()
///     .model("gemini-2.5-flash")
///     .max_upload_bytes(5 * 1024 * 1024)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
/// ```
#[derive(Clone)]
pub struct SolverConfig {
    /// LLM model identifier, e.g. "gemini-2.5-flash", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Worked solutions need a little freedom in wording but not in the
    /// arithmetic; OCR calls always run at 0.0 regardless of this value.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 8192.
    ///
    /// A full exam paper with ten questions routinely needs 4 000+ tokens of
    /// worked solutions; too low a cap truncates the last answers.
    pub max_tokens: usize,

    /// Largest accepted artifact in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,

    /// Longest image edge (px) sent to the vision model. Default: 2000.
    ///
    /// Phone photos of exam papers are often 4000+ px; they are downscaled
    /// before upload so the request stays well under provider limits.
    pub max_image_pixels: u32,

    /// Per-LLM-call timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Per-extraction timeout in seconds (OCR and PDF). Default: 60.
    pub extraction_timeout_secs: u64,

    /// Custom solution prompt. Must contain `{question_text}`.
    pub solution_prompt: Option<String>,

    /// Custom OCR system prompt for the vision model.
    pub ocr_prompt: Option<String>,

    /// Receives request stage transitions.
    pub stage_callback: Option<StageCallbackRef>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 8192,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_image_pixels: 2000,
            api_timeout_secs: 120,
            extraction_timeout_secs: 60,
            solution_prompt: None,
            ocr_prompt: None,
            stage_callback: None,
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_image_pixels", &self.max_image_pixels)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("extraction_timeout_secs", &self.extraction_timeout_secs)
            .field("custom_solution_prompt", &self.solution_prompt.is_some())
            .field("custom_ocr_prompt", &self.ocr_prompt.is_some())
            .finish()
    }
}

impl SolverConfig {
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn max_image_pixels(mut self, px: u32) -> Self {
        self.config.max_image_pixels = px.max(100);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn extraction_timeout_secs(mut self, secs: u64) -> Self {
        self.config.extraction_timeout_secs = secs;
        self
    }

    pub fn solution_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.solution_prompt = Some(prompt.into());
        self
    }

    pub fn ocr_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ocr_prompt = Some(prompt.into());
        self
    }

    pub fn stage_callback(mut self, cb: StageCallbackRef) -> Self {
        self.config.stage_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SolverConfig, SolveError> {
        let c = &self.config;
        if c.max_upload_bytes == 0 {
            return Err(SolveError::InvalidConfig(
                "Upload limit must be ≥ 1 byte".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(SolveError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 || c.extraction_timeout_secs == 0 {
            return Err(SolveError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref prompt) = c.solution_prompt {
            if !prompt.contains(crate::prompts::QUESTION_PLACEHOLDER) {
                return Err(SolveError::InvalidConfig(format!(
                    "Custom solution prompt must contain {}",
                    crate::prompts::QUESTION_PLACEHOLDER
                )));
            }
        }
        Ok(self.config)
    }
}
