//! `edgequake-llm` adapters: solution generation and vision OCR.
//!
//! Both adapters are thin. Prompt text lives in [`crate::prompts`] and
//! timeouts are applied by the pipeline, so nothing here retries or sleeps.

use crate::capability::{LanguageModel, OcrEngine};
use crate::config::{SolverConfig, DEFAULT_GEMINI_MODEL};
use crate::error::{CapabilityError, SolveError};
use crate::prompts::DEFAULT_OCR_PROMPT;
use crate::providers::encode::encode_image;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// User turn sent alongside the image. Some providers reject an empty text part.
const OCR_USER_TEXT: &str = "Transcribe this question paper.";

/// Solution generation over a chat completion.
pub struct LlmSolver {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
}

impl LlmSolver {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SolverConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl LanguageModel for LlmSolver {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, CapabilityError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];
        let options = build_options(self.temperature, self.max_tokens);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;

        debug!(
            "Solve call: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(Some(response.content).filter(|c| !c.trim().is_empty()))
    }
}

/// OCR through a vision-capable chat model.
///
/// ## Message Layout
///
/// 1. **System message**: the transcription prompt (or a caller override)
/// 2. **User message**: a short instruction plus the image attachment
pub struct VisionOcr {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    max_pixels: u32,
    max_tokens: usize,
}

impl VisionOcr {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &SolverConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .ocr_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_OCR_PROMPT.to_string()),
            max_pixels: config.max_image_pixels,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl OcrEngine for VisionOcr {
    async fn recognize(&self, image: &[u8], mime: &str) -> Result<String, CapabilityError> {
        let start = Instant::now();
        let bytes = image.to_vec();
        let mime_owned = mime.to_string();
        let max_pixels = self.max_pixels;

        // Decoding and resizing a phone photo is CPU-bound.
        let image_data =
            tokio::task::spawn_blocking(move || encode_image(&bytes, &mime_owned, max_pixels))
                .await
                .map_err(|e| CapabilityError::Failed(format!("Image encoding task panicked: {e}")))?
                .map_err(|e| CapabilityError::Failed(format!("Image encoding failed: {e}")))?;

        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images(OCR_USER_TEXT, vec![image_data]),
        ];
        // Transcription must be deterministic whatever the solve temperature is.
        let options = build_options(0.0, self.max_tokens);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| CapabilityError::Failed(e.to_string()))?;

        debug!(
            "OCR call: {} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        Ok(response.content)
    }
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SolveError> {
    info!("Using LLM provider {} with model {}", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SolveError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`, or
///    [`DEFAULT_GEMINI_MODEL`] when no model is set.
/// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
/// 4. **Gemini** when `GEMINI_API_KEY` is present.
/// 5. **Full auto-detection** via [`ProviderFactory::from_env`].
pub fn resolve_provider(config: &SolverConfig) -> Result<Arc<dyn LLMProvider>, SolveError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL);
            return create_provider("gemini", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SolveError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or ANTHROPIC_API_KEY.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
