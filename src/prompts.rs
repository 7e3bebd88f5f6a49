//! Prompts sent to the language model.
//!
//! All prompt text lives here so wording changes touch exactly one file and
//! unit tests can inspect prompts without a live model.
//!
//! Callers can override the solution and OCR prompts through
//! [`crate::config::SolverConfig`]; these constants are the defaults.

/// Placeholder replaced by the question-paper text in solution prompts.
pub const QUESTION_PLACEHOLDER: &str = "{question_text}";

/// Default tutoring prompt. `{question_text}` is substituted before sending.
pub const DEFAULT_SOLUTION_PROMPT: &str = r#"You are an expert tutor. Analyze the following question paper and provide detailed, step-by-step solutions for each question. Format your response in markdown with clear headings and explanations.

Question Paper:
{question_text}

Please provide:
1. Clear identification of each question
2. Step-by-step solution methodology
3. Final answers where applicable
4. Explanations of key concepts used

Format the response professionally with proper markdown formatting."#;

/// Minimal prompt used by the connectivity probe.
pub const PROBE_PROMPT: &str = "Test connection";

/// System prompt for transcribing a photographed or scanned question paper.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are a precise OCR engine. Transcribe ALL text visible in the image exactly as written.

Rules:
1. Preserve question numbering, sub-parts (a), (b), (i), (ii) and marks allocations
2. Keep the reading order a student would follow
3. Write mathematical expressions in LaTeX: $inline$ and $$display$$
4. Reproduce tables as GFM pipe tables
5. Do NOT solve, summarise, translate or comment on anything
6. Do NOT wrap the output in ```markdown fences
7. If the image contains no readable text, output nothing"#;

/// Fill `template` with the question text.
pub fn solution_prompt(template: &str, question_text: &str) -> String {
    template.replace(QUESTION_PLACEHOLDER, question_text)
}
