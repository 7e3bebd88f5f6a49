//! CLI binary for edgequake-qpsolve.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SolverConfig`, then either serves HTTP or solves one paper and prints
//! the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_qpsolve::server::{self, AppState};
use edgequake_qpsolve::{
    resolve_input, ProcessTextRequest, ResponseEnvelope, Solver, SolverConfig, Stage,
    StageCallback, StageCallbackRef,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── Spinner driven by request stages ─────────────────────────────────────────

struct CliStageCallback {
    bar: ProgressBar,
}

impl CliStageCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Solving");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl StageCallback for CliStageCallback {
    fn on_stage(&self, stage: Stage) {
        match stage {
            Stage::Received => self.bar.set_message("Validating…"),
            Stage::Validated => self.bar.set_message("Reading the paper…"),
            Stage::Extracted => self.bar.set_message("Generating solutions…"),
            Stage::Generated => self.bar.set_message("Formatting…"),
            Stage::Responded => self.bar.finish_with_message(green("done ✔")),
            Stage::Failed(kind) => self.bar.abandon_with_message(red(&format!("failed ({kind:?})"))),
        }
    }

    fn on_extracted(&self, chars: usize) {
        self.bar
            .println(format!("{} extracted {} characters", dim("·"), chars));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service
  qpsolve serve --bind 0.0.0.0:5000

  # Solve a PDF, print Markdown solutions
  qpsolve solve midterm.pdf

  # Solve a photo of an exam page, save the full JSON envelope
  qpsolve solve page1.jpg --json -o page1.json

  # Solve a paper from a URL
  qpsolve solve https://example.org/exams/2024-maths.pdf

  # Solve typed-in questions (or pipe them with '-')
  qpsolve text "Q1. Differentiate x^3 sin x."
  cat homework.txt | qpsolve text - --filename homework.txt

  # Check the language model is reachable
  qpsolve probe

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium (skips auto-download)
  RUST_LOG                Log filter, e.g. edgequake_qpsolve=debug
"#;

/// Solve question papers (PDF, PNG, JPEG, text) with Language Models.
#[derive(Parser, Debug)]
#[command(
    name = "qpsolve",
    version,
    about = "Solve question papers (PDF, PNG, JPEG, text) with Language Models",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// LLM model ID (e.g. gemini-2.5-flash, gpt-4.1-mini).
    #[arg(long, global = true, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: gemini, openai, anthropic, ollama.
    #[arg(long, global = true, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "QPSOLVE_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, global = true, env = "QPSOLVE_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// Largest accepted upload in MiB.
    #[arg(long, global = true, env = "QPSOLVE_MAX_UPLOAD_MB", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_upload_mb: u64,

    /// Per-LLM-call timeout in seconds.
    #[arg(long, global = true, env = "QPSOLVE_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Per-extraction (OCR, PDF) timeout in seconds.
    #[arg(long, global = true, env = "QPSOLVE_EXTRACTION_TIMEOUT", default_value_t = 60)]
    extraction_timeout: u64,

    /// Path to a text file with a custom solution prompt (must contain {question_text}).
    #[arg(long, global = true, env = "QPSOLVE_SOLUTION_PROMPT")]
    solution_prompt: Option<PathBuf>,

    /// Path to a text file with a custom OCR system prompt.
    #[arg(long, global = true, env = "QPSOLVE_OCR_PROMPT")]
    ocr_prompt: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "QPSOLVE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "QPSOLVE_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "QPSOLVE_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },

    /// Solve a question paper from a local file or an http(s) URL.
    Solve {
        /// Local file path or HTTP/HTTPS URL.
        input: String,

        /// Content type, when the extension or server header is wrong.
        #[arg(long)]
        content_type: Option<String>,

        /// Output the full JSON envelope instead of Markdown.
        #[arg(long)]
        json: bool,

        /// Write the result to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTTP download timeout in seconds.
        #[arg(long, env = "QPSOLVE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
        download_timeout: u64,
    },

    /// Solve typed-in question text (`-` reads stdin).
    Text {
        /// Question text, or `-` for stdin.
        text: String,

        /// Name reported in the envelope.
        #[arg(long)]
        filename: Option<String>,

        /// Output the full JSON envelope instead of Markdown.
        #[arg(long)]
        json: bool,

        /// Write the result to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the language model answers. Exit code 1 when it does not.
    Probe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // One-shot commands show a spinner, so library INFO logs would only
    // garble it; the server has no spinner and logs at INFO.
    let serving = matches!(cli.command, Command::Serve { .. });
    let show_progress = !cli.quiet && !serving && !matches!(cli.command, Command::Probe);
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure PDFium engine is available ───────────────────────────────────
    #[cfg(feature = "bundled")]
    {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
            .context("Failed to extract bundled PDFium engine")?;
    }

    #[cfg(not(feature = "bundled"))]
    if serving && !pdfium_auto::is_pdfium_cached() {
        // Fetch up front so the first PDF upload does not pay for the download.
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
    }

    let callback: Option<StageCallbackRef> = if show_progress && !cli.verbose {
        Some(CliStageCallback::new() as StageCallbackRef)
    } else {
        None
    };
    let config = build_config(&cli, callback).await?;
    let max_upload_bytes = config.max_upload_bytes;
    let solver = Solver::from_config(config).context("Failed to initialise LLM provider")?;

    match cli.command {
        Command::Serve { bind } => {
            server::serve(bind, AppState::new(Arc::new(solver)))
                .await
                .with_context(|| format!("Server on {bind} failed"))?;
        }

        Command::Solve {
            ref input,
            ref content_type,
            json,
            ref output,
            download_timeout,
        } => {
            let artifact = resolve_input(
                input,
                content_type.as_deref(),
                max_upload_bytes,
                download_timeout,
            )
            .await
            .with_context(|| format!("Failed to read {input}"))?;

            let envelope = solver
                .process_file(Some(artifact))
                .await
                .context("Solving failed")?;
            emit(&envelope, json, output.as_deref()).await?;
        }

        Command::Text {
            ref text,
            ref filename,
            json,
            ref output,
        } => {
            let text = if text == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read stdin")?;
                buf
            } else {
                text.clone()
            };

            let mut request = ProcessTextRequest::new(text);
            if let Some(name) = filename {
                request = request.with_filename(name.clone());
            }
            let envelope = solver
                .process_text(request)
                .await
                .context("Solving failed")?;
            emit(&envelope, json, output.as_deref()).await?;
        }

        Command::Probe => {
            let report = solver.health().await;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
            if !report.llm_connected {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `SolverConfig`.
async fn build_config(cli: &Cli, callback: Option<StageCallbackRef>) -> Result<SolverConfig> {
    let mut builder = SolverConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_upload_bytes((cli.max_upload_mb * 1024 * 1024) as usize)
        .api_timeout_secs(cli.api_timeout)
        .extraction_timeout_secs(cli.extraction_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref path) = cli.solution_prompt {
        builder = builder.solution_prompt(read_prompt(path).await?);
    }
    if let Some(ref path) = cli.ocr_prompt {
        builder = builder.ocr_prompt(read_prompt(path).await?);
    }
    if let Some(cb) = callback {
        builder = builder.stage_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn read_prompt(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read prompt from {:?}", path))
}

/// Print or save the result: Markdown solutions, or the JSON envelope.
async fn emit(envelope: &ResponseEnvelope, json: bool, output: Option<&Path>) -> Result<()> {
    let body = if json {
        let mut s =
            serde_json::to_string_pretty(envelope).context("Failed to serialise output")?;
        s.push('\n');
        s
    } else {
        envelope.solutions.clone()
    };

    match output {
        Some(path) => {
            // Write next to the target then rename, so a crash never leaves
            // a half-written file behind.
            let tmp = path.with_extension("qpsolve.tmp");
            tokio::fs::write(&tmp, body.as_bytes())
                .await
                .with_context(|| format!("Failed to write {:?}", tmp))?;
            tokio::fs::rename(&tmp, path)
                .await
                .with_context(|| format!("Failed to move output into {:?}", path))?;
            eprintln!("{}  {}", green("✔"), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(body.as_bytes())
                .context("Failed to write to stdout")?;
            if !body.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }
    Ok(())
}
