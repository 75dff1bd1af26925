//! CLI binary for resume-review.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalyzerConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_review::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use resume_review::{
    extract_only, render_report, resolve_input, run_pipeline, write_export, AnalysisResult,
    Analyzer, AnalyzerConfig, ReportOptions, ReportStyle, EXPORT_FILE_NAME,
};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status when the model call completed but produced the error shape.
const EXIT_ANALYSIS_FAILED: u8 = 2;

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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Colour switch for one output stream.
#[derive(Debug, Clone, Copy)]
struct Palette {
    enabled: bool,
}

impl Palette {
    /// Colour only on a terminal, and never with `--no-color` or `NO_COLOR`.
    fn detect(no_color: bool, is_terminal: bool) -> Self {
        Self {
            enabled: !no_color && is_terminal && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(self, colour: fn(&str) -> String, s: &str) -> String {
        if self.enabled {
            colour(s)
        } else {
            s.to_string()
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a resume and print the report
  resume-review cv.pdf

  # Also save the analysis as resume_analysis.json
  resume-review cv.docx -o

  # Save under a different name (a file name needs "=")
  resume-review cv.docx --output=reports/jane.json

  # Machine-readable result (either shape) on stdout
  resume-review --json cv.pdf > result.json

  # Markdown report
  resume-review --markdown cv.pdf > review.md

  # Resume hosted online
  resume-review https://example.com/jane-doe.pdf

  # Check what text the model would see (no API key needed)
  resume-review --extract-only cv.pdf

  # Another edgequake-llm provider instead of Groq
  resume-review --provider openai --model gpt-4.1-mini cv.pdf

EXIT STATUS:
  0  analysis succeeded
  1  the document could not be read or the configuration is invalid
  2  the model call failed or its reply did not match the schema

ENVIRONMENT VARIABLES:
  GROQ_API_KEY                 API key for the default Groq backend
  RESUME_REVIEW_MODEL          Override model ID
  RESUME_REVIEW_PROVIDER       Use an edgequake-llm provider (openai, anthropic, gemini, ollama)
  RESUME_REVIEW_BASE_URL       Any OpenAI-compatible endpoint
  OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY
                               Read by the matching --provider
  RUST_LOG                     Override log filtering

SETUP:
  1. Set API key:     export GROQ_API_KEY=gsk_...
  2. Analyse:         resume-review cv.pdf -o
"#;

/// Analyse a PDF or Word resume with an LLM and print structured feedback.
#[derive(Parser, Debug)]
#[command(
    name = "resume-review",
    version,
    about = "Analyse a PDF or Word resume with an LLM and print structured feedback",
    long_about = "Extract the text of a resume (PDF or .docx, local file or URL), ask a \
chat-completion model for a scored review in a fixed JSON schema, and print it as a report. \
Uses Groq by default; any OpenAI-compatible endpoint or edgequake-llm provider also works.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/DOCX file path or HTTP/HTTPS URL.
    input: String,

    /// Save the analysis as JSON (default file: resume_analysis.json;
    /// give another with --output=FILE).
    #[arg(
        short,
        long,
        env = "RESUME_REVIEW_OUTPUT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = EXPORT_FILE_NAME
    )]
    output: Option<PathBuf>,

    /// API key for the default Groq backend.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM model ID.
    #[arg(long, env = "RESUME_REVIEW_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "RESUME_REVIEW_PROVIDER",
        long_help = "Use an edgequake-llm provider instead of the built-in Groq client.\n\
          The provider reads its own key variable (OPENAI_API_KEY, ANTHROPIC_API_KEY, …)."
    )]
    provider: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint.
    #[arg(long, env = "RESUME_REVIEW_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "RESUME_REVIEW_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, env = "RESUME_REVIEW_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "RESUME_REVIEW_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// LLM call timeout in seconds.
    #[arg(long, env = "RESUME_REVIEW_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "RESUME_REVIEW_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the result (either shape) as JSON instead of a report.
    #[arg(long, env = "RESUME_REVIEW_JSON", conflicts_with = "markdown")]
    json: bool,

    /// Print the report as Markdown.
    #[arg(long, env = "RESUME_REVIEW_MARKDOWN")]
    markdown: bool,

    /// Include the raw model reply when the analysis fails.
    #[arg(long)]
    show_raw: bool,

    /// Print the extracted text only, no analysis.
    #[arg(long)]
    extract_only: bool,

    /// Disable colours in the report.
    #[arg(long, env = "RESUME_REVIEW_NO_COLOR")]
    no_color: bool,

    /// Disable the spinner.
    #[arg(long, env = "RESUME_REVIEW_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME_REVIEW_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the report and errors.
    #[arg(short, long, env = "RESUME_REVIEW_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO logs would tear through the spinner; keep them for -v.
    let stderr_tty = io::stderr().is_terminal();
    let palette = Palette::detect(cli.no_color, stderr_tty);
    let show_progress = !cli.quiet && !cli.no_progress && !cli.extract_only && stderr_tty;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_only(&cli.input, cli.download_timeout)
            .await
            .context("Failed to extract text")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(text.as_str().as_bytes())
            .context("Failed to write to stdout")?;
        if !text.as_str().ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build analyzer ───────────────────────────────────────────────────
    // Credential problems surface before anything is downloaded or parsed.
    let config = build_config(&cli).await?;
    let analyzer = Analyzer::new(config).context("Cannot start the analysis")?;

    let doc = resolve_input(&cli.input, cli.download_timeout)
        .await
        .context("Failed to read resume")?;

    // ── Run analysis ─────────────────────────────────────────────────────
    let progress = show_progress.then(|| spinner(&doc.name, palette));
    let output = run_pipeline(&analyzer, doc).await;
    if let Some(ref bar) = progress {
        bar.finish_and_clear();
    }
    let output = output.context("Failed to extract text from resume")?;

    // ── Present ──────────────────────────────────────────────────────────
    if cli.json {
        let json =
            serde_json::to_string_pretty(&output.result).context("Failed to serialise result")?;
        println!("{json}");
    } else {
        let options = ReportOptions {
            style: report_style(&cli),
            show_raw: cli.show_raw,
            ..Default::default()
        };
        let report = render_report(&output.result, &options);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(report.as_bytes())
            .context("Failed to write to stdout")?;
        if !report.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    // ── Export ───────────────────────────────────────────────────────────
    if let Some(ref path) = cli.output {
        match output.result {
            AnalysisResult::Success(ref analysis) => {
                let written = write_export(analysis, path)
                    .with_context(|| format!("Failed to save analysis to {}", path.display()))?;
                if !cli.quiet {
                    eprintln!(
                        "{} Analysis saved to {}",
                        palette.paint(green, "✔"),
                        palette.paint(bold, &written.display().to_string())
                    );
                }
            }
            AnalysisResult::Failure(_) => {
                if !cli.quiet {
                    eprintln!(
                        "{} Nothing saved to {}: the analysis failed",
                        palette.paint(red, "✘"),
                        path.display()
                    );
                }
            }
        }
    }

    if !cli.quiet && !cli.json {
        let s = &output.stats;
        eprintln!(
            "   {}  {}  {}",
            palette.paint(dim, &format!("{} / {}", s.backend, s.model)),
            palette.paint(dim, &format!("{} chars extracted", s.extracted_chars)),
            palette.paint(dim, &format!("{}ms total", s.total_duration_ms)),
        );
    }

    Ok(if output.result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ANALYSIS_FAILED)
    })
}

fn spinner(name: &str, palette: Palette) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Analyzing");
    bar.set_message(format!("{}… Please wait…", palette.paint(cyan, name)));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn report_style(cli: &Cli) -> ReportStyle {
    if cli.markdown {
        ReportStyle::Markdown
    } else if Palette::detect(cli.no_color, io::stdout().is_terminal()).enabled {
        ReportStyle::Ansi
    } else {
        ReportStyle::Plain
    }
}

/// Map CLI args to `AnalyzerConfig`.
async fn build_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = AnalyzerConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
