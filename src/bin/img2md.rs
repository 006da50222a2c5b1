//! CLI binary for img2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RunConfig` and reports progress and results.

use anyhow::{Context, Result};
use clap::Parser;
use img2md::{
    run, run_to_file, OpenAiTranscriber, ProgressCallback, RunConfig, RunProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-image log
/// lines using [indicatif]. Images arrive strictly in order, so the log reads
/// top to bottom in the same order as the output document.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-image start time and file name for the completion line.
    in_flight: Mutex<HashMap<usize, (Instant, String)>>,
    /// Count of images that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_run_start` (called once the directory has been listed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing images…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            in_flight: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Transcribing");
        self.bar.reset_eta();
    }

    fn take_in_flight(&self, image_num: usize) -> (u128, String) {
        self.in_flight
            .lock()
            .unwrap()
            .remove(&image_num)
            .map(|(t, name)| (t.elapsed().as_millis(), name))
            .unwrap_or((0, String::new()))
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_images: usize) {
        // Switch from spinner-only style to full progress bar now that we
        // know how many images the directory holds.
        self.activate_bar(total_images);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Transcribing {total_images} images…"))
        ));
    }

    fn on_image_start(&self, image_num: usize, _total_images: usize, file_name: &str) {
        self.in_flight
            .lock()
            .unwrap()
            .insert(image_num, (Instant::now(), file_name.to_string()));
        self.bar.set_message(file_name.to_string());
    }

    fn on_image_complete(&self, image_num: usize, total_images: usize, markdown_len: usize) {
        let (elapsed_ms, name) = self.take_in_flight(image_num);

        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<28}  {:<8}  {}",
            green("✓"),
            image_num,
            total_images,
            name,
            dim(&format!("{markdown_len:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, image_num: usize, total_images: usize, error: &str) {
        let (elapsed_ms, name) = self.take_in_flight(image_num);

        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3} {:<28}  {}  {}",
            red("✗"),
            image_num,
            total_images,
            name,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _total_images: usize, _transcribed: usize) {
        // The per-image log already told the whole story; just clear the bar
        // so the final summary from main() prints on a clean line.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe ./images into ./transcriptions.md
  img2md

  # Explicit directory and output file
  img2md ./scans -o book.md

  # Cheaper model, shorter answers
  img2md --model gpt-4o-mini --max-tokens 1024 ./scans

  # Custom instruction prompt
  img2md --prompt-file prompt.txt ./scans

  # Full machine-readable report on stdout
  img2md --json ./scans > report.json

  # Against a local OpenAI-compatible gateway
  img2md --endpoint http://localhost:11434/v1/chat/completions --model llava ./scans

SUPPORTED MODELS:
  Model                  Input $/1M  Output $/1M  Vision
  ─────────────────────  ──────────  ───────────  ──────
  gpt-4o (default)       $2.50       $10.00       ✓
  gpt-4o-mini            $0.15       $0.60        ✓
  gpt-4.1                $2.00       $8.00        ✓
  any OpenAI-compatible vision model via --endpoint (Ollama, vLLM, LiteLLM)

COST ESTIMATE (100 scanned pages):
  ~1,100 input tokens/image + ~600 output tokens/image

  gpt-4o-mini:  ~$0.05 total
  gpt-4o:       ~$0.88 total

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY     OpenAI API key (required unless your gateway ignores it)
  IMG2MD_OUTPUT      Default for -o/--output
  IMG2MD_MODEL       Default for --model
  IMG2MD_ENDPOINT    Default for --endpoint
  IMG2MD_MAX_TOKENS  Default for --max-tokens

SETUP:
  1. Set API key:   export OPENAI_API_KEY=sk-...
  2. Transcribe:    img2md ./scans -o book.md

Recognized image extensions: .png .jpg .jpeg .tiff .bmp .gif
Only the top level of the directory is scanned; files are processed in
alphabetical order and failures are skipped, never retried.
"#;

/// Transcribe a directory of images to Markdown using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "img2md",
    version,
    about = "Transcribe a directory of images to a single Markdown file using Vision LLMs",
    long_about = "Transcribe every image in a directory (scans, screenshots, photographed pages) \
to one concatenated Markdown document using a Vision Language Model. Each image becomes a \
'## file-name' block; math comes out as LaTeX, code as fenced blocks.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images to transcribe.
    #[arg(default_value = "./images")]
    image_dir: PathBuf,

    /// Write the assembled Markdown document to this file.
    #[arg(short, long, env = "IMG2MD_OUTPUT", default_value = "./transcriptions.md")]
    output: PathBuf,

    /// Vision model ID (e.g. gpt-4o, gpt-4o-mini).
    #[arg(
        long,
        env = "IMG2MD_MODEL",
        long_help = "Vision LLM model to use. Default: gpt-4o ($2.50/$10.00 per 1M tokens).\n\
          Popular choices: gpt-4o-mini ($0.15/$0.60), gpt-4.1 ($2/$8)."
    )]
    model: Option<String>,

    /// OpenAI-compatible chat completions URL.
    #[arg(
        long,
        env = "IMG2MD_ENDPOINT",
        long_help = "OpenAI-compatible chat completions endpoint.\n\
          Default: https://api.openai.com/v1/chat/completions.\n\
          Point at Ollama, vLLM, or LiteLLM to use local or proxied models."
    )]
    endpoint: Option<String>,

    /// Max LLM output tokens per image.
    #[arg(long, env = "IMG2MD_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: u32,

    /// LLM temperature (0.0-2.0). Unset: the API's own default applies.
    #[arg(long, env = "IMG2MD_TEMPERATURE")]
    temperature: Option<f32>,

    /// Path to a text file containing a custom instruction prompt.
    #[arg(long, env = "IMG2MD_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Per-image API call timeout in seconds.
    #[arg(long, env = "IMG2MD_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print the full run result as JSON to stdout instead of writing Markdown.
    #[arg(long, env = "IMG2MD_JSON", conflicts_with = "output")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "IMG2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IMG2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IMG2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user. Without
    // the bar, the library's own "Processing <path>" lines take over.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    // In verbose mode we always want all logs regardless of progress.
    let filter = if cli.verbose { "debug" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn RunProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run ──────────────────────────────────────────────────────────────
    if cli.json {
        let output = run(&cli.image_dir, &config)
            .await
            .context("Transcription run failed")?;
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    let stats = run_to_file(&cli.image_dir, &cli.output, &config)
        .await
        .context("Transcription run failed")?;

    // Summary line (the callback already printed the per-image log).
    if !cli.quiet {
        eprintln!(
            "{}  {}ms  →  {}",
            if stats.images_failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&stats.total_input_tokens.to_string()),
            dim(&stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `RunConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RunConfig> {
    let prompt = match cli.prompt_file {
        Some(ref path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt from {:?}", path))?,
        ),
        None => None,
    };

    let mut transcriber = OpenAiTranscriber::from_env(cli.model.as_deref())
        .context("No transcriber available")?
        .with_timeout(Duration::from_secs(cli.api_timeout));
    if let Some(ref endpoint) = cli.endpoint {
        transcriber = transcriber.with_endpoint(endpoint);
    }

    let mut builder = RunConfig::builder()
        .max_tokens(cli.max_tokens)
        .transcriber(Arc::new(transcriber));

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(p) = prompt {
        builder = builder.prompt(p);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
