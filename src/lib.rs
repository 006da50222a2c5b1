//! # img2md
//!
//! Transcribe a directory of images to a single Markdown document using
//! Vision Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! Traditional OCR (tesseract, cloud OCR APIs) flattens scanned pages into
//! raw text: formulas, code listings, and tables come out garbled or out of
//! reading order. Instead this crate sends each image to a VLM that reads it
//! as a human would, producing Markdown that keeps structure, LaTeX math,
//! and fenced code intact. Point it at a directory of scans and get back one
//! concatenated, per-image-labelled document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! images/
//!  │
//!  ├─ 1. Discover  list *.png *.jpg *.jpeg *.tiff *.bmp *.gif, sorted
//!  ├─ 2. Encode    file bytes → MIME-tagged base64 data URL
//!  ├─ 3. VLM       one call per image, strictly in sequence (gpt-4o default)
//!  └─ 4. Output    assembled Markdown document + per-image stats
//! ```
//!
//! Failed images are logged and skipped; one bad scan never aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use img2md::{run_to_file, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Transcriber built from OPENAI_API_KEY unless one is supplied
//!     let config = RunConfig::default();
//!     let stats = run_to_file("./images", "./transcriptions.md", &config).await?;
//!     eprintln!("tokens: {} in / {} out",
//!         stats.total_input_tokens,
//!         stats.total_output_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `img2md` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! img2md = { version = "0.1", default-features = false }
//! ```
//!
//! ## Choosing a Model
//!
//! | Model | $/1M tokens | Quality | Best for |
//! |-------|------------|---------|----------|
//! | `gpt-4o`      | $2.50/$10.00 | ★★★★ | Default, strong on dense pages |
//! | `gpt-4o-mini` | $0.15/$0.60  | ★★★  | Cheap bulk transcription |
//! | `gpt-4.1`     | $2.00/$8.00  | ★★★★★ | Highest accuracy |
//!
//! Any OpenAI-compatible vision model works via
//! [`OpenAiTranscriber::with_endpoint`]; any other backend can be plugged in
//! by implementing [`Transcriber`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;
pub mod stream;
pub mod transcriber;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RunConfig, RunConfigBuilder};
pub use error::{Img2MdError, TranscriptionError};
pub use output::{ImageResult, RunOutput, RunStats};
pub use pipeline::discover::RECOGNIZED_EXTENSIONS;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use run::{run, run_sync, run_to_file};
pub use stream::{run_stream, ImageResultStream};
pub use transcriber::{
    OpenAiTranscriber, TranscribeRequest, Transcriber, Transcription, DEFAULT_MODEL,
};
