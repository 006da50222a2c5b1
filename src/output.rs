//! Output types for a transcription run.
//!
//! [`RunOutput`] is what [`crate::run()`] returns: the assembled Markdown
//! document plus the raw per-image results and aggregate counters. All types
//! here are `serde`-serializable so the CLI can emit them as a JSON report.

use crate::error::TranscriptionError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

/// The result of transcribing a single image.
///
/// Always produced, even on failure: `error` is `Some` and `markdown` is
/// empty when the image could not be transcribed. Failed or empty results
/// simply contribute no block to the assembled document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    /// Full path of the image file.
    pub path: PathBuf,

    /// Transcribed Markdown text, verbatim from the model.
    pub markdown: String,

    /// Input tokens consumed, when the API reports usage.
    pub input_tokens: u32,

    /// Output tokens generated, when the API reports usage.
    pub output_tokens: u32,

    /// Wall-clock time spent on this image in milliseconds.
    pub duration_ms: u64,

    /// The failure, if this image could not be transcribed.
    pub error: Option<TranscriptionError>,
}

impl ImageResult {
    /// Base file name used for this image's Markdown header.
    ///
    /// Falls back to the full path in the degenerate case of a path with no
    /// final component.
    pub fn file_name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }

    /// True when this image contributes a block to the output document.
    pub fn is_included(&self) -> bool {
        self.error.is_none() && !self.markdown.is_empty()
    }
}

/// Aggregate counters for a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Recognized images found in the input directory.
    pub images_found: usize,

    /// Images whose transcription call succeeded.
    pub images_transcribed: usize,

    /// Images skipped after a per-image failure.
    pub images_failed: usize,

    /// Total input tokens across all successful calls.
    pub total_input_tokens: u64,

    /// Total output tokens across all successful calls.
    pub total_output_tokens: u64,

    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// The assembled Markdown document.
    pub markdown: String,

    /// Per-image results in enumeration order, failures included.
    pub images: Vec<ImageResult>,

    /// Aggregate counters.
    pub stats: RunStats,
}
