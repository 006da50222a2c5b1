//! Run orchestration: enumerate, transcribe one at a time, assemble.
//!
//! This is the module behind the crate's top-level entry points. The
//! pipeline stages in [`crate::pipeline`] do the per-image work; this
//! module owns the loop, the progress events, and the final document.

use crate::config::RunConfig;
use crate::error::Img2MdError;
use crate::output::{ImageResult, RunOutput, RunStats};
use crate::pipeline::{discover, transcribe};
use crate::transcriber::{OpenAiTranscriber, Transcriber};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Transcribe every image in `dir` and return the assembled document.
///
/// Images are processed strictly one at a time, in lexicographic path
/// order; the next request is not sent until the previous one resolved.
/// Per-image failures are recorded in the returned [`RunOutput`] and
/// skipped. The only `Err` cases are run-level: the directory cannot be
/// listed, or no transcriber is configured and none can be built from the
/// environment.
pub async fn run(dir: impl AsRef<Path>, config: &RunConfig) -> Result<RunOutput, Img2MdError> {
    let dir = dir.as_ref();
    let started = Instant::now();

    let paths = discover::list_images(dir)?;
    let transcriber = resolve_transcriber(config)?;
    let total = paths.len();

    info!(
        dir = %dir.display(),
        images = total,
        transcriber = transcriber.name(),
        "starting transcription run"
    );

    if let Some(cb) = &config.progress_callback {
        cb.on_run_start(total);
    }

    let mut results = Vec::with_capacity(total);
    for (i, path) in paths.iter().enumerate() {
        let image_num = i + 1;
        info!("Processing {}", path.display());
        if let Some(cb) = &config.progress_callback {
            let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
            cb.on_image_start(image_num, total, &name);
        }

        let result = transcribe::transcribe_image(transcriber.as_ref(), path, config).await;

        if let Some(cb) = &config.progress_callback {
            match &result.error {
                None => cb.on_image_complete(image_num, total, result.markdown.len()),
                Some(e) => cb.on_image_error(image_num, total, &e.to_string()),
            }
        }
        results.push(result);
    }

    let markdown = assemble_document(&results);
    let stats = collect_stats(&results, total, started.elapsed().as_millis() as u64);

    if let Some(cb) = &config.progress_callback {
        cb.on_run_complete(total, stats.images_transcribed);
    }

    info!(
        transcribed = stats.images_transcribed,
        failed = stats.images_failed,
        duration_ms = stats.total_duration_ms,
        "run finished"
    );

    Ok(RunOutput {
        markdown,
        images: results,
        stats,
    })
}

/// Transcribe `dir` and write the document to `output_path`.
///
/// The file is written exactly once, after every image has been processed,
/// and replaces any existing file at that path. A run in which nothing was
/// usable still writes the (empty) file. The parent directory must already
/// exist.
pub async fn run_to_file(
    dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunStats, Img2MdError> {
    let output_path = output_path.as_ref();
    let output = run(dir, config).await?;

    tokio::fs::write(output_path, output.markdown.as_bytes())
        .await
        .map_err(|source| Img2MdError::OutputWriteFailed {
            path: output_path.to_path_buf(),
            source,
        })?;

    info!(
        "Transcription complete. Results written to {}",
        output_path.display()
    );
    Ok(output.stats)
}

/// Blocking wrapper around [`run`] for callers without an async runtime.
///
/// Spawns a throwaway tokio runtime for the duration of the call. Do not
/// call from inside an existing runtime; use [`run`] there.
pub fn run_sync(dir: impl AsRef<Path>, config: &RunConfig) -> Result<RunOutput, Img2MdError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Img2MdError::Internal(format!("failed to start tokio runtime: {e}")))?;
    runtime.block_on(run(dir, config))
}

/// Use the configured transcriber, or build the default OpenAI one from
/// the environment.
pub(crate) fn resolve_transcriber(
    config: &RunConfig,
) -> Result<Arc<dyn Transcriber>, Img2MdError> {
    if let Some(transcriber) = &config.transcriber {
        return Ok(Arc::clone(transcriber));
    }
    let openai = OpenAiTranscriber::from_env(config.model.as_deref())?;
    debug!(model = openai.model(), "built transcriber from environment");
    Ok(Arc::new(openai))
}

/// Concatenate successful, non-empty transcriptions into one document.
///
/// Each block is `## {file name}`, a blank line, the verbatim text, a
/// blank line, and a `---` rule followed by a blank line. Failed and
/// empty results contribute nothing, separators included, so the document
/// never carries dangling rules.
pub(crate) fn assemble_document(results: &[ImageResult]) -> String {
    let mut doc = String::new();
    for result in results {
        if !result.is_included() {
            if result.error.is_none() {
                debug!(path = %result.path.display(), "empty transcription, skipping");
            }
            continue;
        }
        doc.push_str("## ");
        doc.push_str(&result.file_name());
        doc.push_str("\n\n");
        doc.push_str(&result.markdown);
        doc.push_str("\n\n---\n\n");
    }
    doc
}

fn collect_stats(results: &[ImageResult], images_found: usize, total_duration_ms: u64) -> RunStats {
    let mut stats = RunStats {
        images_found,
        images_transcribed: 0,
        images_failed: 0,
        total_input_tokens: 0,
        total_output_tokens: 0,
        total_duration_ms,
    };
    for result in results {
        if result.error.is_some() {
            stats.images_failed += 1;
        } else {
            stats.images_transcribed += 1;
        }
        stats.total_input_tokens += u64::from(result.input_tokens);
        stats.total_output_tokens += u64::from(result.output_tokens);
    }
    stats
}
