//! Streaming transcription API: emit images as they complete.
//!
//! ## Why stream?
//!
//! A directory of scans takes minutes. A streams-based API lets callers
//! display partial results immediately or write blocks to disk
//! incrementally instead of waiting for the whole run to finish.
//!
//! Unlike the eager [`crate::run()`] which returns only after all images
//! finish, [`run_stream`] yields one item per image as each call resolves.
//! Items arrive in enumeration order: processing stays strictly
//! sequential, the stream only changes *when* results become visible.

use crate::config::RunConfig;
use crate::error::{Img2MdError, TranscriptionError};
use crate::output::ImageResult;
use crate::pipeline::{discover, transcribe};
use crate::run::resolve_transcriber;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-image results.
pub type ImageResultStream =
    Pin<Box<dyn Stream<Item = Result<ImageResult, TranscriptionError>> + Send>>;

/// Transcribe a directory, streaming each image's result as it is ready.
///
/// Per-image failures are `Err` items; the stream continues with the next
/// image. No progress callbacks fire in streaming mode, the caller already
/// sees every event by consuming the stream.
///
/// # Returns
/// - `Ok(ImageResultStream)`: a stream of `Result<ImageResult, TranscriptionError>`
/// - `Err(Img2MdError)`: fatal error (directory missing, no transcriber)
///
/// # Example
/// ```rust,no_run
/// use img2md::{run_stream, RunConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RunConfig::default();
/// let mut stream = run_stream("./images", &config).await?;
/// while let Some(image) = stream.next().await {
///     match image {
///         Ok(r) => println!("{}: {} chars", r.file_name(), r.markdown.len()),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_stream(
    dir: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<ImageResultStream, Img2MdError> {
    let dir = dir.as_ref();

    let paths = discover::list_images(dir)?;
    let transcriber = resolve_transcriber(config)?;
    info!(
        dir = %dir.display(),
        images = paths.len(),
        "starting streaming transcription"
    );

    let config = config.clone();
    let s = stream::iter(paths.into_iter()).then(move |path| {
        let transcriber = Arc::clone(&transcriber);
        let config = config.clone();
        async move {
            info!("Processing {}", path.display());
            let mut result =
                transcribe::transcribe_image(transcriber.as_ref(), &path, &config).await;
            match result.error.take() {
                None => Ok(result),
                Some(err) => Err(err),
            }
        }
    });

    Ok(Box::pin(s))
}
