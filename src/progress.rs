//! Progress-callback trait for per-image run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::RunConfigBuilder::progress_callback`] to receive
//! real-time events as the runner works through the directory.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a channel, a WebSocket, a database record, or a terminal
//! progress bar, without the library knowing anything about how the host
//! application communicates.
//!
//! # Example
//!
//! ```rust
//! use img2md::{RunProgressCallback, RunConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_image_complete(&self, image_num: usize, total_images: usize, markdown_len: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done} done: image {image_num}/{total_images} ({markdown_len} bytes)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: AtomicUsize::new(0),
//! });
//!
//! let config = RunConfig::builder()
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the runner as it processes each image.
///
/// Implementations must be `Send + Sync`. Images are processed strictly one
/// at a time, so events for image N+1 never arrive before image N's
/// completion event; implementations still should not rely on being called
/// from any particular thread. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after the directory has been enumerated.
    ///
    /// # Arguments
    /// * `total_images`: number of recognized images that will be processed
    fn on_run_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called just before an image's transcription request is sent.
    ///
    /// # Arguments
    /// * `image_num`: 1-indexed position in enumeration order
    /// * `total_images`: total recognized images
    /// * `file_name`: base name of the image file
    fn on_image_start(&self, image_num: usize, total_images: usize, file_name: &str) {
        let _ = (image_num, total_images, file_name);
    }

    /// Called when an image is successfully transcribed.
    ///
    /// # Arguments
    /// * `image_num`: 1-indexed position in enumeration order
    /// * `total_images`: total recognized images
    /// * `markdown_len`: byte length of the transcription text
    fn on_image_complete(&self, image_num: usize, total_images: usize, markdown_len: usize) {
        let _ = (image_num, total_images, markdown_len);
    }

    /// Called when an image fails and is skipped.
    ///
    /// # Arguments
    /// * `image_num`: 1-indexed position in enumeration order
    /// * `total_images`: total recognized images
    /// * `error`: human-readable error description
    fn on_image_error(&self, image_num: usize, total_images: usize, error: &str) {
        let _ = (image_num, total_images, error);
    }

    /// Called once after every image has been attempted.
    ///
    /// # Arguments
    /// * `total_images`: total recognized images
    /// * `transcribed`: images whose transcription call succeeded
    fn on_run_complete(&self, total_images: usize, transcribed: usize) {
        let _ = (total_images, transcribed);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;
