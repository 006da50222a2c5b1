//! Error types for the img2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Img2MdError`], fatal: the run cannot proceed at all (input
//!   directory missing, output file unwritable, no transcriber configured).
//!   Returned as `Err(Img2MdError)` from the top-level `run*` functions.
//!
//! * [`TranscriptionError`], non-fatal: a single image failed (read
//!   error, network error, bad API response) but the rest of the directory
//!   is fine. Stored inside [`crate::output::ImageResult`]; the failing
//!   image is logged, omitted from the document, and the run continues.
//!
//! There is deliberately no third tier: per-image failures are never retried
//! and never escalate into a run failure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the img2md library.
///
/// Image-level failures use [`TranscriptionError`] and are stored in
/// [`crate::output::ImageResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Img2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Image directory not found: '{path}'\nCheck the path exists and is readable.")]
    DirNotFound { path: PathBuf },

    /// Process does not have read permission on the directory.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input path exists but is not a directory.
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Listing the directory failed for a reason other than the above.
    #[error("Failed to list image directory '{path}': {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transcriber errors ────────────────────────────────────────────────
    /// No transcriber was supplied and none could be built from the environment.
    #[error("No transcriber is configured.\n{hint}")]
    TranscriberNotConfigured { hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image.
///
/// Stored alongside [`crate::output::ImageResult`] when an image fails.
/// The run continues with the next image regardless.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum TranscriptionError {
    /// Reading the image file from disk failed.
    #[error("Failed to read '{path}': {detail}")]
    ReadFailed { path: PathBuf, detail: String },

    /// The HTTP request never produced a response (connect, TLS, timeout).
    #[error("Transcription request failed: {detail}")]
    RequestFailed { detail: String },

    /// The API answered with a non-success status code.
    #[error("Transcription API returned HTTP {status}: {detail}")]
    ApiError { status: u16, detail: String },

    /// The API answered 2xx but the body was not the expected shape.
    #[error("Malformed transcription response: {detail}")]
    MalformedResponse { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_not_found_display() {
        let e = Img2MdError::DirNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/no/such/dir"), "got: {msg}");
    }

    #[test]
    fn transcriber_not_configured_display() {
        let e = Img2MdError::TranscriberNotConfigured {
            hint: "Set OPENAI_API_KEY.".into(),
        };
        assert!(e.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn api_error_display() {
        let e = TranscriptionError::ApiError {
            status: 429,
            detail: "rate limited".into(),
        };
        assert!(e.to_string().contains("429"));
        assert!(e.to_string().contains("rate limited"));
    }

    #[test]
    fn read_failed_display_names_path() {
        let e = TranscriptionError::ReadFailed {
            path: PathBuf::from("images/a.jpg"),
            detail: "is a directory".into(),
        };
        assert!(e.to_string().contains("a.jpg"));
    }

    #[test]
    fn transcription_error_round_trips_as_json() {
        let e = TranscriptionError::MalformedResponse {
            detail: "empty choices array".into(),
        };
        let json = serde_json::to_string(&e).expect("serialize");
        let back: TranscriptionError = serde_json::from_str(&json).expect("deserialize");
        assert!(back.to_string().contains("empty choices"));
    }
}
