//! Pipeline stages for image-to-Markdown transcription.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch transcription backend) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ encode ──▶ transcribe
//! (list dir)   (base64)   (VLM call)
//! ```
//!
//! 1. [`discover`]: list eligible image files in the input directory
//! 2. [`encode`]: read one file and wrap it as a MIME-tagged base64 payload
//! 3. [`transcribe`]: send one payload to the transcriber, fold the outcome
//!    into an [`crate::output::ImageResult`]
//!
//! The top-level [`crate::run()`] drives these stages strictly in
//! sequence, one image at a time.

pub mod discover;
pub mod encode;
pub mod transcribe;
