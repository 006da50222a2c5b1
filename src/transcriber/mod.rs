//! The transcription capability: a trait plus the bundled OpenAI client.
//!
//! The remote model call sits behind [`Transcriber`] so the runner never
//! depends on a concrete HTTP client. Tests substitute deterministic
//! implementations and run entirely offline; production callers use
//! [`OpenAiTranscriber`] or bring their own.

pub mod openai;

pub use openai::OpenAiTranscriber;

use crate::error::TranscriptionError;
use crate::pipeline::encode::ImagePayload;
use async_trait::async_trait;

/// Model identifier used when [`crate::config::RunConfig::model`] is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// One transcription request: the encoded image plus the instruction.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// Base64 image payload with its MIME tag.
    pub image: ImagePayload,
    /// Text instruction for the model.
    pub prompt: String,
    /// Maximum tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature; None leaves the API default in place.
    pub temperature: Option<f32>,
}

/// The text a transcriber produced for one image.
#[derive(Debug, Clone)]
pub struct Transcription {
    /// Model output, verbatim.
    pub text: String,
    /// Prompt tokens consumed, when the API reports usage.
    pub input_tokens: Option<u32>,
    /// Completion tokens generated, when the API reports usage.
    pub output_tokens: Option<u32>,
}

impl Transcription {
    /// Wrap bare text with no usage accounting.
    ///
    /// Convenient for stub transcribers in tests.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            input_tokens: None,
            output_tokens: None,
        }
    }
}

/// Trait for image transcription capabilities.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the runner holds an `Arc<dyn Transcriber>` for dynamic dispatch).
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Capability name for logging (e.g. "openai").
    fn name(&self) -> &str;

    /// Transcribe one encoded image.
    ///
    /// Implementations return the model text verbatim; the runner decides
    /// what to do with empty results.
    async fn transcribe(
        &self,
        request: &TranscribeRequest,
    ) -> Result<Transcription, TranscriptionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_has_no_usage() {
        let t = Transcription::from_text("Hello");
        assert_eq!(t.text, "Hello");
        assert!(t.input_tokens.is_none());
        assert!(t.output_tokens.is_none());
    }
}
