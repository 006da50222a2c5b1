//! Per-image transcription: one file in, one [`ImageResult`] out.
//!
//! This stage never propagates failures. A broken file or a failed API
//! call produces an `ImageResult` carrying the error, and the run moves
//! on to the next image.

use crate::config::RunConfig;
use crate::output::ImageResult;
use crate::pipeline::encode;
use crate::prompts::DEFAULT_PROMPT;
use crate::transcriber::{TranscribeRequest, Transcriber};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error};

/// Transcribe a single image, folding any failure into the result.
pub async fn transcribe_image(
    transcriber: &dyn Transcriber,
    path: &Path,
    config: &RunConfig,
) -> ImageResult {
    let started = Instant::now();

    let outcome = async {
        let image = encode::load_image(path).await?;
        let request = TranscribeRequest {
            image,
            prompt: config
                .prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };
        transcriber.transcribe(&request).await
    }
    .await;

    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(transcription) => {
            debug!(
                path = %path.display(),
                chars = transcription.text.len(),
                input_tokens = transcription.input_tokens.unwrap_or(0),
                output_tokens = transcription.output_tokens.unwrap_or(0),
                "image transcribed"
            );
            ImageResult {
                path: path.to_path_buf(),
                markdown: transcription.text,
                input_tokens: transcription.input_tokens.unwrap_or(0),
                output_tokens: transcription.output_tokens.unwrap_or(0),
                duration_ms,
                error: None,
            }
        }
        Err(e) => {
            error!("Error transcribing {}: {}", path.display(), e);
            ImageResult {
                path: path.to_path_buf(),
                markdown: String::new(),
                input_tokens: 0,
                output_tokens: 0,
                duration_ms,
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscriptionError;
    use crate::transcriber::Transcription;
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::sync::Mutex;

    /// Decodes the payload back to UTF-8, so the file content IS the
    /// expected transcription.
    struct EchoTranscriber;

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        fn name(&self) -> &str {
            "echo"
        }

        async fn transcribe(
            &self,
            request: &TranscribeRequest,
        ) -> Result<Transcription, TranscriptionError> {
            let bytes = STANDARD.decode(&request.image.data).unwrap();
            Ok(Transcription::from_text(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        fn name(&self) -> &str {
            "failing"
        }

        async fn transcribe(
            &self,
            _request: &TranscribeRequest,
        ) -> Result<Transcription, TranscriptionError> {
            Err(TranscriptionError::RequestFailed {
                detail: "connection reset".to_string(),
            })
        }
    }

    struct RecordingTranscriber {
        seen: Mutex<Vec<TranscribeRequest>>,
    }

    #[async_trait]
    impl Transcriber for RecordingTranscriber {
        fn name(&self) -> &str {
            "recording"
        }

        async fn transcribe(
            &self,
            request: &TranscribeRequest,
        ) -> Result<Transcription, TranscriptionError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(Transcription::from_text("ok"))
        }
    }

    #[tokio::test]
    async fn success_keeps_text_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"Hello").await.unwrap();

        let result = transcribe_image(&EchoTranscriber, &path, &RunConfig::default()).await;
        assert!(result.error.is_none());
        assert_eq!(result.markdown, "Hello");
        assert_eq!(result.path, path);
    }

    #[tokio::test]
    async fn missing_file_becomes_a_result_error() {
        let path = Path::new("/nope/a.png");
        let result = transcribe_image(&EchoTranscriber, path, &RunConfig::default()).await;
        assert!(matches!(
            result.error,
            Some(TranscriptionError::ReadFailed { .. })
        ));
        assert!(result.markdown.is_empty());
    }

    #[tokio::test]
    async fn api_failure_becomes_a_result_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"x").await.unwrap();

        let result = transcribe_image(&FailingTranscriber, &path, &RunConfig::default()).await;
        assert!(matches!(
            result.error,
            Some(TranscriptionError::RequestFailed { .. })
        ));
    }

    #[tokio::test]
    async fn config_prompt_and_limits_flow_into_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"x").await.unwrap();

        let recorder = RecordingTranscriber {
            seen: Mutex::new(Vec::new()),
        };
        let config = RunConfig::builder()
            .prompt("Describe the chart.")
            .max_tokens(512)
            .temperature(0.1)
            .build()
            .unwrap();

        transcribe_image(&recorder, &path, &config).await;

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "Describe the chart.");
        assert_eq!(seen[0].max_tokens, 512);
        assert_eq!(seen[0].temperature, Some(0.1));
    }

    #[tokio::test]
    async fn default_prompt_is_used_when_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        tokio::fs::write(&path, b"x").await.unwrap();

        let recorder = RecordingTranscriber {
            seen: Mutex::new(Vec::new()),
        };
        transcribe_image(&recorder, &path, &RunConfig::default()).await;

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].prompt, DEFAULT_PROMPT);
    }
}
