//! OpenAI transcriber using the Chat Completions API.
//!
//! Sends the instruction and the image (as a base64 data URL) in a single
//! user message. Works against any OpenAI-compatible endpoint via
//! [`OpenAiTranscriber::with_endpoint`].

use super::{TranscribeRequest, Transcriber, Transcription, DEFAULT_MODEL};
use crate::error::{Img2MdError, TranscriptionError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Environment variable read by [`OpenAiTranscriber::from_env`].
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transcriber backed by the OpenAI Chat Completions API.
///
/// The API key is an explicit constructor argument; nothing is read from
/// ambient process state unless [`Self::from_env`] is used.
pub struct OpenAiTranscriber {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiTranscriber {
    /// Create a transcriber with the given key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `OPENAI_API_KEY` environment variable.
    ///
    /// `model` overrides [`DEFAULT_MODEL`] when set. Fails with
    /// [`Img2MdError::TranscriberNotConfigured`] if the variable is missing
    /// or empty.
    pub fn from_env(model: Option<&str>) -> Result<Self, Img2MdError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Img2MdError::TranscriberNotConfigured {
                hint: format!(
                    "set {API_KEY_ENV} or pass a transcriber via RunConfig::builder().transcriber(..)"
                ),
            })?;
        Ok(Self::new(api_key, model.unwrap_or(DEFAULT_MODEL)))
    }

    /// Point at an OpenAI-compatible endpoint (e.g. a local gateway).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-request timeout (default 60s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model this transcriber sends requests for.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(
        &self,
        request: &TranscribeRequest,
    ) -> Result<Transcription, TranscriptionError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %self.model,
            mime = %request.image.mime_type,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TranscriptionError::ApiError {
                status: status.as_u16(),
                detail,
            });
        }

        let chat: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| TranscriptionError::MalformedResponse {
                    detail: e.to_string(),
                })?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TranscriptionError::MalformedResponse {
                detail: "response contained no message content".to_string(),
            })?;

        Ok(Transcription {
            text,
            input_tokens: chat.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: chat.usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatContent {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::ImagePayload;

    fn sample_request() -> TranscribeRequest {
        TranscribeRequest {
            image: ImagePayload::from_bytes(
                vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
                Some("png"),
            ),
            prompt: "Transcribe this.".to_string(),
            max_tokens: 4096,
            temperature: None,
        }
    }

    #[test]
    fn request_body_shape() {
        let request = sample_request();
        let body = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: request.prompt.clone(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_url(),
                        },
                    },
                ],
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        let url = json["messages"][0]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn temperature_omitted_when_unset() {
        let body = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![],
            max_tokens: 16,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());

        let body = ChatRequest {
            temperature: Some(0.2),
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        // f32 widens to f64 in the Value, so compare with a tolerance.
        let temperature = json["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn response_parses_text_and_usage() {
        let raw = r#"{
            "id": "chatcmpl-123",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello"));
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 5);
    }

    #[test]
    fn response_without_usage_still_parses() {
        let raw = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn null_content_maps_to_none() {
        let raw = r#"{"choices": [{"message": {"content": null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn builder_style_overrides() {
        let t = OpenAiTranscriber::new("sk-test", "gpt-4o")
            .with_endpoint("http://localhost:8080/v1/chat/completions")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(t.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(t.timeout, Duration::from_secs(5));
        assert_eq!(t.model(), "gpt-4o");
        assert_eq!(t.name(), "openai");
    }
}
