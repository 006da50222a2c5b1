//! Configuration types for a transcription run.
//!
//! All run behaviour is controlled through [`RunConfig`], built via its
//! [`RunConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share configs across calls and to diff two runs to understand why their
//! outputs differ.
//!
//! The input directory and output file are deliberately *not* part of the
//! config: they are call-site arguments to [`crate::run()`] and
//! [`crate::run_to_file`], so one config can drive many directories.

use crate::error::Img2MdError;
use crate::progress::ProgressCallback;
use crate::transcriber::Transcriber;
use std::fmt;
use std::sync::Arc;

/// Configuration for an image-directory transcription run.
///
/// Built via [`RunConfig::builder()`] or using [`RunConfig::default()`].
///
/// # Example
/// ```rust
/// use img2md::RunConfig;
///
/// let config = RunConfig::builder()
///     .model("gpt-4o")
///     .max_tokens(2048)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Model identifier sent to the transcription API, e.g. "gpt-4o".
    /// If None, [`crate::transcriber::DEFAULT_MODEL`] is used.
    pub model: Option<String>,

    /// Maximum tokens the model may generate per image. Default: 4096.
    ///
    /// Dense pages (tables, code listings, full book pages) can exceed
    /// 2000 output tokens. Setting this too low silently truncates the
    /// transcription mid-sentence; 4096 covers typical scanned pages while
    /// keeping per-image cost predictable.
    pub max_tokens: u32,

    /// Sampling temperature. Default: None (the API's own default applies).
    ///
    /// Leave unset for faithful transcription; set a low value (0.0–0.3)
    /// only if the provider's default proves too creative for your scans.
    pub temperature: Option<f32>,

    /// Custom instruction prompt. If None, uses the built-in default
    /// ([`crate::prompts::DEFAULT_PROMPT`]).
    pub prompt: Option<String>,

    /// Pre-constructed transcription capability. If None, an
    /// [`crate::transcriber::OpenAiTranscriber`] is built from the
    /// environment when the run starts.
    pub transcriber: Option<Arc<dyn Transcriber>>,

    /// Progress callback receiving per-image events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 4096,
            temperature: None,
            prompt: None,
            transcriber: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("prompt", &self.prompt.as_ref().map(|_| "<custom>"))
            .field(
                "transcriber",
                &self.transcriber.as_ref().map(|_| "<dyn Transcriber>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.config.transcriber = Some(transcriber);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, Img2MdError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(Img2MdError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if let Some(ref m) = c.model {
            if m.trim().is_empty() {
                return Err(Img2MdError::InvalidConfig(
                    "model must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunConfig::default();
        assert_eq!(config.max_tokens, 4096);
        assert!(config.model.is_none());
        assert!(config.temperature.is_none());
        assert!(config.prompt.is_none());
        assert!(config.transcriber.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let config = RunConfig::builder()
            .model("gpt-4o")
            .max_tokens(1024)
            .temperature(0.2)
            .build()
            .expect("valid config");
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, Some(0.2));
    }

    #[test]
    fn temperature_is_clamped() {
        let config = RunConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, Some(2.0));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let err = RunConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, Img2MdError::InvalidConfig(_)));
    }

    #[test]
    fn empty_model_rejected() {
        let err = RunConfig::builder().model("  ").build().unwrap_err();
        assert!(matches!(err, Img2MdError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_trait_objects() {
        let config = RunConfig::default();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("RunConfig"));
        assert!(!dbg.contains("panic"));
    }
}
