//! The instruction prompt sent with every image.
//!
//! Centralising the prompt here serves two purposes:
//!
//! 1. **Single source of truth**: changing how images are transcribed
//!    (e.g. tightening the LaTeX rule) requires editing exactly one place.
//!
//! 2. **Testability**: unit tests can inspect the prompt directly without
//!    calling a real model, so prompt regressions are easy to catch.
//!
//! Callers can override the default via [`crate::config::RunConfig::prompt`];
//! the constant here is used only when no override is provided.

/// Default instruction for transcribing an image to Markdown.
///
/// Used when `RunConfig::prompt` is `None`. The same instruction is sent for
/// every image in a run; only the image payload varies.
pub const DEFAULT_PROMPT: &str = r#"Carefully transcribe this image.
Follow these guidelines:
- For mathematical formulas, use LaTeX notation enclosed in $ for inline or $$ for block formulas
- For code snippets, use markdown code blocks with appropriate language specifiers
- Preserve original formatting and structure
- Be precise and detailed"#;
