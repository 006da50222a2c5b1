//! Image encoding: raw file bytes → MIME-tagged base64 payload.
//!
//! VLM APIs (OpenAI, Anthropic, Gemini) accept images as base64 data-URIs
//! embedded in the JSON request body. Files are sent verbatim, so the only
//! work here is base64 and working out the right MIME tag.

use crate::error::TranscriptionError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// MIME tag when neither the magic bytes nor the extension identify a
/// format. The API will reject it, which surfaces as a per-image error.
const FALLBACK_MIME: &str = "application/octet-stream";

/// A base64-encoded image ready for the transcriber.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Base64-encoded image bytes (standard alphabet, padded).
    pub data: String,
    /// MIME type for the data URL, e.g. `image/png`.
    pub mime_type: String,
}

impl ImagePayload {
    /// Encode raw bytes, tagging them with a MIME type.
    ///
    /// The type is sniffed from the magic bytes first; the file extension
    /// is a fallback for formats the sniffer does not know. Sniffing wins
    /// when the two disagree (a PNG named `scan.jpg` is sent as
    /// `image/png`).
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Self {
        let mime_type = detect_mime(&bytes, extension);
        Self {
            data: STANDARD.encode(&bytes),
            mime_type: mime_type.to_string(),
        }
    }

    /// Render as a `data:` URL for an OpenAI-style `image_url` block.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn detect_mime(bytes: &[u8], extension: Option<&str>) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    extension
        .and_then(image::ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME)
}

/// Read `path` and encode it for the transcriber.
///
/// Read failures are per-image errors; the caller decides whether the run
/// continues with the remaining images.
pub async fn load_image(path: &Path) -> Result<ImagePayload, TranscriptionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| TranscriptionError::ReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let extension = path.extension().and_then(|ext| ext.to_str());
    let payload = ImagePayload::from_bytes(bytes, extension);
    debug!(
        path = %path.display(),
        mime = %payload.mime_type,
        b64_len = payload.data.len(),
        "encoded image"
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];

    #[test]
    fn sniffs_png_from_magic_bytes() {
        let payload = ImagePayload::from_bytes(PNG_MAGIC.to_vec(), None);
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn sniffing_wins_over_a_lying_extension() {
        let payload = ImagePayload::from_bytes(PNG_MAGIC.to_vec(), Some("jpg"));
        assert_eq!(payload.mime_type, "image/png");
    }

    #[test]
    fn falls_back_to_the_extension() {
        let payload = ImagePayload::from_bytes(b"not an image".to_vec(), Some("jpg"));
        assert_eq!(payload.mime_type, "image/jpeg");
        let payload = ImagePayload::from_bytes(b"not an image".to_vec(), Some("TIFF"));
        assert_eq!(payload.mime_type, "image/tiff");
    }

    #[test]
    fn unidentifiable_bytes_get_the_fallback_tag() {
        let payload = ImagePayload::from_bytes(b"???".to_vec(), None);
        assert_eq!(payload.mime_type, FALLBACK_MIME);
    }

    #[test]
    fn data_url_shape() {
        let payload = ImagePayload::from_bytes(JPEG_MAGIC.to_vec(), None);
        let url = payload.data_url();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        let b64 = url.rsplit(',').next().unwrap();
        assert_eq!(STANDARD.decode(b64).unwrap(), JPEG_MAGIC);
    }

    #[tokio::test]
    async fn loads_and_encodes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        tokio::fs::write(&path, PNG_MAGIC).await.unwrap();

        let payload = load_image(&path).await.unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&payload.data).unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn missing_file_is_a_read_failure() {
        let err = load_image(Path::new("/nope/pixel.png")).await.unwrap_err();
        match err {
            TranscriptionError::ReadFailed { path, .. } => {
                assert!(path.ends_with("pixel.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn directory_named_like_an_image_fails_at_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folder.png");
        tokio::fs::create_dir(&path).await.unwrap();

        let err = load_image(&path).await.unwrap_err();
        assert!(matches!(err, TranscriptionError::ReadFailed { .. }));
    }
}
