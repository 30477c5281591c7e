//! Inline image payloads: `data:` URIs, base64 and format sniffing.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CoreError;

/// Largest image accepted from a client or a provider (20 MiB).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// MIME type assumed when a source does not declare one.
pub const DEFAULT_SOURCE_MIME: &str = "image/jpeg";

/// MIME type assumed for model output without a declared type.
pub const DEFAULT_GENERATED_MIME: &str = "image/png";

/// Image bytes with their declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Whether `s` looks like a `data:` URI.
pub fn is_data_uri(s: &str) -> bool {
    s.trim_start().starts_with("data:")
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Decode a base64 payload as returned by the generative model.
    pub fn from_base64(mime_type: &str, data: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| CoreError::Validation(format!("Invalid base64 image data: {e}")))?;
        check_size(bytes.len())?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> Result<Self, CoreError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::Validation("Image must be a data: URI".to_string()))?;
        let (meta, payload) = rest.split_once(',').ok_or_else(|| {
            CoreError::Validation("Invalid image data format: missing payload".to_string())
        })?;
        let mime_type = meta.strip_suffix(";base64").ok_or_else(|| {
            CoreError::Validation("Invalid image data format: payload must be base64".to_string())
        })?;
        if !mime_type.starts_with("image/") {
            return Err(CoreError::Validation(format!(
                "Invalid image data format: unsupported MIME type '{mime_type}'"
            )));
        }
        Self::from_base64(mime_type, payload)
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// File extension derived from the MIME subtype (`png` when unknown).
    pub fn extension(&self) -> &str {
        match self.mime_type.split_once('/').map(|(_, sub)| sub) {
            Some("jpeg") | Some("jpg") => "jpg",
            Some(sub) if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => sub,
            _ => "png",
        }
    }

    /// Confirm the bytes are a decodable image header and return its
    /// dimensions. Only the header is read.
    pub fn dimensions(&self) -> Result<(u32, u32), CoreError> {
        let reader = image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .map_err(|e| CoreError::Validation(format!("Unreadable image data: {e}")))?;
        if reader.format().is_none() {
            return Err(CoreError::Validation(
                "Image data is not a supported image format".to_string(),
            ));
        }
        reader
            .into_dimensions()
            .map_err(|e| CoreError::Validation(format!("Unreadable image data: {e}")))
    }
}

fn check_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Image data is empty".to_string()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Image exceeds maximum size of {MAX_IMAGE_BYTES} bytes (got {len})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
