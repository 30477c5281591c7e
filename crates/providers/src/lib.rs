//! Clients for the external services the ideation flow depends on.
//!
//! Each concern sits behind a trait so the orchestration layer can be
//! exercised with in-process stubs:
//!
//! - [`GenerativeModel`] -- image editing and text completion ([`gemini`]).
//! - [`ToxicityScorer`] -- per-attribute toxicity scores ([`perspective`]).
//! - [`ImageStore`] -- durable storage for submitted images ([`storage`]).
//! - [`SourceImageLoader`] -- fetches the image a generation edits
//!   ([`source_image`]).
//!
//! [`Unconfigured`] stands in for a provider whose credentials are absent.

use std::collections::HashMap;

use async_trait::async_trait;
use commonground_core::image_data::InlineImage;
use commonground_core::moderation::ToxicityAttribute;

pub mod gemini;
pub mod perspective;
pub mod source_image;
pub mod storage;

pub use source_image::{HttpSourceImageLoader, SourceImageError};
pub use storage::{ImageStore, LocalImageStore, StorageError, SupabaseStorage};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the generative model and toxicity scoring APIs.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No API key was configured for this provider.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered 429.
    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    /// The provider returned another non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Return the response unchanged on 2xx, otherwise map the status and body
/// into a [`ProviderError`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited(body));
    }
    Err(ProviderError::ApiError {
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A multimodal generative model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Edit `source` (or create from scratch when `None`) following `prompt`.
    ///
    /// Returns `Ok(None)` when the model answered without an image, which
    /// happens when its safety filters trip.
    async fn generate_image(
        &self,
        prompt: &str,
        source: Option<&InlineImage>,
    ) -> Result<Option<InlineImage>, ProviderError>;

    /// Plain text completion. The text may be empty.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Whether credentials are present. Lets callers fail before doing
    /// preparatory work such as fetching a source image.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Scores text for toxicity attributes.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Scores keyed by the attribute's API name. Attributes the provider did
    /// not score are absent from the map.
    async fn score(
        &self,
        text: &str,
        attributes: &[ToxicityAttribute],
    ) -> Result<HashMap<String, f64>, ProviderError>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Resolves a project image reference into image bytes.
#[async_trait]
pub trait SourceImageLoader: Send + Sync {
    async fn load(&self, reference: &str) -> Result<InlineImage, SourceImageError>;
}

// ---------------------------------------------------------------------------
// Unconfigured provider
// ---------------------------------------------------------------------------

/// A provider with no credentials. Every call fails with
/// [`ProviderError::NotConfigured`]; nothing is ever faked.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl GenerativeModel for Unconfigured {
    async fn generate_image(
        &self,
        _prompt: &str,
        _source: Option<&InlineImage>,
    ) -> Result<Option<InlineImage>, ProviderError> {
        Err(ProviderError::NotConfigured(self.0))
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(self.0))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

#[async_trait]
impl ToxicityScorer for Unconfigured {
    async fn score(
        &self,
        _text: &str,
        _attributes: &[ToxicityAttribute],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        Err(ProviderError::NotConfigured(self.0))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
