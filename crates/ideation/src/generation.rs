//! Image generation: frame the user's enhancement, load the image being
//! edited and ask the model for a new version.
//!
//! No placeholder image is ever produced. A missing key, an upstream
//! failure or an answer without image data are all errors.

use std::sync::Arc;

use commonground_core::error::CoreError;
use commonground_core::ideation::GeneratedImage;
use commonground_core::prompts::{frame_enhancement, image_enhancement_prompt};
use commonground_core::validation;
use commonground_providers::{GenerativeModel, ProviderError, SourceImageError, SourceImageLoader};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Invalid(CoreError),

    #[error("{0} is not configured")]
    ProviderUnavailable(&'static str),

    #[error(transparent)]
    SourceImage(#[from] SourceImageError),

    #[error("Image generation failed: {0}")]
    Upstream(ProviderError),

    #[error(
        "No image data was generated in the response, possibly due to safety settings \
         or a server timeout."
    )]
    NoImageReturned,
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(name) => Self::ProviderUnavailable(name),
            other => Self::Upstream(other),
        }
    }
}

impl From<GenerationError> for CoreError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Invalid(core) => core,
            GenerationError::ProviderUnavailable(name) => {
                CoreError::ProviderUnavailable(name.to_string())
            }
            GenerationError::SourceImage(SourceImageError::InvalidReference(r)) => {
                CoreError::Validation(format!("Unsupported source image reference: {r}"))
            }
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

/// Produces edited images through a [`GenerativeModel`].
#[derive(Clone)]
pub struct ImageGenerationGateway {
    model: Arc<dyn GenerativeModel>,
    source_images: Arc<dyn SourceImageLoader>,
}

impl ImageGenerationGateway {
    pub fn new(model: Arc<dyn GenerativeModel>, source_images: Arc<dyn SourceImageLoader>) -> Self {
        Self {
            model,
            source_images,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_configured()
    }

    /// Generate a new vision.
    ///
    /// * `source_image` - image to edit (`data:` URI, URL or site path);
    ///   `None` generates from the prompt alone.
    /// * `project_title` - frames the enhancement around the project when
    ///   given.
    pub async fn generate(
        &self,
        enhancement: &str,
        source_image: Option<&str>,
        project_title: Option<&str>,
    ) -> Result<GeneratedImage, GenerationError> {
        validation::validate_prompt(enhancement).map_err(GenerationError::Invalid)?;
        if !self.model.is_configured() {
            return Err(GenerationError::ProviderUnavailable("Generative model"));
        }

        let source = match source_image.map(str::trim).filter(|s| !s.is_empty()) {
            Some(reference) => Some(self.source_images.load(reference).await?),
            None => None,
        };

        let framed = match project_title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => frame_enhancement(enhancement, title),
            None => enhancement.trim().to_string(),
        };
        let prompt = image_enhancement_prompt(&framed);

        let image = self
            .model
            .generate_image(&prompt, source.as_ref())
            .await?
            .ok_or(GenerationError::NoImageReturned)?;

        tracing::info!(
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            has_source = source.is_some(),
            "Image generated"
        );
        Ok(GeneratedImage {
            data_uri: image.to_data_uri(),
            mime_type: image.mime_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use commonground_providers::Unconfigured;

    use super::*;
    use crate::test_support::{ImageReply, StubLoader, StubModel};

    fn gateway(model: Arc<StubModel>) -> ImageGenerationGateway {
        ImageGenerationGateway::new(model, Arc::new(StubLoader))
    }

    #[tokio::test]
    async fn generates_data_uri_with_framed_prompt() {
        let model = Arc::new(StubModel::new(ImageReply::Image, Ok("")));
        let image = gateway(model.clone())
            .generate("add trees", Some("/images/park.jpg"), Some("Sponge Park"))
            .await
            .unwrap();

        assert!(image.data_uri.starts_with("data:image/png;base64,"));
        assert_eq!(image.mime_type, "image/png");

        let prompts = model.image_prompts.lock().unwrap();
        assert!(prompts[0].contains("add trees. Enhance this Sponge Park design"));
        assert_eq!(
            model.sources.lock().unwrap()[0].as_deref(),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn without_source_or_project_the_prompt_is_used_as_is() {
        let model = Arc::new(StubModel::new(ImageReply::Image, Ok("")));
        gateway(model.clone())
            .generate("a fountain", None, None)
            .await
            .unwrap();
        assert!(!model.image_prompts.lock().unwrap()[0].contains("Enhance this"));
        assert_eq!(model.sources.lock().unwrap()[0], None);
    }

    #[tokio::test]
    async fn missing_image_is_an_error() {
        let model = Arc::new(StubModel::new(ImageReply::NoImage, Ok("")));
        let err = gateway(model).generate("x", None, None).await.unwrap_err();
        assert_matches!(err, GenerationError::NoImageReturned);
        assert_matches!(
            CoreError::from(err),
            CoreError::Upstream(msg) if msg.starts_with("No image data")
        );
    }

    #[tokio::test]
    async fn rate_limit_is_upstream() {
        let model = Arc::new(StubModel::new(ImageReply::RateLimited, Ok("")));
        let err = gateway(model).generate("x", None, None).await.unwrap_err();
        assert_matches!(err, GenerationError::Upstream(ProviderError::RateLimited(_)));
    }

    #[tokio::test]
    async fn unconfigured_model_fails_before_loading_source() {
        let gateway = ImageGenerationGateway::new(
            Arc::new(Unconfigured("Generative model")),
            Arc::new(StubLoader),
        );
        let err = gateway
            .generate("x", Some("not-a-valid-reference"), None)
            .await
            .unwrap_err();
        assert_matches!(err, GenerationError::ProviderUnavailable(_));
        assert_matches!(CoreError::from(err), CoreError::ProviderUnavailable(_));
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let model = Arc::new(StubModel::new(ImageReply::Image, Ok("")));
        let err = gateway(model.clone()).generate("  ", None, None).await.unwrap_err();
        assert_matches!(CoreError::from(err), CoreError::Validation(_));
        assert!(model.image_prompts.lock().unwrap().is_empty());
    }
}
