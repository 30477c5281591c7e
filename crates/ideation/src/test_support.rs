//! In-process provider stubs for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use commonground_core::image_data::{is_data_uri, InlineImage};
use commonground_core::moderation::ToxicityAttribute;
use commonground_providers::{
    GenerativeModel, ImageStore, ProviderError, SourceImageError, SourceImageLoader, StorageError,
    ToxicityScorer, Unconfigured,
};

use crate::Providers;

/// A valid 1x1 PNG.
pub(crate) const PNG_1X1_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub(crate) enum ImageReply {
    Image,
    NoImage,
    RateLimited,
}

pub(crate) struct StubModel {
    pub image: ImageReply,
    pub text: Result<String, u16>,
    pub image_prompts: Mutex<Vec<String>>,
    pub sources: Mutex<Vec<Option<String>>>,
    pub text_calls: AtomicUsize,
}

impl StubModel {
    pub fn new(image: ImageReply, text: Result<&str, u16>) -> Self {
        Self {
            image,
            text: text.map(str::to_string),
            image_prompts: Mutex::new(Vec::new()),
            sources: Mutex::new(Vec::new()),
            text_calls: AtomicUsize::new(0),
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate_image(
        &self,
        prompt: &str,
        source: Option<&InlineImage>,
    ) -> Result<Option<InlineImage>, ProviderError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        self.sources
            .lock()
            .unwrap()
            .push(source.map(|s| s.mime_type.clone()));
        match self.image {
            ImageReply::Image => Ok(Some(InlineImage::from_data_uri(PNG_1X1_DATA_URI).unwrap())),
            ImageReply::NoImage => Ok(None),
            ImageReply::RateLimited => Err(ProviderError::RateLimited("quota".to_string())),
        }
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone().map_err(|status| ProviderError::ApiError {
            status,
            body: "boom".to_string(),
        })
    }
}

pub(crate) struct StubScorer {
    pub scores: Option<HashMap<String, f64>>,
    pub calls: AtomicUsize,
}

impl StubScorer {
    pub fn with(pairs: &[(&str, f64)]) -> Self {
        Self {
            scores: Some(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            scores: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToxicityScorer for StubScorer {
    async fn score(
        &self,
        _text: &str,
        _attributes: &[ToxicityAttribute],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scores.clone().ok_or(ProviderError::ApiError {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub(crate) struct StubStore;

#[async_trait]
impl ImageStore for StubStore {
    async fn put(&self, name: &str, _image: &InlineImage) -> Result<String, StorageError> {
        Ok(format!("https://cdn.test/{name}"))
    }
}

pub(crate) struct StubLoader;

#[async_trait]
impl SourceImageLoader for StubLoader {
    async fn load(&self, reference: &str) -> Result<InlineImage, SourceImageError> {
        if is_data_uri(reference) {
            return InlineImage::from_data_uri(reference)
                .map_err(|e| SourceImageError::InvalidImage(e.to_string()));
        }
        Ok(InlineImage::new("image/jpeg", vec![0xFF, 0xD8, 0xFF]))
    }
}

pub(crate) fn providers(model: Arc<StubModel>, scorer: Arc<StubScorer>) -> Providers {
    Providers {
        model,
        scorer,
        store: Arc::new(StubStore),
        source_images: Arc::new(StubLoader),
    }
}

pub(crate) fn unconfigured_providers() -> Providers {
    Providers {
        model: Arc::new(Unconfigured("Generative model")),
        scorer: Arc::new(Unconfigured("Toxicity scorer")),
        store: Arc::new(StubStore),
        source_images: Arc::new(StubLoader),
    }
}

/// A pool that never connects; for code paths that do not reach the database.
pub(crate) fn lazy_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/commonground_unused")
        .unwrap()
}
