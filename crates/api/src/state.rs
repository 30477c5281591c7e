use std::sync::Arc;
use std::time::Duration;

use commonground_ideation::{IdeationOrchestrator, Providers};
use commonground_providers::gemini::GeminiClient;
use commonground_providers::perspective::PerspectiveClient;
use commonground_providers::{
    GenerativeModel, HttpSourceImageLoader, ImageStore, LocalImageStore, SupabaseStorage,
    ToxicityScorer, Unconfigured,
};

use crate::config::{ServerConfig, StorageBackend};
use crate::sessions::SessionStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: commonground_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Gateways and the step sequencer for ideation.
    pub orchestrator: Arc<IdeationOrchestrator>,
    /// Live ideation sessions.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(pool: commonground_db::DbPool, config: ServerConfig, providers: Providers) -> Self {
        Self {
            orchestrator: Arc::new(IdeationOrchestrator::new(pool.clone(), providers)),
            pool,
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}

/// Build the provider clients described by `config`.
///
/// A provider without credentials is replaced by [`Unconfigured`], so the
/// features depending on it fail with `PROVIDER_NOT_CONFIGURED` instead of
/// degrading silently.
pub fn build_providers(config: &ServerConfig) -> Result<Providers, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()?;

    let model: Arc<dyn GenerativeModel> = match &config.gemini {
        Some(gemini) => Arc::new(GeminiClient::new(
            client.clone(),
            gemini.base_url.clone(),
            gemini.api_key.clone(),
            gemini.image_model.clone(),
            gemini.text_model.clone(),
        )),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, image generation and analysis are disabled");
            Arc::new(Unconfigured("Generative model"))
        }
    };

    let scorer: Arc<dyn ToxicityScorer> = match &config.perspective {
        Some(perspective) => Arc::new(PerspectiveClient::new(
            client.clone(),
            perspective.base_url.clone(),
            perspective.api_key.clone(),
        )),
        None => {
            tracing::warn!("PERSPECTIVE_API_KEY not set, idea submission is disabled");
            Arc::new(Unconfigured("Toxicity scorer"))
        }
    };

    let store: Arc<dyn ImageStore> = match &config.storage {
        StorageBackend::Local { media_dir } => {
            Arc::new(LocalImageStore::new(media_dir.clone(), &config.public_base_url))
        }
        StorageBackend::Supabase {
            url,
            service_key,
            bucket,
        } => Arc::new(SupabaseStorage::new(
            client.clone(),
            url,
            service_key.clone(),
            bucket.clone(),
        )),
    };

    let source_images = Arc::new(HttpSourceImageLoader::new(
        client,
        config.public_base_url.clone(),
    ));

    Ok(Providers {
        model,
        scorer,
        store,
        source_images,
    })
}
