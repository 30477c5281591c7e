#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use commonground_api::config::{MapConfig, ServerConfig, StorageBackend};
use commonground_api::router::build_app_router;
use commonground_api::state::AppState;
use commonground_core::image_data::InlineImage;
use commonground_core::moderation::ToxicityAttribute;
use commonground_ideation::Providers;
use commonground_providers::{
    GenerativeModel, ImageStore, ProviderError, SourceImageError, SourceImageLoader, StorageError,
    ToxicityScorer, Unconfigured,
};
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

/// A 1x1 PNG.
pub const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Cookie header value for a fixed anonymous user.
pub fn user_cookie(id: &str) -> String {
    format!("anonymous-user-id={id}")
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout. No provider keys are set.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        provider_timeout_secs: 30,
        database_url: "postgres://localhost/commonground_test".to_string(),
        public_base_url: "http://localhost:3000".to_string(),
        gemini: None,
        perspective: None,
        storage: StorageBackend::Local {
            media_dir: PathBuf::from("./media"),
        },
        map: MapConfig {
            tiles_api_key: None,
            style_url: "mapbox://styles/mapbox/streets-v12".to_string(),
        },
        session_ttl_secs: 3600,
    }
}

/// A pool that never connects, for endpoints that do not touch the database.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/commonground_unused")
        .unwrap()
}

// ---------------------------------------------------------------------------
// Provider stubs
// ---------------------------------------------------------------------------

/// Answers every image request with [`PNG_1X1`] and every text request with
/// a fixed reply.
pub struct StubModel {
    text: Result<String, String>,
    pub image_prompts: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn answering(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
            image_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_text() -> Self {
        Self {
            text: Err("model overloaded".to_string()),
            image_prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate_image(
        &self,
        prompt: &str,
        _source: Option<&InlineImage>,
    ) -> Result<Option<InlineImage>, ProviderError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        Ok(Some(InlineImage::from_data_uri(PNG_1X1).unwrap()))
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.text.clone().map_err(|body| ProviderError::ApiError {
            status: 503,
            body,
        })
    }
}

/// Returns fixed scores.
pub struct StubScorer(pub HashMap<String, f64>);

impl StubScorer {
    pub fn with(scores: &[(&str, f64)]) -> Self {
        Self(scores.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

#[async_trait]
impl ToxicityScorer for StubScorer {
    async fn score(
        &self,
        _text: &str,
        _attributes: &[ToxicityAttribute],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Keeps the names of stored images.
#[derive(Default)]
pub struct MemoryStore {
    pub names: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn put(&self, name: &str, _image: &InlineImage) -> Result<String, StorageError> {
        self.names.lock().unwrap().push(name.to_string());
        Ok(format!("https://cdn.test/{name}"))
    }
}

/// Resolves every reference to [`PNG_1X1`].
pub struct StubLoader;

#[async_trait]
impl SourceImageLoader for StubLoader {
    async fn load(&self, _reference: &str) -> Result<InlineImage, SourceImageError> {
        Ok(InlineImage::from_data_uri(PNG_1X1).unwrap())
    }
}

/// Providers backed by stubs.
pub fn stub_providers(model: StubModel, scorer: StubScorer) -> Providers {
    Providers {
        model: Arc::new(model),
        scorer: Arc::new(scorer),
        store: Arc::new(MemoryStore::default()),
        source_images: Arc::new(StubLoader),
    }
}

/// Providers with no credentials, as when no key is configured.
pub fn unconfigured_providers() -> Providers {
    Providers {
        model: Arc::new(Unconfigured("Generative model")),
        scorer: Arc::new(Unconfigured("Toxicity scorer")),
        store: Arc::new(MemoryStore::default()),
        source_images: Arc::new(StubLoader),
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers, using the
/// given database pool and unconfigured providers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, unconfigured_providers())
}

/// Build the full application router with the given providers.
pub fn build_test_app_with(pool: PgPool, providers: Providers) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone(), providers);
    build_app_router(state, &config).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a project whose deadline lies `deadline_days` from now.
pub async fn seed_project(
    pool: &PgPool,
    reference: &str,
    deadline_days: i64,
    limitations: &[&str],
    coordinates: Option<(f64, f64)>,
) {
    let limitations: Option<Vec<String>> = if limitations.is_empty() {
        None
    } else {
        Some(limitations.iter().map(|s| s.to_string()).collect())
    };
    sqlx::query(
        "INSERT INTO projects
            (reference, title, short_description, category, image, deadline,
             limitations, latitude, longitude)
         VALUES ($1, 'Sponge Park', 'A park that soaks up rain', 'Environment',
                 '/images/sponge.jpg', NOW() + make_interval(days => $2::int), $3, $4, $5)",
    )
    .bind(reference)
    .bind(deadline_days as i32)
    .bind(limitations)
    .bind(coordinates.map(|c| c.0))
    .bind(coordinates.map(|c| c.1))
    .execute(pool)
    .await
    .unwrap();
}

/// Insert an idea directly and return its id.
pub async fn seed_idea(pool: &PgPool, reference: &str, title: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ideas (project_reference, title, description, generated_image, user_id)
         VALUES ($1, $2, 'A description', 'https://cdn.test/x.png', 'anon-seed')
         RETURNING id",
    )
    .bind(reference)
    .bind(title)
    .fetch_one(pool)
    .await
    .unwrap()
}
