//! Durable storage for submitted idea images.
//!
//! Two backends: [`LocalImageStore`] writes into a directory served by the
//! API under `/media`, [`SupabaseStorage`] uploads to a Supabase storage
//! bucket. Both return the public URL persisted with the idea.

use std::path::PathBuf;

use async_trait::async_trait;
use commonground_core::image_data::InlineImage;

pub const DEFAULT_SUPABASE_BUCKET: &str = "generated_images";

/// Errors from image storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid object name: {0}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

/// Stores an image under `name` and returns its public URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, name: &str, image: &InlineImage) -> Result<String, StorageError>;
}

/// Names are flat file names: no separators, no dot segments.
fn check_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

/// Writes images into a local directory.
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    /// * `root` - directory the API serves under `/media`.
    /// * `public_base_url` - origin the service is reachable at.
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, name: &str) -> String {
        format!("{}/media/{name}", self.public_base_url)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, name: &str, image: &InlineImage) -> Result<String, StorageError> {
        check_name(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, &image.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "Stored image locally");
        Ok(self.public_url(name))
    }
}

// ---------------------------------------------------------------------------
// Supabase storage
// ---------------------------------------------------------------------------

/// Uploads to a public Supabase storage bucket with the service role key.
pub struct SupabaseStorage {
    client: reqwest::Client,
    project_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(
        client: reqwest::Client,
        project_url: &str,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            client,
            project_url: project_url.trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    fn upload_url(&self, name: &str) -> String {
        format!("{}/storage/v1/object/{}/{name}", self.project_url, self.bucket)
    }

    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.project_url, self.bucket
        )
    }
}

#[async_trait]
impl ImageStore for SupabaseStorage {
    async fn put(&self, name: &str, image: &InlineImage) -> Result<String, StorageError> {
        check_name(name)?;
        let response = self
            .client
            .post(self.upload_url(name))
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(reqwest::header::CONTENT_TYPE, &image.mime_type)
            .header("x-upsert", "false")
            .body(image.bytes.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StorageError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(bucket = %self.bucket, name, "Uploaded image to storage bucket");
        Ok(self.public_url(name))
    }
}
