//! Loads the image a generation edits.
//!
//! A reference is one of:
//! - a `data:` URI (a previously generated image),
//! - an absolute `http(s)` URL,
//! - a site-relative path such as `/images/park.jpg`, resolved against the
//!   public base URL the project images are served from.

use async_trait::async_trait;
use commonground_core::image_data::{
    is_data_uri, InlineImage, DEFAULT_SOURCE_MIME, MAX_IMAGE_BYTES,
};

use crate::SourceImageLoader;

#[derive(Debug, thiserror::Error)]
pub enum SourceImageError {
    #[error("Unsupported image reference: {0}")]
    InvalidReference(String),

    #[error("Failed to fetch source image: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to fetch source image ({status})")]
    ApiError { status: u16 },

    #[error("Source image is unusable: {0}")]
    InvalidImage(String),
}

/// Absolute URL for a remote or site-relative reference.
pub fn resolve_source_url(
    reference: &str,
    public_base_url: &str,
) -> Result<String, SourceImageError> {
    let reference = reference.trim();
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(reference.to_string());
    }
    if reference.starts_with('/') && !reference.starts_with("//") {
        return Ok(format!("{}{reference}", public_base_url.trim_end_matches('/')));
    }
    Err(SourceImageError::InvalidReference(reference.to_string()))
}

/// MIME type from a `Content-Type` header value, parameters stripped.
fn image_mime(content_type: Option<&str>) -> Result<String, SourceImageError> {
    let Some(value) = content_type else {
        return Ok(DEFAULT_SOURCE_MIME.to_string());
    };
    let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if mime.is_empty() || mime == "application/octet-stream" {
        Ok(DEFAULT_SOURCE_MIME.to_string())
    } else if mime.starts_with("image/") {
        Ok(mime)
    } else {
        Err(SourceImageError::InvalidImage(format!(
            "served as '{mime}', not an image"
        )))
    }
}

fn too_large(limit: usize) -> SourceImageError {
    SourceImageError::InvalidImage(format!("larger than {limit} bytes"))
}

/// Read a response body, giving up as soon as it grows past `limit` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SourceImageError> {
    if response
        .content_length()
        .is_some_and(|declared| declared > limit as u64)
    {
        return Err(too_large(limit));
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Fetches remote references over HTTP and decodes `data:` URIs in place.
pub struct HttpSourceImageLoader {
    client: reqwest::Client,
    public_base_url: String,
}

impl HttpSourceImageLoader {
    pub fn new(client: reqwest::Client, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl SourceImageLoader for HttpSourceImageLoader {
    async fn load(&self, reference: &str) -> Result<InlineImage, SourceImageError> {
        if is_data_uri(reference) {
            return InlineImage::from_data_uri(reference)
                .map_err(|e| SourceImageError::InvalidImage(e.to_string()));
        }

        let url = resolve_source_url(reference, &self.public_base_url)?;
        tracing::debug!(%url, "Fetching source image");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceImageError::ApiError {
                status: status.as_u16(),
            });
        }

        let mime_type = image_mime(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        )?;
        let bytes = read_capped(response, MAX_IMAGE_BYTES).await?;
        if bytes.is_empty() {
            return Err(SourceImageError::InvalidImage("empty body".to_string()));
        }
        Ok(InlineImage::new(mime_type, bytes))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer one HTTP request on a local port with `raw`, then close.
    async fn serve_once(raw: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(&raw).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/park.png")
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        assert_eq!(
            resolve_source_url("/images/park.jpg", "http://localhost:3000/").unwrap(),
            "http://localhost:3000/images/park.jpg"
        );
        assert_eq!(
            resolve_source_url("https://cdn.test/a.png", "http://ignored").unwrap(),
            "https://cdn.test/a.png"
        );
    }

    #[test]
    fn other_references_are_rejected() {
        assert_matches!(
            resolve_source_url("images/park.jpg", "http://localhost:3000"),
            Err(SourceImageError::InvalidReference(_))
        );
        assert_matches!(
            resolve_source_url("//evil.test/a.png", "http://localhost:3000"),
            Err(SourceImageError::InvalidReference(_))
        );
        assert_matches!(
            resolve_source_url("file:///etc/passwd", "http://localhost:3000"),
            Err(SourceImageError::InvalidReference(_))
        );
    }

    #[test]
    fn content_type_decides_mime() {
        assert_eq!(image_mime(None).unwrap(), "image/jpeg");
        assert_eq!(image_mime(Some("image/png; charset=binary")).unwrap(), "image/png");
        assert_eq!(image_mime(Some("application/octet-stream")).unwrap(), "image/jpeg");
        assert_matches!(image_mime(Some("text/html")), Err(SourceImageError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn data_uri_is_decoded_without_fetching() {
        let loader = HttpSourceImageLoader::new(reqwest::Client::new(), "http://unused");
        let image = loader.load("data:image/png;base64,AQID").await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn oversized_declared_length_is_refused_before_reading() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 999999999\r\n\r\n"
                .to_vec(),
        )
        .await;
        let loader = HttpSourceImageLoader::new(reqwest::Client::new(), "http://unused");
        assert_matches!(
            loader.load(&url).await,
            Err(SourceImageError::InvalidImage(msg)) if msg.starts_with("larger than")
        );
    }

    #[tokio::test]
    async fn undeclared_body_is_cut_off_at_the_limit() {
        let mut raw =
            b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nConnection: close\r\n\r\n".to_vec();
        raw.extend_from_slice(&[7u8; 32]);
        let url = serve_once(raw).await;

        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.content_length(), None);
        assert_matches!(
            read_capped(response, 8).await,
            Err(SourceImageError::InvalidImage(_))
        );
    }

    #[tokio::test]
    async fn body_within_the_limit_is_read_whole() {
        let mut raw =
            b"HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: 4\r\n\r\n".to_vec();
        raw.extend_from_slice(&[1, 2, 3, 4]);
        let url = serve_once(raw).await;

        let loader = HttpSourceImageLoader::new(reqwest::Client::new(), "http://unused");
        let image = loader.load(&url).await.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![1, 2, 3, 4]);
    }
}
