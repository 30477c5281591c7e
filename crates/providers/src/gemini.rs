//! REST client for the Gemini generative language API.
//!
//! Image editing goes through `streamGenerateContent` (which, without
//! `alt=sse`, answers with a JSON array of response chunks); text completion
//! through `generateContent`. Authentication uses the `x-goog-api-key`
//! header.

use async_trait::async_trait;
use commonground_core::image_data::{InlineImage, DEFAULT_GENERATED_MIME};
use serde::{Deserialize, Serialize};

use crate::{ensure_success, GenerativeModel, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash-lite";

/// HTTP client for one Gemini API key.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    image_model: String,
    text_model: String,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart<'a> {
    Text(&'a str),
    InlineData(InlineDataOut<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataOut<'a> {
    mime_type: &'a str,
    data: String,
}

/// One response (or one chunk of a streamed response).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineDataIn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDataIn {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter())
            .into_iter()
            .flatten()
    }
}

// ---------------------------------------------------------------------------
// Response interpretation
// ---------------------------------------------------------------------------

/// The first inline image across all chunks, in stream order.
pub fn first_inline_image(
    chunks: &[GenerateContentResponse],
) -> Result<Option<InlineImage>, ProviderError> {
    let found = chunks
        .iter()
        .flat_map(|chunk| chunk.parts())
        .find_map(|part| part.inline_data.as_ref().filter(|d| !d.data.is_empty()));

    let Some(data) = found else {
        return Ok(None);
    };
    let mime_type = data
        .mime_type
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_GENERATED_MIME);
    InlineImage::from_base64(mime_type, &data.data)
        .map(Some)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Concatenated text parts of the first candidate.
pub fn collect_text(response: &GenerateContentResponse) -> String {
    response
        .parts()
        .filter_map(|part| part.text.as_deref())
        .collect()
}

/// Why the model produced nothing, when it said so.
fn block_reason(chunks: &[GenerateContentResponse]) -> Option<String> {
    chunks.iter().find_map(|chunk| {
        chunk
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| {
                chunk
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .filter(|r| r != "STOP")
            })
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl GeminiClient {
    /// * `base_url` - API root, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        image_model: impl Into<String>,
        text_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            image_model: image_model.into(),
            text_model: text_model.into(),
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{model}:{method}", self.base_url)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &GenerateContentRequest<'_>,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_image(
        &self,
        prompt: &str,
        source: Option<&InlineImage>,
    ) -> Result<Option<InlineImage>, ProviderError> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = source {
            parts.push(RequestPart::InlineData(InlineDataOut {
                mime_type: &image.mime_type,
                data: image.to_base64(),
            }));
        }
        parts.push(RequestPart::Text(prompt));
        let body = GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        };

        tracing::debug!(
            model = %self.image_model,
            has_source = source.is_some(),
            "Requesting image generation"
        );
        let chunks: Vec<GenerateContentResponse> = self
            .post(self.endpoint(&self.image_model, "streamGenerateContent"), &body)
            .await?;

        let image = first_inline_image(&chunks)?;
        if image.is_none() {
            let reason = block_reason(&chunks).unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(chunks = chunks.len(), %reason, "Model returned no image");
        }
        Ok(image)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart::Text(prompt)],
            }],
        };
        let response: GenerateContentResponse = self
            .post(self.endpoint(&self.text_model, "generateContent"), &body)
            .await?;
        Ok(collect_text(&response))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
