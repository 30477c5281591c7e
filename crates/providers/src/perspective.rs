//! Client for the Perspective comment analysis API.

use std::collections::HashMap;

use async_trait::async_trait;
use commonground_core::moderation::ToxicityAttribute;
use serde::Deserialize;
use serde_json::json;

use crate::{ensure_success, ProviderError, ToxicityScorer};

pub const DEFAULT_BASE_URL: &str = "https://commentanalyzer.googleapis.com";

/// HTTP client for `comments:analyze`.
pub struct PerspectiveClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub attribute_scores: Option<HashMap<String, AttributeScore>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeScore {
    pub summary_score: SummaryScore,
}

#[derive(Debug, Deserialize)]
pub struct SummaryScore {
    pub value: f64,
}

/// Flatten the response into `attribute -> summary score`.
///
/// `None` when the response carried no scores at all.
pub fn summary_scores(response: AnalyzeResponse) -> Option<HashMap<String, f64>> {
    response.attribute_scores.map(|scores| {
        scores
            .into_iter()
            .map(|(name, score)| (name, score.summary_score.value))
            .collect()
    })
}

fn analyze_body(text: &str, attributes: &[ToxicityAttribute]) -> serde_json::Value {
    let requested: serde_json::Map<String, serde_json::Value> = attributes
        .iter()
        .map(|a| (a.api_name().to_string(), json!({})))
        .collect();
    json!({
        "comment": { "text": text },
        "languages": ["en"],
        "requestedAttributes": requested,
    })
}

impl PerspectiveClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ToxicityScorer for PerspectiveClient {
    async fn score(
        &self,
        text: &str,
        attributes: &[ToxicityAttribute],
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1alpha1/comments:analyze", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&analyze_body(text, attributes))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        let parsed: AnalyzeResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(summary_scores(parsed).unwrap_or_else(|| {
            tracing::warn!("Toxicity response contained no attribute scores");
            HashMap::new()
        }))
    }
}
