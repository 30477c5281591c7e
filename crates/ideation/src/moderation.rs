//! Content moderation for idea titles and descriptions.

use std::sync::Arc;

use commonground_core::error::CoreError;
use commonground_core::moderation::{
    evaluate_scores, moderation_text, ModerationVerdict, ATTRIBUTES,
};
use commonground_providers::{ProviderError, ToxicityScorer};

/// Screens text through a [`ToxicityScorer`].
///
/// A flagged verdict is a normal result. Errors are reserved for failures
/// of the scoring call itself.
#[derive(Clone)]
pub struct ModerationGateway {
    scorer: Arc<dyn ToxicityScorer>,
}

impl ModerationGateway {
    pub fn new(scorer: Arc<dyn ToxicityScorer>) -> Self {
        Self { scorer }
    }

    pub fn is_configured(&self) -> bool {
        self.scorer.is_configured()
    }

    pub async fn moderate(
        &self,
        title: &str,
        description: &str,
    ) -> Result<ModerationVerdict, CoreError> {
        let Some(text) = moderation_text(title, description) else {
            return Ok(ModerationVerdict::Safe);
        };

        let scores = self
            .scorer
            .score(&text, &ATTRIBUTES)
            .await
            .map_err(|e| match e {
                ProviderError::NotConfigured(name) => {
                    CoreError::ProviderUnavailable(name.to_string())
                }
                other => {
                    tracing::error!(error = %other, "Moderation call failed");
                    CoreError::Upstream(format!("Content moderation failed: {other}"))
                }
            })?;

        let verdict = evaluate_scores(&scores);
        if let ModerationVerdict::Flagged {
            attribute, score, ..
        } = &verdict
        {
            tracing::info!(
                attribute = attribute.api_name(),
                score,
                "Content flagged by moderation"
            );
        }
        Ok(verdict)
    }
}
