//! Reality check, idea analysis and details suggestion.
//!
//! The model's answer is advisory. Any failure past input validation
//! (missing key, upstream error, undecodable answer) yields a fallback value
//! together with the reason, never an error.

use std::sync::Arc;

use commonground_core::ai_response::{
    parse_analysis, parse_details, parse_reality_check, ResponseParseError,
};
use commonground_core::analysis::{
    fallback_checks, reconcile_checks, IdeaAnalysis, IdeaDetails, LimitationCheck,
    FALLBACK_DETAILS_TITLE,
};
use commonground_core::error::CoreError;
use commonground_core::prompts::{details_prompt, idea_analysis_prompt, reality_check_prompt};
use commonground_core::validation;
use commonground_providers::GenerativeModel;

/// A gateway result. `fallback_reason` is set when `value` is the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome<T> {
    pub value: T,
    pub fallback_reason: Option<String>,
}

impl<T> AnalysisOutcome<T> {
    fn answered(value: T) -> Self {
        Self {
            value,
            fallback_reason: None,
        }
    }

    fn fallback(value: T, reason: String) -> Self {
        Self {
            value,
            fallback_reason: Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

fn require_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation("Prompt is required".to_string()));
    }
    Ok(())
}

/// Text analysis through a [`GenerativeModel`].
#[derive(Clone)]
pub struct AnalysisGateway {
    model: Arc<dyn GenerativeModel>,
}

impl AnalysisGateway {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Ask the model and decode its answer, collapsing every failure into a
    /// reason string.
    async fn ask<T>(
        &self,
        prompt: String,
        decode: fn(&str) -> Result<T, ResponseParseError>,
    ) -> Result<T, String> {
        let raw = self
            .model
            .generate_text(&prompt)
            .await
            .map_err(|e| e.to_string())?;
        decode(&raw).map_err(|e| e.to_string())
    }

    /// Classify `prompt` against each limitation.
    ///
    /// An empty limitation list returns an empty result without calling the
    /// model.
    pub async fn reality_check(
        &self,
        prompt: &str,
        limitations: &[String],
    ) -> Result<AnalysisOutcome<Vec<LimitationCheck>>, CoreError> {
        require_prompt(prompt)?;
        validation::validate_limitations(limitations)?;
        if limitations.is_empty() {
            return Ok(AnalysisOutcome::answered(Vec::new()));
        }

        match self
            .ask(reality_check_prompt(prompt, limitations), parse_reality_check)
            .await
        {
            Ok(checks) => Ok(AnalysisOutcome::answered(reconcile_checks(limitations, checks))),
            Err(reason) => {
                tracing::warn!(
                    error = %reason,
                    limitations = limitations.len(),
                    "Reality check failed, using fallback"
                );
                Ok(AnalysisOutcome::fallback(fallback_checks(limitations), reason))
            }
        }
    }

    /// Reality check plus a suggested title and description.
    pub async fn analyze_idea(
        &self,
        prompt: &str,
        limitations: &[String],
        project_title: &str,
        project_description: &str,
    ) -> Result<AnalysisOutcome<IdeaAnalysis>, CoreError> {
        require_prompt(prompt)?;
        validation::validate_limitations(limitations)?;

        let question =
            idea_analysis_prompt(prompt, limitations, project_title, project_description);
        match self.ask(question, parse_analysis).await {
            Ok(answer) => Ok(AnalysisOutcome::answered(IdeaAnalysis {
                checks: reconcile_checks(limitations, answer.checks),
                suggested_title: answer.details.title,
                suggested_description: answer.details.description,
            })),
            Err(reason) => {
                tracing::warn!(error = %reason, "Idea analysis failed, using fallback");
                Ok(AnalysisOutcome::fallback(
                    IdeaAnalysis::fallback(limitations, project_title, prompt),
                    reason,
                ))
            }
        }
    }

    /// Suggest a title and description for an idea.
    pub async fn suggest_details(
        &self,
        prompt: &str,
    ) -> Result<AnalysisOutcome<IdeaDetails>, CoreError> {
        require_prompt(prompt)?;
        match self.ask(details_prompt(prompt), parse_details).await {
            Ok(details) => Ok(AnalysisOutcome::answered(details)),
            Err(reason) => {
                tracing::warn!(error = %reason, "Details suggestion failed, using fallback");
                Ok(AnalysisOutcome::fallback(
                    IdeaDetails {
                        title: FALLBACK_DETAILS_TITLE.to_string(),
                        description: prompt.to_string(),
                    },
                    reason,
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
