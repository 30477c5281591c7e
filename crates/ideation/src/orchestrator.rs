//! Drives an [`IdeationWorkflow`] through its provider-backed steps.
//!
//! Each step works on a copy of the workflow: the start event is applied,
//! the gateway is awaited, the outcome event is applied, and only then is
//! the caller's workflow replaced. A step whose future is dropped part way
//! (client disconnect, request timeout) leaves the workflow as it was
//! instead of stuck in an in-flight stage.
//!
//! Step methods return `Err` for illegal transitions and validation
//! failures, in which case the workflow is untouched, and for failed
//! generation or submission, in which case the failure has already been
//! recorded in the workflow. A failed reality check is advisory and
//! returns `Ok`, including one the project's own limitations cannot pass
//! validation for.

use commonground_core::analysis::IdeaAnalysis;
use commonground_core::error::CoreError;
use commonground_core::ideation::{BaseImage, IdeationEvent, IdeationWorkflow};
use commonground_db::models::idea::Idea;
use sqlx::PgPool;

use crate::analysis::{AnalysisGateway, AnalysisOutcome};
use crate::generation::ImageGenerationGateway;
use crate::moderation::ModerationGateway;
use crate::submission::{IdeaSubmission, IdeaSubmitter};
use crate::Providers;

/// Message shown to the user for a failed step.
pub fn user_message(err: &CoreError) -> String {
    match err {
        CoreError::Validation(msg)
        | CoreError::Conflict(msg)
        | CoreError::ContentRejected(msg)
        | CoreError::Upstream(msg) => msg.clone(),
        CoreError::ProviderUnavailable(name) => format!("{name} is not configured"),
        CoreError::NotFound { .. } => err.to_string(),
        CoreError::Internal(_) => "An internal error occurred".to_string(),
    }
}

/// Sequences the ideation steps. Shared behind an `Arc` in application state.
#[derive(Clone)]
pub struct IdeationOrchestrator {
    generation: ImageGenerationGateway,
    analysis: AnalysisGateway,
    moderation: ModerationGateway,
    submitter: IdeaSubmitter,
}

impl IdeationOrchestrator {
    pub fn new(pool: PgPool, providers: Providers) -> Self {
        let moderation = ModerationGateway::new(providers.scorer);
        Self {
            generation: ImageGenerationGateway::new(
                providers.model.clone(),
                providers.source_images,
            ),
            analysis: AnalysisGateway::new(providers.model),
            submitter: IdeaSubmitter::new(pool, providers.store, moderation.clone()),
            moderation,
        }
    }

    pub fn generation(&self) -> &ImageGenerationGateway {
        &self.generation
    }

    pub fn analysis(&self) -> &AnalysisGateway {
        &self.analysis
    }

    pub fn moderation(&self) -> &ModerationGateway {
        &self.moderation
    }

    pub fn submitter(&self) -> &IdeaSubmitter {
        &self.submitter
    }

    /// Generate a new image from `prompt`, editing the workflow's current
    /// base image. `base` switches the base first when given.
    pub async fn generate_vision(
        &self,
        workflow: &mut IdeationWorkflow,
        prompt: &str,
        base: Option<BaseImage>,
    ) -> Result<(), CoreError> {
        let mut next = workflow.clone();
        if let Some(base) = base {
            next.select_base_image(base)?;
        }
        next.apply(IdeationEvent::StartGeneration {
            prompt: prompt.to_string(),
        })?;

        let result = self
            .generation
            .generate(
                prompt,
                Some(next.source_image()),
                Some(&next.project().title),
            )
            .await;

        let outcome = match result {
            Ok(image) => {
                next.apply(IdeationEvent::GenerationSucceeded { image })?;
                Ok(())
            }
            Err(err) => {
                let err = CoreError::from(err);
                tracing::warn!(
                    error = %err,
                    project = %next.project().reference,
                    "Vision generation failed"
                );
                next.apply(IdeationEvent::GenerationFailed {
                    error: user_message(&err),
                })?;
                Err(err)
            }
        };
        *workflow = next;
        outcome
    }

    /// Run the reality check and title/description suggestion over every
    /// prompt so far.
    pub async fn check(&self, workflow: &mut IdeationWorkflow) -> Result<(), CoreError> {
        let mut next = workflow.clone();
        next.apply(IdeationEvent::StartCheck)?;

        let project = next.project().clone();
        let prompt = next.analysis_prompt();
        let analysis = self
            .analysis
            .analyze_idea(
                &prompt,
                &project.limitations,
                &project.title,
                &project.short_description,
            )
            .await;
        let AnalysisOutcome {
            value,
            fallback_reason,
        } = match analysis {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    project = %project.reference,
                    "Reality check rejected its input, using fallback"
                );
                AnalysisOutcome {
                    value: IdeaAnalysis::fallback(&project.limitations, &project.title, &prompt),
                    fallback_reason: Some(user_message(&err)),
                }
            }
        };

        match fallback_reason {
            None => next.apply(IdeationEvent::CheckSucceeded { analysis: value })?,
            Some(error) => next.apply(IdeationEvent::CheckFailed {
                error,
                fallback: value,
            })?,
        };
        *workflow = next;
        Ok(())
    }

    /// Skip the reality check for a project without limitations.
    pub fn skip_check(&self, workflow: &mut IdeationWorkflow) -> Result<(), CoreError> {
        workflow.apply(IdeationEvent::SkipCheck)?;
        Ok(())
    }

    /// Moderate, store and persist the idea.
    pub async fn submit(
        &self,
        workflow: &mut IdeationWorkflow,
        user_id: &str,
    ) -> Result<Idea, CoreError> {
        let mut next = workflow.clone();
        next.apply(IdeationEvent::StartSubmit)?;

        let generated_image = next
            .image()
            .map(|image| image.data_uri.clone())
            .ok_or_else(|| CoreError::Internal("Submitting workflow has no image".to_string()))?;
        let submission = IdeaSubmission {
            project_reference: next.project().reference.clone(),
            title: next.title().to_string(),
            description: next.description().to_string(),
            generated_image,
            user_id: user_id.to_string(),
        };

        let outcome = match self.submitter.submit(submission).await {
            Ok(idea) => {
                next.apply(IdeationEvent::SubmitSucceeded { idea_id: idea.id })?;
                Ok(idea)
            }
            Err(err) => {
                next.apply(IdeationEvent::SubmitFailed {
                    error: user_message(&err),
                })?;
                Err(err)
            }
        };
        *workflow = next;
        outcome
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
