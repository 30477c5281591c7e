//! Ideation services: the three provider-backed gateways, idea submission
//! and the orchestrator that drives an [`IdeationWorkflow`] one step at a
//! time.
//!
//! [`IdeationWorkflow`]: commonground_core::ideation::IdeationWorkflow

use std::sync::Arc;

use commonground_providers::{GenerativeModel, ImageStore, SourceImageLoader, ToxicityScorer};

pub mod analysis;
pub mod generation;
pub mod moderation;
pub mod orchestrator;
pub mod submission;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{AnalysisGateway, AnalysisOutcome};
pub use generation::{GenerationError, ImageGenerationGateway};
pub use moderation::ModerationGateway;
pub use orchestrator::IdeationOrchestrator;
pub use submission::{IdeaSubmission, IdeaSubmitter};

/// The external services ideation depends on.
#[derive(Clone)]
pub struct Providers {
    pub model: Arc<dyn GenerativeModel>,
    pub scorer: Arc<dyn ToxicityScorer>,
    pub store: Arc<dyn ImageStore>,
    pub source_images: Arc<dyn SourceImageLoader>,
}
