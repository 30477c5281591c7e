//! Ideation workflow state machine.
//!
//! An ideation session walks one user through three steps for a single
//! project: generate a vision image, reality-check it against the project's
//! limitations, and submit it as an idea. [`next_stage`] is the complete
//! transition table; [`IdeationWorkflow::apply`] enforces it together with
//! the per-event guards and keeps the data each stage produced.
//!
//! Stages ending in `ing` are in flight: the caller has started a provider
//! call and must finish it with the matching success or failure event.

use serde::{Deserialize, Serialize};

use crate::analysis::{fallback_analysis_title, IdeaAnalysis};
use crate::error::CoreError;
use crate::prompts::join_prompt_history;
use crate::types::DbId;
use crate::validation;

// ---------------------------------------------------------------------------
// Stages and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeationStage {
    Idle,
    Generating,
    GenerationFailed,
    ImageReady,
    Checking,
    Checked,
    CheckFailed,
    Submitting,
    SubmitFailed,
    Submitted,
}

impl IdeationStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::GenerationFailed => "generation_failed",
            Self::ImageReady => "image_ready",
            Self::Checking => "checking",
            Self::Checked => "checked",
            Self::CheckFailed => "check_failed",
            Self::Submitting => "submitting",
            Self::SubmitFailed => "submit_failed",
            Self::Submitted => "submitted",
        }
    }

    /// A provider call is outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Generating | Self::Checking | Self::Submitting)
    }

    /// Title and description may be edited.
    pub fn accepts_details(self) -> bool {
        matches!(self, Self::Checked | Self::CheckFailed | Self::SubmitFailed)
    }
}

/// Event names, used by the transition table and in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    StartGeneration,
    GenerationSucceeded,
    GenerationFailed,
    StartCheck,
    SkipCheck,
    CheckSucceeded,
    CheckFailed,
    StartSubmit,
    SubmitSucceeded,
    SubmitFailed,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartGeneration => "start_generation",
            Self::GenerationSucceeded => "generation_succeeded",
            Self::GenerationFailed => "generation_failed",
            Self::StartCheck => "start_check",
            Self::SkipCheck => "skip_check",
            Self::CheckSucceeded => "check_succeeded",
            Self::CheckFailed => "check_failed",
            Self::StartSubmit => "start_submit",
            Self::SubmitSucceeded => "submit_succeeded",
            Self::SubmitFailed => "submit_failed",
        }
    }
}

/// The transition table. `None` means the event is illegal in `from`.
pub fn next_stage(from: IdeationStage, event: EventKind) -> Option<IdeationStage> {
    use EventKind as E;
    use IdeationStage as S;

    match (from, event) {
        (
            S::Idle | S::GenerationFailed | S::ImageReady | S::Checked | S::CheckFailed
            | S::SubmitFailed,
            E::StartGeneration,
        ) => Some(S::Generating),
        (S::Generating, E::GenerationSucceeded) => Some(S::ImageReady),
        (S::Generating, E::GenerationFailed) => Some(S::GenerationFailed),

        (S::ImageReady | S::Checked | S::CheckFailed | S::GenerationFailed, E::StartCheck) => {
            Some(S::Checking)
        }
        (S::ImageReady, E::SkipCheck) => Some(S::Checked),
        (S::Checking, E::CheckSucceeded) => Some(S::Checked),
        (S::Checking, E::CheckFailed) => Some(S::CheckFailed),

        (S::Checked | S::CheckFailed | S::SubmitFailed, E::StartSubmit) => Some(S::Submitting),
        (S::Submitting, E::SubmitSucceeded) => Some(S::Submitted),
        (S::Submitting, E::SubmitFailed) => Some(S::SubmitFailed),

        _ => None,
    }
}

/// A generated image, kept as the data URI the model produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedImage {
    pub data_uri: String,
    pub mime_type: String,
}

/// Input for a workflow transition, carrying the data the step produced.
#[derive(Debug, Clone)]
pub enum IdeationEvent {
    StartGeneration { prompt: String },
    GenerationSucceeded { image: GeneratedImage },
    GenerationFailed { error: String },
    StartCheck,
    SkipCheck,
    CheckSucceeded { analysis: IdeaAnalysis },
    CheckFailed { error: String, fallback: IdeaAnalysis },
    StartSubmit,
    SubmitSucceeded { idea_id: DbId },
    SubmitFailed { error: String },
}

impl IdeationEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::StartGeneration { .. } => EventKind::StartGeneration,
            Self::GenerationSucceeded { .. } => EventKind::GenerationSucceeded,
            Self::GenerationFailed { .. } => EventKind::GenerationFailed,
            Self::StartCheck => EventKind::StartCheck,
            Self::SkipCheck => EventKind::SkipCheck,
            Self::CheckSucceeded { .. } => EventKind::CheckSucceeded,
            Self::CheckFailed { .. } => EventKind::CheckFailed,
            Self::StartSubmit => EventKind::StartSubmit,
            Self::SubmitSucceeded { .. } => EventKind::SubmitSucceeded,
            Self::SubmitFailed { .. } => EventKind::SubmitFailed,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Which image the next generation edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseImage {
    /// The project's own photo.
    Original,
    /// The most recently generated image.
    Last,
}

/// The project facts a workflow needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectContext {
    pub reference: String,
    pub title: String,
    pub short_description: String,
    pub image: String,
    pub limitations: Vec<String>,
}

/// State of one ideation session.
#[derive(Debug, Clone)]
pub struct IdeationWorkflow {
    project: ProjectContext,
    stage: IdeationStage,
    base_image: BaseImage,
    pending_prompt: Option<String>,
    prompt_history: Vec<String>,
    image: Option<GeneratedImage>,
    analysis: Option<IdeaAnalysis>,
    title: String,
    description: String,
    last_error: Option<String>,
    idea_id: Option<DbId>,
}

impl IdeationWorkflow {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            stage: IdeationStage::Idle,
            base_image: BaseImage::Original,
            pending_prompt: None,
            prompt_history: Vec::new(),
            image: None,
            analysis: None,
            title: String::new(),
            description: String::new(),
            last_error: None,
            idea_id: None,
        }
    }

    pub fn stage(&self) -> IdeationStage {
        self.stage
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    pub fn base_image(&self) -> BaseImage {
        self.base_image
    }

    pub fn prompt_history(&self) -> &[String] {
        &self.prompt_history
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        self.image.as_ref()
    }

    pub fn analysis(&self) -> Option<&IdeaAnalysis> {
        self.analysis.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn idea_id(&self) -> Option<DbId> {
        self.idea_id
    }

    /// The image reference the next generation should edit.
    pub fn source_image(&self) -> &str {
        match (self.base_image, &self.image) {
            (BaseImage::Last, Some(image)) => &image.data_uri,
            _ => &self.project.image,
        }
    }

    /// All prompts so far, joined for analysis.
    pub fn analysis_prompt(&self) -> String {
        join_prompt_history(&self.prompt_history)
    }

    /// The reality check may be skipped only when there is nothing to check.
    pub fn can_skip_check(&self) -> bool {
        self.project.limitations.is_empty()
    }

    /// Submit is reachable: a check stage with an image and filled details.
    pub fn can_submit(&self) -> bool {
        next_stage(self.stage, EventKind::StartSubmit).is_some()
            && self.image.is_some()
            && !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
    }

    /// Choose which image the next generation edits.
    pub fn select_base_image(&mut self, base: BaseImage) -> Result<(), CoreError> {
        if self.stage.is_in_flight() || self.stage == IdeationStage::Submitted {
            return Err(self.illegal("select_base_image"));
        }
        if base == BaseImage::Last && self.image.is_none() {
            return Err(CoreError::Validation(
                "No generated image to build on yet".to_string(),
            ));
        }
        self.base_image = base;
        Ok(())
    }

    /// Edit the title and description before submitting.
    pub fn set_details(&mut self, title: &str, description: &str) -> Result<(), CoreError> {
        if !self.stage.accepts_details() {
            return Err(self.illegal("set_details"));
        }
        validation::validate_title(title)?;
        validation::validate_description(description)?;
        self.title = title.trim().to_string();
        self.description = description.trim().to_string();
        Ok(())
    }

    /// Apply an event, enforcing the transition table and event guards.
    pub fn apply(&mut self, event: IdeationEvent) -> Result<IdeationStage, CoreError> {
        let kind = event.kind();
        let next = next_stage(self.stage, kind).ok_or_else(|| self.illegal(kind.as_str()))?;
        self.check_guard(&event)?;

        match event {
            IdeationEvent::StartGeneration { prompt } => {
                self.pending_prompt = Some(prompt.trim().to_string());
                self.analysis = None;
                self.title.clear();
                self.description.clear();
                self.last_error = None;
            }
            IdeationEvent::GenerationSucceeded { image } => {
                self.image = Some(image);
                self.base_image = BaseImage::Last;
                if let Some(prompt) = self.pending_prompt.take() {
                    self.prompt_history.push(prompt);
                }
            }
            IdeationEvent::GenerationFailed { error } => {
                self.pending_prompt = None;
                self.last_error = Some(error);
            }
            IdeationEvent::StartCheck => {
                self.analysis = None;
                self.title.clear();
                self.description.clear();
                self.last_error = None;
            }
            IdeationEvent::SkipCheck => {
                let latest = self.prompt_history.last().cloned().unwrap_or_default();
                self.title = fallback_analysis_title(&self.project.title);
                self.description = latest.clone();
                self.analysis = Some(IdeaAnalysis {
                    checks: Vec::new(),
                    suggested_title: self.title.clone(),
                    suggested_description: latest,
                });
            }
            IdeationEvent::CheckSucceeded { analysis } => {
                self.title = analysis.suggested_title.clone();
                self.description = analysis.suggested_description.clone();
                self.analysis = Some(analysis);
            }
            IdeationEvent::CheckFailed { error, fallback } => {
                self.title = fallback.suggested_title.clone();
                self.description = fallback.suggested_description.clone();
                self.analysis = Some(fallback);
                self.last_error = Some(error);
            }
            IdeationEvent::StartSubmit => {
                self.last_error = None;
            }
            IdeationEvent::SubmitSucceeded { idea_id } => {
                self.idea_id = Some(idea_id);
            }
            IdeationEvent::SubmitFailed { error } => {
                self.last_error = Some(error);
            }
        }

        self.stage = next;
        Ok(next)
    }

    fn check_guard(&self, event: &IdeationEvent) -> Result<(), CoreError> {
        match event {
            IdeationEvent::StartGeneration { prompt } => validation::validate_prompt(prompt),
            IdeationEvent::StartCheck if self.image.is_none() => Err(CoreError::Conflict(
                "Generate an image before running the reality check".to_string(),
            )),
            IdeationEvent::SkipCheck if !self.can_skip_check() => Err(CoreError::Conflict(
                "The reality check can only be skipped for projects without limitations"
                    .to_string(),
            )),
            IdeationEvent::StartSubmit => {
                if self.image.is_none() {
                    return Err(CoreError::Conflict(
                        "Generate an image before submitting".to_string(),
                    ));
                }
                validation::validate_title(&self.title)?;
                validation::validate_description(&self.description)
            }
            _ => Ok(()),
        }
    }

    fn illegal(&self, action: &str) -> CoreError {
        CoreError::Conflict(format!(
            "Cannot {action} while the ideation session is '{}'",
            self.stage.as_str()
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
