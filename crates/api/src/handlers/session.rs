//! Handlers for `/ideation/sessions`: the ideation workflow driven one step
//! per request.
//!
//! A failed generation or submission is recorded in the session before the
//! error is returned, so a following `GET` shows the failed stage and its
//! message.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use commonground_core::analysis::IdeaAnalysis;
use commonground_core::ideation::{
    BaseImage, GeneratedImage, IdeationStage, IdeationWorkflow, ProjectContext,
};
use commonground_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::project::require_project;
use crate::middleware::anonymous_user::AnonymousUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Client view of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub stage: IdeationStage,
    pub project: ProjectContext,
    pub base_image: BaseImage,
    pub prompt_history: Vec<String>,
    pub image: Option<GeneratedImage>,
    pub analysis: Option<IdeaAnalysis>,
    pub title: String,
    pub description: String,
    pub last_error: Option<String>,
    pub idea_id: Option<DbId>,
    pub can_skip_check: bool,
    pub can_submit: bool,
}

impl SessionView {
    pub fn new(id: Uuid, workflow: &IdeationWorkflow) -> Self {
        Self {
            id,
            stage: workflow.stage(),
            project: workflow.project().clone(),
            base_image: workflow.base_image(),
            prompt_history: workflow.prompt_history().to_vec(),
            image: workflow.image().cloned(),
            analysis: workflow.analysis().cloned(),
            title: workflow.title().to_string(),
            description: workflow.description().to_string(),
            last_error: workflow.last_error().map(str::to_string),
            idea_id: workflow.idea_id(),
            can_skip_check: workflow.can_skip_check(),
            can_submit: workflow.can_submit(),
        }
    }
}

type SessionResponse = AppResult<Json<DataResponse<SessionView>>>;

fn view(id: Uuid, workflow: &IdeationWorkflow) -> Json<DataResponse<SessionView>> {
    Json(DataResponse {
        data: SessionView::new(id, workflow),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateSession {
    pub project_reference: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateStep {
    pub prompt: String,
    /// Switch the image being edited before generating.
    pub base: Option<BaseImage>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsStep {
    pub title: String,
    pub description: String,
}

/// POST /api/v1/ideation/sessions
pub async fn create(
    State(state): State<AppState>,
    user: AnonymousUser,
    payload: Result<Json<CreateSession>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionView>>)> {
    let Json(input) = payload?;
    let project = require_project(&state, &input.project_reference).await?;

    let workflow = IdeationWorkflow::new(project.ideation_context());
    let id = state.sessions.create(&user.id, workflow.clone()).await?;
    tracing::info!(session_id = %id, project = %project.reference, "Ideation session created");

    Ok((StatusCode::CREATED, view(id, &workflow)))
}

/// GET /api/v1/ideation/sessions/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
) -> SessionResponse {
    let session = state.sessions.checkout(id, &user.id).await?;
    Ok(view(id, &session.workflow))
}

/// DELETE /api/v1/ideation/sessions/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.remove(id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/ideation/sessions/{id}/generate
pub async fn generate(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<GenerateStep>, JsonRejection>,
) -> SessionResponse {
    let Json(input) = payload?;
    let mut session = state.sessions.checkout(id, &user.id).await?;
    state
        .orchestrator
        .generate_vision(&mut session.workflow, &input.prompt, input.base)
        .await?;
    Ok(view(id, &session.workflow))
}

/// POST /api/v1/ideation/sessions/{id}/check
///
/// A fresh image of a project without limitations bypasses the model.
pub async fn check(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
) -> SessionResponse {
    let mut session = state.sessions.checkout(id, &user.id).await?;
    let workflow = &session.workflow;
    if workflow.can_skip_check() && workflow.stage() == IdeationStage::ImageReady {
        state.orchestrator.skip_check(&mut session.workflow)?;
    } else {
        state.orchestrator.check(&mut session.workflow).await?;
    }
    Ok(view(id, &session.workflow))
}

/// PUT /api/v1/ideation/sessions/{id}/details
pub async fn update_details(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<DetailsStep>, JsonRejection>,
) -> SessionResponse {
    let Json(input) = payload?;
    let mut session = state.sessions.checkout(id, &user.id).await?;
    session
        .workflow
        .set_details(&input.title, &input.description)?;
    Ok(view(id, &session.workflow))
}

/// POST /api/v1/ideation/sessions/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    user: AnonymousUser,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionView>>)> {
    let mut session = state.sessions.checkout(id, &user.id).await?;
    state
        .orchestrator
        .submit(&mut session.workflow, &user.id)
        .await?;
    Ok((StatusCode::CREATED, view(id, &session.workflow)))
}
