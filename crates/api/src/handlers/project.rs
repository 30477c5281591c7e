//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use commonground_core::error::CoreError;
use commonground_core::project::{days_left, ProjectStatus};
use commonground_core::types::DbId;
use commonground_db::models::idea::Idea;
use commonground_db::models::project::{Project, ProjectSummary};
use commonground_db::repositories::{IdeaRepo, ProjectRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A project with its derived status and idea count.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub status: ProjectStatus,
    pub days_left: i64,
    pub idea_count: i64,
}

impl ProjectView {
    fn new(project: Project, idea_count: i64) -> Self {
        let now = Utc::now();
        Self {
            status: project.status(now),
            days_left: days_left(project.deadline, now),
            project,
            idea_count,
        }
    }
}

impl From<ProjectSummary> for ProjectView {
    fn from(summary: ProjectSummary) -> Self {
        Self::new(summary.project, summary.idea_count)
    }
}

pub(crate) async fn require_project(state: &AppState, reference: &str) -> AppResult<Project> {
    ProjectRepo::find_by_reference(&state.pool, reference)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: reference.to_string(),
            })
        })
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectView>>>> {
    let projects = ProjectRepo::list_with_idea_counts(&state.pool).await?;
    Ok(Json(DataResponse {
        data: projects.into_iter().map(ProjectView::from).collect(),
    }))
}

/// GET /api/v1/projects/{reference}
pub async fn get_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let project = require_project(&state, &reference).await?;
    let idea_count = IdeaRepo::count_for_project(&state.pool, &reference).await?;
    Ok(Json(DataResponse {
        data: ProjectView::new(project, idea_count),
    }))
}

/// GET /api/v1/projects/{reference}/ideas
pub async fn list_ideas(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<DataResponse<Vec<Idea>>>> {
    require_project(&state, &reference).await?;
    let ideas = IdeaRepo::list_for_project(&state.pool, &reference).await?;
    Ok(Json(DataResponse { data: ideas }))
}

/// GET /api/v1/projects/{reference}/ideas/{id}
pub async fn get_idea(
    State(state): State<AppState>,
    Path((reference, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<Idea>>> {
    let idea = IdeaRepo::find_for_project(&state.pool, &reference, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Idea",
            id: id.to_string(),
        }))?;
    Ok(Json(DataResponse { data: idea }))
}
