//! Stateless ideation endpoints: one provider-backed operation per call.
//!
//! The session endpoints in [`super::session`] drive the same operations
//! through the workflow state machine.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use commonground_core::analysis::LimitationCheck;
use commonground_core::error::CoreError;
use commonground_core::types::DbId;
use commonground_ideation::IdeaSubmission;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::project::require_project;
use crate::middleware::anonymous_user::AnonymousUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Frames the prompt around this project and, without `source_image`,
    /// edits the project's photo.
    pub project_reference: Option<String>,
    /// Image to edit: a `data:` URI, an absolute URL or a site path.
    pub source_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    /// `data:` URI of the generated image.
    pub image_url: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeIdeaRequest {
    pub prompt: String,
    #[serde(default)]
    pub limitations: Vec<String>,
    pub project_title: String,
    #[serde(default)]
    pub project_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeIdeaResponse {
    pub suggested_title: String,
    pub suggested_description: String,
    pub reality_check_results: Vec<LimitationCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RealityCheckRequest {
    pub prompt: String,
    #[serde(default)]
    pub limitations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RealityCheckResponse {
    pub results: Vec<LimitationCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateDetailsRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateDetailsResponse {
    pub suggested_title: String,
    pub suggested_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModerateContentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ModerateContentResponse {
    pub is_safe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitIdeaRequest {
    pub title: String,
    pub description: String,
    pub generated_image: String,
    pub project_reference: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitIdeaResponse {
    pub idea_id: DbId,
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/generate-image
pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<GenerateImageResponse>>> {
    let Json(input) = payload?;

    let project = match input.project_reference.as_deref() {
        Some(reference) => Some(require_project(&state, reference).await?),
        None => None,
    };
    let source = input
        .source_image
        .as_deref()
        .or(project.as_ref().map(|p| p.image.as_str()));

    let image = state
        .orchestrator
        .generation()
        .generate(
            &input.prompt,
            source,
            project.as_ref().map(|p| p.title.as_str()),
        )
        .await
        .map_err(CoreError::from)?;

    Ok(Json(DataResponse {
        data: GenerateImageResponse {
            image_url: image.data_uri,
            mime_type: image.mime_type,
        },
    }))
}

/// POST /api/v1/analyze-idea
pub async fn analyze_idea(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeIdeaRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<AnalyzeIdeaResponse>>> {
    let Json(input) = payload?;
    let outcome = state
        .orchestrator
        .analysis()
        .analyze_idea(
            &input.prompt,
            &input.limitations,
            &input.project_title,
            &input.project_description,
        )
        .await?;

    Ok(Json(DataResponse {
        data: AnalyzeIdeaResponse {
            suggested_title: outcome.value.suggested_title,
            suggested_description: outcome.value.suggested_description,
            reality_check_results: outcome.value.checks,
            fallback_reason: outcome.fallback_reason,
        },
    }))
}

/// POST /api/v1/reality-check
pub async fn reality_check(
    State(state): State<AppState>,
    payload: Result<Json<RealityCheckRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<RealityCheckResponse>>> {
    let Json(input) = payload?;
    let outcome = state
        .orchestrator
        .analysis()
        .reality_check(&input.prompt, &input.limitations)
        .await?;

    Ok(Json(DataResponse {
        data: RealityCheckResponse {
            results: outcome.value,
            fallback_reason: outcome.fallback_reason,
        },
    }))
}

/// POST /api/v1/generate-details
pub async fn generate_details(
    State(state): State<AppState>,
    payload: Result<Json<GenerateDetailsRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<GenerateDetailsResponse>>> {
    let Json(input) = payload?;
    let outcome = state
        .orchestrator
        .analysis()
        .suggest_details(&input.prompt)
        .await?;

    Ok(Json(DataResponse {
        data: GenerateDetailsResponse {
            suggested_title: outcome.value.title,
            suggested_description: outcome.value.description,
            fallback_reason: outcome.fallback_reason,
        },
    }))
}

/// POST /api/v1/moderate-content
///
/// Flagged content is a normal answer (`is_safe: false`), not an error.
pub async fn moderate_content(
    State(state): State<AppState>,
    payload: Result<Json<ModerateContentRequest>, JsonRejection>,
) -> AppResult<Json<DataResponse<ModerateContentResponse>>> {
    let Json(input) = payload?;
    let verdict = state
        .orchestrator
        .moderation()
        .moderate(&input.title, &input.description)
        .await?;

    Ok(Json(DataResponse {
        data: ModerateContentResponse {
            is_safe: verdict.is_safe(),
            reason: verdict.reason().map(str::to_string),
        },
    }))
}

/// POST /api/v1/submit-idea
///
/// Moderation runs again here; flagged content answers 422.
pub async fn submit_idea(
    State(state): State<AppState>,
    user: AnonymousUser,
    payload: Result<Json<SubmitIdeaRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<SubmitIdeaResponse>>)> {
    let Json(input) = payload?;
    let idea = state
        .orchestrator
        .submitter()
        .submit(IdeaSubmission {
            project_reference: input.project_reference,
            title: input.title,
            description: input.description,
            generated_image: input.generated_image,
            user_id: user.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitIdeaResponse {
                idea_id: idea.id,
                image_url: idea.generated_image,
            },
        }),
    ))
}
