//! Route definitions for the stateless ideation endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::ideation;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// POST   /generate-image                -> generate_image
/// POST   /analyze-idea                  -> analyze_idea
/// POST   /reality-check                 -> reality_check
/// POST   /generate-details              -> generate_details
/// POST   /moderate-content              -> moderate_content
/// POST   /submit-idea                   -> submit_idea
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-image", post(ideation::generate_image))
        .route("/analyze-idea", post(ideation::analyze_idea))
        .route("/reality-check", post(ideation::reality_check))
        .route("/generate-details", post(ideation::generate_details))
        .route("/moderate-content", post(ideation::moderate_content))
        .route("/submit-idea", post(ideation::submit_idea))
}
