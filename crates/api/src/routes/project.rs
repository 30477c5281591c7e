//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                              -> list
/// GET    /{reference}                   -> get_by_reference
/// GET    /{reference}/ideas             -> list_ideas
/// GET    /{reference}/ideas/{id}        -> get_idea
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list))
        .route("/{reference}", get(project::get_by_reference))
        .route("/{reference}/ideas", get(project::list_ideas))
        .route("/{reference}/ideas/{id}", get(project::get_idea))
}
