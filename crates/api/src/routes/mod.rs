pub mod health;
pub mod ideation;
pub mod project;
pub mod session;

use axum::routing::get;
use axum::Router;

use crate::handlers::info;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                   list
/// /projects/{reference}                       get
/// /projects/{reference}/ideas                 list ideas, newest first
/// /projects/{reference}/ideas/{id}            get idea
///
/// /stats                                      platform counters
/// /map                                        tile settings and located projects
///
/// /generate-image                             generate an image (POST)
/// /analyze-idea                               reality check and details (POST)
/// /reality-check                              reality check only (POST)
/// /generate-details                           title and description (POST)
/// /moderate-content                           screen text (POST)
/// /submit-idea                                moderate, store, insert (POST)
///
/// /ideation/sessions                          create (POST)
/// /ideation/sessions/{id}                     get, delete
/// /ideation/sessions/{id}/generate            generation step (POST)
/// /ideation/sessions/{id}/check               check step (POST)
/// /ideation/sessions/{id}/details             edit title and description (PUT)
/// /ideation/sessions/{id}/submit              submit step (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .route("/stats", get(info::stats))
        .route("/map", get(info::map))
        .merge(ideation::router())
        .nest("/ideation/sessions", session::router())
}
