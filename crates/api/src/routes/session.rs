//! Route definitions for `/ideation/sessions`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/ideation/sessions`.
///
/// ```text
/// POST   /                              -> create
/// GET    /{id}                          -> get
/// DELETE /{id}                          -> delete
/// POST   /{id}/generate                 -> generate
/// POST   /{id}/check                    -> check
/// PUT    /{id}/details                  -> update_details
/// POST   /{id}/submit                   -> submit
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(session::create))
        .route("/{id}", get(session::get).delete(session::delete))
        .route("/{id}/generate", post(session::generate))
        .route("/{id}/check", post(session::check))
        .route("/{id}/details", put(session::update_details))
        .route("/{id}/submit", post(session::submit))
}
