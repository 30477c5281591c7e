//! Idea entity model and DTOs.

use commonground_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ideas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Idea {
    pub id: DbId,
    pub project_reference: String,
    pub title: String,
    pub description: String,
    pub generated_image: String,
    /// Anonymous cookie id of the submitter. Never exposed over the API.
    #[serde(skip_serializing)]
    pub user_id: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a new idea.
#[derive(Debug, Clone)]
pub struct CreateIdea {
    pub project_reference: String,
    pub title: String,
    pub description: String,
    pub generated_image: String,
    pub user_id: String,
}
