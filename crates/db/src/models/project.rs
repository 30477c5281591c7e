//! Project entity model.

use commonground_core::ideation::ProjectContext;
use commonground_core::project::{project_status, ProjectCategory, ProjectStatus};
use commonground_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub reference: String,
    pub title: String,
    pub short_description: String,
    pub full_description: Option<String>,
    #[sqlx(try_from = "String")]
    pub category: ProjectCategory,
    pub image: String,
    pub deadline: Timestamp,
    pub limitations: Option<Vec<String>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
}

impl Project {
    pub fn status(&self, now: Timestamp) -> ProjectStatus {
        project_status(Some(self.deadline), now)
    }

    /// Limitations with a missing column treated as an empty list.
    pub fn limitation_list(&self) -> &[String] {
        self.limitations.as_deref().unwrap_or_default()
    }

    /// The subset of fields an ideation workflow carries. Blank limitations
    /// are dropped; a project made only of blank entries has none to check.
    pub fn ideation_context(&self) -> ProjectContext {
        ProjectContext {
            reference: self.reference.clone(),
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            image: self.image.clone(),
            limitations: self
                .limitation_list()
                .iter()
                .map(|limitation| limitation.trim())
                .filter(|limitation| !limitation.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

/// A project with the number of ideas submitted for it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub idea_count: i64,
}
