//! Repository for the `projects` table.

use commonground_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::project::{Project, ProjectSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, reference, title, short_description, full_description, category, \
     image, deadline, limitations, address, latitude, longitude, created_at";

/// Read-only access to projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Find a project by its public reference.
    pub async fn find_by_reference(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE reference = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(reference)
            .fetch_optional(pool)
            .await
    }

    /// All projects with their idea counts, soonest deadline first.
    pub async fn list_with_idea_counts(pool: &PgPool) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                (SELECT COUNT(*) FROM ideas i WHERE i.project_reference = projects.reference)
                    AS idea_count
             FROM projects
             ORDER BY deadline ASC, title ASC"
        );
        sqlx::query_as::<_, ProjectSummary>(&query)
            .fetch_all(pool)
            .await
    }

    /// Number of projects whose deadline has passed.
    pub async fn count_completed(pool: &PgPool, now: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE deadline < $1")
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Projects that have coordinates, for the map feed.
    pub async fn list_located(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE latitude IS NOT NULL AND longitude IS NOT NULL
             ORDER BY title"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }
}
