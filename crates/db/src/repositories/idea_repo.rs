//! Repository for the `ideas` table.

use commonground_core::types::DbId;
use sqlx::PgPool;

use crate::models::idea::{CreateIdea, Idea};

const COLUMNS: &str =
    "id, project_reference, title, description, generated_image, user_id, created_at";

/// Insert and read ideas. Ideas are never updated or deleted.
pub struct IdeaRepo;

impl IdeaRepo {
    /// Insert a new idea, returning the created row with its id.
    ///
    /// Fails with a foreign-key violation (`23503`) when the project
    /// reference does not exist.
    pub async fn create(pool: &PgPool, input: &CreateIdea) -> Result<Idea, sqlx::Error> {
        let query = format!(
            "INSERT INTO ideas (project_reference, title, description, generated_image, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(&input.project_reference)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.generated_image)
            .bind(&input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Ideas for a project, newest first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_reference: &str,
    ) -> Result<Vec<Idea>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ideas
             WHERE project_reference = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(project_reference)
            .fetch_all(pool)
            .await
    }

    /// Find an idea only if it belongs to the given project.
    pub async fn find_for_project(
        pool: &PgPool,
        project_reference: &str,
        id: DbId,
    ) -> Result<Option<Idea>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ideas WHERE id = $1 AND project_reference = $2");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(project_reference)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_for_project(
        pool: &PgPool,
        project_reference: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ideas WHERE project_reference = $1")
            .bind(project_reference)
            .fetch_one(pool)
            .await
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ideas")
            .fetch_one(pool)
            .await
    }
}
