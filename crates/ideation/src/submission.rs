//! Idea submission: validate, moderate, store the image, insert the row.
//!
//! Moderation always runs here, so a client cannot skip it by calling the
//! submit endpoint directly.
//!
//! The image is stored before the row is inserted. A failed insert leaves
//! the stored image without an idea; its name is logged at `warn` for
//! cleanup.

use std::sync::Arc;

use chrono::Utc;
use commonground_core::error::CoreError;
use commonground_core::image_data::InlineImage;
use commonground_core::moderation::ModerationVerdict;
use commonground_core::naming::stored_image_name;
use commonground_core::validation;
use commonground_db::models::idea::{CreateIdea, Idea};
use commonground_db::repositories::{IdeaRepo, ProjectRepo};
use commonground_providers::{ImageStore, StorageError};
use sqlx::PgPool;

use crate::moderation::ModerationGateway;

/// PostgreSQL foreign key violation.
const FK_VIOLATION: &str = "23503";

/// Everything needed to create an idea. `user_id` comes from the anonymous
/// user cookie, never from a request body.
#[derive(Debug, Clone)]
pub struct IdeaSubmission {
    pub project_reference: String,
    pub title: String,
    pub description: String,
    /// `data:` URI of the generated image.
    pub generated_image: String,
    pub user_id: String,
}

fn database_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error during idea submission");
    CoreError::Internal(format!("Database error: {err}"))
}

fn storage_error(err: StorageError) -> CoreError {
    tracing::error!(error = %err, "Image upload failed");
    match err {
        StorageError::Request(_) | StorageError::ApiError { .. } => {
            CoreError::Upstream(format!("Image upload failed: {err}"))
        }
        other => CoreError::Internal(format!("Image upload failed: {other}")),
    }
}

fn project_not_found(reference: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Project",
        id: reference.to_string(),
    }
}

/// Creates ideas.
#[derive(Clone)]
pub struct IdeaSubmitter {
    pool: PgPool,
    store: Arc<dyn ImageStore>,
    moderation: ModerationGateway,
}

impl IdeaSubmitter {
    pub fn new(pool: PgPool, store: Arc<dyn ImageStore>, moderation: ModerationGateway) -> Self {
        Self {
            pool,
            store,
            moderation,
        }
    }

    pub async fn submit(&self, input: IdeaSubmission) -> Result<Idea, CoreError> {
        let title = input.title.trim();
        let description = input.description.trim();
        validation::validate_project_reference(&input.project_reference)?;
        validation::validate_title(title)?;
        validation::validate_description(description)?;
        if input.user_id.trim().is_empty() {
            return Err(CoreError::Validation("User id is required".to_string()));
        }

        let image = InlineImage::from_data_uri(&input.generated_image)?;
        image.dimensions()?;

        ProjectRepo::find_by_reference(&self.pool, &input.project_reference)
            .await
            .map_err(database_error)?
            .ok_or_else(|| project_not_found(&input.project_reference))?;

        if let ModerationVerdict::Flagged { reason, .. } =
            self.moderation.moderate(title, description).await?
        {
            return Err(CoreError::ContentRejected(reason));
        }

        let name = stored_image_name(
            &input.project_reference,
            &image.bytes,
            image.extension(),
            Utc::now(),
        );
        let image_url = self.store.put(&name, &image).await.map_err(storage_error)?;

        let idea = IdeaRepo::create(
            &self.pool,
            &CreateIdea {
                project_reference: input.project_reference.clone(),
                title: title.to_string(),
                description: description.to_string(),
                generated_image: image_url.clone(),
                user_id: input.user_id,
            },
        )
        .await
        .map_err(|e| {
            tracing::warn!(
                image = %name,
                url = %image_url,
                "Stored image left without an idea after a failed insert"
            );
            let unknown_project = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(FK_VIOLATION)
            );
            if unknown_project {
                project_not_found(&input.project_reference)
            } else {
                database_error(e)
            }
        })?;

        tracing::info!(
            idea_id = idea.id,
            project = %idea.project_reference,
            "Idea submitted"
        );
        Ok(idea)
    }
}
