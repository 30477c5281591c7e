#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Content was screened by moderation and must be revised by the user.
    #[error("Content rejected: {0}")]
    ContentRejected(String),

    /// A provider required by the operation has no credentials configured.
    #[error("Provider not configured: {0}")]
    ProviderUnavailable(String),

    /// An external provider failed or answered with something unusable.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
