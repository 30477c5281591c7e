//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod idea_repo;
pub mod project_repo;

pub use idea_repo::IdeaRepo;
pub use project_repo::ProjectRepo;
