//! Request handlers.
//!
//! Handlers delegate to the repositories in `commonground_db` and the
//! ideation services in `commonground_ideation`, and map errors via
//! [`AppError`](crate::error::AppError).

pub mod ideation;
pub mod info;
pub mod project;
pub mod session;
