//! Domain types and pure logic for the Common Ground ideation service.
//!
//! Nothing in this crate performs I/O. Provider clients, persistence and the
//! HTTP layer live in sibling crates and build on the types defined here.

pub mod ai_response;
pub mod analysis;
pub mod error;
pub mod ideation;
pub mod image_data;
pub mod moderation;
pub mod naming;
pub mod project;
pub mod prompts;
pub mod types;
pub mod validation;
