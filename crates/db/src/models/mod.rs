pub mod idea;
pub mod project;
