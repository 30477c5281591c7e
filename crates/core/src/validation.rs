//! Boundary validation for user-supplied text.

use crate::error::CoreError;

/// Maximum length of an enhancement prompt in characters.
pub const MAX_PROMPT_LENGTH: usize = 2_000;

/// Maximum length of an idea title in characters.
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum length of an idea description in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

/// Maximum number of limitations accepted in one reality check.
pub const MAX_LIMITATIONS: usize = 50;

/// Maximum length of a project reference.
pub const MAX_REFERENCE_LENGTH: usize = 100;

fn require_bounded(value: &str, field: &str, max: usize) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    let len = value.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "{field} exceeds maximum length of {max} characters (got {len})"
        )));
    }
    Ok(())
}

pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    require_bounded(prompt, "Prompt", MAX_PROMPT_LENGTH)
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    require_bounded(title, "Title", MAX_TITLE_LENGTH)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    require_bounded(description, "Description", MAX_DESCRIPTION_LENGTH)
}

pub fn validate_project_reference(reference: &str) -> Result<(), CoreError> {
    require_bounded(reference, "Project reference", MAX_REFERENCE_LENGTH)
}

/// Limitations must be few enough to fit one prompt and none may be blank.
pub fn validate_limitations(limitations: &[String]) -> Result<(), CoreError> {
    if limitations.len() > MAX_LIMITATIONS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_LIMITATIONS} limitations can be checked at once (got {})",
            limitations.len()
        )));
    }
    if limitations.iter().any(|l| l.trim().is_empty()) {
        return Err(CoreError::Validation(
            "Limitations must not be blank".to_string(),
        ));
    }
    Ok(())
}
