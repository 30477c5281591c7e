//! Object names for stored idea images.

use sha2::{Digest, Sha256};

use crate::types::Timestamp;

/// Reduce a project reference to `[a-z0-9-]`, collapsing other runs into `-`.
pub fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "project".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Short hex digest of the image content.
pub fn content_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// `idea-<reference>-<digest>-<unix millis>.<ext>`
pub fn stored_image_name(
    project_reference: &str,
    bytes: &[u8],
    extension: &str,
    now: Timestamp,
) -> String {
    format!(
        "idea-{}-{}-{}.{}",
        sanitize_segment(project_reference),
        content_digest(bytes),
        now.timestamp_millis(),
        extension
    )
}
