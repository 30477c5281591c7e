//! Project categories and the deadline-derived project status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Thematic category of a municipal project.
///
/// Stored as text in the `projects.category` column using the display
/// labels below (note the space in `"Mixed Space"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectCategory {
    Environment,
    Mobility,
    Culture,
    Residential,
    Economy,
    Social,
    #[serde(rename = "Mixed Space")]
    MixedSpace,
}

/// All categories in display order.
pub const CATEGORIES: [ProjectCategory; 7] = [
    ProjectCategory::Environment,
    ProjectCategory::Mobility,
    ProjectCategory::Culture,
    ProjectCategory::Residential,
    ProjectCategory::Economy,
    ProjectCategory::Social,
    ProjectCategory::MixedSpace,
];

impl ProjectCategory {
    /// Parse the label stored in the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        CATEGORIES
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid project category '{s}'. Must be one of: {}",
                    CATEGORIES.map(|c| c.as_str()).join(", ")
                ))
            })
    }

    /// Database and display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "Environment",
            Self::Mobility => "Mobility",
            Self::Culture => "Culture",
            Self::Residential => "Residential",
            Self::Economy => "Economy",
            Self::Social => "Social",
            Self::MixedSpace => "Mixed Space",
        }
    }
}

/// Column decoding for `projects.category`.
impl TryFrom<String> for ProjectCategory {
    type Error = CoreError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::from_str_db(&label)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Whether a project still accepts ideas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectStatus {
    Active,
    Expired,
}

/// Derive the status from a deadline: a project without a deadline, or whose
/// deadline lies after `now`, is active.
pub fn project_status(deadline: Option<Timestamp>, now: Timestamp) -> ProjectStatus {
    match deadline {
        Some(deadline) if deadline <= now => ProjectStatus::Expired,
        _ => ProjectStatus::Active,
    }
}

/// Whole days until the deadline, rounded up. Negative once expired.
pub fn days_left(deadline: Timestamp, now: Timestamp) -> i64 {
    let secs = (deadline - now).num_seconds();
    let day = 86_400;
    if secs > 0 {
        (secs + day - 1) / day
    } else {
        secs / day
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
