//! Reality-check results and idea analysis types.
//!
//! A reality check classifies a user's idea against each of a project's
//! limitations. Results are advisory and never persisted.

use serde::{Deserialize, Serialize};

/// Reasoning attached to every limitation when the analysis could not run.
pub const FALLBACK_REASONING: &str =
    "The AI analysis could not be completed. Please review this limitation manually.";

/// Reasoning for a limitation the model skipped in an otherwise valid answer.
pub const UNASSESSED_REASONING: &str =
    "The AI analysis did not assess this limitation. Please review it manually.";

/// Fallback title used by the stand-alone details suggestion.
pub const FALLBACK_DETAILS_TITLE: &str = "A New Vision";

/// Compliance classification of an idea against a single limitation.
///
/// The serialized names are the exact strings the model is asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitationStatus {
    /// The idea clearly complies.
    Check,
    /// Unclear or potentially conflicting; needs human review.
    Depending,
    /// The idea almost certainly violates the limitation.
    Violation,
}

/// Outcome of checking one limitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitationCheck {
    pub limitation: String,
    pub status: LimitationStatus,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Suggested title and description for an idea.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaDetails {
    pub title: String,
    pub description: String,
}

/// Combined reality check and details suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdeaAnalysis {
    pub checks: Vec<LimitationCheck>,
    pub suggested_title: String,
    pub suggested_description: String,
}

impl IdeaAnalysis {
    /// Analysis used when the model could not be consulted: every limitation
    /// needs manual review and the user's own words become the description.
    pub fn fallback(limitations: &[String], project_title: &str, prompt: &str) -> Self {
        Self {
            checks: fallback_checks(limitations),
            suggested_title: fallback_analysis_title(project_title),
            suggested_description: prompt.to_string(),
        }
    }
}

/// Fallback title for an analysed idea.
pub fn fallback_analysis_title(project_title: &str) -> String {
    format!("A new vision for {project_title}")
}

/// Mark every limitation as `Depending` with the manual-review reasoning.
pub fn fallback_checks(limitations: &[String]) -> Vec<LimitationCheck> {
    limitations
        .iter()
        .map(|limitation| LimitationCheck {
            limitation: limitation.clone(),
            status: LimitationStatus::Depending,
            reasoning: Some(FALLBACK_REASONING.to_string()),
        })
        .collect()
}

/// Align model output with the requested limitations.
///
/// The result holds exactly one entry per input limitation, in input order,
/// carrying the input text verbatim. Model entries are matched by trimmed
/// text first; when nothing matches and the model answered with the same
/// number of entries, the entry at the same position is used. Limitations
/// left without an answer become `Depending`.
pub fn reconcile_checks(
    limitations: &[String],
    model: Vec<LimitationCheck>,
) -> Vec<LimitationCheck> {
    let positional = model.len() == limitations.len();
    let mut pool: Vec<Option<LimitationCheck>> = model.into_iter().map(Some).collect();

    limitations
        .iter()
        .enumerate()
        .map(|(index, limitation)| {
            let wanted = limitation.trim();
            let by_text = pool.iter().position(|entry| {
                entry
                    .as_ref()
                    .is_some_and(|e| e.limitation.trim() == wanted)
            });
            let slot = by_text.or_else(|| {
                (positional && pool[index].is_some()).then_some(index)
            });

            match slot.and_then(|i| pool[i].take()) {
                Some(found) => LimitationCheck {
                    limitation: limitation.clone(),
                    status: found.status,
                    reasoning: found.reasoning,
                },
                None => LimitationCheck {
                    limitation: limitation.clone(),
                    status: LimitationStatus::Depending,
                    reasoning: Some(UNASSESSED_REASONING.to_string()),
                },
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn check(limitation: &str, status: LimitationStatus) -> LimitationCheck {
        LimitationCheck {
            limitation: limitation.to_string(),
            status,
            reasoning: Some(format!("because {limitation}")),
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fallback_marks_everything_depending() {
        let checks = fallback_checks(&strings(&["budget <$100k", "keep trees"]));
        assert_eq!(checks.len(), 2);
        for c in &checks {
            assert_eq!(c.status, LimitationStatus::Depending);
            assert_eq!(c.reasoning.as_deref(), Some(FALLBACK_REASONING));
        }
        assert_eq!(checks[0].limitation, "budget <$100k");
    }

    #[test]
    fn fallback_analysis_uses_prompt_and_project_title() {
        let analysis =
            IdeaAnalysis::fallback(&strings(&["a"]), "Sponge City Park", "add solar panels");
        assert_eq!(analysis.suggested_title, "A new vision for Sponge City Park");
        assert_eq!(analysis.suggested_description, "add solar panels");
        assert_eq!(analysis.checks.len(), 1);
    }

    #[test]
    fn reconcile_matches_by_text_in_any_order() {
        let limitations = strings(&["Budget max 2.5M", "Keep mature trees"]);
        let model = vec![
            check("Keep mature trees", LimitationStatus::Violation),
            check("  Budget max 2.5M ", LimitationStatus::Check),
        ];
        let out = reconcile_checks(&limitations, model);
        assert_eq!(out[0].limitation, "Budget max 2.5M");
        assert_eq!(out[0].status, LimitationStatus::Check);
        assert_eq!(out[1].limitation, "Keep mature trees");
        assert_eq!(out[1].status, LimitationStatus::Violation);
    }

    #[test]
    fn reconcile_falls_back_to_position_when_counts_agree() {
        let limitations = strings(&["budget <$100k"]);
        let model = vec![check("Budget below 100k", LimitationStatus::Check)];
        let out = reconcile_checks(&limitations, model);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].limitation, "budget <$100k");
        assert_eq!(out[0].status, LimitationStatus::Check);
    }

    #[test]
    fn reconcile_fills_missing_and_drops_extra_entries() {
        let limitations = strings(&["a", "b"]);
        let model = vec![
            check("a", LimitationStatus::Check),
            check("x", LimitationStatus::Violation),
            check("y", LimitationStatus::Violation),
        ];
        let out = reconcile_checks(&limitations, model);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].status, LimitationStatus::Check);
        assert_eq!(out[1].limitation, "b");
        assert_eq!(out[1].status, LimitationStatus::Depending);
        assert_eq!(out[1].reasoning.as_deref(), Some(UNASSESSED_REASONING));
    }

    #[test]
    fn reconcile_of_empty_limitations_is_empty() {
        let out = reconcile_checks(&[], vec![check("a", LimitationStatus::Check)]);
        assert!(out.is_empty());
    }

    #[test]
    fn status_serializes_to_exact_model_strings() {
        assert_eq!(serde_json::to_string(&LimitationStatus::Check).unwrap(), "\"Check\"");
        assert_eq!(
            serde_json::to_string(&LimitationStatus::Depending).unwrap(),
            "\"Depending\""
        );
        assert_eq!(
            serde_json::to_string(&LimitationStatus::Violation).unwrap(),
            "\"Violation\""
        );
    }
}
