//! Toxicity attributes, thresholds and verdict evaluation.
//!
//! Scores come from an external per-attribute scorer; this module only
//! decides what they mean.

use std::collections::HashMap;

use serde::Serialize;

/// Attribute scored by the toxicity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToxicityAttribute {
    Threat,
    SexuallyExplicit,
    IdentityAttack,
    SevereToxicity,
}

/// Attributes requested on every call, in evaluation order.
pub const ATTRIBUTES: [ToxicityAttribute; 4] = [
    ToxicityAttribute::Threat,
    ToxicityAttribute::SexuallyExplicit,
    ToxicityAttribute::IdentityAttack,
    ToxicityAttribute::SevereToxicity,
];

impl ToxicityAttribute {
    /// Name used by the scoring API.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Threat => "THREAT",
            Self::SexuallyExplicit => "SEXUALLY_EXPLICIT",
            Self::IdentityAttack => "IDENTITY_ATTACK",
            Self::SevereToxicity => "SEVERE_TOXICITY",
        }
    }

    /// Score above which content is rejected.
    pub fn threshold(self) -> f64 {
        match self {
            Self::Threat => 0.60,
            Self::SexuallyExplicit => 0.50,
            Self::IdentityAttack => 0.50,
            Self::SevereToxicity => 0.75,
        }
    }

    /// Lower-case words for user-facing messages, e.g. `"severe toxicity"`.
    pub fn label(self) -> String {
        self.api_name().to_lowercase().replace('_', " ")
    }
}

/// Result of screening a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModerationVerdict {
    Safe,
    Flagged {
        attribute: ToxicityAttribute,
        score: f64,
        reason: String,
    },
}

impl ModerationVerdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// User-facing reason, present only when flagged.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Safe => None,
            Self::Flagged { reason, .. } => Some(reason),
        }
    }
}

/// Text submitted for screening, or `None` when there is nothing to screen.
pub fn moderation_text(title: &str, description: &str) -> Option<String> {
    if title.trim().is_empty() && description.trim().is_empty() {
        return None;
    }
    Some(format!("{title}. {description}"))
}

/// User-facing message for content flagged on `attribute`.
pub fn rejection_reason(attribute: ToxicityAttribute) -> String {
    format!(
        "Your idea could not be submitted. The content may have violated our community \
         guidelines regarding \"{}\". Please revise your text and try again.",
        attribute.label()
    )
}

/// Compare scores (keyed by API attribute name) against the threshold table.
///
/// The first attribute, in [`ATTRIBUTES`] order, whose score is strictly
/// greater than its threshold flags the content. Missing or unknown
/// attributes are ignored.
pub fn evaluate_scores(scores: &HashMap<String, f64>) -> ModerationVerdict {
    for attribute in ATTRIBUTES {
        if let Some(&score) = scores.get(attribute.api_name()) {
            if score > attribute.threshold() {
                return ModerationVerdict::Flagged {
                    attribute,
                    score,
                    reason: rejection_reason(attribute),
                };
            }
        }
    }
    ModerationVerdict::Safe
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
