//! Strict decoding of JSON answers embedded in free-text model output.
//!
//! Models are asked to answer with a single JSON object inside a fenced
//! ```` ```json ```` block. [`extract_json_payload`] pulls that block out (or
//! falls back to the whole trimmed text), and the typed `parse_*` functions
//! decode it into fixed shapes, returning [`ResponseParseError`] instead of
//! panicking or passing half-formed data along.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::analysis::{IdeaDetails, LimitationCheck};

/// Matches the first fenced code block, optionally tagged `json`.
static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?[ \t]*\r?\n(.*?)\r?\n?[ \t]*```").expect("valid regex")
});

/// Why a model answer could not be decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseParseError {
    #[error("model returned no text content")]
    Empty,

    #[error("model response is not valid JSON for the expected shape: {0}")]
    InvalidJson(String),

    #[error("model response is missing required field '{0}'")]
    MissingField(&'static str),
}

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RealityCheckPayload {
    results: Vec<LimitationCheck>,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    title: String,
    description: String,
    #[serde(rename = "realityCheck")]
    reality_check: Vec<LimitationCheck>,
}

#[derive(Debug, Deserialize)]
struct DetailsPayload {
    title: String,
    description: String,
}

/// Decoded combined analysis answer (checks are not yet reconciled).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisAnswer {
    pub details: IdeaDetails,
    pub checks: Vec<LimitationCheck>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Return the JSON text to decode: the contents of the first fenced block,
/// or the whole trimmed input when there is no fence.
pub fn extract_json_payload(raw: &str) -> &str {
    match JSON_FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => raw.trim(),
    }
}

/// Extract and decode a model answer into `T`.
pub fn decode_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, ResponseParseError> {
    let payload = extract_json_payload(raw);
    if payload.is_empty() {
        return Err(ResponseParseError::Empty);
    }
    serde_json::from_str(payload).map_err(|e| ResponseParseError::InvalidJson(e.to_string()))
}

fn require_text(value: String, field: &'static str) -> Result<String, ResponseParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResponseParseError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Typed parsers
// ---------------------------------------------------------------------------

/// Parse a reality-check answer: `{ "results": [ {limitation, status, reasoning} ] }`.
pub fn parse_reality_check(raw: &str) -> Result<Vec<LimitationCheck>, ResponseParseError> {
    let payload: RealityCheckPayload = decode_model_json(raw)?;
    Ok(payload.results)
}

/// Parse a combined analysis answer:
/// `{ "title", "description", "realityCheck": [...] }`.
pub fn parse_analysis(raw: &str) -> Result<AnalysisAnswer, ResponseParseError> {
    let payload: AnalysisPayload = decode_model_json(raw)?;
    Ok(AnalysisAnswer {
        details: IdeaDetails {
            title: require_text(payload.title, "title")?,
            description: require_text(payload.description, "description")?,
        },
        checks: payload.reality_check,
    })
}

/// Parse a details suggestion: `{ "title", "description" }`.
pub fn parse_details(raw: &str) -> Result<IdeaDetails, ResponseParseError> {
    let payload: DetailsPayload = decode_model_json(raw)?;
    Ok(IdeaDetails {
        title: require_text(payload.title, "title")?,
        description: require_text(payload.description, "description")?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::analysis::LimitationStatus;

    const FENCED_ANALYSIS: &str = "Sure! Here is the analysis:\n```json\n{\n  \"title\": \"Solar Roof Plaza\",\n  \"description\": \"Panels over the plaza.\",\n  \"realityCheck\": [\n    {\"limitation\": \"budget <$100k\", \"status\": \"Depending\", \"reasoning\": \"Costs vary.\"}\n  ]\n}\n```\nLet me know if you need more.";

    #[test]
    fn extracts_fenced_block() {
        let raw = "intro\n```json\n{\"a\": 1}\n```\noutro";
        assert_eq!(extract_json_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn extracts_untagged_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(raw), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_is_trimmed() {
        assert_eq!(extract_json_payload("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_analysis() {
        let answer = parse_analysis(FENCED_ANALYSIS).unwrap();
        assert_eq!(answer.details.title, "Solar Roof Plaza");
        assert_eq!(answer.details.description, "Panels over the plaza.");
        assert_eq!(answer.checks.len(), 1);
        assert_eq!(answer.checks[0].status, LimitationStatus::Depending);
        assert_eq!(answer.checks[0].reasoning.as_deref(), Some("Costs vary."));
    }

    #[test]
    fn parses_reality_check_without_fence() {
        let raw = r#"{"results": [{"limitation": "keep trees", "status": "Check", "reasoning": "ok"}]}"#;
        let results = parse_reality_check(raw).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, LimitationStatus::Check);
    }

    #[test]
    fn reasoning_is_optional() {
        let raw = r#"{"results": [{"limitation": "keep trees", "status": "Violation"}]}"#;
        let results = parse_reality_check(raw).unwrap();
        assert_eq!(results[0].reasoning, None);
    }

    #[test]
    fn unknown_status_is_a_parse_error() {
        let raw = r#"{"results": [{"limitation": "x", "status": "Maybe", "reasoning": ""}]}"#;
        assert_matches!(parse_reality_check(raw), Err(ResponseParseError::InvalidJson(_)));
    }

    #[test]
    fn missing_results_key_is_a_parse_error() {
        assert_matches!(
            parse_reality_check(r#"{"items": []}"#),
            Err(ResponseParseError::InvalidJson(_))
        );
    }

    #[test]
    fn empty_text_is_reported_as_empty() {
        assert_eq!(parse_details("   "), Err(ResponseParseError::Empty));
    }

    #[test]
    fn blank_title_is_a_missing_field() {
        let raw = r#"{"title": "  ", "description": "something"}"#;
        assert_eq!(parse_details(raw), Err(ResponseParseError::MissingField("title")));
    }

    #[test]
    fn prose_is_invalid_json() {
        assert_matches!(
            parse_details("I cannot help with that."),
            Err(ResponseParseError::InvalidJson(_))
        );
    }
}
