//! Turns a model reply into a `RawCritique`, then into a schema-valid `CritiqueResult`.
//!
//! Every field is read leniently: wrong types and missing keys fall back to
//! defaults instead of failing the whole reply. Only a reply with no JSON object
//! in it is rejected.

use serde_json::{Map, Value};

use crate::critique::prompts::MISSING_MARKER;
use crate::critique::{CritiqueConfig, CritiqueError};
use crate::llm_client::extract_json_object;
use crate::models::critique::{CritiqueResult, Improvement};

/// The model's reply after sanitation, before business rules are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCritique {
    pub candidate_name: Option<String>,
    /// Numeric score as the model stated it; unclamped and possibly fractional.
    pub overall_score: Option<f64>,
    pub is_match: Option<bool>,
    pub summary: Option<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<Improvement>,
}

impl RawCritique {
    /// Sanitizes a raw reply and reads it field by field.
    pub fn from_reply(reply: &str) -> Result<Self, CritiqueError> {
        let json = extract_json_object(reply).ok_or_else(|| {
            CritiqueError::MalformedResponse("reply contains no JSON object".to_string())
        })?;
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CritiqueError::MalformedResponse(e.to_string()))?;
        match value {
            Value::Object(map) => Ok(Self::from_object(&map)),
            _ => Err(CritiqueError::MalformedResponse(
                "reply JSON is not an object".to_string(),
            )),
        }
    }

    pub fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            candidate_name: map.get("candidate_name").and_then(non_blank_string),
            overall_score: map.get("overall_score").and_then(coerce_number),
            is_match: map.get("is_match").and_then(coerce_bool),
            summary: map.get("summary").and_then(non_blank_string),
            strengths: map.get("strengths").map(string_list).unwrap_or_default(),
            weaknesses: map.get("weaknesses").map(string_list).unwrap_or_default(),
            improvements: map
                .get("improvements")
                .map(improvement_list)
                .unwrap_or_default(),
        }
    }

    /// True when the model reported a failed match, either through `is_match`
    /// or by listing a `MISSING:` weakness.
    pub fn signals_mismatch(&self) -> bool {
        self.is_match == Some(false)
            || self.weaknesses.iter().any(|w| {
                w.trim_start()
                    .get(..MISSING_MARKER.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MISSING_MARKER))
            })
    }

    /// Fills defaults and the improvement backstop. `overall_score` must already
    /// have been through `apply_overrides`.
    pub fn into_result(
        self,
        config: &CritiqueConfig,
        overall_score: u8,
        raw_text: &str,
    ) -> CritiqueResult {
        let mut improvements = self.improvements;
        if improvements.is_empty() {
            improvements.push(config.fallback_improvement.clone());
        }

        CritiqueResult {
            candidate_name: self
                .candidate_name
                .unwrap_or_else(|| config.default_candidate_name.clone()),
            overall_score,
            summary: self
                .summary
                .unwrap_or_else(|| config.default_summary.clone()),
            strengths: self.strengths,
            weaknesses: self.weaknesses,
            improvements,
            raw_text: raw_text.to_string(),
        }
    }
}

fn non_blank_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Accepts JSON numbers and numeric strings such as `"85"`, `"85.5"` or `"85/100"`.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(non_blank_string).collect(),
        Value::String(_) => non_blank_string(value).into_iter().collect(),
        _ => vec![],
    }
}

fn improvement_list(value: &Value) -> Vec<Improvement> {
    let Some(items) = value.as_array() else {
        return vec![];
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(obj) => {
                let field = |key: &str| {
                    obj.get(key)
                        .and_then(non_blank_string)
                        .unwrap_or_default()
                };
                let improvement = Improvement {
                    original: field("original"),
                    better: field("better"),
                    why: field("why"),
                };
                let is_empty = improvement.original.is_empty()
                    && improvement.better.is_empty()
                    && improvement.why.is_empty();
                (!is_empty).then_some(improvement)
            }
            Value::String(_) => non_blank_string(item).map(|better| Improvement {
                original: String::new(),
                better,
                why: String::new(),
            }),
            _ => None,
        })
        .collect()
}
