// Resume critique: prompt a model, then force its reply into the CritiqueResult contract.
// All model calls go through llm_client; this module never talks HTTP itself.

pub mod handlers;
pub mod normalizer;
pub mod overrides;
pub mod prompts;
pub mod service;

use anyhow::{ensure, Result};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::critique::Improvement;

/// Upper bound of `overall_score`.
pub const MAX_SCORE: u8 = 100;

/// Scoring band and mismatch penalty.
///
/// The floor is 0: it is also the score of the cannot-analyze and degraded
/// results, so "0" always means "no usable critique".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub floor: u8,
    pub mismatch_ceiling: u8,
}

impl ScoringPolicy {
    pub fn new(floor: u8, mismatch_ceiling: u8) -> Result<Self> {
        ensure!(
            floor <= mismatch_ceiling,
            "score floor ({floor}) must not exceed the mismatch ceiling ({mismatch_ceiling})"
        );
        ensure!(
            mismatch_ceiling <= MAX_SCORE,
            "mismatch ceiling ({mismatch_ceiling}) must not exceed {MAX_SCORE}"
        );
        Ok(Self {
            floor,
            mismatch_ceiling,
        })
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            floor: 0,
            mismatch_ceiling: 12,
        }
    }
}

/// Everything the critique service needs besides a backend. Injected so tests
/// can swap prompts and bounds.
#[derive(Debug, Clone)]
pub struct CritiqueConfig {
    pub system_prompt: String,
    /// Placeholders: `{resume_text}`.
    pub resume_prompt_template: String,
    /// Placeholders: `{resume_text}`, `{job_description}`.
    pub job_match_prompt_template: String,
    /// Stands in for `{resume_text}` when the resume is sent as an image.
    pub image_resume_text: String,
    pub temperature: f32,
    pub policy: ScoringPolicy,
    pub default_candidate_name: String,
    pub default_summary: String,
    pub fallback_improvement: Improvement,
}

impl Default for CritiqueConfig {
    fn default() -> Self {
        Self {
            system_prompt: prompts::CRITIQUE_SYSTEM.to_string(),
            resume_prompt_template: prompts::RESUME_PROMPT_TEMPLATE.to_string(),
            job_match_prompt_template: prompts::JOB_MATCH_PROMPT_TEMPLATE.to_string(),
            image_resume_text: prompts::IMAGE_RESUME_TEXT.to_string(),
            temperature: 0.0,
            policy: ScoringPolicy::default(),
            default_candidate_name: "Candidate".to_string(),
            default_summary: "Analysis complete.".to_string(),
            fallback_improvement: Improvement {
                original: "Responsible for various tasks and projects.".to_string(),
                better: "Led 3 cross-team projects that cut release time by 20%.".to_string(),
                why: "Start bullets with an action verb and quantify the outcome so reviewers \
                      can see the impact."
                    .to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error("Model {model} cannot analyze this document type")]
    UnsupportedModality { model: String },

    #[error("Model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}
