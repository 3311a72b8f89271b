//! Deterministic scoring rules layered over the model's number.

use tracing::warn;

use crate::critique::normalizer::RawCritique;
use crate::critique::{ScoringPolicy, MAX_SCORE};

/// Rounds and clips a model score into `[policy.floor, MAX_SCORE]`.
/// A missing score lands on the floor.
pub fn clamp_score(score: Option<f64>, policy: &ScoringPolicy) -> u8 {
    match score {
        Some(score) => score
            .round()
            .clamp(f64::from(policy.floor), f64::from(MAX_SCORE)) as u8,
        None => policy.floor,
    }
}

/// Final score for a parsed reply.
///
/// With a job description, a reported mismatch forces the score to
/// `policy.mismatch_ceiling` whatever the model said, higher or lower.
pub fn apply_overrides(
    parsed: &RawCritique,
    has_job_description: bool,
    policy: &ScoringPolicy,
) -> u8 {
    let score = clamp_score(parsed.overall_score, policy);

    if has_job_description && parsed.signals_mismatch() {
        warn!(
            "Job mismatch detected, forcing score from {} to {}",
            score, policy.mismatch_ceiling
        );
        return policy.mismatch_ceiling;
    }

    score
}
