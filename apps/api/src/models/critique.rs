use serde::{Deserialize, Serialize};

use crate::models::document::ParsedDocument;

/// Input to the critique service.
#[derive(Debug, Clone)]
pub struct CritiqueRequest {
    pub document: ParsedDocument,
    pub job_description: Option<String>,
}

impl CritiqueRequest {
    /// Builds a request, treating a blank job description as absent.
    pub fn new(document: ParsedDocument, job_description: Option<String>) -> Self {
        let job_description = job_description
            .map(|jd| jd.trim().to_string())
            .filter(|jd| !jd.is_empty());
        Self {
            document,
            job_description,
        }
    }
}

/// A suggested rewrite of one resume line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvement {
    pub original: String,
    pub better: String,
    pub why: String,
}

/// The critique returned to callers. Always schema-valid:
/// `overall_score` is within the configured band and `improvements` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueResult {
    pub candidate_name: String,
    pub overall_score: u8,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<Improvement>,
    pub raw_text: String,
}
