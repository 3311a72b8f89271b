//! Critique service — one model call per request, always a valid result.
//!
//! Flow: modality check → prompt → model call → sanitize/parse → overrides →
//!       defaults + improvement backstop → result.
//!
//! Every failure is absorbed here: an unsupported document becomes the fixed
//! cannot-analyze result, any other error becomes the degraded result.

use std::sync::Arc;

use tracing::{error, info};

use crate::critique::normalizer::RawCritique;
use crate::critique::overrides::apply_overrides;
use crate::critique::prompts::render_template;
use crate::critique::{CritiqueConfig, CritiqueError};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{CompletionRequest, LlmBackend, LlmError};
use crate::models::critique::{CritiqueRequest, CritiqueResult};

pub struct CritiqueService {
    llm: Arc<dyn LlmBackend>,
    config: CritiqueConfig,
}

impl CritiqueService {
    pub fn new(llm: Arc<dyn LlmBackend>, config: CritiqueConfig) -> Self {
        Self { llm, config }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Produces a critique. Never fails; see the module docs for the fallbacks.
    pub async fn critique(&self, request: &CritiqueRequest) -> CritiqueResult {
        match self.try_critique(request).await {
            Ok(result) => {
                info!(
                    "Analysis complete for {}: final score {}",
                    result.candidate_name, result.overall_score
                );
                result
            }
            Err(CritiqueError::UnsupportedModality { model }) => {
                info!("Skipping model call: {model} cannot analyze images");
                self.cannot_analyze(&model)
            }
            Err(e) => {
                error!("Critique failed: {e}");
                self.degraded(&e)
            }
        }
    }

    async fn try_critique(
        &self,
        request: &CritiqueRequest,
    ) -> Result<CritiqueResult, CritiqueError> {
        let document = &request.document;

        let image = if document.is_image() {
            let unsupported = || CritiqueError::UnsupportedModality {
                model: self.llm.model().to_string(),
            };
            if !self.llm.supports_images() {
                return Err(unsupported());
            }
            let source = document.image_source().ok_or_else(unsupported)?;
            if !self.llm.accepts_image(&source) {
                return Err(unsupported());
            }
            Some(source)
        } else {
            None
        };

        let prompt = self.build_prompt(request, image.is_some());
        let system = format!("{}\n\n{}", self.config.system_prompt, JSON_ONLY_SYSTEM);

        info!(
            "Analyzing resume with {} (job description: {})",
            self.llm.model(),
            request.job_description.is_some()
        );

        let reply = self
            .llm
            .complete(&CompletionRequest {
                system: &system,
                prompt: &prompt,
                image: image.as_ref(),
                temperature: self.config.temperature,
                json_output: true,
            })
            .await
            .map_err(|e| match e {
                LlmError::ImageNotSupported { model } => {
                    CritiqueError::UnsupportedModality { model }
                }
                other => CritiqueError::Upstream(other),
            })?;

        let parsed = RawCritique::from_reply(&reply)?;
        let overall_score = apply_overrides(
            &parsed,
            request.job_description.is_some(),
            &self.config.policy,
        );

        Ok(parsed.into_result(&self.config, overall_score, document.text_content()))
    }

    fn build_prompt(&self, request: &CritiqueRequest, image_attached: bool) -> String {
        let resume_text = if image_attached {
            self.config.image_resume_text.as_str()
        } else {
            request.document.text_content()
        };

        match &request.job_description {
            Some(jd) => render_template(
                &self.config.job_match_prompt_template,
                &[("resume_text", resume_text), ("job_description", jd)],
            ),
            None => render_template(
                &self.config.resume_prompt_template,
                &[("resume_text", resume_text)],
            ),
        }
    }

    fn cannot_analyze(&self, model: &str) -> CritiqueResult {
        CritiqueResult {
            candidate_name: "Unknown".to_string(),
            overall_score: self.config.policy.floor,
            summary: format!("{model} cannot read images."),
            strengths: vec![],
            weaknesses: vec![],
            improvements: vec![self.config.fallback_improvement.clone()],
            raw_text: String::new(),
        }
    }

    fn degraded(&self, error: &CritiqueError) -> CritiqueResult {
        CritiqueResult {
            candidate_name: "Error".to_string(),
            overall_score: self.config.policy.floor,
            summary: "Error parsing AI response.".to_string(),
            strengths: vec![],
            weaknesses: vec![],
            improvements: vec![self.config.fallback_improvement.clone()],
            raw_text: error.to_string(),
        }
    }
}
