use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::critique::{CritiqueConfig, ScoringPolicy};
use crate::llm_client::{anthropic, ollama};

/// Which model backend serves critiques.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "anthropic" => Ok(LlmProvider::Anthropic),
            other => bail!("Unknown LLM_PROVIDER '{other}' (expected 'ollama' or 'anthropic')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub ollama_url: String,
    pub ollama_vision: bool,
    pub anthropic_api_key: Option<String>,
    pub timeout: Duration,
}

/// How image uploads reach the critique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    /// OCR images into text; when off, images go to the model as images.
    pub enabled: bool,
    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub critique: CritiqueConfig,
    pub ocr: OcrSettings,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider: LlmProvider = parse_or(&lookup, "LLM_PROVIDER", LlmProvider::Ollama)?;
        let default_model = match provider {
            LlmProvider::Ollama => ollama::DEFAULT_MODEL,
            LlmProvider::Anthropic => anthropic::DEFAULT_MODEL,
        };
        let anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if provider == LlmProvider::Anthropic && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set");
        }

        let llm = LlmSettings {
            provider,
            model: lookup("LLM_MODEL").unwrap_or_else(|| default_model.to_string()),
            ollama_url: lookup("OLLAMA_URL")
                .unwrap_or_else(|| ollama::DEFAULT_BASE_URL.to_string()),
            ollama_vision: parse_or(&lookup, "OLLAMA_VISION", false)?,
            anthropic_api_key,
            timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 120u64)?),
        };

        let defaults = CritiqueConfig::default();
        let policy = ScoringPolicy::new(
            parse_or(&lookup, "SCORE_FLOOR", defaults.policy.floor)?,
            parse_or(&lookup, "MISMATCH_SCORE_CEILING", defaults.policy.mismatch_ceiling)?,
        )
        .context("Invalid scoring policy")?;
        let temperature: f32 = parse_or(&lookup, "LLM_TEMPERATURE", defaults.temperature)?;
        if !(0.0..=1.0).contains(&temperature) {
            bail!("LLM_TEMPERATURE must be between 0.0 and 1.0, got {temperature}");
        }

        Ok(Config {
            llm,
            critique: CritiqueConfig {
                temperature,
                policy,
                ..defaults
            },
            ocr: OcrSettings {
                enabled: parse_or(&lookup, "OCR_ENABLED", false)?,
                language: lookup("OCR_LANGUAGE").unwrap_or_else(|| "eng".to_string()),
            },
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm.model, "llama3.1");
        assert!(!config.llm.ollama_vision);
        assert_eq!(config.llm.timeout, Duration::from_secs(120));
        assert_eq!(config.critique.policy, ScoringPolicy::default());
        assert!(!config.ocr.enabled);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_anthropic_requires_api_key() {
        let err = config_from(&[("LLM_PROVIDER", "anthropic")]).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_anthropic_default_model() {
        let config =
            config_from(&[("LLM_PROVIDER", "Anthropic"), ("ANTHROPIC_API_KEY", "sk-test")])
                .unwrap();
        assert_eq!(config.llm.provider, LlmProvider::Anthropic);
        assert_eq!(config.llm.model, "claude-sonnet-4-5");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(config_from(&[("LLM_PROVIDER", "gemini")]).is_err());
    }

    #[test]
    fn test_scoring_overrides() {
        let config =
            config_from(&[("SCORE_FLOOR", "1"), ("MISMATCH_SCORE_CEILING", "35")]).unwrap();
        assert_eq!(config.critique.policy.floor, 1);
        assert_eq!(config.critique.policy.mismatch_ceiling, 35);
    }

    #[test]
    fn test_inconsistent_policy_rejected() {
        assert!(config_from(&[("SCORE_FLOOR", "50"), ("MISMATCH_SCORE_CEILING", "12")]).is_err());
    }

    #[test]
    fn test_invalid_number_names_the_key() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_ocr_settings() {
        let config = config_from(&[("OCR_ENABLED", "true"), ("OCR_LANGUAGE", "eng+deu")]).unwrap();
        assert!(config.ocr.enabled);
        assert_eq!(config.ocr.language, "eng+deu");
        assert!(config_from(&[("OCR_ENABLED", "yes")]).is_err());
    }

    #[test]
    fn test_temperature_out_of_range() {
        assert!(config_from(&[("LLM_TEMPERATURE", "1.5")]).is_err());
    }
}
