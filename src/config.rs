// src/config.rs
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::errors::{EstimateError, Result};

pub const DEFAULT_MODEL: &str = "gemini:gemini-2.0-flash";
pub const DEFAULT_ZIP_CODE: &str = "75601";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_base: String,
    pub api_key: String,
}

/// Configuration for the Ollama provider.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub api_base: String,
}

/// Where leads are relayed to. A missing URL means submissions are simulated.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub simulated_delay: Duration,
}

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: Option<GeminiConfig>,
    pub openai: Option<OpenAIConfig>,
    pub anthropic: Option<AnthropicConfig>,
    pub ollama: Option<OllamaConfig>,
    /// Model used for estimates, in `provider:model_name` form.
    pub model: String,
    pub zip_code: String,
    pub webhook: WebhookConfig,
    pub request_timeout: Duration,
    pub session_idle_timeout: Duration,
    pub bind_address: String,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests don't have to touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini = var("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_base: var("GEMINI_API_BASE")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            api_key,
        });

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAIConfig {
            api_base: var("OPENAI_API_BASE").unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key,
        });

        let anthropic = var("ANTHROPIC_API_KEY").map(|api_key| AnthropicConfig {
            api_base: var("ANTHROPIC_API_BASE").unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            api_key,
        });

        let ollama = var("OLLAMA_API_BASE").map(|api_base| OllamaConfig { api_base });

        if gemini.is_none() && openai.is_none() && anthropic.is_none() && ollama.is_none() {
            return Err(EstimateError::Config(
                "No LLM providers configured. Please set GEMINI_API_KEY, OPENAI_API_KEY, ANTHROPIC_API_KEY or OLLAMA_API_BASE.".to_string()
            ));
        }

        let model = var("ESTIMATE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let config = AppConfig {
            gemini,
            openai,
            anthropic,
            ollama,
            model,
            zip_code: var("ESTIMATE_ZIP_CODE").unwrap_or_else(|| DEFAULT_ZIP_CODE.to_string()),
            webhook: WebhookConfig {
                url: var("LEAD_WEBHOOK_URL"),
                simulated_delay: Duration::from_millis(parse_number(&var, "SUBMISSION_DELAY_MS", 1000)?),
            },
            request_timeout: Duration::from_secs(parse_number(&var, "REQUEST_TIMEOUT_SECS", 60)?),
            session_idle_timeout: Duration::from_secs(
                parse_number::<u64, _>(&var, "SESSION_IDLE_MINUTES", 60)?
                    .checked_mul(60)
                    .ok_or_else(|| EstimateError::Config("SESSION_IDLE_MINUTES is too large".to_string()))?,
            ),
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number(&var, "PORT", 8080)?,
        };

        let (provider, _) = parse_model_string(&config.model);
        if !config.has_provider(&provider) {
            return Err(EstimateError::Config(format!(
                "ESTIMATE_MODEL '{}' uses provider '{}', which is not configured",
                config.model, provider
            )));
        }

        Ok(config)
    }

    /// Whether credentials (or a base URL) exist for the named provider.
    pub fn has_provider(&self, provider: &str) -> bool {
        match provider {
            "gemini" => self.gemini.is_some(),
            "openai" => self.openai.is_some(),
            "anthropic" => self.anthropic.is_some(),
            "ollama" => self.ollama.is_some(),
            _ => false,
        }
    }
}

fn parse_number<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| EstimateError::Config(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}

/// Parses a model string like "provider:model_name" and returns the provider and model.
/// Defaults to "gemini" if no provider is specified.
pub fn parse_model_string(model_str: &str) -> (String, String) {
    match model_str.split_once(':') {
        Some((provider, model)) => (provider.to_string(), model.to_string()),
        None => ("gemini".to_string(), model_str.to_string()),
    }
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid"));

/// Simple template renderer using regex.
/// Placeholders are in the format `{{key}}`; unknown keys are left untouched.
pub fn render_template(template: &str, data: &serde_json::Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            let key = &caps[1];
            data.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .to_string()
}
