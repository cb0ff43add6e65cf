// src/estimator.rs
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{parse_model_string, render_template, AppConfig};
use crate::errors::{EstimateError, Result};
use crate::models::{EstimateInput, EstimateOutput, PhotoDataUri};
use crate::providers::{
    anthropic::AnthropicProvider, gemini::GeminiProvider, ollama::OllamaProvider,
    openai::OpenAIProvider, VisionProvider,
};

const ESTIMATE_PROMPT: &str = r#"You are an expert estimator for construction and home repair projects. You are provided with an image and a description of the work needed.
You will use this information, along with your knowledge of local labor and material costs for the {{zip_code}} zip code, to generate an estimate for the project.
The estimate should be broken down into labor cost and material cost.

Description: {{description}}
Photo: (attached)

Respond with JSON that contains the laborCost, materialCost and totalCost."#;

/// Anything that can price a project from a photo and a description.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    async fn estimate(&self, input: &EstimateInput) -> Result<EstimateOutput>;
}

/// Fills the estimator prompt for one project.
pub fn build_prompt(zip_code: &str, description: &str) -> String {
    render_template(
        ESTIMATE_PROMPT,
        &json!({ "zip_code": zip_code, "description": description.trim() }),
    )
}

/// Pulls the estimate out of the model's reply.
///
/// Models sometimes wrap the JSON in a code fence or a sentence, so the outermost
/// `{...}` is taken. The reported total is discarded and recomputed.
pub fn parse_estimate(text: &str) -> Result<EstimateOutput> {
    let start = text.find('{');
    let end = text.rfind('}');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => return Err(EstimateError::MalformedEstimate(format!("no JSON object in '{}'", text))),
    };

    let value: Value = serde_json::from_str(body)?;
    let labor_cost = cost_field(&value, "laborCost")?;
    let material_cost = cost_field(&value, "materialCost")?;

    Ok(EstimateOutput::new(labor_cost, material_cost))
}

fn cost_field(value: &Value, field: &str) -> Result<f64> {
    let raw = value
        .get(field)
        .ok_or_else(|| EstimateError::MalformedEstimate(format!("missing {}", field)))?;

    let amount = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('$').replace(',', "").parse().ok(),
        _ => None,
    }
    .ok_or_else(|| EstimateError::MalformedEstimate(format!("{} is not a number: {}", field, raw)))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(EstimateError::MalformedEstimate(format!(
            "{} must be a non-negative amount, got {}",
            field, amount
        )));
    }
    Ok(amount)
}

/// Produces estimates by prompting the configured vision model.
#[derive(Clone)]
pub struct EstimateGenerator {
    config: Arc<AppConfig>,
    client: Client,
}

impl EstimateGenerator {
    pub fn new(config: Arc<AppConfig>, client: Client) -> Self {
        Self { config, client }
    }

    /// Call the appropriate provider based on the provider name
    async fn call_provider(
        &self,
        provider_name: &str,
        model_name: &str,
        prompt: &str,
        photo: &PhotoDataUri,
    ) -> Result<(String, u64)> {
        let client = self.client.clone();
        match provider_name {
            "anthropic" => {
                let anthropic_config = self.config.anthropic.as_ref()
                    .ok_or_else(|| EstimateError::ProviderNotFound("anthropic".to_string()))?;
                AnthropicProvider::new(client, anthropic_config.clone())
                    .generate(model_name, prompt, photo)
                    .await
            }
            "gemini" => {
                let gemini_config = self.config.gemini.as_ref()
                    .ok_or_else(|| EstimateError::ProviderNotFound("gemini".to_string()))?;
                GeminiProvider::new(client, gemini_config.clone())
                    .generate(model_name, prompt, photo)
                    .await
            }
            "ollama" => {
                let ollama_config = self.config.ollama.as_ref()
                    .ok_or_else(|| EstimateError::ProviderNotFound("ollama".to_string()))?;
                OllamaProvider::new(client, ollama_config.clone())
                    .generate(model_name, prompt, photo)
                    .await
            }
            "openai" => {
                let openai_config = self.config.openai.as_ref()
                    .ok_or_else(|| EstimateError::ProviderNotFound("openai".to_string()))?;
                OpenAIProvider::new(client, openai_config.clone())
                    .generate(model_name, prompt, photo)
                    .await
            }
            _ => Err(EstimateError::ProviderNotFound(provider_name.to_string())),
        }
    }
}

#[async_trait]
impl CostEstimator for EstimateGenerator {
    async fn estimate(&self, input: &EstimateInput) -> Result<EstimateOutput> {
        let started = Instant::now();
        let (provider_name, model_name) = parse_model_string(&self.config.model);
        let prompt = build_prompt(&self.config.zip_code, &input.description);

        log::info!(
            "🎯 Estimating with {} ({} byte {} photo)",
            self.config.model,
            input.photo_data_uri.byte_len(),
            input.photo_data_uri.mime_type()
        );
        log::debug!("📝 Prompt: {}", prompt);

        let (reply, latency_ms) = self
            .call_provider(&provider_name, &model_name, &prompt, &input.photo_data_uri)
            .await?;

        log::debug!("✅ Model output ({}ms): {}", latency_ms, reply);

        let estimate = parse_estimate(&reply)?;
        log::info!(
            "💰 Estimate ready in {}ms: labor {} + material {} = {}",
            started.elapsed().as_millis(),
            estimate.labor_cost,
            estimate.material_cost,
            estimate.total_cost
        );
        Ok(estimate)
    }
}
