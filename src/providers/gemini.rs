// src/providers/gemini.rs

use reqwest::Client;
use serde_json::json;
use std::time::Instant;

use crate::config::GeminiConfig;
use crate::errors::{EstimateError, Result};
use crate::models::PhotoDataUri;
use crate::providers::{error_for_status, VisionProvider};

/// A provider for interacting with Google's Gemini models.
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }
}

impl VisionProvider for GeminiProvider {
    /// Calls `generateContent` with the prompt and the photo as inline data, asking for JSON output.
    async fn generate(&self, model: &str, prompt: &str, photo: &PhotoDataUri) -> Result<(String, u64)> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        );

        log::info!("📡 Calling Gemini: {} with model: {}", url, model);

        let body = json!({
            "contents": [{
                "parts": [
                    {"text": prompt},
                    {"inline_data": {"mime_type": photo.mime_type(), "data": photo.base64_data()}}
                ]
            }],
            "generationConfig": {"responseMimeType": "application/json"}
        });

        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Gemini response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            return Err(error_for_status(resp).await);
        }

        let response_json: serde_json::Value = resp.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(EstimateError::ApiResponse(error.to_string()));
        }

        let output = response_json
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| EstimateError::UnexpectedResponse(response_json.to_string()))?;

        if output.is_empty() {
            return Err(EstimateError::EmptyResponse);
        }

        Ok((output.to_string(), latency_ms))
    }
}
