// src/providers/ollama.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::OllamaConfig;
use crate::errors::{EstimateError, Result};
use crate::models::PhotoDataUri;
use crate::providers::{error_for_status, VisionProvider};

/// A provider for local Ollama vision models (llava, llama3.2-vision, ...).
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: [&'a str; 1],
    format: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider`.
    pub fn new(client: Client, config: OllamaConfig) -> Self {
        Self { client, config }
    }
}

impl VisionProvider for OllamaProvider {
    async fn generate(&self, model: &str, prompt: &str, photo: &PhotoDataUri) -> Result<(String, u64)> {
        let url = format!("{}/api/generate", self.config.api_base.trim_end_matches('/'));

        log::info!("📡 Calling Ollama: {} with model: {}", url, model);

        // Ollama takes bare base64, no data: header.
        let body = OllamaRequest {
            model,
            prompt,
            images: [photo.base64_data()],
            format: "json",
            stream: false,
        };

        let start = Instant::now();

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("📥 Ollama response status: {} ({}ms)", status, latency_ms);

        if !status.is_success() {
            return Err(error_for_status(resp).await);
        }

        let ollama_resp: OllamaResponse = resp.json().await?;
        if ollama_resp.response.is_empty() {
            return Err(EstimateError::EmptyResponse);
        }

        Ok((ollama_resp.response, latency_ms))
    }
}
