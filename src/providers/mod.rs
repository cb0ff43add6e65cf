// src/providers/mod.rs

use crate::errors::Result;
use crate::models::PhotoDataUri;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

/// A common trait for multimodal Large Language Model (LLM) providers.
/// Every backend receives the prompt together with the project photo.
///
/// Note: We're not using async_trait here, so implementers must handle async directly.
pub trait VisionProvider: Send + Sync {
    /// Generates a response from the LLM for a prompt and an attached image.
    ///
    /// # Arguments
    /// * `model` - The specific model to use (e.g., "gemini-2.0-flash", "gpt-4o", "llava").
    /// * `prompt` - The instruction text sent alongside the image.
    /// * `photo` - The image, already validated.
    ///
    /// # Returns
    /// A `Result` containing a tuple of the generated `String` and the latency in milliseconds (`u64`).
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        photo: &PhotoDataUri,
    ) -> impl std::future::Future<Output = Result<(String, u64)>> + Send;
}

/// Turns a non-success response into an `ApiError`, keeping whatever body came back.
pub(crate) async fn error_for_status(resp: reqwest::Response) -> crate::errors::EstimateError {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error body".to_string());
    crate::errors::EstimateError::ApiError {
        status: status.as_u16(),
        body,
    }
}
