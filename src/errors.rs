// src/errors.rs
use thiserror::Error;

use crate::wizard::{Action, Step};

#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("API returned an error: {0}")]
    ApiResponse(String),

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Received empty text response from model")]
    EmptyResponse,

    #[error("Model returned a malformed estimate: {0}")]
    MalformedEstimate(String),

    #[error("Image too large: {size} bytes exceeds the {limit} byte limit")]
    ImageTooLarge { size: usize, limit: usize },

    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    #[error("Invalid contact details: {}", .0.join("; "))]
    InvalidContact(Vec<String>),

    #[error("Please upload an image and provide a description.")]
    MissingInformation,

    #[error("{0}")]
    WebhookRejected(String),

    #[error("webhook response could not be confirmed: {0}")]
    UnconfirmedDelivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("Cannot {action} while in the {from} step")]
    InvalidTransition { from: Step, action: Action },

    #[error("Session '{0}' not found")]
    SessionNotFound(String),
}

pub type Result<T> = std::result::Result<T, EstimateError>;
