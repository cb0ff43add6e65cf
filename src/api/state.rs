// src/api/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::estimator::{CostEstimator, EstimateGenerator};
use crate::relay::{LeadSubmitter, WebhookRelay};
use crate::session::SessionStore;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub estimator: Arc<dyn CostEstimator>,
    pub submitter: Arc<dyn LeadSubmitter>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Wires the real model provider and webhook relay around one shared HTTP client.
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let config = Arc::new(config);
        let estimator = Arc::new(EstimateGenerator::new(config.clone(), client.clone()));
        let submitter = Arc::new(WebhookRelay::new(client, config.webhook.clone()));
        Ok(Self::with_services(config, estimator, submitter))
    }

    pub fn with_services(
        config: Arc<AppConfig>,
        estimator: Arc<dyn CostEstimator>,
        submitter: Arc<dyn LeadSubmitter>,
    ) -> Self {
        let sessions = SessionStore::new(config.session_idle_timeout);
        Self {
            config,
            estimator,
            submitter,
            sessions,
        }
    }
}
