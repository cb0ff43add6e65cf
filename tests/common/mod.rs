#![allow(dead_code)]

use actix_web::{web, App, HttpServer};
use async_trait::async_trait;
use estimate::config::AppConfig;
use estimate::errors::{EstimateError, Result};
use estimate::estimator::CostEstimator;
use estimate::models::{EstimateInput, EstimateOutput, PhotoDataUri, SubmissionData};
use estimate::relay::LeadSubmitter;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Config with a single (unreachable) Ollama provider plus any overrides.
pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("OLLAMA_API_BASE".to_string(), "http://127.0.0.1:1".to_string()),
        ("ESTIMATE_MODEL".to_string(), "ollama:llava".to_string()),
        ("SUBMISSION_DELAY_MS".to_string(), "10".to_string()),
    ]);
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid")
}

/// Starts a throwaway HTTP server on an ephemeral port and returns its base URL.
pub async fn spawn_stub<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(16 * 1024 * 1024))
            .configure(configure.clone())
    })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub server");
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    format!("http://{}", addr)
}

pub fn jpeg_of_size(bytes: usize) -> PhotoDataUri {
    let mut data = vec![0u8; bytes];
    data[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
    PhotoDataUri::from_bytes("image/jpeg", &data).expect("photo within limits")
}

/// Returns a fixed estimate (or fails) and counts calls.
pub struct FixedEstimator {
    pub output: Option<EstimateOutput>,
    pub calls: AtomicUsize,
    pub delay: Duration,
}

impl FixedEstimator {
    pub fn returning(labor_cost: f64, material_cost: f64, reported_total: f64) -> Self {
        Self {
            output: Some(EstimateOutput {
                labor_cost,
                material_cost,
                total_cost: reported_total,
            }),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            output: None,
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Makes every estimate take `delay`, like a slow model.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CostEstimator for FixedEstimator {
    async fn estimate(&self, _input: &EstimateInput) -> Result<EstimateOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.output
            .ok_or_else(|| EstimateError::UnexpectedResponse("model unavailable".to_string()))
    }
}

/// Records every submission; rejects them all when `reject_with` is set.
#[derive(Default)]
pub struct RecordingSubmitter {
    pub reject_with: Option<String>,
    pub received: Mutex<Vec<SubmissionData>>,
    pub delay: Duration,
}

impl RecordingSubmitter {
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            received: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn received(&self) -> Vec<SubmissionData> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSubmitter for RecordingSubmitter {
    async fn submit(&self, data: &SubmissionData) -> Result<String> {
        self.received.lock().unwrap().push(data.clone());
        tokio::time::sleep(self.delay).await;
        match &self.reject_with {
            Some(reason) => Err(EstimateError::WebhookRejected(reason.clone())),
            None => Ok("Request submitted successfully.".to_string()),
        }
    }
}
