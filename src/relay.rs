// src/relay.rs
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::WebhookConfig;
use crate::errors::{EstimateError, Result};
use crate::models::SubmissionData;

/// Anything that can record a lead. Returns a confirmation message on success.
#[async_trait]
pub trait LeadSubmitter: Send + Sync {
    async fn submit(&self, data: &SubmissionData) -> Result<String>;
}

/// Row posted to the spreadsheet webhook. Keys match the sheet's column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeadPayload {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub labor_cost: Option<f64>,
    pub material_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

impl LeadPayload {
    pub fn from_submission(data: &SubmissionData, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            name: data.contact.name.trim().to_string(),
            email: data.contact.email.trim().to_string(),
            phone: data.contact.phone.trim().to_string(),
            description: data.description.clone(),
            labor_cost: data.estimate.map(|e| e.labor_cost),
            material_cost: data.estimate.map(|e| e.material_cost),
            total_cost: data.estimate.map(|e| e.total_cost),
        }
    }
}

#[derive(Deserialize)]
struct WebhookReply {
    result: Option<String>,
    error: Option<Value>,
}

/// Posts leads to the configured webhook, or simulates success when none is set.
#[derive(Clone)]
pub struct WebhookRelay {
    client: Client,
    config: WebhookConfig,
}

impl WebhookRelay {
    pub fn new(client: Client, config: WebhookConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.url.is_some()
    }
}

#[async_trait]
impl LeadSubmitter for WebhookRelay {
    async fn submit(&self, data: &SubmissionData) -> Result<String> {
        let Some(url) = self.config.url.as_deref() else {
            log::warn!(
                "⚠️  LEAD_WEBHOOK_URL is not set; simulating submission for {}",
                data.contact.email
            );
            tokio::time::sleep(self.config.simulated_delay).await;
            return Ok("Request submitted successfully.".to_string());
        };

        let payload = LeadPayload::from_submission(data, Utc::now());
        log::info!("📤 Relaying lead for {} to webhook", payload.email);

        let resp = self.client.post(url).json(&payload).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            log::error!("❌ Webhook responded with status {}: {}", status, body);
            return Err(EstimateError::WebhookRejected(format!("HTTP {}", status.as_u16())));
        }

        let body = resp.text().await?;
        let reply: WebhookReply = serde_json::from_str(&body).map_err(|_| {
            log::error!("❌ Webhook reply is not JSON: {}", body);
            EstimateError::UnconfirmedDelivery(format!("expected a JSON reply, got '{}'", truncate(&body, 120)))
        })?;

        match reply.result.as_deref() {
            Some("success") => {
                log::info!("✅ Lead recorded by webhook");
                Ok("Request submitted successfully.".to_string())
            }
            _ => {
                let reason = match reply.error {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => "unknown error".to_string(),
                };
                log::error!("❌ Webhook rejected lead: {}", reason);
                Err(EstimateError::WebhookRejected(reason))
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, EstimateOutput};
    use chrono::TimeZone;
    use serde_json::json;

    fn submission(estimate: Option<EstimateOutput>) -> SubmissionData {
        SubmissionData {
            contact: ContactInfo {
                name: " Jane Doe ".to_string(),
                email: "jane@example.com".to_string(),
                phone: "5551234567".to_string(),
            },
            description: "Paint wall".to_string(),
            estimate,
        }
    }

    #[test]
    fn test_payload_keys_match_sheet_columns() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let payload = LeadPayload::from_submission(&submission(Some(EstimateOutput::new(200.0, 80.0))), at);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "Timestamp": "2026-03-01T12:00:00.000Z",
                "Name": "Jane Doe",
                "Email": "jane@example.com",
                "Phone": "5551234567",
                "Description": "Paint wall",
                "LaborCost": 200.0,
                "MaterialCost": 80.0,
                "TotalCost": 280.0
            })
        );
    }

    #[test]
    fn test_payload_without_estimate_has_null_costs() {
        let payload = LeadPayload::from_submission(&submission(None), Utc::now());
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["TotalCost"].is_null());
        assert!(value.get("ImageUrl").is_none());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
