// src/api/handlers/health.rs
use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::api::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let active_sessions = state.sessions.len().await;
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "estimate-api",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.config.model,
        "webhookConfigured": state.config.webhook.url.is_some(),
        "activeSessions": active_sessions
    })))
}
