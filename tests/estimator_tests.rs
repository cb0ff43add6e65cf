mod common;

use actix_web::{web, HttpResponse};
use common::{jpeg_of_size, spawn_stub, test_config};
use estimate::errors::EstimateError;
use estimate::estimator::{CostEstimator, EstimateGenerator};
use estimate::models::EstimateInput;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

/// Fake model API: records (path, body) and answers every POST with `reply`.
async fn model_stub(status: u16, reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let url = spawn_stub(move |cfg: &mut web::ServiceConfig| {
        let recorder = recorder.clone();
        let reply = reply.clone();
        cfg.default_service(web::to(move |req: actix_web::HttpRequest, body: web::Json<Value>| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder
                    .lock()
                    .unwrap()
                    .push((req.path().to_string(), body.into_inner()));
                HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap()).json(reply)
            }
        }));
    })
    .await;
    (url, seen)
}

fn generator(overrides: &[(&str, &str)]) -> EstimateGenerator {
    EstimateGenerator::new(Arc::new(test_config(overrides)), reqwest::Client::new())
}

fn paint_wall() -> EstimateInput {
    EstimateInput {
        photo_data_uri: jpeg_of_size(2 * 1024 * 1024),
        description: "Paint wall".to_string(),
    }
}

#[actix_web::test]
async fn ollama_estimate_recomputes_total() {
    let (url, seen) = model_stub(
        200,
        json!({"response": "{\"laborCost\": 200, \"materialCost\": 80, \"totalCost\": 999}"}),
    )
    .await;
    let estimator = generator(&[("OLLAMA_API_BASE", url.as_str()), ("ESTIMATE_MODEL", "ollama:llava")]);

    let estimate = estimator.estimate(&paint_wall()).await.unwrap();
    assert_eq!(estimate.labor_cost, 200.0);
    assert_eq!(estimate.material_cost, 80.0);
    assert_eq!(estimate.total_cost, 280.0);
    assert_eq!(estimate.display().total_cost, "$280.00");

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (path, body) = &requests[0];
    assert_eq!(path, "/api/generate");
    assert_eq!(body["model"], "llava");
    assert_eq!(body["format"], "json");
    assert_eq!(body["stream"], false);
    assert!(body["prompt"].as_str().unwrap().contains("Description: Paint wall"));
    assert!(body["prompt"].as_str().unwrap().contains("75601"));
    assert_eq!(body["images"][0], paint_wall().photo_data_uri.base64_data());
}

#[actix_web::test]
async fn gemini_sends_inline_image_and_zip_code() {
    let reply = json!({
        "candidates": [{"content": {"parts": [{"text": "{\"laborCost\": 450.5, \"materialCost\": 120}"}]}}]
    });
    let (url, seen) = model_stub(200, reply).await;
    let estimator = generator(&[
        ("GEMINI_API_KEY", "test-key"),
        ("GEMINI_API_BASE", url.as_str()),
        ("ESTIMATE_MODEL", "gemini:gemini-2.0-flash"),
        ("ESTIMATE_ZIP_CODE", "10001"),
    ]);

    let estimate = estimator.estimate(&paint_wall()).await.unwrap();
    assert_eq!(estimate.total_cost, 570.5);

    let (path, body) = seen.lock().unwrap()[0].clone();
    assert_eq!(path, "/v1beta/models/gemini-2.0-flash:generateContent");
    let parts = &body["contents"][0]["parts"];
    assert!(parts[0]["text"].as_str().unwrap().contains("10001 zip code"));
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
}

#[actix_web::test]
async fn openai_reply_in_code_fence_is_parsed() {
    let reply = json!({
        "choices": [{"message": {"content": "```json\n{\"laborCost\": 1000, \"materialCost\": 250.25, \"totalCost\": 0}\n```"}}]
    });
    let (url, seen) = model_stub(200, reply).await;
    let estimator = generator(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_API_BASE", url.as_str()),
        ("ESTIMATE_MODEL", "openai:gpt-4o"),
    ]);

    let estimate = estimator.estimate(&paint_wall()).await.unwrap();
    assert_eq!(estimate.total_cost, 1250.25);
    assert_eq!(estimate.display().total_cost, "$1,250.25");

    let (path, body) = seen.lock().unwrap()[0].clone();
    assert_eq!(path, "/chat/completions");
    let content = &body["messages"][0]["content"];
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[1]["type"], "image_url");
    assert!(content[1]["image_url"]["url"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
}

#[actix_web::test]
async fn anthropic_sends_base64_image_block() {
    let reply = json!({
        "content": [{"type": "text", "text": "{\"laborCost\": 75, \"materialCost\": 25}"}]
    });
    let (url, seen) = model_stub(200, reply).await;
    let estimator = generator(&[
        ("ANTHROPIC_API_KEY", "test"),
        ("ANTHROPIC_API_BASE", url.as_str()),
        ("ESTIMATE_MODEL", "anthropic:claude-3-5-sonnet-latest"),
    ]);

    let estimate = estimator.estimate(&paint_wall()).await.unwrap();
    assert_eq!(estimate.total_cost, 100.0);

    let (path, body) = seen.lock().unwrap()[0].clone();
    assert_eq!(path, "/v1/messages");
    let content = &body["messages"][0]["content"];
    assert_eq!(content[0]["type"], "image");
    assert_eq!(content[0]["source"]["type"], "base64");
    assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
    assert_eq!(content[1]["type"], "text");
}

#[actix_web::test]
async fn provider_error_status_fails_the_estimate() {
    let (url, _) = model_stub(503, json!({"error": "overloaded"})).await;
    let estimator = generator(&[("OLLAMA_API_BASE", url.as_str())]);

    let err = estimator.estimate(&paint_wall()).await.unwrap_err();
    assert!(matches!(err, EstimateError::ApiError { status: 503, .. }));
}

#[actix_web::test]
async fn malformed_model_output_fails_the_estimate() {
    let (url, _) = model_stub(200, json!({"response": "{\"laborCost\": \"lots\"}"})).await;
    let estimator = generator(&[("OLLAMA_API_BASE", url.as_str())]);

    let err = estimator.estimate(&paint_wall()).await.unwrap_err();
    assert!(matches!(err, EstimateError::MalformedEstimate(_)));
}
