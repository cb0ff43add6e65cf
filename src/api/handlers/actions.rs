// src/api/handlers/actions.rs
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::actions;
use crate::api::AppState;
use crate::errors::EstimateError;
use crate::models::{ActionResult, EstimateInput, PhotoDataUri, SubmissionData};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    #[serde(default)]
    pub photo_data_uri: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/v1/estimate - one-shot `generateEstimate` action
pub async fn generate_estimate(
    state: web::Data<AppState>,
    req: web::Json<EstimateRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.photo_data_uri.trim().is_empty() || req.description.trim().is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(ActionResult::<()>::failure(EstimateError::MissingInformation.to_string())));
    }

    // Photo limits are checked here, before anything is sent to the model.
    let photo = match PhotoDataUri::parse(&req.photo_data_uri) {
        Ok(photo) => photo,
        Err(e) => {
            log::warn!("Rejected photo: {}", e);
            return Ok(HttpResponse::BadRequest().json(ActionResult::<()>::failure(e.to_string())));
        }
    };

    let input = EstimateInput {
        photo_data_uri: photo,
        description: req.description,
    };
    let result = actions::generate_estimate(state.estimator.as_ref(), &input).await;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /api/v1/submit - one-shot `submitRequest` action
pub async fn submit_request(
    state: web::Data<AppState>,
    req: web::Json<SubmissionData>,
) -> Result<HttpResponse> {
    let result = actions::submit_request(state.submitter.as_ref(), &req.into_inner()).await;
    Ok(HttpResponse::Ok().json(result))
}
