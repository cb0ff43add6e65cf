// src/api/handlers/sessions.rs
use actix_web::error::ErrorInternalServerError;
use actix_web::{rt, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::actions;
use crate::api::AppState;
use crate::errors::EstimateError;
use crate::models::ContactInfo;
use crate::wizard::{EstimateWizard, WizardSnapshot};

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub wizard: WizardSnapshot,
}

#[derive(Deserialize)]
pub struct SnapshotQuery {
    #[serde(default)]
    pub photo: bool,
}

#[derive(Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRequest {
    pub photo_data_uri: String,
}

fn view(id: Uuid, wizard: &EstimateWizard) -> SessionResponse {
    SessionResponse {
        id,
        wizard: wizard.snapshot(false),
    }
}

/// Maps wizard errors onto HTTP. Validation problems still return the session view,
/// whose notice tells the user what to fix.
fn error_response(e: &EstimateError, id: Uuid, wizard: Option<&EstimateWizard>) -> HttpResponse {
    match (e, wizard) {
        (EstimateError::SessionNotFound(_), _) => {
            HttpResponse::NotFound().json(json!({ "error": e.to_string() }))
        }
        (EstimateError::InvalidTransition { .. }, _) => {
            HttpResponse::Conflict().json(json!({ "error": e.to_string() }))
        }
        (
            EstimateError::MissingInformation
            | EstimateError::ImageTooLarge { .. }
            | EstimateError::InvalidPhoto(_)
            | EstimateError::InvalidContact(_),
            Some(wizard),
        ) => HttpResponse::UnprocessableEntity().json(view(id, wizard)),
        _ => {
            log::error!("Session {} failed: {}", id, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

/// Runs a synchronous wizard transition and answers with the resulting view.
async fn apply<F>(state: &AppState, id: Uuid, op: F) -> HttpResponse
where
    F: FnOnce(&mut EstimateWizard) -> crate::errors::Result<()>,
{
    let wizard = match state.sessions.get(&id).await {
        Ok(wizard) => wizard,
        Err(e) => return error_response(&e, id, None),
    };
    let mut guard = wizard.lock().await;
    match op(&mut *guard) {
        Ok(()) => HttpResponse::Ok().json(view(id, &guard)),
        Err(e) => error_response(&e, id, Some(&*guard)),
    }
}

/// POST /api/v1/sessions
pub async fn create_session(state: web::Data<AppState>) -> Result<HttpResponse> {
    let (id, wizard) = state.sessions.create().await;
    log::info!("🆕 Session {} started", id);
    let guard = wizard.lock().await;
    Ok(HttpResponse::Created().json(view(id, &guard)))
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<SnapshotQuery>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.sessions.get(&id).await {
        Ok(wizard) => {
            let guard = wizard.lock().await;
            Ok(HttpResponse::Ok().json(SessionResponse {
                id,
                wizard: guard.snapshot(query.photo),
            }))
        }
        Err(e) => Ok(error_response(&e, id, None)),
    }
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let id = path.into_inner();
    match state.sessions.remove(&id).await {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(error_response(&e, id, None)),
    }
}

/// PUT /api/v1/sessions/{id}/description
pub async fn set_description(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<DescriptionRequest>,
) -> Result<HttpResponse> {
    let description = req.into_inner().description;
    Ok(apply(&state, path.into_inner(), |w| w.set_description(description)).await)
}

/// PUT /api/v1/sessions/{id}/photo
pub async fn attach_photo(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<PhotoRequest>,
) -> Result<HttpResponse> {
    let uri = req.into_inner().photo_data_uri;
    Ok(apply(&state, path.into_inner(), |w| w.attach_photo(&uri)).await)
}

/// POST /api/v1/sessions/{id}/estimate - `handleGetEstimate`
///
/// The session lock is released while the model is working; the wizard sits in
/// `estimating` meanwhile and refuses anything else. The call and its completion
/// run on a spawned task, so a client that disconnects mid-call still leaves the
/// session settled.
pub async fn request_estimate(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let id = path.into_inner();
    let wizard = match state.sessions.get(&id).await {
        Ok(wizard) => wizard,
        Err(e) => return Ok(error_response(&e, id, None)),
    };

    let input = {
        let mut guard = wizard.lock().await;
        match guard.begin_estimate() {
            Ok(input) => input,
            Err(e) => return Ok(error_response(&e, id, Some(&*guard))),
        }
    };

    let estimator = state.estimator.clone();
    let task_wizard = wizard.clone();
    let outcome = rt::spawn(async move {
        let result = actions::generate_estimate(estimator.as_ref(), &input).await;
        task_wizard.lock().await.complete_estimate(result)
    })
    .await
    .map_err(ErrorInternalServerError)?;

    let guard = wizard.lock().await;
    match outcome {
        Ok(()) => Ok(HttpResponse::Ok().json(view(id, &guard))),
        Err(e) => Ok(error_response(&e, id, Some(&*guard))),
    }
}

/// POST /api/v1/sessions/{id}/contact
pub async fn schedule_formal_estimate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), |w| w.schedule_formal_estimate()).await)
}

/// POST /api/v1/sessions/{id}/back
pub async fn back_to_result(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), |w| w.back_to_result()).await)
}

/// POST /api/v1/sessions/{id}/submit - `handleContactSubmit`
pub async fn submit_contact(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ContactInfo>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let wizard = match state.sessions.get(&id).await {
        Ok(wizard) => wizard,
        Err(e) => return Ok(error_response(&e, id, None)),
    };

    let data = {
        let mut guard = wizard.lock().await;
        match guard.begin_submission(req.into_inner()) {
            Ok(data) => data,
            Err(e) => return Ok(error_response(&e, id, Some(&*guard))),
        }
    };

    let submitter = state.submitter.clone();
    let task_wizard = wizard.clone();
    let outcome = rt::spawn(async move {
        let result = actions::submit_request(submitter.as_ref(), &data).await;
        task_wizard.lock().await.complete_submission(result)
    })
    .await
    .map_err(ErrorInternalServerError)?;

    let guard = wizard.lock().await;
    match outcome {
        Ok(()) => Ok(HttpResponse::Ok().json(view(id, &guard))),
        Err(e) => Ok(error_response(&e, id, Some(&*guard))),
    }
}

/// POST /api/v1/sessions/{id}/reset
pub async fn start_over(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(apply(&state, path.into_inner(), |w| w.start_over()).await)
}
