// src/api/routes.rs
use actix_web::web;
use super::handlers;

/// A 4MB photo is about 5.4MB once base64 encoded inside a JSON body.
pub const MAX_JSON_BYTES: usize = 8 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().limit(MAX_JSON_BYTES))
            .route("/health", web::get().to(handlers::health_check))
            .route("/estimate", web::post().to(handlers::generate_estimate))
            .route("/submit", web::post().to(handlers::submit_request))
            .service(
                web::scope("/sessions")
                    .route("", web::post().to(handlers::create_session))
                    .route("/{id}", web::get().to(handlers::get_session))
                    .route("/{id}", web::delete().to(handlers::delete_session))
                    .route("/{id}/description", web::put().to(handlers::set_description))
                    .route("/{id}/photo", web::put().to(handlers::attach_photo))
                    .route("/{id}/estimate", web::post().to(handlers::request_estimate))
                    .route("/{id}/contact", web::post().to(handlers::schedule_formal_estimate))
                    .route("/{id}/back", web::post().to(handlers::back_to_result))
                    .route("/{id}/submit", web::post().to(handlers::submit_contact))
                    .route("/{id}/reset", web::post().to(handlers::start_over))
            )
    );
}
