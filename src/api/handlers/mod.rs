// src/api/handlers/mod.rs
mod health;
mod actions;
mod sessions;

pub use health::health_check;
pub use actions::{generate_estimate, submit_request};
pub use sessions::{
    attach_photo, back_to_result, create_session, delete_session, get_session, request_estimate,
    schedule_formal_estimate, set_description, start_over, submit_contact,
};
