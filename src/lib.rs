// src/lib.rs
pub mod actions;
pub mod api;
pub mod banner;
pub mod config;
pub mod errors;
pub mod estimator;
pub mod models;
pub mod providers;
pub mod relay;
pub mod session;
pub mod wizard;
