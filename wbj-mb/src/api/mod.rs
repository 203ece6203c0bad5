//! HTTP API handlers for wbj-mb

pub mod health;
pub mod webhook;

pub use health::health_routes;
pub use webhook::{receive_events, verify_webhook};
