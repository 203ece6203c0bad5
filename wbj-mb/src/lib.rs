//! wbj-mb library - Messenger bot
//!
//! Answers "Waar ben je?" conversations over the Messenger platform: the
//! webhook feeds user messages into per-sender conversations, and replies go
//! out through the Send API.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wbj_common::{Geocoder, Transport};

pub mod api;
pub mod error;
pub mod messenger;
pub mod sessions;

pub use messenger::MessengerClient;
pub use sessions::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub geocoder: Arc<dyn Geocoder>,
    pub transport: Arc<dyn Transport>,
    pub sessions: SessionStore,
    /// Webhook verification token; verification always fails without one
    pub verify_token: Option<String>,
}

impl AppState {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        transport: Arc<dyn Transport>,
        sessions: SessionStore,
        verify_token: Option<String>,
    ) -> Self {
        Self {
            geocoder,
            transport,
            sessions,
            verify_token,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::verify_webhook).post(api::receive_events))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
