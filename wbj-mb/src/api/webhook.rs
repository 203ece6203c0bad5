//! Messenger webhook
//!
//! - `GET /`: subscription handshake. The platform sends `hub.mode=subscribe`,
//!   `hub.verify_token` and `hub.challenge`; the challenge is echoed when the
//!   token matches ours.
//! - `POST /`: event batches. Every text message from a user runs one
//!   conversation turn for that user. Other event types are acknowledged.

use axum::{
    body::Bytes,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

// ============================================================================
// Verification
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> ApiResult<String> {
    let challenge = match (params.mode.as_deref(), params.challenge) {
        (Some("subscribe"), Some(challenge)) => challenge,
        _ => return Ok("Hello world".to_string()),
    };

    let matches = match (&state.verify_token, &params.verify_token) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };
    if !matches {
        warn!("Webhook verification rejected");
        return Err(ApiError::Forbidden("Verification token mismatch".to_string()));
    }

    debug!("Webhook verified");
    Ok(challenge)
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    /// Page id
    pub id: String,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessagingEvent {
    pub sender: Party,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub delivery: Option<Value>,
    #[serde(default)]
    pub optin: Option<Value>,
    #[serde(default)]
    pub postback: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /
///
/// Always acknowledged with 200, since the platform redelivers anything else.
/// Events of one batch run in order, so a sender's messages are answered in
/// the order they were written.
pub async fn receive_events(State(state): State<AppState>, body: Bytes) -> &'static str {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Dropping malformed webhook payload: {}", e);
            return "ok";
        }
    };

    if payload.object != "page" {
        debug!(object = %payload.object, "Ignoring non-page webhook");
        return "ok";
    }

    for entry in &payload.entry {
        for event in &entry.messaging {
            handle_event(&state, &entry.id, event).await;
        }
    }

    "ok"
}

async fn handle_event(state: &AppState, page_id: &str, event: &MessagingEvent) {
    let sender = event.sender.id.as_str();

    // Echoes of our own messages
    if sender == page_id {
        return;
    }

    if let Some(text) = event.message.as_ref().and_then(|m| m.text.as_deref()) {
        debug!(sender = %sender, "Message: {}", text);
        state
            .sessions
            .handle_message(sender, text, state.geocoder.as_ref(), state.transport.as_ref())
            .await;
    } else if event.delivery.is_some() {
        debug!(sender = %sender, "Delivery confirmation");
    } else if event.optin.is_some() {
        debug!(sender = %sender, "Opt-in");
    } else if event.postback.is_some() {
        debug!(sender = %sender, "Postback");
    } else {
        debug!(sender = %sender, "Ignoring event without text");
    }
}
