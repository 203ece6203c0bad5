//! Messenger Send API transport
//!
//! Delivers prompts as plain text messages and the resolved location as a
//! text line followed by a generic-template card with a static map.
//!
//! # API Reference
//! - Endpoint: POST https://graph.facebook.com/v2.6/me/messages?access_token=...
//! - Body: `{"recipient": {"id": ...}, "message": {...}}`

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use wbj_common::config::{MapConfig, MessengerConfig};
use wbj_common::links::{osm_link, static_map_link};
use wbj_common::{Candidate, Error, Result, Transport};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Size of the map image in the location card
const CARD_MAP_SIZE: (u32, u32) = (400, 300);

pub struct MessengerClient {
    http_client: Client,
    messages_url: String,
    page_access_token: String,
    maps: MapConfig,
}

impl MessengerClient {
    pub fn new(config: &MessengerConfig, maps: MapConfig) -> Result<Self> {
        let page_access_token = config
            .page_access_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Page access token not configured. Set PAGE_ACCESS_TOKEN or \
                     [messenger] page_access_token in the TOML config"
                        .to_string(),
                )
            })?;

        Ok(Self {
            http_client: Client::builder().timeout(DEFAULT_TIMEOUT).build()?,
            messages_url: format!("{}/me/messages", config.graph_api_url.trim_end_matches('/')),
            page_access_token,
            maps,
        })
    }

    /// POST one message to the Send API
    pub async fn send(&self, recipient_id: &str, message: Value) -> Result<()> {
        let body = json!({
            "recipient": { "id": recipient_id },
            "message": message,
        });
        debug!(recipient = %recipient_id, "Sending message: {}", body);

        let response = self
            .http_client
            .post(&self.messages_url)
            .query(&[("access_token", self.page_access_token.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "Send API returned {}: {}",
                status, text
            )));
        }
        Ok(())
    }

    async fn send_logged(&self, recipient_id: &str, message: Value) {
        if let Err(e) = self.send(recipient_id, message).await {
            warn!(recipient = %recipient_id, "Message delivery failed: {}", e);
        }
    }
}

#[async_trait]
impl Transport for MessengerClient {
    async fn deliver_prompt(&self, session_id: &str, text: &str) {
        self.send_logged(session_id, text_message(text)).await;
    }

    async fn deliver_location(&self, session_id: &str, location: &Candidate) {
        self.send_logged(session_id, text_message(&resolved_text(location)))
            .await;
        self.send_logged(session_id, location_card(location, &self.maps))
            .await;
    }
}

pub fn text_message(text: &str) -> Value {
    json!({ "text": text })
}

/// Confirmation line sent before the card
pub fn resolved_text(location: &Candidate) -> String {
    format!("Je bent hier: {}", location.display_name)
}

/// Generic template with map image and OpenStreetMap link
pub fn location_card(location: &Candidate, maps: &MapConfig) -> Value {
    let link = osm_link(location);
    json!({
        "attachment": {
            "type": "template",
            "payload": {
                "template_type": "generic",
                "elements": [
                    {
                        "title": location.display_name,
                        "image_url": static_map_link(location, maps, CARD_MAP_SIZE),
                        "default_action": {
                            "type": "web_url",
                            "url": link,
                        },
                        "buttons": [
                            {
                                "type": "web_url",
                                "url": link,
                                "title": "Open in OpenStreetMap",
                            }
                        ]
                    }
                ]
            }
        }
    })
}
