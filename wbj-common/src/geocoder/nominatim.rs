//! Nominatim client
//!
//! Searches OpenStreetMap data through the Nominatim `/search` endpoint.
//!
//! # API Reference
//! - Endpoint: https://nominatim.openstreetmap.org/search
//! - Documentation: https://nominatim.org/release-docs/latest/api/Search/
//! - Usage policy: at most 1 request/second, identifying User-Agent

use super::Geocoder;
use crate::candidate::Candidate;
use crate::config::GeocoderConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Nominatim search client
///
/// Requests are spaced by `min_interval_ms` across all sessions sharing the
/// client, so one instance should be shared process-wide.
pub struct NominatimClient {
    http_client: Client,
    search_url: String,
    country_codes: String,
    limit: u32,
    email: Option<String>,
    min_interval: Duration,
    /// Rate limiter (last request time)
    rate_limiter: Arc<Mutex<Option<Instant>>>,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let user_agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::Config(format!("Invalid user agent: {}", e)))?;
        headers.insert(header::USER_AGENT, user_agent);

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            search_url: format!("{}/search", config.endpoint.trim_end_matches('/')),
            country_codes: config.country_codes.clone(),
            limit: config.limit,
            email: config.email.clone(),
            min_interval: Duration::from_millis(config.min_interval_ms),
            rate_limiter: Arc::new(Mutex::new(None)),
        })
    }

    /// Sleep if the previous request was less than `min_interval` ago
    async fn enforce_rate_limit(&self) {
        let mut last_request = self.rate_limiter.lock().await;

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let sleep_duration = self.min_interval - elapsed;
                debug!(
                    sleep_ms = sleep_duration.as_millis(),
                    "Rate limiting: sleeping before Nominatim request"
                );
                sleep(sleep_duration).await;
            }
        }

        *last_request = Some(Instant::now());
    }

    /// Query parameters for one search
    fn search_params(&self, query: &str, excluded_ids: &[String]) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("countrycodes", self.country_codes.clone()),
            ("namedetails", "1".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !excluded_ids.is_empty() {
            params.push(("exclude_place_ids", excluded_ids.join(",")));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        params
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str, excluded_ids: &[String]) -> Result<Vec<Candidate>> {
        let params = self.search_params(query, excluded_ids);
        debug!(query = %query, excluded = excluded_ids.len(), "Querying Nominatim");

        self.enforce_rate_limit().await;

        let response = self
            .http_client
            .get(&self.search_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Geocoder(format!(
                "Nominatim returned error {}: {}",
                status, body
            )));
        }

        let candidates: Vec<Candidate> = response.json().await.map_err(|e| {
            Error::Geocoder(format!("Failed to parse Nominatim response: {}", e))
        })?;

        debug!(query = %query, results = candidates.len(), "Nominatim query complete");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(min_interval_ms: u64) -> NominatimClient {
        let config = GeocoderConfig {
            email: Some("bot@example.org".to_string()),
            min_interval_ms,
            ..GeocoderConfig::default()
        };
        NominatimClient::new(&config).unwrap()
    }

    #[test]
    fn test_search_url() {
        let config = GeocoderConfig {
            endpoint: "http://localhost:8080/".to_string(),
            ..GeocoderConfig::default()
        };
        let client = NominatimClient::new(&config).unwrap();
        assert_eq!(client.search_url, "http://localhost:8080/search");
    }

    #[test]
    fn test_search_params() {
        let client = client(1000);
        let params = client.search_params("Grote Markt, Groningen", &["1".to_string(), "2".to_string()]);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("q"), Some("Grote Markt, Groningen"));
        assert_eq!(get("format"), Some("json"));
        assert_eq!(get("countrycodes"), Some("nl"));
        assert_eq!(get("addressdetails"), Some("1"));
        assert_eq!(get("limit"), Some("20"));
        assert_eq!(get("exclude_place_ids"), Some("1,2"));
        assert_eq!(get("email"), Some("bot@example.org"));
    }

    #[test]
    fn test_search_params_without_exclusions() {
        let client = client(1000);
        let params = client.search_params("Vismarkt", &[]);
        assert!(params.iter().all(|(k, _)| *k != "exclude_place_ids"));
    }

    #[test]
    fn test_invalid_user_agent_is_config_error() {
        let config = GeocoderConfig {
            user_agent: "bad\nagent".to_string(),
            ..GeocoderConfig::default()
        };
        assert!(matches!(NominatimClient::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_rate_limiting() {
        let client = client(300);

        // First request should not sleep
        let start = Instant::now();
        client.enforce_rate_limit().await;
        assert!(start.elapsed().as_millis() < 100, "First request should be immediate");

        // Second request within the interval should sleep
        let start = Instant::now();
        client.enforce_rate_limit().await;
        let elapsed = start.elapsed();
        assert!(
            elapsed.as_millis() >= 250,
            "Second request should sleep ~300ms, got {}ms",
            elapsed.as_millis()
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_error() {
        let config = GeocoderConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            min_interval_ms: 0,
            ..GeocoderConfig::default()
        };
        let client = NominatimClient::new(&config).unwrap();
        assert!(client.search("Vismarkt", &[]).await.is_err());
    }
}
