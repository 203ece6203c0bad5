//! Geocoder contract
//!
//! The engine only needs one operation: search free text, skipping places
//! the user already rejected. Implementations own their timeouts; the engine
//! treats any error as "no results".

pub mod nominatim;

pub use nominatim::NominatimClient;

use crate::candidate::Candidate;
use crate::Result;
use async_trait::async_trait;

/// External place search
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Search `query`, leaving out candidates whose identifier is in `excluded_ids`
    ///
    /// Results are returned in the provider's ranking order.
    async fn search(&self, query: &str, excluded_ids: &[String]) -> Result<Vec<Candidate>>;
}
