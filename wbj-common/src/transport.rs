//! Transport contract
//!
//! How prompts and the final location reach the user. Delivery is
//! fire-and-forget: implementations log their own failures.

use crate::candidate::Candidate;
use async_trait::async_trait;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a question or other text to the user behind `session_id`
    async fn deliver_prompt(&self, session_id: &str, text: &str);

    /// Send the resolved location; called once per session
    async fn deliver_location(&self, session_id: &str, location: &Candidate);
}
