//! One conversation: an engine plus the question waiting for an answer

use crate::candidate::Candidate;
use crate::engine::DisambiguationEngine;
use crate::geocoder::Geocoder;
use crate::phrases::PhraseRules;
use crate::question::Question;
use crate::transport::Transport;
use std::sync::Arc;
use tracing::info;

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Ask the user this
    Prompt(String),
    /// Conversation finished
    Resolved(Candidate),
}

#[derive(Debug, Clone)]
pub struct Conversation {
    engine: DisambiguationEngine,
    question: Option<Question>,
}

impl Conversation {
    pub fn new(rules: Arc<PhraseRules>) -> Self {
        Self {
            engine: DisambiguationEngine::new(rules),
            question: None,
        }
    }

    pub fn engine(&self) -> &DisambiguationEngine {
        &self.engine
    }

    pub fn pending_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Process one message
    ///
    /// The text answers the pending question, if any; the very first message
    /// of a conversation only opens it. Once resolved, the same location is
    /// returned for any further message.
    pub async fn turn(&mut self, text: &str, geocoder: &dyn Geocoder) -> Reply {
        if let Some(question) = self.question.take() {
            self.engine.answer(&question, text);
        }

        if let Some(location) = self.engine.location() {
            info!(place_id = %location.place_id, "Location resolved");
            return Reply::Resolved(location.clone());
        }

        let question = self.engine.next(geocoder).await;
        let prompt = question.prompt(self.engine.on_the_road());
        self.question = Some(question);
        Reply::Prompt(prompt)
    }

    /// Process one message and hand the reply to `transport`
    ///
    /// Returns `true` when the conversation is finished and can be dropped.
    pub async fn turn_and_deliver(
        &mut self,
        session_id: &str,
        text: &str,
        geocoder: &dyn Geocoder,
        transport: &dyn Transport,
    ) -> bool {
        match self.turn(text, geocoder).await {
            Reply::Prompt(prompt) => {
                transport.deliver_prompt(session_id, &prompt).await;
                false
            }
            Reply::Resolved(location) => {
                transport.deliver_location(session_id, &location).await;
                true
            }
        }
    }
}
