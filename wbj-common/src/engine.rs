//! Disambiguation engine
//!
//! Owns the query queue, the constraint memory, the last fetched candidates
//! and the resolved location of one conversation, and decides which
//! [`Question`] to ask next.

use crate::accessor::Accessor;
use crate::candidate::Candidate;
use crate::constraint::ConstraintSet;
use crate::geocoder::Geocoder;
use crate::phrases::PhraseRules;
use crate::query::QueryQueue;
use crate::question::{Effect, Question};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Features used to tell candidates apart, in priority order
pub fn distinctive_features() -> [Accessor; 2] {
    [Accessor::city(), Accessor::street()]
}

/// First feature whose value differs between candidates
///
/// Absence counts as a value of its own. Returns `None` when every feature is
/// the same for all candidates.
pub fn find_distinctive_feature(candidates: &[Candidate]) -> Option<Accessor> {
    distinctive_features().into_iter().find(|feature| {
        let values: HashSet<_> = candidates.iter().map(|c| feature.apply(c)).collect();
        values.len() > 1
    })
}

/// Per-conversation dialogue state
#[derive(Debug, Clone)]
pub struct DisambiguationEngine {
    query: QueryQueue,
    memory: ConstraintSet,
    /// Candidates of the last search; `None` until the first one
    options: Option<Vec<Candidate>>,
    location: Option<Candidate>,
    on_the_road: bool,
    rules: Arc<PhraseRules>,
}

impl DisambiguationEngine {
    pub fn new(rules: Arc<PhraseRules>) -> Self {
        Self {
            query: QueryQueue::new(),
            memory: ConstraintSet::new(),
            options: None,
            location: None,
            on_the_road: false,
            rules,
        }
    }

    pub fn query(&self) -> &QueryQueue {
        &self.query
    }

    pub fn memory(&self) -> &ConstraintSet {
        &self.memory
    }

    pub fn options(&self) -> Option<&[Candidate]> {
        self.options.as_deref()
    }

    pub fn location(&self) -> Option<&Candidate> {
        self.location.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    pub fn on_the_road(&self) -> bool {
        self.on_the_road
    }

    /// Decide the next question
    ///
    /// Searches the geocoder whenever the query queue is non-empty; results
    /// are never reused across turns. Must not be called once resolved.
    pub async fn next(&mut self, geocoder: &dyn Geocoder) -> Question {
        debug_assert!(self.location.is_none(), "next() called on a resolved engine");

        if self.query.is_empty() {
            return if self.on_the_road {
                Question::WhereAreYouGoing
            } else {
                Question::WhereAreYou
            };
        }

        let options = self.update_options(geocoder).await;

        let question = match options.len() {
            0 => Question::CouldntUnderstand,
            1 => Question::IsThisHere(options[0].clone()),
            _ => match find_distinctive_feature(&options) {
                Some(feature) => Question::IsThisInFeature { feature, options },
                None => Question::WhichOneDoYouMean(options),
            },
        };

        debug!(question = question.kind(), "Next question");
        question
    }

    /// Fetch candidates for the current query and keep those matching memory
    async fn update_options(&mut self, geocoder: &dyn Geocoder) -> Vec<Candidate> {
        let search = self.query.join();
        let excluded = self.memory.excluded_identifiers();

        let raw = match geocoder.search(&search, &excluded).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(query = %search, "Geocoder search failed, treating as no results: {}", e);
                Vec::new()
            }
        };

        let found = raw.len();
        let options = self.memory.filter(raw);
        debug!(
            query = %search,
            found,
            kept = options.len(),
            memory = %self.memory,
            "Updated options"
        );

        self.options = Some(options.clone());
        options
    }

    /// Interpret an answer to `question` and apply the resulting effects
    pub fn answer(&mut self, question: &Question, answer: &str) {
        let effects = question.interpret(answer, &self.rules);
        debug!(question = question.kind(), effects = effects.len(), "Interpreted answer");
        for effect in effects {
            self.apply(effect);
        }
    }

    /// Apply one state change
    ///
    /// Constraints are only ever added; nothing here removes one.
    pub fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SetOnTheRoad => self.on_the_road = true,
            Effect::ResetQuery(items) => self.query.reset(items),
            Effect::Enqueue(item) => self.query.enqueue(item),
            Effect::Constrain(constraint) => {
                self.memory.add(constraint);
            }
            Effect::Resolve(candidate) => self.location = Some(candidate),
        }
    }
}
