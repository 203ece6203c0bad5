//! Session store
//!
//! One [`Conversation`] per sender. A conversation is created by the first
//! message from a sender and dropped as soon as its location is delivered.
//! Turns of one sender run one at a time; different senders run in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use wbj_common::{Conversation, Geocoder, PhraseRules, Transport};

type SharedConversation = Arc<Mutex<Conversation>>;

#[derive(Clone)]
pub struct SessionStore {
    rules: Arc<PhraseRules>,
    sessions: Arc<RwLock<HashMap<String, SharedConversation>>>,
}

impl SessionStore {
    pub fn new(rules: Arc<PhraseRules>) -> Self {
        Self {
            rules,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Conversation for `session_id`, created on first use
    async fn conversation(&self, session_id: &str) -> SharedConversation {
        if let Some(existing) = self.sessions.read().await.get(session_id) {
            return existing.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!(session = %session_id, "New conversation");
                Arc::new(Mutex::new(Conversation::new(self.rules.clone())))
            })
            .clone()
    }

    /// Run one turn for `session_id` and deliver the reply
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
        geocoder: &dyn Geocoder,
        transport: &dyn Transport,
    ) {
        let shared = self.conversation(session_id).await;
        let mut conversation = shared.lock().await;

        // A message queued behind the resolving turn finds a finished conversation
        if conversation.engine().is_resolved() {
            debug!(session = %session_id, "Dropping message for finished conversation");
            return;
        }

        let finished = conversation
            .turn_and_deliver(session_id, text, geocoder, transport)
            .await;
        drop(conversation);

        if finished {
            self.remove_if_current(session_id, &shared).await;
        }
    }

    /// Remove the entry, unless it was already replaced by a newer conversation
    async fn remove_if_current(&self, session_id: &str, finished: &SharedConversation) {
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, finished))
        {
            sessions.remove(session_id);
            info!(session = %session_id, "Conversation finished");
        }
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::{Notify, Semaphore};
    use wbj_common::{Candidate, Result};

    struct OnePlace;

    #[async_trait]
    impl Geocoder for OnePlace {
        async fn search(&self, _query: &str, excluded_ids: &[String]) -> Result<Vec<Candidate>> {
            let place = Candidate::new("42", "Grote Markt, Groningen", 53.2, 6.5);
            Ok(if excluded_ids.contains(&place.place_id) {
                Vec::new()
            } else {
                vec![place]
            })
        }
    }

    /// Holds every search until released and tracks overlapping searches
    struct GatedPlace {
        gate: Semaphore,
        entered: Notify,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl GatedPlace {
        fn new() -> Self {
            Self {
                gate: Semaphore::new(0),
                entered: Notify::new(),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Geocoder for GatedPlace {
        async fn search(&self, query: &str, excluded_ids: &[String]) -> Result<Vec<Candidate>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            self.entered.notify_one();

            let _permit = self.gate.acquire().await.unwrap();
            self.active.fetch_sub(1, Ordering::SeqCst);
            OnePlace.search(query, excluded_ids).await
        }
    }

    #[derive(Default)]
    struct Recorder {
        sent: StdMutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn deliver_prompt(&self, session_id: &str, text: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((session_id.to_string(), text.to_string()));
        }

        async fn deliver_location(&self, session_id: &str, location: &Candidate) {
            self.sent
                .lock()
                .unwrap()
                .push((session_id.to_string(), format!("location:{}", location.place_id)));
        }
    }

    #[tokio::test]
    async fn test_sessions_are_created_and_removed() {
        let store = SessionStore::new(Arc::new(PhraseRules::default()));
        let transport = Recorder::default();

        store.handle_message("alice", "hoi", &OnePlace, &transport).await;
        store.handle_message("bob", "hallo", &OnePlace, &transport).await;
        assert_eq!(store.len().await, 2);

        store.handle_message("alice", "Grote Markt", &OnePlace, &transport).await;
        store.handle_message("alice", "ja", &OnePlace, &transport).await;

        assert!(!store.contains("alice").await);
        assert!(store.contains("bob").await);

        let sent = transport.sent.lock().unwrap().clone();
        let alice: Vec<&str> = sent
            .iter()
            .filter(|(id, _)| id == "alice")
            .map(|(_, text)| text.as_str())
            .collect();
        assert_eq!(
            alice,
            vec!["Waar ben je?", "Ben je op Grote Markt, Groningen?", "location:42"]
        );
    }

    #[tokio::test]
    async fn test_new_conversation_after_resolution() {
        let store = SessionStore::new(Arc::new(PhraseRules::default()));
        let transport = Recorder::default();

        for text in ["hoi", "Grote Markt", "ja", "nog een keer"] {
            store.handle_message("carol", text, &OnePlace, &transport).await;
        }

        assert!(store.contains("carol").await);
        let sent = transport.sent.lock().unwrap().clone();
        assert_eq!(sent.last().map(|(_, t)| t.as_str()), Some("Waar ben je?"));
    }

    #[tokio::test]
    async fn test_turns_of_one_sender_run_one_at_a_time() {
        let store = SessionStore::new(Arc::new(PhraseRules::default()));
        let geocoder = Arc::new(GatedPlace::new());
        let transport = Arc::new(Recorder::default());

        store
            .handle_message("dave", "hoi", geocoder.as_ref(), transport.as_ref())
            .await;

        let spawn_turn = |text: &'static str| {
            let store = store.clone();
            let geocoder = geocoder.clone();
            let transport = transport.clone();
            tokio::spawn(async move {
                store
                    .handle_message("dave", text, geocoder.as_ref(), transport.as_ref())
                    .await
            })
        };

        // First turn searches and blocks inside the geocoder
        let searching = spawn_turn("Grote Markt");
        geocoder.entered.notified().await;

        // Both queue behind it: the answer resolves, the straggler finds it finished
        let confirming = spawn_turn("ja");
        tokio::time::sleep(Duration::from_millis(50)).await;
        let straggler = spawn_turn("ja");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(transport.sent.lock().unwrap().len(), 1);

        geocoder.gate.add_permits(10);
        searching.await.unwrap();
        confirming.await.unwrap();
        straggler.await.unwrap();

        assert_eq!(geocoder.max_active.load(Ordering::SeqCst), 1);
        let sent: Vec<String> = transport
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect();
        assert_eq!(
            sent,
            vec!["Waar ben je?", "Ben je op Grote Markt, Groningen?", "location:42"]
        );
        assert!(!store.contains("dave").await);
    }
}
