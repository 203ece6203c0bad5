//! Query queue
//!
//! Free-text fragments waiting to be sent to the geocoder. The joined queue
//! is the literal search string.

use std::collections::VecDeque;

/// Separator used when joining fragments into a search string
const SEPARATOR: &str = ", ";

/// Ordered, replaceable sequence of search fragments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryQueue {
    items: VecDeque<String>,
}

impl QueryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole queue (the user restated their location)
    pub fn reset<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
    }

    /// Append a refinement, keeping earlier fragments
    pub fn enqueue(&mut self, item: impl Into<String>) {
        self.items.push_back(item.into());
    }

    /// Remove and return the oldest fragment
    pub fn dequeue(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Search string sent to the geocoder
    pub fn join(&self) -> String {
        self.iter().collect::<Vec<_>>().join(SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queue_is_empty() {
        let queue = QueryQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.join(), "");
    }

    #[test]
    fn test_enqueue_keeps_order() {
        let mut queue = QueryQueue::new();
        queue.enqueue("Grote Markt");
        queue.enqueue("Groningen");

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec!["Grote Markt", "Groningen"]);
        assert_eq!(queue.join(), "Grote Markt, Groningen");
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut queue = QueryQueue::new();
        queue.enqueue("Vismarkt");
        queue.enqueue("Haren");
        queue.reset(["Utrecht Centraal"]);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.join(), "Utrecht Centraal");

        queue.reset(Vec::<String>::new());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_removes_oldest() {
        let mut queue = QueryQueue::new();
        queue.reset(["a", "b", "c"]);

        assert_eq!(queue.dequeue().as_deref(), Some("a"));
        assert_eq!(queue.join(), "b, c");
        queue.dequeue();
        queue.dequeue();
        assert_eq!(queue.dequeue(), None);
    }
}
