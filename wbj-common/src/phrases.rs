//! Reading user answers
//!
//! All pattern matching on raw text happens here; questions only ever see
//! the extracted phrases. The vocabulary comes from [`PhraseConfig`], so the
//! rules can be tuned without touching the dialogue logic.

use crate::config::PhraseConfig;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static DEFAULT_RULES: Lazy<PhraseRules> = Lazy::new(PhraseRules::default);

/// Affirmation check with the built-in vocabulary
pub fn is_positive(answer: &str) -> bool {
    DEFAULT_RULES.is_positive(answer)
}

/// Means of transport mentioned by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    Train,
    Bus,
}

/// Everything the rules can tell about one answer
///
/// Questions interpret answers from this alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reading {
    pub affirmative: bool,
    pub transit: Option<Transit>,
    /// User talks about where they are going rather than where they are
    pub en_route: bool,
    pub destination: Option<String>,
    /// Place phrase with "ik ben bij (de)" stripped
    pub location: Option<String>,
    /// Place phrase with "ik ga naar (de)" stripped
    pub heading: Option<String>,
    /// Descriptive text left after stripping a leading negation
    pub residual: Option<String>,
}

/// Compiled answer patterns
#[derive(Debug, Clone)]
pub struct PhraseRules {
    affirmative: Option<Regex>,
    refinement: Regex,
    train: Option<Regex>,
    bus: Option<Regex>,
    destination: Option<Regex>,
    location: Regex,
    heading: Regex,
    requeue_refinements: bool,
}

impl PhraseRules {
    pub fn new(config: &PhraseConfig) -> Result<Self> {
        let affirmations = stretched_alternation(&config.affirmations);
        let negations = alternation(&config.negations);
        let directions = alternation(&config.directions);
        let prepositions = alternation(&config.prepositions);

        let negation_prefix = negations
            .map(|n| format!(r"(?:{}\b[\s,.!]*)?", n))
            .unwrap_or_default();
        let direction_prefix = directions
            .as_ref()
            .map(|d| format!(r"(?:{}\s+(?:de\s+|het\s+)?)?", d))
            .unwrap_or_default();
        let preposition_prefix = prepositions
            .map(|p| format!(r"(?:{}\s+(?:de\s+|het\s+)?)?", p))
            .unwrap_or_default();

        Ok(Self {
            affirmative: affirmations
                .map(|a| compile(&format!(r"(?i)^\s*{}\b!*", a)))
                .transpose()?,
            refinement: compile(&format!(
                r"(?is)^\s*{}(?:(?:die\s+)?in\s+)?(.*?)[\s.!?]*$",
                negation_prefix
            ))?,
            train: alternation(&config.train_keywords)
                .map(|k| compile(&format!(r"(?i)\b{}\b", k)))
                .transpose()?,
            bus: alternation(&config.bus_keywords)
                .map(|k| compile(&format!(r"(?i)\b{}\b", k)))
                .transpose()?,
            destination: directions
                .map(|d| compile(&format!(r"(?is)\b{}\s+(?:de\s+|het\s+)?(.+?)[\s.!?]*$", d)))
                .transpose()?,
            location: compile(&format!(
                r"(?is)^\s*(?:ik\s+ben\s+)?{}(.+?)[\s.!?]*$",
                preposition_prefix
            ))?,
            heading: compile(&format!(
                r"(?is)^\s*(?:ik\s+ga\s+)?{}(.+?)[\s.!?]*$",
                direction_prefix
            ))?,
            requeue_refinements: config.requeue_refinements,
        })
    }

    /// "Ja!!", "yes", "inderdaad" ... anchored at the start of the answer
    pub fn is_positive(&self, answer: &str) -> bool {
        self.affirmative
            .as_ref()
            .is_some_and(|re| re.is_match(answer))
    }

    /// Train takes precedence when both are mentioned
    pub fn transit(&self, answer: &str) -> Option<Transit> {
        if self.train.as_ref().is_some_and(|re| re.is_match(answer)) {
            Some(Transit::Train)
        } else if self.bus.as_ref().is_some_and(|re| re.is_match(answer)) {
            Some(Transit::Bus)
        } else {
            None
        }
    }

    /// "... naar Utrecht" / "... richting de Dom" → "Utrecht" / "Dom"
    pub fn destination(&self, answer: &str) -> Option<String> {
        self.destination
            .as_ref()
            .and_then(|re| capture(re, answer))
    }

    /// Place phrase from "Ik ben bij de Vismarkt"; the whole answer otherwise
    pub fn location(&self, answer: &str) -> Option<String> {
        capture(&self.location, answer).or_else(|| non_empty(answer))
    }

    /// Place phrase from "Ik ga naar de Martinitoren"; the whole answer otherwise
    pub fn heading(&self, answer: &str) -> Option<String> {
        capture(&self.heading, answer).or_else(|| non_empty(answer))
    }

    /// Extra description following a negation: "nee, in Haren" → "Haren"
    ///
    /// A bare negation yields `None`; so does every answer when refinements
    /// are switched off.
    pub fn refinement(&self, answer: &str) -> Option<String> {
        if !self.requeue_refinements {
            return None;
        }
        capture(&self.refinement, answer)
    }

    /// Parse an answer once into everything the questions need
    pub fn read(&self, answer: &str) -> Reading {
        let affirmative = self.is_positive(answer);
        let transit = self.transit(answer);
        let destination = self.destination(answer);
        Reading {
            affirmative,
            transit,
            en_route: transit.is_some() || destination.is_some(),
            destination,
            location: self.location(answer),
            heading: self.heading(answer),
            residual: if affirmative { None } else { self.refinement(answer) },
        }
    }
}

impl Default for PhraseRules {
    fn default() -> Self {
        Self::new(&PhraseConfig::default()).expect("built-in phrase rules must compile")
    }
}

/// `(?:ja|goed\s+zo|...)` from a word list; `None` when the list is empty
fn alternation(words: &[String]) -> Option<String> {
    alternation_of(words, false)
}

/// Like [`alternation`], with the last letter of every word repeatable
fn stretched_alternation(words: &[String]) -> Option<String> {
    alternation_of(words, true)
}

fn alternation_of(words: &[String], stretch: bool) -> Option<String> {
    let words: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut pattern = w
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            if stretch && w.ends_with(char::is_alphanumeric) {
                pattern.push('+');
            }
            pattern
        })
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(format!("(?:{})", words.join("|")))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("Invalid phrase pattern: {}", e)))
}

fn capture(re: &Regex, answer: &str) -> Option<String> {
    re.captures(answer)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
