//! # WBJ Common Library
//!
//! Conversation engine for finding out where someone is (or where they are
//! going) by asking short clarifying questions:
//! - Candidate records, field accessors and constraints
//! - Query queue and disambiguation engine
//! - Questions and answer parsing
//! - Geocoder and transport contracts, Nominatim client
//! - Configuration loading

pub mod accessor;
pub mod candidate;
pub mod config;
pub mod constraint;
pub mod dialogue;
pub mod engine;
pub mod error;
pub mod geocoder;
pub mod links;
pub mod phrases;
pub mod query;
pub mod question;
pub mod transport;

pub use accessor::{Accessor, FieldValue};
pub use candidate::Candidate;
pub use constraint::{Constraint, ConstraintSet, Polarity};
pub use dialogue::{Conversation, Reply};
pub use engine::DisambiguationEngine;
pub use error::{Error, Result};
pub use geocoder::Geocoder;
pub use phrases::PhraseRules;
pub use question::{Effect, Question};
pub use transport::Transport;
