//! Constraints and the conversation memory
//!
//! Everything the user confirmed or rejected is recorded as a [`Constraint`].
//! The [`ConstraintSet`] is the conjunction of all of them; it only ever
//! grows during a session, so the candidate space only shrinks.

use crate::accessor::{Accessor, FieldValue};
use crate::candidate::Candidate;
use std::collections::BTreeSet;
use std::fmt;

/// Whether the accessor value must match or differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Polarity {
    Equal,
    NotEqual,
}

/// Predicate over a candidate: `accessor(candidate) (==|!=) value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    pub accessor: Accessor,
    pub value: FieldValue,
    pub polarity: Polarity,
}

impl Constraint {
    pub fn equal(accessor: Accessor, value: impl Into<FieldValue>) -> Self {
        Self {
            accessor,
            value: value.into(),
            polarity: Polarity::Equal,
        }
    }

    pub fn not_equal(accessor: Accessor, value: impl Into<FieldValue>) -> Self {
        Self {
            accessor,
            value: value.into(),
            polarity: Polarity::NotEqual,
        }
    }

    pub fn test(&self, candidate: &Candidate) -> bool {
        let matches = self.accessor.apply(candidate) == self.value;
        match self.polarity {
            Polarity::Equal => matches,
            Polarity::NotEqual => !matches,
        }
    }

    /// Identifier rejected by this constraint, if it is an identifier exclusion
    pub fn excluded_identifier(&self) -> Option<&str> {
        if self.polarity == Polarity::NotEqual && self.accessor.is_identifier() {
            self.value.as_str()
        } else {
            None
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.polarity {
            Polarity::Equal => "is",
            Polarity::NotEqual => "is not",
        };
        write!(f, "{} {} {:?}", self.accessor, verb, self.value.to_string())
    }
}

/// Deduplicating conjunction of constraints
///
/// There is deliberately no way to remove a constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: BTreeSet<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint; returns `false` if it was already present
    pub fn add(&mut self, constraint: Constraint) -> bool {
        self.constraints.insert(constraint)
    }

    /// True iff every constraint holds (vacuously true when empty)
    pub fn test(&self, candidate: &Candidate) -> bool {
        self.constraints.iter().all(|c| c.test(candidate))
    }

    /// Keep the candidates that satisfy every constraint, preserving order
    pub fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates.into_iter().filter(|c| self.test(c)).collect()
    }

    /// Identifiers excluded by `place_id != x` constraints
    pub fn excluded_identifiers(&self) -> Vec<String> {
        self.constraints
            .iter()
            .filter_map(Constraint::excluded_identifier)
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.constraints.contains(constraint)
    }

    pub fn is_superset(&self, other: &ConstraintSet) -> bool {
        self.constraints.is_superset(&other.constraints)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{}", constraint)?;
        }
        write!(f, "]")
    }
}
