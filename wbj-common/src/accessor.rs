//! Field accessors over candidate records
//!
//! An accessor is a read path that doubles as a value: it is applied to a
//! candidate to fetch a field, and compared/hashed structurally so that
//! constraints built on it deduplicate in a [`ConstraintSet`].
//!
//! [`ConstraintSet`]: crate::constraint::ConstraintSet

use crate::candidate::Candidate;
use std::fmt;

/// Result of applying an accessor
///
/// `Absent` is a value of its own: it differs from every present value,
/// including the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldValue {
    Absent,
    Present(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Present(value) => Some(value.as_str()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Present(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Present(value)
    }
}

impl From<Option<&str>> for FieldValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::from)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => write!(f, "<absent>"),
            FieldValue::Present(value) => write!(f, "{}", value),
        }
    }
}

/// Read path into a candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Accessor {
    /// Ordered lookup steps, e.g. `["address", "city"]`
    Path(Vec<String>),
    /// Children tried in order; the first present value wins
    FirstOf(Vec<Accessor>),
}

impl Accessor {
    pub fn path<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Accessor::Path(steps.into_iter().map(Into::into).collect())
    }

    pub fn first_of(children: impl IntoIterator<Item = Accessor>) -> Self {
        Accessor::FirstOf(children.into_iter().collect())
    }

    /// The candidate identifier (`place_id`)
    pub fn identifier() -> Self {
        Self::path(["place_id"])
    }

    /// `address.city`
    pub fn city() -> Self {
        Self::path(["address", "city"])
    }

    /// `address.pedestrian`, falling back to `address.road`
    pub fn street() -> Self {
        Self::first_of([
            Self::path(["address", "pedestrian"]),
            Self::path(["address", "road"]),
        ])
    }

    pub fn is_identifier(&self) -> bool {
        *self == Self::identifier()
    }

    /// Apply to a candidate; missing data yields [`FieldValue::Absent`]
    pub fn apply(&self, candidate: &Candidate) -> FieldValue {
        match self {
            Accessor::Path(steps) => candidate.field(steps).into(),
            Accessor::FirstOf(children) => children
                .iter()
                .map(|child| child.apply(candidate))
                .find(|value| !value.is_absent())
                .unwrap_or(FieldValue::Absent),
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Path(steps) => write!(f, "{}", steps.join(".")),
            Accessor::FirstOf(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vismarkt() -> Candidate {
        Candidate::new("1", "Vismarkt", 53.2163, 6.5636)
            .with_address("pedestrian", "Vismarkt")
            .with_address("road", "Akerkhof")
            .with_address("city", "Groningen")
    }

    #[test]
    fn test_path_present_and_absent() {
        let candidate = vismarkt();
        assert_eq!(Accessor::city().apply(&candidate), FieldValue::from("Groningen"));
        assert_eq!(
            Accessor::path(["address", "suburb"]).apply(&candidate),
            FieldValue::Absent
        );
    }

    #[test]
    fn test_first_of_priority() {
        let candidate = vismarkt();
        assert_eq!(Accessor::street().apply(&candidate), FieldValue::from("Vismarkt"));

        let road_only = Candidate::new("2", "Akerkhof", 53.21, 6.56).with_address("road", "Akerkhof");
        assert_eq!(Accessor::street().apply(&road_only), FieldValue::from("Akerkhof"));

        let neither = Candidate::new("3", "Nergens", 53.0, 6.0);
        assert_eq!(Accessor::street().apply(&neither), FieldValue::Absent);
    }

    #[test]
    fn test_absent_differs_from_empty_string() {
        let empty = Candidate::new("4", "Leeg", 0.0, 0.0).with_address("city", "");
        let value = Accessor::city().apply(&empty);
        assert_eq!(value, FieldValue::from(""));
        assert_ne!(value, FieldValue::Absent);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Accessor::city(), Accessor::path(["address", "city"]));
        assert_ne!(Accessor::city(), Accessor::path(["address", "town"]));
        assert!(Accessor::path(vec!["place_id".to_string()]).is_identifier());
        assert!(!Accessor::street().is_identifier());
    }

    #[test]
    fn test_display() {
        assert_eq!(Accessor::city().to_string(), "address.city");
        assert_eq!(Accessor::street().to_string(), "address.pedestrian|address.road");
    }
}
