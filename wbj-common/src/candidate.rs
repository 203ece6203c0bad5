//! Candidate place records returned by the geocoder
//!
//! A candidate is immutable once received. The field names follow the
//! Nominatim JSON output (`place_id`, `display_name`, `address`, ...) so the
//! record deserializes directly from a search response.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One place returned by a geocoder search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque, stable identifier used for exclusion and equality
    #[serde(deserialize_with = "string_or_number")]
    pub place_id: String,

    /// OpenStreetMap object id (used for map links)
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub osm_id: Option<String>,

    /// OpenStreetMap object type: node, way or relation
    #[serde(default)]
    pub osm_type: Option<String>,

    /// User-facing name
    pub display_name: String,

    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,

    #[serde(deserialize_with = "coordinate")]
    pub lon: f64,

    /// Main OSM tag key, e.g. `railway`, `highway`, `amenity`
    #[serde(default)]
    pub class: Option<String>,

    /// Main OSM tag value, e.g. `station`, `pedestrian`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Address breakdown; keys are not guaranteed present
    #[serde(default)]
    pub address: BTreeMap<String, String>,

    #[serde(default)]
    pub namedetails: BTreeMap<String, String>,
}

impl Candidate {
    /// Create a candidate with only the required fields set
    pub fn new(
        place_id: impl Into<String>,
        display_name: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            place_id: place_id.into(),
            osm_id: None,
            osm_type: None,
            display_name: display_name.into(),
            lat,
            lon,
            class: None,
            kind: None,
            address: BTreeMap::new(),
            namedetails: BTreeMap::new(),
        }
    }

    /// Add an address component
    pub fn with_address(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.address.insert(key.into(), value.into());
        self
    }

    /// Set the main OSM tag (`class` = `kind`)
    pub fn with_tag(mut self, class: impl Into<String>, kind: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self.kind = Some(kind.into());
        self
    }

    /// Set the OpenStreetMap object reference
    pub fn with_osm(mut self, osm_type: impl Into<String>, osm_id: impl Into<String>) -> Self {
        self.osm_type = Some(osm_type.into());
        self.osm_id = Some(osm_id.into());
        self
    }

    /// Look up a field by path
    ///
    /// Single steps address top-level fields, two steps address an entry of
    /// one of the nested maps (`address`, `namedetails`). Unknown paths and
    /// missing keys yield `None`.
    pub fn field(&self, steps: &[String]) -> Option<&str> {
        match steps {
            [key] => match key.as_str() {
                "place_id" => Some(self.place_id.as_str()),
                "osm_id" => self.osm_id.as_deref(),
                "osm_type" => self.osm_type.as_deref(),
                "display_name" => Some(self.display_name.as_str()),
                "class" => self.class.as_deref(),
                "type" => self.kind.as_deref(),
                _ => None,
            },
            [section, key] => match section.as_str() {
                "address" => self.address.get(key).map(String::as_str),
                "namedetails" => self.namedetails.get(key).map(String::as_str),
                _ => None,
            },
            _ => None,
        }
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|v| v.map(StringOrNumber::into_string))
}

/// Nominatim sends coordinates as strings; accept plain numbers too
fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Text(String),
        Number(f64),
    }

    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(value) => Ok(value),
        Coordinate::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid coordinate {:?}: {}", text, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMINATIM_ENTRY: &str = r#"{
        "place_id": 1234567,
        "licence": "Data © OpenStreetMap contributors, ODbL 1.0.",
        "osm_type": "node",
        "osm_id": 2413845921,
        "lat": "53.2106",
        "lon": "6.5641",
        "display_name": "Groningen, Stationsplein, Groningen, Nederland",
        "class": "railway",
        "type": "station",
        "importance": 0.52,
        "address": {
            "railway": "Groningen",
            "road": "Stationsplein",
            "city": "Groningen",
            "country_code": "nl"
        },
        "namedetails": { "name": "Groningen" }
    }"#;

    #[test]
    fn test_decode_nominatim_entry() {
        let candidate: Candidate = serde_json::from_str(NOMINATIM_ENTRY).unwrap();

        assert_eq!(candidate.place_id, "1234567");
        assert_eq!(candidate.osm_id.as_deref(), Some("2413845921"));
        assert_eq!(candidate.osm_type.as_deref(), Some("node"));
        assert!((candidate.lat - 53.2106).abs() < 1e-9);
        assert!((candidate.lon - 6.5641).abs() < 1e-9);
        assert_eq!(candidate.class.as_deref(), Some("railway"));
        assert_eq!(candidate.kind.as_deref(), Some("station"));
        assert_eq!(candidate.address.get("city").map(String::as_str), Some("Groningen"));
    }

    #[test]
    fn test_decode_minimal_entry() {
        let json = r#"{"place_id": "42", "display_name": "Grote Markt", "lat": 53.2, "lon": 6.5}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();

        assert_eq!(candidate.place_id, "42");
        assert!(candidate.address.is_empty());
        assert!(candidate.osm_id.is_none());
    }

    #[test]
    fn test_decode_rejects_bad_coordinate() {
        let json = r#"{"place_id": "1", "display_name": "x", "lat": "north", "lon": "6.5"}"#;
        assert!(serde_json::from_str::<Candidate>(json).is_err());
    }

    #[test]
    fn test_field_lookup() {
        let candidate = Candidate::new("7", "Vismarkt", 53.21, 6.56)
            .with_address("city", "Groningen")
            .with_tag("highway", "pedestrian");

        fn path(steps: &[&str]) -> Vec<String> {
            steps.iter().map(|s| s.to_string()).collect()
        }

        assert_eq!(candidate.field(&path(&["place_id"])), Some("7"));
        assert_eq!(candidate.field(&path(&["type"])), Some("pedestrian"));
        assert_eq!(candidate.field(&path(&["address", "city"])), Some("Groningen"));
        assert_eq!(candidate.field(&path(&["address", "road"])), None);
        assert_eq!(candidate.field(&path(&["address", "city", "name"])), None);
        assert_eq!(candidate.field(&path(&["unknown"])), None);
    }
}
