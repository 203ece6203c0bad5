//! Bootstrap configuration
//!
//! All settings live in one optional TOML file. Every section and every key
//! has a built-in default, so a missing file only produces a warning.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments / environment variables (handled by the binaries)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub messenger: MessengerConfig,
    pub geocoder: GeocoderConfig,
    pub maps: MapConfig,
    pub logging: LoggingConfig,
    pub phrases: PhraseConfig,
}

/// HTTP listener for the webhook
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Messenger platform credentials and endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessengerConfig {
    /// Token echoed during webhook verification
    pub verify_token: Option<String>,
    /// Page token for the Send API
    pub page_access_token: Option<String>,
    pub graph_api_url: String,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            page_access_token: None,
            graph_api_url: "https://graph.facebook.com/v2.6".to_string(),
        }
    }
}

/// Nominatim search settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Base URL; `/search` is appended
    pub endpoint: String,
    /// Comma separated ISO 3166-1 alpha-2 codes
    pub country_codes: String,
    /// Maximum number of results per search
    pub limit: u32,
    /// Contact address sent along with every request (Nominatim usage policy)
    pub email: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two requests
    pub min_interval_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "nl".to_string(),
            limit: 20,
            email: None,
            user_agent: concat!("wbj/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            min_interval_ms: 1000,
        }
    }
}

/// Static map rendering
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub static_map_url: String,
    pub zoom: u8,
    pub marker: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            static_map_url: "http://staticmap.openstreetmap.de/staticmap.php".to_string(),
            zoom: 18,
            marker: "lightblue1".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Vocabulary used to read user answers
///
/// Tokens are matched case-insensitively as whole words. The last letter of
/// an affirmation may be stretched: "ja" also accepts "jaa" and "jaaa".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhraseConfig {
    /// Answers starting with one of these count as "yes"
    pub affirmations: Vec<String>,
    /// Leading words stripped from a "no, ..." answer
    pub negations: Vec<String>,
    /// Mentioning one of these means the user is on a train
    pub train_keywords: Vec<String>,
    /// Mentioning one of these means the user is on a bus
    pub bus_keywords: Vec<String>,
    /// Words introducing a destination ("naar Utrecht")
    pub directions: Vec<String>,
    /// Prepositions stripped from a location ("bij de Vismarkt")
    pub prepositions: Vec<String>,
    /// Whether text after a negative answer is added to the search
    pub requeue_refinements: bool,
}

impl Default for PhraseConfig {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| w.to_string()).collect()
        }

        Self {
            affirmations: words(&[
                "ja", "jawel", "jazeker", "yes", "jup", "yup", "inderdaad", "goed zo",
            ]),
            negations: words(&["nee", "neen", "nope", "no"]),
            train_keywords: words(&["trein"]),
            bus_keywords: words(&["bus"]),
            directions: words(&["naar", "richting"]),
            prepositions: words(&["bij", "in", "op"]),
            requeue_refinements: true,
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Built-in defaults; carries the location that was tried, if any
    Defaults(Option<PathBuf>),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults(Some(path)) => {
                write!(f, "built-in defaults (no file at {})", path.display())
            }
            ConfigSource::Defaults(None) => write!(f, "built-in defaults"),
        }
    }
}

impl TomlConfig {
    /// Load configuration
    ///
    /// An explicitly given file must exist. Without one, the default location
    /// is tried and missing it falls back to built-in defaults. Nothing is
    /// logged here since this runs before the subscriber is installed.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                other => return Ok((Self::default(), ConfigSource::Defaults(other))),
            },
        };
        let config = Self::from_file(&path)?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// `<config dir>/wbj/wbj.toml`, e.g. `~/.config/wbj/wbj.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wbj").join("wbj.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TomlConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.geocoder.country_codes, "nl");
        assert_eq!(config.geocoder.limit, 20);
        assert_eq!(config.maps.zoom, 18);
        assert_eq!(config.logging.level, "info");
        assert!(config.phrases.requeue_refinements);
        assert!(config.messenger.verify_token.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = TomlConfig::from_toml(
            r#"
            [server]
            port = 8080

            [geocoder]
            country_codes = "nl,be"
            email = "bot@example.org"

            [phrases]
            affirmations = ["ja", "jawel"]
            requeue_refinements = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.geocoder.country_codes, "nl,be");
        assert_eq!(config.geocoder.email.as_deref(), Some("bot@example.org"));
        assert_eq!(config.geocoder.min_interval_ms, 1000);
        assert_eq!(config.phrases.affirmations, vec!["ja", "jawel"]);
        assert_eq!(config.phrases.directions, vec!["naar", "richting"]);
        assert!(!config.phrases.requeue_refinements);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
