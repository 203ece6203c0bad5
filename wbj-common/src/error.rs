//! Common error types for WBJ

use thiserror::Error;

/// Common result type for WBJ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WBJ crates
///
/// None of these cross the engine boundary: a failing geocoder degrades to
/// an empty candidate list inside the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Geocoder answered, but not with something usable
    #[error("Geocoder error: {0}")]
    Geocoder(String),

    /// HTTP transport error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message delivery error
    #[error("Transport error: {0}")]
    Transport(String),
}
