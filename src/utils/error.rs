//! Error handling for the sentiment tracker.

use thiserror::Error;

/// Main error type for the sentiment tracker
#[derive(Debug, Error)]
pub enum Error {
    /// Connection-level failures (DNS, refused connection, request timeout)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-success HTTP status from the sentiment API
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Malformed or unsuccessful API payloads (bad JSON, missing fields, `success:false`)
    #[error("Data error: {0}")]
    DataError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Result type for the sentiment tracker
pub type Result<T> = std::result::Result<T, Error>;

// Classify reqwest failures into the Network/Protocol/Data taxonomy so the
// refresh path can report them uniformly.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            Error::ProtocolError(err.to_string())
        } else if err.is_decode() {
            Error::DataError(err.to_string())
        } else {
            Error::NetworkError(err.to_string())
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::DataError(err.to_string())
    }
}
