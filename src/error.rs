//! Error types for the magic mirror

use thiserror::Error;

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the magic mirror
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Camera or microphone could not be used
    #[error("device unavailable: {0}")]
    Device(String),

    /// Audio encoding, decoding or playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech was captured but could not be recognized
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// A remote service did not answer in time
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// A remote service answered with a non-success status
    #[error("{service} error {status}: {body}")]
    Remote {
        /// Which service failed ("chat", "vision", "tts", "stt")
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// A remote service answered with a body we could not understand
    #[error("malformed {service} response: {detail}")]
    Malformed {
        /// Which service answered
        service: &'static str,
        /// Decoder message
        detail: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Map a transport error from `service`, separating timeouts from the rest
    #[must_use]
    pub fn from_request(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(service)
        } else if err.is_decode() {
            Self::Malformed {
                service,
                detail: err.to_string(),
            }
        } else {
            Self::Http(err)
        }
    }

    /// Whether this is a remote timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
