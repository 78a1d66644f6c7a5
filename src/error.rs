//! Error types for capgate
//!
//! Only the edges fail: parsing a permission name, fetching the user record,
//! decoding payloads and the snapshot cache. Resolution itself is total.

use thiserror::Error;

/// The main error type for capgate operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("unknown permission kind: {0:?}")]
    UnknownPermission(String),

    #[error("fetch failed (status {status:?}): {message}")]
    Fetch { status: Option<u16>, message: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("store: {0}")]
    Store(String),

    #[error("config: {0}")]
    Config(String),
}

impl GateError {
    /// Build a fetch error from an HTTP status and message
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        GateError::Fetch { status, message: message.into() }
    }

    /// Server-class (5xx) fetch failure, the only kind worth retrying
    pub fn is_server_error(&self) -> bool {
        matches!(self, GateError::Fetch { status: Some(s), .. } if (500..600).contains(s))
    }
}

impl From<serde_json::Error> for GateError {
    fn from(e: serde_json::Error) -> Self {
        GateError::Decode(e.to_string())
    }
}

/// Result type alias for capgate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Convert any storage error to GateError
pub fn err<E: std::error::Error>(e: E) -> GateError {
    GateError::Store(e.to_string())
}
