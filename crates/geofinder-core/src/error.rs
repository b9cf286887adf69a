//! Error types for the GeoFinder client.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole GeoFinder client.
///
/// Network-boundary failures are carried as [`ApiError`] so callers can still
/// pattern-match on the closed set of remote failure kinds.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum GeoError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", ...
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device-local storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote Game API failure
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl GeoError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error came from the Remote Game API
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// Returns the remote failure, if this error wraps one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GeoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for GeoError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, GeoError>`.
pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: GeoError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.is_io());
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_json_conversion() {
        let parse = serde_json::from_str::<Vec<u32>>("{not json");
        let err: GeoError = parse.unwrap_err().into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_api_error_is_transparent() {
        let err: GeoError = ApiError::Auth("token rejected".into()).into();
        assert!(err.is_api());
        assert!(matches!(err.as_api(), Some(ApiError::Auth(_))));
        assert_eq!(err.to_string(), "Authentication failed: token rejected");
    }
}
