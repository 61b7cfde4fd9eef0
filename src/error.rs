//! Error types for the Scope Engine.
//!
//! Almost everything in this crate degrades gracefully: missing files and
//! malformed theme documents are logged and replaced with empty values.
//! The variants below cover the handful of failures that are allowed to
//! surface to callers, chief among them [`Error::ThemeNotFound`].

use thiserror::Error;

/// Result type alias for Scope Engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Scope Engine.
#[derive(Error, Debug)]
pub enum Error {
    // ===== Theme Errors =====
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    // ===== Analysis Errors =====
    #[error("Invalid glob pattern: {0}")]
    Glob(String),

    // ===== I/O Errors =====
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ===== Internal Errors =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a theme-not-found error for the given theme name.
    pub fn theme_not_found(name: impl Into<String>) -> Self {
        Self::ThemeNotFound(name.into())
    }

    /// Check whether this error represents a missing resource rather than
    /// a malformed one. Missing resources are skipped silently by the
    /// engine; everything else is logged before being absorbed.
    pub fn is_missing_resource(&self) -> bool {
        match self {
            Self::ThemeNotFound(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::theme_not_found("billing");
        assert_eq!(err.to_string(), "Theme not found: billing");

        let glob_err = Error::Glob("[unclosed".to_string());
        assert_eq!(glob_err.to_string(), "Invalid glob pattern: [unclosed");

        let config_err = Error::Config("themes dir missing".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: themes dir missing"
        );
    }

    #[test]
    fn test_is_missing_resource() {
        assert!(Error::theme_not_found("payments").is_missing_resource());

        let not_found = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(not_found.is_missing_resource());

        let denied = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!denied.is_missing_resource());

        assert!(!Error::Internal("boom".to_string()).is_missing_resource());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON serialization error"));
    }
}
