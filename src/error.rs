//! Error types for scinapse.
//!
//! Physical simulations do not fail in the conventional sense. Errors come
//! from configuration (out-of-range parameters, malformed YAML), from I/O at
//! the host boundary, and from the host refusing to paint or schedule.
//! A non-finite frame is not an error: the driver freezes it and carries on.

use thiserror::Error;

/// Result type alias for scinapse operations.
pub type LabResult<T> = Result<T, LabError>;

/// Unified error type for all scinapse operations.
#[derive(Debug, Error)]
pub enum LabError {
    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Simulation name not recognised.
    #[error("Unknown simulation '{0}' (expected pendulum, projectile or wave)")]
    UnknownSimulation(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Painting onto a host surface failed.
    #[error("Paint error: {0}")]
    Paint(String),

    /// The host refused to schedule an animation frame.
    #[error("Frame scheduling error: {0}")]
    Scheduler(String),
}

impl LabError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a paint error.
    #[must_use]
    pub fn paint(message: impl Into<String>) -> Self {
        Self::Paint(message.into())
    }

    /// Create a frame scheduling error.
    #[must_use]
    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::Scheduler(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_config() {
        let err = LabError::config("length out of range");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("length out of range"));
    }

    #[test]
    fn test_error_unknown_simulation() {
        let err = LabError::UnknownSimulation("titration".to_string());
        assert!(err.to_string().contains("titration"));
    }

    #[test]
    fn test_error_serialization() {
        let err = LabError::serialization("failed to serialize");
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_paint() {
        let err = LabError::paint("context lost");
        assert!(err.to_string().contains("Paint error: context lost"));
    }

    #[test]
    fn test_error_from_io() {
        let err: LabError = std::io::Error::other("disk gone").into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_yaml() {
        let result: Result<u32, _> = serde_yaml::from_str("{{{{not valid yaml");
        let err: LabError = result.expect_err("invalid yaml").into();
        assert!(err.to_string().contains("YAML parsing error"));
    }
}
