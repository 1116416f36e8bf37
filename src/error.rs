//! Error types for Scenegen
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Scenegen operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, session-store operations, provider calls,
/// and artifact generation.
#[derive(Error, Debug)]
pub enum ScenegenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field was missing or empty after trimming
    #[error("Validation error: {0}")]
    Validation(String),

    /// A project or chat id that does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-related errors (upstream LLM/TTS call rejected or failed)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Generation completed but produced nothing usable
    #[error("Generation produced an empty result")]
    EmptyResult,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Scenegen operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ScenegenError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_validation_error_display() {
        let error = ScenegenError::Validation("Project name is required".to_string());
        assert_eq!(
            error.to_string(),
            "Validation error: Project name is required"
        );
    }

    #[test]
    fn test_not_found_error_display() {
        let error = ScenegenError::NotFound("Chat not found".to_string());
        assert_eq!(error.to_string(), "Not found: Chat not found");
    }

    #[test]
    fn test_provider_error_display() {
        let error = ScenegenError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_empty_result_error_display() {
        let error = ScenegenError::EmptyResult;
        assert_eq!(error.to_string(), "Generation produced an empty result");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ScenegenError = io_error.into();
        assert!(matches!(error, ScenegenError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: ScenegenError = json_error.into();
        assert!(matches!(error, ScenegenError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: ScenegenError = yaml_error.into();
        assert!(matches!(error, ScenegenError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScenegenError>();
    }
}
