//! Error types for the agronomic analysis core.

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ingestion, detection, forecasting and their collaborators
#[derive(Debug, Error)]
pub enum Error {
    /// No observations were available (empty provider result or empty input)
    #[error("Empty series: no observations to analyze")]
    EmptySeries,

    /// Too few points for a windowed or statistical operation
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// External data source failure, passed through as-is
    #[error("Provider error: {0}")]
    Provider(String),

    /// Invalid parameters or malformed input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chart rendering failure
    #[error("Render error: {0}")]
    Render(String),

    /// Model inference failure
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InsufficientData`]
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Error::InsufficientData { required, actual }
    }

    /// Whether the error originated in an external collaborator
    pub fn is_external(&self) -> bool {
        matches!(self, Error::Provider(_) | Error::Render(_) | Error::Model(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = Error::insufficient(2, 1);
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 2 points, got 1"
        );
    }

    #[test]
    fn test_is_external() {
        assert!(Error::Provider("timeout".to_string()).is_external());
        assert!(!Error::EmptySeries.is_external());
    }
}
