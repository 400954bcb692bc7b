//! Error types for hlasm-flow
//!
//! Only setup failures surface as errors. Everything that goes wrong inside a
//! resolution run (unreadable candidate files, unresolvable targets, malformed
//! macro blocks) is logged and reflected in the run's `missing` list instead.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for hlasm-flow operations
#[derive(Debug, Error)]
pub enum FlowError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry source could not be read
    #[error("Entry source not found: {0}")]
    EntryNotFound(String),

    /// Line-range window is empty or inverted
    #[error("Invalid line range {start}..={end}: {reason}")]
    InvalidRange {
        start: usize,
        end: usize,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FlowError {
    /// Create an invalid range error
    pub fn invalid_range(start: usize, end: usize, reason: impl Into<String>) -> Self {
        FlowError::InvalidRange {
            start,
            end,
            reason: reason.into(),
        }
    }

    /// Create an entry-not-found error
    pub fn entry_not_found(path: impl Into<String>) -> Self {
        FlowError::EntryNotFound(path.into())
    }
}

/// Result type alias for hlasm-flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = FlowError::invalid_range(10, 4, "start after end");
        assert_eq!(
            err.to_string(),
            "Invalid line range 10..=4: start after end"
        );
    }

    #[test]
    fn test_config_error_converts() {
        let err: FlowError = ConfigError::MissingVersion.into();
        assert!(matches!(err, FlowError::Config(_)));
    }
}
