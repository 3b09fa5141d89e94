//! Error types for preference and query handling.

use thiserror::Error;

/// Errors raised while building preferences, filters, or configuration.
///
/// Pagination arithmetic never fails; only user-supplied values that have to
/// be interpreted end up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A filter value does not fit the type its key expects.
    #[error("Invalid value {value:?} for filter '{key}': {reason}")]
    InvalidFilter {
        key: String,
        value: String,
        reason: String,
    },

    /// A `key=value` filter assignment could not be split.
    #[error("Malformed filter assignment {input:?}, expected KEY=VALUE")]
    MalformedAssignment { input: String },

    /// Page size is not one of the configured options.
    #[error("Page size {size} is not allowed (expected one of {allowed:?})")]
    InvalidPageSize { size: u64, allowed: Vec<u64> },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Create an invalid filter error.
    pub fn invalid_filter(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFilter {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_message() {
        let err = CoreError::invalid_filter("is_active", "maybe", "expected true or false");
        let message = err.to_string();
        assert!(message.contains("is_active"));
        assert!(message.contains("maybe"));
    }

    #[test]
    fn test_invalid_page_size_lists_options() {
        let err = CoreError::InvalidPageSize {
            size: 7,
            allowed: vec![10, 20],
        };
        assert_eq!(
            err.to_string(),
            "Page size 7 is not allowed (expected one of [10, 20])"
        );
    }
}
