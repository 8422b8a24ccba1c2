//! Error handling foundation for eaa-copilot.
//!
//! This module provides the `Result` type alias using rootcause and the one
//! error every layer shares: input validation. Each crate defines its own
//! domain-specific error types in its own error module.

use crate::id::ParseIdError;
use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// A required input was missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent.
    MissingField { field: &'static str },
    /// A field was present but blank.
    EmptyField { field: &'static str },
    /// An identifier failed to parse.
    InvalidIdentifier { field: &'static str, reason: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field }
            | Self::EmptyField { field }
            | Self::InvalidIdentifier { field, .. } => field,
        }
    }

    /// Wraps an identifier parse failure for the given field.
    #[must_use]
    pub fn from_parse(field: &'static str, err: &ParseIdError) -> Self {
        Self::InvalidIdentifier {
            field,
            reason: err.reason.clone(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::EmptyField { field } => write!(f, "field '{field}' must not be empty"),
            Self::InvalidIdentifier { field, reason } => {
                write!(f, "invalid identifier in '{field}': {reason}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::MissingField { field: "userId" };
        assert_eq!(err.field(), "userId");
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn validation_error_from_parse_keeps_reason() {
        let parse = ParseIdError {
            id_type: "SessionId",
            reason: "identifier is blank".to_string(),
        };
        let err = ValidationError::from_parse("sessionId", &parse);
        assert_eq!(err.field(), "sessionId");
        assert!(err.to_string().contains("blank"));
    }
}
