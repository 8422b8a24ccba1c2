//! Error types for the suggestion engine.
//!
//! Only `InvalidRequest` and `Cancelled` ever reach a caller. An
//! `Orchestration` failure is turned into the fallback response at the
//! engine boundary.

use eaa_copilot_core::ValidationError;
use std::fmt;

/// Errors from suggestion generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The request is missing a required field or carries a malformed one.
    InvalidRequest { source: ValidationError },
    /// A pipeline stage failed unexpectedly.
    Orchestration { stage: &'static str, reason: String },
    /// The request was cancelled before a response was produced.
    Cancelled,
}

impl EngineError {
    /// Returns true if the caller sent a bad request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { source } => write!(f, "invalid request: {source}"),
            Self::Orchestration { stage, reason } => {
                write!(f, "suggestion pipeline failed at {stage}: {reason}")
            }
            Self::Cancelled => write!(f, "suggestion request cancelled"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRequest { source } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(source: ValidationError) -> Self {
        Self::InvalidRequest { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_is_client_error() {
        let err = EngineError::from(ValidationError::MissingField { field: "userId" });
        assert!(err.is_client_error());
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn orchestration_display_names_stage() {
        let err = EngineError::Orchestration {
            stage: "optimize",
            reason: "score is not finite".to_string(),
        };
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("optimize"));
    }
}
