//! Error types for the AI crate.
//!
//! `LlmError` covers every way a single model round trip can fail. Callers
//! in the suggestion engine treat all variants the same way (degrade to a
//! fallback profile), but the variants keep the logs useful.

use std::fmt;

/// Errors from language-model operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider is unavailable.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// Timeout waiting for response.
    Timeout { after_ms: u64 },
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
}

impl LlmError {
    /// Returns true if the model answered but the answer was unusable.
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ResponseParseFailed { .. })
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::Timeout { after_ms } => write!(f, "LLM request timed out after {after_ms}ms"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
        }
    }
}

impl std::error::Error for LlmError {}
