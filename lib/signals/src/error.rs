//! Error types for the signals crate.
//!
//! - `StoreError`: failures reading from the external signal store
//! - `SinkError`: failures writing analytics records
//!
//! Neither ever reaches the engine's caller: reads degrade to empty lists
//! and analytics failures are only logged.

use std::fmt;

/// Errors from signal store reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    Unavailable { reason: String },
    /// Query failed.
    QueryFailed { reason: String },
    /// A stored row could not be decoded.
    DecodeFailed { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "signal store unavailable: {reason}"),
            Self::QueryFailed { reason } => write!(f, "signal query failed: {reason}"),
            Self::DecodeFailed { reason } => write!(f, "failed to decode signal row: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from analytics sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Insert failed.
    InsertFailed { reason: String },
    /// The record could not be serialized.
    InvalidRecord { reason: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertFailed { reason } => write!(f, "analytics insert failed: {reason}"),
            Self::InvalidRecord { reason } => write!(f, "invalid analytics record: {reason}"),
        }
    }
}

impl std::error::Error for SinkError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::QueryFailed {
            reason: "timeout".to_string(),
        };
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn sink_error_display() {
        let err = SinkError::InsertFailed {
            reason: "relation does not exist".to_string(),
        };
        assert!(err.to_string().contains("relation does not exist"));
    }
}
