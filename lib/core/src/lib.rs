//! Core domain types and utilities for eaa-copilot.
//!
//! This crate provides the validated identifiers, score clamping and error
//! handling shared by the signal store adapters and the suggestion engine.

pub mod error;
pub mod id;
pub mod score;

pub use error::{Result, ValidationError};
pub use id::{MessageId, ParseIdError, SessionId, UserId};
pub use score::unit;
