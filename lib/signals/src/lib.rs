//! Signal store adapters for eaa-copilot.
//!
//! This crate provides:
//!
//! - **Signals**: user facts, chat messages, sessions and frustration history
//! - **Signal Store**: the read contract of the external store
//! - **Signal Repository**: validated, degrade-to-empty access and the
//!   concurrent snapshot the engine consumes
//! - **Analytics Sink**: the write contract for computed-context records
//!
//! With the `postgres` feature, `PgSignalStore` and `PgAnalyticsSink`
//! implement both contracts on top of `sqlx`.

pub mod analytics;
pub mod error;
pub mod fact;
pub mod frustration;
pub mod memory;
pub mod message;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;
pub mod session;
pub mod store;

pub use analytics::{AnalyticsRecord, AnalyticsRecordId, AnalyticsSink};
pub use error::{SinkError, StoreError};
pub use fact::{FactType, UserFact};
pub use frustration::FrustrationRecord;
pub use memory::{InMemoryAnalyticsSink, InMemorySignalStore};
pub use message::{ChatMessage, MessageRole};
#[cfg(feature = "postgres")]
pub use postgres::{PgAnalyticsSink, PgSignalStore};
pub use repository::{SignalRepository, SignalRepositoryConfig};
pub use session::ChatSession;
pub use store::{SignalSnapshot, SignalStore};
