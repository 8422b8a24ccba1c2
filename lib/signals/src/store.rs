//! The read contract of the external signal store.

use crate::error::StoreError;
use crate::fact::UserFact;
use crate::frustration::FrustrationRecord;
use crate::message::ChatMessage;
use crate::session::ChatSession;
use async_trait::async_trait;
use eaa_copilot_core::{SessionId, UserId};

/// Trait for signal storage.
///
/// Implementations only read. Ordering of the returned rows is not part of
/// the contract; [`SignalRepository`](crate::SignalRepository) normalizes it.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// Gets every fact stored for a user.
    async fn user_facts(&self, user_id: &UserId) -> Result<Vec<UserFact>, StoreError>;

    /// Gets the messages of one session.
    async fn session_messages(&self, session_id: &SessionId)
    -> Result<Vec<ChatMessage>, StoreError>;

    /// Lists a user's sessions.
    async fn user_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, StoreError>;

    /// Gets a user's frustration history.
    async fn frustration_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FrustrationRecord>, StoreError>;
}

/// Everything the engine knows about a user for one request.
///
/// Messages and sessions are oldest first; frustration history is newest
/// first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalSnapshot {
    /// Stored facts.
    pub facts: Vec<UserFact>,
    /// Messages of the current session.
    pub messages: Vec<ChatMessage>,
    /// All sessions of the user.
    pub sessions: Vec<ChatSession>,
    /// Frustration measurements, newest first.
    pub frustration_history: Vec<FrustrationRecord>,
}

impl SignalSnapshot {
    /// Puts every list into its canonical order.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.messages.sort_by_key(|m| m.created_at);
        self.sessions.sort_by_key(|s| s.created_at);
        self.frustration_history
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self
    }
}
