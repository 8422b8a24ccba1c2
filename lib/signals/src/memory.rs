//! In-memory implementations of the store and sink contracts.
//!
//! Useful for tests and for embedding the engine where signals are already
//! held in memory.

use crate::analytics::{AnalyticsRecord, AnalyticsSink};
use crate::error::{SinkError, StoreError};
use crate::fact::UserFact;
use crate::frustration::FrustrationRecord;
use crate::message::ChatMessage;
use crate::session::ChatSession;
use crate::store::SignalStore;
use async_trait::async_trait;
use eaa_copilot_core::{SessionId, UserId};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

#[derive(Debug, Default)]
struct Tables {
    facts: HashMap<UserId, Vec<UserFact>>,
    messages: HashMap<SessionId, Vec<ChatMessage>>,
    sessions: HashMap<UserId, Vec<ChatSession>>,
    frustration: HashMap<UserId, Vec<FrustrationRecord>>,
}

/// A signal store backed by hash maps.
#[derive(Debug, Default)]
pub struct InMemorySignalStore {
    tables: RwLock<Tables>,
}

impl InMemorySignalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fact.
    pub fn add_fact(&self, fact: UserFact) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables
            .facts
            .entry(fact.user_id.clone())
            .or_default()
            .push(fact);
    }

    /// Adds a message.
    pub fn add_message(&self, message: ChatMessage) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables
            .messages
            .entry(message.session_id.clone())
            .or_default()
            .push(message);
    }

    /// Adds a session.
    pub fn add_session(&self, session: ChatSession) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables
            .sessions
            .entry(session.user_id.clone())
            .or_default()
            .push(session);
    }

    /// Adds a frustration measurement.
    pub fn add_frustration_record(&self, record: FrustrationRecord) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables
            .frustration
            .entry(record.user_id.clone())
            .or_default()
            .push(record);
    }

    fn read<K, T>(&self, pick: impl Fn(&Tables) -> &HashMap<K, Vec<T>>, key: &K) -> Vec<T>
    where
        K: std::hash::Hash + Eq,
        T: Clone,
    {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        pick(&tables).get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn user_facts(&self, user_id: &UserId) -> Result<Vec<UserFact>, StoreError> {
        Ok(self.read(|t| &t.facts, user_id))
    }

    async fn session_messages(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.read(|t| &t.messages, session_id))
    }

    async fn user_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, StoreError> {
        Ok(self.read(|t| &t.sessions, user_id))
    }

    async fn frustration_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FrustrationRecord>, StoreError> {
        Ok(self.read(|t| &t.frustration, user_id))
    }
}

/// An analytics sink that keeps records in a vector.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsSink {
    records: Mutex<Vec<AnalyticsRecord>>,
}

impl InMemoryAnalyticsSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record inserted so far.
    #[must_use]
    pub fn records(&self) -> Vec<AnalyticsRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AnalyticsSink for InMemoryAnalyticsSink {
    async fn insert(&self, record: &AnalyticsRecord) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactType;

    #[tokio::test]
    async fn store_returns_rows_by_key() {
        let store = InMemorySignalStore::new();
        let u1 = UserId::new("u1").expect("valid");
        let u2 = UserId::new("u2").expect("valid");
        store.add_fact(UserFact::new(u1.clone(), FactType::Industry, "retail", 0.8));

        assert_eq!(store.user_facts(&u1).await.expect("read").len(), 1);
        assert!(store.user_facts(&u2).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn messages_are_keyed_by_session() {
        let store = InMemorySignalStore::new();
        let s1 = SessionId::new("s1").expect("valid");
        store.add_message(ChatMessage::user(s1.clone(), "hello"));
        store.add_message(ChatMessage::assistant(s1.clone(), "hi"));

        assert_eq!(store.session_messages(&s1).await.expect("read").len(), 2);
    }
}
