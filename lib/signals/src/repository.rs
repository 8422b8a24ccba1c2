//! Validated, failure-tolerant access to the signal store.
//!
//! Every read validates its identifier and then never fails: a store error
//! or a read that exceeds its timeout is logged and replaced by an empty
//! list, so one missing signal set never blocks the others.

use crate::error::StoreError;
use crate::fact::UserFact;
use crate::frustration::FrustrationRecord;
use crate::message::ChatMessage;
use crate::session::ChatSession;
use crate::store::{SignalSnapshot, SignalStore};
use eaa_copilot_core::{SessionId, UserId, ValidationError};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalRepositoryConfig {
    /// Timeout for a single store read, in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for SignalRepositoryConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 2_000,
        }
    }
}

/// Read access to facts, messages, sessions and frustration history.
#[derive(Clone)]
pub struct SignalRepository {
    store: Arc<dyn SignalStore>,
    read_timeout: Duration,
}

impl SignalRepository {
    /// Creates a repository over a store.
    #[must_use]
    pub fn new(store: Arc<dyn SignalStore>, config: &SignalRepositoryConfig) -> Self {
        Self {
            store,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }

    /// Gets a user's facts.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `user_id` is blank.
    pub async fn get_user_facts(
        &self,
        user_id: &str,
    ) -> Result<Vec<UserFact>, Report<ValidationError>> {
        let user_id = parse_user_id(user_id)?;
        Ok(self.facts(&user_id).await)
    }

    /// Gets the messages of a session.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `session_id` is blank.
    pub async fn get_session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, Report<ValidationError>> {
        let session_id = parse_session_id(session_id)?;
        Ok(self.messages(&session_id).await)
    }

    /// Lists a user's sessions.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `user_id` is blank.
    pub async fn get_user_sessions(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChatSession>, Report<ValidationError>> {
        let user_id = parse_user_id(user_id)?;
        Ok(self.sessions(&user_id).await)
    }

    /// Gets a user's frustration history.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `user_id` is blank.
    pub async fn get_frustration_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<FrustrationRecord>, Report<ValidationError>> {
        let user_id = parse_user_id(user_id)?;
        Ok(self.history(&user_id).await)
    }

    /// Reads all four signal sets concurrently and joins them.
    #[instrument(skip(self), fields(user_id = %user_id, session_id = %session_id))]
    pub async fn fetch_snapshot(&self, user_id: &UserId, session_id: &SessionId) -> SignalSnapshot {
        let (facts, messages, sessions, frustration_history) = tokio::join!(
            self.facts(user_id),
            self.messages(session_id),
            self.sessions(user_id),
            self.history(user_id),
        );

        debug!(
            facts = facts.len(),
            messages = messages.len(),
            sessions = sessions.len(),
            history = frustration_history.len(),
            "signal snapshot loaded"
        );

        SignalSnapshot {
            facts,
            messages,
            sessions,
            frustration_history,
        }
        .normalized()
    }

    async fn facts(&self, user_id: &UserId) -> Vec<UserFact> {
        self.degrade("user_facts", self.store.user_facts(user_id))
            .await
    }

    async fn messages(&self, session_id: &SessionId) -> Vec<ChatMessage> {
        self.degrade("session_messages", self.store.session_messages(session_id))
            .await
    }

    async fn sessions(&self, user_id: &UserId) -> Vec<ChatSession> {
        self.degrade("user_sessions", self.store.user_sessions(user_id))
            .await
    }

    async fn history(&self, user_id: &UserId) -> Vec<FrustrationRecord> {
        self.degrade(
            "frustration_history",
            self.store.frustration_history(user_id),
        )
        .await
    }

    async fn degrade<T, F>(&self, signal: &'static str, read: F) -> Vec<T>
    where
        F: Future<Output = Result<Vec<T>, StoreError>>,
    {
        match tokio::time::timeout(self.read_timeout, read).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                warn!(signal, error = %e, "signal read failed, using empty set");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    signal,
                    timeout_ms = self.read_timeout.as_millis() as u64,
                    "signal read timed out, using empty set"
                );
                Vec::new()
            }
        }
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, ValidationError> {
    UserId::new(raw).map_err(|e| ValidationError::from_parse("userId", &e))
}

fn parse_session_id(raw: &str) -> Result<SessionId, ValidationError> {
    SessionId::new(raw).map_err(|e| ValidationError::from_parse("sessionId", &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactType;
    use crate::memory::InMemorySignalStore;
    use async_trait::async_trait;

    /// Store whose fact and history reads fail and whose session read hangs.
    struct FlakyStore {
        inner: InMemorySignalStore,
    }

    #[async_trait]
    impl SignalStore for FlakyStore {
        async fn user_facts(&self, _user_id: &UserId) -> Result<Vec<UserFact>, StoreError> {
            Err(StoreError::Unavailable {
                reason: "connection reset".to_string(),
            })
        }

        async fn session_messages(
            &self,
            session_id: &SessionId,
        ) -> Result<Vec<ChatMessage>, StoreError> {
            self.inner.session_messages(session_id).await
        }

        async fn user_sessions(&self, _user_id: &UserId) -> Result<Vec<ChatSession>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn frustration_history(
            &self,
            _user_id: &UserId,
        ) -> Result<Vec<FrustrationRecord>, StoreError> {
            Err(StoreError::QueryFailed {
                reason: "syntax error".to_string(),
            })
        }
    }

    fn ids() -> (UserId, SessionId) {
        (
            UserId::new("u1").expect("valid"),
            SessionId::new("s1").expect("valid"),
        )
    }

    #[tokio::test]
    async fn blank_identifier_is_rejected() {
        let repo = SignalRepository::new(
            Arc::new(InMemorySignalStore::new()),
            &SignalRepositoryConfig::default(),
        );

        assert!(repo.get_user_facts("").await.is_err());
        assert!(repo.get_session_messages("  ").await.is_err());
        assert!(repo.get_user_sessions("").await.is_err());
        assert!(repo.get_frustration_history("").await.is_err());
    }

    #[tokio::test]
    async fn valid_identifier_reads_store() {
        let store = InMemorySignalStore::new();
        let (user, _) = ids();
        store.add_fact(UserFact::new(user, FactType::Industry, "banking", 0.9));
        let repo = SignalRepository::new(Arc::new(store), &SignalRepositoryConfig::default());

        let facts = repo.get_user_facts("u1").await.expect("valid id");
        assert_eq!(facts.len(), 1);
    }

    #[tokio::test]
    async fn failed_and_slow_reads_degrade_independently() {
        let (user, session) = ids();
        let inner = InMemorySignalStore::new();
        inner.add_message(ChatMessage::user(session.clone(), "How do I start?"));
        let repo = SignalRepository::new(
            Arc::new(FlakyStore { inner }),
            &SignalRepositoryConfig {
                read_timeout_ms: 50,
            },
        );

        let snapshot = repo.fetch_snapshot(&user, &session).await;

        assert!(snapshot.facts.is_empty());
        assert!(snapshot.sessions.is_empty());
        assert!(snapshot.frustration_history.is_empty());
        assert_eq!(snapshot.messages.len(), 1);
    }
}
