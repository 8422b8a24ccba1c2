//! Postgres-backed signal store and analytics sink.

use crate::analytics::{AnalyticsRecord, AnalyticsSink};
use crate::error::{SinkError, StoreError};
use crate::fact::{FactType, UserFact};
use crate::frustration::FrustrationRecord;
use crate::message::{ChatMessage, MessageRole};
use crate::session::ChatSession;
use crate::store::SignalStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eaa_copilot_core::{MessageId, SessionId, UserId};
use sqlx::{FromRow, PgPool};

/// Row type for fact queries.
#[derive(FromRow)]
struct FactRow {
    user_id: String,
    fact_type: String,
    fact_value: String,
    confidence: f64,
    source_message_id: Option<String>,
}

impl FactRow {
    fn try_into_fact(self) -> Result<UserFact, StoreError> {
        let user_id = decode_id(UserId::new(&self.user_id), "user_id", &self.user_id)?;
        let mut fact = UserFact::new(
            user_id,
            FactType::from(self.fact_type.as_str()),
            self.fact_value,
            self.confidence,
        );
        // Blank source ids are treated as absent.
        if let Some(source) = self.source_message_id.as_deref() {
            if let Ok(id) = MessageId::new(source) {
                fact = fact.with_source_message(id);
            }
        }
        Ok(fact)
    }
}

/// Row type for message queries.
#[derive(FromRow)]
struct MessageRow {
    session_id: String,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn try_into_message(self) -> Result<ChatMessage, StoreError> {
        let session_id = decode_id(
            SessionId::new(&self.session_id),
            "session_id",
            &self.session_id,
        )?;
        let role = match self.role.as_str() {
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            "system" => MessageRole::System,
            other => {
                return Err(StoreError::DecodeFailed {
                    reason: format!("unknown message role '{other}'"),
                });
            }
        };
        Ok(ChatMessage::new(session_id, role, self.content).at(self.created_at))
    }
}

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    id: String,
    user_id: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl SessionRow {
    fn try_into_session(self) -> Result<ChatSession, StoreError> {
        Ok(ChatSession {
            id: decode_id(SessionId::new(&self.id), "id", &self.id)?,
            user_id: decode_id(UserId::new(&self.user_id), "user_id", &self.user_id)?,
            is_active: self.is_active,
            created_at: self.created_at,
            last_activity: self.last_activity,
        })
    }
}

/// Row type for frustration history queries.
#[derive(FromRow)]
struct FrustrationRow {
    user_id: String,
    session_id: String,
    frustration_level: f64,
    escalation_risk: f64,
    trigger_phrases: serde_json::Value,
    recommendation: Option<String>,
    created_at: DateTime<Utc>,
}

impl FrustrationRow {
    fn try_into_record(self) -> Result<FrustrationRecord, StoreError> {
        let user_id = decode_id(UserId::new(&self.user_id), "user_id", &self.user_id)?;
        let session_id = decode_id(
            SessionId::new(&self.session_id),
            "session_id",
            &self.session_id,
        )?;
        let mut record = FrustrationRecord::new(
            user_id,
            session_id,
            self.frustration_level,
            self.escalation_risk,
        )
        .at(self.created_at);
        record.trigger_phrases = match self.trigger_phrases {
            serde_json::Value::Null => Vec::new(),
            phrases => serde_json::from_value(phrases).map_err(|e| StoreError::DecodeFailed {
                reason: format!("invalid trigger_phrases: {e}"),
            })?,
        };
        record.recommendation = self.recommendation.unwrap_or_default();
        Ok(record)
    }
}

fn decode_id<T, E: std::fmt::Display>(
    parsed: Result<T, E>,
    column: &str,
    raw: &str,
) -> Result<T, StoreError> {
    parsed.map_err(|e| StoreError::DecodeFailed {
        reason: format!("invalid {column} '{raw}': {e}"),
    })
}

fn query_failed(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable {
                reason: e.to_string(),
            }
        }
        other => StoreError::QueryFailed {
            reason: other.to_string(),
        },
    }
}

/// Signal store over the chatbot's Postgres schema.
pub struct PgSignalStore {
    pool: PgPool,
}

impl PgSignalStore {
    /// Creates a new store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignalStore for PgSignalStore {
    async fn user_facts(&self, user_id: &UserId) -> Result<Vec<UserFact>, StoreError> {
        let rows: Vec<FactRow> = sqlx::query_as(
            r#"
            SELECT user_id, fact_type, fact_value, confidence, source_message_id
            FROM user_facts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(FactRow::try_into_fact).collect()
    }

    async fn session_messages(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT session_id, role, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(MessageRow::try_into_message).collect()
    }

    async fn user_sessions(&self, user_id: &UserId) -> Result<Vec<ChatSession>, StoreError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, is_active, created_at, last_activity
            FROM chat_sessions
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(SessionRow::try_into_session).collect()
    }

    async fn frustration_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<FrustrationRecord>, StoreError> {
        let rows: Vec<FrustrationRow> = sqlx::query_as(
            r#"
            SELECT user_id, session_id, frustration_level, escalation_risk,
                   trigger_phrases, recommendation, created_at
            FROM frustration_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        rows.into_iter().map(FrustrationRow::try_into_record).collect()
    }
}

/// Analytics sink writing to the `suggestion_analytics` table.
pub struct PgAnalyticsSink {
    pool: PgPool,
}

impl PgAnalyticsSink {
    /// Creates a new sink.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSink for PgAnalyticsSink {
    async fn insert(&self, record: &AnalyticsRecord) -> Result<(), SinkError> {
        let suggestion_count =
            i32::try_from(record.suggestion_count).map_err(|e| SinkError::InvalidRecord {
                reason: format!("suggestion count out of range: {e}"),
            })?;

        sqlx::query(
            r#"
            INSERT INTO suggestion_analytics
                (id, user_id, session_id, persona_type, maturity_level, frustration_level,
                 stage, opportunity_score, suggestion_count, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_str())
        .bind(record.session_id.as_str())
        .bind(&record.persona_type)
        .bind(&record.maturity_level)
        .bind(record.frustration_level)
        .bind(&record.stage)
        .bind(record.opportunity_score)
        .bind(suggestion_count)
        .bind(&record.metadata)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SinkError::InsertFailed {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frustration_row(trigger_phrases: serde_json::Value) -> FrustrationRow {
        FrustrationRow {
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            frustration_level: 0.6,
            escalation_risk: 0.4,
            trigger_phrases,
            recommendation: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn trigger_phrases_decode() {
        let record = frustration_row(json!(["useless", "fed up"]))
            .try_into_record()
            .expect("valid row");
        assert_eq!(record.trigger_phrases, vec!["useless", "fed up"]);

        let record = frustration_row(serde_json::Value::Null)
            .try_into_record()
            .expect("null column");
        assert!(record.trigger_phrases.is_empty());
    }

    #[test]
    fn malformed_trigger_phrases_fail_decoding() {
        let err = frustration_row(json!({"phrase": "useless"}))
            .try_into_record()
            .expect_err("object is not a phrase list");
        assert!(matches!(err, StoreError::DecodeFailed { .. }));
    }

    #[test]
    fn invalid_ids_fail_decoding() {
        let mut row = frustration_row(json!([]));
        row.user_id = "  ".to_string();
        assert!(matches!(
            row.try_into_record(),
            Err(StoreError::DecodeFailed { .. })
        ));
    }
}
