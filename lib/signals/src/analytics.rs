//! Audit records of computed suggestion contexts.

use crate::error::SinkError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eaa_copilot_core::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use ulid::Ulid;

/// Unique identifier for an analytics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsRecordId(Ulid);

impl AnalyticsRecordId {
    /// Creates a new record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for AnalyticsRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnalyticsRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ana_{}", self.0)
    }
}

/// One row written per generated suggestion set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    /// Unique identifier.
    pub id: AnalyticsRecordId,
    /// The requesting user.
    pub user_id: UserId,
    /// The requesting session.
    pub session_id: SessionId,
    /// Inferred persona type.
    pub persona_type: String,
    /// Inferred business maturity level.
    pub maturity_level: String,
    /// Current frustration level.
    pub frustration_level: f64,
    /// Inferred conversation stage.
    pub stage: String,
    /// Opportunity score.
    pub opportunity_score: f64,
    /// Number of suggestions returned.
    pub suggestion_count: u32,
    /// Caller-supplied request metadata.
    pub metadata: JsonValue,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Trait for the analytics sink.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Inserts one record.
    async fn insert(&self, record: &AnalyticsRecord) -> Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_display() {
        assert!(AnalyticsRecordId::new().to_string().starts_with("ana_"));
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = AnalyticsRecord {
            id: AnalyticsRecordId::new(),
            user_id: UserId::new("u1").expect("valid"),
            session_id: SessionId::new("s1").expect("valid"),
            persona_type: "newcomer".to_string(),
            maturity_level: "startup".to_string(),
            frustration_level: 0.0,
            stage: "discovery".to_string(),
            opportunity_score: 0.54,
            suggestion_count: 3,
            metadata: serde_json::json!({"channel": "web"}),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["personaType"], "newcomer");
        assert_eq!(json["suggestionCount"], 3);
        assert_eq!(json["metadata"]["channel"], "web");
    }
}
