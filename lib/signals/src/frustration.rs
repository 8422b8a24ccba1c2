//! Historical frustration measurements.
//!
//! One record is appended per analyzed turn by the chat service. The engine
//! reads the history to seed its own estimate.

use chrono::{DateTime, Utc};
use eaa_copilot_core::{SessionId, UserId, unit};
use serde::{Deserialize, Serialize};

/// A stored frustration measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrustrationRecord {
    /// The user measured.
    pub user_id: UserId,
    /// The session the measurement came from.
    pub session_id: SessionId,
    /// Frustration level (0.0 - 1.0).
    pub frustration_level: f64,
    /// Escalation risk (0.0 - 1.0).
    pub escalation_risk: f64,
    /// Phrases that triggered the measurement.
    pub trigger_phrases: Vec<String>,
    /// Handling recommendation recorded at the time.
    pub recommendation: String,
    /// When the measurement was recorded.
    pub created_at: DateTime<Utc>,
}

impl FrustrationRecord {
    /// Creates a record timestamped now with bounded levels.
    #[must_use]
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        frustration_level: f64,
        escalation_risk: f64,
    ) -> Self {
        Self {
            user_id,
            session_id,
            frustration_level: unit(frustration_level),
            escalation_risk: unit(escalation_risk),
            trigger_phrases: Vec::new(),
            recommendation: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Overrides the creation time.
    #[must_use]
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
