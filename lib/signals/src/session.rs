//! Chat session records.
//!
//! Sessions are owned by the chat service; the engine reads them to infer
//! how often and how intensively a user comes back.

use chrono::{DateTime, Utc};
use eaa_copilot_core::{SessionId, UserId};
use serde::{Deserialize, Serialize};

/// A chat session as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user who owns this session.
    pub user_id: UserId,
    /// Whether the session is still open.
    pub is_active: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last active.
    pub last_activity: DateTime<Utc>,
}

impl ChatSession {
    /// Creates an active session started now.
    #[must_use]
    pub fn new(id: SessionId, user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            is_active: true,
            created_at: now,
            last_activity: now,
        }
    }

    /// Overrides the creation and last-activity time.
    #[must_use]
    pub fn started_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.last_activity = created_at;
        self
    }

    /// Marks the session as closed.
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.is_active = false;
        self
    }
}
