//! Facts the assistant has learned about a user.
//!
//! Facts are written by the extraction side of the chatbot and are
//! immutable once stored. The suggestion engine only reads them.

use eaa_copilot_core::{MessageId, UserId, unit};
use serde::{Deserialize, Serialize};

/// The kind of a stored fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
    /// Kind of business (e.g. "online shop", "enterprise bank").
    BusinessType,
    /// Headcount or size bracket.
    CompanySize,
    /// Industry or sector.
    Industry,
    /// The user's role in their organization.
    Role,
    /// Whether an accessibility audit has been done.
    AccessibilityAudit,
    /// Website, app or other digital channel.
    DigitalPresence,
    /// Self-described technical skill.
    TechnicalLevel,
    /// A compliance deadline the user mentioned.
    Deadline,
    /// Country or region.
    Location,
    /// Anything the engine does not interpret.
    #[serde(other)]
    Other,
}

impl FactType {
    /// Returns the wire name of this fact type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessType => "business_type",
            Self::CompanySize => "company_size",
            Self::Industry => "industry",
            Self::Role => "role",
            Self::AccessibilityAudit => "accessibility_audit",
            Self::DigitalPresence => "digital_presence",
            Self::TechnicalLevel => "technical_level",
            Self::Deadline => "deadline",
            Self::Location => "location",
            Self::Other => "other",
        }
    }
}

impl From<&str> for FactType {
    fn from(raw: &str) -> Self {
        match raw {
            "business_type" => Self::BusinessType,
            "company_size" => Self::CompanySize,
            "industry" => Self::Industry,
            "role" => Self::Role,
            "accessibility_audit" => Self::AccessibilityAudit,
            "digital_presence" => Self::DigitalPresence,
            "technical_level" => Self::TechnicalLevel,
            "deadline" => Self::Deadline,
            "location" => Self::Location,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for FactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fact extracted from conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFact {
    /// The user this fact belongs to.
    pub user_id: UserId,
    /// Fact kind.
    pub fact_type: FactType,
    /// Free-text value as extracted.
    pub fact_value: String,
    /// Extraction confidence (0.0 - 1.0).
    pub confidence: f64,
    /// The message the fact was extracted from.
    pub source_message_id: Option<MessageId>,
}

impl UserFact {
    /// Creates a fact, clamping confidence into [0, 1].
    #[must_use]
    pub fn new(
        user_id: UserId,
        fact_type: FactType,
        fact_value: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            user_id,
            fact_type,
            fact_value: fact_value.into(),
            confidence: unit(confidence),
            source_message_id: None,
        }
    }

    /// Sets the source message.
    #[must_use]
    pub fn with_source_message(mut self, message_id: MessageId) -> Self {
        self.source_message_id = Some(message_id);
        self
    }

    /// Returns true if the value reads as an affirmative answer.
    #[must_use]
    pub fn is_affirmative(&self) -> bool {
        matches!(
            self.fact_value.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "done" | "completed" | "ja"
        )
    }
}
