use super::{joined_user_text, user_texts};
use crate::config::{KeywordTables, contains_any};
use crate::profile::{ConversationStage, Stage};
use eaa_copilot_signals::ChatMessage;
use std::sync::Arc;

/// Classifies the phase of the conversation from user wording.
#[derive(Debug, Clone)]
pub struct ConversationStageAnalyzer {
    keywords: Arc<KeywordTables>,
}

impl ConversationStageAnalyzer {
    /// Creates an analyzer over the given keyword tables.
    #[must_use]
    pub fn new(keywords: Arc<KeywordTables>) -> Self {
        Self { keywords }
    }

    /// Classifies the session.
    ///
    /// Precedence is troubleshooting, implementation, deep dive, then
    /// exploration for sessions with more than five user messages.
    #[must_use]
    pub fn analyze(&self, messages: &[ChatMessage]) -> ConversationStage {
        let text = joined_user_text(messages);
        let user_message_count = user_texts(messages).len();

        let stage = if contains_any(&text, &self.keywords.troubleshooting) {
            Stage::Troubleshooting
        } else if contains_any(&text, &self.keywords.implementation) {
            Stage::Implementation
        } else if contains_any(&text, &self.keywords.deep_dive) {
            Stage::DeepDive
        } else if user_message_count > 5 {
            Stage::Exploration
        } else {
            Stage::Discovery
        };

        ConversationStage {
            stage,
            completeness: completeness(stage),
            next_optimal_steps: next_steps(stage)
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

fn completeness(stage: Stage) -> f64 {
    match stage {
        Stage::Troubleshooting => 0.8,
        Stage::Implementation => 0.7,
        Stage::DeepDive => 0.6,
        Stage::Exploration => 0.4,
        Stage::Discovery => 0.0,
    }
}

fn next_steps(stage: Stage) -> &'static [&'static str] {
    match stage {
        Stage::Discovery => &[
            "Identify which products and services fall under the EAA",
            "Learn the core accessibility requirements",
        ],
        Stage::Exploration => &[
            "Map the requirements to your digital channels",
            "Review the compliance timeline",
        ],
        Stage::DeepDive => &[
            "Run an accessibility audit",
            "Prioritize findings by user impact",
        ],
        Stage::Implementation => &[
            "Fix the highest-impact issues first",
            "Document your conformance decisions",
        ],
        Stage::Troubleshooting => &[
            "Isolate the failing component",
            "Retest with assistive technology",
        ],
    }
}
