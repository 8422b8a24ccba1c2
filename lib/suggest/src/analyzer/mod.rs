//! The five signal analyzers.
//!
//! Each analyzer consumes part of a [`SignalSnapshot`](eaa_copilot_signals::SignalSnapshot)
//! and always returns a well-formed profile. Only the persona analyzer calls
//! the language model; the others are deterministic functions of their input.

mod behavior;
mod frustration;
mod maturity;
mod persona;
mod stage;

pub use behavior::BehaviorPatternAnalyzer;
pub use frustration::FrustrationProfileAnalyzer;
pub use maturity::BusinessMaturityAnalyzer;
pub use persona::{PersonaAnalysis, PersonaAnalyzer};
pub use stage::ConversationStageAnalyzer;

use eaa_copilot_signals::ChatMessage;

/// Lowercased content of the user-authored messages, oldest first.
pub(crate) fn user_texts(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.is_from_user())
        .map(|m| m.content.to_lowercase())
        .collect()
}

/// All user-authored text joined into one lowercase string.
pub(crate) fn joined_user_text(messages: &[ChatMessage]) -> String {
    user_texts(messages).join(" ")
}
