//! The display header above the suggestions.

use crate::profile::{PersonaType, RevolutionaryContext, Stage};

/// Header shown when no override applies.
pub const GENERIC_HEADER: &str = "Here are some questions you might find helpful:";

/// Picks header wording through an ordered override chain.
///
/// Later overrides replace earlier ones: frustration, then persona, then
/// stage.
#[derive(Debug, Clone)]
pub struct HeaderGenerator {
    persona_confidence_threshold: f64,
}

impl HeaderGenerator {
    /// Creates a generator. Persona wording needs at least
    /// `persona_confidence_threshold` confidence.
    #[must_use]
    pub fn new(persona_confidence_threshold: f64) -> Self {
        Self {
            persona_confidence_threshold,
        }
    }

    /// Returns the header for a context.
    #[must_use]
    pub fn generate(&self, context: &RevolutionaryContext) -> String {
        let mut header = GENERIC_HEADER;

        let frustration = context.frustration.current_level;
        if frustration > 0.7 {
            header = "Let's solve this quickly. These will help most right now:";
        } else if frustration > 0.4 {
            header = "Here are the recommended next steps:";
        }

        if context.persona.confidence >= self.persona_confidence_threshold {
            header = match context.persona.persona_type {
                PersonaType::BusinessOwner => "Questions to understand the impact on your business:",
                PersonaType::TechnicalImplementer => {
                    "Technical questions to move your implementation forward:"
                }
                PersonaType::ComplianceManager => "Questions to strengthen your compliance position:",
                PersonaType::Newcomer => "Good questions to get started with the EAA:",
                PersonaType::FrustratedUser => "Let's get you a clear answer:",
            };
        }

        match context.stage.stage {
            Stage::Implementation => header = "Next steps for your implementation:",
            Stage::Troubleshooting => header = "Let's fix the issue together:",
            Stage::Discovery | Stage::Exploration | Stage::DeepDive => {}
        }

        header.to_string()
    }
}
