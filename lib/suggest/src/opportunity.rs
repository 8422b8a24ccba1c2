//! Scalar value of a well-targeted suggestion right now.

use crate::profile::{
    BusinessMaturityProfile, ConversationStage, FrustrationProfile, Stage, round2, unit,
};

const READINESS_WEIGHT: f64 = 0.4;
const CALM_WEIGHT: f64 = 0.4;
const STAGE_WEIGHT: f64 = 0.2;

/// Scores readiness, calmness and stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityScorer;

impl OpportunityScorer {
    /// Creates a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the opportunity score, rounded to two decimals, in [0, 1].
    #[must_use]
    pub fn score(
        &self,
        maturity: &BusinessMaturityProfile,
        frustration: &FrustrationProfile,
        stage: &ConversationStage,
    ) -> f64 {
        let stage_factor = match stage.stage {
            Stage::DeepDive | Stage::Implementation => 1.0,
            Stage::Exploration => 0.7,
            Stage::Discovery | Stage::Troubleshooting => 0.5,
        };
        let raw = maturity.eaa_readiness * READINESS_WEIGHT
            + (1.0 - frustration.current_level) * CALM_WEIGHT
            + stage_factor * STAGE_WEIGHT;
        unit(round2(raw))
    }
}
