//! Rule-table prediction of what the user will need next.

use crate::profile::{
    BusinessMaturityProfile, ConversationStage, ExperienceLevel, NeedKind, PersonaProfile,
    PersonaType, PredictedNeed, Stage,
};

/// Fixed probability and urgency attached to each need.
fn weights(need: NeedKind) -> (f64, f64) {
    match need {
        NeedKind::BasicEducation => (0.9, 0.6),
        NeedKind::TechnicalGuidance => (0.85, 0.7),
        NeedKind::BusinessImpact => (0.8, 0.7),
        NeedKind::DocumentationSupport => (0.8, 0.6),
        NeedKind::ComplianceAssessment => (0.85, 0.8),
        NeedKind::CertificationReadiness => (0.6, 0.4),
        NeedKind::ImplementationSupport => (0.9, 0.85),
        NeedKind::ProblemResolution => (0.95, 0.95),
        NeedKind::AuditGuidance => (0.75, 0.6),
    }
}

/// Human-readable topic for a need, used in suggestion text.
#[must_use]
pub fn describe(need: NeedKind) -> &'static str {
    match need {
        NeedKind::BasicEducation => "the basics of the European Accessibility Act",
        NeedKind::TechnicalGuidance => "the technical accessibility requirements",
        NeedKind::BusinessImpact => "the business impact of EAA compliance",
        NeedKind::DocumentationSupport => "compliance documentation and accessibility statements",
        NeedKind::ComplianceAssessment => "assessing where I stand on compliance",
        NeedKind::CertificationReadiness => "preparing for a conformity assessment",
        NeedKind::ImplementationSupport => "implementing the accessibility fixes",
        NeedKind::ProblemResolution => "resolving my accessibility problem",
        NeedKind::AuditGuidance => "running an accessibility audit",
    }
}

/// Predicts needs from the persona, maturity and stage.
///
/// Rules are evaluated in table order; the result is sorted by
/// probability times urgency, highest first, keeping table order on ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeedsPredictor;

impl NeedsPredictor {
    /// Creates a predictor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Applies the rule table.
    #[must_use]
    pub fn predict(
        &self,
        persona: &PersonaProfile,
        maturity: &BusinessMaturityProfile,
        stage: &ConversationStage,
    ) -> Vec<PredictedNeed> {
        let readiness = maturity.eaa_readiness;
        let rules = [
            (
                persona.persona_type == PersonaType::Newcomer
                    || persona.experience_level == ExperienceLevel::Beginner,
                NeedKind::BasicEducation,
            ),
            (
                persona.persona_type == PersonaType::TechnicalImplementer
                    || matches!(
                        persona.experience_level,
                        ExperienceLevel::Advanced | ExperienceLevel::Expert
                    ),
                NeedKind::TechnicalGuidance,
            ),
            (
                persona.persona_type == PersonaType::BusinessOwner,
                NeedKind::BusinessImpact,
            ),
            (
                persona.persona_type == PersonaType::ComplianceManager,
                NeedKind::DocumentationSupport,
            ),
            (readiness < 0.3, NeedKind::ComplianceAssessment),
            (readiness >= 0.6, NeedKind::CertificationReadiness),
            (
                stage.stage == Stage::Implementation,
                NeedKind::ImplementationSupport,
            ),
            (
                stage.stage == Stage::Troubleshooting,
                NeedKind::ProblemResolution,
            ),
            (stage.stage == Stage::DeepDive, NeedKind::AuditGuidance),
        ];

        let mut needs: Vec<PredictedNeed> = rules
            .into_iter()
            .filter(|(applies, _)| *applies)
            .map(|(_, need)| {
                let (probability, urgency) = weights(need);
                PredictedNeed {
                    need_type: need,
                    probability,
                    urgency,
                    description: describe(need).to_string(),
                }
            })
            .collect();

        needs.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
        needs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{
        CommunicationStyle, ComplianceGap, MaturityLevel, TimeConstraints,
    };

    fn persona(persona_type: PersonaType, experience_level: ExperienceLevel) -> PersonaProfile {
        PersonaProfile {
            persona_type,
            confidence: 0.8,
            communication_style: CommunicationStyle::Balanced,
            experience_level,
            traits: Vec::new(),
        }
    }

    fn maturity(eaa_readiness: f64) -> BusinessMaturityProfile {
        BusinessMaturityProfile {
            level: MaturityLevel::Small,
            eaa_readiness,
            compliance_gaps: vec![ComplianceGap::AccessibilityAudit],
            time_constraints: TimeConstraints::PlanningAhead,
        }
    }

    fn stage(stage: Stage) -> ConversationStage {
        ConversationStage {
            stage,
            completeness: 0.5,
            next_optimal_steps: Vec::new(),
        }
    }

    fn kinds(needs: &[PredictedNeed]) -> Vec<NeedKind> {
        needs.iter().map(|n| n.need_type).collect()
    }

    #[test]
    fn fallback_persona_at_startup() {
        let needs = NeedsPredictor::new().predict(
            &PersonaProfile::fallback(),
            &maturity(0.1),
            &stage(Stage::Discovery),
        );

        assert_eq!(
            kinds(&needs),
            vec![NeedKind::ComplianceAssessment, NeedKind::BasicEducation]
        );
    }

    #[test]
    fn troubleshooting_ranks_first() {
        let needs = NeedsPredictor::new().predict(
            &persona(PersonaType::TechnicalImplementer, ExperienceLevel::Expert),
            &maturity(0.6),
            &stage(Stage::Troubleshooting),
        );

        assert_eq!(
            kinds(&needs),
            vec![
                NeedKind::ProblemResolution,
                NeedKind::TechnicalGuidance,
                NeedKind::CertificationReadiness,
            ]
        );
    }

    #[test]
    fn middle_readiness_adds_no_readiness_need() {
        let needs = NeedsPredictor::new().predict(
            &persona(PersonaType::BusinessOwner, ExperienceLevel::Intermediate),
            &maturity(0.4),
            &stage(Stage::Exploration),
        );
        assert_eq!(kinds(&needs), vec![NeedKind::BusinessImpact]);
    }

    #[test]
    fn sorted_by_weight_and_bounded() {
        let needs = NeedsPredictor::new().predict(
            &persona(PersonaType::ComplianceManager, ExperienceLevel::Beginner),
            &maturity(0.2),
            &stage(Stage::Implementation),
        );

        assert!(needs.windows(2).all(|w| w[0].weight() >= w[1].weight()));
        assert!(needs.iter().all(|n| {
            (0.0..=1.0).contains(&n.probability) && (0.0..=1.0).contains(&n.urgency)
        }));
    }
}
