//! Rule-based suggestion candidates.

use crate::needs::describe;
use crate::profile::{
    NeedKind, PersonaType, RevolutionaryContext, Stage, TimeConstraints, unit, wire_enum,
};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Broad category of a suggestion, used for boosting and diversity.
    SuggestionCategory {
        ProblemSolving => "problem_solving",
        ImmediateNeed => "immediate_need",
        ComplianceCritical => "compliance_critical",
        Education => "education",
        Implementation => "implementation",
        BusinessImpact => "business_impact",
        Technical => "technical",
        Planning => "planning",
    }
}

/// An unranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCandidate {
    pub text: String,
    pub category: SuggestionCategory,
    pub priority: f64,
    pub reasoning: String,
    pub expected_outcome: String,
    pub business_value: f64,
}

impl SuggestionCandidate {
    /// Creates a candidate with bounded business value.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        category: SuggestionCategory,
        priority: f64,
        business_value: f64,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            priority,
            reasoning: String::new(),
            expected_outcome: String::new(),
            business_value: unit(business_value),
        }
    }

    /// Sets the reasoning.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    /// Sets the expected outcome.
    #[must_use]
    pub fn with_expected_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.expected_outcome = outcome.into();
        self
    }
}

/// Emits candidates from independent rules.
#[derive(Debug, Clone)]
pub struct SuggestionGenerator {
    max_candidates: usize,
}

impl SuggestionGenerator {
    /// Creates a generator that emits at most `max_candidates`.
    #[must_use]
    pub fn new(max_candidates: usize) -> Self {
        Self { max_candidates }
    }

    /// Generates candidates in rule order: quick fix, persona, stage, needs,
    /// then timeline.
    #[must_use]
    pub fn generate(&self, context: &RevolutionaryContext) -> Vec<SuggestionCandidate> {
        let mut candidates = Vec::new();

        if context.frustration.current_level > 0.6 {
            candidates.push(
                SuggestionCandidate::new(
                    "What is the quickest fix I can make right now?",
                    SuggestionCategory::ProblemSolving,
                    9.0,
                    0.7,
                )
                .with_reasoning("The user is frustrated and needs fast progress")
                .with_expected_outcome("One concrete action the user can take today"),
            );
        }

        candidates.push(persona_candidate(context.persona.persona_type));
        candidates.push(stage_candidate(context.stage.stage));

        for need in context.predicted_needs.iter().take(2) {
            candidates.push(
                SuggestionCandidate::new(
                    format!("Tell me more about {}", describe(need.need_type)),
                    need_category(need.need_type),
                    4.0 + 4.0 * need.weight(),
                    need.probability,
                )
                .with_reasoning(format!("Predicted need: {}", need.need_type))
                .with_expected_outcome(format!("Guidance on {}", describe(need.need_type))),
            );
        }

        if context.business_maturity.time_constraints == TimeConstraints::Urgent {
            candidates.push(
                SuggestionCandidate::new(
                    "What must I do first to meet the EAA deadline?",
                    SuggestionCategory::ComplianceCritical,
                    8.0,
                    0.9,
                )
                .with_reasoning("The user is working against a deadline")
                .with_expected_outcome("A prioritized list of deadline-critical tasks"),
            );
        }

        candidates.truncate(self.max_candidates);
        candidates
    }
}

fn persona_candidate(persona: PersonaType) -> SuggestionCandidate {
    let (text, category, priority, value, outcome) = match persona {
        PersonaType::BusinessOwner => (
            "What does EAA compliance mean for my costs and revenue?",
            SuggestionCategory::BusinessImpact,
            7.0,
            0.8,
            "A view of the business risks and benefits",
        ),
        PersonaType::TechnicalImplementer => (
            "Which WCAG 2.1 AA criteria should we fix first?",
            SuggestionCategory::Technical,
            7.0,
            0.7,
            "A prioritized technical backlog",
        ),
        PersonaType::ComplianceManager => (
            "What documentation do we need to demonstrate compliance?",
            SuggestionCategory::ComplianceCritical,
            7.0,
            0.8,
            "A documentation checklist",
        ),
        PersonaType::Newcomer => (
            "What is the European Accessibility Act and does it apply to me?",
            SuggestionCategory::Education,
            6.0,
            0.6,
            "A clear picture of whether and how the act applies",
        ),
        PersonaType::FrustratedUser => (
            "Can you give me a short, concrete answer for my situation?",
            SuggestionCategory::ImmediateNeed,
            7.0,
            0.7,
            "A direct answer without detours",
        ),
    };
    SuggestionCandidate::new(text, category, priority, value)
        .with_reasoning(format!("Tailored to the {persona} persona"))
        .with_expected_outcome(outcome)
}

fn stage_candidate(stage: Stage) -> SuggestionCandidate {
    let (text, category, priority, value, outcome) = match stage {
        Stage::Discovery => (
            "Which of my products and services are covered by the EAA?",
            SuggestionCategory::Education,
            5.0,
            0.6,
            "Knowing the scope of the obligations",
        ),
        Stage::Exploration => (
            "What are the key deadlines I need to plan for?",
            SuggestionCategory::Planning,
            5.0,
            0.6,
            "A compliance timeline",
        ),
        Stage::DeepDive => (
            "How do I run an accessibility audit of my website?",
            SuggestionCategory::ComplianceCritical,
            6.0,
            0.8,
            "An audit plan",
        ),
        Stage::Implementation => (
            "Can you give me a step-by-step implementation checklist?",
            SuggestionCategory::Implementation,
            6.0,
            0.8,
            "An ordered list of implementation steps",
        ),
        Stage::Troubleshooting => (
            "How do I fix the most common accessibility errors?",
            SuggestionCategory::ProblemSolving,
            6.0,
            0.7,
            "Fixes for the issue at hand",
        ),
    };
    SuggestionCandidate::new(text, category, priority, value)
        .with_reasoning(format!("Fits the {stage} stage"))
        .with_expected_outcome(outcome)
}

fn need_category(need: NeedKind) -> SuggestionCategory {
    match need {
        NeedKind::BasicEducation => SuggestionCategory::Education,
        NeedKind::TechnicalGuidance => SuggestionCategory::Technical,
        NeedKind::BusinessImpact => SuggestionCategory::BusinessImpact,
        NeedKind::ComplianceAssessment
        | NeedKind::CertificationReadiness
        | NeedKind::DocumentationSupport
        | NeedKind::AuditGuidance => SuggestionCategory::ComplianceCritical,
        NeedKind::ImplementationSupport => SuggestionCategory::Implementation,
        NeedKind::ProblemResolution => SuggestionCategory::ProblemSolving,
    }
}
