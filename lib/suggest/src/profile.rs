//! Derived, request-scoped profiles.
//!
//! Every value here is computed fresh for one request and never mutated
//! afterwards. Bounded numeric fields are kept in [0, 1] by their
//! constructors and by [`unit`].

use serde::{Deserialize, Serialize};

pub use eaa_copilot_core::unit;

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the wire name.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use wire_enum;

wire_enum! {
    /// Professional persona of the user.
    PersonaType {
        /// Owns or runs the business.
        BusinessOwner => "business_owner",
        /// Developer, designer or other implementer.
        TechnicalImplementer => "technical_implementer",
        /// Responsible for legal or compliance work.
        ComplianceManager => "compliance_manager",
        /// New to the topic.
        #[serde(alias = "end_user")]
        Newcomer => "newcomer",
        /// Currently frustrated, regardless of role.
        FrustratedUser => "frustrated_user",
    }
}

wire_enum! {
    /// How the user prefers to be addressed.
    CommunicationStyle {
        Balanced => "balanced",
        Direct => "direct",
        Detailed => "detailed",
        Technical => "technical",
        Urgent => "urgent",
    }
}

wire_enum! {
    /// Self-evident experience with accessibility compliance.
    ExperienceLevel {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
    }
}

wire_enum! {
    /// Organizational maturity bracket.
    MaturityLevel {
        Startup => "startup",
        Small => "small",
        Medium => "medium",
        Enterprise => "enterprise",
    }
}

wire_enum! {
    /// How pressing the user's timeline is.
    TimeConstraints {
        Urgent => "urgent",
        Moderate => "moderate",
        PlanningAhead => "planning_ahead",
    }
}

wire_enum! {
    /// A known gap in the user's compliance work.
    ComplianceGap {
        AccessibilityAudit => "accessibility_audit",
        WcagKnowledge => "wcag_knowledge",
    }
}

wire_enum! {
    /// How to approach a user given their frustration.
    RecommendedApproach {
        Gentle => "gentle",
        Technical => "technical",
        Direct => "direct",
        BusinessFocused => "business_focused",
    }
}

wire_enum! {
    /// Phase of the user's journey.
    Stage {
        Discovery => "discovery",
        Exploration => "exploration",
        DeepDive => "deep_dive",
        Implementation => "implementation",
        Troubleshooting => "troubleshooting",
    }
}

wire_enum! {
    /// Kind of observed behavior.
    PatternType {
        SessionFrequency => "session_frequency",
        MultiSessionEngagement => "multi_session_engagement",
        MessageLength => "message_length",
        ComplexThinker => "complex_thinker",
        TechnicalOrientation => "technical_orientation",
        LearningProgression => "learning_progression",
        EngagementLevel => "engagement_level",
        ProblemSolvingStyle => "problem_solving_style",
    }
}

wire_enum! {
    /// Kind of predicted need.
    NeedKind {
        BasicEducation => "basic_education",
        TechnicalGuidance => "technical_guidance",
        BusinessImpact => "business_impact",
        ComplianceAssessment => "compliance_assessment",
        CertificationReadiness => "certification_readiness",
        ImplementationSupport => "implementation_support",
        ProblemResolution => "problem_resolution",
        AuditGuidance => "audit_guidance",
        DocumentationSupport => "documentation_support",
    }
}

/// Inferred persona.
///
/// This is also the exact shape the model must answer with, so unknown
/// fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonaProfile {
    /// Persona type.
    #[serde(rename = "type")]
    pub persona_type: PersonaType,
    /// Confidence in the classification (0.0 - 1.0).
    pub confidence: f64,
    /// Preferred communication style.
    pub communication_style: CommunicationStyle,
    /// Experience level.
    pub experience_level: ExperienceLevel,
    /// Free-form traits.
    pub traits: Vec<String>,
}

impl PersonaProfile {
    /// The profile used when nothing better is known.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            persona_type: PersonaType::Newcomer,
            confidence: 0.3,
            communication_style: CommunicationStyle::Balanced,
            experience_level: ExperienceLevel::Beginner,
            traits: vec!["requires analysis".to_string()],
        }
    }

    /// Returns the profile with its confidence clamped into [0, 1].
    #[must_use]
    pub fn bounded(mut self) -> Self {
        self.confidence = unit(self.confidence);
        self
    }
}

/// Inferred business maturity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMaturityProfile {
    pub level: MaturityLevel,
    pub eaa_readiness: f64,
    pub compliance_gaps: Vec<ComplianceGap>,
    pub time_constraints: TimeConstraints,
}

/// Current frustration estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrustrationProfile {
    pub current_level: f64,
    pub triggers: Vec<String>,
    pub escalation_risk: f64,
    pub recommended_approach: RecommendedApproach,
}

impl FrustrationProfile {
    /// A calm profile with no signal.
    #[must_use]
    pub fn calm() -> Self {
        Self {
            current_level: 0.0,
            triggers: Vec::new(),
            escalation_risk: 0.0,
            recommended_approach: RecommendedApproach::Gentle,
        }
    }
}

/// Inferred conversation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStage {
    pub stage: Stage,
    pub completeness: f64,
    pub next_optimal_steps: Vec<String>,
}

/// One observed behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorPattern {
    /// Kind of behavior.
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// The statistic that triggered the pattern.
    pub frequency: f64,
    /// Short label, e.g. `intensive` or `fast_learner`.
    pub context: String,
    /// How much the pattern should count (0.0 - 1.0).
    pub significance: f64,
}

impl BehaviorPattern {
    /// Creates a pattern.
    #[must_use]
    pub fn new(
        pattern_type: PatternType,
        frequency: f64,
        context: impl Into<String>,
        significance: f64,
    ) -> Self {
        Self {
            pattern_type,
            frequency,
            context: context.into(),
            significance: unit(significance),
        }
    }
}

/// A need the user is likely to have next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedNeed {
    #[serde(rename = "type")]
    pub need_type: NeedKind,
    pub probability: f64,
    pub urgency: f64,
    pub description: String,
}

impl PredictedNeed {
    /// Ranking weight: probability times urgency.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.probability * self.urgency
    }
}

/// Everything derived about the user for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevolutionaryContext {
    pub persona: PersonaProfile,
    pub business_maturity: BusinessMaturityProfile,
    pub frustration: FrustrationProfile,
    pub stage: ConversationStage,
    pub behavior_patterns: Vec<BehaviorPattern>,
    pub predicted_needs: Vec<PredictedNeed>,
    pub opportunity_score: f64,
}

impl RevolutionaryContext {
    /// Returns the name of the first bounded field outside [0, 1], if any.
    #[must_use]
    pub fn out_of_bounds(&self) -> Option<&'static str> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.persona.confidence) {
            return Some("persona.confidence");
        }
        if !in_unit(self.business_maturity.eaa_readiness) {
            return Some("businessMaturity.eaaReadiness");
        }
        if !in_unit(self.frustration.current_level) {
            return Some("frustration.currentLevel");
        }
        if !in_unit(self.frustration.escalation_risk) {
            return Some("frustration.escalationRisk");
        }
        if !in_unit(self.stage.completeness) {
            return Some("stage.completeness");
        }
        if self.behavior_patterns.iter().any(|p| !in_unit(p.significance)) {
            return Some("behaviorPatterns.significance");
        }
        if self
            .predicted_needs
            .iter()
            .any(|n| !in_unit(n.probability) || !in_unit(n.urgency))
        {
            return Some("predictedNeeds");
        }
        if !in_unit(self.opportunity_score) {
            return Some("opportunityScore");
        }
        None
    }
}
