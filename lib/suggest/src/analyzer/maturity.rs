use super::joined_user_text;
use crate::config::{KeywordTables, contains_any};
use crate::profile::{
    BusinessMaturityProfile, ComplianceGap, MaturityLevel, TimeConstraints, unit,
};
use eaa_copilot_signals::{ChatMessage, FactType, UserFact};
use std::sync::Arc;

/// Heuristic estimate of organizational readiness.
#[derive(Debug, Clone)]
pub struct BusinessMaturityAnalyzer {
    keywords: Arc<KeywordTables>,
}

impl BusinessMaturityAnalyzer {
    /// Creates an analyzer over the given keyword tables.
    #[must_use]
    pub fn new(keywords: Arc<KeywordTables>) -> Self {
        Self { keywords }
    }

    /// Derives the maturity profile from facts and user messages.
    #[must_use]
    pub fn analyze(&self, facts: &[UserFact], messages: &[ChatMessage]) -> BusinessMaturityProfile {
        let kw = &self.keywords;
        let text = joined_user_text(messages);

        let enterprise_fact = facts.iter().any(|f| {
            matches!(f.fact_type, FactType::BusinessType | FactType::CompanySize)
                && contains_any(&f.fact_value.to_lowercase(), &kw.enterprise)
        });
        let audit_done = facts
            .iter()
            .any(|f| f.fact_type == FactType::AccessibilityAudit && f.is_affirmative());
        let digital_fact = facts
            .iter()
            .any(|f| f.fact_type == FactType::DigitalPresence && !f.fact_value.trim().is_empty());

        let (level, readiness) = if enterprise_fact || contains_any(&text, &kw.enterprise) {
            (MaturityLevel::Enterprise, 0.8)
        } else if audit_done || contains_any(&text, &kw.audit) {
            (MaturityLevel::Medium, 0.6)
        } else if digital_fact || contains_any(&text, &kw.digital_presence) {
            (MaturityLevel::Small, 0.4)
        } else {
            (MaturityLevel::Startup, 0.1)
        };

        let mut compliance_gaps = Vec::new();
        if !audit_done {
            compliance_gaps.push(ComplianceGap::AccessibilityAudit);
        }
        if !contains_any(&text, &kw.wcag) {
            compliance_gaps.push(ComplianceGap::WcagKnowledge);
        }

        let time_constraints = if contains_any(&text, &kw.urgency) {
            TimeConstraints::Urgent
        } else if contains_any(&text, &kw.near_term) {
            TimeConstraints::Moderate
        } else {
            TimeConstraints::PlanningAhead
        };

        BusinessMaturityProfile {
            level,
            eaa_readiness: unit(readiness),
            compliance_gaps,
            time_constraints,
        }
    }
}
