//! Ranking of suggestion candidates.

use crate::generator::{SuggestionCandidate, SuggestionCategory};
use crate::profile::{CommunicationStyle, RevolutionaryContext};
use serde::{Deserialize, Serialize};

const PRIORITY_WEIGHT: f64 = 0.4;
const VALUE_WEIGHT: f64 = 0.3;
const OPPORTUNITY_WEIGHT: f64 = 0.3;

/// A candidate with its composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSuggestion {
    #[serde(flatten)]
    pub candidate: SuggestionCandidate,
    pub composite_score: f64,
}

/// Dedupes, reweights, scores and diversifies candidates.
#[derive(Debug, Clone)]
pub struct SuggestionOptimizer {
    pool: usize,
    max_suggestions: usize,
}

impl SuggestionOptimizer {
    /// Creates an optimizer that diversifies the top `pool` candidates and
    /// returns at most `max_suggestions`.
    #[must_use]
    pub fn new(pool: usize, max_suggestions: usize) -> Self {
        Self {
            pool,
            max_suggestions,
        }
    }

    /// Produces the final ranked list.
    #[must_use]
    pub fn optimize(
        &self,
        candidates: Vec<SuggestionCandidate>,
        context: &RevolutionaryContext,
        current_question: &str,
    ) -> Vec<RankedSuggestion> {
        let question = current_question.trim().to_lowercase();
        let boost_problems = context.frustration.current_level > 0.5;
        let boost_critical =
            context.persona.communication_style == CommunicationStyle::Urgent;

        let mut ranked: Vec<RankedSuggestion> = candidates
            .into_iter()
            .filter(|c| c.text.trim().to_lowercase() != question)
            .map(|mut candidate| {
                if boost_problems
                    && matches!(
                        candidate.category,
                        SuggestionCategory::ProblemSolving | SuggestionCategory::ImmediateNeed
                    )
                {
                    candidate.priority += 2.0;
                }
                if boost_critical && candidate.category == SuggestionCategory::ComplianceCritical {
                    candidate.priority += 1.0;
                }
                let composite_score = candidate.priority * PRIORITY_WEIGHT
                    + candidate.business_value * VALUE_WEIGHT
                    + context.opportunity_score * OPPORTUNITY_WEIGHT;
                RankedSuggestion {
                    candidate,
                    composite_score,
                }
            })
            .collect();

        // `sort_by` is stable, so ties keep generation order.
        ranked.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
        ranked.truncate(self.pool);

        let mut chosen: Vec<RankedSuggestion> = Vec::new();
        let mut categories: Vec<SuggestionCategory> = Vec::new();
        for suggestion in ranked {
            let category = suggestion.candidate.category;
            let seen = categories.contains(&category);
            if seen && categories.len() >= 3 {
                continue;
            }
            if !seen {
                categories.push(category);
            }
            chosen.push(suggestion);
        }

        chosen.truncate(self.max_suggestions);
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::default_context;

    fn optimizer() -> SuggestionOptimizer {
        SuggestionOptimizer::new(6, 3)
    }

    fn candidate(text: &str, category: SuggestionCategory, priority: f64) -> SuggestionCandidate {
        SuggestionCandidate::new(text, category, priority, 0.5)
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(optimizer().optimize(Vec::new(), &default_context(), "").is_empty());
    }

    #[test]
    fn drops_the_current_question() {
        let candidates = vec![
            candidate("What is WCAG?", SuggestionCategory::Education, 5.0),
            candidate("Who enforces the act?", SuggestionCategory::Education, 4.0),
        ];
        let ranked = optimizer().optimize(candidates, &default_context(), "  what is wcag? ");

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate.text, "Who enforces the act?");
    }

    #[test]
    fn composite_score_formula() {
        let mut context = default_context();
        context.opportunity_score = 0.5;
        let ranked = optimizer().optimize(
            vec![SuggestionCandidate::new("a", SuggestionCategory::Planning, 5.0, 1.0)],
            &context,
            "",
        );
        assert!((ranked[0].composite_score - (2.0 + 0.3 + 0.15)).abs() < 1e-9);
    }

    #[test]
    fn frustration_boosts_problem_solving() {
        let mut context = default_context();
        context.frustration.current_level = 0.6;
        let candidates = vec![
            candidate("Learn", SuggestionCategory::Education, 6.0),
            candidate("Fix", SuggestionCategory::ProblemSolving, 5.0),
        ];

        let ranked = optimizer().optimize(candidates, &context, "");

        assert_eq!(ranked[0].candidate.text, "Fix");
        assert_eq!(ranked[0].candidate.priority, 7.0);
    }

    #[test]
    fn urgent_style_boosts_compliance_critical() {
        let mut context = default_context();
        context.persona.communication_style = CommunicationStyle::Urgent;
        let candidates = vec![
            candidate("Plan", SuggestionCategory::Planning, 5.5),
            candidate("Comply", SuggestionCategory::ComplianceCritical, 5.0),
        ];

        let ranked = optimizer().optimize(candidates, &context, "");
        assert_eq!(ranked[0].candidate.text, "Comply");
    }

    #[test]
    fn ties_keep_generation_order() {
        let candidates = vec![
            candidate("first", SuggestionCategory::Education, 5.0),
            candidate("second", SuggestionCategory::Planning, 5.0),
            candidate("third", SuggestionCategory::Technical, 5.0),
        ];
        let ranked = optimizer().optimize(candidates, &default_context(), "");
        let texts: Vec<&str> = ranked.iter().map(|r| r.candidate.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn two_categories_are_not_diversified() {
        let candidates: Vec<SuggestionCandidate> = (0..8)
            .map(|i| {
                let category = if i % 2 == 0 {
                    SuggestionCategory::Education
                } else {
                    SuggestionCategory::Planning
                };
                candidate(&format!("q{i}"), category, 8.0 - f64::from(i))
            })
            .collect();

        let ranked = optimizer().optimize(candidates, &default_context(), "");

        let texts: Vec<&str> = ranked.iter().map(|r| r.candidate.text.as_str()).collect();
        assert_eq!(texts, vec!["q0", "q1", "q2"]);
    }

    #[test]
    fn third_category_throttles_repeats() {
        let candidates = vec![
            candidate("a1", SuggestionCategory::Education, 9.0),
            candidate("b1", SuggestionCategory::Planning, 8.0),
            candidate("c1", SuggestionCategory::Technical, 7.0),
            candidate("a2", SuggestionCategory::Education, 6.0),
        ];
        let ranked = SuggestionOptimizer::new(6, 4).optimize(candidates, &default_context(), "");
        let texts: Vec<&str> = ranked.iter().map(|r| r.candidate.text.as_str()).collect();
        assert_eq!(texts, vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn never_more_than_three() {
        let candidates: Vec<SuggestionCandidate> = (0..8)
            .map(|i| candidate(&format!("q{i}"), SuggestionCategory::Education, 1.0))
            .collect();
        assert_eq!(
            optimizer()
                .optimize(candidates, &default_context(), "")
                .len(),
            3
        );
    }
}
