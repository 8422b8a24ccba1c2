use super::user_texts;
use crate::config::{KeywordTables, WeightedPhrases, contains_any, matched};
use crate::profile::{BehaviorPattern, PatternType};
use eaa_copilot_signals::{ChatMessage, ChatSession};
use std::sync::Arc;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Statistical patterns across sessions and messages.
#[derive(Debug, Clone)]
pub struct BehaviorPatternAnalyzer {
    keywords: Arc<KeywordTables>,
}

impl BehaviorPatternAnalyzer {
    /// Creates an analyzer over the given keyword tables.
    #[must_use]
    pub fn new(keywords: Arc<KeywordTables>) -> Self {
        Self { keywords }
    }

    /// Emits every pattern whose threshold is met, in a fixed order.
    ///
    /// `sessions` and `messages` must be oldest first.
    #[must_use]
    pub fn analyze(&self, messages: &[ChatMessage], sessions: &[ChatSession]) -> Vec<BehaviorPattern> {
        let texts = user_texts(messages);
        let mut patterns = Vec::new();

        patterns.extend(session_cadence(sessions));
        patterns.extend(multi_session(sessions));
        patterns.extend(message_length(&texts));
        patterns.extend(complex_thinker(&texts));
        patterns.extend(self.technical_orientation(&texts));
        patterns.extend(self.learning_progression(&texts));
        patterns.extend(engagement_level(messages.len(), sessions.len()));
        patterns.extend(self.problem_solving_style(&texts));

        patterns
    }

    fn technical_orientation(&self, texts: &[String]) -> Option<BehaviorPattern> {
        let share = share_of(texts, |t| contains_any(t, &self.keywords.technical_terms))?;
        (share > 0.4).then(|| {
            BehaviorPattern::new(PatternType::TechnicalOrientation, share, "technical", 0.7)
        })
    }

    fn learning_progression(&self, texts: &[String]) -> Option<BehaviorPattern> {
        if texts.len() < 3 {
            return None;
        }
        let third = texts.len() / 3;
        let early = complexity(&texts[..third], &self.keywords.complexity);
        let late = complexity(&texts[texts.len() - third..], &self.keywords.complexity);

        if early == 0.0 {
            return (late > 0.0).then(|| {
                BehaviorPattern::new(PatternType::LearningProgression, late, "fast_learner", 0.7)
            });
        }

        let ratio = late / early;
        if late >= 1.5 * early {
            Some(BehaviorPattern::new(
                PatternType::LearningProgression,
                ratio,
                "fast_learner",
                0.7,
            ))
        } else if late <= 0.8 * early {
            Some(BehaviorPattern::new(
                PatternType::LearningProgression,
                ratio,
                "needs_reinforcement",
                0.6,
            ))
        } else {
            None
        }
    }

    fn problem_solving_style(&self, texts: &[String]) -> Option<BehaviorPattern> {
        let styles = &self.keywords.problem_solving;
        let tallies = [
            ("systematic", tally(texts, &styles.systematic)),
            ("urgent", tally(texts, &styles.urgent)),
            ("research", tally(texts, &styles.research)),
            ("practical", tally(texts, &styles.practical)),
        ];

        // Strictly greater keeps the earliest style on ties.
        let mut best: Option<(&str, usize)> = None;
        for (style, count) in tallies {
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((style, count));
            }
        }

        best.map(|(style, count)| {
            BehaviorPattern::new(PatternType::ProblemSolvingStyle, count as f64, style, 0.5)
        })
    }
}

fn session_cadence(sessions: &[ChatSession]) -> Option<BehaviorPattern> {
    if sessions.len() < 5 {
        return None;
    }
    let gaps: Vec<f64> = sessions
        .windows(2)
        .map(|pair| (pair[1].created_at - pair[0].created_at).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();
    let mean_days = gaps.iter().sum::<f64>() / gaps.len() as f64;

    let (context, significance) = if mean_days < 1.0 {
        ("intensive", 0.8)
    } else if mean_days < 7.0 {
        ("regular", 0.6)
    } else {
        ("sporadic", 0.4)
    };
    Some(BehaviorPattern::new(
        PatternType::SessionFrequency,
        mean_days,
        context,
        significance,
    ))
}

fn multi_session(sessions: &[ChatSession]) -> Option<BehaviorPattern> {
    let active = sessions.iter().filter(|s| s.is_active).count();
    (active > 1).then(|| {
        BehaviorPattern::new(
            PatternType::MultiSessionEngagement,
            active as f64,
            "parallel_sessions",
            0.5,
        )
    })
}

fn message_length(texts: &[String]) -> Option<BehaviorPattern> {
    if texts.is_empty() {
        return None;
    }
    let mean = texts.iter().map(|t| t.chars().count()).sum::<usize>() as f64 / texts.len() as f64;
    if mean > 200.0 {
        Some(BehaviorPattern::new(PatternType::MessageLength, mean, "detailed", 0.6))
    } else if mean < 50.0 {
        Some(BehaviorPattern::new(PatternType::MessageLength, mean, "concise", 0.6))
    } else {
        None
    }
}

fn complex_thinker(texts: &[String]) -> Option<BehaviorPattern> {
    let share = share_of(texts, |t| t.matches('?').count() > 1)?;
    (share > 0.3)
        .then(|| BehaviorPattern::new(PatternType::ComplexThinker, share, "multi_question", 0.7))
}

fn engagement_level(message_count: usize, session_count: usize) -> Option<BehaviorPattern> {
    if message_count == 0 {
        return None;
    }
    let mean = message_count as f64 / session_count.max(1) as f64;
    if mean > 10.0 {
        Some(BehaviorPattern::new(PatternType::EngagementLevel, mean, "high", 0.6))
    } else if mean < 3.0 {
        Some(BehaviorPattern::new(PatternType::EngagementLevel, mean, "low", 0.5))
    } else {
        None
    }
}

/// Fraction of texts satisfying `pred`, or `None` without texts.
fn share_of(texts: &[String], pred: impl Fn(&str) -> bool) -> Option<f64> {
    if texts.is_empty() {
        return None;
    }
    Some(texts.iter().filter(|t| pred(t)).count() as f64 / texts.len() as f64)
}

/// Mean weighted complexity per message.
fn complexity(texts: &[String], tiers: &[WeightedPhrases]) -> f64 {
    if texts.is_empty() {
        return 0.0;
    }
    let total: f64 = texts
        .iter()
        .map(|t| {
            tiers
                .iter()
                .map(|tier| tier.weight * matched(t, &tier.phrases).len() as f64)
                .sum::<f64>()
        })
        .sum();
    total / texts.len() as f64
}

fn tally(texts: &[String], phrases: &[String]) -> usize {
    texts.iter().map(|t| matched(t, phrases).len()).sum()
}
