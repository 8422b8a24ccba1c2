use super::user_texts;
use crate::config::{KeywordTables, contains_any, matched};
use crate::profile::{FrustrationProfile, RecommendedApproach, unit};
use chrono::{DateTime, Duration, Utc};
use eaa_copilot_signals::{ChatMessage, FrustrationRecord};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const HISTORY_WEIGHT: f64 = 0.7;
const REALTIME_WEIGHT: f64 = 0.3;
const MAX_ESCALATION_FACTOR: f64 = 2.0;
const MAX_TRIGGERS: usize = 10;
const REPETITION_TRIGGER: &str = "repeated question";

/// Estimates frustration from history and the live conversation.
#[derive(Debug, Clone)]
pub struct FrustrationProfileAnalyzer {
    keywords: Arc<KeywordTables>,
    window: usize,
}

impl FrustrationProfileAnalyzer {
    /// Creates an analyzer scoring the last `window` user messages.
    #[must_use]
    pub fn new(keywords: Arc<KeywordTables>, window: usize) -> Self {
        Self { keywords, window }
    }

    /// Derives the frustration profile.
    ///
    /// `history` must be newest first and `messages` oldest first, as a
    /// normalized snapshot provides them. `now` anchors the recent-burst
    /// check.
    #[must_use]
    pub fn analyze(
        &self,
        history: &[FrustrationRecord],
        messages: &[ChatMessage],
        now: DateTime<Utc>,
    ) -> FrustrationProfile {
        let kw = &self.keywords;
        let raw: Vec<&str> = messages
            .iter()
            .filter(|m| m.is_from_user())
            .map(|m| m.content.as_str())
            .collect();
        let raw_recent = &raw[raw.len().saturating_sub(self.window)..];
        let texts = user_texts(messages);
        let recent = &texts[texts.len().saturating_sub(self.window)..];

        let base_level = history.first().map_or(0.0, |r| r.frustration_level);
        let realtime_level = if raw_recent.is_empty() {
            0.0
        } else {
            raw_recent.iter().map(|m| self.message_score(m)).sum::<f64>()
                / raw_recent.len() as f64
        };
        let combined = HISTORY_WEIGHT * base_level + REALTIME_WEIGHT * realtime_level;

        let session_text = texts.join(" ");
        let urgency = matched(&session_text, &kw.urgency);
        let repetition = repetition_count(&texts);

        let mut factor: f64 = 1.0;
        if !urgency.is_empty() {
            factor *= 1.3;
        }
        if repetition > 1 {
            factor *= 1.0 + 0.2 * repetition as f64;
        }
        if messages.len() > 20 {
            factor *= 1.2;
        }
        let factor = factor.min(MAX_ESCALATION_FACTOR);

        let current_level = unit((combined * factor).min(1.0));

        let mut risk = current_level;
        if rising_trend(history) {
            risk += 0.3;
        }
        if burst(messages, now) {
            risk += 0.2;
        }
        if repetition > 2 {
            risk += 0.25;
        }
        risk += 0.2 * urgency_score(urgency.len());
        let escalation_risk = unit(risk);

        let recommended_approach = if current_level > 0.7 {
            RecommendedApproach::BusinessFocused
        } else if current_level > 0.4 {
            RecommendedApproach::Direct
        } else if recent.iter().any(|t| contains_any(t, &kw.technical_terms)) {
            RecommendedApproach::Technical
        } else {
            RecommendedApproach::Gentle
        };

        let mut triggers: Vec<String> = Vec::new();
        for text in recent {
            for tier in &kw.frustration_tiers {
                for phrase in matched(text, &tier.phrases) {
                    push_unique(&mut triggers, phrase);
                }
            }
        }
        if repetition > 0 {
            push_unique(&mut triggers, REPETITION_TRIGGER);
        }
        for phrase in &urgency {
            push_unique(&mut triggers, phrase);
        }
        triggers.truncate(MAX_TRIGGERS);

        FrustrationProfile {
            current_level,
            triggers,
            escalation_risk,
            recommended_approach,
        }
    }

    /// Scores one message in [0, 1].
    fn message_score(&self, content: &str) -> f64 {
        let lower = content.to_lowercase();
        let mut score: f64 = self
            .keywords
            .frustration_tiers
            .iter()
            .map(|tier| tier.weight * matched(&lower, &tier.phrases).len() as f64)
            .sum();

        if uppercase_ratio(content) > 0.3 {
            score += 0.3;
        }
        if content.matches('!').count() > 2 {
            score += 0.2;
        }
        if content.matches('?').count() > 3 {
            score += 0.15;
        }
        score.min(1.0)
    }
}

fn uppercase_ratio(content: &str) -> f64 {
    let total = content.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = content.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / total as f64
}

/// Number of distinct word trigrams found in two or more user messages.
fn repetition_count(texts: &[String]) -> usize {
    let mut seen_in: HashMap<String, usize> = HashMap::new();
    for text in texts {
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let trigrams: HashSet<String> = words.windows(3).map(|w| w.join(" ")).collect();
        for trigram in trigrams {
            *seen_in.entry(trigram).or_default() += 1;
        }
    }
    seen_in.values().filter(|&&n| n >= 2).count()
}

fn rising_trend(history: &[FrustrationRecord]) -> bool {
    match history {
        [newest, previous, ..] => newest.frustration_level - previous.frustration_level > 0.2,
        _ => false,
    }
}

fn burst(messages: &[ChatMessage], now: DateTime<Utc>) -> bool {
    let since = now - Duration::minutes(5);
    messages
        .iter()
        .filter(|m| m.is_from_user() && m.created_at >= since && m.created_at <= now)
        .count()
        > 3
}

fn urgency_score(matches: usize) -> f64 {
    (matches as f64 / 3.0).min(1.0)
}

fn push_unique(triggers: &mut Vec<String>, phrase: &str) {
    if !triggers.iter().any(|t| t == phrase) {
        triggers.push(phrase.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eaa_copilot_core::{SessionId, UserId};

    fn analyzer() -> FrustrationProfileAnalyzer {
        FrustrationProfileAnalyzer::new(Arc::new(KeywordTables::default()), 5)
    }

    fn session() -> SessionId {
        SessionId::new("s1").expect("valid")
    }

    fn said_at(text: &str, at: DateTime<Utc>) -> ChatMessage {
        ChatMessage::user(session(), text).at(at)
    }

    fn record(level: f64, at: DateTime<Utc>) -> FrustrationRecord {
        FrustrationRecord::new(UserId::new("u1").expect("valid"), session(), level, 0.0).at(at)
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn neutral_session_without_history_is_calm() {
        let start = now() - Duration::hours(1);
        let messages: Vec<ChatMessage> = [
            "Which products are covered by the act.",
            "Does it apply to banking services.",
            "We sell e-books online.",
            "Thanks, that helps.",
            "What about ticketing machines.",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| said_at(t, start + Duration::minutes(i as i64 * 10)))
        .collect();

        let profile = analyzer().analyze(&[], &messages, now());

        assert_eq!(profile.current_level, 0.0);
        assert_eq!(profile.escalation_risk, 0.0);
        assert!(profile.triggers.is_empty());
        assert_eq!(profile.recommended_approach, RecommendedApproach::Gentle);
    }

    #[test]
    fn history_seeds_the_level() {
        let history = [record(0.5, now())];
        let profile = analyzer().analyze(&history, &[], now());
        assert!((profile.current_level - 0.35).abs() < 1e-9);
        assert_eq!(profile.recommended_approach, RecommendedApproach::Gentle);
    }

    #[test]
    fn rising_history_raises_risk() {
        let history = [
            record(0.6, now()),
            record(0.2, now() - Duration::days(1)),
        ];
        let profile = analyzer().analyze(&history, &[], now());
        let expected = 0.7 * 0.6 + 0.3;
        assert!((profile.escalation_risk - expected).abs() < 1e-9);
    }

    #[test]
    fn single_history_record_has_no_trend() {
        let history = [record(0.6, now())];
        let profile = analyzer().analyze(&history, &[], now());
        assert!((profile.escalation_risk - 0.42).abs() < 1e-9);
    }

    #[test]
    fn angry_messages_score_high() {
        let at = now() - Duration::hours(2);
        let messages = [said_at("THIS IS RIDICULOUS AND USELESS!!!", at)];

        let profile = analyzer().analyze(&[], &messages, now());

        // Message scores 1.0 (capped), so realtime contributes 0.3.
        assert!((profile.current_level - 0.3).abs() < 1e-9);
        assert_eq!(profile.triggers, vec!["ridiculous", "useless"]);
    }

    #[test]
    fn urgency_escalates_and_triggers() {
        let at = now() - Duration::hours(2);
        let messages = [said_at("This is urgent, I am confused", at)];

        let profile = analyzer().analyze(&[], &messages, now());

        // realtime 0.2, combined 0.06, factor 1.3.
        assert!((profile.current_level - 0.078).abs() < 1e-9);
        assert_eq!(profile.triggers, vec!["confused", "urgent"]);
    }

    #[test]
    fn repeated_questions_are_counted() {
        let texts = vec![
            "how do i add alt text to images".to_string(),
            "again how do i add alt text".to_string(),
        ];
        // "how do i", "do i add", "i add alt", "add alt text"
        assert_eq!(repetition_count(&texts), 4);
    }

    fn repeated(text: &str, count: usize) -> Vec<ChatMessage> {
        let start = now() - Duration::days(1);
        (0..count)
            .map(|i| said_at(text, start + Duration::minutes(i as i64)))
            .collect()
    }

    #[test]
    fn repetition_multiplies_the_level() {
        let start = now() - Duration::hours(3);
        let messages = [
            said_at("how do i add alt text to images", start),
            said_at("again how do i add alt text", start + Duration::minutes(10)),
        ];
        let history = [record(0.5, now())];

        let profile = analyzer().analyze(&history, &messages, now());

        // combined 0.35, four shared trigrams give a factor of 1.8.
        assert!((profile.current_level - 0.63).abs() < 1e-9);
        assert!((profile.escalation_risk - 0.88).abs() < 1e-9);
        assert_eq!(profile.recommended_approach, RecommendedApproach::Direct);
        assert_eq!(profile.triggers, vec![REPETITION_TRIGGER]);
    }

    #[test]
    fn long_sessions_escalate() {
        let history = [record(0.5, now())];

        let twenty = analyzer().analyze(&history, &repeated("ok", 20), now());
        assert!((twenty.current_level - 0.35).abs() < 1e-9);
        assert_eq!(twenty.recommended_approach, RecommendedApproach::Gentle);

        let longer = analyzer().analyze(&history, &repeated("ok", 21), now());
        assert!((longer.current_level - 0.42).abs() < 1e-9);
        assert_eq!(longer.recommended_approach, RecommendedApproach::Direct);
    }

    #[test]
    fn escalation_factor_is_capped() {
        let messages = repeated("how do i add alt text to images", 25);
        let history = [record(0.5, now())];

        let profile = analyzer().analyze(&history, &messages, now());

        // Six repeated trigrams and a long session would give 2.64; capped at 2.
        assert!((profile.current_level - 0.7).abs() < 1e-9);
        assert!((profile.escalation_risk - 0.95).abs() < 1e-9);
        assert_eq!(profile.recommended_approach, RecommendedApproach::Direct);
        assert_eq!(profile.triggers, vec![REPETITION_TRIGGER]);
    }

    #[test]
    fn high_frustration_is_business_focused() {
        let messages = repeated("how do i add alt text to images", 25);
        let history = [record(0.9, now())];

        let profile = analyzer().analyze(&history, &messages, now());

        assert_eq!(profile.current_level, 1.0);
        assert_eq!(profile.escalation_risk, 1.0);
        assert_eq!(
            profile.recommended_approach,
            RecommendedApproach::BusinessFocused
        );
    }

    #[test]
    fn burst_of_messages_raises_risk() {
        let messages: Vec<ChatMessage> = (0..4)
            .map(|i| said_at("ok", now() - Duration::seconds(30 * i)))
            .collect();
        let profile = analyzer().analyze(&[], &messages, now());
        assert!((profile.escalation_risk - 0.2).abs() < 1e-9);
    }

    #[test]
    fn technical_wording_suggests_technical_approach() {
        let messages = [said_at("Which ARIA roles do we need", now())];
        let profile = analyzer().analyze(&[], &messages, now());
        assert_eq!(profile.recommended_approach, RecommendedApproach::Technical);
    }

    #[test]
    fn triggers_are_capped() {
        let text = "confused unclear not sure frustrated annoying difficult \
                    complicated ridiculous useless fed up terrible";
        let messages = [said_at(text, now() - Duration::hours(1))];
        let profile = analyzer().analyze(&[], &messages, now());
        assert_eq!(profile.triggers.len(), MAX_TRIGGERS);
        assert!(profile.current_level <= 1.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let messages = [said_at("Still not working, unacceptable!", now())];
        let history = [record(0.4, now())];
        assert_eq!(
            analyzer().analyze(&history, &messages, now()),
            analyzer().analyze(&history, &messages, now())
        );
    }
}
