//! Engine configuration.
//!
//! Strongly-typed settings loaded via the `config` crate from environment
//! variables prefixed with `EAA_COPILOT`, nested with `__`:
//!
//! ```text
//! EAA_COPILOT__MODEL__MAX_CONCURRENT_CALLS=3
//! EAA_COPILOT__SIGNALS__READ_TIMEOUT_MS=2000
//! EAA_COPILOT__LIMITS__MAX_SUGGESTIONS=3
//! ```
//!
//! Every section has defaults, so an empty environment yields a working
//! engine.

use eaa_copilot_ai::ModelGateConfig;
use eaa_copilot_signals::SignalRepositoryConfig;
use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "EAA_COPILOT";

/// Engine configuration composed from library configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Model call settings.
    pub model: ModelConfig,
    /// Signal store settings.
    pub signals: SignalRepositoryConfig,
    /// Candidate and window limits.
    pub limits: LimitsConfig,
    /// Header generation settings.
    pub header: HeaderConfig,
    /// Keyword tables used by the analyzers.
    pub keywords: KeywordTables,
}

impl EngineConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

/// Model call settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Maximum number of model calls in flight at once.
    pub max_concurrent_calls: usize,
    /// Timeout for a single call, in milliseconds.
    pub call_timeout_ms: u64,
    /// Sampling temperature for profile requests.
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let gate = ModelGateConfig::default();
        Self {
            max_concurrent_calls: gate.max_concurrent_calls,
            call_timeout_ms: gate.call_timeout_ms,
            temperature: 0.2,
        }
    }
}

impl ModelConfig {
    /// Returns the gate limits.
    #[must_use]
    pub fn gate(&self) -> ModelGateConfig {
        ModelGateConfig {
            max_concurrent_calls: self.max_concurrent_calls,
            call_timeout_ms: self.call_timeout_ms,
        }
    }
}

/// Candidate and window limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum candidates the generator emits.
    pub max_candidates: usize,
    /// How many scored candidates enter the diversity pass.
    pub optimizer_pool: usize,
    /// Maximum suggestions in a response; values above 3 are capped.
    pub max_suggestions: usize,
    /// Recent messages sent to the persona model.
    pub persona_message_window: usize,
    /// Recent user messages scored for real-time frustration.
    pub frustration_window: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_candidates: 8,
            optimizer_pool: 6,
            max_suggestions: 3,
            persona_message_window: 10,
            frustration_window: 5,
        }
    }
}

/// Header generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Minimum persona confidence for persona-specific wording.
    pub persona_confidence_threshold: f64,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            persona_confidence_threshold: 0.5,
        }
    }
}

/// A weighted phrase list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedPhrases {
    /// Tier name, used in logs and triggers.
    pub name: String,
    /// Weight applied per matched phrase.
    pub weight: f64,
    /// Lowercase phrases.
    pub phrases: Vec<String>,
}

impl WeightedPhrases {
    fn new(name: &str, weight: f64, phrases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            phrases: owned(phrases),
        }
    }
}

/// Keyword tallies for the four problem-solving styles.
///
/// Field order is the tie-break order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProblemSolvingKeywords {
    pub systematic: Vec<String>,
    pub urgent: Vec<String>,
    pub research: Vec<String>,
    pub practical: Vec<String>,
}

impl Default for ProblemSolvingKeywords {
    fn default() -> Self {
        Self {
            systematic: owned(&["step by step", "plan", "process", "first", "structured"]),
            urgent: owned(&["quick", "asap", "urgent", "fast", "immediately"]),
            research: owned(&["why", "research", "compare", "details", "background"]),
            practical: owned(&["example", "tool", "template", "practical", "hands-on"]),
        }
    }
}

/// Every keyword list the analyzers match against.
///
/// All phrases are lowercase and matched as substrings of lowercased text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeywordTables {
    /// Frustration tiers, mildest first.
    pub frustration_tiers: Vec<WeightedPhrases>,
    /// Urgency phrases.
    pub urgency: Vec<String>,
    /// Near-term timeline phrases.
    pub near_term: Vec<String>,
    /// Technical vocabulary.
    pub technical_terms: Vec<String>,
    /// Phrases implying a large organization.
    pub enterprise: Vec<String>,
    /// Phrases about audits.
    pub audit: Vec<String>,
    /// Phrases about websites, shops and apps.
    pub digital_presence: Vec<String>,
    /// Phrases showing WCAG familiarity.
    pub wcag: Vec<String>,
    /// Troubleshooting stage phrases.
    pub troubleshooting: Vec<String>,
    /// Implementation stage phrases.
    pub implementation: Vec<String>,
    /// Deep-dive stage phrases.
    pub deep_dive: Vec<String>,
    /// Complexity tiers for learning progression, basic first.
    pub complexity: Vec<WeightedPhrases>,
    /// Problem-solving style phrases.
    pub problem_solving: ProblemSolvingKeywords,
}

impl Default for KeywordTables {
    fn default() -> Self {
        Self {
            frustration_tiers: vec![
                WeightedPhrases::new(
                    "mild",
                    0.2,
                    &["confused", "unclear", "not sure", "don't understand"],
                ),
                WeightedPhrases::new(
                    "moderate",
                    0.4,
                    &["frustrated", "annoying", "difficult", "complicated"],
                ),
                WeightedPhrases::new(
                    "high",
                    0.7,
                    &["ridiculous", "useless", "waste of time", "fed up"],
                ),
                WeightedPhrases::new(
                    "critical",
                    1.0,
                    &["unacceptable", "terrible", "give up", "cancel"],
                ),
            ],
            urgency: owned(&["urgent", "asap", "immediately", "deadline", "right now"]),
            near_term: owned(&[
                "soon",
                "this year",
                "next month",
                "next quarter",
                "coming months",
            ]),
            technical_terms: owned(&[
                "wcag",
                "aria",
                "html",
                "css",
                "javascript",
                "api",
                "screen reader",
                "contrast",
                "alt text",
                "semantic",
            ]),
            enterprise: owned(&[
                "enterprise",
                "corporation",
                "corporate",
                "multinational",
                "large company",
            ]),
            audit: owned(&["audit"]),
            digital_presence: owned(&["website", "webshop", "online shop", "mobile app"]),
            wcag: owned(&["wcag", "en 301 549", "aria", "screen reader", "contrast"]),
            troubleshooting: owned(&["problem", "error", "not working"]),
            implementation: owned(&["implement", "how to"]),
            deep_dive: owned(&["audit", "check", "test"]),
            complexity: vec![
                WeightedPhrases::new("basic", 1.0, &["what is", "basics", "explain", "mean"]),
                WeightedPhrases::new(
                    "intermediate",
                    2.0,
                    &["requirements", "guidelines", "checklist", "deadline"],
                ),
                WeightedPhrases::new(
                    "advanced",
                    3.0,
                    &["wcag", "aria", "implementation", "assistive"],
                ),
                WeightedPhrases::new(
                    "expert",
                    4.0,
                    &["en 301 549", "conformance", "vpat", "harmonised standard"],
                ),
            ],
            problem_solving: ProblemSolvingKeywords::default(),
        }
    }
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| (*p).to_string()).collect()
}

/// Returns true if `text` contains any of `phrases`.
pub(crate) fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| text.contains(p.as_str()))
}

/// Returns the phrases contained in `text`, in table order.
pub(crate) fn matched<'a>(text: &str, phrases: &'a [String]) -> Vec<&'a str> {
    phrases
        .iter()
        .filter(|p| text.contains(p.as_str()))
        .map(String::as_str)
        .collect()
}
