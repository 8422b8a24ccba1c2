//! Request and response wire types.

use crate::header::GENERIC_HEADER;
use crate::optimizer::RankedSuggestion;
use crate::profile::RevolutionaryContext;
use eaa_copilot_core::{SessionId, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Generic questions used when the pipeline cannot run.
pub const FALLBACK_QUESTIONS: [&str; 3] = [
    "What does the European Accessibility Act require from my business?",
    "Which deadlines apply to my products and services?",
    "How can I check whether my website is accessible?",
];

/// A request for follow-up suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub current_question: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
}

impl SuggestionRequest {
    /// Creates a request for a user and session.
    #[must_use]
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            session_id: Some(session_id.into()),
            current_question: None,
            metadata: None,
        }
    }

    /// Sets the question that triggered the request.
    #[must_use]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.current_question = Some(question.into());
        self
    }

    /// Attaches caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the question, or an empty string.
    #[must_use]
    pub fn question(&self) -> &str {
        self.current_question.as_deref().unwrap_or_default()
    }

    /// Checks the required identifiers.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first missing or blank field.
    pub fn validate(&self) -> Result<(UserId, SessionId), ValidationError> {
        let user_id = required(self.user_id.as_deref(), "userId")?;
        let session_id = required(self.session_id.as_deref(), "sessionId")?;
        let user_id = UserId::new(user_id).map_err(|e| ValidationError::from_parse("userId", &e))?;
        let session_id =
            SessionId::new(session_id).map_err(|e| ValidationError::from_parse("sessionId", &e))?;
        Ok((user_id, session_id))
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField { field }),
        Some(v) if v.trim().is_empty() => Err(ValidationError::EmptyField { field }),
        Some(v) => Ok(v),
    }
}

/// Which path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratedBy {
    /// The full pipeline.
    #[serde(rename = "revolutionary_ai_system")]
    Pipeline,
    /// The fallback after an internal failure.
    #[serde(rename = "intelligent_fallback")]
    Fallback,
}

/// One entry of the analytics breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionBreakdown {
    pub text: String,
    pub category: String,
    pub composite_score: f64,
    pub reasoning: String,
    pub expected_outcome: String,
}

impl From<&RankedSuggestion> for SuggestionBreakdown {
    fn from(ranked: &RankedSuggestion) -> Self {
        Self {
            text: ranked.candidate.text.clone(),
            category: ranked.candidate.category.to_string(),
            composite_score: ranked.composite_score,
            reasoning: ranked.candidate.reasoning.clone(),
            expected_outcome: ranked.candidate.expected_outcome.clone(),
        }
    }
}

/// Analytics summary returned with the suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAnalytics {
    pub user_persona: String,
    pub business_maturity: String,
    pub conversation_stage: String,
    pub opportunity_score: f64,
    pub suggestions_breakdown: Vec<SuggestionBreakdown>,
}

/// The response body. Success and fallback share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(rename = "clarificationQuestions")]
    pub clarification_questions: Vec<String>,
    #[serde(rename = "infoTemplates")]
    pub info_templates: Vec<JsonValue>,
    pub suggestions_header: String,
    pub reasoning: String,
    pub analytics: ResponseAnalytics,
    pub generated_by: GeneratedBy,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_used: Option<String>,
}

impl SuggestionResponse {
    /// Builds the pipeline response.
    #[must_use]
    pub fn from_pipeline(
        context: &RevolutionaryContext,
        ranked: &[RankedSuggestion],
        header: String,
        model_used: Option<String>,
    ) -> Self {
        Self {
            clarification_questions: ranked.iter().map(|r| r.candidate.text.clone()).collect(),
            info_templates: Vec::new(),
            suggestions_header: header,
            reasoning: reasoning(context),
            analytics: ResponseAnalytics {
                user_persona: context.persona.persona_type.to_string(),
                business_maturity: context.business_maturity.level.to_string(),
                conversation_stage: context.stage.stage.to_string(),
                opportunity_score: context.opportunity_score,
                suggestions_breakdown: ranked.iter().map(SuggestionBreakdown::from).collect(),
            },
            generated_by: GeneratedBy::Pipeline,
            model_used,
        }
    }

    /// Builds the fallback response, leaving out any generic question equal
    /// to the current one.
    #[must_use]
    pub fn fallback(current_question: &str) -> Self {
        let question = current_question.trim().to_lowercase();
        Self {
            clarification_questions: FALLBACK_QUESTIONS
                .iter()
                .filter(|q| q.to_lowercase() != question)
                .map(|q| (*q).to_string())
                .collect(),
            info_templates: Vec::new(),
            suggestions_header: GENERIC_HEADER.to_string(),
            reasoning: "Generic suggestions; the personalized analysis was unavailable."
                .to_string(),
            analytics: ResponseAnalytics {
                user_persona: "unknown".to_string(),
                business_maturity: "unknown".to_string(),
                conversation_stage: "unknown".to_string(),
                opportunity_score: 0.0,
                suggestions_breakdown: Vec::new(),
            },
            generated_by: GeneratedBy::Fallback,
            model_used: None,
        }
    }
}

fn reasoning(context: &RevolutionaryContext) -> String {
    format!(
        "{} persona ({:.2} confidence), {} maturity, {} stage, frustration {:.2}, opportunity {:.2}",
        context.persona.persona_type,
        context.persona.confidence,
        context.business_maturity.level,
        context.stage.stage,
        context.frustration.current_level,
        context.opportunity_score,
    )
}
