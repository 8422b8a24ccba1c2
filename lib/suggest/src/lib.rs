//! Adaptive suggestion ranking for the eaa-copilot assistant.
//!
//! This crate provides:
//!
//! - **Analyzers**: persona, business maturity, frustration, conversation
//!   stage and behavior patterns derived from stored signals
//! - **Needs Predictor**: rule-based prediction of what the user needs next
//! - **Opportunity Scorer**: how promising the moment is for guidance
//! - **Generator and Optimizer**: candidate follow-up questions, ranked,
//!   deduplicated and diversified
//! - **Header Generator**: the wording shown above the suggestions
//! - **Analytics Recorder**: fire-and-forget persistence of each computed
//!   context
//! - **Suggestion Engine**: the pipeline tying these together, with a
//!   generic fallback when anything past validation fails
//!
//! # Example
//!
//! ```ignore
//! let engine = SuggestionEngine::new(&EngineConfig::from_env()?, store, backend, sink);
//! let response = engine
//!     .generate(&SuggestionRequest::new("u1", "s1").with_question("What is the EAA?"))
//!     .await?;
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod generator;
pub mod header;
pub mod needs;
pub mod opportunity;
pub mod optimizer;
pub mod orchestrator;
pub mod profile;
pub mod recorder;
pub mod response;

pub use config::{EngineConfig, HeaderConfig, KeywordTables, LimitsConfig, ModelConfig};
pub use error::EngineError;
pub use generator::{SuggestionCandidate, SuggestionCategory, SuggestionGenerator};
pub use header::{GENERIC_HEADER, HeaderGenerator};
pub use needs::NeedsPredictor;
pub use opportunity::OpportunityScorer;
pub use optimizer::{RankedSuggestion, SuggestionOptimizer};
pub use orchestrator::SuggestionEngine;
pub use profile::{
    BehaviorPattern, BusinessMaturityProfile, ConversationStage, FrustrationProfile,
    PersonaProfile, PredictedNeed, RevolutionaryContext,
};
pub use recorder::AnalyticsRecorder;
pub use response::{
    FALLBACK_QUESTIONS, GeneratedBy, ResponseAnalytics, SuggestionBreakdown, SuggestionRequest,
    SuggestionResponse,
};
