//! The suggestion pipeline.
//!
//! Validates the request, loads the signal snapshot, runs the analyzers,
//! predicts needs, scores the opportunity, generates and ranks candidates,
//! picks the header and hands the context to the analytics recorder.
//! Anything that goes wrong after validation produces the fallback response
//! instead of an error.

use crate::analyzer::{
    BehaviorPatternAnalyzer, BusinessMaturityAnalyzer, ConversationStageAnalyzer,
    FrustrationProfileAnalyzer, PersonaAnalyzer,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::generator::SuggestionGenerator;
use crate::header::HeaderGenerator;
use crate::needs::NeedsPredictor;
use crate::opportunity::OpportunityScorer;
use crate::optimizer::{RankedSuggestion, SuggestionOptimizer};
use crate::profile::RevolutionaryContext;
use crate::recorder::AnalyticsRecorder;
use crate::response::{SuggestionRequest, SuggestionResponse};
use chrono::Utc;
use eaa_copilot_ai::{CompletionBackend, ModelGate};
use eaa_copilot_core::{SessionId, UserId};
use eaa_copilot_signals::{AnalyticsSink, SignalRepository, SignalStore};
use futures::FutureExt;
use rootcause::prelude::Report;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

/// Hard cap on suggestions per response, whatever the configuration says.
const MAX_SUGGESTIONS: usize = 3;

/// Output of a successful pipeline run.
struct PipelineOutput {
    context: RevolutionaryContext,
    ranked: Vec<RankedSuggestion>,
    header: String,
    model_used: Option<String>,
}

/// The adaptive suggestion-ranking engine.
#[derive(Clone)]
pub struct SuggestionEngine {
    repository: SignalRepository,
    persona: PersonaAnalyzer,
    maturity: BusinessMaturityAnalyzer,
    frustration: FrustrationProfileAnalyzer,
    stage: ConversationStageAnalyzer,
    behavior: BehaviorPatternAnalyzer,
    needs: NeedsPredictor,
    opportunity: OpportunityScorer,
    generator: SuggestionGenerator,
    optimizer: SuggestionOptimizer,
    header: HeaderGenerator,
    recorder: AnalyticsRecorder,
}

impl SuggestionEngine {
    /// Wires an engine from its configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn SignalStore>,
        backend: Arc<dyn CompletionBackend>,
        sink: Arc<dyn AnalyticsSink>,
    ) -> Self {
        let keywords = Arc::new(config.keywords.clone());
        let limits = &config.limits;
        let gate = ModelGate::new(&config.model.gate());

        Self {
            repository: SignalRepository::new(store, &config.signals),
            persona: PersonaAnalyzer::new(
                backend,
                gate,
                limits.persona_message_window,
                config.model.temperature,
            ),
            maturity: BusinessMaturityAnalyzer::new(Arc::clone(&keywords)),
            frustration: FrustrationProfileAnalyzer::new(
                Arc::clone(&keywords),
                limits.frustration_window,
            ),
            stage: ConversationStageAnalyzer::new(Arc::clone(&keywords)),
            behavior: BehaviorPatternAnalyzer::new(keywords),
            needs: NeedsPredictor::new(),
            opportunity: OpportunityScorer::new(),
            generator: SuggestionGenerator::new(limits.max_candidates),
            optimizer: SuggestionOptimizer::new(
                limits.optimizer_pool,
                limits.max_suggestions.min(MAX_SUGGESTIONS),
            ),
            header: HeaderGenerator::new(config.header.persona_confidence_threshold),
            recorder: AnalyticsRecorder::new(sink),
        }
    }

    /// Generates suggestions for a request.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] if `userId` or `sessionId` is
    /// missing or blank. Internal failures never surface; they yield the
    /// fallback response.
    pub async fn generate(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, Report<EngineError>> {
        self.generate_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Generates suggestions, abandoning the work when `cancel` fires.
    ///
    /// Cancellation drops any in-flight model call and stops the analytics
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] for a bad request and
    /// [`EngineError::Cancelled`] if the token fires first.
    pub async fn generate_with_cancel(
        &self,
        request: &SuggestionRequest,
        cancel: CancellationToken,
    ) -> Result<SuggestionResponse, Report<EngineError>> {
        let (response, _analytics) = self.respond(request, cancel).await?;
        Ok(response)
    }

    /// Runs one request and returns the analytics task, if one was started.
    #[instrument(
        skip_all,
        fields(user_id = tracing::field::Empty, session_id = tracing::field::Empty)
    )]
    async fn respond(
        &self,
        request: &SuggestionRequest,
        cancel: CancellationToken,
    ) -> Result<(SuggestionResponse, Option<JoinHandle<()>>), EngineError> {
        let (user_id, session_id) = request.validate()?;
        tracing::Span::current()
            .record("user_id", tracing::field::display(&user_id))
            .record("session_id", tracing::field::display(&session_id));

        let question = request.question();
        let pipeline = AssertUnwindSafe(self.run_pipeline(&user_id, &session_id, question));

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(EngineError::Cancelled),
            outcome = pipeline.catch_unwind() => outcome,
        };

        match outcome {
            Ok(Ok(output)) => {
                let record = AnalyticsRecorder::record_for(
                    &user_id,
                    &session_id,
                    &output.context,
                    output.ranked.len(),
                    request.metadata.clone().unwrap_or_default(),
                );
                let analytics = self.recorder.submit(record, cancel);
                let response = SuggestionResponse::from_pipeline(
                    &output.context,
                    &output.ranked,
                    output.header,
                    output.model_used,
                );
                Ok((response, Some(analytics)))
            }
            Ok(Err(e)) => {
                error!(error = %e, "suggestion pipeline failed, serving fallback");
                Ok((SuggestionResponse::fallback(question), None))
            }
            Err(panic) => {
                error!(
                    panic = panic_message(panic.as_ref()),
                    "suggestion pipeline panicked, serving fallback"
                );
                Ok((SuggestionResponse::fallback(question), None))
            }
        }
    }

    async fn run_pipeline(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        question: &str,
    ) -> Result<PipelineOutput, EngineError> {
        let snapshot = self.repository.fetch_snapshot(user_id, session_id).await;

        let persona = self
            .persona
            .analyze(&snapshot.facts, &snapshot.messages, question)
            .await;
        let business_maturity = self.maturity.analyze(&snapshot.facts, &snapshot.messages);
        let frustration = self.frustration.analyze(
            &snapshot.frustration_history,
            &snapshot.messages,
            Utc::now(),
        );
        let stage = self.stage.analyze(&snapshot.messages);
        let behavior_patterns = self.behavior.analyze(&snapshot.messages, &snapshot.sessions);

        let predicted_needs = self
            .needs
            .predict(&persona.profile, &business_maturity, &stage);
        let opportunity_score = self
            .opportunity
            .score(&business_maturity, &frustration, &stage);

        let context = RevolutionaryContext {
            persona: persona.profile,
            business_maturity,
            frustration,
            stage,
            behavior_patterns,
            predicted_needs,
            opportunity_score,
        };
        if let Some(field) = context.out_of_bounds() {
            return Err(EngineError::Orchestration {
                stage: "context",
                reason: format!("{field} is outside [0, 1]"),
            });
        }
        debug!(
            persona = %context.persona.persona_type,
            maturity = %context.business_maturity.level,
            stage = %context.stage.stage,
            frustration = context.frustration.current_level,
            opportunity = context.opportunity_score,
            needs = context.predicted_needs.len(),
            patterns = context.behavior_patterns.len(),
            "context derived"
        );

        let candidates = self.generator.generate(&context);
        let ranked = self.optimizer.optimize(candidates, &context, question);
        if ranked.iter().any(|r| !r.composite_score.is_finite()) {
            return Err(EngineError::Orchestration {
                stage: "optimize",
                reason: "composite score is not finite".to_string(),
            });
        }
        let header = self.header.generate(&context);
        debug!(suggestions = ranked.len(), header = %header, "suggestions ranked");

        Ok(PipelineOutput {
            context,
            ranked,
            header,
            model_used: persona.model,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
