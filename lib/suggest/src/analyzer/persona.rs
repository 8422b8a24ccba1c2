use crate::profile::PersonaProfile;
use eaa_copilot_ai::{CompletionBackend, LlmCall, ModelGate};
use eaa_copilot_signals::{ChatMessage, UserFact};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const SYSTEM_PROMPT: &str = "You classify users of a European Accessibility Act \
compliance assistant. Answer with a single JSON object and nothing else.";

const PERSONA_PROMPT: &str = "Classify the user described in the context. Respond with \
exactly these fields: \"type\" (business_owner, technical_implementer, compliance_manager, \
newcomer or frustrated_user), \"confidence\" (0 to 1), \"communicationStyle\" (balanced, \
direct, detailed, technical or urgent), \"experienceLevel\" (beginner, intermediate, \
advanced or expert) and \"traits\" (a short list of strings).";

/// A persona profile and the model that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaAnalysis {
    /// The profile, possibly the fallback.
    pub profile: PersonaProfile,
    /// Model name, absent when the fallback was used.
    pub model: Option<String>,
}

impl PersonaAnalysis {
    fn fallback() -> Self {
        Self {
            profile: PersonaProfile::fallback(),
            model: None,
        }
    }
}

/// Model-backed persona classification.
#[derive(Clone)]
pub struct PersonaAnalyzer {
    backend: Arc<dyn CompletionBackend>,
    gate: ModelGate,
    message_window: usize,
    temperature: f32,
}

impl PersonaAnalyzer {
    /// Creates an analyzer that sends the last `message_window` messages.
    #[must_use]
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        gate: ModelGate,
        message_window: usize,
        temperature: f32,
    ) -> Self {
        Self {
            backend,
            gate,
            message_window,
            temperature,
        }
    }

    /// Classifies the user. Never fails; any model problem yields the
    /// fallback profile.
    #[instrument(skip_all, fields(facts = facts.len(), messages = messages.len()))]
    pub async fn analyze(
        &self,
        facts: &[UserFact],
        messages: &[ChatMessage],
        current_question: &str,
    ) -> PersonaAnalysis {
        let question = current_question.trim();
        if facts.is_empty() && messages.is_empty() && question.is_empty() {
            debug!("no signals to classify, using fallback persona");
            return PersonaAnalysis::fallback();
        }

        let recent = &messages[messages.len().saturating_sub(self.message_window)..];
        let call = LlmCall::new(PERSONA_PROMPT)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_context(json!({
                "facts": facts
                    .iter()
                    .map(|f| json!({"type": f.fact_type, "value": f.fact_value}))
                    .collect::<Vec<_>>(),
                "recentMessages": recent
                    .iter()
                    .map(|m| json!({"role": m.role, "content": m.content}))
                    .collect::<Vec<_>>(),
                "currentQuestion": question,
            }));

        match call
            .execute::<PersonaProfile>(&self.gate, self.backend.as_ref())
            .await
        {
            Ok(result) => {
                debug!(
                    invocation_id = %result.id,
                    persona = %result.output.persona_type,
                    latency_ms = result.latency_ms,
                    tokens = result.usage.total(),
                    "persona classified"
                );
                PersonaAnalysis {
                    profile: result.output.bounded(),
                    model: Some(result.model),
                }
            }
            Err(e) => {
                warn!(error = %e, "persona analysis failed, using fallback persona");
                PersonaAnalysis::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{CommunicationStyle, ExperienceLevel, PersonaType};
    use async_trait::async_trait;
    use eaa_copilot_ai::{CompletionRequest, CompletionResponse, LlmError, ModelGateConfig};
    use eaa_copilot_core::{SessionId, UserId};
    use eaa_copilot_signals::FactType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Script {
        Answer(&'static str),
        Fail,
        Hang,
    }

    struct ScriptedBackend {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Answer(text) => Ok(CompletionResponse::text(text, "test-model")),
                Script::Fail => Err(LlmError::RequestFailed {
                    reason: "502 bad gateway".to_string(),
                }),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(CompletionResponse::text("{}", "test-model"))
                }
            }
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn analyzer(backend: Arc<ScriptedBackend>) -> PersonaAnalyzer {
        let gate = ModelGate::new(&ModelGateConfig {
            max_concurrent_calls: 3,
            call_timeout_ms: 50,
        });
        PersonaAnalyzer::new(backend, gate, 10, 0.2)
    }

    fn facts() -> Vec<UserFact> {
        vec![UserFact::new(
            UserId::new("u1").expect("valid"),
            FactType::Role,
            "CTO",
            0.9,
        )]
    }

    #[tokio::test]
    async fn parses_model_profile() {
        let backend = ScriptedBackend::new(Script::Answer(
            r#"{"type":"technical_implementer","confidence":1.4,"communicationStyle":"technical","experienceLevel":"advanced","traits":["hands-on"]}"#,
        ));
        let analysis = analyzer(backend).analyze(&facts(), &[], "").await;

        assert_eq!(
            analysis.profile.persona_type,
            PersonaType::TechnicalImplementer
        );
        assert_eq!(analysis.profile.confidence, 1.0);
        assert_eq!(
            analysis.profile.communication_style,
            CommunicationStyle::Technical
        );
        assert_eq!(analysis.model.as_deref(), Some("test-model"));
    }

    #[tokio::test]
    async fn model_error_yields_fallback() {
        let backend = ScriptedBackend::new(Script::Fail);
        let analysis = analyzer(backend).analyze(&facts(), &[], "Help?").await;

        assert_eq!(analysis.profile.persona_type, PersonaType::Newcomer);
        assert_eq!(analysis.profile.confidence, 0.3);
        assert_eq!(
            analysis.profile.experience_level,
            ExperienceLevel::Beginner
        );
        assert_eq!(analysis.profile.traits, vec!["requires analysis"]);
        assert!(analysis.model.is_none());
    }

    #[tokio::test]
    async fn malformed_json_yields_fallback() {
        let backend = ScriptedBackend::new(Script::Answer("I think they are a business owner."));
        let analysis = analyzer(backend).analyze(&facts(), &[], "").await;
        assert_eq!(analysis.profile, PersonaProfile::fallback());
    }

    #[tokio::test]
    async fn extra_fields_yield_fallback() {
        let backend = ScriptedBackend::new(Script::Answer(
            r#"{"type":"newcomer","confidence":0.9,"communicationStyle":"direct","experienceLevel":"beginner","traits":[],"notes":"x"}"#,
        ));
        let analysis = analyzer(backend).analyze(&facts(), &[], "").await;
        assert_eq!(analysis.profile, PersonaProfile::fallback());
    }

    #[tokio::test]
    async fn timeout_yields_fallback() {
        let backend = ScriptedBackend::new(Script::Hang);
        let analysis = analyzer(backend).analyze(&facts(), &[], "").await;
        assert_eq!(analysis.profile, PersonaProfile::fallback());
    }

    #[tokio::test]
    async fn empty_input_skips_model() {
        let backend = ScriptedBackend::new(Script::Fail);
        let analysis = analyzer(backend.clone()).analyze(&[], &[], "  ").await;

        assert_eq!(analysis.profile, PersonaProfile::fallback());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn messages_alone_trigger_model_call() {
        let backend = ScriptedBackend::new(Script::Fail);
        let session = SessionId::new("s1").expect("valid");
        let messages = vec![ChatMessage::user(session, "Hi")];
        analyzer(backend.clone())
            .analyze(&[], &messages, "")
            .await;

        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
