//! LLM Call primitive.
//!
//! Single-shot inference whose output must parse as strict JSON into a
//! caller-chosen type. The result is always a tagged `Result`: either a fully
//! typed value or the reason it could not be produced.

use crate::backend::{CompletionBackend, CompletionRequest, TokenUsage};
use crate::error::LlmError;
use crate::gate::ModelGate;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Instant;
use ulid::Ulid;

/// Unique identifier for an LLM invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LlmInvocationId(Ulid);

impl LlmInvocationId {
    /// Creates a new invocation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LlmInvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LlmInvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "llm_{}", self.0)
    }
}

/// The typed result of an LLM Call.
#[derive(Debug, Clone)]
pub struct LlmCallResult<T> {
    /// Unique identifier for this invocation.
    pub id: LlmInvocationId,
    /// The parsed output.
    pub output: T,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// When the call completed.
    pub timestamp: DateTime<Utc>,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// An LLM Call executor.
///
/// Builder for a single structured call against a [`CompletionBackend`].
#[derive(Debug, Clone)]
pub struct LlmCall {
    prompt: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    context: Option<JsonValue>,
}

impl LlmCall {
    /// Creates a new LLM Call with the given prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            context: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Adds context data to be included in the prompt.
    #[must_use]
    pub fn with_context(mut self, context: JsonValue) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds a completion request from this configuration.
    #[must_use]
    pub fn build_request(&self) -> CompletionRequest {
        let prompt = match &self.context {
            Some(context) => format!("Context:\n{context}\n\n{}", self.prompt),
            None => self.prompt.clone(),
        };

        let mut request = CompletionRequest::new(prompt).expecting_json();

        if let Some(ref system) = self.system_prompt {
            request = request.with_system(system.clone());
        }

        if let Some(temp) = self.temperature {
            request = request.with_temperature(temp);
        }

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }

    /// Executes the call through the gate and parses the answer as `T`.
    ///
    /// # Errors
    ///
    /// Returns the transport error, a timeout, or
    /// [`LlmError::ResponseParseFailed`] if the text is not strict JSON
    /// matching `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        gate: &ModelGate,
        backend: &dyn CompletionBackend,
    ) -> Result<LlmCallResult<T>, LlmError> {
        let id = LlmInvocationId::new();
        let request = self.build_request();
        let started = Instant::now();

        let response = gate.complete(backend, &request).await?;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(
            invocation_id = %id,
            model = %response.model,
            latency_ms,
            "completion received"
        );

        let output = parse_structured(&response.content)?;

        Ok(LlmCallResult {
            id,
            output,
            usage: response.usage,
            model: response.model,
            timestamp: Utc::now(),
            latency_ms,
        })
    }
}

/// Parses raw model text as a strict JSON document of type `T`.
///
/// Surrounding whitespace is ignored; anything else (prose, code fences,
/// trailing text) is a parse failure.
///
/// # Errors
///
/// Returns [`LlmError::ResponseParseFailed`] on any deserialization error.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    serde_json::from_str(raw.trim()).map_err(|e| LlmError::ResponseParseFailed {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CompletionResponse;
    use crate::gate::ModelGateConfig;
    use async_trait::async_trait;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Verdict {
        label: String,
        score: f64,
    }

    struct FixedBackend(&'static str);

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse::text(self.0, "fixed-model"))
        }

        fn model(&self) -> &str {
            "fixed-model"
        }
    }

    #[test]
    fn llm_call_builder() {
        let call = LlmCall::new("Classify this user")
            .with_system_prompt("You are a helpful classifier.")
            .with_temperature(0.3)
            .with_context(serde_json::json!({"facts": ["runs an online shop"]}));

        let request = call.build_request();
        assert!(request.prompt.contains("Classify this user"));
        assert!(request.prompt.contains("online shop"));
        assert_eq!(
            request.system,
            Some("You are a helpful classifier.".to_string())
        );
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.json_output);
    }

    #[test]
    fn parse_structured_accepts_padded_json() {
        let verdict: Verdict =
            parse_structured("  {\"label\": \"ok\", \"score\": 0.5}\n").expect("parse");
        assert_eq!(verdict.label, "ok");
    }

    #[test]
    fn parse_structured_rejects_prose() {
        let result: Result<Verdict, _> =
            parse_structured("Sure! {\"label\": \"ok\", \"score\": 0.5}");
        assert!(result.unwrap_err().is_parse_failure());
    }

    #[test]
    fn parse_structured_rejects_fenced_json() {
        let result: Result<Verdict, _> =
            parse_structured("```json\n{\"label\": \"ok\", \"score\": 0.5}\n```");
        assert!(result.unwrap_err().is_parse_failure());
    }

    #[test]
    fn invocation_id_display() {
        let id = LlmInvocationId::new();
        assert!(id.to_string().starts_with("llm_"));
    }

    #[tokio::test]
    async fn execute_returns_typed_output() {
        let gate = ModelGate::new(&ModelGateConfig::default());
        let backend = FixedBackend("{\"label\": \"business\", \"score\": 0.9}");

        let result = LlmCall::new("x")
            .execute::<Verdict>(&gate, &backend)
            .await
            .expect("call succeeds");

        assert_eq!(result.output.label, "business");
        assert_eq!(result.model, "fixed-model");
    }

    #[tokio::test]
    async fn execute_reports_parse_failure() {
        let gate = ModelGate::new(&ModelGateConfig::default());
        let backend = FixedBackend("not json at all");

        let result = LlmCall::new("x").execute::<Verdict>(&gate, &backend).await;

        assert!(matches!(result, Err(LlmError::ResponseParseFailed { .. })));
    }
}
