//! Language-model primitives for eaa-copilot.
//!
//! This crate provides:
//!
//! - **Backend**: the text-completion endpoint contract
//! - **Gate**: bounded concurrency and per-call timeouts for model calls
//! - **LLM Call**: single-shot inference parsed into a typed result
//!
//! The endpoint itself is an external collaborator; this crate only defines
//! how the engine talks to it.

pub mod backend;
pub mod error;
pub mod gate;
pub mod llm_call;

pub use backend::{CompletionBackend, CompletionRequest, CompletionResponse, TokenUsage};
pub use error::LlmError;
pub use gate::{ModelGate, ModelGateConfig};
pub use llm_call::{LlmCall, LlmCallResult, LlmInvocationId, parse_structured};
