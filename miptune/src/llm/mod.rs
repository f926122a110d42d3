//! LLM client abstraction for the tuning loop.
//!
//! The game loop depends on a callable that takes the conversation so far and
//! returns assistant text; this module defines the trait, the real
//! OpenAI-compatible implementation, and a scripted mock for tests.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatClient;

use async_trait::async_trait;

use crate::error::TunerError;
use crate::message::Message;

/// Default model served by the inference endpoint.
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Configuration for the chat model.
///
/// Quantization and device placement belong to the serving endpoint, not this
/// client; only request-level knobs live here.
#[derive(Clone, Debug)]
pub struct ModelConfig {
    /// Model id passed in the chat completion request.
    pub model: String,
    /// Sampling temperature; 0.0 for deterministic decisions.
    pub temperature: f32,
    /// Cap on generated tokens per decision.
    pub max_tokens: u32,
    /// Base URL of an OpenAI-compatible server (e.g. a local vLLM serving
    /// Qwen). `None` uses `OPENAI_BASE_URL`/default from the client library.
    pub api_base: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 384,
            api_base: None,
        }
    }
}

/// LLM client: given the conversation, returns the assistant reply text.
///
/// The game loop calls this once per decision and once for the final summary.
/// Implementations: [`MockLlm`] (scripted replies), [`ChatClient`] (real API).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat turn: read messages, return assistant text.
    async fn chat(&self, messages: &[Message]) -> Result<String, TunerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_config_default_matches_served_model() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.temperature, 0.0);
        assert_eq!(cfg.max_tokens, 384);
        assert!(cfg.api_base.is_none());
    }
}
