//! Mock LLM client with scripted replies, for tests of the game loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TunerError;
use crate::message::Message;

use super::LlmClient;

/// Scripted LLM: pops one reply per `chat` call, falling back to a fixed
/// reply when the script runs out. Records how many calls it received.
///
/// **Interaction**: Drives `run_game` deterministically in tests; the script
/// usually holds decision JSONs followed by a final-summary JSON.
pub struct MockLlm {
    script: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
}

impl MockLlm {
    /// Same fixed reply on every call.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scripted replies in order; after the script is exhausted, `fallback`.
    pub fn with_script(
        replies: impl IntoIterator<Item = impl Into<String>>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: fallback.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `chat` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn chat(&self, _messages: &[Message]) -> Result<String, TunerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("mock script lock");
        Ok(script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}
