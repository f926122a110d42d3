//! # MipTune
//!
//! LLM-driven SCIP configuration tuning over a fixed minute budget. A scripted
//! control loop ("game") repeatedly asks a chat model to pick one of six solver
//! configurations and a minute allocation, reads back the matching
//! pre-existing solver log, sanitizes and snippets it, and feeds the excerpt to
//! the model as trial feedback. When the budget is spent, a fresh summarize
//! conversation asks for the final configuration.
//!
//! ## Design principles
//!
//! - **Strictly sequential**: one loop, no concurrency, no retries; the only
//!   recovery for malformed model output is clamping integers into range.
//! - **Sanitized feedback**: instance identifiers are redacted from solver
//!   logs before the model sees them, and long logs are snippeted down to the
//!   solver-relevant lines.
//! - **Everything on disk**: a human-readable transcript (reset per run) and a
//!   JSONL history (appended across runs) record every model turn and trial.
//!
//! ## Main modules
//!
//! - [`game`]: [`run_game`], [`Trial`], [`GameConfig`], [`GameOutcome`] — the loop itself.
//! - [`llm`]: [`LlmClient`] trait, [`ChatClient`] (OpenAI-compatible endpoint), [`MockLlm`].
//! - [`logs`]: [`sanitize_log`], [`extract_snippet`], [`process_log`] — log feedback pipeline.
//! - [`history`]: [`Transcript`], [`HistoryWriter`], [`HistoryRecord`] — run persistence.
//! - [`prompts`]: decide/summarize system prompts with YAML and env overrides.
//! - [`message`]: [`Message`] (System / User / Assistant).
//!
//! Key types are re-exported at crate root:
//! `use miptune::{run_game, ChatClient, GameConfig, Message, MockLlm};`.

pub mod error;
pub mod game;
pub mod history;
pub mod llm;
pub mod logs;
pub mod message;
pub mod prompts;

pub use error::TunerError;
pub use game::{
    clamp_int, extract_first_json, run_game, GameConfig, GameOutcome, Trial, CFG_MAX, CFG_MIN,
    DEFAULT_BUDGET_MIN,
};
pub use history::{ensure_dir, now_ts, HistoryEvent, HistoryRecord, HistoryWriter, Transcript};
pub use llm::{ChatClient, LlmClient, MockLlm, ModelConfig, DEFAULT_MODEL};
pub use logs::{
    extract_snippet, log_file_name, log_file_path, process_log, read_log, sanitize_log,
    DEFAULT_MAX_LOG_LEN,
};
pub use message::Message;
pub use prompts::{
    default_from_embedded as default_prompts_from_embedded, load as load_prompts,
    load_or_default as load_prompts_or_default, LoadError as PromptsLoadError, TunerPrompts,
    DECIDE_SYSTEM_PROMPT, SUMMARIZE_SYSTEM_PROMPT,
};
