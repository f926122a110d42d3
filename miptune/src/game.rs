//! The tuning game: decide → read log → feed back, until the budget is spent.
//!
//! One run is strictly sequential. Each round asks the model for a
//! `{cfg, minutes}` decision, reads the matching pre-existing solver log,
//! sanitizes and snippets it, and appends it to the conversation as trial
//! feedback. When the minute budget reaches zero, a fresh two-message
//! conversation asks for the final configuration.
//!
//! Malformed model output is never an error: missing or non-integer decision
//! fields default to 1 and are clamped into `[1,6]` (and `minutes` into the
//! remaining budget). That clamping is the entire recovery strategy.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::TunerError;
use crate::history::{HistoryEvent, HistoryRecord, HistoryWriter, Transcript};
use crate::llm::LlmClient;
use crate::logs::{process_log, truncate_chars};
use crate::message::Message;
use crate::prompts::TunerPrompts;

/// Configuration ids are 1..=6.
pub const CFG_MIN: i64 = 1;
/// Configuration ids are 1..=6.
pub const CFG_MAX: i64 = 6;
/// Default total minute budget per instance.
pub const DEFAULT_BUDGET_MIN: u32 = 6;

/// Chars of log excerpt kept on a [`Trial`].
const TRIAL_EXCERPT_CAP: usize = 2000;
/// Chars of log excerpt kept in the JSONL trial record.
const JSONL_EXCERPT_CAP: usize = 1000;

/// First JSON object or array span in free-form text.
static FIRST_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(\{.*\}|\[.*\])").expect("first json pattern compiles"));

/// One executed trial: the decision plus the sanitized log excerpt.
#[derive(Debug, Clone, Serialize)]
pub struct Trial {
    pub cfg: u32,
    pub minutes: u32,
    pub log_excerpt: String,
}

/// Parameters of one game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Instance id the logs belong to.
    pub ins: u32,
    /// Total minute budget for this instance.
    pub total_budget_min: u32,
    /// Cap on the log snippet fed into the conversation, in chars.
    pub max_log_len: usize,
}

impl GameConfig {
    pub fn new(ins: u32) -> Self {
        Self {
            ins,
            total_budget_min: DEFAULT_BUDGET_MIN,
            max_log_len: crate::logs::DEFAULT_MAX_LOG_LEN,
        }
    }
}

/// Result of one game run.
#[derive(Debug, Clone, Serialize)]
pub struct GameOutcome {
    /// Final configuration chosen after the budget was spent, in `[1,6]`.
    pub final_cfg: u32,
    /// Trials in execution order.
    pub trials: Vec<Trial>,
}

/// Extracts the first JSON object/array from text, parsed leniently.
pub fn extract_first_json(text: &str) -> Option<Value> {
    let m = FIRST_JSON.captures(text)?;
    serde_json::from_str(m.get(1)?.as_str()).ok()
}

/// Clamps `x` into `[lo, hi]`.
pub fn clamp_int(x: i64, lo: i64, hi: i64) -> i64 {
    x.max(lo).min(hi)
}

/// Reads `decision.cfg` / `decision.minutes` from parsed model output,
/// defaulting each missing or non-integer field to 1, clamped into `[1,6]`.
fn parse_decision(value: &Value) -> (u32, u32) {
    let decision = value.get("decision");
    let cfg = decision
        .and_then(|d| d.get("cfg"))
        .and_then(Value::as_i64)
        .unwrap_or(1);
    let minutes = decision
        .and_then(|d| d.get("minutes"))
        .and_then(Value::as_i64)
        .unwrap_or(1);
    (
        clamp_int(cfg, CFG_MIN, CFG_MAX) as u32,
        clamp_int(minutes, CFG_MIN, CFG_MAX) as u32,
    )
}

/// `(cfg=2, min=3); (cfg=5, min=1)` style brief of the trials so far.
fn trials_brief(trials: &[Trial]) -> String {
    trials
        .iter()
        .map(|t| format!("(cfg={}, min={})", t.cfg, t.minutes))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs the tuning game for one instance.
///
/// Reads logs under `logs_dir`, writes `transcript_ins{ins}.txt` (reset at
/// start) and `history_ins{ins}.jsonl` (appended) under `history_dir`. The
/// loop always terminates: every round consumes at least one minute.
pub async fn run_game(
    llm: &dyn LlmClient,
    logs_dir: &Path,
    history_dir: &Path,
    prompts: &TunerPrompts,
    game: &GameConfig,
) -> Result<GameOutcome, TunerError> {
    crate::history::ensure_dir(logs_dir)?;
    let transcript = Transcript::create(history_dir, game.ins)?;
    let history = HistoryWriter::open(history_dir, game.ins)?;

    let mut remaining = game.total_budget_min;
    let mut trials: Vec<Trial> = Vec::new();

    // Conversation we keep appending to, so the model remembers its own
    // decisions and the trial feedback.
    let initial_user = format!(
        "Total budget: {} minutes.\n\
         Remaining minutes: {}.\n\
         Configs available: 1..6.\n\
         Instance id: {} (NOTE: do not mention instance id in your reasoning or outputs).\n\
         Previous trials: none.",
        game.total_budget_min, remaining, game.ins
    );
    let mut messages = vec![
        Message::system(prompts.decide_system_prompt()),
        Message::user(initial_user),
    ];

    transcript.append("system", prompts.decide_system_prompt())?;
    transcript.append("user", messages[1].content())?;

    while remaining > 0 {
        let model_out = llm.chat(&messages).await?;
        transcript.append("assistant(raw)", &model_out)?;
        history.append(&HistoryRecord::now(HistoryEvent::AssistantRaw {
            text: model_out.clone(),
        }))?;

        let decision_json = extract_first_json(&model_out).unwrap_or_else(|| Value::Object(Default::default()));
        let (cfg, minutes) = parse_decision(&decision_json);
        let minutes = minutes.min(remaining);

        let clean_log = process_log(logs_dir, cfg, minutes, game.ins, game.max_log_len)?;
        info!(cfg, minutes, remaining, excerpt_len = clean_log.len(), "trial");

        trials.push(Trial {
            cfg,
            minutes,
            log_excerpt: truncate_chars(&clean_log, TRIAL_EXCERPT_CAP).to_string(),
        });

        let tool_msg = format!(
            "TRIAL RESULT (cfg={}, minutes={}):\n{}",
            cfg,
            minutes,
            if clean_log.trim().is_empty() {
                "[empty log]"
            } else {
                clean_log.as_str()
            }
        );
        messages.push(Message::assistant(serde_json::to_string(&decision_json)?));
        messages.push(Message::user(tool_msg.clone()));
        transcript.append("tool(log)", &tool_msg)?;
        history.append(&HistoryRecord::now(HistoryEvent::Trial {
            cfg,
            minutes,
            log_excerpt: truncate_chars(&clean_log, JSONL_EXCERPT_CAP).to_string(),
        }))?;

        remaining -= minutes;

        let brief = trials_brief(&trials);
        let next_user = format!(
            "Remaining minutes: {}. Tried so far: {}. Choose NEXT decision following the JSON schema.",
            remaining,
            if brief.is_empty() { "none" } else { &brief }
        );
        messages.push(Message::user(next_user.clone()));
        transcript.append("user", &next_user)?;
    }

    // Budget spent: fresh conversation asking for the final configuration.
    let summary_user = format!(
        "Budget fully consumed (total {} minutes). Trials: {}. Provide final decision JSON now.",
        game.total_budget_min,
        trials_brief(&trials)
    );
    let summary_messages = vec![
        Message::system(prompts.summarize_system_prompt()),
        Message::user(summary_user),
    ];
    transcript.append("system", prompts.summarize_system_prompt())?;
    transcript.append("user", summary_messages[1].content())?;

    let final_out = llm.chat(&summary_messages).await?;
    transcript.append("assistant(raw)", &final_out)?;
    history.append(&HistoryRecord::now(HistoryEvent::AssistantFinalRaw {
        text: final_out.clone(),
    }))?;

    let final_json = extract_first_json(&final_out).unwrap_or_else(|| Value::Object(Default::default()));
    let final_cfg = clamp_int(
        final_json.get("final_cfg").and_then(Value::as_i64).unwrap_or(1),
        CFG_MIN,
        CFG_MAX,
    ) as u32;
    transcript.append("assistant(json)", &serde_json::to_string(&final_json)?)?;

    info!(final_cfg, trial_count = trials.len(), "game finished");
    Ok(GameOutcome { final_cfg, trials })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_first_json_finds_object_in_prose() {
        let text = "Sure! Here is my decision:\n{\"decision\": {\"cfg\": 3, \"minutes\": 2}, \"reason\": \"warm start\"}\nDone.";
        let v = extract_first_json(text).unwrap();
        assert_eq!(v["decision"]["cfg"], 3);
    }

    #[test]
    fn extract_first_json_none_for_plain_text() {
        assert!(extract_first_json("no json here").is_none());
        assert!(extract_first_json("{broken").is_none());
    }

    #[test]
    fn extract_first_json_handles_array() {
        let v = extract_first_json("list: [1, 2, 3]").unwrap();
        assert_eq!(v[2], 3);
    }

    #[test]
    fn clamp_int_bounds() {
        assert_eq!(clamp_int(0, 1, 6), 1);
        assert_eq!(clamp_int(7, 1, 6), 6);
        assert_eq!(clamp_int(-3, 1, 6), 1);
        assert_eq!(clamp_int(4, 1, 6), 4);
    }

    #[test]
    fn parse_decision_defaults_and_clamps() {
        let v: Value = serde_json::json!({"decision": {"cfg": 9, "minutes": 0}});
        assert_eq!(parse_decision(&v), (6, 1));

        let v: Value = serde_json::json!({"decision": {"cfg": "three"}});
        assert_eq!(parse_decision(&v), (1, 1));

        let v: Value = serde_json::json!({});
        assert_eq!(parse_decision(&v), (1, 1));
    }

    #[test]
    fn trials_brief_formats_in_order() {
        let trials = vec![
            Trial {
                cfg: 2,
                minutes: 3,
                log_excerpt: String::new(),
            },
            Trial {
                cfg: 5,
                minutes: 1,
                log_excerpt: String::new(),
            },
        ];
        assert_eq!(trials_brief(&trials), "(cfg=2, min=3); (cfg=5, min=1)");
        assert_eq!(trials_brief(&[]), "");
    }
}
