//! Solver log processing: instance-tag redaction and snippet extraction.
//!
//! Trial logs are pre-existing files named `log_{cfg}cfg_{min}min_{ins}ins.txt`.
//! Before a log is fed back to the model it is sanitized (the model must not
//! learn the instance id from the log text) and shortened to a snippet that
//! keeps the solver-relevant lines.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::TunerError;

/// Default cap on snippet length fed into the conversation, in chars.
pub const DEFAULT_MAX_LOG_LEN: usize = 2000;

/// Instance-tag patterns redacted from logs: `123ins`, `ins 123`, `ins=123`,
/// `instance: 123` (case-insensitive).
static INSTANCE_TAG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b\d+\s*ins\b",
        r"(?i)\bins\s*\d+\b",
        r"(?i)\bins\s*=\s*\d+\b",
        r"(?i)\binstance\s*[:=]?\s*\d+\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("instance tag pattern compiles"))
    .collect()
});

/// Runs of spaces/tabs left behind by redaction.
static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("space run pattern compiles"));

/// Lines worth keeping when a log must be shortened.
static IMPORTANT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)error|warning|solution|optimal|status|time|nodes|bound")
        .expect("important line pattern compiles")
});

/// Removes instance tags from log text and collapses leftover whitespace.
///
/// The returned text never contains a token matchable by the redaction
/// patterns; an empty input stays empty.
pub fn sanitize_log(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut out = text.to_string();
    for re in INSTANCE_TAG_PATTERNS.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    let out = SPACE_RUNS.replace_all(&out, " ");
    out.trim().to_string()
}

/// First `n` chars of `s` (char-safe; logs are not guaranteed ASCII).
pub fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Last `n` chars of `s`. `n == 0` yields the empty string (an `nth(len)`
/// lookup would miss and fall back to the whole string).
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let len = s.chars().count();
    if len <= n {
        return s;
    }
    match s.char_indices().nth(len - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Shortens a log to at most `max_len` chars (plus fixed truncation markers).
///
/// Prefers lines matching the important-line pattern (errors, solver status,
/// bounds); when none match, keeps the head and tail halves around a
/// `[truncated]` marker.
pub fn extract_snippet(log_text: &str, max_len: usize) -> String {
    if log_text.chars().count() <= max_len {
        return log_text.to_string();
    }

    let important: Vec<&str> = log_text
        .lines()
        .filter(|line| IMPORTANT_LINE.is_match(line))
        .collect();

    if !important.is_empty() {
        let snippet = important.join("\n");
        if snippet.chars().count() <= max_len {
            return snippet;
        }
        return format!("{}...", truncate_chars(&snippet, max_len));
    }

    let half = (max_len / 2).saturating_sub(50);
    format!(
        "{}\n...[truncated]...\n{}",
        truncate_chars(log_text, half),
        tail_chars(log_text, half)
    )
}

/// File name for one trial log: `log_{cfg}cfg_{min}min_{ins}ins.txt`.
pub fn log_file_name(cfg: u32, minutes: u32, ins: u32) -> String {
    format!("log_{}cfg_{}min_{}ins.txt", cfg, minutes, ins)
}

/// Path of one trial log under `logs_dir`.
pub fn log_file_path(logs_dir: &Path, cfg: u32, minutes: u32, ins: u32) -> PathBuf {
    logs_dir.join(log_file_name(cfg, minutes, ins))
}

/// Reads a trial log. A missing file is not an error: an empty placeholder
/// (and parent directories) are created and empty text is returned. Invalid
/// UTF-8 is replaced rather than rejected.
pub fn read_log(logs_dir: &Path, cfg: u32, minutes: u32, ins: u32) -> Result<String, TunerError> {
    let path = log_file_path(logs_dir, cfg, minutes, ins);
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TunerError::io(parent, e))?;
        }
        std::fs::write(&path, "").map_err(|e| TunerError::io(&path, e))?;
        debug!(path = %path.display(), "created empty placeholder log");
        return Ok(String::new());
    }
    let bytes = std::fs::read(&path).map_err(|e| TunerError::io(&path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads, sanitizes, and snippets one trial log for the conversation.
pub fn process_log(
    logs_dir: &Path,
    cfg: u32,
    minutes: u32,
    ins: u32,
    max_len: usize,
) -> Result<String, TunerError> {
    let raw = read_log(logs_dir, cfg, minutes, ins)?;
    let clean = sanitize_log(&raw);
    Ok(extract_snippet(&clean, max_len))
}
