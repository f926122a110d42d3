//! Run persistence: plain-text transcript and JSONL history records.
//!
//! Two append-only files per instance under the history directory:
//! `transcript_ins{ins}.txt` (human-readable, reset at run start) and
//! `history_ins{ins}.jsonl` (one JSON record per line, accumulates across runs).

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TunerError;

/// Current local time as `YYYY-MM-DD HH:MM:SS`.
pub fn now_ts() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Ensures a directory exists.
pub fn ensure_dir(path: &Path) -> Result<(), TunerError> {
    std::fs::create_dir_all(path).map_err(|e| TunerError::io(path, e))
}

/// One JSONL history record. The `type` tag mirrors the record kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    /// Raw assistant output from a decide turn.
    AssistantRaw { text: String },
    /// One executed trial with its (capped) log excerpt.
    Trial {
        cfg: u32,
        minutes: u32,
        log_excerpt: String,
    },
    /// Raw assistant output from the final summarize turn.
    AssistantFinalRaw { text: String },
}

/// Timestamped wrapper written as one JSONL line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub ts: String,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

impl HistoryRecord {
    /// Stamps an event with the current local time.
    pub fn now(event: HistoryEvent) -> Self {
        Self {
            ts: now_ts(),
            event,
        }
    }
}

/// Append-only human-readable transcript of one run.
///
/// Each entry: `[timestamp] ROLE: content` followed by a blank line. Roles are
/// free-form labels (`system`, `user`, `assistant(raw)`, `tool(log)`,
/// `assistant(json)`) and are upper-cased on write.
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// Transcript path for one instance under `history_dir`.
    pub fn path_for(history_dir: &Path, ins: u32) -> PathBuf {
        history_dir.join(format!("transcript_ins{}.txt", ins))
    }

    /// Opens the transcript for a fresh run: any existing file is removed.
    pub fn create(history_dir: &Path, ins: u32) -> Result<Self, TunerError> {
        ensure_dir(history_dir)?;
        let path = Self::path_for(history_dir, ins);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| TunerError::io(&path, e))?;
            debug!(path = %path.display(), "reset transcript for new run");
        }
        Ok(Self { path })
    }

    /// Appends one entry.
    pub fn append(&self, role: &str, content: &str) -> Result<(), TunerError> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TunerError::io(&self.path, e))?;
        writeln!(file, "[{}] {}: {}\n", now_ts(), role.to_uppercase(), content)
            .map_err(|e| TunerError::io(&self.path, e))
    }

    /// Path of the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Append-only JSONL history of one instance (accumulates across runs).
pub struct HistoryWriter {
    path: PathBuf,
}

impl HistoryWriter {
    /// JSONL path for one instance under `history_dir`.
    pub fn path_for(history_dir: &Path, ins: u32) -> PathBuf {
        history_dir.join(format!("history_ins{}.jsonl", ins))
    }

    /// Opens (without truncating) the JSONL history for one instance.
    pub fn open(history_dir: &Path, ins: u32) -> Result<Self, TunerError> {
        ensure_dir(history_dir)?;
        Ok(Self {
            path: Self::path_for(history_dir, ins),
        })
    }

    /// Appends one record as a single JSON line.
    pub fn append(&self, record: &HistoryRecord) -> Result<(), TunerError> {
        let line = serde_json::to_string(record)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TunerError::io(&self.path, e))?;
        writeln!(file, "{}", line).map_err(|e| TunerError::io(&self.path, e))
    }

    /// Path of the JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ts_has_expected_shape() {
        let ts = now_ts();
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(ts.len(), 19, "ts: {}", ts);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }

    #[test]
    fn transcript_create_resets_existing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path();
        let path = Transcript::path_for(dir, 7);
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(&path, "stale run").unwrap();

        let t = Transcript::create(dir, 7).unwrap();
        t.append("system", "fresh").unwrap();

        let content = std::fs::read_to_string(t.path()).unwrap();
        assert!(!content.contains("stale run"));
        assert!(content.contains("SYSTEM: fresh"));
    }

    #[test]
    fn transcript_entries_are_timestamped_and_upper_cased() {
        let temp = tempfile::TempDir::new().unwrap();
        let t = Transcript::create(temp.path(), 1).unwrap();
        t.append("assistant(raw)", "{\"decision\":{}}").unwrap();

        let content = std::fs::read_to_string(t.path()).unwrap();
        assert!(content.starts_with('['));
        assert!(content.contains("ASSISTANT(RAW): {\"decision\":{}}"));
        assert!(content.ends_with("\n\n"));
    }

    #[test]
    fn history_writer_appends_one_json_line_per_record() {
        let temp = tempfile::TempDir::new().unwrap();
        let w = HistoryWriter::open(temp.path(), 3).unwrap();
        w.append(&HistoryRecord::now(HistoryEvent::AssistantRaw {
            text: "raw".into(),
        }))
        .unwrap();
        w.append(&HistoryRecord::now(HistoryEvent::Trial {
            cfg: 2,
            minutes: 3,
            log_excerpt: "ok".into(),
        }))
        .unwrap();

        let content = std::fs::read_to_string(w.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "assistant_raw");
        assert_eq!(first["text"], "raw");
        assert!(first["ts"].is_string());
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "trial");
        assert_eq!(second["cfg"], 2);
        assert_eq!(second["minutes"], 3);
    }

    #[test]
    fn history_writer_accumulates_across_opens() {
        let temp = tempfile::TempDir::new().unwrap();
        for _ in 0..2 {
            let w = HistoryWriter::open(temp.path(), 5).unwrap();
            w.append(&HistoryRecord::now(HistoryEvent::AssistantFinalRaw {
                text: "done".into(),
            }))
            .unwrap();
        }
        let content = std::fs::read_to_string(HistoryWriter::path_for(temp.path(), 5)).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
