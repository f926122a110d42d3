//! Error types for the tuning loop.
//!
//! Used by `LlmClient::chat`, the history writers, and `run_game`.

use thiserror::Error;

/// Error from one step of the tuning loop.
///
/// Model output that merely fails to parse is NOT an error: malformed
/// decisions default to fallback integers and are clamped into range.
/// `TunerError` covers the genuinely fallible edges (API, filesystem, JSON
/// encoding of history records).
#[derive(Debug, Error)]
pub enum TunerError {
    /// LLM call failed (request build, transport, or empty response).
    #[error("llm call failed: {0}")]
    Llm(String),

    /// Filesystem operation failed for the given path.
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A history record could not be encoded as JSON.
    #[error("failed to encode history record: {0}")]
    Json(#[from] serde_json::Error),
}

impl TunerError {
    /// Wraps an I/O error with the path it happened at.
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of Llm contains "llm call failed" and the message.
    #[test]
    fn tuner_error_display_llm() {
        let err = TunerError::Llm("boom".to_string());
        let s = err.to_string();
        assert!(s.contains("llm call failed"), "Display: {}", s);
        assert!(s.contains("boom"), "Display: {}", s);
    }

    /// **Scenario**: io() captures the path in the Display output.
    #[test]
    fn tuner_error_io_includes_path() {
        let err = TunerError::io(
            "/tmp/some/log.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let s = err.to_string();
        assert!(s.contains("/tmp/some/log.txt"), "Display: {}", s);
    }
}
