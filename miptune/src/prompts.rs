//! System prompts for the two phases of the game, with YAML overrides.
//!
//! **Canonical source**: Default prompt text lives in the code consts below;
//! `miptune/prompts/*.yaml` are embedded at compile time and only carry
//! overrides. A directory override (`PROMPTS_DIR` env or explicit path) and
//! env overrides (`DECIDE_SYSTEM_PROMPT`, `SUMMARIZE_SYSTEM_PROMPT`) are
//! applied on top. See [`load`], [`load_or_default`], [`default_from_embedded`].

use std::path::Path;

use serde::Deserialize;

/// Embedded override YAML (canonical location: `miptune/prompts/*.yaml`).
macro_rules! embed_prompt_yaml {
    ($name:literal) => {
        include_str!(concat!("../prompts/", $name))
    };
}
const EMBED_DECIDE: &str = embed_prompt_yaml!("decide.yaml");
const EMBED_SUMMARIZE: &str = embed_prompt_yaml!("summarize.yaml");

/// Names of YAML files under the prompts directory (one per phase).
const DECIDE_FILE: &str = "decide.yaml";
const SUMMARIZE_FILE: &str = "summarize.yaml";

/// Default directory name when `PROMPTS_DIR` is not set.
const DEFAULT_PROMPTS_DIR: &str = "prompts";

/// Decide phase: pick the next (cfg, minutes) pair as a single JSON object.
pub const DECIDE_SYSTEM_PROMPT: &str = "\
You are an expert parameter-tuning agent for SCIP solvers.
Goal: Within a total of 6 minutes budget for THIS SINGLE INSTANCE (unknown matrix),
choose which configuration (1..6) to try next and how many minutes (1..6) to allocate.
Constraints:
- cfg must be integer in [1,6].
- minutes must be integer in [1,6].
- Do not exceed remaining budget.
Output ALWAYS a single JSON object with schema:
{
  \"decision\": {\"cfg\": int, \"minutes\": int},
  \"reason\": str
}
No extra commentary.";

/// Summarize phase: after the budget is spent, pick the final configuration.
pub const SUMMARIZE_SYSTEM_PROMPT: &str = "\
You are an expert parameter-tuning agent for SCIP solvers.
You have finished consuming the 6-minute budget across several trials.
Now summarize ALL trial logs and decide the final best configuration among [1..6].
Output ALWAYS a single JSON object with schema:
{
  \"final_cfg\": int,
  \"rationale\": str,
  \"trial_brief\": [
     {\"cfg\": int, \"minutes\": int, \"notes\": str}
  ]
}
No extra commentary.";

/// One prompt override file: `system` replaces the default when present.
#[derive(Debug, Clone, Default, Deserialize)]
struct PromptFile {
    system: Option<String>,
}

/// Error when loading prompts from a directory (missing dir, invalid YAML).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// Resolved system prompts for both phases.
#[derive(Debug, Clone, Default)]
pub struct TunerPrompts {
    decide: Option<String>,
    summarize: Option<String>,
}

impl TunerPrompts {
    /// Decide-phase system prompt: override when set, else the code default.
    pub fn decide_system_prompt(&self) -> &str {
        self.decide.as_deref().unwrap_or(DECIDE_SYSTEM_PROMPT)
    }

    /// Summarize-phase system prompt: override when set, else the code default.
    pub fn summarize_system_prompt(&self) -> &str {
        self.summarize.as_deref().unwrap_or(SUMMARIZE_SYSTEM_PROMPT)
    }
}

/// Returns the directory to load prompts from: `dir` if `Some`, else `PROMPTS_DIR` env, else `./prompts`.
fn prompts_dir(dir: Option<&Path>) -> std::path::PathBuf {
    dir.map(std::path::PathBuf::from).unwrap_or_else(|| {
        std::env::var("PROMPTS_DIR")
            .ok()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

/// Tries to read and parse a YAML file. Missing file returns `None`; a file
/// with no keys (comments only) parses as an empty override.
fn read_yaml_file(dir: &Path, name: &str) -> Result<Option<PromptFile>, LoadError> {
    let path = dir.join(name);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Ok(None);
            }
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            });
        }
    };
    let value: Option<PromptFile> =
        serde_yaml::from_str(&content).map_err(|e| LoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(Some(value.unwrap_or_default()))
}

/// Applies env overrides: `DECIDE_SYSTEM_PROMPT` and `SUMMARIZE_SYSTEM_PROMPT`.
fn apply_env(mut prompts: TunerPrompts) -> TunerPrompts {
    if let Ok(s) = std::env::var("DECIDE_SYSTEM_PROMPT") {
        prompts.decide = Some(s);
    }
    if let Ok(s) = std::env::var("SUMMARIZE_SYSTEM_PROMPT") {
        prompts.summarize = Some(s);
    }
    prompts
}

/// Loads prompts from a directory: reads `decide.yaml` and `summarize.yaml`,
/// then applies env overrides.
///
/// If `dir` is `None`, uses `PROMPTS_DIR` env or default `./prompts`. Missing
/// files are ignored (that pattern keeps code defaults). Only returns error
/// when the directory itself is missing or a present file fails to parse.
pub fn load(dir: Option<&Path>) -> Result<TunerPrompts, LoadError> {
    let base = prompts_dir(dir);
    if !base.exists() || !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }

    let decide = read_yaml_file(&base, DECIDE_FILE)?.unwrap_or_default();
    let summarize = read_yaml_file(&base, SUMMARIZE_FILE)?.unwrap_or_default();

    Ok(apply_env(TunerPrompts {
        decide: decide.system,
        summarize: summarize.system,
    }))
}

/// Returns defaults by parsing the embedded YAML overrides.
///
/// The embedded files carry no override by design, so the effective text is
/// the code consts; env overrides still apply.
pub fn default_from_embedded() -> TunerPrompts {
    let decide: Option<PromptFile> = serde_yaml::from_str(EMBED_DECIDE).unwrap_or_default();
    let summarize: Option<PromptFile> = serde_yaml::from_str(EMBED_SUMMARIZE).unwrap_or_default();
    apply_env(TunerPrompts {
        decide: decide.unwrap_or_default().system,
        summarize: summarize.unwrap_or_default().system,
    })
}

/// Loads prompts from `dir` if the directory exists; otherwise embedded defaults.
pub fn load_or_default(dir: Option<&Path>) -> TunerPrompts {
    load(dir).unwrap_or_else(|_| default_from_embedded())
}
