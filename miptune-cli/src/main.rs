//! MipTune CLI binary: smoke test, prepare placeholder logs, run the game.
//!
//! Subcommands: `smoke-test` (one model round-trip), `prepare-logs` (touch the
//! 36 placeholder log files for instance 1), `run-game` (the tuning loop).

mod logging;

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use miptune::{
    load_prompts_or_default, run_game, ChatClient, GameConfig, HistoryWriter, LlmClient, Message,
    ModelConfig, Transcript, TunerError, CFG_MAX, CFG_MIN, DEFAULT_BUDGET_MIN, DEFAULT_MODEL,
};

#[derive(Parser, Debug)]
#[command(name = "miptune")]
#[command(about = "MipTune — smoke test, prepare logs, and run the tuning game")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(ClapArgs, Debug)]
struct ModelArgs {
    /// Model id for the chat endpoint
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of an OpenAI-compatible server (default: OPENAI_BASE_URL env)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the model endpoint and answer a simple prompt
    SmokeTest {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Touch placeholder empty log files: log_{cfg}cfg_{min}min_{ins}ins.txt
    PrepareLogs {
        /// Directory for the log files
        #[arg(long, default_value = "./logs")]
        logs_dir: PathBuf,
    },
    /// Run the tuning game for one instance
    RunGame {
        #[command(flatten)]
        model: ModelArgs,

        /// Instance id [1..390]
        #[arg(long)]
        ins: u32,

        /// Directory containing the log files
        #[arg(long, default_value = "./logs")]
        logs_dir: PathBuf,

        /// Directory for transcript and JSONL history
        #[arg(long, default_value = "./history")]
        history_dir: PathBuf,

        /// Total minutes budget
        #[arg(long, default_value_t = DEFAULT_BUDGET_MIN)]
        budget: u32,

        /// Directory with decide.yaml / summarize.yaml prompt overrides
        #[arg(long, value_name = "DIR")]
        prompts_dir: Option<PathBuf>,
    },
}

impl ModelArgs {
    fn client(&self) -> ChatClient {
        ChatClient::new(ModelConfig {
            model: self.model.clone(),
            api_base: self.base_url.clone(),
            ..ModelConfig::default()
        })
    }
}

async fn cmd_smoke_test(model: ModelArgs) -> Result<(), TunerError> {
    let client = model.client();
    let messages = [
        Message::system("You are a helpful assistant."),
        Message::user("Say 'miptune smoke test OK' in one short sentence."),
    ];
    let out = client.chat(&messages).await?;
    println!("{}", out);
    Ok(())
}

fn cmd_prepare_logs(logs_dir: &PathBuf) -> Result<(), TunerError> {
    miptune::ensure_dir(logs_dir)?;
    let mut total = 0u32;
    // Only instance 1 to keep the file count down.
    let ins = 1;
    for cfg in CFG_MIN as u32..=CFG_MAX as u32 {
        for minute in CFG_MIN as u32..=CFG_MAX as u32 {
            let path = miptune::log_file_path(logs_dir, cfg, minute, ins);
            if !path.exists() {
                std::fs::write(&path, "").map_err(|e| TunerError::io(&path, e))?;
            }
            total += 1;
        }
    }
    println!(
        "Prepared {} empty log files under {} (instance {} only)",
        total,
        logs_dir.display(),
        ins
    );
    Ok(())
}

async fn cmd_run_game(
    model: ModelArgs,
    ins: u32,
    logs_dir: PathBuf,
    history_dir: PathBuf,
    budget: u32,
    prompts_dir: Option<PathBuf>,
) -> Result<(), TunerError> {
    let client = model.client();
    let prompts = load_prompts_or_default(prompts_dir.as_deref());
    let game = GameConfig {
        ins,
        total_budget_min: budget,
        ..GameConfig::new(ins)
    };

    let outcome = run_game(&client, &logs_dir, &history_dir, &prompts, &game).await?;

    let summary = serde_json::json!({
        "instance": ins,
        "final_cfg": outcome.final_cfg,
        "trials": outcome.trials,
        "history_files": {
            "transcript": Transcript::path_for(&history_dir, ins).display().to_string(),
            "jsonl": HistoryWriter::path_for(&history_dir, ins).display().to_string(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init()?;

    let cli = Cli::parse();
    match cli.cmd {
        Command::SmokeTest { model } => cmd_smoke_test(model).await?,
        Command::PrepareLogs { logs_dir } => cmd_prepare_logs(&logs_dir)?,
        Command::RunGame {
            model,
            ins,
            logs_dir,
            history_dir,
            budget,
            prompts_dir,
        } => cmd_run_game(model, ins, logs_dir, history_dir, budget, prompts_dir).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_game_args() {
        let cli = Cli::parse_from([
            "miptune",
            "run-game",
            "--ins",
            "17",
            "--budget",
            "4",
            "--logs-dir",
            "/tmp/logs",
        ]);
        match cli.cmd {
            Command::RunGame {
                ins,
                budget,
                logs_dir,
                history_dir,
                ..
            } => {
                assert_eq!(ins, 17);
                assert_eq!(budget, 4);
                assert_eq!(logs_dir, PathBuf::from("/tmp/logs"));
                assert_eq!(history_dir, PathBuf::from("./history"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_smoke_test_defaults_model() {
        let cli = Cli::parse_from(["miptune", "smoke-test"]);
        match cli.cmd {
            Command::SmokeTest { model } => {
                assert_eq!(model.model, DEFAULT_MODEL);
                assert!(model.base_url.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn prepare_logs_touches_all_36_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();
        cmd_prepare_logs(&dir).unwrap();
        let count = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(count, 36);
        // idempotent
        cmd_prepare_logs(&dir).unwrap();
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 36);
    }
}
