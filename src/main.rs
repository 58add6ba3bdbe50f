use std::process::ExitCode;

use dotenv::dotenv;
use log::{error, info, warn};
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use transcript_watch::config::{parse_log_level, Config};
use transcript_watch::runner::{run, RunOutcome};

// Entry point for the async main function, powered by tokio runtime.
#[tokio::main]
async fn main() -> ExitCode {
    // Loads environment variables from a `.env` file, if present.
    dotenv().ok();

    let raw_level = std::env::var("LOG_LEVEL").ok();
    let level = parse_log_level(raw_level.as_deref());

    TermLogger::init(
        *level.as_ref().unwrap_or(&LevelFilter::Info),
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    if let Err(value) = level {
        warn!("Unknown LOG_LEVEL {:?}, using info", value);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(RunOutcome::NoUpdates) => ExitCode::SUCCESS,
        Ok(RunOutcome::Updated(courses)) => {
            info!("Reported {} course(s)", courses.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
