//! Command-line front end for the escape tracker.
mod app;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use config::CliConfig;
use escape_runtime::{CompletionRequest, ServiceError, StatsService, bearer};

/// Track escape-loop completions, streaks and the leaderboard
#[derive(Parser)]
#[command(name = "escape")]
#[command(about = "Escape-loop statistics tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Bearer token presented to the service
    #[arg(long, global = true, env = "ESCAPE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a user's statistics, creating the record on first contact
    Stats {
        user_id: String,
    },

    /// Record a loop completion for a user
    Complete {
        user_id: String,

        /// Loop identifier, e.g. 1001
        loop_id: String,

        /// Whether the loop was completed successfully (true/false/1/0)
        #[arg(default_value = "true")]
        success: String,
    },

    /// Show the top users by total escapes
    Leaderboard {
        /// Number of entries (1-100, default from ESCAPE_LEADERBOARD_LIMIT)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List available loops
    Loops,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = CliConfig::from_env();
    let _guard = logging::setup_logging(&config.log_dir)?;

    let service = app::build_service(&config)?;
    let credential = cli.token.as_deref().map(bearer);

    run(&service, credential.as_deref(), cli.command).await
}

async fn run(service: &StatsService, credential: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Stats { user_id } => {
            let stats = service
                .fetch_stats(credential, &user_id)
                .await
                .map_err(describe)?;
            print_json(&stats)
        }
        Command::Complete {
            user_id,
            loop_id,
            success,
        } => {
            let request = CompletionRequest::from_raw(&loop_id, &success)
                .map_err(|e| describe(ServiceError::from(e)))?;
            let stats = service
                .record_completion(credential, &user_id, request)
                .await
                .map_err(describe)?;
            print_json(&stats)
        }
        Command::Leaderboard { limit } => {
            let entries = service
                .leaderboard(credential, limit)
                .await
                .map_err(describe)?;
            print_json(&entries)
        }
        Command::Loops => {
            let loops = service.loops().await.map_err(describe)?;
            print_json(&loops)
        }
    }
}

/// Attach the status class to a service error for display.
fn describe(error: ServiceError) -> anyhow::Error {
    let status = error.status_code();
    let kind = error.kind();
    anyhow::Error::new(error).context(format!("request failed ({status} {kind})"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{json}");
    Ok(())
}
