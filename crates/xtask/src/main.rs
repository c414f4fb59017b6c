//! Development tasks for the escape tracker
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadAudit, ReadStats};

/// Development tasks for the escape tracker
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the escape tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Read and inspect stored statistics
    ReadStats(ReadStats),

    /// Read and inspect the completion audit log
    ReadAudit(ReadAudit),

    /// Clean stored statistics and logs
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for ESCAPE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::ReadStats(cmd) => cmd.execute(),
        Command::ReadAudit(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
