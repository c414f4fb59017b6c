//! Read and inspect stored statistics records
//!
//! Loads `users/*.bin` records from the data directory and displays them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use escape_core::{UserId, UserStats};
use escape_runtime::{FileStatsRepository, StatsRepository, StoredStats};

use crate::dirs;

/// Read and inspect stored statistics
#[derive(Parser)]
pub struct ReadStats {
    /// User to show (all users if omitted)
    #[arg(value_name = "USER")]
    user: Option<String>,

    /// Custom data directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per user
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadStats {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(dirs::data_dir);

        let users_dir = data_dir.join("users");
        if !users_dir.exists() {
            anyhow::bail!(
                "No stats found in {}\n\nHint: record a completion with `escape complete` first",
                data_dir.display()
            );
        }

        let repo = FileStatsRepository::new(&data_dir)
            .with_context(|| format!("Failed to open stats in {}", data_dir.display()))?;

        println!(
            "{} {}",
            style("Stats Directory:").bold().cyan(),
            repo.users_dir().display()
        );
        println!();

        match self.user {
            Some(user) => {
                let user_id = UserId::parse(&user).context("Invalid user id")?;
                let stats = repo
                    .load(&user_id)
                    .context("Failed to read stats record")?
                    .with_context(|| format!("No record for user {}", user_id))?;

                match self.format {
                    OutputFormat::Summary => print_user(&stats),
                    OutputFormat::Json => print_json(&stats)?,
                    OutputFormat::Debug => println!("{:#?}", stats),
                }
            }
            None => {
                let mut records = repo.scan().context("Failed to scan stats records")?;
                records.sort_by_key(|record| record.created_seq);

                match self.format {
                    OutputFormat::Summary => print_table(&records),
                    OutputFormat::Json => print_json(&records)?,
                    OutputFormat::Debug => println!("{:#?}", records),
                }
            }
        }

        Ok(())
    }
}

fn print_user(stats: &UserStats) {
    println!("{}", style(format!("=== {} ===", stats.user_id)).bold().green());
    println!();
    println!("  Joined:        {}", stats.join_date);
    println!("  Total escapes: {}", stats.total_escapes);
    println!("  Today:         {}", stats.today_escapes);
    println!("  Streak:        {}", stats.streak);
    match stats.last_escape {
        Some(last) => println!("  Last escape:   {}", last),
        None => println!("  Last escape:   {}", style("never").dim()),
    }
}

fn print_table(records: &[StoredStats]) {
    if records.is_empty() {
        println!("{}", style("No records").dim());
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:>5}  {:<24} {:>7} {:>7} {:>7}",
            "SEQ", "USER", "TOTAL", "TODAY", "STREAK"
        ))
        .bold()
        .yellow()
    );
    for record in records {
        let stats = &record.stats;
        println!(
            "{:>5}  {:<24} {:>7} {:>7} {:>7}",
            record.created_seq,
            stats.user_id.as_str(),
            stats.total_escapes,
            stats.today_escapes,
            stats.streak
        );
    }
    println!();
    println!("{} {}", style("Users:").bold().cyan(), records.len());
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}
