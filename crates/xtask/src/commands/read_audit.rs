//! Read and inspect the completion audit log
//!
//! Walks `audit.log` frame by frame and displays the recorded events.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use escape_runtime::AuditLogReader;
use escape_runtime::repository::file::AUDIT_LOG_FILE;

use crate::dirs;

/// Read and inspect the audit log
#[derive(Parser)]
pub struct ReadAudit {
    /// Only show events for this user
    #[arg(short, long, value_name = "USER")]
    user: Option<String>,

    /// Show only the last N matching events
    #[arg(short = 'n', long, value_name = "N")]
    tail: Option<usize>,

    /// Custom data directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl ReadAudit {
    pub fn execute(self) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(dirs::data_dir);
        let path = data_dir.join(AUDIT_LOG_FILE);

        if !path.exists() {
            anyhow::bail!("Audit log not found: {}", path.display());
        }

        let reader = AuditLogReader::new(&path);
        let size = reader.size().context("Failed to stat audit log")?;
        let mut entries = reader
            .entries()
            .with_context(|| format!("Failed to read audit log: {}", path.display()))?;
        let total = entries.len();

        if let Some(user) = &self.user {
            entries.retain(|event| event.user_id.as_str() == user);
        }
        if let Some(tail) = self.tail {
            let skip = entries.len().saturating_sub(tail);
            entries.drain(..skip);
        }

        if self.json {
            let json =
                serde_json::to_string_pretty(&entries).context("Failed to serialize to JSON")?;
            println!("{}", json);
            return Ok(());
        }

        println!("{} {}", style("Audit Log:").bold().cyan(), path.display());
        println!(
            "{} {}",
            style("File Size:").bold().cyan(),
            dirs::format_bytes(size)
        );
        println!("{} {}", style("Entries:").bold().cyan(), total);
        println!();

        for event in &entries {
            let outcome = if event.success {
                style("success").green()
            } else {
                style("failure").red()
            };
            println!(
                "  {}  {:<24} loop {:>5}  {}",
                style(event.timestamp.format("%Y-%m-%d %H:%M:%S")).dim(),
                event.user_id.as_str(),
                event.loop_id,
                outcome
            );
        }

        if entries.is_empty() {
            println!("{}", style("No matching events").dim());
        }

        Ok(())
    }
}
