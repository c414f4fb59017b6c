//! Remove stored records, the audit trail or log files.
//!
//! With no selection flag every target is removed. Each target is listed
//! with its size before anything is deleted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console::{Term, style};
use escape_runtime::repository::file::{AUDIT_LOG_FILE, USERS_DIR};

use crate::dirs;

/// Remove stored records, the audit trail or log files
#[derive(Parser, Debug)]
pub struct Clean {
    /// Remove per-user stats records (`users/`)
    #[arg(long)]
    pub stats: bool,

    /// Remove the completion audit log (`audit.log`)
    #[arg(long)]
    pub audit: bool,

    /// Remove log files
    #[arg(long)]
    pub logs: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

struct Target {
    label: &'static str,
    path: PathBuf,
}

impl Target {
    fn size(&self) -> u64 {
        disk_usage(&self.path)
    }

    fn remove(&self) -> Result<()> {
        let removed = if self.path.is_dir() {
            fs::remove_dir_all(&self.path)
        } else {
            fs::remove_file(&self.path)
        };
        removed.with_context(|| format!("Failed to remove {}", self.path.display()))
    }
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let all = !(self.stats || self.audit || self.logs);
        let data_dir = dirs::data_dir();

        let targets: Vec<Target> = [
            (self.stats || all, "Stats records", data_dir.join(USERS_DIR)),
            (self.audit || all, "Audit log", data_dir.join(AUDIT_LOG_FILE)),
            (self.logs || all, "Logs", dirs::log_dir()),
        ]
        .into_iter()
        .filter(|(selected, _, path)| *selected && path.exists())
        .map(|(_, label, path)| Target { label, path })
        .collect();

        if targets.is_empty() {
            println!("{}", style("Nothing to remove").dim());
            return Ok(());
        }

        println!("{}", style("About to remove:").yellow().bold());
        for target in &targets {
            println!(
                "  {:<14} {} {}",
                style(target.label).bold(),
                style(target.path.display()).dim(),
                style(format!("({})", dirs::format_bytes(target.size()))).dim()
            );
        }

        if !self.yes && !confirm()? {
            println!("{}", style("Left untouched").dim());
            return Ok(());
        }

        for target in &targets {
            target.remove()?;
            println!("{} {}", style("removed").green(), target.label);
        }

        Ok(())
    }
}

/// Total size of a file, or of every file under a directory.
fn disk_usage(path: &Path) -> u64 {
    let Ok(metadata) = fs::metadata(path) else {
        return 0;
    };
    if !metadata.is_dir() {
        return metadata.len();
    }

    fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| disk_usage(&entry.path()))
                .sum()
        })
        .unwrap_or(0)
}

fn confirm() -> Result<bool> {
    let term = Term::stdout();
    term.write_str(&format!("{} ", style("Continue? [y/N]").yellow()))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
