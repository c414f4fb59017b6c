//! Platform-specific directory utilities
//!
//! Resolves the same data and log directories the `escape` binary uses,
//! honoring its environment overrides.

use std::path::PathBuf;

/// Get the log directory for the escape tracker
///
/// `ESCAPE_LOG_DIR` if set, otherwise the platform cache directory:
/// - macOS: `~/Library/Caches/escape/logs`
/// - Linux: `~/.cache/escape/logs` (or `$XDG_CACHE_HOME/escape/logs`)
/// - Windows: `%LOCALAPPDATA%\escape\cache\logs`
pub fn log_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("ESCAPE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("", "", "escape")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./escape_data/logs"))
}

/// Get the data directory for the escape tracker
///
/// `ESCAPE_DATA_DIR` if set, otherwise the platform data directory:
/// - macOS: `~/Library/Application Support/escape`
/// - Linux: `~/.local/share/escape` (or `$XDG_DATA_HOME/escape`)
/// - Windows: `%APPDATA%\escape\data`
/// - Fallback: `./escape_data`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("ESCAPE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("", "", "escape")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./escape_data"))
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
