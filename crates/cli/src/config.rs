//! CLI configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use escape_core::LeaderboardLimit;
use escape_runtime::ServiceConfig;

/// Shared secret used when `ESCAPE_API_KEY` is not set.
pub const DEFAULT_API_KEY: &str = "doomstop-secret-token";

/// Where statistics and the audit trail are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

/// Configuration required to bootstrap the service.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub api_key: String,
    pub storage: StorageKind,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub service: ServiceConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            storage: StorageKind::default(),
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            catalog_path: None,
            service: ServiceConfig::default(),
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ESCAPE_API_KEY` - Shared secret clients must present (default: `doomstop-secret-token`)
    /// - `ESCAPE_STORAGE` - `file` or `memory` (default: file)
    /// - `ESCAPE_DATA_DIR` - Directory for stats and audit data (default: platform-specific)
    /// - `ESCAPE_LOG_DIR` - Directory for log files (default: platform-specific)
    /// - `ESCAPE_LEADERBOARD_LIMIT` - Default leaderboard size (default: 10)
    /// - `ESCAPE_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `ESCAPE_CATALOG_PATH` - RON loop catalog (default: built-in loops)
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = env::var("ESCAPE_API_KEY")
            && !key.is_empty()
        {
            config.api_key = key;
        }

        if let Some(storage) = read_env::<StorageKind>("ESCAPE_STORAGE") {
            config.storage = storage;
        }

        if let Some(dir) = read_env::<PathBuf>("ESCAPE_DATA_DIR") {
            config.data_dir = dir;
        }

        if let Some(dir) = read_env::<PathBuf>("ESCAPE_LOG_DIR") {
            config.log_dir = dir;
        }

        if let Some(limit) = read_env::<i64>("ESCAPE_LEADERBOARD_LIMIT")
            .and_then(|requested| LeaderboardLimit::new(requested).ok())
        {
            config.service.default_leaderboard_limit = limit;
        }

        if let Some(capacity) = read_env::<usize>("ESCAPE_EVENT_BUFFER") {
            config.service.event_buffer_size = capacity.max(1);
        }

        config.catalog_path = read_env::<PathBuf>("ESCAPE_CATALOG_PATH");

        config
    }
}

/// Platform data directory, `./escape_data` if none can be determined.
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "escape")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./escape_data"))
}

/// Platform cache directory for logs.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "escape")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./escape_data/logs"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
