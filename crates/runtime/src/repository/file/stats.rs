//! File-based StatsRepository implementation.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use escape_core::{LeaderboardLimit, UserId, UserStats};
use sha2::{Digest, Sha256};

use crate::repository::record::{StoredStats, rank};
use crate::repository::{RepositoryError, Result, StatsRepository};

const RECORD_EXT: &str = "bin";

/// Directory of record files inside the data directory.
pub const USERS_DIR: &str = "users";

/// File-based implementation of StatsRepository.
///
/// Stores one record per user as a bincode file.
///
/// # File Format
///
/// Records are stored as `users/{hex(sha256(user_id))}.bin`. The digest gives
/// every user id a fixed-length, filesystem-safe name that serves as the
/// unique key. The id itself lives inside the record and is checked on load.
///
/// - creation writes a temp file and hard-links it into place, which fails
///   if the name already exists
/// - updates write a temp file and rename it over the old record
pub struct FileStatsRepository {
    users_dir: PathBuf,
    next_seq: AtomicU64,
}

impl FileStatsRepository {
    /// Open (or create) a repository rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let users_dir = base_dir.as_ref().join(USERS_DIR);
        fs::create_dir_all(&users_dir).map_err(RepositoryError::Io)?;

        let repo = Self {
            users_dir,
            next_seq: AtomicU64::new(0),
        };

        let next = repo
            .scan()?
            .iter()
            .map(|record| record.created_seq + 1)
            .max()
            .unwrap_or(0);
        repo.next_seq.store(next, Ordering::SeqCst);

        tracing::debug!(
            "Opened stats repository at {} (next seq {})",
            repo.users_dir.display(),
            next
        );

        Ok(repo)
    }

    /// Directory holding the record files.
    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    fn file_stem(user_id: &UserId) -> String {
        hex::encode(Sha256::digest(user_id.as_str().as_bytes()))
    }

    fn record_path(&self, user_id: &UserId) -> PathBuf {
        self.users_dir
            .join(format!("{}.{}", Self::file_stem(user_id), RECORD_EXT))
    }

    fn temp_path(&self, user_id: &UserId, seq: u64) -> PathBuf {
        self.users_dir.join(format!(
            "{}.{}.{}.tmp",
            Self::file_stem(user_id),
            std::process::id(),
            seq
        ))
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    fn write_temp(&self, record: &StoredStats, temp_path: &Path) -> Result<()> {
        let bytes = bincode::serialize(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(temp_path, bytes).map_err(RepositoryError::Io)
    }

    /// Read and check one record file.
    pub fn read_record(path: &Path) -> Result<Option<StoredStats>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e)),
        };

        let record: StoredStats = bincode::deserialize(&bytes).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;

        record
            .stats
            .validate()
            .map_err(|violation| RepositoryError::InvalidRecord {
                user_id: record.stats.user_id.to_string(),
                violation,
            })?;

        Ok(Some(record))
    }

    fn load_record(&self, user_id: &UserId) -> Result<Option<StoredStats>> {
        let path = self.record_path(user_id);
        let record = Self::read_record(&path)?;

        if let Some(record) = &record
            && &record.stats.user_id != user_id
        {
            return Err(RepositoryError::CorruptedData(format!(
                "{} holds the record of {}",
                path.display(),
                record.stats.user_id
            )));
        }

        Ok(record)
    }

    /// Every stored record, in directory order.
    pub fn scan(&self) -> Result<Vec<StoredStats>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.users_dir).map_err(RepositoryError::Io)? {
            let path = entry.map_err(RepositoryError::Io)?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(record) = Self::read_record(&path)? {
                records.push(record);
            }
        }

        Ok(records)
    }
}

impl StatsRepository for FileStatsRepository {
    fn load(&self, user_id: &UserId) -> Result<Option<UserStats>> {
        Ok(self.load_record(user_id)?.map(|record| record.stats))
    }

    fn insert_new(&self, stats: &UserStats) -> Result<bool> {
        let path = self.record_path(&stats.user_id);
        let seq = self.take_seq();
        let temp_path = self.temp_path(&stats.user_id, seq);

        self.write_temp(&StoredStats::new(seq, stats.clone()), &temp_path)?;

        // Atomic link: fails if the record already exists
        let linked = fs::hard_link(&temp_path, &path);
        let _ = fs::remove_file(&temp_path);

        match linked {
            Ok(()) => {
                tracing::debug!("Created record for {} (seq {})", stats.user_id, seq);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    fn upsert(&self, stats: &UserStats) -> Result<()> {
        let created_seq = match self.load_record(&stats.user_id)? {
            Some(existing) => existing.created_seq,
            None => self.take_seq(),
        };

        let path = self.record_path(&stats.user_id);
        let temp_path = self.temp_path(&stats.user_id, self.take_seq());

        self.write_temp(&StoredStats::new(created_seq, stats.clone()), &temp_path)?;

        // Atomic rename
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(RepositoryError::Io(e));
        }

        tracing::debug!("Saved record for {} to {}", stats.user_id, path.display());

        Ok(())
    }

    fn top_n(&self, limit: LeaderboardLimit) -> Result<Vec<UserStats>> {
        Ok(rank(self.scan()?, limit.get()))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.scan()?.len())
    }
}
