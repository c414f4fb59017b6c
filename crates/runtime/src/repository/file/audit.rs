//! Append-only audit log file.
//!
//! Each completion event is stored as a length-prefixed bincode frame:
//! ```text
//! [u32 length][bincode serialized CompletionEvent]
//! [u32 length][bincode serialized CompletionEvent]
//! ...
//! ```

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use escape_core::CompletionEvent;

use crate::repository::{AuditRepository, RepositoryError, Result};

/// Default filename of the audit log inside the data directory.
pub const AUDIT_LOG_FILE: &str = "audit.log";

struct Writer {
    file: BufWriter<File>,
    /// End of the last complete frame.
    offset: u64,
    entries: u64,
}

impl Writer {
    fn write_frame(&mut self, len: u32, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(&len.to_le_bytes())?;
        self.file.write_all(bytes)?;
        self.file.flush()
    }

    /// Drop any buffered partial frame and cut the file back to the last
    /// complete one.
    fn rollback(&mut self, path: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().append(true).open(path)?;
        file.set_len(self.offset)?;

        let torn = std::mem::replace(&mut self.file, BufWriter::new(file));
        let _ = torn.into_parts();
        Ok(())
    }
}

/// File-backed audit trail.
///
/// Every append is flushed before returning, so an acknowledged event
/// survives a process crash.
pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<Writer>,
}

impl FileAuditLog {
    /// Open the log in `base_dir`, creating the directory and file if needed.
    pub fn open_or_create(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir).map_err(RepositoryError::Io)?;

        let path = base_dir.join(AUDIT_LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(RepositoryError::Io)?;

        let offset = file.metadata().map_err(RepositoryError::Io)?.len();
        let entries = AuditLogReader::new(&path).count()?;

        tracing::debug!(
            "Opened audit log: {} at offset {} ({} entries)",
            path.display(),
            offset,
            entries
        );

        Ok(Self {
            path,
            writer: Mutex::new(Writer {
                file: BufWriter::new(file),
                offset,
                entries,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reader over the entries written so far.
    pub fn reader(&self) -> AuditLogReader {
        AuditLogReader::new(&self.path)
    }
}

impl AuditRepository for FileAuditLog {
    fn append(&self, event: &CompletionEvent) -> Result<()> {
        let bytes =
            bincode::serialize(event).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| RepositoryError::Serialization("audit entry too large".into()))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        if let Err(e) = writer.write_frame(len, &bytes) {
            if let Err(rollback) = writer.rollback(&self.path) {
                tracing::warn!(
                    "Failed to roll back audit log '{}' to offset {}: {}",
                    self.path.display(),
                    writer.offset,
                    rollback
                );
            }
            return Err(RepositoryError::Io(e));
        }

        writer.offset += 4 + u64::from(len);
        writer.entries += 1;

        Ok(())
    }

    fn len(&self) -> Result<u64> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(writer.entries)
    }
}

impl Drop for FileAuditLog {
    fn drop(&mut self) {
        if let Ok(writer) = self.writer.get_mut()
            && let Err(e) = writer.file.flush()
        {
            tracing::warn!("Failed to flush audit log '{}' on drop: {}", self.path.display(), e);
        }
    }
}

/// Read-only view of an audit log file.
///
/// Opens its own file handle per read, so it never interferes with a
/// writer appending to the same file.
#[derive(Clone, Debug)]
pub struct AuditLogReader {
    path: PathBuf,
}

impl AuditLogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the log in bytes, zero if it does not exist yet.
    pub fn size(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(RepositoryError::Io(e)),
        }
    }

    /// Read the entry at a byte offset.
    ///
    /// Returns `None` at or past the end of the log, otherwise the entry and
    /// the offset of the next one.
    pub fn read_at_offset(&self, byte_offset: u64) -> Result<Option<(CompletionEvent, u64)>> {
        let file_size = self.size()?;
        if byte_offset >= file_size {
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(RepositoryError::Io)?;
        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(byte_offset))
            .map_err(RepositoryError::Io)?;

        let mut len_bytes = [0u8; 4];
        reader
            .read_exact(&mut len_bytes)
            .map_err(|e| truncated(e, byte_offset, file_size))?;
        let len = u32::from_le_bytes(len_bytes) as u64;

        let next_offset = byte_offset + 4 + len;
        if next_offset > file_size {
            return Err(RepositoryError::InvalidOffset {
                offset: next_offset,
                file_size,
            });
        }

        let mut data = vec![0u8; len as usize];
        reader
            .read_exact(&mut data)
            .map_err(|e| truncated(e, byte_offset, file_size))?;

        let event = bincode::deserialize(&data).map_err(|e| {
            RepositoryError::CorruptedData(format!("audit entry at {}: {}", byte_offset, e))
        })?;

        Ok(Some((event, next_offset)))
    }

    /// Every entry in the log, oldest first.
    pub fn entries(&self) -> Result<Vec<CompletionEvent>> {
        let mut entries = Vec::new();
        let mut offset = 0;
        while let Some((event, next)) = self.read_at_offset(offset)? {
            entries.push(event);
            offset = next;
        }
        Ok(entries)
    }

    /// Number of entries in the log.
    pub fn count(&self) -> Result<u64> {
        let mut count = 0;
        let mut offset = 0;
        while let Some((_, next)) = self.read_at_offset(offset)? {
            count += 1;
            offset = next;
        }
        Ok(count)
    }
}

fn truncated(e: std::io::Error, offset: u64, file_size: u64) -> RepositoryError {
    if e.kind() == ErrorKind::UnexpectedEof {
        RepositoryError::InvalidOffset { offset, file_size }
    } else {
        RepositoryError::Io(e)
    }
}
