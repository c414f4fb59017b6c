//! Error types raised by repository implementations.

use thiserror::Error;

use escape_core::InvariantViolation;

/// Errors surfaced by repository implementations.
///
/// Every variant means the storage medium could not serve the request; the
/// service reports all of them as storage unavailability.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("stored record for {user_id} is inconsistent: {violation}")]
    InvalidRecord {
        user_id: String,
        #[source]
        violation: InvariantViolation,
    },

    #[error("invalid offset {offset} for file size {file_size}")]
    InvalidOffset { offset: u64, file_size: u64 },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
