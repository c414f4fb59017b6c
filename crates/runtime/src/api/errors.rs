//! Unified error types surfaced by the service API.
//!
//! Wraps failures from authorization, input validation, repositories and the
//! loop catalog so a transport layer can map them to one status each.
use std::fmt;

use thiserror::Error;

use escape_content::CatalogError;
use escape_core::ValidationError;

use crate::auth::AuthError;
pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("storage unavailable")]
    Storage(#[from] RepositoryError),

    #[error("loop catalog unavailable")]
    Catalog(#[from] CatalogError),

    #[error("service requires an authorizer to be configured before building")]
    MissingAuthorizer,
}

/// Coarse class of a [`ServiceError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    MissingCredential,
    InvalidCredential,
    StorageUnavailable,
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unauthorized(AuthError::MissingCredential) => {
                ErrorKind::MissingCredential
            }
            ServiceError::Unauthorized(AuthError::InvalidCredential) => {
                ErrorKind::InvalidCredential
            }
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::Storage(_) => ErrorKind::StorageUnavailable,
            ServiceError::Catalog(_) | ServiceError::MissingAuthorizer => ErrorKind::Internal,
        }
    }

    /// HTTP-style status for a transport layer.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::MissingCredential => 401,
            ErrorKind::InvalidCredential => 403,
            ErrorKind::StorageUnavailable => 503,
            ErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::MissingCredential => "missing_credential",
            ErrorKind::InvalidCredential => "invalid_credential",
            ErrorKind::StorageUnavailable => "storage_unavailable",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", label)
    }
}
