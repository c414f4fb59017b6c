//! Request authorization.
//!
//! Every stats operation passes the caller's credential through an
//! [`Authorizer`] before any record is touched.

use sha2::{Digest, Sha256};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential, or one not in `Bearer <token>` form.
    #[error("missing or malformed credential")]
    MissingCredential,

    #[error("invalid credential")]
    InvalidCredential,
}

/// Decides whether a credential may use the service.
pub trait Authorizer: Send + Sync {
    /// `credential` is the raw `Authorization`-style value, if the caller sent one.
    fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError>;
}

/// Accepts a single shared bearer token.
///
/// Only the SHA-256 digest of the secret is kept, and presented tokens are
/// compared digest to digest without early exit.
pub struct SharedSecretAuthorizer {
    digest: [u8; 32],
}

impl SharedSecretAuthorizer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            digest: Sha256::digest(secret.as_ref()).into(),
        }
    }
}

impl std::fmt::Debug for SharedSecretAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuthorizer").finish_non_exhaustive()
    }
}

impl Authorizer for SharedSecretAuthorizer {
    fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError> {
        let token = credential
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let presented: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        let diff = presented
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

/// Bearer header value for a token, as clients send it.
pub fn bearer(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}
