//! Public service API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the service and storage layers can stay focused on their own concerns.

pub mod errors;
pub mod request;

pub use errors::{ErrorKind, Result, ServiceError};
pub use request::CompletionRequest;
