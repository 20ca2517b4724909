//! Centralized error types for the Warden workspace.

use thiserror::Error;

/// Top-level error enum. Variants map to subsystems.
///
/// Expected absence (missing group, missing edge) is never an error: lookups
/// return `Ok(None)`, existence checks return `Ok(false)`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WardenError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WardenResult<T> = Result<T, WardenError>;
