//! Core domain errors.

use thiserror::Error;

/// Core domain errors for ktbuild.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Unknown dependency policy name.
    #[error("Unknown dependency policy '{0}', expected one of: off, warn, error")]
    UnknownPolicy(String),

    /// Unknown dependency kind name.
    #[error("Unknown dependency kind '{0}'")]
    UnknownKind(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
