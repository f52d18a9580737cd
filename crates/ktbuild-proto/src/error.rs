//! Conversion errors.

use thiserror::Error;

/// Errors converting wire messages into domain types.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The bytes are not a valid message.
    #[error("Malformed message: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A dependency carried a kind value outside the known enum.
    #[error("Unknown dependency kind {kind} for '{path}'")]
    UnknownKind { path: String, kind: i32 },
}
