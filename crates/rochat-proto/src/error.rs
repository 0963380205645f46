//! Protocol error types.
//!
//! Decode failures are diagnostic data, not fatal conditions: the connection
//! manager drops the offending frame with a warning and keeps running.

use thiserror::Error;

/// Errors produced by the wire codec.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not valid JSON or is missing required fields.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame parsed as JSON but carries no `type` field.
    #[error("frame has no type field")]
    MissingKind,

    /// Frame `type` is not one this client understands.
    ///
    /// Unknown kinds are ignored by contract, so this is the one decode
    /// outcome that is expected during normal operation against a newer
    /// server.
    #[error("unknown frame type: {0}")]
    UnknownKind(String),
}
