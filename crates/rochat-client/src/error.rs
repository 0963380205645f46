//! Error types for the connection manager.
//!
//! Almost nothing here is an error to the caller: transport loss retries,
//! malformed frames drop with a diagnostic, and a full queue surfaces a
//! typed rejection event. What remains is caller misuse of the lifecycle.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Errors from driving the connection state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Operation is not legal in the current state, e.g. a connect request
    /// while already connected.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// State when the operation was attempted.
        state: ConnectionState,
        /// Operation that was attempted.
        operation: &'static str,
    },
}
