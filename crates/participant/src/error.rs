//! Participant error taxonomy.

use charge::ChargeError;
use common::SessionId;
use thiserror::Error;

/// Errors that can occur during saga-participant operations.
///
/// Transient coordinator faults (`Unavailable`) are retried inside the
/// client and only surface once the retry budget is exhausted; every
/// other kind propagates to the caller unchanged so the service
/// boundary can map it to a status code.
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// Bad input; never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Coordinator unreachable after exhausting the retry budget.
    #[error("Transaction coordinator unavailable: {0}")]
    Unavailable(String),

    /// The coordinator does not know the session; fatal, not retried.
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The coordinator already decided to abort the session. The local
    /// action, if it ran, must be compensated synchronously by the
    /// caller.
    #[error("Session aborted by coordinator: {0}")]
    SessionAborted(SessionId),

    /// The local action executed but its compensation could not be
    /// registered before the retry budget ran out. The charge happened
    /// and the coordinator does not know how to undo it; operators
    /// must reconcile.
    #[error(
        "Compensation registration failed for session {session_id} after {attempts} attempts; \
         local transaction {transaction_id} is unresolved"
    )]
    CompensationRegistrationFailed {
        session_id: SessionId,
        transaction_id: String,
        attempts: u32,
    },

    /// The coordinator replied with something this client cannot
    /// interpret; not retried.
    #[error("Coordinator protocol error: {0}")]
    Protocol(String),

    /// Domain error from the local charge; returned as-is.
    #[error(transparent)]
    Charge(#[from] ChargeError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for participant results.
pub type Result<T> = std::result::Result<T, ParticipantError>;
