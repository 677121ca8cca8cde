//! Coordinator transport: the wire boundary this participant consumes.
//!
//! The coordinator's own state machine is out of scope; this module
//! only defines the two calls a participant makes against it, plus an
//! in-memory double for tests and a reqwest-backed client for real
//! deployments.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use common::{ClientId, RequestId, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::compensation::Compensation;

/// Request body for joining a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(rename = "clientId")]
    pub client_id: ClientId,
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
}

/// The coordinator's view of one participation.
///
/// On a fresh join `committed` is false. When the same
/// (client, request) pair joins again, the coordinator hands back the
/// existing record instead of creating a new one; if that participant
/// already partial-committed, the record carries the payload it
/// committed with, so the caller can replay the prior result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipationRecord {
    pub participation_id: Uuid,
    pub committed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_result: Option<serde_json::Value>,
}

/// Request body for registering compensation and reporting partial
/// commit in one round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialCommitRequest {
    pub compensate: Compensation,
    /// The participant's success payload, stored by the coordinator
    /// and returned on duplicate joins.
    pub result: serde_json::Value,
}

/// Failures reported by (or on the way to) the coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Transient network or coordinator fault; safe to retry with the
    /// same request id.
    #[error("coordinator unavailable: {0}")]
    Unavailable(String),

    /// The session is unknown to the coordinator.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    /// The coordinator already decided to abort the session.
    #[error("session aborted: {0}")]
    SessionAborted(SessionId),

    /// This (client, request) pair already joined; carries the
    /// existing record.
    #[error("participant already joined the session")]
    DuplicateParticipant(Box<ParticipationRecord>),

    /// Reply this client cannot interpret; not retryable.
    #[error("coordinator protocol error: {0}")]
    Protocol(String),
}

impl CoordinatorError {
    /// Returns true if retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoordinatorError::Unavailable(_))
    }
}

/// The two coordinator calls a saga participant makes.
///
/// Implementations are stateless per call and safe for unsynchronized
/// concurrent use; every call carries its own session and participation
/// identifiers.
#[async_trait]
pub trait CoordinatorTransport: Send + Sync {
    /// Registers this participant in the session.
    async fn join_session(
        &self,
        session_id: &SessionId,
        request: &JoinRequest,
    ) -> Result<ParticipationRecord, CoordinatorError>;

    /// Durably registers the compensation and reports partial commit,
    /// atomically from the participant's point of view.
    async fn partial_commit(
        &self,
        session_id: &SessionId,
        participation_id: Uuid,
        request: &PartialCommitRequest,
    ) -> Result<(), CoordinatorError>;
}
