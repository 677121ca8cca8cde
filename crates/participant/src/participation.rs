//! Participation record.

use common::{ClientId, RequestId, SessionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::ParticipationState;
use crate::transport::ParticipationRecord;

/// This participant's membership in one session.
///
/// Tracks the per-request state machine locally; the coordinator holds
/// the authoritative copy. A participation built from a duplicate join
/// of an already-committed participant starts out in the terminal
/// state with the recorded payload attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participation {
    session_id: SessionId,
    client_id: ClientId,
    request_id: RequestId,
    participation_id: Uuid,
    state: ParticipationState,
    /// Payload recorded at partial commit, present once committed.
    committed_payload: Option<serde_json::Value>,
}

impl Participation {
    /// Builds a participation from a coordinator join reply.
    pub fn from_record(
        session_id: SessionId,
        client_id: ClientId,
        request_id: RequestId,
        record: ParticipationRecord,
    ) -> Self {
        let state = if record.committed {
            ParticipationState::CompensationRegistered
        } else {
            ParticipationState::Joined
        };
        Self {
            session_id,
            client_id,
            request_id,
            participation_id: record.participation_id,
            state,
            committed_payload: record.committed_result,
        }
    }

    /// Returns the session this participation belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the client identifier used to join.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the idempotency key used to join.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Returns the coordinator-assigned participation identifier.
    pub fn participation_id(&self) -> Uuid {
        self.participation_id
    }

    /// Returns the current state.
    pub fn state(&self) -> ParticipationState {
        self.state
    }

    /// Returns the payload recorded at partial commit, if committed.
    pub fn committed_payload(&self) -> Option<&serde_json::Value> {
        self.committed_payload.as_ref()
    }

    /// Records that the irreversible local action has executed.
    pub(crate) fn mark_local_action_done(&mut self) {
        self.state = ParticipationState::LocalActionDone;
    }

    /// Records that the compensation round trip completed.
    pub(crate) fn mark_registered(&mut self, payload: serde_json::Value) {
        self.state = ParticipationState::CompensationRegistered;
        self.committed_payload = Some(payload);
    }
}
