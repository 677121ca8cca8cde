//! In-memory coordinator double for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ClientId, RequestId, SessionId};
use uuid::Uuid;

use crate::compensation::Compensation;
use crate::transport::{
    CoordinatorError, CoordinatorTransport, JoinRequest, ParticipationRecord, PartialCommitRequest,
};

#[derive(Debug, Clone)]
struct StoredParticipation {
    participation_id: Uuid,
    committed: bool,
    compensation: Option<Compensation>,
    committed_result: Option<serde_json::Value>,
}

impl StoredParticipation {
    fn to_record(&self) -> ParticipationRecord {
        ParticipationRecord {
            participation_id: self.participation_id,
            committed: self.committed,
            committed_result: self.committed_result.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    aborted: bool,
    participants: HashMap<(ClientId, RequestId), StoredParticipation>,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    sessions: HashMap<SessionId, SessionState>,
    fail_joins: u32,
    fail_commits: u32,
    abort_on_commit: bool,
    join_calls: u32,
    commit_calls: u32,
}

/// In-memory transaction coordinator for testing.
///
/// Models the coordinator behavior this participant depends on:
/// session registry, duplicate detection on (client, request), stored
/// commit payloads, and abort decisions. Fault injection makes the
/// next N calls of either kind fail as `Unavailable`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoordinator {
    state: Arc<RwLock<CoordinatorState>>,
}

impl InMemoryCoordinator {
    /// Creates a new in-memory coordinator with no sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session so participants can join it.
    pub fn create_session(&self, session_id: impl Into<SessionId>) {
        self.state
            .write()
            .unwrap()
            .sessions
            .entry(session_id.into())
            .or_default();
    }

    /// Marks a session aborted; subsequent joins and commits against it
    /// fail with `SessionAborted`.
    pub fn abort_session(&self, session_id: &SessionId) {
        if let Some(session) = self.state.write().unwrap().sessions.get_mut(session_id) {
            session.aborted = true;
        }
    }

    /// Makes the next `n` join calls fail as `Unavailable`.
    pub fn fail_next_joins(&self, n: u32) {
        self.state.write().unwrap().fail_joins = n;
    }

    /// Makes the next `n` partial-commit calls fail as `Unavailable`.
    pub fn fail_next_commits(&self, n: u32) {
        self.state.write().unwrap().fail_commits = n;
    }

    /// Aborts the target session at the next partial-commit call,
    /// modeling a coordinator that decided to abort after the join
    /// (sibling failure, timeout) while this participant was charging.
    pub fn abort_on_next_commit(&self) {
        self.state.write().unwrap().abort_on_commit = true;
    }

    /// Returns how many join calls were received, including failed ones.
    pub fn join_count(&self) -> u32 {
        self.state.read().unwrap().join_calls
    }

    /// Returns how many partial-commit calls were received, including
    /// failed ones.
    pub fn commit_count(&self) -> u32 {
        self.state.read().unwrap().commit_calls
    }

    /// Returns the number of participants in a session.
    pub fn participant_count(&self, session_id: &SessionId) -> usize {
        self.state
            .read()
            .unwrap()
            .sessions
            .get(session_id)
            .map(|s| s.participants.len())
            .unwrap_or(0)
    }

    /// Returns the compensation registered by a participant, if any.
    pub fn registered_compensation(
        &self,
        session_id: &SessionId,
        client_id: &ClientId,
        request_id: &RequestId,
    ) -> Option<Compensation> {
        self.state
            .read()
            .unwrap()
            .sessions
            .get(session_id)?
            .participants
            .get(&(client_id.clone(), request_id.clone()))?
            .compensation
            .clone()
    }
}

#[async_trait]
impl CoordinatorTransport for InMemoryCoordinator {
    async fn join_session(
        &self,
        session_id: &SessionId,
        request: &JoinRequest,
    ) -> Result<ParticipationRecord, CoordinatorError> {
        let mut state = self.state.write().unwrap();
        state.join_calls += 1;

        if state.fail_joins > 0 {
            state.fail_joins -= 1;
            return Err(CoordinatorError::Unavailable(
                "injected join failure".to_string(),
            ));
        }

        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CoordinatorError::SessionNotFound(session_id.clone()))?;

        if session.aborted {
            return Err(CoordinatorError::SessionAborted(session_id.clone()));
        }

        let key = (request.client_id.clone(), request.request_id.clone());
        if let Some(existing) = session.participants.get(&key) {
            return Err(CoordinatorError::DuplicateParticipant(Box::new(
                existing.to_record(),
            )));
        }

        let stored = StoredParticipation {
            participation_id: Uuid::new_v4(),
            committed: false,
            compensation: None,
            committed_result: None,
        };
        let record = stored.to_record();
        session.participants.insert(key, stored);
        Ok(record)
    }

    async fn partial_commit(
        &self,
        session_id: &SessionId,
        participation_id: Uuid,
        request: &PartialCommitRequest,
    ) -> Result<(), CoordinatorError> {
        let mut state = self.state.write().unwrap();
        state.commit_calls += 1;

        if state.abort_on_commit {
            state.abort_on_commit = false;
            if let Some(session) = state.sessions.get_mut(session_id) {
                session.aborted = true;
            }
        }

        if state.fail_commits > 0 {
            state.fail_commits -= 1;
            return Err(CoordinatorError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| CoordinatorError::SessionNotFound(session_id.clone()))?;

        if session.aborted {
            return Err(CoordinatorError::SessionAborted(session_id.clone()));
        }

        let stored = session
            .participants
            .values_mut()
            .find(|p| p.participation_id == participation_id)
            .ok_or_else(|| {
                CoordinatorError::Protocol(format!("unknown participation {participation_id}"))
            })?;

        // A retried commit with the same participation is a no-op
        if !stored.committed {
            stored.committed = true;
            stored.compensation = Some(request.compensate.clone());
            stored.committed_result = Some(request.result.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_request() -> JoinRequest {
        JoinRequest {
            client_id: ClientId::new("paymentservice"),
            request_id: RequestId::new("4242424242424242"),
        }
    }

    fn commit_request() -> PartialCommitRequest {
        PartialCommitRequest {
            compensate: Compensation::new(
                "http://paymentservice:8181/compensate",
                serde_json::json!({}),
            )
            .unwrap(),
            result: serde_json::json!({ "transaction_id": "tx-001" }),
        }
    }

    #[tokio::test]
    async fn test_join_and_commit() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());

        let record = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap();
        assert!(!record.committed);

        coordinator
            .partial_commit(&session, record.participation_id, &commit_request())
            .await
            .unwrap();

        assert!(
            coordinator
                .registered_compensation(
                    &session,
                    &ClientId::new("paymentservice"),
                    &RequestId::new("4242424242424242"),
                )
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_unknown_session_rejected() {
        let coordinator = InMemoryCoordinator::new();
        let err = coordinator
            .join_session(&SessionId::new("missing"), &join_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_join_returns_existing_record() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());

        let first = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap();
        let err = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap_err();

        match err {
            CoordinatorError::DuplicateParticipant(existing) => {
                assert_eq!(existing.participation_id, first.participation_id);
            }
            other => panic!("expected DuplicateParticipant, got {other:?}"),
        }
        assert_eq!(coordinator.participant_count(&session), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_after_commit_carries_result() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());

        let record = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap();
        coordinator
            .partial_commit(&session, record.participation_id, &commit_request())
            .await
            .unwrap();

        let err = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap_err();
        match err {
            CoordinatorError::DuplicateParticipant(existing) => {
                assert!(existing.committed);
                assert_eq!(
                    existing.committed_result.unwrap()["transaction_id"],
                    "tx-001"
                );
            }
            other => panic!("expected DuplicateParticipant, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_aborted_session_rejects_joins_and_commits() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());

        let record = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap();
        coordinator.abort_session(&session);

        let err = coordinator
            .partial_commit(&session, record.participation_id, &commit_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CoordinatorError::SessionAborted(_)));

        let other = JoinRequest {
            client_id: ClientId::new("shippingservice"),
            request_id: RequestId::new("order-1"),
        };
        let err = coordinator.join_session(&session, &other).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::SessionAborted(_)));
    }

    #[tokio::test]
    async fn test_fault_injection_counts_down() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());
        coordinator.fail_next_joins(1);

        let err = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap_err();
        assert!(err.is_transient());

        // Next call succeeds
        assert!(coordinator.join_session(&session, &join_request()).await.is_ok());
        assert_eq!(coordinator.join_count(), 2);
    }

    #[tokio::test]
    async fn test_retried_commit_is_idempotent() {
        let coordinator = InMemoryCoordinator::new();
        let session = SessionId::new("s1");
        coordinator.create_session(session.clone());

        let record = coordinator
            .join_session(&session, &join_request())
            .await
            .unwrap();
        coordinator
            .partial_commit(&session, record.participation_id, &commit_request())
            .await
            .unwrap();
        coordinator
            .partial_commit(&session, record.participation_id, &commit_request())
            .await
            .unwrap();
        assert_eq!(coordinator.commit_count(), 2);
    }
}
