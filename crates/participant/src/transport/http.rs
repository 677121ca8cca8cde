//! HTTP coordinator transport.

use async_trait::async_trait;
use common::SessionId;
use reqwest::StatusCode;
use uuid::Uuid;

use crate::transport::{
    CoordinatorError, CoordinatorTransport, JoinRequest, ParticipationRecord, PartialCommitRequest,
};

/// Coordinator client speaking JSON over HTTP.
///
/// Status mapping: 404 session unknown, 409 duplicate participant
/// (body carries the existing record), 410 session aborted, 5xx and
/// transport faults transient. Anything else unexpected is a protocol
/// error and is not retried.
#[derive(Debug, Clone)]
pub struct HttpCoordinator {
    base_url: String,
    http: reqwest::Client,
}

impl HttpCoordinator {
    /// Creates a client against the coordinator base URL
    /// (e.g. `http://transcoorditor:8000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn join_url(&self, session_id: &SessionId) -> String {
        format!("{}/sessions/{}/participants", self.base_url, session_id)
    }

    fn commit_url(&self, session_id: &SessionId, participation_id: Uuid) -> String {
        format!(
            "{}/sessions/{}/participants/{}/partial-commit",
            self.base_url, session_id, participation_id
        )
    }
}

/// Maps a non-success status to a coordinator error. The 409 duplicate
/// case is handled by the caller because it needs the response body.
fn classify_status(status: StatusCode, session_id: &SessionId) -> CoordinatorError {
    match status {
        StatusCode::NOT_FOUND => CoordinatorError::SessionNotFound(session_id.clone()),
        StatusCode::GONE => CoordinatorError::SessionAborted(session_id.clone()),
        s if s.is_server_error() => {
            CoordinatorError::Unavailable(format!("coordinator returned {s}"))
        }
        s => CoordinatorError::Protocol(format!("unexpected coordinator status {s}")),
    }
}

fn transport_error(err: reqwest::Error) -> CoordinatorError {
    CoordinatorError::Unavailable(err.to_string())
}

#[async_trait]
impl CoordinatorTransport for HttpCoordinator {
    async fn join_session(
        &self,
        session_id: &SessionId,
        request: &JoinRequest,
    ) -> Result<ParticipationRecord, CoordinatorError> {
        let response = self
            .http
            .post(self.join_url(session_id))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ParticipationRecord>()
                .await
                .map_err(|e| CoordinatorError::Protocol(format!("malformed join reply: {e}")));
        }

        if status == StatusCode::CONFLICT {
            let existing = response
                .json::<ParticipationRecord>()
                .await
                .map_err(|e| CoordinatorError::Protocol(format!("malformed conflict reply: {e}")))?;
            return Err(CoordinatorError::DuplicateParticipant(Box::new(existing)));
        }

        Err(classify_status(status, session_id))
    }

    async fn partial_commit(
        &self,
        session_id: &SessionId,
        participation_id: Uuid,
        request: &PartialCommitRequest,
    ) -> Result<(), CoordinatorError> {
        let response = self
            .http
            .post(self.commit_url(session_id, participation_id))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(classify_status(status, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let session = SessionId::new("s1");

        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, &session),
            CoordinatorError::SessionNotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::GONE, &session),
            CoordinatorError::SessionAborted(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, &session),
            CoordinatorError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, &session),
            CoordinatorError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, &session),
            CoordinatorError::Protocol(_)
        ));
    }

    #[test]
    fn test_url_construction() {
        let client = HttpCoordinator::new("http://transcoorditor:8000/");
        let session = SessionId::new("s1");
        assert_eq!(
            client.join_url(&session),
            "http://transcoorditor:8000/sessions/s1/participants"
        );

        let pid = Uuid::nil();
        assert_eq!(
            client.commit_url(&session, pid),
            format!("http://transcoorditor:8000/sessions/s1/participants/{pid}/partial-commit")
        );
    }
}
