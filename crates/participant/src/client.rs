//! Participant protocol engine.

use charge::{ChargeProcessor, ChargeRequest, ChargeResult};
use common::{ClientId, RequestId, SessionId};
use serde::Serialize;

use crate::compensation::Compensation;
use crate::error::ParticipantError;
use crate::participation::Participation;
use crate::retry::RetryPolicy;
use crate::session::SessionHandle;
use crate::transport::{
    CoordinatorError, CoordinatorTransport, JoinRequest, PartialCommitRequest,
};

/// Participant-local liveness, independent of coordinator reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    #[serde(rename = "SERVING")]
    Serving,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        "SERVING"
    }
}

/// Drives this service's side of a coordinator-managed session.
///
/// Join, run the local action exactly once, register the compensation
/// together with the partial commit, and surface coordinator decisions
/// to the caller. Stateless per call: one client instance is shared
/// across concurrent requests, each call carrying its own session and
/// participation identifiers. The transport is injected so tests can
/// substitute a coordinator double.
pub struct ParticipantClient<T> {
    transport: T,
    client_id: ClientId,
    retry: RetryPolicy,
}

impl<T: CoordinatorTransport> ParticipantClient<T> {
    /// Creates a client identifying itself to the coordinator as
    /// `client_id`, with the default retry policy.
    pub fn new(transport: T, client_id: ClientId) -> Self {
        Self {
            transport,
            client_id,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy for coordinator communication.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Liveness probe. Succeeds whenever the process accepts requests;
    /// deliberately does not touch the coordinator.
    pub fn check(&self) -> HealthStatus {
        HealthStatus::Serving
    }

    /// Joins a session, registering this participant with the
    /// coordinator.
    ///
    /// Transient faults are retried with the same request id so the
    /// coordinator can deduplicate. A duplicate join is success: the
    /// coordinator's existing record comes back as the participation,
    /// including any payload it already committed with.
    #[tracing::instrument(skip(self), fields(session = %session, client = %self.client_id))]
    pub async fn join(
        &self,
        session: &SessionHandle,
        request_id: &RequestId,
    ) -> Result<Participation, ParticipantError> {
        if request_id.as_str().trim().is_empty() {
            return Err(ParticipantError::InvalidArgument(
                "request id must not be empty".to_string(),
            ));
        }

        let request = JoinRequest {
            client_id: self.client_id.clone(),
            request_id: request_id.clone(),
        };

        metrics::counter!("participant_join_total").increment(1);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.join_session(session.id(), &request).await {
                Ok(record) => {
                    tracing::debug!(participation = %record.participation_id, "joined session");
                    return Ok(Participation::from_record(
                        session.id().clone(),
                        self.client_id.clone(),
                        request_id.clone(),
                        record,
                    ));
                }
                Err(CoordinatorError::DuplicateParticipant(existing)) => {
                    tracing::info!(
                        participation = %existing.participation_id,
                        committed = existing.committed,
                        "duplicate join, reusing existing participation"
                    );
                    return Ok(Participation::from_record(
                        session.id().clone(),
                        self.client_id.clone(),
                        request_id.clone(),
                        *existing,
                    ));
                }
                Err(err) if err.is_transient() && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    metrics::counter!("participant_join_retries_total").increment(1);
                    tracing::warn!(attempt, ?delay, error = %err, "join failed, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(self.map_coordinator_error(err, session.id())),
            }
        }
    }

    /// Registers the compensation and reports partial commit in one
    /// round trip.
    ///
    /// The local action must already have run: there is nothing to
    /// compensate before the effect exists, and the caller must never
    /// be told the charge succeeded before the coordinator durably
    /// knows how to undo it. Only the network leg is retried; retry
    /// exhaustion means the effect exists with no registered reversal,
    /// which surfaces as `CompensationRegistrationFailed` for operator
    /// intervention.
    #[tracing::instrument(skip(self, compensation, result_payload), fields(session = %participation.session_id()))]
    pub async fn register_compensation_and_commit(
        &self,
        participation: &mut Participation,
        compensation: Compensation,
        result_payload: serde_json::Value,
    ) -> Result<(), ParticipantError> {
        if !participation.state().can_register() {
            return Err(ParticipantError::InvalidArgument(format!(
                "cannot register compensation from state {}",
                participation.state()
            )));
        }

        let request = PartialCommitRequest {
            compensate: compensation,
            result: result_payload.clone(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .transport
                .partial_commit(
                    participation.session_id(),
                    participation.participation_id(),
                    &request,
                )
                .await
            {
                Ok(()) => {
                    participation.mark_registered(result_payload);
                    metrics::counter!("participant_commit_total").increment(1);
                    tracing::debug!("compensation registered, partial commit reported");
                    return Ok(());
                }
                Err(err) if err.is_transient() => {
                    if self.retry.should_retry(attempt) {
                        let delay = self.retry.delay_for(attempt);
                        metrics::counter!("participant_commit_retries_total").increment(1);
                        tracing::warn!(attempt, ?delay, error = %err, "registration failed, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    // The charge happened; the coordinator cannot undo it.
                    metrics::counter!("participant_compensation_registration_failed").increment(1);
                    let transaction_id = result_payload
                        .get("transaction_id")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown")
                        .to_string();
                    tracing::error!(
                        attempts = attempt,
                        %transaction_id,
                        "compensation registration exhausted retries; local effect is unresolved"
                    );
                    return Err(ParticipantError::CompensationRegistrationFailed {
                        session_id: participation.session_id().clone(),
                        transaction_id,
                        attempts: attempt,
                    });
                }
                Err(err) => {
                    return Err(self.map_coordinator_error(err, participation.session_id()));
                }
            }
        }
    }

    /// Runs the full saga-participant flow for one charge: join,
    /// execute the charge exactly once, then register compensation and
    /// report partial commit.
    ///
    /// If the coordinator already has a committed participation for
    /// this (client, request) pair, the recorded result is replayed
    /// without charging again.
    #[tracing::instrument(skip(self, processor, request), fields(session = %session, amount = %request.amount))]
    pub async fn charge_in_session(
        &self,
        session: &SessionHandle,
        request_id: &RequestId,
        compensation_uri: &str,
        processor: &ChargeProcessor,
        request: &ChargeRequest,
    ) -> Result<ChargeResult, ParticipantError> {
        let mut participation = self.join(session, request_id).await?;

        if participation.state().is_committed() {
            let payload = participation.committed_payload().ok_or_else(|| {
                ParticipantError::Protocol(
                    "coordinator reported a committed participation without a payload".to_string(),
                )
            })?;
            let result: ChargeResult = serde_json::from_value(payload.clone())?;
            metrics::counter!("participant_replay_total").increment(1);
            tracing::info!(
                transaction = %result.transaction_id,
                "replaying previously committed charge"
            );
            return Ok(result);
        }

        // Local action failure leaves the session joined-but-uncommitted;
        // the coordinator's timeout or abort cleans that up.
        let result = processor.charge(request)?;
        participation.mark_local_action_done();

        let compensation = Compensation::new(compensation_uri, serde_json::to_value(request)?)?;
        let payload = serde_json::to_value(&result)?;
        self.register_compensation_and_commit(&mut participation, compensation, payload)
            .await?;

        Ok(result)
    }

    fn map_coordinator_error(
        &self,
        err: CoordinatorError,
        session_id: &SessionId,
    ) -> ParticipantError {
        match err {
            CoordinatorError::Unavailable(reason) => ParticipantError::Unavailable(reason),
            CoordinatorError::SessionNotFound(id) => ParticipantError::SessionNotFound(id),
            CoordinatorError::SessionAborted(id) => {
                metrics::counter!("participant_session_aborted_total").increment(1);
                tracing::warn!(session = %id, "coordinator aborted the session");
                ParticipantError::SessionAborted(id)
            }
            CoordinatorError::Protocol(reason) => ParticipantError::Protocol(reason),
            // Duplicates are converted to success at the join site.
            CoordinatorError::DuplicateParticipant(_) => ParticipantError::Protocol(format!(
                "unexpected duplicate-participant reply for session {session_id}"
            )),
        }
    }
}
