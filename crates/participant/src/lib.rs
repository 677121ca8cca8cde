//! Saga-participant protocol for the payment service.
//!
//! This crate implements one participant's side of a distributed
//! transaction managed by an external coordinator:
//! 1. Join the session (idempotent under retries)
//! 2. Execute the irreversible local action exactly once
//! 3. Register a compensating action and report partial commit
//!
//! The compensation is durably registered before the caller ever sees
//! success; the coordinator is never told "committed" for a participant
//! it cannot undo.

pub mod client;
pub mod compensation;
pub mod error;
pub mod participation;
pub mod retry;
pub mod session;
pub mod state;
pub mod transport;

pub use client::{HealthStatus, ParticipantClient};
pub use compensation::Compensation;
pub use error::ParticipantError;
pub use participation::Participation;
pub use retry::RetryPolicy;
pub use session::SessionHandle;
pub use state::ParticipationState;
pub use transport::{
    CoordinatorError, CoordinatorTransport, JoinRequest, ParticipationRecord,
    PartialCommitRequest, http::HttpCoordinator, memory::InMemoryCoordinator,
};
