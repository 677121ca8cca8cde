//! Session handle.

use common::SessionId;
use serde::{Deserialize, Serialize};

use crate::error::ParticipantError;

/// A reference to a coordinator-owned session.
///
/// Construction is pure: no network round trip happens until the
/// handle is used to join. The coordinator remains the owner; holding
/// a handle says nothing about whether the session still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    id: SessionId,
}

impl SessionHandle {
    /// Creates a handle from a caller-supplied session identifier.
    ///
    /// Fails only if the identifier is empty or blank.
    pub fn from_id(session_id: impl Into<SessionId>) -> Result<Self, ParticipantError> {
        let id = session_id.into();
        if id.as_str().trim().is_empty() {
            return Err(ParticipantError::InvalidArgument(
                "session id must not be empty".to_string(),
            ));
        }
        Ok(Self { id })
    }

    /// Returns the session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
