//! Participation state machine.

use serde::{Deserialize, Serialize};

/// The state of this participant within one session.
///
/// State transitions:
/// ```text
/// Unjoined ──► Joined ──► LocalActionDone ──► CompensationRegistered
/// ```
///
/// No transition skips a state. Failures exit the machine at the
/// current state; `LocalActionDone` that never reaches
/// `CompensationRegistered` is the one locally irrecoverable outcome —
/// the charge happened but the coordinator has no way to undo it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ParticipationState {
    /// Not yet registered with the coordinator.
    #[default]
    Unjoined,

    /// Joined the session; no local effect yet.
    Joined,

    /// The irreversible local action has executed.
    LocalActionDone,

    /// Compensation is durably registered and partial commit reported
    /// (terminal success).
    CompensationRegistered,
}

impl ParticipationState {
    /// Returns true if the local action may run from this state.
    pub fn can_execute(&self) -> bool {
        matches!(self, ParticipationState::Joined)
    }

    /// Returns true if compensation registration may run from this state.
    pub fn can_register(&self) -> bool {
        matches!(self, ParticipationState::LocalActionDone)
    }

    /// Returns true if this is the terminal success state.
    pub fn is_committed(&self) -> bool {
        matches!(self, ParticipationState::CompensationRegistered)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationState::Unjoined => "Unjoined",
            ParticipationState::Joined => "Joined",
            ParticipationState::LocalActionDone => "LocalActionDone",
            ParticipationState::CompensationRegistered => "CompensationRegistered",
        }
    }
}

impl std::fmt::Display for ParticipationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_unjoined() {
        assert_eq!(ParticipationState::default(), ParticipationState::Unjoined);
    }

    #[test]
    fn test_can_execute_only_when_joined() {
        assert!(!ParticipationState::Unjoined.can_execute());
        assert!(ParticipationState::Joined.can_execute());
        assert!(!ParticipationState::LocalActionDone.can_execute());
        assert!(!ParticipationState::CompensationRegistered.can_execute());
    }

    #[test]
    fn test_can_register_only_after_local_action() {
        assert!(!ParticipationState::Unjoined.can_register());
        assert!(!ParticipationState::Joined.can_register());
        assert!(ParticipationState::LocalActionDone.can_register());
        assert!(!ParticipationState::CompensationRegistered.can_register());
    }

    #[test]
    fn test_committed_state() {
        assert!(!ParticipationState::Unjoined.is_committed());
        assert!(!ParticipationState::Joined.is_committed());
        assert!(!ParticipationState::LocalActionDone.is_committed());
        assert!(ParticipationState::CompensationRegistered.is_committed());
    }

    #[test]
    fn test_display() {
        assert_eq!(ParticipationState::Unjoined.to_string(), "Unjoined");
        assert_eq!(ParticipationState::Joined.to_string(), "Joined");
        assert_eq!(
            ParticipationState::LocalActionDone.to_string(),
            "LocalActionDone"
        );
        assert_eq!(
            ParticipationState::CompensationRegistered.to_string(),
            "CompensationRegistered"
        );
    }

    #[test]
    fn test_serialization() {
        let state = ParticipationState::Joined;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ParticipationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
