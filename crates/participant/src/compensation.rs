//! Compensation records.

use serde::{Deserialize, Serialize};

use crate::error::ParticipantError;

/// A durable instruction describing how to reverse the local action.
///
/// Created locally, sent to the coordinator exactly once, then owned by
/// it. `data` must carry enough to reverse the exact local effect — for
/// a charge, the original charge request, from which the reversal can
/// recompute which settlement to refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    /// Where the coordinator should invoke the reversal.
    pub uri: String,
    /// Opaque payload forwarded verbatim on reversal.
    pub data: serde_json::Value,
}

impl Compensation {
    /// Creates a compensation record.
    ///
    /// Fails if the URI is blank; a compensation the coordinator
    /// cannot deliver is as bad as none.
    pub fn new(
        uri: impl Into<String>,
        data: serde_json::Value,
    ) -> Result<Self, ParticipantError> {
        let uri = uri.into();
        if uri.trim().is_empty() {
            return Err(ParticipantError::InvalidArgument(
                "compensation uri must not be empty".to_string(),
            ));
        }
        Ok(Self { uri, data })
    }
}
