//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use charge::ChargeError;
use participant::ParticipantError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Charge domain error.
    Charge(ChargeError),
    /// Saga-participant protocol error.
    Participant(ParticipantError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Charge(err) => charge_error_to_response(err),
            ApiError::Participant(err) => participant_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn charge_error_to_response(err: ChargeError) -> (StatusCode, String) {
    match &err {
        ChargeError::InsufficientFunds { .. } => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
        ChargeError::InvalidCard
        | ChargeError::UnacceptedCard { .. }
        | ChargeError::ExpiredCard { .. }
        | ChargeError::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn participant_error_to_response(err: ParticipantError) -> (StatusCode, String) {
    match &err {
        ParticipantError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        ParticipantError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        ParticipantError::SessionNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        // The coordinator decided to abort; the caller must compensate
        // its own already-applied effects.
        ParticipantError::SessionAborted(_) => (StatusCode::PRECONDITION_FAILED, err.to_string()),
        ParticipantError::CompensationRegistrationFailed { .. } => {
            tracing::error!(error = %err, "unresolved local effect; operator reconciliation needed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        ParticipantError::Charge(charge_err) => charge_error_to_response(charge_err.clone()),
        ParticipantError::Protocol(_) | ParticipantError::Serialization(_) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<ChargeError> for ApiError {
    fn from(err: ChargeError) -> Self {
        ApiError::Charge(err)
    }
}

impl From<ParticipantError> for ApiError {
    fn from(err: ParticipantError) -> Self {
        ApiError::Participant(err)
    }
}
