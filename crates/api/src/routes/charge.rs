//! Charge endpoints: direct and transactional.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use charge::{ChargeProcessor, ChargeRequest, CreditCard, Money};
use common::RequestId;
use participant::{CoordinatorTransport, ParticipantClient, SessionHandle};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// One processor and one participant client serve all requests; both
/// are stateless per call, so no locking is needed.
pub struct AppState<T: CoordinatorTransport> {
    pub processor: ChargeProcessor,
    pub participant: ParticipantClient<T>,
    pub compensation_uri: String,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreditCardBody {
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
}

#[derive(Debug, Deserialize)]
pub struct ChargeBody {
    pub credit_card: CreditCardBody,
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChargeTxnBody {
    pub session_id: String,
    pub credit_card: CreditCardBody,
    pub amount_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct ChargeResponse {
    pub transaction_id: String,
}

fn to_charge_request(card: &CreditCardBody, amount_cents: i64) -> ChargeRequest {
    ChargeRequest {
        credit_card: CreditCard::new(card.number.as_str(), card.expiry_month, card.expiry_year),
        amount: Money::from_cents(amount_cents),
    }
}

// -- Handlers --

/// POST /charge — direct, non-transactional charge.
#[tracing::instrument(skip(state, body))]
pub async fn direct<T: CoordinatorTransport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Json(body): Json<ChargeBody>,
) -> Result<Json<ChargeResponse>, ApiError> {
    metrics::counter!("charge_requests_total").increment(1);

    let request = to_charge_request(&body.credit_card, body.amount_cents);
    let result = state.processor.charge(&request)?;

    Ok(Json(ChargeResponse {
        transaction_id: result.transaction_id.to_string(),
    }))
}

/// POST /charge/txn — charge as one step of a coordinator-managed
/// distributed transaction.
///
/// The card number is the idempotency key: identical across retries of
/// the same logical charge, different across distinct charges.
#[tracing::instrument(skip(state, body))]
pub async fn txn<T: CoordinatorTransport + 'static>(
    State(state): State<Arc<AppState<T>>>,
    Json(body): Json<ChargeTxnBody>,
) -> Result<Json<ChargeResponse>, ApiError> {
    metrics::counter!("charge_txn_requests_total").increment(1);

    let session = SessionHandle::from_id(body.session_id.as_str())?;
    let request = to_charge_request(&body.credit_card, body.amount_cents);
    let request_id = RequestId::new(request.credit_card.digits());

    let result = state
        .participant
        .charge_in_session(
            &session,
            &request_id,
            &state.compensation_uri,
            &state.processor,
            &request,
        )
        .await?;

    Ok(Json(ChargeResponse {
        transaction_id: result.transaction_id.to_string(),
    }))
}
