//! Charge error types.

use thiserror::Error;

use crate::card::CardBrand;
use crate::money::Money;

/// Errors that can occur while executing a charge.
///
/// These are domain decisions, not infrastructure faults: none of them
/// is retryable, and all of them propagate to the caller unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChargeError {
    /// The card number is malformed or fails its checksum.
    #[error("Credit card info is invalid")]
    InvalidCard,

    /// The card network is not accepted by this processor.
    #[error("Sorry, we cannot process {brand} credit cards. Only Visa or Mastercard are accepted")]
    UnacceptedCard { brand: CardBrand },

    /// The card is past its expiry month.
    #[error("The credit card (ending {last_four}) expired on {month}/{year}")]
    ExpiredCard {
        last_four: String,
        month: u32,
        year: i32,
    },

    /// The charge amount is zero or negative.
    #[error("Charge amount must be positive, got {amount}")]
    InvalidAmount { amount: Money },

    /// The amount exceeds what the instrument can cover.
    #[error("Insufficient funds: {amount} exceeds the limit of {limit}")]
    InsufficientFunds { amount: Money, limit: Money },
}
