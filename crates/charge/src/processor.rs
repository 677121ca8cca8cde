//! Charge processor: the local, irreversible action.

use chrono::Utc;
use common::TransactionId;
use serde::{Deserialize, Serialize};

use crate::card::CreditCard;
use crate::error::ChargeError;
use crate::money::Money;

/// A request to charge a payment instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub credit_card: CreditCard,
    pub amount: Money,
}

/// Result of a successful charge: the settlement identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeResult {
    pub transaction_id: TransactionId,
}

/// Validates a payment instrument and produces a settlement ID.
///
/// Pure and synchronous: no network, no stored state. Every successful
/// call is an irreversible effect from the saga's point of view, so the
/// caller must pair it with a registered compensation before reporting
/// it as committed.
#[derive(Debug, Clone)]
pub struct ChargeProcessor {
    /// Per-transaction ceiling; amounts above it decline with
    /// `InsufficientFunds`.
    limit: Money,
}

impl ChargeProcessor {
    /// Creates a processor with the given per-transaction limit.
    pub fn new(limit: Money) -> Self {
        Self { limit }
    }

    /// Returns the configured per-transaction limit.
    pub fn limit(&self) -> Money {
        self.limit
    }

    /// Executes a charge.
    ///
    /// Validation order: amount, number, brand, expiry, funds. The
    /// first failing check decides the error; nothing is settled on
    /// failure.
    #[tracing::instrument(skip(self, request), fields(amount = %request.amount))]
    pub fn charge(&self, request: &ChargeRequest) -> Result<ChargeResult, ChargeError> {
        let card = &request.credit_card;

        if !request.amount.is_positive() {
            return Err(ChargeError::InvalidAmount {
                amount: request.amount,
            });
        }

        if !card.is_valid_number() {
            return Err(ChargeError::InvalidCard);
        }

        let brand = card.brand();
        if !brand.is_accepted() {
            return Err(ChargeError::UnacceptedCard { brand });
        }

        if card.is_expired(Utc::now()) {
            return Err(ChargeError::ExpiredCard {
                last_four: card.last_four(),
                month: card.expiry_month,
                year: card.expiry_year,
            });
        }

        if request.amount > self.limit {
            return Err(ChargeError::InsufficientFunds {
                amount: request.amount,
                limit: self.limit,
            });
        }

        let transaction_id = TransactionId::new();
        metrics::counter!("charge_settled_total").increment(1);
        tracing::info!(
            %brand,
            ending = %card.last_four(),
            amount = %request.amount,
            %transaction_id,
            "transaction processed"
        );

        Ok(ChargeResult { transaction_id })
    }
}

impl Default for ChargeProcessor {
    fn default() -> Self {
        // $10,000.00 per transaction
        Self::new(Money::from_cents(1_000_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(number: &str, cents: i64) -> ChargeRequest {
        ChargeRequest {
            credit_card: CreditCard::new(number, 1, 2099),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_charge_visa() {
        let processor = ChargeProcessor::default();
        let result = processor.charge(&request("4242424242424242", 1000)).unwrap();
        assert!(!result.transaction_id.as_str().is_empty());
    }

    #[test]
    fn test_charge_mastercard() {
        let processor = ChargeProcessor::default();
        assert!(processor.charge(&request("5555555555554444", 1000)).is_ok());
    }

    #[test]
    fn test_each_charge_gets_fresh_transaction_id() {
        let processor = ChargeProcessor::default();
        let r1 = processor.charge(&request("4242424242424242", 1000)).unwrap();
        let r2 = processor.charge(&request("4242424242424242", 1000)).unwrap();
        assert_ne!(r1.transaction_id, r2.transaction_id);
    }

    #[test]
    fn test_invalid_number_declined() {
        let processor = ChargeProcessor::default();
        let err = processor
            .charge(&request("4242424242424241", 1000))
            .unwrap_err();
        assert_eq!(err, ChargeError::InvalidCard);
    }

    #[test]
    fn test_unaccepted_brand_declined() {
        let processor = ChargeProcessor::default();
        let err = processor
            .charge(&request("378282246310005", 1000))
            .unwrap_err();
        assert!(matches!(err, ChargeError::UnacceptedCard { .. }));
    }

    #[test]
    fn test_expired_card_declined() {
        let processor = ChargeProcessor::default();
        let req = ChargeRequest {
            credit_card: CreditCard::new("4242424242424242", 1, 2020),
            amount: Money::from_cents(1000),
        };
        let err = processor.charge(&req).unwrap_err();
        assert!(matches!(err, ChargeError::ExpiredCard { .. }));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let processor = ChargeProcessor::default();
        let err = processor
            .charge(&request("4242424242424242", 0))
            .unwrap_err();
        assert!(matches!(err, ChargeError::InvalidAmount { .. }));
    }

    #[test]
    fn test_amount_over_limit_is_insufficient_funds() {
        let processor = ChargeProcessor::new(Money::from_cents(500));
        let err = processor
            .charge(&request("4242424242424242", 501))
            .unwrap_err();
        assert!(matches!(err, ChargeError::InsufficientFunds { .. }));

        // At the limit is still fine
        assert!(processor.charge(&request("4242424242424242", 500)).is_ok());
    }
}
