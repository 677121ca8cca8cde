//! Credit card value objects and validation.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Card networks this processor can settle against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    Mastercard,
    /// Recognizably formed number on a network we do not accept.
    Other,
}

impl CardBrand {
    /// Returns true if this processor settles on the brand's network.
    pub fn is_accepted(&self) -> bool {
        matches!(self, CardBrand::Visa | CardBrand::Mastercard)
    }

    /// Returns the brand name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Other => "other",
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A payment instrument as supplied by the caller.
///
/// The number may contain spaces or dashes; validation works on the
/// digit string. Expiry is valid through the end of the stated month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
}

impl CreditCard {
    /// Creates a new credit card.
    pub fn new(number: impl Into<String>, expiry_month: u32, expiry_year: i32) -> Self {
        Self {
            number: number.into(),
            expiry_month,
            expiry_year,
        }
    }

    /// Returns the card number with separators stripped.
    pub fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect()
    }

    /// Returns the last four digits of the card number.
    ///
    /// Returns the whole digit string when it is shorter than four,
    /// which only happens for numbers that already failed validation.
    pub fn last_four(&self) -> String {
        let digits = self.digits();
        let start = digits.len().saturating_sub(4);
        digits[start..].to_string()
    }

    /// Returns true if the number is well-formed: digits and separators
    /// only, plausible length, and a passing Luhn checksum.
    pub fn is_valid_number(&self) -> bool {
        if !self
            .number
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        {
            return false;
        }
        let digits = self.digits();
        if !(12..=19).contains(&digits.len()) {
            return false;
        }
        luhn_checksum_passes(&digits)
    }

    /// Detects the card brand from the number prefix.
    pub fn brand(&self) -> CardBrand {
        let digits = self.digits();
        if digits.starts_with('4') {
            return CardBrand::Visa;
        }
        if let Some(prefix2) = digits.get(0..2).and_then(|p| p.parse::<u32>().ok())
            && (51..=55).contains(&prefix2)
        {
            return CardBrand::Mastercard;
        }
        if let Some(prefix4) = digits.get(0..4).and_then(|p| p.parse::<u32>().ok())
            && (2221..=2720).contains(&prefix4)
        {
            return CardBrand::Mastercard;
        }
        CardBrand::Other
    }

    /// Returns true if the card is expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (self.expiry_year, self.expiry_month) < (now.year(), now.month())
    }
}

/// Luhn checksum over a digit string.
fn luhn_checksum_passes(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn future_card(number: &str) -> CreditCard {
        CreditCard::new(number, 1, 2099)
    }

    #[test]
    fn test_valid_visa_number() {
        let card = future_card("4242424242424242");
        assert!(card.is_valid_number());
        assert_eq!(card.brand(), CardBrand::Visa);
    }

    #[test]
    fn test_valid_mastercard_number() {
        let card = future_card("5555555555554444");
        assert!(card.is_valid_number());
        assert_eq!(card.brand(), CardBrand::Mastercard);
    }

    #[test]
    fn test_mastercard_2_series_prefix() {
        // 2221-2720 range belongs to Mastercard
        let card = future_card("2223003122003222");
        assert_eq!(card.brand(), CardBrand::Mastercard);
    }

    #[test]
    fn test_separators_are_stripped() {
        let card = future_card("4242-4242-4242-4242");
        assert!(card.is_valid_number());
        assert_eq!(card.digits(), "4242424242424242");
        assert_eq!(card.last_four(), "4242");
    }

    #[test]
    fn test_luhn_failure_rejected() {
        let card = future_card("4242424242424241");
        assert!(!card.is_valid_number());
    }

    #[test]
    fn test_non_digit_characters_rejected() {
        let card = future_card("4242abcd42424242");
        assert!(!card.is_valid_number());
    }

    #[test]
    fn test_too_short_number_rejected() {
        let card = future_card("42424242");
        assert!(!card.is_valid_number());
    }

    #[test]
    fn test_unaccepted_brand() {
        // American Express test number
        let card = future_card("378282246310005");
        assert!(card.is_valid_number());
        assert_eq!(card.brand(), CardBrand::Other);
        assert!(!card.brand().is_accepted());
    }

    #[test]
    fn test_expiry_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();

        // Valid through the end of the stated month
        let same_month = CreditCard::new("4242424242424242", 6, 2026);
        assert!(!same_month.is_expired(now));

        let last_month = CreditCard::new("4242424242424242", 5, 2026);
        assert!(last_month.is_expired(now));

        let last_year = CreditCard::new("4242424242424242", 12, 2025);
        assert!(last_year.is_expired(now));

        let next_year = CreditCard::new("4242424242424242", 1, 2027);
        assert!(!next_year.is_expired(now));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let card = CreditCard::new("4242424242424242", 12, 2030);
        let json = serde_json::to_string(&card).unwrap();
        let deserialized: CreditCard = serde_json::from_str(&json).unwrap();
        assert_eq!(card, deserialized);
    }
}
