//! Pure charge execution for the payment participant.
//!
//! A charge validates the payment instrument and produces a settlement
//! identifier. It performs no network I/O and holds no state beyond the
//! processor's own configuration, which makes it safe to run exactly
//! once inside a distributed-transaction step.

pub mod card;
pub mod error;
pub mod money;
pub mod processor;

pub use card::{CardBrand, CreditCard};
pub use error::ChargeError;
pub use money::Money;
pub use processor::{ChargeProcessor, ChargeRequest, ChargeResult};
