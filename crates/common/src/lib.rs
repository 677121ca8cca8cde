//! Shared identifier types used across the payment participant crates.

mod types;

pub use types::{ClientId, RequestId, SessionId, TransactionId};
