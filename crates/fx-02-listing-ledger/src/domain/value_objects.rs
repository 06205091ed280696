//! # Value Objects
//!
//! Immutable domain primitives for the listing ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use shared_types::{Address, Hash, Timestamp, U256};

/// Sequential listing identifier. The first listing is id 0.
pub type ListingId = u64;

/// Minimum listing price: 0.01 of a currency unit (10^16 wei).
pub const MIN_PRICE_WEI: u64 = 10_000_000_000_000_000;

/// Minimum time between creation and deadline.
pub const MIN_DURATION_SECS: u64 = 60 * 60;

/// Platform fee is `value / FEE_DIVISOR` (0.1%).
pub const FEE_DIVISOR: u64 = 1_000;

/// Who is calling and how much currency they attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller.
    pub caller: Address,
    /// Attached native currency in wei.
    pub value: U256,
}

impl CallContext {
    /// A call with no attached value.
    #[must_use]
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::zero(),
        }
    }

    /// A payable call carrying `value`.
    #[must_use]
    pub fn with_value(caller: Address, value: U256) -> Self {
        Self { caller, value }
    }
}

/// Signed difference between attached value and the required amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceDelta {
    /// Attached value was this much short.
    Shortfall(U256),
    /// Attached value exceeded the price by this much.
    Excess(U256),
}

impl PriceDelta {
    /// `None` when `attached == required`.
    #[must_use]
    pub fn between(required: U256, attached: U256) -> Option<Self> {
        match attached.cmp(&required) {
            std::cmp::Ordering::Less => Some(Self::Shortfall(required - attached)),
            std::cmp::Ordering::Greater => Some(Self::Excess(attached - required)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for PriceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shortfall(v) => write!(f, "-{v}"),
            Self::Excess(v) => write!(f, "+{v}"),
        }
    }
}
