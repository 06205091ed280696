//! # Core Domain Entities
//!
//! Listings and the fraction records issued against them.

use crate::domain::value_objects::{Address, Timestamp, U256};
use fx_01_signature_authorizer::ListingMessage;
use serde::{Deserialize, Serialize};

// =============================================================================
// LISTING
// =============================================================================

/// A sellable offer for one asset at a fixed price with an expiry.
///
/// Listings are never deleted. A never-created id reads as `Listing::default()`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Contract of the listed asset.
    pub asset: Address,
    /// Token identifier within `asset`.
    pub asset_id: U256,
    /// Asking price in wei.
    pub price: U256,
    /// Lister's authorization over the creation-time terms.
    pub signature: Vec<u8>,
    /// Absolute expiry (seconds since epoch).
    pub deadline: Timestamp,
    /// Address that created and owns the listing.
    pub lister: Address,
    /// Whether the listing can be executed or fractionalized.
    pub active: bool,
    /// Count of outstanding minted shares (not their value).
    pub total_shares: u64,
}

impl Listing {
    /// True once `now` is past the deadline.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.deadline
    }
}

/// Terms submitted to `create_listing`.
///
/// `lister` is carried for client convenience only; the ledger always binds the
/// listing to the calling address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCandidate {
    /// Contract of the asset to list.
    pub asset: Address,
    /// Token identifier within `asset`.
    pub asset_id: U256,
    /// Asking price in wei.
    pub price: U256,
    /// `r ‖ s ‖ v` signature over the listing message.
    pub signature: Vec<u8>,
    /// Absolute expiry (seconds since epoch).
    pub deadline: Timestamp,
    /// Claimed lister (ignored for trust purposes).
    pub lister: Address,
}

impl ListingCandidate {
    /// The message `caller` must have signed for this candidate to be accepted.
    #[must_use]
    pub fn message_for(&self, caller: Address) -> ListingMessage {
        ListingMessage {
            asset: self.asset,
            asset_id: self.asset_id,
            price: self.price,
            deadline: self.deadline,
            lister: caller,
        }
    }
}

// =============================================================================
// FRACTION
// =============================================================================

/// A share record scoped to one listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    /// Current holder; `Address::ZERO` once redeemed.
    pub owner: Address,
    /// Currency-denominated value represented by this share.
    pub amount: U256,
}

impl Fraction {
    /// A spent record.
    pub const TOMBSTONE: Self = Self {
        owner: Address::ZERO,
        amount: U256([0; 4]),
    };

    /// Creates a live record.
    #[must_use]
    pub fn new(owner: Address, amount: U256) -> Self {
        Self { owner, amount }
    }

    /// True for redeemed records.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.owner.is_zero()
    }
}
