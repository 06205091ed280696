//! # Notifications
//!
//! One notification per committed state-changing operation. They are
//! observational only; nothing in the ledger consumes them.

use crate::domain::entities::Listing;
use crate::domain::value_objects::{Address, ListingId, U256};
use serde::{Deserialize, Serialize};

/// Topic names, one per notification kind.
pub mod topics {
    /// Listing created.
    pub const LISTING_CREATED: &str = "listing.created";
    /// Listing bought outright.
    pub const LISTING_EXECUTED: &str = "listing.executed";
    /// Listing price or activity edited.
    pub const LISTING_EDITED: &str = "listing.edited";
    /// Shares minted.
    pub const FRACTIONS_CREATED: &str = "fraction.created";
    /// Share redeemed for currency.
    pub const FRACTION_PURCHASED: &str = "fraction.purchased";
    /// Share value moved to another holder.
    pub const FRACTIONS_TRANSFERRED: &str = "fraction.transferred";
    /// Platform fees paid out.
    pub const PLATFORM_FEES_WITHDRAWN: &str = "fees.withdrawn";
}

/// Ledger notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A listing was created.
    ListingCreated { listing_id: ListingId, listing: Listing },
    /// A listing was bought outright.
    ListingExecuted {
        listing_id: ListingId,
        buyer: Address,
        listing: Listing,
    },
    /// A listing's price or active flag changed.
    ListingEdited { listing_id: ListingId, listing: Listing },
    /// Shares were minted against a listing.
    FractionsCreated {
        listing_id: ListingId,
        owner: Address,
        count: u64,
        per_share: U256,
        listing: Listing,
    },
    /// A share was redeemed for currency.
    FractionPurchased {
        listing_id: ListingId,
        buyer: Address,
        amount: U256,
        paid: U256,
        fee: U256,
        listing: Listing,
    },
    /// Share value moved between holders.
    FractionsTransferred {
        listing_id: ListingId,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// The admin withdrew the platform balance.
    PlatformFeesWithdrawn { admin: Address, amount: U256 },
}

impl MarketEvent {
    /// Affected listing, if any.
    #[must_use]
    pub fn listing_id(&self) -> Option<ListingId> {
        match self {
            Self::ListingCreated { listing_id, .. }
            | Self::ListingExecuted { listing_id, .. }
            | Self::ListingEdited { listing_id, .. }
            | Self::FractionsCreated { listing_id, .. }
            | Self::FractionPurchased { listing_id, .. }
            | Self::FractionsTransferred { listing_id, .. } => Some(*listing_id),
            Self::PlatformFeesWithdrawn { .. } => None,
        }
    }

    /// Topic this notification is published under.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => topics::LISTING_CREATED,
            Self::ListingExecuted { .. } => topics::LISTING_EXECUTED,
            Self::ListingEdited { .. } => topics::LISTING_EDITED,
            Self::FractionsCreated { .. } => topics::FRACTIONS_CREATED,
            Self::FractionPurchased { .. } => topics::FRACTION_PURCHASED,
            Self::FractionsTransferred { .. } => topics::FRACTIONS_TRANSFERRED,
            Self::PlatformFeesWithdrawn { .. } => topics::PLATFORM_FEES_WITHDRAWN,
        }
    }
}
