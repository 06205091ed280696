//! # FX-02 Listing Ledger - Listings, Fractions and Fees
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Owns the marketplace state machine: signed listings of non-fungible assets,
//! outright purchases, fractional shares minted against a listing's price,
//! redemption of those shares for currency, and the platform fee skimmed from
//! each redemption.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Listing terms (price floor, deadline window, caller signature) | `domain/registry.rs` - `validate_terms()`, `service.rs` - `create_listing()` |
//! | INVARIANT-2 | A listing is bought outright at most once | `domain/state.rs` - `begin_execution()` |
//! | INVARIANT-3 | Share count never underflows | `domain/state.rs` - `redeem_fraction()` |
//! | INVARIANT-4 | No state change on failure | `domain/journal.rs`, `service.rs` - `transact()` |
//! | INVARIANT-5 | No re-entry while an operation is in flight | `service.rs` - `transact()` |
//! | INVARIANT-6 | Custody covers the platform balance | `domain/invariants.rs` - `check_custody_invariant()` |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Asset registry | `AssetTransferGateway` | Ownership, approval, custody transfer |
//! | Currency | `ValueTransfer` | Attached value, payouts |
//! | FX-01 | `ListingAuthorizer` | Listing signature check |
//! | Clock | `TimeSource` | Deadlines |
//! | Notifications | `EventSink` | Committed operation notifications |
//!
//! ## Usage Example
//!
//! ```ignore
//! use fx_02_listing_ledger::prelude::*;
//!
//! let id = market.create_listing(CallContext::new(lister), candidate)?;
//! market.create_fractions(CallContext::new(investor), id, 4)?;
//! let redemption = market.exchange_ether_for_fraction(
//!     CallContext::with_value(investor, share_price),
//!     id,
//! )?;
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::entities::{Fraction, Listing, ListingCandidate};
    pub use crate::domain::invariants::{InvariantCheckResult, InvariantViolation};
    pub use crate::domain::state::Redemption;
    pub use crate::domain::value_objects::{
        Address, CallContext, Hash, ListingId, PriceDelta, Timestamp, FEE_DIVISOR,
        MIN_DURATION_SECS, MIN_PRICE_WEI, U256,
    };

    // Ports
    pub use crate::ports::inbound::MarketplaceApi;
    pub use crate::ports::outbound::{
        AssetTransferGateway, Checkpoint, EventSink, Journaled, TimeSource, ValueTransfer,
    };

    // Events
    pub use crate::events::{topics, MarketEvent};

    // Errors
    pub use crate::errors::{ErrorKind, GatewayError, LedgerError, TransferError};

    // Adapters
    pub use crate::adapters::{
        BroadcastEventSink, InMemoryAssetRegistry, InMemoryEventLog, InMemoryValueLedger,
        ManualTimeSource, PaymentHook, ReceiveHook, SystemTimeSource,
    };

    // Service
    pub use crate::config::{ConfigError, MarketplaceConfig};
    pub use crate::service::{Collaborators, MarketplaceService};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Listing Ledger";
