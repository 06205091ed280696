//! # Inbound Ports (Driving Ports)
//!
//! The public operation surface of the marketplace.

use crate::domain::entities::{Fraction, Listing, ListingCandidate};
use crate::domain::invariants::InvariantCheckResult;
use crate::domain::state::Redemption;
use crate::domain::value_objects::{Address, CallContext, ListingId, U256};
use crate::errors::LedgerError;

/// Listing, fraction and fee operations.
///
/// Every state-changing call either completes or leaves all state untouched.
/// Calls made while another operation is in flight on the same thread fail
/// with `LedgerError::ReentrantCall`.
pub trait MarketplaceApi: Send + Sync {
    // =========================================================================
    // LISTINGS
    // =========================================================================

    /// Creates a listing owned by the caller and returns its id.
    fn create_listing(
        &self,
        ctx: CallContext,
        candidate: ListingCandidate,
    ) -> Result<ListingId, LedgerError>;

    /// Buys the listed asset outright. `ctx.value` must equal the price.
    fn execute_listing(&self, ctx: CallContext, id: ListingId) -> Result<Listing, LedgerError>;

    /// Overwrites price and active flag. Lister only.
    fn edit_listing(
        &self,
        ctx: CallContext,
        id: ListingId,
        price: U256,
        active: bool,
    ) -> Result<Listing, LedgerError>;

    /// Stored listing, or a zero-valued record for an id never assigned.
    fn get_listing(&self, id: ListingId) -> Result<Listing, LedgerError>;

    /// Stored listing, `None` for an id never assigned.
    fn try_get_listing(&self, id: ListingId) -> Result<Option<Listing>, LedgerError>;

    /// Number of listings ever created.
    fn listing_count(&self) -> Result<u64, LedgerError>;

    // =========================================================================
    // FRACTIONS
    // =========================================================================

    /// Mints `count` shares of an active listing to the caller; returns the
    /// per-share amount.
    fn create_fractions(
        &self,
        ctx: CallContext,
        id: ListingId,
        count: u64,
    ) -> Result<U256, LedgerError>;

    /// Amount of the caller's first record in an active listing, or zero.
    fn get_fraction_amount(&self, caller: Address, id: ListingId) -> Result<U256, LedgerError>;

    /// Redeems the caller's first record for the attached value.
    fn exchange_ether_for_fraction(
        &self,
        ctx: CallContext,
        id: ListingId,
    ) -> Result<Redemption, LedgerError>;

    /// Moves `amount` out of the caller's first covering record to `recipient`.
    fn transfer_fractions(
        &self,
        ctx: CallContext,
        id: ListingId,
        recipient: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;

    /// Records of a listing in mint order, tombstones included.
    fn fractions_of(&self, id: ListingId) -> Result<Vec<Fraction>, LedgerError>;

    /// Receipts of everything `owner` has redeemed.
    fn redemption_receipts(&self, owner: Address) -> Result<Vec<Fraction>, LedgerError>;

    // =========================================================================
    // FEES
    // =========================================================================

    /// Pays the entire platform balance to the admin; returns the amount.
    fn withdraw_platform_fees(&self, ctx: CallContext) -> Result<U256, LedgerError>;

    /// Fees accumulated and not yet withdrawn.
    fn platform_balance(&self) -> Result<U256, LedgerError>;

    /// Identity allowed to withdraw fees.
    fn admin(&self) -> Address;

    /// Runs the domain invariant checks against current state and custody.
    fn check_invariants(&self) -> Result<InvariantCheckResult, LedgerError>;
}
