//! # Ledger State
//!
//! The registry, fraction ledger and fee vault, sequenced into the domain
//! steps of each operation. Nothing here performs I/O; the service wraps
//! these steps with collaborator calls.
//!
//! Every mutation is journaled. `commit` makes the pending mutations
//! permanent, `rollback` restores the state as of the last commit.

use crate::domain::entities::{Fraction, Listing};
use crate::domain::fractions::{FractionLedger, FractionLimits};
use crate::domain::journal::{Journal, JournalEntry};
use crate::domain::registry::ListingRegistry;
use crate::domain::value_objects::{Address, ListingId, PriceDelta, Timestamp, U256};
use crate::domain::vault::FeeVault;
use crate::errors::LedgerError;

/// Outcome of minting shares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Minted {
    /// Value of each minted share.
    pub per_share: U256,
    /// Listing after `total_shares` was incremented.
    pub listing: Listing,
}

/// Outcome of redeeming a fraction for currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redemption {
    /// Nominal amount of the redeemed record.
    pub amount: U256,
    /// Value attached by the buyer.
    pub paid: U256,
    /// Fee credited to the platform balance.
    pub fee: U256,
    /// `paid - fee`, owed to the lister.
    pub payout: U256,
    /// Listing after `total_shares` was decremented.
    pub listing: Listing,
}

/// All ledger state owned by the marketplace.
#[derive(Clone, Debug)]
pub struct LedgerState {
    registry: ListingRegistry,
    fractions: FractionLedger,
    vault: FeeVault,
    journal: Journal,
}

impl LedgerState {
    /// Create empty state.
    #[must_use]
    pub fn new(admin: Address, fee_divisor: u64, limits: FractionLimits) -> Self {
        Self {
            registry: ListingRegistry::new(),
            fractions: FractionLedger::new(limits),
            vault: FeeVault::new(admin, fee_divisor),
            journal: Journal::new(),
        }
    }

    /// Listing registry.
    #[must_use]
    pub fn registry(&self) -> &ListingRegistry {
        &self.registry
    }

    /// Fraction ledger.
    #[must_use]
    pub fn fractions(&self) -> &FractionLedger {
        &self.fractions
    }

    /// Fee vault.
    #[must_use]
    pub fn vault(&self) -> &FeeVault {
        &self.vault
    }

    /// Mutations not yet committed.
    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.journal.len()
    }

    // =========================================================================
    // LISTINGS
    // =========================================================================

    /// Stores a validated listing.
    pub fn create_listing(&mut self, listing: Listing) -> ListingId {
        self.registry.append(listing, &mut self.journal)
    }

    /// Validates an outright purchase and deactivates the listing.
    ///
    /// Order: existence, expiry, activity, exact price.
    pub fn begin_execution(
        &mut self,
        id: ListingId,
        now: Timestamp,
        attached: U256,
    ) -> Result<Listing, LedgerError> {
        let price = self.registry.require_executable(id, now)?.price;
        if let Some(delta) = PriceDelta::between(price, attached) {
            return Err(LedgerError::PriceNotMet(delta));
        }
        self.registry.update(id, &mut self.journal, |listing| {
            listing.active = false;
            Ok(())
        })
    }

    /// Overwrites price and active flag on behalf of the lister.
    pub fn edit_listing(
        &mut self,
        id: ListingId,
        caller: Address,
        price: U256,
        active: bool,
    ) -> Result<Listing, LedgerError> {
        self.registry.edit(id, caller, price, active, &mut self.journal)
    }

    // =========================================================================
    // FRACTIONS
    // =========================================================================

    /// Mints `count` shares of `price / count` to `caller`.
    pub fn create_fractions(
        &mut self,
        id: ListingId,
        caller: Address,
        count: u64,
    ) -> Result<Minted, LedgerError> {
        let price = self.registry.require_active(id)?.price;
        if count == 0 {
            return Err(LedgerError::InvalidShareCount);
        }
        let per_share = price / U256::from(count);

        self.fractions
            .mint(id, caller, per_share, count, &mut self.journal)?;
        let listing = self.registry.update(id, &mut self.journal, |listing| {
            listing.total_shares = listing
                .total_shares
                .checked_add(count)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            Ok(())
        })?;

        Ok(Minted { per_share, listing })
    }

    /// Amount of the first record `caller` holds in an active listing.
    pub fn fraction_amount(&self, id: ListingId, caller: &Address) -> Result<U256, LedgerError> {
        self.registry.require_active(id)?;
        Ok(self.fractions.amount_of(id, caller))
    }

    /// Redeems the caller's first record for `attached` currency.
    ///
    /// The record is tombstoned, the receipt stored, the share count reduced
    /// and the fee credited before anything is paid out.
    pub fn redeem_fraction(
        &mut self,
        id: ListingId,
        caller: Address,
        attached: U256,
    ) -> Result<Redemption, LedgerError> {
        self.registry.require_active(id)?;
        let (index, record) = self
            .fractions
            .first_of(id, &caller)
            .ok_or(LedgerError::FractionNotFound { id, owner: caller })?;

        if attached < record.amount {
            return Err(LedgerError::PriceNotMet(PriceDelta::Shortfall(
                record.amount - attached,
            )));
        }
        let fee = self.vault.fee_for(attached);

        self.fractions
            .tombstone(id, index, &mut self.journal)
            .ok_or(LedgerError::FractionNotFound { id, owner: caller })?;
        self.fractions
            .push_receipt(caller, Fraction::new(caller, record.amount), &mut self.journal);
        let listing = self.registry.update(id, &mut self.journal, |listing| {
            listing.total_shares = listing
                .total_shares
                .checked_sub(1)
                .ok_or(LedgerError::ShareCountUnderflow(id))?;
            Ok(())
        })?;
        self.vault.credit(fee, &mut self.journal)?;

        Ok(Redemption {
            amount: record.amount,
            paid: attached,
            fee,
            payout: attached - fee,
            listing,
        })
    }

    /// Splits `amount` off the caller's first covering record to `recipient`.
    pub fn transfer_fractions(
        &mut self,
        id: ListingId,
        caller: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.registry.require_active(id)?;
        self.fractions
            .transfer(id, caller, recipient, amount, &mut self.journal)
    }

    // =========================================================================
    // FEES
    // =========================================================================

    /// Zeroes the platform balance for the admin; returns the amount to pay.
    pub fn begin_fee_withdrawal(&mut self, caller: Address) -> Result<U256, LedgerError> {
        self.vault.begin_withdrawal(caller, &mut self.journal)
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Makes all pending mutations permanent.
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    /// Undoes all pending mutations, newest first.
    pub fn rollback(&mut self) {
        let entries: Vec<JournalEntry> = self.journal.drain_newest_first().collect();
        for entry in entries {
            match entry {
                JournalEntry::ListingAppended => self.registry.undo_append(),
                JournalEntry::ListingReplaced { id, previous } => {
                    self.registry.undo_replace(id, previous);
                }
                JournalEntry::FractionAppended { listing } => self.fractions.undo_append(listing),
                JournalEntry::FractionReplaced {
                    listing,
                    index,
                    previous,
                } => self.fractions.undo_replace(listing, index, previous),
                JournalEntry::ReceiptAppended { owner } => self.fractions.undo_receipt(&owner),
                JournalEntry::PlatformBalance { previous } => self.vault.undo_balance(previous),
            }
        }
    }
}
