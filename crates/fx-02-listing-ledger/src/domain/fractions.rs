//! # Fraction Ledger
//!
//! Per-listing share records and per-address redemption receipts.
//!
//! Listing activity and share counts live in the registry; this component
//! only stores records. `LedgerState` sequences the two.

use crate::domain::arena::FractionArena;
use crate::domain::entities::Fraction;
use crate::domain::journal::{Journal, JournalEntry};
use crate::domain::value_objects::{Address, ListingId, U256};
use crate::errors::LedgerError;
use std::collections::HashMap;

/// Bounds on record growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FractionLimits {
    /// Most shares a single `create_fractions` call may mint.
    pub max_shares_per_mint: u64,
    /// Most records a single listing's arena may hold.
    pub max_fraction_records: u64,
}

impl Default for FractionLimits {
    fn default() -> Self {
        Self {
            max_shares_per_mint: 10_000,
            max_fraction_records: 100_000,
        }
    }
}

/// Fraction records and redemption receipts.
#[derive(Clone, Debug, Default)]
pub struct FractionLedger {
    arenas: HashMap<ListingId, FractionArena>,
    receipts: HashMap<Address, Vec<Fraction>>,
    limits: FractionLimits,
}

impl FractionLedger {
    /// Create an empty ledger with the given limits.
    #[must_use]
    pub fn new(limits: FractionLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Configured limits.
    #[must_use]
    pub fn limits(&self) -> FractionLimits {
        self.limits
    }

    /// Records of `listing` in mint order, tombstones included.
    #[must_use]
    pub fn records(&self, listing: ListingId) -> &[Fraction] {
        self.arenas
            .get(&listing)
            .map_or(&[][..], FractionArena::records)
    }

    /// Iterates over every arena.
    pub fn arenas(&self) -> impl Iterator<Item = (&ListingId, &FractionArena)> {
        self.arenas.iter()
    }

    /// Receipts of everything `owner` has redeemed.
    #[must_use]
    pub fn receipts_of(&self, owner: &Address) -> &[Fraction] {
        self.receipts.get(owner).map_or(&[][..], Vec::as_slice)
    }

    /// First record owned by `owner` in `listing`.
    #[must_use]
    pub fn first_of(&self, listing: ListingId, owner: &Address) -> Option<(usize, Fraction)> {
        self.arenas.get(&listing)?.first_owned_by(owner)
    }

    /// Amount of the first record owned by `owner`, or zero.
    #[must_use]
    pub fn amount_of(&self, listing: ListingId, owner: &Address) -> U256 {
        self.first_of(listing, owner)
            .map_or_else(U256::zero, |(_, fraction)| fraction.amount)
    }

    /// Appends `count` records of `per_share` owned by `owner`.
    pub fn mint(
        &mut self,
        listing: ListingId,
        owner: Address,
        per_share: U256,
        count: u64,
        journal: &mut Journal,
    ) -> Result<(), LedgerError> {
        if count == 0 {
            return Err(LedgerError::InvalidShareCount);
        }
        if count > self.limits.max_shares_per_mint {
            return Err(LedgerError::FractionCapacityExceeded {
                limit: self.limits.max_shares_per_mint,
            });
        }
        self.ensure_room(listing, count)?;

        let arena = self.arenas.entry(listing).or_default();
        for _ in 0..count {
            arena.push(Fraction::new(owner, per_share));
            journal.record(JournalEntry::FractionAppended { listing });
        }
        Ok(())
    }

    /// Moves `amount` out of the first covering record of `from` into a new
    /// record owned by `to`.
    pub fn transfer(
        &mut self,
        listing: ListingId,
        from: Address,
        to: Address,
        amount: U256,
        journal: &mut Journal,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let (index, source) = self
            .arenas
            .get(&listing)
            .and_then(|arena| arena.first_covering(&from, amount))
            .ok_or(LedgerError::InsufficientFractionBalance { requested: amount })?;
        self.ensure_room(listing, 1)?;

        let arena = self.arenas.entry(listing).or_default();
        arena.replace(index, Fraction::new(from, source.amount - amount));
        journal.record(JournalEntry::FractionReplaced {
            listing,
            index,
            previous: source,
        });
        arena.push(Fraction::new(to, amount));
        journal.record(JournalEntry::FractionAppended { listing });
        Ok(())
    }

    /// Replaces record `index` with a tombstone and returns what it held.
    pub fn tombstone(
        &mut self,
        listing: ListingId,
        index: usize,
        journal: &mut Journal,
    ) -> Option<Fraction> {
        let previous = self
            .arenas
            .get_mut(&listing)?
            .replace(index, Fraction::TOMBSTONE)?;
        journal.record(JournalEntry::FractionReplaced {
            listing,
            index,
            previous,
        });
        Some(previous)
    }

    /// Appends a redemption receipt for `owner`.
    pub fn push_receipt(&mut self, owner: Address, receipt: Fraction, journal: &mut Journal) {
        self.receipts.entry(owner).or_default().push(receipt);
        journal.record(JournalEntry::ReceiptAppended { owner });
    }

    fn ensure_room(&self, listing: ListingId, additional: u64) -> Result<(), LedgerError> {
        let current = self.arenas.get(&listing).map_or(0, FractionArena::len) as u64;
        let limit = self.limits.max_fraction_records;
        match current.checked_add(additional) {
            Some(total) if total <= limit => Ok(()),
            _ => Err(LedgerError::FractionCapacityExceeded { limit }),
        }
    }

    pub(crate) fn undo_append(&mut self, listing: ListingId) {
        if let Some(arena) = self.arenas.get_mut(&listing) {
            arena.pop();
            if arena.is_empty() {
                self.arenas.remove(&listing);
            }
        }
    }

    pub(crate) fn undo_replace(&mut self, listing: ListingId, index: usize, previous: Fraction) {
        if let Some(arena) = self.arenas.get_mut(&listing) {
            arena.replace(index, previous);
        }
    }

    pub(crate) fn undo_receipt(&mut self, owner: &Address) {
        if let Some(receipts) = self.receipts.get_mut(owner) {
            receipts.pop();
            if receipts.is_empty() {
                self.receipts.remove(owner);
            }
        }
    }
}
