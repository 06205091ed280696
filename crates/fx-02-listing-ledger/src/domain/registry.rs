//! # Listing Registry
//!
//! Append-only log of listings indexed by sequential id, plus the pure
//! validation rules for new listing terms.

use crate::domain::entities::{Listing, ListingCandidate};
use crate::domain::journal::{Journal, JournalEntry};
use crate::domain::value_objects::{Address, ListingId, Timestamp, U256};
use crate::errors::LedgerError;

/// Checks price and deadline of a candidate against the listing rules.
///
/// Order: `MinPriceTooLow`, `DeadlineTooSoon`, `MinDurationNotMet`.
pub fn validate_terms(
    candidate: &ListingCandidate,
    now: Timestamp,
    min_price: U256,
    min_duration_secs: u64,
) -> Result<(), LedgerError> {
    if candidate.price < min_price {
        return Err(LedgerError::MinPriceTooLow {
            price: candidate.price,
            minimum: min_price,
        });
    }

    if candidate.deadline <= now {
        return Err(LedgerError::DeadlineTooSoon {
            deadline: candidate.deadline,
            now,
        });
    }

    let earliest = now.saturating_add(min_duration_secs);
    if candidate.deadline < earliest {
        return Err(LedgerError::MinDurationNotMet {
            deadline: candidate.deadline,
            earliest,
        });
    }

    Ok(())
}

/// All listings ever created.
#[derive(Clone, Debug, Default)]
pub struct ListingRegistry {
    listings: Vec<Listing>,
}

impl ListingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next listing will receive; also the number of listings.
    #[must_use]
    pub fn next_id(&self) -> ListingId {
        self.listings.len() as ListingId
    }

    /// Stored listing, if `id` was ever assigned.
    #[must_use]
    pub fn get(&self, id: ListingId) -> Option<&Listing> {
        usize::try_from(id).ok().and_then(|i| self.listings.get(i))
    }

    /// Stored listing or `ListingNotExistent`.
    pub fn require(&self, id: ListingId) -> Result<&Listing, LedgerError> {
        self.get(id).ok_or(LedgerError::ListingNotExistent(id))
    }

    /// Stored listing that is currently active.
    pub fn require_active(&self, id: ListingId) -> Result<&Listing, LedgerError> {
        let listing = self.require(id)?;
        if !listing.active {
            return Err(LedgerError::ListingNotActive(id));
        }
        Ok(listing)
    }

    /// Listing that can be bought outright at `now`.
    ///
    /// Order: `ListingNotExistent`, `ListingExpired`, `ListingNotActive`.
    pub fn require_executable(&self, id: ListingId, now: Timestamp) -> Result<&Listing, LedgerError> {
        let listing = self.require(id)?;
        if listing.is_expired(now) {
            return Err(LedgerError::ListingExpired {
                id,
                deadline: listing.deadline,
            });
        }
        if !listing.active {
            return Err(LedgerError::ListingNotActive(id));
        }
        Ok(listing)
    }

    /// Stores a new listing under the next id.
    pub fn append(&mut self, listing: Listing, journal: &mut Journal) -> ListingId {
        let id = self.next_id();
        self.listings.push(listing);
        journal.record(JournalEntry::ListingAppended);
        id
    }

    /// Applies `change` to listing `id` and returns the updated record.
    pub fn update(
        &mut self,
        id: ListingId,
        journal: &mut Journal,
        change: impl FnOnce(&mut Listing) -> Result<(), LedgerError>,
    ) -> Result<Listing, LedgerError> {
        let slot = usize::try_from(id)
            .ok()
            .and_then(|i| self.listings.get_mut(i))
            .ok_or(LedgerError::ListingNotExistent(id))?;

        let mut updated = slot.clone();
        change(&mut updated)?;
        let previous = std::mem::replace(slot, updated.clone());
        journal.record(JournalEntry::ListingReplaced { id, previous });
        Ok(updated)
    }

    /// Overwrites price and active flag. Only the lister may edit.
    pub fn edit(
        &mut self,
        id: ListingId,
        caller: Address,
        price: U256,
        active: bool,
        journal: &mut Journal,
    ) -> Result<Listing, LedgerError> {
        if self.require(id)?.lister != caller {
            return Err(LedgerError::NotOwner { caller });
        }
        self.update(id, journal, |listing| {
            listing.price = price;
            listing.active = active;
            Ok(())
        })
    }

    pub(crate) fn undo_append(&mut self) {
        self.listings.pop();
    }

    pub(crate) fn undo_replace(&mut self, id: ListingId, previous: Listing) {
        if let Some(slot) = usize::try_from(id).ok().and_then(|i| self.listings.get_mut(i)) {
            *slot = previous;
        }
    }
}
