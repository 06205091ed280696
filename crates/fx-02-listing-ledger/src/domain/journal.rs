//! # Undo Journal
//!
//! Every mutation of ledger state inside an operation records how to undo it.
//! On failure the entries are replayed newest-first, so the state is restored
//! exactly as it was before the call.

use crate::domain::entities::{Fraction, Listing};
use crate::domain::value_objects::{Address, ListingId, U256};

/// One undoable mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalEntry {
    /// A listing was appended to the registry.
    ListingAppended,
    /// A stored listing was overwritten.
    ListingReplaced { id: ListingId, previous: Listing },
    /// A fraction record was appended to a listing's arena.
    FractionAppended { listing: ListingId },
    /// A fraction record was overwritten.
    FractionReplaced {
        listing: ListingId,
        index: usize,
        previous: Fraction,
    },
    /// A redemption receipt was appended for `owner`.
    ReceiptAppended { owner: Address },
    /// The platform balance changed.
    PlatformBalance { previous: U256 },
}

/// Entries recorded by the in-flight operation.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mutation.
    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been mutated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discards all entries, making the mutations permanent.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Takes all entries, newest first.
    pub fn drain_newest_first(&mut self) -> impl Iterator<Item = JournalEntry> + '_ {
        self.entries.drain(..).rev()
    }
}
