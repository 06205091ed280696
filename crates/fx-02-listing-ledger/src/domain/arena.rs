//! # Fraction Arena
//!
//! Append-only storage for one listing's fraction records. Records are
//! addressed by a stable index and never compacted; redeemed records stay in
//! place as tombstones.
//!
//! A per-owner index of live record indices keeps first-match lookups from
//! rescanning the whole sequence. Lookups still return exactly what a linear
//! scan in insertion order would.

use crate::domain::entities::Fraction;
use crate::domain::value_objects::{Address, U256};
use std::collections::{BTreeSet, HashMap};

/// Fraction records of a single listing.
#[derive(Clone, Debug, Default)]
pub struct FractionArena {
    records: Vec<Fraction>,
    by_owner: HashMap<Address, BTreeSet<usize>>,
}

impl FractionArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was ever minted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[Fraction] {
        &self.records
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fraction> {
        self.records.get(index)
    }

    /// Appends a record and returns its index.
    pub fn push(&mut self, fraction: Fraction) -> usize {
        let index = self.records.len();
        self.records.push(fraction);
        self.index(index, fraction);
        index
    }

    /// Removes the last record. Used only to undo a `push`.
    pub fn pop(&mut self) -> Option<Fraction> {
        let fraction = self.records.pop()?;
        self.unindex(self.records.len(), fraction);
        Some(fraction)
    }

    /// Overwrites the record at `index`, returning the previous value.
    /// `None` if `index` is out of range.
    pub fn replace(&mut self, index: usize, fraction: Fraction) -> Option<Fraction> {
        let previous = *self.records.get(index)?;
        self.unindex(index, previous);
        self.records[index] = fraction;
        self.index(index, fraction);
        Some(previous)
    }

    /// First record owned by `owner`, in insertion order.
    #[must_use]
    pub fn first_owned_by(&self, owner: &Address) -> Option<(usize, Fraction)> {
        let index = *self.by_owner.get(owner)?.iter().next()?;
        Some((index, self.records[index]))
    }

    /// First record owned by `owner` whose amount covers `amount`.
    #[must_use]
    pub fn first_covering(&self, owner: &Address, amount: U256) -> Option<(usize, Fraction)> {
        self.by_owner
            .get(owner)?
            .iter()
            .map(|&index| (index, self.records[index]))
            .find(|(_, fraction)| fraction.amount >= amount)
    }

    fn index(&mut self, index: usize, fraction: Fraction) {
        if !fraction.is_tombstone() {
            self.by_owner.entry(fraction.owner).or_default().insert(index);
        }
    }

    fn unindex(&mut self, index: usize, fraction: Fraction) {
        if let Some(indices) = self.by_owner.get_mut(&fraction.owner) {
            indices.remove(&index);
            if indices.is_empty() {
                self.by_owner.remove(&fraction.owner);
            }
        }
    }
}
