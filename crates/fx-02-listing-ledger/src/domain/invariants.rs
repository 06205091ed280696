//! # Domain Invariants
//!
//! Properties that hold between operations:
//!
//! - Custody Coverage: registry custody is never below the platform balance
//! - Spent Records Are Empty: every tombstone carries a zero amount
//! - Share Counts Stay In Range: no listing reports shares it never minted

use crate::domain::state::LedgerState;
use crate::domain::value_objects::{ListingId, U256};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Custody must cover the fees owed to the admin.
#[must_use]
pub fn check_custody_invariant(state: &LedgerState, custody: U256) -> bool {
    custody >= state.vault().balance()
}

/// Tombstones carry no value.
#[must_use]
pub fn check_tombstone_invariant(state: &LedgerState) -> Option<(ListingId, usize)> {
    state.fractions().arenas().find_map(|(&listing, arena)| {
        arena
            .records()
            .iter()
            .position(|f| f.is_tombstone() && !f.amount.is_zero())
            .map(|index| (listing, index))
    })
}

/// Outstanding shares never exceed the records ever stored for the listing.
#[must_use]
pub fn check_share_count_invariant(state: &LedgerState) -> Option<ListingId> {
    let registry = state.registry();
    (0..registry.next_id()).find(|&id| {
        let records = state.fractions().records(id).len() as u64;
        registry
            .get(id)
            .is_some_and(|listing| listing.total_shares > records)
    })
}

/// Runs every check against `state` and the registry's current custody.
#[must_use]
pub fn check_all_invariants(state: &LedgerState, custody: U256) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_custody_invariant(state, custody) {
        violations.push(InvariantViolation::CustodyBelowPlatformBalance {
            custody,
            platform_balance: state.vault().balance(),
        });
    }

    if let Some((listing, index)) = check_tombstone_invariant(state) {
        violations.push(InvariantViolation::TombstoneCarriesValue { listing, index });
    }

    if let Some(listing) = check_share_count_invariant(state) {
        violations.push(InvariantViolation::ShareCountOutOfRange { listing });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of an invariant check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Custody cannot pay out the platform balance.
    CustodyBelowPlatformBalance {
        custody: U256,
        platform_balance: U256,
    },
    /// A tombstone still holds value.
    TombstoneCarriesValue { listing: ListingId, index: usize },
    /// A listing counts more shares than it ever stored records.
    ShareCountOutOfRange { listing: ListingId },
}
