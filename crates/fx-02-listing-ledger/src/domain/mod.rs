//! # Domain Layer
//!
//! Pure ledger logic: listings, fraction records, the fee vault and the
//! undo journal that makes each operation all-or-nothing.

pub mod arena;
pub mod entities;
pub mod fractions;
pub mod invariants;
pub mod journal;
pub mod registry;
pub mod state;
pub mod value_objects;
pub mod vault;

pub use arena::FractionArena;
pub use entities::{Fraction, Listing, ListingCandidate};
pub use fractions::{FractionLedger, FractionLimits};
pub use invariants::{check_all_invariants, InvariantCheckResult, InvariantViolation};
pub use journal::{Journal, JournalEntry};
pub use registry::{validate_terms, ListingRegistry};
pub use state::{LedgerState, Minted, Redemption};
pub use value_objects::*;
pub use vault::FeeVault;
