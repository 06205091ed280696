//! # Shared Types Crate
//!
//! Primitive value types used across the Fraction-Exchange subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: addresses, hashes, amounts and timestamps are
//!   defined once here and re-used by the authorizer and the ledger.
//! - **Fixed Schema**: every type has a fixed byte width so it can be encoded
//!   into signed digests without ambiguity.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
