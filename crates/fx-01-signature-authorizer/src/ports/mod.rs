//! # Ports Layer
//!
//! Trait definitions consumed by the listing ledger.

pub mod inbound;
