//! # Signature Authorizer (FX-01)
//!
//! Verifies that a listing message was authorized by its claimed lister.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): digest construction and secp256k1 recovery, no I/O
//! - **Ports Layer** (`ports/`): the `ListingAuthorizer` and `SignerRecovery` traits
//! - **Service Layer** (`service.rs`): `EcdsaListingAuthorizer`, wiring domain to ports
//! - **Signing** (`signing.rs`): client-side helper producing listing signatures
//!
//! ## Security Notes
//!
//! - **Injective Digest**: every field is encoded as a fixed 32-byte word, so two
//!   distinct listings can never share a digest
//! - **Malleability Prevention (EIP-2)**: signatures with high S values are rejected
//! - **Caller Binding**: the ledger always verifies against the calling address,
//!   never against a lister supplied in the candidate

pub mod domain;
pub mod ports;
pub mod service;
pub mod signing;

// Re-export public API
pub use domain::digest::{encode_listing_message, listing_digest, personal_message_hash};
pub use domain::ecdsa::{address_from_pubkey, keccak256, recover_signer};
pub use domain::entities::{ListingMessage, RecoverableSignature, SIGNATURE_LENGTH};
pub use domain::errors::AuthorizationError;
pub use ports::inbound::{ListingAuthorizer, SignerRecovery};
pub use service::EcdsaListingAuthorizer;
