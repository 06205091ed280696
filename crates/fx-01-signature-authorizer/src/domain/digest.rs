//! # Listing Digest
//!
//! Canonical encoding of a `ListingMessage`:
//!
//! ```text
//! asset (32, left-padded) ‖ asset_id (32) ‖ price (32) ‖ deadline (32) ‖ lister (32, left-padded)
//! ```
//!
//! Every field occupies a fixed word, so the encoding is injective and a
//! signature for one listing can never verify for another.

use super::ecdsa::keccak256;
use super::entities::ListingMessage;
use shared_types::{u256_to_word, Hash, U256};

/// Size of the canonical encoding in bytes.
pub const ENCODED_LEN: usize = 5 * 32;

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Encodes the message into five 32-byte words.
#[must_use]
pub fn encode_listing_message(message: &ListingMessage) -> [u8; ENCODED_LEN] {
    let mut out = [0u8; ENCODED_LEN];
    out[0..32].copy_from_slice(&message.asset.to_word());
    out[32..64].copy_from_slice(&u256_to_word(message.asset_id));
    out[64..96].copy_from_slice(&u256_to_word(message.price));
    out[96..128].copy_from_slice(&u256_to_word(U256::from(message.deadline)));
    out[128..160].copy_from_slice(&message.lister.to_word());
    out
}

/// Keccak-256 of the canonical encoding.
#[must_use]
pub fn listing_digest(message: &ListingMessage) -> Hash {
    keccak256(&encode_listing_message(message))
}

/// Wraps a 32-byte digest the way wallets do when asked to sign it.
#[must_use]
pub fn personal_message_hash(digest: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + digest.len());
    buf.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    buf.extend_from_slice(digest);
    keccak256(&buf)
}
