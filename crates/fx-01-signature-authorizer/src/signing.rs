//! # Listing Signing
//!
//! Client-side helper that produces the signature the ledger expects. The
//! ledger itself never signs; wallets, tooling and tests do.

use crate::domain::digest::{listing_digest, personal_message_hash};
use crate::domain::ecdsa::{address_from_pubkey, invert_s, is_low_s};
use crate::domain::entities::{ListingMessage, RecoverableSignature, SIGNATURE_LENGTH};
use crate::domain::errors::AuthorizationError;
use k256::ecdsa::SigningKey;
use shared_types::{Address, Hash};

/// Address controlled by `key`.
#[must_use]
pub fn address_of(key: &SigningKey) -> Address {
    address_from_pubkey(key.verifying_key())
}

/// Sign a raw prehash, normalized to low-S with a legacy (27/28) recovery id.
pub fn sign_prehash(
    key: &SigningKey,
    prehash: &Hash,
) -> Result<RecoverableSignature, AuthorizationError> {
    let (sig, recid) = key
        .sign_prehash_recoverable(prehash)
        .map_err(|_| AuthorizationError::SigningFailed)?;

    let sig_bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    // Flipping S flips the parity of the recovered point.
    let mut parity = recid.to_byte() & 1;
    if !is_low_s(&s) {
        s = invert_s(&s);
        parity ^= 1;
    }

    Ok(RecoverableSignature { r, s, v: 27 + parity })
}

/// Sign a listing message as `key`'s owner would from a wallet.
pub fn sign_listing(
    key: &SigningKey,
    message: &ListingMessage,
) -> Result<[u8; SIGNATURE_LENGTH], AuthorizationError> {
    let prehash = personal_message_hash(&listing_digest(message));
    Ok(sign_prehash(key, &prehash)?.to_bytes())
}
