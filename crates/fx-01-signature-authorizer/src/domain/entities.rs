//! # Domain Entities
//!
//! The listing message that a lister signs, and the recoverable signature
//! that accompanies it.

use super::errors::AuthorizationError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Timestamp, U256};

/// Length of an `r ‖ s ‖ v` signature blob.
pub const SIGNATURE_LENGTH: usize = 65;

/// The tuple a lister signs to authorize a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMessage {
    /// Contract of the listed asset.
    pub asset: Address,
    /// Token identifier within `asset`.
    pub asset_id: U256,
    /// Asking price in wei.
    pub price: U256,
    /// Absolute expiry (seconds since epoch).
    pub deadline: Timestamp,
    /// Address that must have produced the signature.
    pub lister: Address,
}

/// ECDSA signature on secp256k1 with a recovery id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl RecoverableSignature {
    /// Parses an `r ‖ s ‖ v` blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AuthorizationError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(AuthorizationError::InvalidLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Serializes back to an `r ‖ s ‖ v` blob.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}
