//! # Authorization Errors

use shared_types::Address;
use thiserror::Error;

/// Errors that can occur while authorizing a listing message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The signature blob is not 65 bytes.
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    /// R or S is zero or not below the curve order.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Recovered signer does not match expected signer
    #[error("Signer mismatch: expected {expected:?}, got {actual:?}")]
    SignerMismatch { expected: Address, actual: Address },

    /// The signing key could not produce a signature (client-side only).
    #[error("Signing failed")]
    SigningFailed,
}

impl AuthorizationError {
    /// Returns true if the signature bytes themselves were malformed, as opposed
    /// to well-formed but produced by someone else.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::SignerMismatch { .. } | Self::SigningFailed)
    }
}
