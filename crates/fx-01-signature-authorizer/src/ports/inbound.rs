//! # Inbound Ports (Driving Ports / API)
//!
//! Traits the listing ledger consumes to authorize new listings.

use crate::domain::entities::ListingMessage;
use crate::domain::errors::AuthorizationError;
use shared_types::{Address, Hash};

/// Recovers the address that signed a digest.
pub trait SignerRecovery: Send + Sync {
    /// Recover the signer of `digest` from an `r ‖ s ‖ v` blob.
    ///
    /// Fails on malformed signature bytes.
    fn recover_signer(&self, digest: &Hash, signature: &[u8]) -> Result<Address, AuthorizationError>;
}

/// Decides whether a listing message was authorized by its lister.
///
/// Implementations must be deterministic and must never mutate state.
pub trait ListingAuthorizer: Send + Sync {
    /// Verify that `signature` was produced by `message.lister` over the
    /// canonical digest of `message`. Returns the recovered signer.
    fn authorize(
        &self,
        message: &ListingMessage,
        signature: &[u8],
    ) -> Result<Address, AuthorizationError>;

    /// Boolean form of [`authorize`](Self::authorize).
    fn is_authorized(&self, message: &ListingMessage, signature: &[u8]) -> bool {
        self.authorize(message, signature).is_ok()
    }
}
