//! # Listing Authorizer Service
//!
//! Implements the inbound ports on top of the ECDSA domain logic.

use crate::domain::digest::{listing_digest, personal_message_hash};
use crate::domain::ecdsa;
use crate::domain::entities::{ListingMessage, RecoverableSignature};
use crate::domain::errors::AuthorizationError;
use crate::ports::inbound::{ListingAuthorizer, SignerRecovery};
use shared_types::{Address, Hash};
use tracing::debug;

/// secp256k1 listing authorizer.
///
/// The signed prehash is the personal-message hash of the listing digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaListingAuthorizer;

impl EcdsaListingAuthorizer {
    /// Create a new authorizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SignerRecovery for EcdsaListingAuthorizer {
    fn recover_signer(&self, digest: &Hash, signature: &[u8]) -> Result<Address, AuthorizationError> {
        let parsed = RecoverableSignature::from_bytes(signature)?;
        ecdsa::recover_signer(digest, &parsed)
    }
}

impl ListingAuthorizer for EcdsaListingAuthorizer {
    fn authorize(
        &self,
        message: &ListingMessage,
        signature: &[u8],
    ) -> Result<Address, AuthorizationError> {
        let prehash = personal_message_hash(&listing_digest(message));
        let recovered = self.recover_signer(&prehash, signature)?;

        if recovered != message.lister {
            debug!(
                expected = %message.lister,
                actual = %recovered,
                "Listing signature recovered a different signer"
            );
            return Err(AuthorizationError::SignerMismatch {
                expected: message.lister,
                actual: recovered,
            });
        }

        Ok(recovered)
    }
}
