//! # Error Types
//!
//! Every error is terminal for the current operation and leaves ledger state,
//! asset custody and balances exactly as they were before the call.

use crate::domain::value_objects::{Address, ListingId, PriceDelta, Timestamp, U256};
use fx_01_signature_authorizer::AuthorizationError;
use thiserror::Error;

// =============================================================================
// COLLABORATOR ERRORS
// =============================================================================

/// Failures reported by the asset-transfer gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// `from` does not hold the asset.
    #[error("{from:?} does not own asset {asset:?}#{asset_id}")]
    NotOwner {
        from: Address,
        asset: Address,
        asset_id: U256,
    },

    /// The operator is neither the owner nor approved by it.
    #[error("operator {operator:?} is not approved by {owner:?}")]
    NotAuthorized { owner: Address, operator: Address },

    /// Transfers to the zero address are not allowed.
    #[error("transfer to the zero address")]
    ZeroRecipient,

    /// The receiving address refused the asset.
    #[error("receiver rejected asset: {0}")]
    ReceiverRejected(String),
}

/// Failures reported by the native-currency transfer port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Caller cannot cover the value attached to the call.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: U256, available: U256 },

    /// Registry custody cannot cover a payout.
    #[error("insufficient custody: required {required}, available {available}")]
    InsufficientCustody { required: U256, available: U256 },

    /// The recipient refused the payment.
    #[error("recipient rejected payment: {0}")]
    RecipientRejected(String),

    /// A balance would exceed 2^256 - 1.
    #[error("balance overflow")]
    Overflow,
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Error classification, mirroring how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the right to perform the operation.
    Authorization,
    /// Inputs violate listing rules.
    Validation,
    /// Listing does not exist or is in the wrong state.
    Lifecycle,
    /// Attached value or fraction balance does not settle.
    Settlement,
    /// An external collaborator refused its part.
    Collaborator,
    /// The call re-entered an in-flight operation.
    Concurrency,
}

impl ErrorKind {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Lifecycle => "lifecycle",
            Self::Settlement => "settlement",
            Self::Collaborator => "collaborator",
            Self::Concurrency => "concurrency",
        }
    }
}

/// Errors returned by ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller does not own the asset or the listing.
    #[error("caller {caller:?} is not the owner")]
    NotOwner { caller: Address },

    /// Owner has not approved the registry to move its assets.
    #[error("registry {operator:?} is not approved by {owner:?}")]
    NotApproved { owner: Address, operator: Address },

    /// Price below the listing minimum.
    #[error("price {price} below minimum {minimum}")]
    MinPriceTooLow { price: U256, minimum: U256 },

    /// Deadline is not in the future.
    #[error("deadline {deadline} is not after now ({now})")]
    DeadlineTooSoon { deadline: Timestamp, now: Timestamp },

    /// Deadline is in the future but closer than the minimum duration.
    #[error("deadline {deadline} is before earliest allowed {earliest}")]
    MinDurationNotMet {
        deadline: Timestamp,
        earliest: Timestamp,
    },

    /// The listing signature is malformed or was not produced by the caller.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] AuthorizationError),

    /// No listing with this id was ever created.
    #[error("listing {0} does not exist")]
    ListingNotExistent(ListingId),

    /// Listing exists but is inactive.
    #[error("listing {0} is not active")]
    ListingNotActive(ListingId),

    /// Listing deadline has passed.
    #[error("listing {id} expired at {deadline}")]
    ListingExpired { id: ListingId, deadline: Timestamp },

    /// Attached value does not settle the amount due.
    #[error("price not met ({0})")]
    PriceNotMet(PriceDelta),

    /// Caller holds no single record covering the requested amount.
    #[error("no fraction record covering {requested}")]
    InsufficientFractionBalance { requested: U256 },

    /// Caller holds no record in this listing.
    #[error("{owner:?} holds no fraction of listing {id}")]
    FractionNotFound { id: ListingId, owner: Address },

    /// A mint of zero shares.
    #[error("share count must be positive")]
    InvalidShareCount,

    /// The mint or transfer would exceed a configured record limit.
    #[error("fraction capacity exceeded (limit {limit})")]
    FractionCapacityExceeded { limit: u64 },

    /// Redemption would push the share count below zero.
    #[error("share count of listing {0} would underflow")]
    ShareCountUnderflow(ListingId),

    /// Fractions cannot be sent to the tombstone sentinel.
    #[error("invalid fraction recipient")]
    InvalidRecipient,

    /// Caller is not the fee-vault admin.
    #[error("caller {caller:?} is not the admin")]
    NotAdmin { caller: Address },

    /// Value attached to a non-payable operation.
    #[error("operation does not accept value (attached {value})")]
    ValueNotAccepted { value: U256 },

    /// The call re-entered an operation that is still in flight.
    #[error("re-entrant call rejected")]
    ReentrantCall,

    /// A counter would exceed its range.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// The asset-transfer gateway refused the custody move.
    #[error("asset transfer failed: {0}")]
    AssetTransfer(#[from] GatewayError),

    /// A currency transfer failed.
    #[error("payment failed: {0}")]
    Payment(#[from] TransferError),
}

impl LedgerError {
    /// Classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } | Self::NotApproved { .. } | Self::NotAdmin { .. } => {
                ErrorKind::Authorization
            }
            Self::MinPriceTooLow { .. }
            | Self::DeadlineTooSoon { .. }
            | Self::MinDurationNotMet { .. }
            | Self::InvalidSignature(_)
            | Self::InvalidShareCount
            | Self::InvalidRecipient
            | Self::ValueNotAccepted { .. }
            | Self::FractionCapacityExceeded { .. } => ErrorKind::Validation,
            Self::ListingNotExistent(_)
            | Self::ListingNotActive(_)
            | Self::ListingExpired { .. } => ErrorKind::Lifecycle,
            Self::PriceNotMet(_)
            | Self::InsufficientFractionBalance { .. }
            | Self::FractionNotFound { .. }
            | Self::ShareCountUnderflow(_)
            | Self::ArithmeticOverflow => ErrorKind::Settlement,
            Self::AssetTransfer(_) | Self::Payment(_) => ErrorKind::Collaborator,
            Self::ReentrantCall => ErrorKind::Concurrency,
        }
    }
}
