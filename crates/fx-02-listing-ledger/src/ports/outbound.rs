//! # Outbound Ports (Driven Ports)
//!
//! Collaborators the ledger depends on: the asset registry, the native
//! currency, the clock and the notification sink.

use crate::domain::value_objects::{Address, Timestamp, U256};
use crate::errors::{GatewayError, TransferError};
use crate::events::MarketEvent;

// =============================================================================
// JOURNALED COLLABORATORS
// =============================================================================

/// Position in a collaborator's undo history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(pub usize);

/// Collaborators that take part in an operation's all-or-nothing guarantee.
///
/// The ledger takes a checkpoint before an operation, then either commits it
/// or reverts to it.
pub trait Journaled: Send + Sync {
    /// Marks the current state.
    fn checkpoint(&self) -> Checkpoint;

    /// Restores the state marked by `checkpoint` and discards it.
    fn revert_to(&self, checkpoint: Checkpoint);

    /// Keeps all changes since `checkpoint` and discards the mark.
    fn commit(&self, checkpoint: Checkpoint);
}

/// Non-fungible asset registry.
pub trait AssetTransferGateway: Journaled {
    /// Current holder of `(asset, asset_id)`, `None` if it was never minted.
    fn owner_of(&self, asset: Address, asset_id: U256) -> Option<Address>;

    /// True if `operator` may move every asset of `owner`.
    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Moves custody from `from` to `to` on behalf of `operator`.
    fn transfer_from(
        &self,
        operator: Address,
        from: Address,
        to: Address,
        asset: Address,
        asset_id: U256,
    ) -> Result<(), GatewayError>;
}

/// Native currency movements between accounts and registry custody.
pub trait ValueTransfer: Journaled {
    /// Moves value attached to a call from `from` into custody.
    fn receive(&self, from: Address, amount: U256) -> Result<(), TransferError>;

    /// Pays `amount` out of custody to `to`.
    fn send(&self, to: Address, amount: U256) -> Result<(), TransferError>;

    /// Currency currently held by the registry.
    fn custody_balance(&self) -> U256;
}

// =============================================================================
// CLOCK AND NOTIFICATIONS
// =============================================================================

/// Trusted monotonic clock.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Receives notifications of committed operations.
pub trait EventSink: Send + Sync {
    /// Publishes one notification.
    fn publish(&self, event: MarketEvent);
}
