//! # Asset Registry Adapter
//!
//! In-memory non-fungible asset registry: ownership, operator approvals and
//! custody transfers. Receivers may register a hook that runs after an asset
//! lands with them.

use crate::domain::value_objects::{Address, U256};
use crate::errors::GatewayError;
use crate::ports::outbound::{AssetTransferGateway, Checkpoint, Journaled};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Callback run after `to` received `(asset, asset_id)` from `from`.
pub type ReceiveHook =
    Arc<dyn Fn(Address, Address, U256, Address) -> Result<(), GatewayError> + Send + Sync>;

#[derive(Clone, Debug, Default)]
struct Holdings {
    owners: HashMap<(Address, U256), Address>,
    approvals: HashSet<(Address, Address)>,
}

/// Ownership and approvals of every asset.
#[derive(Default)]
pub struct InMemoryAssetRegistry {
    holdings: RwLock<Holdings>,
    snapshots: Mutex<Vec<Holdings>>,
    hooks: RwLock<HashMap<Address, ReceiveHook>>,
}

impl InMemoryAssetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `(asset, asset_id)` to `owner`, replacing any holder.
    pub fn mint(&self, asset: Address, asset_id: U256, owner: Address) {
        self.holdings.write().owners.insert((asset, asset_id), owner);
    }

    /// Grants or revokes `operator` over every asset of `owner`.
    pub fn set_approval_for_all(&self, owner: Address, operator: Address, approved: bool) {
        let mut holdings = self.holdings.write();
        if approved {
            holdings.approvals.insert((owner, operator));
        } else {
            holdings.approvals.remove(&(owner, operator));
        }
    }

    /// Runs `hook` whenever `receiver` gets an asset.
    pub fn set_receive_hook(&self, receiver: Address, hook: ReceiveHook) {
        self.hooks.write().insert(receiver, hook);
    }

    /// Removes the hook of `receiver`.
    pub fn clear_receive_hook(&self, receiver: &Address) {
        self.hooks.write().remove(receiver);
    }
}

impl std::fmt::Debug for InMemoryAssetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAssetRegistry")
            .field("holdings", &*self.holdings.read())
            .field("snapshots", &self.snapshots.lock().len())
            .finish_non_exhaustive()
    }
}

impl Journaled for InMemoryAssetRegistry {
    fn checkpoint(&self) -> Checkpoint {
        let snapshot = self.holdings.read().clone();
        let mut snapshots = self.snapshots.lock();
        snapshots.push(snapshot);
        Checkpoint(snapshots.len() - 1)
    }

    fn revert_to(&self, checkpoint: Checkpoint) {
        let mut snapshots = self.snapshots.lock();
        if checkpoint.0 >= snapshots.len() {
            return;
        }
        if let Some(holdings) = snapshots.split_off(checkpoint.0).into_iter().next() {
            *self.holdings.write() = holdings;
        }
    }

    fn commit(&self, checkpoint: Checkpoint) {
        self.snapshots.lock().truncate(checkpoint.0);
    }
}

impl AssetTransferGateway for InMemoryAssetRegistry {
    fn owner_of(&self, asset: Address, asset_id: U256) -> Option<Address> {
        self.holdings.read().owners.get(&(asset, asset_id)).copied()
    }

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.holdings.read().approvals.contains(&(owner, operator))
    }

    fn transfer_from(
        &self,
        operator: Address,
        from: Address,
        to: Address,
        asset: Address,
        asset_id: U256,
    ) -> Result<(), GatewayError> {
        {
            let mut holdings = self.holdings.write();
            if holdings.owners.get(&(asset, asset_id)) != Some(&from) {
                return Err(GatewayError::NotOwner {
                    from,
                    asset,
                    asset_id,
                });
            }
            if operator != from && !holdings.approvals.contains(&(from, operator)) {
                return Err(GatewayError::NotAuthorized {
                    owner: from,
                    operator,
                });
            }
            if to.is_zero() {
                return Err(GatewayError::ZeroRecipient);
            }
            holdings.owners.insert((asset, asset_id), to);
        }
        debug!(%from, %to, %asset, %asset_id, "Asset custody moved");

        let hook = self.hooks.read().get(&to).cloned();
        match hook {
            Some(hook) => hook(asset, from, asset_id, to),
            None => Ok(()),
        }
    }
}
