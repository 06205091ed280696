//! # Value Ledger Adapter
//!
//! In-memory native currency: account balances plus the registry's custody.
//! Recipients can register a hook that runs on every payment they receive,
//! which is how tests model contract recipients that call back into the
//! marketplace or refuse payment.

use crate::domain::value_objects::{Address, U256};
use crate::errors::TransferError;
use crate::ports::outbound::{Checkpoint, Journaled, ValueTransfer};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Callback run after `to` has been credited `amount`.
pub type PaymentHook = Arc<dyn Fn(Address, U256) -> Result<(), TransferError> + Send + Sync>;

#[derive(Clone, Debug, Default)]
struct Books {
    balances: HashMap<Address, U256>,
    custody: U256,
}

/// Account balances and registry custody.
#[derive(Default)]
pub struct InMemoryValueLedger {
    books: RwLock<Books>,
    snapshots: Mutex<Vec<Books>>,
    hooks: RwLock<HashMap<Address, PaymentHook>>,
}

impl InMemoryValueLedger {
    /// Create empty books.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `account` out of thin air.
    pub fn deposit(&self, account: Address, amount: U256) {
        let mut books = self.books.write();
        let balance = books.balances.entry(account).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Current balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.books
            .read()
            .balances
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Runs `hook` whenever `account` is paid.
    pub fn set_payment_hook(&self, account: Address, hook: PaymentHook) {
        self.hooks.write().insert(account, hook);
    }

    /// Removes the hook of `account`.
    pub fn clear_payment_hook(&self, account: &Address) {
        self.hooks.write().remove(account);
    }
}

impl std::fmt::Debug for InMemoryValueLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryValueLedger")
            .field("books", &*self.books.read())
            .field("snapshots", &self.snapshots.lock().len())
            .finish_non_exhaustive()
    }
}

impl Journaled for InMemoryValueLedger {
    fn checkpoint(&self) -> Checkpoint {
        let snapshot = self.books.read().clone();
        let mut snapshots = self.snapshots.lock();
        snapshots.push(snapshot);
        Checkpoint(snapshots.len() - 1)
    }

    fn revert_to(&self, checkpoint: Checkpoint) {
        let mut snapshots = self.snapshots.lock();
        if checkpoint.0 >= snapshots.len() {
            return;
        }
        if let Some(books) = snapshots.split_off(checkpoint.0).into_iter().next() {
            *self.books.write() = books;
        }
    }

    fn commit(&self, checkpoint: Checkpoint) {
        self.snapshots.lock().truncate(checkpoint.0);
    }
}

impl ValueTransfer for InMemoryValueLedger {
    fn receive(&self, from: Address, amount: U256) -> Result<(), TransferError> {
        if amount.is_zero() {
            return Ok(());
        }
        let mut books = self.books.write();
        let available = books.balances.get(&from).copied().unwrap_or_default();
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        let custody = books
            .custody
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        books.balances.insert(from, available - amount);
        books.custody = custody;
        debug!(%from, %amount, "Value moved into custody");
        Ok(())
    }

    fn send(&self, to: Address, amount: U256) -> Result<(), TransferError> {
        {
            let mut books = self.books.write();
            if books.custody < amount {
                return Err(TransferError::InsufficientCustody {
                    required: amount,
                    available: books.custody,
                });
            }
            let balance = books.balances.get(&to).copied().unwrap_or_default();
            let credited = balance.checked_add(amount).ok_or(TransferError::Overflow)?;
            books.custody -= amount;
            books.balances.insert(to, credited);
        }
        debug!(%to, %amount, "Value paid out of custody");

        // Locks are released: the hook may call back into anything.
        let hook = self.hooks.read().get(&to).cloned();
        match hook {
            Some(hook) => hook(to, amount),
            None => Ok(()),
        }
    }

    fn custody_balance(&self) -> U256 {
        self.books.read().custody
    }
}
