//! # Fee Vault
//!
//! Accumulates the platform fee skimmed from fraction redemptions. Only the
//! admin fixed at construction can withdraw it.

use crate::domain::journal::{Journal, JournalEntry};
use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;

/// Platform fee balance and its admin.
#[derive(Clone, Debug)]
pub struct FeeVault {
    admin: Address,
    balance: U256,
    fee_divisor: U256,
}

impl FeeVault {
    /// Create an empty vault. A zero divisor is treated as one.
    #[must_use]
    pub fn new(admin: Address, fee_divisor: u64) -> Self {
        Self {
            admin,
            balance: U256::zero(),
            fee_divisor: U256::from(fee_divisor.max(1)),
        }
    }

    /// Immutable admin identity.
    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Accumulated, unwithdrawn fees.
    #[must_use]
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Fee owed on a trade of `value` (truncating division).
    #[must_use]
    pub fn fee_for(&self, value: U256) -> U256 {
        value / self.fee_divisor
    }

    /// Adds `fee` to the balance.
    pub fn credit(&mut self, fee: U256, journal: &mut Journal) -> Result<(), LedgerError> {
        let updated = self
            .balance
            .checked_add(fee)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        journal.record(JournalEntry::PlatformBalance {
            previous: self.balance,
        });
        self.balance = updated;
        Ok(())
    }

    /// Zeroes the balance for the admin and returns the withdrawn amount.
    /// The caller pays it out afterwards.
    pub fn begin_withdrawal(
        &mut self,
        caller: Address,
        journal: &mut Journal,
    ) -> Result<U256, LedgerError> {
        if caller != self.admin {
            return Err(LedgerError::NotAdmin { caller });
        }
        let amount = self.balance;
        journal.record(JournalEntry::PlatformBalance { previous: amount });
        self.balance = U256::zero();
        Ok(amount)
    }

    pub(crate) fn undo_balance(&mut self, previous: U256) {
        self.balance = previous;
    }
}
