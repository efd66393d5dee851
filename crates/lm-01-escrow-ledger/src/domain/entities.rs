//! Escrow records and query views.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Coin, U256};

/// Funds held in escrow on behalf of one account.
///
/// Created on first lock and never deleted; the amount may reach zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedBalance {
    pub owner: Address,
    pub amount: Coin,
}

/// Cumulative escrowed funds an account has released to pay fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentBalance {
    pub owner: Address,
    pub amount: Coin,
}

/// Combined view of an account's escrow position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseUserAccount {
    pub owner: Address,
    pub locked: Coin,
    pub spent: Coin,
    /// Bank balance in the escrow denomination.
    pub general_supply: Coin,
    /// `general_supply + locked`: what the account could pay in fees.
    pub available: Coin,
}

/// Result of an unlock-for-fees request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Fee carried nothing in the escrow denomination, or nothing is locked.
    NothingLocked,

    /// `amount` moved from escrow to the payer's spendable balance.
    ///
    /// `floor_corrected` is set when a counter would have gone negative and
    /// was clamped at zero.
    Unlocked { amount: Coin, floor_corrected: bool },

    /// Locked plus spendable does not cover the fee. Nothing was changed.
    Insufficient { locked: Coin, available: U256 },
}

impl UnlockOutcome {
    pub fn unlocked_amount(&self) -> U256 {
        match self {
            UnlockOutcome::Unlocked { amount, .. } => amount.amount,
            _ => U256::zero(),
        }
    }
}

/// Values compared by the escrow invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowTotals {
    pub total_locked: U256,
    pub sum_locked: U256,
    pub module_balance: U256,
}

impl EscrowTotals {
    pub fn is_consistent(&self) -> bool {
        self.total_locked == self.sum_locked && self.sum_locked == self.module_balance
    }
}
