//! Escrow genesis import and export.

use serde::{Deserialize, Serialize};
use shared_types::codec;
use shared_types::{Coin, Context, U256};

use crate::domain::keys::{locked_key, spent_key, TOTAL_LOCKED_KEY, TOTAL_SPENT_KEY};
use crate::domain::{EscrowError, LockedBalance, SpentBalance};
use crate::service::EscrowLedger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowGenesis {
    pub locked: Vec<LockedBalance>,
    #[serde(default)]
    pub spent: Vec<SpentBalance>,
    pub total_locked: Coin,
    pub total_spent: Coin,
}

impl EscrowGenesis {
    pub fn empty(denom: &str) -> Self {
        Self {
            locked: Vec::new(),
            spent: Vec::new(),
            total_locked: Coin::zero(denom),
            total_spent: Coin::zero(denom),
        }
    }

    /// Stateless checks: denominations agree and the listed balances add up
    /// to the declared totals.
    pub fn validate(&self, denom: &str) -> Result<(), EscrowError> {
        let mut seen = std::collections::BTreeSet::new();
        let mut sum = U256::zero();
        for locked in &self.locked {
            if locked.amount.denom != denom {
                return Err(EscrowError::InvalidGenesis(format!(
                    "locked balance of {} uses denomination {}",
                    locked.owner, locked.amount.denom
                )));
            }
            if !seen.insert(locked.owner) {
                return Err(EscrowError::InvalidGenesis(format!(
                    "duplicate locked balance for {}",
                    locked.owner
                )));
            }
            sum = sum
                .checked_add(locked.amount.amount)
                .ok_or_else(|| EscrowError::InvalidGenesis("locked total overflows".into()))?;
        }
        if self.total_locked.denom != denom || sum != self.total_locked.amount {
            return Err(EscrowError::InvalidGenesis(format!(
                "sum of locked balances {} does not match total locked {}",
                sum, self.total_locked
            )));
        }

        let mut spent_sum = U256::zero();
        for spent in &self.spent {
            if spent.amount.denom != denom {
                return Err(EscrowError::InvalidGenesis(format!(
                    "spent balance of {} uses denomination {}",
                    spent.owner, spent.amount.denom
                )));
            }
            spent_sum = spent_sum.saturating_add(spent.amount.amount);
        }
        if self.total_spent.denom != denom || spent_sum != self.total_spent.amount {
            return Err(EscrowError::InvalidGenesis(format!(
                "sum of spent balances {} does not match total spent {}",
                spent_sum, self.total_spent
            )));
        }
        Ok(())
    }
}

impl EscrowLedger {
    /// Import escrow state. Bank balances must already be in place: the
    /// escrow module account has to hold exactly the total locked amount.
    pub fn init_genesis(&self, ctx: &mut Context<'_>, genesis: &EscrowGenesis) -> Result<(), EscrowError> {
        genesis.validate(self.denom())?;

        for locked in &genesis.locked {
            codec::save(ctx.store_mut(), &locked_key(&locked.owner), locked)?;
        }
        for spent in &genesis.spent {
            codec::save(ctx.store_mut(), &spent_key(&spent.owner), spent)?;
        }
        codec::save(ctx.store_mut(), TOTAL_LOCKED_KEY, &genesis.total_locked)?;
        codec::save(ctx.store_mut(), TOTAL_SPENT_KEY, &genesis.total_spent)?;

        let totals = self.totals(ctx)?;
        if !totals.is_consistent() {
            return Err(EscrowError::InvalidGenesis(format!(
                "escrow module account holds {} but total locked is {}",
                totals.module_balance, totals.total_locked
            )));
        }
        tracing::info!(
            "[escrow] genesis imported: {} locked accounts, total {}",
            genesis.locked.len(),
            genesis.total_locked
        );
        Ok(())
    }

    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<EscrowGenesis, EscrowError> {
        Ok(EscrowGenesis {
            locked: self.all_locked(ctx)?,
            spent: self.all_spent(ctx)?,
            total_locked: self.total_locked(ctx)?,
            total_spent: self.total_spent(ctx)?,
        })
    }
}
