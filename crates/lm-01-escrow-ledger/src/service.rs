//! # Escrow Ledger Service
//!
//! Owns per-account and aggregate locked balances plus the spent tallies.
//! Funds are held by the `enterprise` module account through the bank's
//! delegate/undelegate pair, so the module balance always mirrors the
//! aggregate counter.

use std::sync::Arc;

use shared_types::codec;
use shared_types::{Address, BankKeeper, Coin, Coins, Context, Event, U256};
use tracing::{debug, info, warn};

use crate::domain::keys::{
    locked_key, spent_key, LOCKED_PREFIX, SPENT_PREFIX, TOTAL_LOCKED_KEY, TOTAL_SPENT_KEY,
};
use crate::domain::{
    EnterpriseUserAccount, EscrowError, EscrowTotals, LockedBalance, SpentBalance, UnlockOutcome,
};
use crate::ports::EscrowApi;

/// Module account that holds escrowed funds.
pub const MODULE_NAME: &str = "enterprise";

pub const EVENT_FUNDS_LOCKED: &str = "locked_funds_minted";
pub const EVENT_FUNDS_UNLOCKED: &str = "locked_funds_unlocked";

/// Escrow ledger keeper.
#[derive(Clone)]
pub struct EscrowLedger {
    denom: String,
    bank: Arc<dyn BankKeeper>,
}

impl std::fmt::Debug for EscrowLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowLedger").field("denom", &self.denom).finish()
    }
}

impl EscrowLedger {
    pub fn new(denom: impl Into<String>, bank: Arc<dyn BankKeeper>) -> Self {
        Self {
            denom: denom.into(),
            bank,
        }
    }

    pub fn denom(&self) -> &str {
        &self.denom
    }

    /// Follow a denomination change in the enterprise params.
    pub fn set_denom(&mut self, denom: impl Into<String>) {
        self.denom = denom.into();
    }

    pub fn bank(&self) -> &dyn BankKeeper {
        self.bank.as_ref()
    }

    pub fn module_address(&self) -> Address {
        self.bank.module_address(MODULE_NAME)
    }

    // =========================================================================
    // RECORD ACCESS
    // =========================================================================

    pub fn locked_balance(&self, ctx: &Context<'_>, addr: &Address) -> Result<LockedBalance, EscrowError> {
        let stored: Option<LockedBalance> = codec::load(ctx.store(), &locked_key(addr))?;
        Ok(stored.unwrap_or_else(|| LockedBalance {
            owner: *addr,
            amount: Coin::zero(self.denom.clone()),
        }))
    }

    fn set_locked_balance(&self, ctx: &mut Context<'_>, locked: &LockedBalance) -> Result<(), EscrowError> {
        codec::save(ctx.store_mut(), &locked_key(&locked.owner), locked)?;
        Ok(())
    }

    pub fn total_locked(&self, ctx: &Context<'_>) -> Result<Coin, EscrowError> {
        let stored: Option<Coin> = codec::load(ctx.store(), TOTAL_LOCKED_KEY)?;
        Ok(stored.unwrap_or_else(|| Coin::zero(self.denom.clone())))
    }

    fn set_total_locked(&self, ctx: &mut Context<'_>, total: &Coin) -> Result<(), EscrowError> {
        codec::save(ctx.store_mut(), TOTAL_LOCKED_KEY, total)?;
        Ok(())
    }

    pub fn spent_balance(&self, ctx: &Context<'_>, addr: &Address) -> Result<SpentBalance, EscrowError> {
        let stored: Option<SpentBalance> = codec::load(ctx.store(), &spent_key(addr))?;
        Ok(stored.unwrap_or_else(|| SpentBalance {
            owner: *addr,
            amount: Coin::zero(self.denom.clone()),
        }))
    }

    pub fn total_spent(&self, ctx: &Context<'_>) -> Result<Coin, EscrowError> {
        let stored: Option<Coin> = codec::load(ctx.store(), TOTAL_SPENT_KEY)?;
        Ok(stored.unwrap_or_else(|| Coin::zero(self.denom.clone())))
    }

    /// Every locked balance record, ordered by address.
    pub fn all_locked(&self, ctx: &Context<'_>) -> Result<Vec<LockedBalance>, EscrowError> {
        Ok(codec::load_all(ctx.store(), LOCKED_PREFIX)?)
    }

    /// Every spent balance record, ordered by address.
    pub fn all_spent(&self, ctx: &Context<'_>) -> Result<Vec<SpentBalance>, EscrowError> {
        Ok(codec::load_all(ctx.store(), SPENT_PREFIX)?)
    }

    // =========================================================================
    // COUNTER UPDATES
    // =========================================================================

    fn ensure_denom(&self, coin: &Coin) -> Result<(), EscrowError> {
        if coin.denom != self.denom {
            return Err(EscrowError::InvalidDenom {
                expected: self.denom.clone(),
                actual: coin.denom.clone(),
            });
        }
        Ok(())
    }

    fn increment_locked(&self, ctx: &mut Context<'_>, addr: &Address, amount: &Coin) -> Result<(), EscrowError> {
        let mut locked = self.locked_balance(ctx, addr)?;
        locked.amount = locked.amount.checked_add(amount)?;
        self.set_locked_balance(ctx, &locked)?;

        let total = self.total_locked(ctx)?.checked_add(amount)?;
        self.set_total_locked(ctx, &total)
    }

    /// Decrement both counters, clamping at zero. Returns true if either
    /// clamp was hit.
    fn decrement_locked(&self, ctx: &mut Context<'_>, addr: &Address, amount: &Coin) -> Result<bool, EscrowError> {
        let mut locked = self.locked_balance(ctx, addr)?;
        let (account_left, account_floored) = locked.amount.saturating_sub(amount)?;
        if account_floored {
            warn!(
                "[escrow] locked balance of {} is {}, below decrement {}; clamping to zero",
                addr, locked.amount, amount
            );
        }
        locked.amount = account_left;
        self.set_locked_balance(ctx, &locked)?;

        let total = self.total_locked(ctx)?;
        let (total_left, total_floored) = total.saturating_sub(amount)?;
        if total_floored {
            warn!(
                "[escrow] total locked {} is below decrement {}; clamping to zero",
                total, amount
            );
        }
        self.set_total_locked(ctx, &total_left)?;
        Ok(account_floored || total_floored)
    }

    fn increment_spent(&self, ctx: &mut Context<'_>, addr: &Address, amount: &Coin) -> Result<(), EscrowError> {
        let mut spent = self.spent_balance(ctx, addr)?;
        spent.amount = spent.amount.checked_add(amount)?;
        codec::save(ctx.store_mut(), &spent_key(addr), &spent)?;

        let total = self.total_spent(ctx)?.checked_add(amount)?;
        codec::save(ctx.store_mut(), TOTAL_SPENT_KEY, &total)?;
        Ok(())
    }

    /// Undelegate `amount` to `payer` and book it as spent.
    fn release(&self, ctx: &mut Context<'_>, payer: &Address, amount: Coin) -> Result<UnlockOutcome, EscrowError> {
        ctx.run_atomic(|ctx| {
            self.bank.undelegate_coins_from_module_to_account(
                ctx,
                MODULE_NAME,
                payer,
                &Coins::single(amount.clone()),
            )?;
            let floor_corrected = self.decrement_locked(ctx, payer, &amount)?;
            self.increment_spent(ctx, payer, &amount)?;
            ctx.emit(
                Event::new(EVENT_FUNDS_UNLOCKED)
                    .attr("owner", payer)
                    .attr("amount", &amount),
            );
            debug!("[escrow] unlocked {} for {}", amount, payer);
            Ok(UnlockOutcome::Unlocked {
                amount,
                floor_corrected,
            })
        })
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn enterprise_user_account(
        &self,
        ctx: &Context<'_>,
        addr: &Address,
    ) -> Result<EnterpriseUserAccount, EscrowError> {
        let locked = self.locked_balance(ctx, addr)?.amount;
        let spent = self.spent_balance(ctx, addr)?.amount;
        let bank_amount = self.bank.all_balances(ctx, addr)?.amount_of(&self.denom);
        let general_supply = Coin::new(self.denom.clone(), bank_amount);
        let available = general_supply.checked_add(&locked)?;
        Ok(EnterpriseUserAccount {
            owner: *addr,
            locked,
            spent,
            general_supply,
            available,
        })
    }

    /// Bank supply of the escrow denomination, locked funds included.
    pub fn total_supply_with_locked(&self, ctx: &Context<'_>) -> Result<Coin, EscrowError> {
        let supply = self.bank.supply_of(ctx, &self.denom)?;
        Ok(Coin::new(self.denom.clone(), supply))
    }

    /// Bank supply minus what is still locked in escrow.
    pub fn total_spendable_supply(&self, ctx: &Context<'_>) -> Result<Coin, EscrowError> {
        let supply = self.bank.supply_of(ctx, &self.denom)?;
        let locked = self.total_locked(ctx)?.amount;
        Ok(Coin::new(self.denom.clone(), supply.saturating_sub(locked)))
    }

    // =========================================================================
    // INVARIANT
    // =========================================================================

    /// Gather the three values the invariant compares.
    pub fn totals(&self, ctx: &Context<'_>) -> Result<EscrowTotals, EscrowError> {
        let sum_locked = self
            .all_locked(ctx)?
            .iter()
            .filter(|l| l.amount.denom == self.denom)
            .try_fold(U256::zero(), |acc, l| acc.checked_add(l.amount.amount))
            .ok_or(shared_types::CoinError::Overflow)?;
        let module_balance = self
            .bank
            .all_balances(ctx, &self.module_address())?
            .amount_of(&self.denom);
        Ok(EscrowTotals {
            total_locked: self.total_locked(ctx)?.amount,
            sum_locked,
            module_balance,
        })
    }

    /// `total locked == Σ per-account locked == escrow module balance`.
    ///
    /// A mismatch is returned as [`EscrowError::InvariantBroken`] and must
    /// halt the chain.
    pub fn check_invariants(&self, ctx: &Context<'_>) -> Result<EscrowTotals, EscrowError> {
        let totals = self.totals(ctx)?;
        if !totals.is_consistent() {
            tracing::error!(
                "[escrow] invariant broken: total={} sum={} module={}",
                totals.total_locked,
                totals.sum_locked,
                totals.module_balance
            );
            return Err(EscrowError::InvariantBroken {
                total_locked: totals.total_locked,
                sum_locked: totals.sum_locked,
                module_balance: totals.module_balance,
            });
        }
        Ok(totals)
    }
}

impl EscrowApi for EscrowLedger {
    fn mint_and_lock(&self, ctx: &mut Context<'_>, recipient: &Address, amount: &Coin) -> Result<(), EscrowError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ensure_denom(amount)?;
        let coins = Coins::single(amount.clone());

        ctx.run_atomic(|ctx| {
            self.bank.mint_coins(ctx, MODULE_NAME, &coins)?;
            self.bank
                .send_coins_from_module_to_account(ctx, MODULE_NAME, recipient, &coins)?;
            self.bank
                .delegate_coins_from_account_to_module(ctx, recipient, MODULE_NAME, &coins)?;
            self.increment_locked(ctx, recipient, amount)?;
            ctx.emit(
                Event::new(EVENT_FUNDS_LOCKED)
                    .attr("recipient", recipient)
                    .attr("amount", amount),
            );
            Ok::<(), EscrowError>(())
        })?;

        info!("[escrow] minted and locked {} for {}", amount, recipient);
        Ok(())
    }

    fn unlock_for_fees(&self, ctx: &mut Context<'_>, payer: &Address, fee: &Coins) -> Result<UnlockOutcome, EscrowError> {
        let fee_amount = fee.amount_of(&self.denom);
        let locked = self.locked_balance(ctx, payer)?.amount;
        if fee_amount.is_zero() || locked.is_zero() {
            return Ok(UnlockOutcome::NothingLocked);
        }

        if locked.amount >= fee_amount {
            return self.release(ctx, payer, Coin::new(self.denom.clone(), fee_amount));
        }

        let spendable = self.bank.spendable_coins(ctx, payer)?.amount_of(&self.denom);
        let potential = spendable.saturating_add(locked.amount);
        if potential < fee_amount {
            debug!(
                "[escrow] {} cannot cover fee {}: locked {} + spendable {}",
                payer, fee_amount, locked.amount, spendable
            );
            return Ok(UnlockOutcome::Insufficient {
                locked,
                available: potential,
            });
        }

        // Partial cover: the whole locked balance is released, not only the
        // shortfall.
        self.release(ctx, payer, locked)
    }

    fn locked_amount(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coin, EscrowError> {
        Ok(self.locked_balance(ctx, addr)?.amount)
    }
}
