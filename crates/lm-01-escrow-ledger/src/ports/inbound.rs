//! Inbound port used by the purchase-order tally and the fee pipeline.

use shared_types::{Address, Coin, Coins, Context};

use crate::domain::{EscrowError, UnlockOutcome};

/// Escrow operations exposed to other modules.
pub trait EscrowApi {
    /// Mint `amount` into escrow and credit it to `recipient` as locked.
    ///
    /// A zero amount is a no-op. The bank steps and the counter update
    /// commit together or not at all.
    fn mint_and_lock(&self, ctx: &mut Context<'_>, recipient: &Address, amount: &Coin)
        -> Result<(), EscrowError>;

    /// Release locked funds so that `payer` can cover `fee`.
    fn unlock_for_fees(&self, ctx: &mut Context<'_>, payer: &Address, fee: &Coins)
        -> Result<UnlockOutcome, EscrowError>;

    fn locked_amount(&self, ctx: &Context<'_>, addr: &Address) -> Result<Coin, EscrowError>;

    fn is_locked(&self, ctx: &Context<'_>, addr: &Address) -> Result<bool, EscrowError> {
        Ok(self.locked_amount(ctx, addr)?.is_positive())
    }
}
