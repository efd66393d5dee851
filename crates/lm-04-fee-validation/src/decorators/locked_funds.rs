//! Release escrowed funds so the fee deduction that follows can succeed.

use lm_01_escrow_ledger::{EscrowApi, UnlockOutcome};
use shared_types::{Context, Tx};
use tracing::debug;

use crate::chain::AnteDecorator;
use crate::errors::AnteError;

pub struct CheckLockedFundsDecorator<'k> {
    escrow: &'k dyn EscrowApi,
}

impl<'k> CheckLockedFundsDecorator<'k> {
    pub fn new(escrow: &'k dyn EscrowApi) -> Self {
        Self { escrow }
    }
}

impl AnteDecorator for CheckLockedFundsDecorator<'_> {
    fn name(&self) -> &'static str {
        "check_locked_funds"
    }

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, _simulate: bool) -> Result<(), AnteError> {
        let payer = tx.fee_payer();
        if !tx.has_anchor_msgs() || !self.escrow.is_locked(ctx, &payer)? {
            return Ok(());
        }
        match self.escrow.unlock_for_fees(ctx, &payer, &tx.fee)? {
            UnlockOutcome::Insufficient { locked, available } => {
                // Left for fee deduction to reject.
                debug!(
                    "[ante] {} cannot cover {} (locked {}, available {})",
                    payer, tx.fee, locked, available
                );
            }
            outcome => debug!("[ante] unlock for {}: {:?}", payer, outcome),
        }
        Ok(())
    }
}
