//! Move the declared fee from the payer to the fee collector.

use shared_types::{BankKeeper, Context, Tx, FEE_COLLECTOR};
use tracing::debug;

use crate::chain::AnteDecorator;
use crate::errors::AnteError;

pub struct DeductFeeDecorator<'k> {
    bank: &'k dyn BankKeeper,
}

impl<'k> DeductFeeDecorator<'k> {
    pub fn new(bank: &'k dyn BankKeeper) -> Self {
        Self { bank }
    }
}

impl AnteDecorator for DeductFeeDecorator<'_> {
    fn name(&self) -> &'static str {
        "deduct_fee"
    }

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, _simulate: bool) -> Result<(), AnteError> {
        if tx.fee.is_zero() {
            return Ok(());
        }
        let payer = tx.fee_payer();
        self.bank
            .send_coins_from_account_to_module(ctx, &payer, FEE_COLLECTOR, &tx.fee)?;
        debug!("[ante] deducted {} from {}", tx.fee, payer);
        Ok(())
    }
}
