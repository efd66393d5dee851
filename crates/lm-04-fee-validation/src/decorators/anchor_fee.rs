//! Pricing and guard checks for anchor transactions.
//!
//! Runs before any fee is taken:
//!
//! 1. Pass through when the tx carries no anchor messages.
//! 2. Mempool only: the declared fee must equal the schedule exactly.
//! 3. Spendable plus locked funds of the fee payer must cover the fee.
//! 4. Every anchor message must be owned by the fee payer.
//! 5. Storage purchases, summed per chain, must fit under the max limit.

use std::collections::BTreeMap;

use lm_01_escrow_ledger::EscrowApi;
use lm_03_anchor_storage::{AnchorParams, AnchorQuery};
use primitive_types::U256;
use shared_types::{Address, BankKeeper, Coin, Context, Msg, Tx};
use tracing::debug;

use crate::chain::AnteDecorator;
use crate::errors::AnteError;

/// Sum of the scheduled fees of every anchor message in `msgs`.
pub fn expected_anchor_fee(params: &AnchorParams, msgs: &[Msg]) -> Coin {
    let amount = msgs.iter().fold(U256::zero(), |acc, msg| {
        let fee = match msg {
            Msg::RegisterChain(_) => params.register_fee().amount,
            Msg::RecordChainBlock(_) => params.record_fee().amount,
            Msg::PurchaseChainStorage(m) => params.purchase_fee(m.number).amount,
            _ => U256::zero(),
        };
        acc.saturating_add(fee)
    });
    Coin::new(params.denom.clone(), amount)
}

pub struct CorrectAnchorFeeDecorator<'k> {
    bank: &'k dyn BankKeeper,
    escrow: &'k dyn EscrowApi,
    anchor: &'k dyn AnchorQuery,
}

impl<'k> CorrectAnchorFeeDecorator<'k> {
    pub fn new(bank: &'k dyn BankKeeper, escrow: &'k dyn EscrowApi, anchor: &'k dyn AnchorQuery) -> Self {
        Self { bank, escrow, anchor }
    }

    fn check_fee_amount(&self, tx: &Tx) -> Result<(), AnteError> {
        let params = self.anchor.anchor_params();
        if let Some(wrong) = tx.fee.iter().find(|c| c.denom != params.denom) {
            return Err(AnteError::IncorrectFeeDenomination {
                expected: params.denom.clone(),
                got: wrong.denom.clone(),
            });
        }

        let expected = expected_anchor_fee(params, &tx.msgs);
        let got = Coin::new(params.denom.clone(), tx.fee.amount_of(&params.denom));
        if got.amount < expected.amount {
            return Err(AnteError::InsufficientFee { expected, got });
        }
        if got.amount > expected.amount {
            return Err(AnteError::TooMuchFee { expected, got });
        }
        debug!("[ante] anchor fee {} matches schedule", got);
        Ok(())
    }

    fn check_solvency(&self, ctx: &Context<'_>, payer: &Address, tx: &Tx) -> Result<(), AnteError> {
        let locked = self.escrow.locked_amount(ctx, payer)?;
        let spendable = self.bank.spendable_coins(ctx, payer)?;
        let available = spendable
            .add_coin(&locked)
            .map_err(|e| AnteError::Bank(e.into()))?;
        if !available.covers(&tx.fee) {
            return Err(AnteError::InsufficientFunds {
                payer: *payer,
                available,
                required: tx.fee.clone(),
            });
        }
        Ok(())
    }

    fn check_ownership(payer: &Address, tx: &Tx) -> Result<(), AnteError> {
        for msg in tx.msgs.iter().filter(|m| m.is_anchor()) {
            let owner = msg.signer();
            if &owner != payer {
                return Err(AnteError::FeePayerNotOwner {
                    payer: *payer,
                    owner,
                });
            }
        }
        Ok(())
    }

    fn check_capacity(&self, ctx: &Context<'_>, tx: &Tx) -> Result<(), AnteError> {
        let mut requested: BTreeMap<u64, u64> = BTreeMap::new();
        for msg in &tx.msgs {
            if let Msg::PurchaseChainStorage(m) = msg {
                let total = requested.entry(m.chain_id).or_default();
                *total = total.saturating_add(m.number);
            }
        }
        for (chain_id, requested) in requested {
            let max_purchasable = self.anchor.max_purchasable_slots(ctx, chain_id)?;
            if requested > max_purchasable {
                return Err(AnteError::ExceedsMaxStorage {
                    chain_id,
                    requested,
                    max_purchasable,
                });
            }
        }
        Ok(())
    }
}

impl AnteDecorator for CorrectAnchorFeeDecorator<'_> {
    fn name(&self) -> &'static str {
        "correct_anchor_fee"
    }

    fn ante_handle(&self, ctx: &mut Context<'_>, tx: &Tx, simulate: bool) -> Result<(), AnteError> {
        if !tx.has_anchor_msgs() {
            return Ok(());
        }
        if ctx.is_check_tx() && !simulate {
            self.check_fee_amount(tx)?;
        }
        let payer = tx.fee_payer();
        self.check_solvency(ctx, &payer, tx)?;
        Self::check_ownership(&payer, tx)?;
        self.check_capacity(ctx, tx)
    }
}
