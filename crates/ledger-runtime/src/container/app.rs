//! # Ledger Application
//!
//! Owns the store and every module keeper, and drives them through the
//! block lifecycle:
//!
//! ```text
//! from_genesis ─► begin_block ─► deliver_tx* ─► end_block ─► begin_block ...
//!                                  │
//!                   ante chain (commits fee) ─► route_all (atomic)
//! ```
//!
//! ## Halting
//!
//! A fatal error (broken escrow invariant, failed mint of an accepted
//! order, inconsistent anchor counters) halts the ledger. Every state
//! changing call afterwards returns [`RuntimeError::Halted`].

use std::sync::Arc;

use lm_01_escrow_ledger::{EscrowLedger, EscrowTotals};
use lm_02_purchase_orders::{EnterpriseParams, PurchaseOrderTally, TallySummary};
use lm_03_anchor_storage::{AnchorParams, AnchorStorageManager};
use lm_04_fee_validation::standard_chain;
use shared_types::{
    Address, BlockInfo, CacheStore, Context, Event, ExecMode, MemStore, StoreBank, Tx,
};
use ledger_telemetry::{log_block_event, log_event};
use tracing::{info, instrument};

use crate::container::config::LedgerConfig;
use crate::errors::RuntimeError;
use crate::genesis::{GenesisError, GenesisState, GENESIS_VERSION};
use crate::handlers::{route_all, Keepers, MsgResponse};

/// Outcome of a delivered or simulated transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub responses: Vec<MsgResponse>,
    pub events: Vec<Event>,
}

/// Outcome of the end-of-block tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndBlockReport {
    pub height: u64,
    pub tally: TallySummary,
    pub events: Vec<Event>,
}

pub struct LedgerApp {
    store: MemStore,
    bank: Arc<StoreBank>,
    escrow: EscrowLedger,
    orders: PurchaseOrderTally,
    anchor: AnchorStorageManager,
    config: LedgerConfig,
    block: BlockInfo,
    halted: Option<String>,
}

impl LedgerApp {
    /// Start from an empty genesis built from `config`.
    pub fn new(config: LedgerConfig) -> Result<Self, RuntimeError> {
        let genesis = GenesisState::new(&config);
        Self::from_genesis(config, &genesis)
    }

    /// Import `genesis` into a fresh store.
    ///
    /// ## Import Order
    ///
    /// Bank balances first, then escrow, orders and anchors. The import
    /// is all-or-nothing and ends with a full invariant check.
    #[instrument(name = "ledger_init", skip(config, genesis), fields(chain_id = %config.chain_id))]
    pub fn from_genesis(config: LedgerConfig, genesis: &GenesisState) -> Result<Self, RuntimeError> {
        config.validate()?;
        genesis.validate()?;

        let bank = Arc::new(StoreBank::new());
        let escrow = EscrowLedger::new(genesis.denom(), bank.clone());
        let mut orders = PurchaseOrderTally::new(genesis.orders.params.clone(), config.authority)?;
        let mut anchor = AnchorStorageManager::new(genesis.anchor.params.clone(), config.authority)?;

        let mut store = MemStore::new();
        let block = BlockInfo::new(0, genesis.genesis_time);
        {
            let mut ctx = Context::new(&mut store, block, ExecMode::Deliver);
            ctx.run_atomic(|ctx| -> Result<(), GenesisError> {
                bank.init_genesis(ctx, &genesis.bank)?;
                escrow.init_genesis(ctx, &genesis.escrow)?;
                orders.init_genesis(ctx, &genesis.orders)?;
                anchor.init_genesis(ctx, &genesis.anchor)?;
                Ok(())
            })?;
        }

        let mut app = Self {
            store,
            bank,
            escrow,
            orders,
            anchor,
            config,
            block,
            halted: None,
        };
        let totals = app.assert_invariants()?;
        info!(
            "[runtime] genesis imported: {} locked, {} chains",
            totals.total_locked,
            genesis.anchor.chains.len()
        );
        Ok(app)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn block(&self) -> BlockInfo {
        self.block
    }

    pub fn height(&self) -> u64 {
        self.block.height
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<&str> {
        self.halted.as_deref()
    }

    fn split(&mut self) -> (&mut MemStore, Keepers<'_>) {
        let keepers = Keepers {
            bank: self.bank.as_ref(),
            escrow: &self.escrow,
            orders: &self.orders,
            anchor: &self.anchor,
        };
        (&mut self.store, keepers)
    }

    fn ensure_running(&self) -> Result<(), RuntimeError> {
        match &self.halted {
            Some(reason) => Err(RuntimeError::Halted(reason.clone())),
            None => Ok(()),
        }
    }

    fn halt(&mut self, reason: String) {
        log_block_event!(error, "runtime", "ledger halted", self.block.height, reason = %reason);
        self.halted = Some(reason);
    }

    fn halt_if_fatal<T>(&mut self, result: Result<T, RuntimeError>) -> Result<T, RuntimeError> {
        if let Err(err) = &result {
            if err.is_fatal() {
                self.halt(err.to_string());
            }
        }
        result
    }

    // =========================================================================
    // BLOCK LIFECYCLE
    // =========================================================================

    /// Open the next block. Height must grow and time must not go back.
    pub fn begin_block(&mut self, next: BlockInfo) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        if next.height <= self.block.height || next.time < self.block.time {
            return Err(RuntimeError::InvalidBlock {
                current: self.block,
                next,
            });
        }
        self.block = next;
        Ok(())
    }

    /// Mempool admission. Runs the ante chain on a throwaway branch; no
    /// state is kept whether it passes or not.
    pub fn check_tx(&mut self, tx: &Tx) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        let block = self.block;
        let (store, keepers) = self.split();
        let mut branch = CacheStore::new(store);
        let mut ctx = Context::new(&mut branch, block, ExecMode::Check);
        standard_chain(keepers.bank, keepers.escrow, keepers.anchor).run(&mut ctx, tx, false)?;
        Ok(())
    }

    /// Run the full transaction, messages included, without keeping any
    /// state. Exact-fee checks are skipped.
    pub fn simulate_tx(&mut self, tx: &Tx) -> Result<TxReceipt, RuntimeError> {
        self.ensure_running()?;
        let block = self.block;
        let (store, keepers) = self.split();
        let mut branch = CacheStore::new(store);
        let mut ctx = Context::new(&mut branch, block, ExecMode::Simulate);
        standard_chain(keepers.bank, keepers.escrow, keepers.anchor).run(&mut ctx, tx, true)?;
        let responses = route_all(&mut ctx, &keepers, &tx.msgs)?;
        Ok(TxReceipt {
            responses,
            events: ctx.into_events(),
        })
    }

    /// Execute a transaction in the current block.
    ///
    /// The ante chain commits on its own: once it passes, the fee is gone
    /// even if a message fails afterwards. Messages then run together and
    /// either all apply or none do.
    #[instrument(name = "deliver_tx", skip(self, tx), fields(height = self.block.height))]
    pub fn deliver_tx(&mut self, tx: &Tx) -> Result<TxReceipt, RuntimeError> {
        self.ensure_running()?;
        let block = self.block;
        let result = {
            let (store, keepers) = self.split();
            let mut ctx = Context::new(store, block, ExecMode::Deliver);
            match standard_chain(keepers.bank, keepers.escrow, keepers.anchor).run(&mut ctx, tx, false) {
                Err(err) => Err(RuntimeError::from(err)),
                Ok(()) => route_all(&mut ctx, &keepers, &tx.msgs).map(|responses| TxReceipt {
                    responses,
                    events: ctx.into_events(),
                }),
            }
        };
        if let Err(err) = &result {
            log_event!(warn, "runtime", "tx rejected", code = err.code(), error = %err);
        }
        self.halt_if_fatal(result)
    }

    /// Tally every pending purchase order, mint and lock the accepted ones,
    /// then check the escrow invariant. Any failure here halts the ledger.
    #[instrument(name = "end_block", skip(self), fields(height = self.block.height))]
    pub fn end_block(&mut self) -> Result<EndBlockReport, RuntimeError> {
        self.ensure_running()?;
        let block = self.block;
        let result = {
            let (store, keepers) = self.split();
            let mut ctx = Context::new(store, block, ExecMode::Deliver);
            ctx.run_atomic(|ctx| -> Result<TallySummary, RuntimeError> {
                let tally = keepers.orders.end_block(ctx, keepers.escrow)?;
                keepers.escrow.check_invariants(ctx)?;
                Ok(tally)
            })
            .map(|tally| EndBlockReport {
                height: block.height,
                tally,
                events: ctx.into_events(),
            })
        };
        match result {
            Ok(report) => {
                log_block_event!(
                    info,
                    "runtime",
                    "block closed",
                    report.height,
                    accepted = report.tally.accepted.len(),
                    rejected = report.tally.rejected.len(),
                    expired = report.tally.expired.len()
                );
                Ok(report)
            }
            Err(err) => {
                self.halt(format!("end block failed: {}", err));
                Err(err)
            }
        }
    }

    /// Full-state consistency check over escrow and anchor counters.
    /// Halts the ledger on failure.
    pub fn assert_invariants(&mut self) -> Result<EscrowTotals, RuntimeError> {
        let block = self.block;
        let result = {
            let (store, keepers) = self.split();
            let ctx = Context::new(store, block, ExecMode::Deliver);
            check_invariants(&ctx, &keepers)
        };
        if let Err(err) = &result {
            self.halt(err.to_string());
        }
        result
    }

    // =========================================================================
    // PARAMS
    // =========================================================================

    /// Replace the enterprise params. The escrow denomination follows.
    pub fn update_enterprise_params(&mut self, caller: &Address, params: EnterpriseParams) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        self.orders.update_params(caller, params)?;
        self.escrow.set_denom(self.orders.params().denom.clone());
        Ok(())
    }

    pub fn update_anchor_params(&mut self, caller: &Address, params: AnchorParams) -> Result<(), RuntimeError> {
        self.ensure_running()?;
        self.anchor.update_params(caller, params)?;
        Ok(())
    }

    /// Delete anchor records beyond every chain's in-state limit.
    pub fn prune_anchor_storage(&mut self) -> Result<u64, RuntimeError> {
        self.ensure_running()?;
        let block = self.block;
        let (store, keepers) = self.split();
        let mut ctx = Context::new(store, block, ExecMode::Deliver);
        Ok(ctx.run_atomic(|ctx| keepers.anchor.prune_all(ctx))?)
    }

    // =========================================================================
    // QUERIES AND EXPORT
    // =========================================================================

    /// Read-only access to the keepers at the current block.
    pub fn query<R>(&mut self, f: impl FnOnce(&Context<'_>, Keepers<'_>) -> R) -> R {
        let block = self.block;
        let (store, keepers) = self.split();
        let ctx = Context::new(store, block, ExecMode::Check);
        f(&ctx, keepers)
    }

    pub fn export_genesis(&mut self) -> Result<GenesisState, RuntimeError> {
        let block = self.block;
        let (store, keepers) = self.split();
        let ctx = Context::new(store, block, ExecMode::Deliver);
        Ok(GenesisState {
            version: GENESIS_VERSION,
            genesis_time: block.time,
            bank: keepers.bank.export_genesis(&ctx).map_err(GenesisError::from)?,
            escrow: keepers.escrow.export_genesis(&ctx)?,
            orders: keepers.orders.export_genesis(&ctx)?,
            anchor: keepers.anchor.export_genesis(&ctx)?,
        })
    }
}

fn check_invariants(ctx: &Context<'_>, keepers: &Keepers<'_>) -> Result<EscrowTotals, RuntimeError> {
    let totals = keepers.escrow.check_invariants(ctx)?;

    for chain in keepers.anchor.all_chains(ctx)? {
        let blocks = keepers.anchor.all_blocks(ctx, chain.id)?;
        let limit = keepers.anchor.in_state_limit(ctx, chain.id)?;
        let broken = |what: String| Err(RuntimeError::Invariant(format!("chain {}: {}", chain.id, what)));

        if blocks.len() as u64 != chain.num_blocks_in_state {
            return broken(format!(
                "{} records stored, counter says {}",
                blocks.len(),
                chain.num_blocks_in_state
            ));
        }
        if chain.num_blocks_in_state > limit {
            return broken(format!("{} records over limit {}", chain.num_blocks_in_state, limit));
        }
        let lowest = blocks.first().map_or(0, |b| b.height);
        if lowest != chain.lowest_height_in_state {
            return broken(format!(
                "lowest stored height {} but counter says {}",
                lowest, chain.lowest_height_in_state
            ));
        }
        if let Some(newest) = blocks.last() {
            if newest.height > chain.last_height {
                return broken(format!("record {} above last height {}", newest.height, chain.last_height));
            }
        }
    }
    Ok(totals)
}
