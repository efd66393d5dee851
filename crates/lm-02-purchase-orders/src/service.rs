//! # Purchase Order Tally Service
//!
//! Owns purchase orders, signer decisions and the raise whitelist, and runs
//! the per-block tally and acceptance passes.
//!
//! ```text
//!   raise ──▶ Raised ──tally──▶ Accepted ──accept pass──▶ Completed
//!                 │                                    (mint_and_lock)
//!                 └──tally──▶ Rejected (veto or expiry)
//! ```

use lm_01_escrow_ledger::EscrowApi;
use shared_types::codec::{self, u64_from_key_suffix};
use shared_types::{Address, Coin, Context, Event, PurchaseOrderStatus, WhitelistAction};
use tracing::{debug, info, warn};

use crate::domain::keys::{
    accepted_queue_key, order_key, raised_queue_key, whitelist_key, ACCEPTED_QUEUE_PREFIX,
    NEXT_ID_KEY, ORDER_PREFIX, RAISED_QUEUE_PREFIX, WHITELIST_PREFIX,
};
use crate::domain::{
    evaluate, Decision, EnterpriseParams, OrderError, OrderFilter, PurchaseOrder, TallySummary,
    TallyVerdict,
};

pub const EVENT_RAISE: &str = "raise_purchase_order";
pub const EVENT_DECISION: &str = "process_purchase_order_decision";
pub const EVENT_AUTO_REJECT: &str = "auto_reject_stale_purchase_order";
pub const EVENT_TALLY: &str = "tally_purchase_order_decisions";
pub const EVENT_COMPLETE: &str = "purchase_order_completed";
pub const EVENT_WHITELIST: &str = "whitelist_purchase_order_address";

/// First id handed out on a fresh chain.
pub const DEFAULT_STARTING_ORDER_ID: u64 = 1;

/// Purchase order keeper.
#[derive(Debug, Clone)]
pub struct PurchaseOrderTally {
    params: EnterpriseParams,
    authority: Address,
}

impl PurchaseOrderTally {
    pub fn new(params: EnterpriseParams, authority: Address) -> Result<Self, OrderError> {
        params.validate()?;
        Ok(Self { params, authority })
    }

    pub fn params(&self) -> &EnterpriseParams {
        &self.params
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    /// Replace the params. Only the authority may do this.
    pub fn update_params(&mut self, caller: &Address, mut params: EnterpriseParams) -> Result<(), OrderError> {
        if caller != &self.authority {
            return Err(OrderError::Unauthorized(*caller));
        }
        params.validate()?;
        params.version = self.params.version + 1;
        info!(
            "[orders] params updated to version {} ({} signers, {} accepts)",
            params.version,
            params.signers.len(),
            params.min_accepts
        );
        self.params = params;
        Ok(())
    }

    /// Install params as imported, keeping their recorded version.
    pub(crate) fn replace_params(&mut self, params: EnterpriseParams) {
        self.params = params;
    }

    pub fn is_authorized_signer(&self, addr: &Address) -> bool {
        self.params.is_signer(addr)
    }

    // =========================================================================
    // WHITELIST
    // =========================================================================

    pub fn is_whitelisted(&self, ctx: &Context<'_>, addr: &Address) -> bool {
        ctx.store().has(&whitelist_key(addr))
    }

    pub fn add_to_whitelist(&self, ctx: &mut Context<'_>, addr: &Address) -> Result<(), OrderError> {
        if self.is_whitelisted(ctx, addr) {
            return Err(OrderError::AlreadyWhitelisted(*addr));
        }
        ctx.store_mut().set(&whitelist_key(addr), Vec::new());
        Ok(())
    }

    pub fn remove_from_whitelist(&self, ctx: &mut Context<'_>, addr: &Address) -> Result<(), OrderError> {
        if !self.is_whitelisted(ctx, addr) {
            return Err(OrderError::NotWhitelisted(*addr));
        }
        ctx.store_mut().delete(&whitelist_key(addr));
        Ok(())
    }

    /// Whitelisted addresses, ascending.
    pub fn whitelist(&self, ctx: &Context<'_>) -> Vec<Address> {
        ctx.store()
            .scan(WHITELIST_PREFIX)
            .into_iter()
            .filter_map(|(key, _)| {
                let raw = key.get(WHITELIST_PREFIX.len()..)?;
                let bytes: [u8; 20] = raw.try_into().ok()?;
                Some(Address::new(bytes))
            })
            .collect()
    }

    /// Apply a whitelist change requested by an authorized signer.
    pub fn process_whitelist_action(
        &self,
        ctx: &mut Context<'_>,
        addr: &Address,
        action: WhitelistAction,
        signer: &Address,
    ) -> Result<(), OrderError> {
        if !self.is_authorized_signer(signer) {
            return Err(OrderError::UnauthorizedSigner(*signer));
        }
        match action {
            WhitelistAction::Add => self.add_to_whitelist(ctx, addr)?,
            WhitelistAction::Remove => self.remove_from_whitelist(ctx, addr)?,
            WhitelistAction::Nil => return Err(OrderError::InvalidWhitelistAction),
        }
        ctx.emit(
            Event::new(EVENT_WHITELIST)
                .attr("address", addr)
                .attr("signer", signer)
                .attr("action", action),
        );
        debug!("[orders] whitelist {} {}", action, addr);
        Ok(())
    }

    // =========================================================================
    // ORDERS
    // =========================================================================

    pub fn next_order_id(&self, ctx: &Context<'_>) -> Result<u64, OrderError> {
        Ok(codec::load::<u64>(ctx.store(), NEXT_ID_KEY)?.unwrap_or(DEFAULT_STARTING_ORDER_ID))
    }

    pub fn set_next_order_id(&self, ctx: &mut Context<'_>, id: u64) -> Result<(), OrderError> {
        codec::save(ctx.store_mut(), NEXT_ID_KEY, &id)?;
        Ok(())
    }

    pub fn get_order(&self, ctx: &Context<'_>, id: u64) -> Result<Option<PurchaseOrder>, OrderError> {
        Ok(codec::load(ctx.store(), &order_key(id))?)
    }

    pub(crate) fn set_order(&self, ctx: &mut Context<'_>, order: &PurchaseOrder) -> Result<(), OrderError> {
        if order.status == PurchaseOrderStatus::Nil {
            return Err(OrderError::Fatal(format!(
                "refusing to store purchase order {} with nil status",
                order.id
            )));
        }
        codec::save(ctx.store_mut(), &order_key(order.id), order)?;
        Ok(())
    }

    /// All orders, ascending id.
    pub fn all_orders(&self, ctx: &Context<'_>) -> Result<Vec<PurchaseOrder>, OrderError> {
        Ok(codec::load_all(ctx.store(), ORDER_PREFIX)?)
    }

    /// Filtered, paginated orders, ascending id.
    pub fn orders(&self, ctx: &Context<'_>, filter: &OrderFilter) -> Result<Vec<PurchaseOrder>, OrderError> {
        let (skip, take) = filter.window();
        Ok(self
            .all_orders(ctx)?
            .into_iter()
            .filter(|o| filter.matches(o))
            .skip(skip)
            .take(take)
            .collect())
    }

    fn queue_ids(ctx: &Context<'_>, prefix: &[u8]) -> Vec<u64> {
        ctx.store()
            .scan(prefix)
            .into_iter()
            .filter_map(|(key, _)| u64_from_key_suffix(&key))
            .collect()
    }

    /// Ids waiting for the tally, ascending.
    pub fn raised_queue(&self, ctx: &Context<'_>) -> Vec<u64> {
        Self::queue_ids(ctx, RAISED_QUEUE_PREFIX)
    }

    /// Ids waiting for the acceptance pass, ascending.
    pub fn accepted_queue(&self, ctx: &Context<'_>) -> Vec<u64> {
        Self::queue_ids(ctx, ACCEPTED_QUEUE_PREFIX)
    }

    pub(crate) fn enqueue_raised(&self, ctx: &mut Context<'_>, id: u64) {
        ctx.store_mut().set(&raised_queue_key(id), Vec::new());
    }

    pub(crate) fn enqueue_accepted(&self, ctx: &mut Context<'_>, id: u64) {
        ctx.store_mut().set(&accepted_queue_key(id), Vec::new());
    }

    /// Raise a new order for a whitelisted purchaser. Returns its id.
    pub fn raise_order(&self, ctx: &mut Context<'_>, purchaser: &Address, amount: &Coin) -> Result<u64, OrderError> {
        if amount.denom != self.params.denom {
            return Err(OrderError::InvalidDenom {
                expected: self.params.denom.clone(),
                actual: amount.denom.clone(),
            });
        }
        if !self.is_whitelisted(ctx, purchaser) {
            return Err(OrderError::NotWhitelisted(*purchaser));
        }

        let id = self.next_order_id(ctx)?;
        let next_id = id.checked_add(1).ok_or(OrderError::IdsExhausted(id))?;
        let order = PurchaseOrder::new(id, *purchaser, amount.clone(), ctx.block_time());
        self.set_order(ctx, &order)?;
        self.enqueue_raised(ctx, id);
        self.set_next_order_id(ctx, next_id)?;

        ctx.emit(
            Event::new(EVENT_RAISE)
                .attr("purchase_order_id", id)
                .attr("purchaser", purchaser)
                .attr("amount", amount),
        );
        info!("[orders] raised purchase order {} for {} by {}", id, amount, purchaser);
        Ok(id)
    }

    /// Record a signer's decision. The status only moves in the tally pass.
    pub fn record_decision(
        &self,
        ctx: &mut Context<'_>,
        id: u64,
        signer: &Address,
        decision: PurchaseOrderStatus,
    ) -> Result<(), OrderError> {
        if !self.is_authorized_signer(signer) {
            return Err(OrderError::UnauthorizedSigner(*signer));
        }
        if !decision.is_valid_decision() {
            return Err(OrderError::InvalidDecision);
        }
        let mut order = self
            .get_order(ctx, id)?
            .ok_or(OrderError::OrderDoesNotExist(id))?;
        if order.status != PurchaseOrderStatus::Raised {
            return Err(OrderError::OrderAlreadyProcessed {
                id,
                status: order.status,
            });
        }
        if order.has_decided(signer) {
            return Err(OrderError::SignerAlreadyDecided { id, signer: *signer });
        }

        order.decisions.push(Decision {
            signer: *signer,
            decision,
            decision_time: ctx.block_time(),
        });
        self.set_order(ctx, &order)?;

        ctx.emit(
            Event::new(EVENT_DECISION)
                .attr("purchase_order_id", id)
                .attr("signer", signer)
                .attr("decision", decision),
        );
        debug!("[orders] {} decided {} on purchase order {}", signer, decision, id);
        Ok(())
    }

    // =========================================================================
    // END-BLOCK PASSES
    // =========================================================================

    fn load_queued(&self, ctx: &Context<'_>, id: u64, expected: PurchaseOrderStatus) -> Result<PurchaseOrder, OrderError> {
        let order = self
            .get_order(ctx, id)?
            .ok_or_else(|| OrderError::Fatal(format!("queued purchase order {} not found", id)))?;
        if order.status != expected {
            return Err(OrderError::Fatal(format!(
                "queued purchase order {} has status {}, expected {}",
                id, order.status, expected
            )));
        }
        Ok(order)
    }

    /// Evaluate every raised order, ascending id.
    pub fn tally_decisions(&self, ctx: &mut Context<'_>) -> Result<TallySummary, OrderError> {
        let now = ctx.block_time();
        let mut summary = TallySummary::default();

        for id in self.raised_queue(ctx) {
            let mut order = self.load_queued(ctx, id, PurchaseOrderStatus::Raised)?;
            let (accepts, rejects) = order.decision_counts();

            match evaluate(&order, now, &self.params) {
                TallyVerdict::Pending => {
                    summary.pending.push(id);
                    continue;
                }
                TallyVerdict::Expired => {
                    order.status = PurchaseOrderStatus::Rejected;
                    order.completion_time = now;
                    self.set_order(ctx, &order)?;
                    ctx.store_mut().delete(&raised_queue_key(id));
                    ctx.emit(
                        Event::new(EVENT_AUTO_REJECT)
                            .attr("purchase_order_id", id)
                            .attr("purchaser", order.purchaser),
                    );
                    warn!("[orders] purchase order {} expired with {} accepts", id, accepts);
                    summary.expired.push(id);
                    continue;
                }
                TallyVerdict::Rejected => {
                    order.status = PurchaseOrderStatus::Rejected;
                    order.completion_time = now;
                    self.set_order(ctx, &order)?;
                    ctx.store_mut().delete(&raised_queue_key(id));
                    summary.rejected.push(id);
                }
                TallyVerdict::Accepted => {
                    order.status = PurchaseOrderStatus::Accepted;
                    order.completion_time = now;
                    self.set_order(ctx, &order)?;
                    ctx.store_mut().delete(&raised_queue_key(id));
                    self.enqueue_accepted(ctx, id);
                    summary.accepted.push(id);
                }
            }

            ctx.emit(
                Event::new(EVENT_TALLY)
                    .attr("purchase_order_id", id)
                    .attr("purchaser", order.purchaser)
                    .attr("decision", order.status)
                    .attr("num_accepts", accepts)
                    .attr("num_rejects", rejects),
            );
            info!(
                "[orders] purchase order {} {} ({} accepts, {} rejects)",
                id, order.status, accepts, rejects
            );
        }
        Ok(summary)
    }

    /// Complete every accepted order and mint its funds into escrow.
    ///
    /// Any failure here, including a failed mint, is fatal.
    pub fn process_accepted(&self, ctx: &mut Context<'_>, escrow: &dyn EscrowApi) -> Result<Vec<u64>, OrderError> {
        let mut completed = Vec::new();
        for id in self.accepted_queue(ctx) {
            let mut order = self.load_queued(ctx, id, PurchaseOrderStatus::Accepted)?;
            order.status = PurchaseOrderStatus::Completed;
            order.completion_time = ctx.block_time();
            self.set_order(ctx, &order)?;

            escrow
                .mint_and_lock(ctx, &order.purchaser, &order.amount)
                .map_err(|e| OrderError::Fatal(format!("minting for purchase order {}: {}", id, e)))?;

            ctx.store_mut().delete(&accepted_queue_key(id));
            ctx.emit(
                Event::new(EVENT_COMPLETE)
                    .attr("purchase_order_id", id)
                    .attr("purchaser", order.purchaser)
                    .attr("amount", &order.amount),
            );
            info!("[orders] purchase order {} completed, {} locked", id, order.amount);
            completed.push(id);
        }
        Ok(completed)
    }

    /// Tally then acceptance, as run at the end of every block.
    pub fn end_block(&self, ctx: &mut Context<'_>, escrow: &dyn EscrowApi) -> Result<TallySummary, OrderError> {
        let summary = self.tally_decisions(ctx)?;
        self.process_accepted(ctx, escrow)?;
        Ok(summary)
    }
}
