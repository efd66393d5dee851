//! Purchase order genesis import and export.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Context, PurchaseOrderStatus};

use crate::domain::{EnterpriseParams, OrderError, PurchaseOrder};
use crate::service::{PurchaseOrderTally, DEFAULT_STARTING_ORDER_ID};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersGenesis {
    pub params: EnterpriseParams,
    pub starting_purchase_order_id: u64,
    #[serde(default)]
    pub purchase_orders: Vec<PurchaseOrder>,
    #[serde(default)]
    pub whitelist: Vec<Address>,
}

impl OrdersGenesis {
    pub fn new(params: EnterpriseParams) -> Self {
        Self {
            params,
            starting_purchase_order_id: DEFAULT_STARTING_ORDER_ID,
            purchase_orders: Vec::new(),
            whitelist: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        self.params
            .validate()
            .map_err(|e| OrderError::InvalidGenesis(e.to_string()))?;
        if self.starting_purchase_order_id == 0 {
            return Err(OrderError::InvalidGenesis(
                "starting purchase order id must be positive".into(),
            ));
        }

        let mut ids = std::collections::BTreeSet::new();
        for order in &self.purchase_orders {
            if !ids.insert(order.id) {
                return Err(OrderError::InvalidGenesis(format!(
                    "duplicate purchase order id {}",
                    order.id
                )));
            }
            if order.id == 0 || order.id >= self.starting_purchase_order_id {
                return Err(OrderError::InvalidGenesis(format!(
                    "purchase order id {} outside 1..{}",
                    order.id, self.starting_purchase_order_id
                )));
            }
            if order.status == PurchaseOrderStatus::Nil {
                return Err(OrderError::InvalidGenesis(format!(
                    "purchase order {} has nil status",
                    order.id
                )));
            }
            if order.amount.denom != self.params.denom {
                return Err(OrderError::InvalidGenesis(format!(
                    "purchase order {} uses denomination {}",
                    order.id, order.amount.denom
                )));
            }
            let stamped = order.completion_time != 0;
            let must_be_stamped = order.status.is_terminal();
            let must_be_clear = order.status == PurchaseOrderStatus::Raised;
            if (must_be_stamped && !stamped) || (must_be_clear && stamped) {
                return Err(OrderError::InvalidGenesis(format!(
                    "purchase order {} is {} with completion time {}",
                    order.id, order.status, order.completion_time
                )));
            }
        }

        let mut seen = std::collections::BTreeSet::new();
        if let Some(dup) = self.whitelist.iter().find(|a| !seen.insert(**a)) {
            return Err(OrderError::InvalidGenesis(format!(
                "duplicate whitelist entry {}",
                dup
            )));
        }
        Ok(())
    }
}

impl PurchaseOrderTally {
    /// Import state. Raised and accepted orders are re-queued for the
    /// end-block passes.
    pub fn init_genesis(&mut self, ctx: &mut Context<'_>, genesis: &OrdersGenesis) -> Result<(), OrderError> {
        genesis.validate()?;
        self.replace_params(genesis.params.clone());

        self.set_next_order_id(ctx, genesis.starting_purchase_order_id)?;
        for order in &genesis.purchase_orders {
            self.set_order(ctx, order)?;
            match order.status {
                PurchaseOrderStatus::Raised => self.enqueue_raised(ctx, order.id),
                PurchaseOrderStatus::Accepted => self.enqueue_accepted(ctx, order.id),
                _ => {}
            }
        }
        for addr in &genesis.whitelist {
            self.add_to_whitelist(ctx, addr)?;
        }
        tracing::info!(
            "[orders] genesis imported: {} orders, {} whitelisted, next id {}",
            genesis.purchase_orders.len(),
            genesis.whitelist.len(),
            genesis.starting_purchase_order_id
        );
        Ok(())
    }

    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<OrdersGenesis, OrderError> {
        Ok(OrdersGenesis {
            params: self.params().clone(),
            starting_purchase_order_id: self.next_order_id(ctx)?,
            purchase_orders: self.all_orders(ctx)?,
            whitelist: self.whitelist(ctx),
        })
    }
}
