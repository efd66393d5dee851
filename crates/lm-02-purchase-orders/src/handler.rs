//! Message handlers for the purchase order module.
//!
//! Each handler re-runs the stateless message checks, then delegates to
//! the keeper.

use shared_types::{Context, MsgProcessPurchaseOrder, MsgRaisePurchaseOrder, MsgWhitelistAddress};

use crate::domain::OrderError;
use crate::service::PurchaseOrderTally;

/// Response to a raise request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseOrderResponse {
    pub purchase_order_id: u64,
}

impl PurchaseOrderTally {
    pub fn handle_raise(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgRaisePurchaseOrder,
    ) -> Result<RaiseOrderResponse, OrderError> {
        msg.validate_basic().map_err(OrderError::from_msg)?;
        let purchase_order_id = self.raise_order(ctx, &msg.purchaser, &msg.amount)?;
        Ok(RaiseOrderResponse { purchase_order_id })
    }

    pub fn handle_process(&self, ctx: &mut Context<'_>, msg: &MsgProcessPurchaseOrder) -> Result<(), OrderError> {
        // Signer authority is reported before malformed decisions.
        if !self.is_authorized_signer(&msg.signer) {
            return Err(OrderError::UnauthorizedSigner(msg.signer));
        }
        msg.validate_basic().map_err(OrderError::from_msg)?;
        self.record_decision(ctx, msg.purchase_order_id, &msg.signer, msg.decision)
    }

    pub fn handle_whitelist(&self, ctx: &mut Context<'_>, msg: &MsgWhitelistAddress) -> Result<(), OrderError> {
        msg.validate_basic().map_err(OrderError::from_msg)?;
        self.process_whitelist_action(ctx, &msg.address, msg.action, &msg.signer)
    }
}
