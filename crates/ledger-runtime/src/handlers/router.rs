//! Routes each message to the module that owns it.

use lm_01_escrow_ledger::EscrowLedger;
use lm_02_purchase_orders::PurchaseOrderTally;
use lm_03_anchor_storage::{AnchorStorageManager, RecordOutcome, StorageCapacity};
use shared_types::{Context, Msg, StoreBank};
use tracing::debug;

use crate::errors::RuntimeError;

/// Borrowed view of every keeper, handed to routes and queries.
#[derive(Clone, Copy)]
pub struct Keepers<'a> {
    pub bank: &'a StoreBank,
    pub escrow: &'a EscrowLedger,
    pub orders: &'a PurchaseOrderTally,
    pub anchor: &'a AnchorStorageManager,
}

/// Result of one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsgResponse {
    RaisePurchaseOrder { purchase_order_id: u64 },
    ProcessPurchaseOrder,
    WhitelistAddress,
    RegisterChain { chain_id: u64 },
    RecordChainBlock(RecordOutcome),
    PurchaseChainStorage(StorageCapacity),
}

pub fn route(ctx: &mut Context<'_>, keepers: &Keepers<'_>, msg: &Msg) -> Result<MsgResponse, RuntimeError> {
    debug!("[runtime] routing {}", msg.type_name());
    let response = match msg {
        Msg::RaisePurchaseOrder(m) => MsgResponse::RaisePurchaseOrder {
            purchase_order_id: keepers.orders.handle_raise(ctx, m)?.purchase_order_id,
        },
        Msg::ProcessPurchaseOrder(m) => {
            keepers.orders.handle_process(ctx, m)?;
            MsgResponse::ProcessPurchaseOrder
        }
        Msg::WhitelistAddress(m) => {
            keepers.orders.handle_whitelist(ctx, m)?;
            MsgResponse::WhitelistAddress
        }
        Msg::RegisterChain(m) => MsgResponse::RegisterChain {
            chain_id: keepers.anchor.handle_register(ctx, m)?,
        },
        Msg::RecordChainBlock(m) => MsgResponse::RecordChainBlock(keepers.anchor.handle_record(ctx, m)?),
        Msg::PurchaseChainStorage(m) => {
            MsgResponse::PurchaseChainStorage(keepers.anchor.handle_purchase_storage(ctx, m)?)
        }
    };
    Ok(response)
}

/// Route every message in order on one branch. Either all of them take
/// effect or none do.
pub fn route_all(ctx: &mut Context<'_>, keepers: &Keepers<'_>, msgs: &[Msg]) -> Result<Vec<MsgResponse>, RuntimeError> {
    ctx.run_atomic(|ctx| msgs.iter().map(|msg| route(ctx, keepers, msg)).collect())
}
