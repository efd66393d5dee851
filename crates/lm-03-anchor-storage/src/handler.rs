//! Message handlers for the anchor module.

use shared_types::{Context, MsgPurchaseChainStorage, MsgRecordChainBlock, MsgRegisterChain};

use crate::domain::{AnchorError, RecordOutcome, StorageCapacity};
use crate::service::AnchorStorageManager;

impl AnchorStorageManager {
    pub fn handle_register(&self, ctx: &mut Context<'_>, msg: &MsgRegisterChain) -> Result<u64, AnchorError> {
        msg.validate_basic()?;
        self.register_chain(
            ctx,
            &msg.moniker,
            &msg.name,
            &msg.genesis_hash,
            &msg.base_type,
            &msg.owner,
        )
    }

    pub fn handle_record(&self, ctx: &mut Context<'_>, msg: &MsgRecordChainBlock) -> Result<RecordOutcome, AnchorError> {
        msg.validate_basic()?;
        self.record_block(ctx, msg.chain_id, msg.height, &msg.hashes, &msg.owner)
    }

    pub fn handle_purchase_storage(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgPurchaseChainStorage,
    ) -> Result<StorageCapacity, AnchorError> {
        msg.validate_basic()?;
        self.purchase_slots(ctx, msg.chain_id, msg.number, &msg.owner)
    }
}
