//! Inbound port used by the fee pipeline to price and guard anchor
//! messages.

use shared_types::Context;

use crate::domain::{AnchorError, AnchorParams, AnchoredChain};

/// Read-only anchor lookups.
pub trait AnchorQuery {
    fn anchor_params(&self) -> &AnchorParams;

    fn chain(&self, ctx: &Context<'_>, id: u64) -> Result<Option<AnchoredChain>, AnchorError>;

    /// Slots the owner of `id` may still buy. Errors if the chain is unknown.
    fn max_purchasable_slots(&self, ctx: &Context<'_>, id: u64) -> Result<u64, AnchorError>;
}
