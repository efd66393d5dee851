//! # Anchor Storage Service
//!
//! Registers external chains, appends their block hashes and keeps each
//! chain's in-state history within its purchased capacity.
//!
//! ```text
//!   register ──▶ AnchoredChain + StorageCapacity(default limit)
//!   record   ──▶ AnchorRecord appended, last_height advanced
//!                 └─ count > limit ──▶ oldest records deleted
//!   purchase ──▶ limit += n   (limit <= max_storage_limit)
//! ```

use shared_types::codec::{self, u64_from_key_suffix};
use shared_types::{Address, BlockHashes, Context, Event};
use tracing::{debug, info};

use crate::domain::keys::{
    block_key, chain_blocks_prefix, chain_key, moniker_key, storage_key, CHAIN_PREFIX, NEXT_ID_KEY,
};
use crate::domain::{
    AnchorError, AnchorParams, AnchorRecord, AnchoredChain, BlockFilter, ChainFilter,
    RecordOutcome, StorageCapacity,
};
use crate::ports::AnchorQuery;

pub const EVENT_REGISTER: &str = "register_chain";
pub const EVENT_RECORD: &str = "record_chain_block";
pub const EVENT_PURCHASE_STORAGE: &str = "purchase_chain_storage";

pub const DEFAULT_STARTING_CHAIN_ID: u64 = 1;

/// Anchor storage keeper.
#[derive(Debug, Clone)]
pub struct AnchorStorageManager {
    params: AnchorParams,
    authority: Address,
}

impl AnchorStorageManager {
    pub fn new(params: AnchorParams, authority: Address) -> Result<Self, AnchorError> {
        params.validate()?;
        Ok(Self { params, authority })
    }

    pub fn params(&self) -> &AnchorParams {
        &self.params
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    /// Replace the params. Only the authority may do this. Existing chains
    /// keep their current limits.
    pub fn update_params(&mut self, caller: &Address, mut params: AnchorParams) -> Result<(), AnchorError> {
        if caller != &self.authority {
            return Err(AnchorError::Unauthorized(*caller));
        }
        params.validate()?;
        params.version = self.params.version + 1;
        info!(
            "[anchor] params updated to version {} (record fee {}, max storage {})",
            params.version, params.fee_record, params.max_storage_limit
        );
        self.params = params;
        Ok(())
    }

    pub(crate) fn replace_params(&mut self, params: AnchorParams) {
        self.params = params;
    }

    // =========================================================================
    // RECORD ACCESS
    // =========================================================================

    pub fn next_chain_id(&self, ctx: &Context<'_>) -> Result<u64, AnchorError> {
        Ok(codec::load::<u64>(ctx.store(), NEXT_ID_KEY)?.unwrap_or(DEFAULT_STARTING_CHAIN_ID))
    }

    pub fn set_next_chain_id(&self, ctx: &mut Context<'_>, id: u64) -> Result<(), AnchorError> {
        codec::save(ctx.store_mut(), NEXT_ID_KEY, &id)?;
        Ok(())
    }

    pub fn get_chain(&self, ctx: &Context<'_>, id: u64) -> Result<Option<AnchoredChain>, AnchorError> {
        Ok(codec::load(ctx.store(), &chain_key(id))?)
    }

    fn require_chain(&self, ctx: &Context<'_>, id: u64) -> Result<AnchoredChain, AnchorError> {
        self.get_chain(ctx, id)?
            .ok_or(AnchorError::ChainDoesNotExist(id))
    }

    pub fn is_registered(&self, ctx: &Context<'_>, id: u64) -> bool {
        ctx.store().has(&chain_key(id))
    }

    pub(crate) fn set_chain(&self, ctx: &mut Context<'_>, chain: &AnchoredChain) -> Result<(), AnchorError> {
        codec::save(ctx.store_mut(), &chain_key(chain.id), chain)?;
        codec::save(ctx.store_mut(), &moniker_key(&chain.moniker), &chain.id)?;
        Ok(())
    }

    pub fn chain_by_moniker(&self, ctx: &Context<'_>, moniker: &str) -> Result<Option<AnchoredChain>, AnchorError> {
        match codec::load::<u64>(ctx.store(), &moniker_key(moniker))? {
            Some(id) => self.get_chain(ctx, id),
            None => Ok(None),
        }
    }

    /// All chains, ascending id.
    pub fn all_chains(&self, ctx: &Context<'_>) -> Result<Vec<AnchoredChain>, AnchorError> {
        Ok(codec::load_all(ctx.store(), CHAIN_PREFIX)?)
    }

    pub fn chains(&self, ctx: &Context<'_>, filter: &ChainFilter) -> Result<Vec<AnchoredChain>, AnchorError> {
        let (skip, take) = filter.window();
        Ok(self
            .all_chains(ctx)?
            .into_iter()
            .filter(|c| filter.matches(c))
            .skip(skip)
            .take(take)
            .collect())
    }

    pub fn storage(&self, ctx: &Context<'_>, id: u64) -> Result<Option<StorageCapacity>, AnchorError> {
        Ok(codec::load(ctx.store(), &storage_key(id))?)
    }

    pub(crate) fn set_storage(&self, ctx: &mut Context<'_>, storage: &StorageCapacity) -> Result<(), AnchorError> {
        codec::save(ctx.store_mut(), &storage_key(storage.chain_id), storage)?;
        Ok(())
    }

    /// In-state limit of a chain. Chains without a capacity record get the
    /// current default.
    pub fn in_state_limit(&self, ctx: &Context<'_>, id: u64) -> Result<u64, AnchorError> {
        Ok(self
            .storage(ctx, id)?
            .map_or(self.params.default_storage_limit, |s| s.in_state_limit))
    }

    pub fn get_block(&self, ctx: &Context<'_>, id: u64, height: u64) -> Result<Option<AnchorRecord>, AnchorError> {
        Ok(codec::load(ctx.store(), &block_key(id, height))?)
    }

    pub(crate) fn set_block(&self, ctx: &mut Context<'_>, record: &AnchorRecord) -> Result<(), AnchorError> {
        codec::save(ctx.store_mut(), &block_key(record.chain_id, record.height), record)?;
        Ok(())
    }

    /// In-state records of a chain, ascending height.
    pub fn all_blocks(&self, ctx: &Context<'_>, id: u64) -> Result<Vec<AnchorRecord>, AnchorError> {
        Ok(codec::load_all(ctx.store(), &chain_blocks_prefix(id))?)
    }

    pub fn blocks(&self, ctx: &Context<'_>, id: u64, filter: &BlockFilter) -> Result<Vec<AnchorRecord>, AnchorError> {
        let (skip, take) = filter.window();
        Ok(self
            .all_blocks(ctx, id)?
            .into_iter()
            .filter(|b| filter.matches(b))
            .skip(skip)
            .take(take)
            .collect())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Register a chain under a unique moniker. Returns its id.
    pub fn register_chain(
        &self,
        ctx: &mut Context<'_>,
        moniker: &str,
        name: &str,
        genesis_hash: &str,
        base_type: &str,
        owner: &Address,
    ) -> Result<u64, AnchorError> {
        if ctx.store().has(&moniker_key(moniker)) {
            return Err(AnchorError::ChainAlreadyRegistered(moniker.to_string()));
        }

        let id = self.next_chain_id(ctx)?;
        let next_id = id.checked_add(1).ok_or(AnchorError::IdsExhausted(id))?;
        let chain = AnchoredChain {
            id,
            moniker: moniker.to_string(),
            name: name.to_string(),
            genesis_hash: genesis_hash.to_string(),
            base_type: base_type.to_string(),
            owner: *owner,
            last_height: 0,
            num_blocks_in_state: 0,
            lowest_height_in_state: 0,
            registration_time: ctx.block_time(),
        };
        self.set_chain(ctx, &chain)?;
        self.set_storage(
            ctx,
            &StorageCapacity {
                chain_id: id,
                in_state_limit: self.params.default_storage_limit,
            },
        )?;
        self.set_next_chain_id(ctx, next_id)?;

        ctx.emit(
            Event::new(EVENT_REGISTER)
                .attr("chain_id", id)
                .attr("moniker", moniker)
                .attr("name", name)
                .attr("genesis_hash", genesis_hash)
                .attr("base_type", base_type)
                .attr("owner", owner),
        );
        info!("[anchor] registered chain {} ({}) for {}", id, moniker, owner);
        Ok(id)
    }

    /// Append hashes for a height above the chain's last recorded one.
    pub fn record_block(
        &self,
        ctx: &mut Context<'_>,
        chain_id: u64,
        height: u64,
        hashes: &BlockHashes,
        recorder: &Address,
    ) -> Result<RecordOutcome, AnchorError> {
        let mut chain = self.require_chain(ctx, chain_id)?;
        if &chain.owner != recorder {
            return Err(AnchorError::NotOwner {
                chain_id,
                caller: *recorder,
            });
        }
        if height <= chain.last_height {
            return Err(AnchorError::BlockAlreadyRecorded {
                chain_id,
                height,
                last_height: chain.last_height,
            });
        }

        self.set_block(
            ctx,
            &AnchorRecord {
                chain_id,
                height,
                hashes: hashes.clone(),
                submit_time: ctx.block_time(),
            },
        )?;
        chain.last_height = height;
        chain.num_blocks_in_state += 1;
        if chain.lowest_height_in_state == 0 {
            chain.lowest_height_in_state = height;
        }

        let limit = self.in_state_limit(ctx, chain_id)?;
        let mut pruned = Vec::new();
        while chain.num_blocks_in_state > limit {
            match evict_oldest(ctx, &mut chain) {
                Some(height) => pruned.push(height),
                None => break,
            }
        }
        self.set_chain(ctx, &chain)?;

        let mut event = Event::new(EVENT_RECORD)
            .attr("chain_id", chain_id)
            .attr("height", height)
            .attr("block_hash", &hashes.block_hash)
            .attr("parent_hash", &hashes.parent_hash)
            .attr("hash1", &hashes.hash1)
            .attr("hash2", &hashes.hash2)
            .attr("hash3", &hashes.hash3)
            .attr("owner", recorder);
        if !pruned.is_empty() {
            let heights: Vec<String> = pruned.iter().map(u64::to_string).collect();
            event = event.attr("pruned_heights", heights.join(","));
        }
        ctx.emit(event);
        debug!(
            "[anchor] chain {} recorded height {} ({} in state, {} pruned)",
            chain_id,
            height,
            chain.num_blocks_in_state,
            pruned.len()
        );
        Ok(RecordOutcome {
            chain_id,
            height,
            pruned,
        })
    }

    /// Buy `number` more in-state slots for a chain.
    pub fn purchase_slots(
        &self,
        ctx: &mut Context<'_>,
        chain_id: u64,
        number: u64,
        buyer: &Address,
    ) -> Result<StorageCapacity, AnchorError> {
        let chain = self.require_chain(ctx, chain_id)?;
        if &chain.owner != buyer {
            return Err(AnchorError::NotOwner {
                chain_id,
                caller: *buyer,
            });
        }
        if number == 0 {
            return Err(AnchorError::MissingData("number of slots".into()));
        }
        let max_purchasable = self.max_purchasable_slots(ctx, chain_id)?;
        if number > max_purchasable {
            return Err(AnchorError::ExceedsMaxStorage {
                chain_id,
                requested: number,
                max_purchasable,
            });
        }

        let storage = StorageCapacity {
            chain_id,
            in_state_limit: self.in_state_limit(ctx, chain_id)? + number,
        };
        self.set_storage(ctx, &storage)?;

        ctx.emit(
            Event::new(EVENT_PURCHASE_STORAGE)
                .attr("chain_id", chain_id)
                .attr("number", number)
                .attr("in_state_limit", storage.in_state_limit)
                .attr("owner", buyer),
        );
        info!(
            "[anchor] chain {} bought {} slots, limit now {}",
            chain_id, number, storage.in_state_limit
        );
        Ok(storage)
    }

    /// `max_storage_limit - in_state_limit`, floored at zero.
    pub fn max_purchasable_slots(&self, ctx: &Context<'_>, chain_id: u64) -> Result<u64, AnchorError> {
        if !self.is_registered(ctx, chain_id) {
            return Err(AnchorError::ChainDoesNotExist(chain_id));
        }
        let limit = self.in_state_limit(ctx, chain_id)?;
        Ok(self.params.max_storage_limit.saturating_sub(limit))
    }

    // =========================================================================
    // MAINTENANCE
    // =========================================================================

    /// Delete a chain's records beyond its in-state limit, oldest first.
    /// Returns the pruned heights.
    pub fn prune_to_limit(&self, ctx: &mut Context<'_>, chain_id: u64) -> Result<Vec<u64>, AnchorError> {
        let mut chain = self.require_chain(ctx, chain_id)?;
        let limit = self.in_state_limit(ctx, chain_id)?;
        let pruned = retain_newest(ctx, &mut chain, limit);
        self.set_chain(ctx, &chain)?;
        if !pruned.is_empty() {
            info!(
                "[anchor] pruned {} records from chain {} (limit {})",
                pruned.len(),
                chain_id,
                limit
            );
        }
        Ok(pruned)
    }

    /// [`prune_to_limit`](Self::prune_to_limit) over every chain. Returns the
    /// number of records deleted.
    pub fn prune_all(&self, ctx: &mut Context<'_>) -> Result<u64, AnchorError> {
        let mut total = 0u64;
        for chain in self.all_chains(ctx)? {
            total += self.prune_to_limit(ctx, chain.id)?.len() as u64;
        }
        Ok(total)
    }
}

/// Delete the record at `lowest_height_in_state` and advance the counters to
/// the next record up. Touches two keys regardless of history size.
fn evict_oldest(ctx: &mut Context<'_>, chain: &mut AnchoredChain) -> Option<u64> {
    if chain.num_blocks_in_state == 0 {
        return None;
    }
    let oldest = chain.lowest_height_in_state;
    let oldest_key = block_key(chain.id, oldest);
    ctx.store_mut().delete(&oldest_key);
    chain.num_blocks_in_state -= 1;
    chain.lowest_height_in_state = ctx
        .store()
        .first_after(&chain_blocks_prefix(chain.id), &oldest_key)
        .and_then(|(key, _)| u64_from_key_suffix(&key))
        .unwrap_or(0);
    Some(oldest)
}

/// Keep the newest `limit` records of `chain`, delete the rest and refresh
/// the in-state counters. Returns deleted heights, ascending.
fn retain_newest(ctx: &mut Context<'_>, chain: &mut AnchoredChain, limit: u64) -> Vec<u64> {
    let keep = usize::try_from(limit).unwrap_or(usize::MAX);
    let newest_first: Vec<u64> = ctx
        .store()
        .scan_rev(&chain_blocks_prefix(chain.id))
        .into_iter()
        .filter_map(|(key, _)| u64_from_key_suffix(&key))
        .collect();

    let kept = &newest_first[..newest_first.len().min(keep)];
    let mut pruned: Vec<u64> = newest_first[kept.len()..].to_vec();
    for height in &pruned {
        ctx.store_mut().delete(&block_key(chain.id, *height));
    }
    pruned.reverse();

    chain.num_blocks_in_state = kept.len() as u64;
    chain.lowest_height_in_state = kept.last().copied().unwrap_or(0);
    pruned
}

impl AnchorQuery for AnchorStorageManager {
    fn anchor_params(&self) -> &AnchorParams {
        &self.params
    }

    fn chain(&self, ctx: &Context<'_>, id: u64) -> Result<Option<AnchoredChain>, AnchorError> {
        self.get_chain(ctx, id)
    }

    fn max_purchasable_slots(&self, ctx: &Context<'_>, id: u64) -> Result<u64, AnchorError> {
        AnchorStorageManager::max_purchasable_slots(self, ctx, id)
    }
}
