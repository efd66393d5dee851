//! Anchored chains, their block records and query filters.

use serde::{Deserialize, Serialize};
use shared_types::{page_window, Address, BlockHashes, Timestamp};

pub use shared_types::MAX_PAGE_LIMIT;

/// A registered external chain.
///
/// `last_height` only ever grows and survives pruning. The in-state
/// counters describe the records still held in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredChain {
    pub id: u64,
    pub moniker: String,
    pub name: String,
    pub genesis_hash: String,
    pub base_type: String,
    pub owner: Address,
    pub last_height: u64,
    pub num_blocks_in_state: u64,
    pub lowest_height_in_state: u64,
    pub registration_time: Timestamp,
}

/// Hashes submitted for one external block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub chain_id: u64,
    pub height: u64,
    pub hashes: BlockHashes,
    pub submit_time: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCapacity {
    pub chain_id: u64,
    pub in_state_limit: u64,
}

/// Result of recording a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub chain_id: u64,
    pub height: u64,
    /// Heights deleted to stay within the in-state limit, oldest first.
    pub pruned: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFilter {
    pub moniker: Option<String>,
    pub owner: Option<Address>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ChainFilter {
    fn default() -> Self {
        Self {
            moniker: None,
            owner: None,
            page: 1,
            limit: MAX_PAGE_LIMIT,
        }
    }
}

impl ChainFilter {
    pub fn matches(&self, chain: &AnchoredChain) -> bool {
        self.moniker.as_deref().map_or(true, |m| chain.moniker == m)
            && self.owner.map_or(true, |o| chain.owner == o)
    }

    pub fn window(&self) -> (usize, usize) {
        page_window(self.page, self.limit)
    }
}

/// Block query filter. Zero bounds and an unset hash match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFilter {
    pub min_height: u64,
    pub max_height: u64,
    pub min_date: Timestamp,
    pub max_date: Timestamp,
    pub hash: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl Default for BlockFilter {
    fn default() -> Self {
        Self {
            min_height: 0,
            max_height: 0,
            min_date: 0,
            max_date: 0,
            hash: None,
            page: 1,
            limit: MAX_PAGE_LIMIT,
        }
    }
}

impl BlockFilter {
    pub fn matches(&self, record: &AnchorRecord) -> bool {
        (self.min_height == 0 || record.height >= self.min_height)
            && (self.max_height == 0 || record.height <= self.max_height)
            && (self.min_date == 0 || record.submit_time >= self.min_date)
            && (self.max_date == 0 || record.submit_time <= self.max_date)
            && self
                .hash
                .as_deref()
                .map_or(true, |h| record.hashes.block_hash == h)
    }

    pub fn window(&self) -> (usize, usize) {
        page_window(self.page, self.limit)
    }
}
