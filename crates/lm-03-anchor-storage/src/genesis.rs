//! Anchor genesis import and export.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared_types::Context;

use crate::domain::{AnchorError, AnchorParams, AnchorRecord, AnchoredChain, StorageCapacity};
use crate::service::{AnchorStorageManager, DEFAULT_STARTING_CHAIN_ID};

/// One chain with its capacity and in-state records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub chain: AnchoredChain,
    pub in_state_limit: u64,
    #[serde(default)]
    pub blocks: Vec<AnchorRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorGenesis {
    pub params: AnchorParams,
    pub starting_chain_id: u64,
    #[serde(default)]
    pub chains: Vec<ChainExport>,
}

impl AnchorGenesis {
    pub fn new(params: AnchorParams) -> Self {
        Self {
            params,
            starting_chain_id: DEFAULT_STARTING_CHAIN_ID,
            chains: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), AnchorError> {
        let invalid = |msg: String| Err(AnchorError::InvalidGenesis(msg));

        self.params
            .validate()
            .map_err(|e| AnchorError::InvalidGenesis(e.to_string()))?;
        if self.starting_chain_id == 0 {
            return invalid("starting chain id must be positive".into());
        }

        let mut ids = BTreeSet::new();
        let mut monikers = BTreeSet::new();
        for export in &self.chains {
            let chain = &export.chain;
            if chain.id == 0 || chain.id >= self.starting_chain_id {
                return invalid(format!("chain id {} outside 1..{}", chain.id, self.starting_chain_id));
            }
            if !ids.insert(chain.id) {
                return invalid(format!("duplicate chain id {}", chain.id));
            }
            if chain.moniker.is_empty() || !monikers.insert(chain.moniker.as_str()) {
                return invalid(format!("chain {} has a missing or duplicate moniker", chain.id));
            }
            if chain.owner.is_zero() {
                return invalid(format!("chain {} has no owner", chain.id));
            }
            if export.in_state_limit == 0 {
                return invalid(format!("chain {} has a zero in-state limit", chain.id));
            }

            let mut heights = BTreeSet::new();
            for block in &export.blocks {
                if block.chain_id != chain.id {
                    return invalid(format!(
                        "block {} listed under chain {} belongs to chain {}",
                        block.height, chain.id, block.chain_id
                    ));
                }
                if block.height == 0 || block.hashes.block_hash.is_empty() {
                    return invalid(format!("chain {} has a block without height or hash", chain.id));
                }
                if block.height > chain.last_height {
                    return invalid(format!(
                        "chain {} block {} is above last height {}",
                        chain.id, block.height, chain.last_height
                    ));
                }
                if !heights.insert(block.height) {
                    return invalid(format!("chain {} repeats block {}", chain.id, block.height));
                }
            }
        }
        Ok(())
    }
}

impl AnchorStorageManager {
    /// Import state. In-state counters are rebuilt from the imported
    /// records and each chain is pruned to its limit.
    pub fn init_genesis(&mut self, ctx: &mut Context<'_>, genesis: &AnchorGenesis) -> Result<(), AnchorError> {
        genesis.validate()?;
        self.replace_params(genesis.params.clone());
        self.set_next_chain_id(ctx, genesis.starting_chain_id)?;

        let mut blocks = 0usize;
        for export in &genesis.chains {
            let mut chain = export.chain.clone();
            chain.num_blocks_in_state = export.blocks.len() as u64;
            chain.lowest_height_in_state = export.blocks.iter().map(|b| b.height).min().unwrap_or(0);
            self.set_chain(ctx, &chain)?;
            self.set_storage(
                ctx,
                &StorageCapacity {
                    chain_id: chain.id,
                    in_state_limit: export.in_state_limit,
                },
            )?;
            for block in &export.blocks {
                self.set_block(ctx, block)?;
            }
            self.prune_to_limit(ctx, chain.id)?;
            blocks += export.blocks.len();
        }
        tracing::info!(
            "[anchor] genesis imported: {} chains, {} records, next id {}",
            genesis.chains.len(),
            blocks,
            genesis.starting_chain_id
        );
        Ok(())
    }

    pub fn export_genesis(&self, ctx: &Context<'_>) -> Result<AnchorGenesis, AnchorError> {
        let mut chains = Vec::new();
        for chain in self.all_chains(ctx)? {
            let in_state_limit = self.in_state_limit(ctx, chain.id)?;
            let blocks = self.all_blocks(ctx, chain.id)?;
            chains.push(ChainExport {
                chain,
                in_state_limit,
                blocks,
            });
        }
        Ok(AnchorGenesis {
            params: self.params().clone(),
            starting_chain_id: self.next_chain_id(ctx)?,
            chains,
        })
    }
}
