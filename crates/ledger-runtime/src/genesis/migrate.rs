//! # Genesis Migrations
//!
//! One-way transforms between genesis layouts, applied in order over the
//! raw JSON. Batch tooling only; nothing here runs inside block processing.
//!
//! | From | To | Transform |
//! |------|----|-----------|
//! | 1 | 2 | adds storage params and per-chain limits, prunes each chain newest-first |
//! | 2 | 3 | renames chain `type` to `base_type`, derives spent escrow tallies |

use std::collections::BTreeMap;

use lm_01_escrow_ledger::{LockedBalance, SpentBalance};
use lm_02_purchase_orders::PurchaseOrder;
use lm_03_anchor_storage::AnchorParams;
use serde_json::{json, Map, Value};
use shared_types::{Address, Coin, PurchaseOrderStatus, U256};
use thiserror::Error;
use tracing::{info, warn};

use super::state::{read_version, GenesisError, GENESIS_VERSION};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("no migration path from version {from} to {to}")]
    NoPath { from: u64, to: u64 },

    #[error("malformed genesis: {0}")]
    Malformed(String),

    #[error("genesis json: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrationError {
    pub fn code(&self) -> u32 {
        match self {
            MigrationError::NoPath { .. } => 701,
            MigrationError::Malformed(_) => 702,
            MigrationError::Json(_) => 703,
        }
    }
}

impl From<GenesisError> for MigrationError {
    fn from(err: GenesisError) -> Self {
        MigrationError::Malformed(err.to_string())
    }
}

type Transform = Box<dyn Fn(Value) -> Result<Value, MigrationError> + Send + Sync>;

/// One registered `(from_version, transform)` pair.
pub struct MigrationStep {
    pub from: u64,
    pub name: &'static str,
    transform: Transform,
}

/// Ordered list of migration steps.
#[derive(Default)]
pub struct MigrationPipeline {
    steps: Vec<MigrationStep>,
}

impl MigrationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered steps up to [`GENESIS_VERSION`], storage defaults
    /// taken from [`AnchorParams::default`].
    pub fn standard() -> Self {
        Self::standard_with(&AnchorParams::default())
    }

    /// The registered steps, filling new anchor fields from `defaults`.
    pub fn standard_with(defaults: &AnchorParams) -> Self {
        let defaults = defaults.clone();
        Self::new()
            .with_step(1, "add_storage_limits", move |genesis| add_storage_limits(genesis, &defaults))
            .with_step(2, "base_type_and_spent", rename_base_type_and_derive_spent)
    }

    pub fn with_step<F>(mut self, from: u64, name: &'static str, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, MigrationError> + Send + Sync + 'static,
    {
        self.steps.push(MigrationStep {
            from,
            name,
            transform: Box::new(transform),
        });
        self
    }

    pub fn steps(&self) -> impl Iterator<Item = (u64, &'static str)> + '_ {
        self.steps.iter().map(|s| (s.from, s.name))
    }

    /// Apply steps until the genesis reaches `target`. Each step bumps the
    /// `version` field by one.
    pub fn migrate(&self, mut genesis: Value, target: u64) -> Result<Value, MigrationError> {
        let mut version = read_version(&genesis)?;
        if version > target {
            return Err(MigrationError::NoPath { from: version, to: target });
        }
        while version < target {
            let step = self
                .steps
                .iter()
                .find(|s| s.from == version)
                .ok_or(MigrationError::NoPath { from: version, to: target })?;
            genesis = (step.transform)(genesis)?;
            version += 1;
            object_mut(&mut genesis, "genesis")?.insert("version".into(), json!(version));
            info!("[migrate] applied {} ({} -> {})", step.name, version - 1, version);
        }
        Ok(genesis)
    }

    pub fn migrate_to_current(&self, genesis: Value) -> Result<Value, MigrationError> {
        self.migrate(genesis, GENESIS_VERSION)
    }
}

fn object_mut<'a>(value: &'a mut Value, what: &str) -> Result<&'a mut Map<String, Value>, MigrationError> {
    value
        .as_object_mut()
        .ok_or_else(|| MigrationError::Malformed(format!("{} is not an object", what)))
}

fn field_mut<'a>(value: &'a mut Value, key: &str) -> Result<&'a mut Value, MigrationError> {
    object_mut(value, key)?
        .get_mut(key)
        .ok_or_else(|| MigrationError::Malformed(format!("missing {}", key)))
}

fn chains_mut(genesis: &mut Value) -> Result<Vec<&mut Value>, MigrationError> {
    let anchor = field_mut(genesis, "anchor")?;
    match anchor.get_mut("chains") {
        Some(Value::Array(chains)) => Ok(chains.iter_mut().collect()),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(MigrationError::Malformed("anchor.chains is not a list".into())),
    }
}

// =============================================================================
// 1 -> 2
// =============================================================================

fn add_storage_limits(mut genesis: Value, defaults: &AnchorParams) -> Result<Value, MigrationError> {
    {
        let params = object_mut(field_mut(field_mut(&mut genesis, "anchor")?, "params")?, "anchor.params")?;
        params
            .entry("fee_purchase_storage")
            .or_insert(json!(defaults.fee_purchase_storage));
        params
            .entry("default_storage_limit")
            .or_insert(json!(defaults.default_storage_limit));
        params
            .entry("max_storage_limit")
            .or_insert(json!(defaults.max_storage_limit));
    }
    let limit = defaults.default_storage_limit;
    let keep = usize::try_from(limit).unwrap_or(usize::MAX);

    for export in chains_mut(&mut genesis)? {
        let export = object_mut(export, "chain export")?;
        let mut blocks = match export.remove("blocks") {
            Some(Value::Array(blocks)) => blocks,
            _ => Vec::new(),
        };
        // newest first, keep the first `limit`
        blocks.sort_by_key(|b| std::cmp::Reverse(b.get("height").and_then(Value::as_u64).unwrap_or(0)));
        let pruned = blocks.len().saturating_sub(keep);
        blocks.truncate(keep);
        blocks.reverse();

        let lowest = blocks
            .first()
            .and_then(|b| b.get("height"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let chain = export
            .get_mut("chain")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| MigrationError::Malformed("chain export without chain".into()))?;
        chain.insert("num_blocks_in_state".into(), json!(blocks.len()));
        chain.insert("lowest_height_in_state".into(), json!(lowest));
        if pruned > 0 {
            info!(
                "[migrate] chain {} pruned {} records to limit {}",
                chain.get("id").cloned().unwrap_or(serde_json::Value::Null),
                pruned,
                limit
            );
        }

        export.insert("in_state_limit".into(), json!(limit));
        export.insert("blocks".into(), Value::Array(blocks));
    }
    Ok(genesis)
}

// =============================================================================
// 2 -> 3
// =============================================================================

fn rename_base_type_and_derive_spent(mut genesis: Value) -> Result<Value, MigrationError> {
    for export in chains_mut(&mut genesis)? {
        let chain = field_mut(export, "chain")?;
        let chain = object_mut(chain, "chain")?;
        let base_type = chain.remove("type").unwrap_or_else(|| json!(""));
        chain.entry("base_type").or_insert(base_type);
    }

    let denom = genesis
        .pointer("/orders/params/denom")
        .and_then(Value::as_str)
        .ok_or_else(|| MigrationError::Malformed("missing orders.params.denom".into()))?
        .to_string();
    let orders: Vec<PurchaseOrder> = match genesis.pointer("/orders/purchase_orders") {
        Some(orders) => serde_json::from_value(orders.clone())?,
        None => Vec::new(),
    };

    if genesis.pointer("/escrow/spent").is_some() {
        return Ok(genesis);
    }
    let escrow = object_mut(field_mut(&mut genesis, "escrow")?, "escrow")?;
    let locked: Vec<LockedBalance> = match escrow.get("locked") {
        Some(locked) => serde_json::from_value(locked.clone())?,
        None => Vec::new(),
    };

    let (spent, total_spent) = derive_spent(&denom, &orders, &locked);
    escrow.insert("spent".into(), serde_json::to_value(&spent)?);
    escrow.insert("total_spent".into(), serde_json::to_value(&total_spent)?);
    Ok(genesis)
}

/// Spent per locked account is everything minted for its completed orders
/// minus what is still locked.
fn derive_spent(denom: &str, orders: &[PurchaseOrder], locked: &[LockedBalance]) -> (Vec<SpentBalance>, Coin) {
    let mut minted: BTreeMap<Address, U256> = BTreeMap::new();
    for order in orders {
        if order.status == PurchaseOrderStatus::Completed && order.amount.denom == denom {
            let entry = minted.entry(order.purchaser).or_default();
            *entry = entry.saturating_add(order.amount.amount);
        }
    }

    let mut total = U256::zero();
    let mut spent = Vec::with_capacity(locked.len());
    for balance in locked {
        let completed = minted.get(&balance.owner).copied().unwrap_or_default();
        let amount = match completed.checked_sub(balance.amount.amount) {
            Some(amount) => amount,
            None => {
                warn!(
                    "[migrate] {} has more locked ({}) than completed orders ({}), spent set to 0",
                    balance.owner, balance.amount.amount, completed
                );
                U256::zero()
            }
        };
        total = total.saturating_add(amount);
        spent.push(SpentBalance {
            owner: balance.owner,
            amount: Coin::new(denom, amount),
        });
    }
    (spent, Coin::new(denom, total))
}
