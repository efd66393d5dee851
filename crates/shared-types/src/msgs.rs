//! # Messages and Transactions
//!
//! Payloads accepted by the ledger modules. Each message carries its signer;
//! `validate_basic` performs the stateless field checks every handler and
//! the admission pipeline rely on.
//!
//! | Field | Limit |
//! |-------|-------|
//! | chain name | ≤ 128 chars |
//! | moniker | 1..=64 chars |
//! | base type | ≤ 64 chars |
//! | any hash | ≤ 66 chars |
//! | memo | ≤ 256 chars |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coins::{Coin, Coins};
use crate::entities::Address;

pub const MAX_NAME_LEN: usize = 128;
pub const MAX_MONIKER_LEN: usize = 64;
pub const MAX_BASE_TYPE_LEN: usize = 64;
pub const MAX_HASH_LEN: usize = 66;
pub const MAX_MEMO_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MsgError {
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("content too large: {field} is {len} chars, max {max}")]
    ContentTooLarge { field: String, len: usize, max: usize },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    #[error("invalid decision: must be accept or reject")]
    InvalidDecision,

    #[error("invalid whitelist action: must be add or remove")]
    InvalidWhitelistAction,

    #[error("transaction contains no messages")]
    EmptyTx,
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), MsgError> {
    if value.len() > max {
        return Err(MsgError::ContentTooLarge {
            field: field.to_string(),
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn check_present(field: &str, value: &str) -> Result<(), MsgError> {
    if value.trim().is_empty() {
        return Err(MsgError::MissingData(field.to_string()));
    }
    Ok(())
}

fn check_address(field: &str, addr: &Address) -> Result<(), MsgError> {
    if addr.is_zero() {
        return Err(MsgError::InvalidAddress(field.to_string()));
    }
    Ok(())
}

// =============================================================================
// ENUMS CARRIED BY MESSAGES
// =============================================================================

/// Lifecycle of a purchase order. Also used as the decision value of a
/// signer, where only `Accepted` and `Rejected` are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    #[default]
    Nil,
    Raised,
    Accepted,
    Rejected,
    Completed,
}

impl PurchaseOrderStatus {
    pub fn is_valid_decision(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Raised => "raised",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhitelistAction {
    #[default]
    Nil,
    Add,
    Remove,
}

impl std::fmt::Display for WhitelistAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Nil => "nil",
            Self::Add => "add",
            Self::Remove => "remove",
        };
        f.write_str(s)
    }
}

// =============================================================================
// PURCHASE ORDER MESSAGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRaisePurchaseOrder {
    pub purchaser: Address,
    pub amount: Coin,
}

impl MsgRaisePurchaseOrder {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("purchaser", &self.purchaser)?;
        self.amount
            .validate()
            .map_err(|e| MsgError::InvalidCoins(e.to_string()))?;
        if !self.amount.is_positive() {
            return Err(MsgError::InvalidCoins("amount must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProcessPurchaseOrder {
    pub purchase_order_id: u64,
    pub decision: PurchaseOrderStatus,
    pub signer: Address,
}

impl MsgProcessPurchaseOrder {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("signer", &self.signer)?;
        if self.purchase_order_id == 0 {
            return Err(MsgError::MissingData("purchase order id".into()));
        }
        if !self.decision.is_valid_decision() {
            return Err(MsgError::InvalidDecision);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgWhitelistAddress {
    pub address: Address,
    pub action: WhitelistAction,
    pub signer: Address,
}

impl MsgWhitelistAddress {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("signer", &self.signer)?;
        check_address("address", &self.address)?;
        if self.action == WhitelistAction::Nil {
            return Err(MsgError::InvalidWhitelistAction);
        }
        Ok(())
    }
}

// =============================================================================
// ANCHOR MESSAGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRegisterChain {
    pub moniker: String,
    pub name: String,
    pub genesis_hash: String,
    pub base_type: String,
    pub owner: Address,
}

impl MsgRegisterChain {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("owner", &self.owner)?;
        check_present("moniker", &self.moniker)?;
        check_len("moniker", &self.moniker, MAX_MONIKER_LEN)?;
        check_len("name", &self.name, MAX_NAME_LEN)?;
        check_len("genesis hash", &self.genesis_hash, MAX_HASH_LEN)?;
        check_len("base type", &self.base_type, MAX_BASE_TYPE_LEN)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHashes {
    pub block_hash: String,
    pub parent_hash: String,
    pub hash1: String,
    pub hash2: String,
    pub hash3: String,
}

impl BlockHashes {
    pub fn new(block_hash: impl Into<String>) -> Self {
        Self {
            block_hash: block_hash.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), MsgError> {
        check_present("block hash", &self.block_hash)?;
        for (field, value) in [
            ("block hash", &self.block_hash),
            ("parent hash", &self.parent_hash),
            ("hash1", &self.hash1),
            ("hash2", &self.hash2),
            ("hash3", &self.hash3),
        ] {
            check_len(field, value, MAX_HASH_LEN)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRecordChainBlock {
    pub chain_id: u64,
    pub height: u64,
    pub hashes: BlockHashes,
    pub owner: Address,
}

impl MsgRecordChainBlock {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("owner", &self.owner)?;
        if self.chain_id == 0 {
            return Err(MsgError::MissingData("chain id".into()));
        }
        if self.height == 0 {
            return Err(MsgError::MissingData("height".into()));
        }
        self.hashes.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPurchaseChainStorage {
    pub chain_id: u64,
    pub number: u64,
    pub owner: Address,
}

impl MsgPurchaseChainStorage {
    pub fn validate_basic(&self) -> Result<(), MsgError> {
        check_address("owner", &self.owner)?;
        if self.chain_id == 0 {
            return Err(MsgError::MissingData("chain id".into()));
        }
        if self.number == 0 {
            return Err(MsgError::MissingData("number of slots".into()));
        }
        Ok(())
    }
}

// =============================================================================
// ENVELOPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    RaisePurchaseOrder(MsgRaisePurchaseOrder),
    ProcessPurchaseOrder(MsgProcessPurchaseOrder),
    WhitelistAddress(MsgWhitelistAddress),
    RegisterChain(MsgRegisterChain),
    RecordChainBlock(MsgRecordChainBlock),
    PurchaseChainStorage(MsgPurchaseChainStorage),
}

impl Msg {
    pub fn signer(&self) -> Address {
        match self {
            Msg::RaisePurchaseOrder(m) => m.purchaser,
            Msg::ProcessPurchaseOrder(m) => m.signer,
            Msg::WhitelistAddress(m) => m.signer,
            Msg::RegisterChain(m) => m.owner,
            Msg::RecordChainBlock(m) => m.owner,
            Msg::PurchaseChainStorage(m) => m.owner,
        }
    }

    /// Messages priced and guarded by the anchor fee schedule.
    pub fn is_anchor(&self) -> bool {
        matches!(
            self,
            Msg::RegisterChain(_) | Msg::RecordChainBlock(_) | Msg::PurchaseChainStorage(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Msg::RaisePurchaseOrder(_) => "raise_purchase_order",
            Msg::ProcessPurchaseOrder(_) => "process_purchase_order",
            Msg::WhitelistAddress(_) => "whitelist_address",
            Msg::RegisterChain(_) => "register_chain",
            Msg::RecordChainBlock(_) => "record_chain_block",
            Msg::PurchaseChainStorage(_) => "purchase_chain_storage",
        }
    }

    pub fn validate_basic(&self) -> Result<(), MsgError> {
        match self {
            Msg::RaisePurchaseOrder(m) => m.validate_basic(),
            Msg::ProcessPurchaseOrder(m) => m.validate_basic(),
            Msg::WhitelistAddress(m) => m.validate_basic(),
            Msg::RegisterChain(m) => m.validate_basic(),
            Msg::RecordChainBlock(m) => m.validate_basic(),
            Msg::PurchaseChainStorage(m) => m.validate_basic(),
        }
    }
}

/// A signed-off transaction as seen after authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub msgs: Vec<Msg>,
    pub fee: Coins,
    /// Explicit fee payer; defaults to the first message's signer.
    pub fee_payer: Option<Address>,
    pub gas_limit: u64,
    pub memo: String,
}

impl Tx {
    pub fn new(msgs: Vec<Msg>, fee: Coins) -> Self {
        Self {
            msgs,
            fee,
            fee_payer: None,
            gas_limit: 200_000,
            memo: String::new(),
        }
    }

    pub fn with_fee_payer(mut self, payer: Address) -> Self {
        self.fee_payer = Some(payer);
        self
    }

    pub fn fee_payer(&self) -> Address {
        self.fee_payer
            .or_else(|| self.msgs.first().map(Msg::signer))
            .unwrap_or(Address::ZERO)
    }

    pub fn has_anchor_msgs(&self) -> bool {
        self.msgs.iter().any(Msg::is_anchor)
    }

    pub fn validate_basic(&self) -> Result<(), MsgError> {
        if self.msgs.is_empty() {
            return Err(MsgError::EmptyTx);
        }
        self.fee
            .validate()
            .map_err(|e| MsgError::InvalidCoins(e.to_string()))?;
        check_len("memo", &self.memo, MAX_MEMO_LEN)?;
        check_address("fee payer", &self.fee_payer())?;
        self.msgs.iter().try_for_each(Msg::validate_basic)
    }
}
