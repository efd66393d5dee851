//! # Ledger Configuration
//!
//! Identity of the ledger, the params authority and the module params
//! used when starting from an empty genesis.
//!
//! ## Requirements
//!
//! - `authority` MUST NOT be the zero address
//! - Both params blocks must pass their own `validate()`

use std::path::Path;

use lm_02_purchase_orders::EnterpriseParams;
use lm_03_anchor_storage::AnchorParams;
use serde::{Deserialize, Serialize};
use shared_types::Address;

use crate::errors::RuntimeError;

/// Module account that owns params updates unless configured otherwise.
pub const DEFAULT_AUTHORITY_MODULE: &str = "gov";

/// Complete ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Chain identifier, informational.
    pub chain_id: String,
    /// The only caller allowed to update module params.
    pub authority: Address,
    /// Purchase order and escrow params for a fresh genesis.
    pub enterprise: EnterpriseParams,
    /// Anchor params for a fresh genesis.
    pub anchor: AnchorParams,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: "enterprise-ledger".to_string(),
            authority: Address::module(DEFAULT_AUTHORITY_MODULE),
            enterprise: EnterpriseParams::default(),
            anchor: AnchorParams::default(),
        }
    }
}

impl LedgerConfig {
    /// Testing params in both modules and a fixed authority.
    pub fn for_testing() -> Self {
        Self {
            chain_id: "enterprise-ledger-test".to_string(),
            authority: Address::new([0xAD; 20]),
            enterprise: EnterpriseParams::for_testing(),
            anchor: AnchorParams::for_testing(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RuntimeError> {
        serde_json::from_str(json).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RuntimeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Checks the identity fields only. Params are validated when a
    /// genesis built from them is imported.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.chain_id.trim().is_empty() {
            return Err(RuntimeError::Config("chain id is empty".into()));
        }
        if self.authority.is_zero() {
            return Err(RuntimeError::Config("authority is the zero address".into()));
        }
        Ok(())
    }
}
