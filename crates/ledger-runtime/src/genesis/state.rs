//! # Genesis State
//!
//! Versioned snapshot of every module's state.

use lm_01_escrow_ledger::{EscrowError, EscrowGenesis};
use lm_02_purchase_orders::{OrderError, OrdersGenesis};
use lm_03_anchor_storage::{AnchorError, AnchorGenesis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{BankError, BankGenesis, Timestamp};
use thiserror::Error;

use crate::container::LedgerConfig;

/// Layout version written by this build.
pub const GENESIS_VERSION: u64 = 3;

/// Genesis import and export errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("genesis json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("genesis version {found} is not supported, expected {supported}; run the migration first")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("genesis has no version field")]
    MissingVersion,

    #[error("bank genesis: {0}")]
    Bank(#[from] BankError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error(transparent)]
    Orders(#[from] OrderError),

    #[error(transparent)]
    Anchor(#[from] AnchorError),
}

impl GenesisError {
    pub fn code(&self) -> u32 {
        match self {
            GenesisError::Json(_) => 601,
            GenesisError::UnsupportedVersion { .. } => 602,
            GenesisError::MissingVersion => 603,
            GenesisError::Bank(_) => 604,
            GenesisError::Escrow(e) => e.code(),
            GenesisError::Orders(e) => e.code(),
            GenesisError::Anchor(e) => e.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub version: u64,
    #[serde(default)]
    pub genesis_time: Timestamp,
    #[serde(default)]
    pub bank: BankGenesis,
    pub escrow: EscrowGenesis,
    pub orders: OrdersGenesis,
    pub anchor: AnchorGenesis,
}

impl GenesisState {
    /// Empty state carrying the configured params.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            version: GENESIS_VERSION,
            genesis_time: 0,
            bank: BankGenesis::default(),
            escrow: EscrowGenesis::empty(&config.enterprise.denom),
            orders: OrdersGenesis::new(config.enterprise.clone()),
            anchor: AnchorGenesis::new(config.anchor.clone()),
        }
    }

    /// The escrow denomination follows the enterprise params.
    pub fn denom(&self) -> &str {
        &self.orders.params.denom
    }

    /// Parse a snapshot written by this build. Older layouts are refused
    /// with [`GenesisError::UnsupportedVersion`].
    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        let value: Value = serde_json::from_str(json)?;
        let found = read_version(&value)?;
        if found != GENESIS_VERSION {
            return Err(GenesisError::UnsupportedVersion {
                found,
                supported: GENESIS_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Stateless checks of every module section.
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.version != GENESIS_VERSION {
            return Err(GenesisError::UnsupportedVersion {
                found: self.version,
                supported: GENESIS_VERSION,
            });
        }
        self.orders.validate()?;
        self.escrow.validate(self.denom())?;
        self.anchor.validate()?;
        Ok(())
    }
}

pub(crate) fn read_version(value: &Value) -> Result<u64, GenesisError> {
    value
        .get("version")
        .and_then(Value::as_u64)
        .ok_or(GenesisError::MissingVersion)
}
