//! Runtime error taxonomy.

use lm_01_escrow_ledger::EscrowError;
use lm_02_purchase_orders::OrderError;
use lm_03_anchor_storage::AnchorError;
use lm_04_fee_validation::AnteError;
use shared_types::BlockInfo;
use thiserror::Error;

use crate::genesis::GenesisError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A fatal error stopped block processing earlier.
    #[error("ledger halted: {0}")]
    Halted(String),

    #[error("block {next:?} does not follow {current:?}")]
    InvalidBlock { current: BlockInfo, next: BlockInfo },

    #[error("invalid config: {0}")]
    Config(String),

    /// Stored counters disagree with stored records. Chain-halting.
    #[error("state invariant broken: {0}")]
    Invariant(String),

    #[error(transparent)]
    Ante(#[from] AnteError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error(transparent)]
    Orders(#[from] OrderError),

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error(transparent)]
    Genesis(#[from] GenesisError),
}

impl RuntimeError {
    /// Numeric code surfaced to the submitter. Module failures keep the
    /// code of the module that raised them.
    pub fn code(&self) -> u32 {
        match self {
            RuntimeError::Halted(_) => 501,
            RuntimeError::InvalidBlock { .. } => 502,
            RuntimeError::Config(_) => 503,
            RuntimeError::Invariant(_) => 504,
            RuntimeError::Ante(e) => e.code(),
            RuntimeError::Escrow(e) => e.code(),
            RuntimeError::Orders(e) => e.code(),
            RuntimeError::Anchor(e) => e.code(),
            RuntimeError::Genesis(e) => e.code(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            RuntimeError::Invariant(_) => true,
            RuntimeError::Ante(e) => e.is_fatal(),
            RuntimeError::Escrow(e) => e.is_fatal(),
            RuntimeError::Orders(e) => e.is_fatal(),
            _ => false,
        }
    }
}
