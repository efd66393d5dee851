use primitive_types::U256;
use shared_types::{BankError, CodecError, CoinError};
use thiserror::Error;

/// Escrow ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscrowError {
    #[error("incorrect denomination: expected {expected}, got {actual}")]
    InvalidDenom { expected: String, actual: String },

    #[error("invalid escrow genesis: {0}")]
    InvalidGenesis(String),

    /// Aggregate, per-account sum and module balance disagree. Chain-halting.
    #[error(
        "escrow invariant broken: total locked {total_locked}, sum of accounts {sum_locked}, \
         module balance {module_balance}"
    )]
    InvariantBroken {
        total_locked: U256,
        sum_locked: U256,
        module_balance: U256,
    },

    #[error("bank: {0}")]
    Bank(#[from] BankError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Coin(#[from] CoinError),
}

impl EscrowError {
    pub fn code(&self) -> u32 {
        match self {
            EscrowError::InvalidDenom { .. } => 101,
            EscrowError::InvalidGenesis(_) => 102,
            EscrowError::InvariantBroken { .. } => 103,
            EscrowError::Bank(_) => 104,
            EscrowError::Codec(_) => 105,
            EscrowError::Coin(_) => 106,
        }
    }

    /// True for errors that must halt block processing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EscrowError::InvariantBroken { .. })
    }
}
