use lm_01_escrow_ledger::EscrowError;
use lm_03_anchor_storage::AnchorError;
use shared_types::{Address, BankError, CodecError, Coin, Coins, MsgError};
use thiserror::Error;

/// Admission errors. All of them reject the transaction before any write
/// is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnteError {
    #[error("insufficient fee for anchor tx: expected {expected}, got {got}")]
    InsufficientFee { expected: Coin, got: Coin },

    #[error("too much fee for anchor tx: expected {expected}, got {got}")]
    TooMuchFee { expected: Coin, got: Coin },

    #[error("incorrect fee denomination: expected {expected}, got {got}")]
    IncorrectFeeDenomination { expected: String, got: String },

    #[error("insufficient funds: {payer} has {available} including locked, fee is {required}")]
    InsufficientFunds {
        payer: Address,
        available: Coins,
        required: Coins,
    },

    #[error("fee payer {payer} is not the owner {owner} named in the message")]
    FeePayerNotOwner { payer: Address, owner: Address },

    #[error("chain {chain_id}: {requested} slots requested, at most {max_purchasable} purchasable")]
    ExceedsMaxStorage {
        chain_id: u64,
        requested: u64,
        max_purchasable: u64,
    },

    #[error("chain {0} does not exist")]
    ChainDoesNotExist(u64),

    #[error("invalid tx: {0}")]
    InvalidTx(#[from] MsgError),

    #[error("failed to unlock escrowed funds: {0}")]
    Escrow(#[from] EscrowError),

    #[error(transparent)]
    Anchor(AnchorError),

    #[error("bank: {0}")]
    Bank(BankError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<AnchorError> for AnteError {
    fn from(err: AnchorError) -> Self {
        match err {
            AnchorError::ChainDoesNotExist(id) => AnteError::ChainDoesNotExist(id),
            other => AnteError::Anchor(other),
        }
    }
}

impl From<BankError> for AnteError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::InsufficientFunds {
                address,
                available,
                needed,
            } => AnteError::InsufficientFunds {
                payer: address,
                available,
                required: needed,
            },
            other => AnteError::Bank(other),
        }
    }
}

impl AnteError {
    pub fn code(&self) -> u32 {
        match self {
            AnteError::InsufficientFee { .. } => 401,
            AnteError::TooMuchFee { .. } => 402,
            AnteError::IncorrectFeeDenomination { .. } => 403,
            AnteError::InsufficientFunds { .. } => 404,
            AnteError::FeePayerNotOwner { .. } => 405,
            AnteError::ExceedsMaxStorage { .. } => 406,
            AnteError::ChainDoesNotExist(_) => 407,
            AnteError::InvalidTx(_) => 408,
            AnteError::Escrow(e) => e.code(),
            AnteError::Anchor(e) => e.code(),
            AnteError::Bank(_) => 409,
            AnteError::Codec(_) => 410,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AnteError::Escrow(e) if e.is_fatal())
    }
}
