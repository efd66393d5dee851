use shared_types::{Address, CodecError, MsgError};
use thiserror::Error;

/// Anchor storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("chain with moniker {0} is already registered")]
    ChainAlreadyRegistered(String),

    #[error("chain {0} does not exist")]
    ChainDoesNotExist(u64),

    #[error("chain {chain_id} block {height} already recorded (last height {last_height})")]
    BlockAlreadyRecorded {
        chain_id: u64,
        height: u64,
        last_height: u64,
    },

    #[error("{caller} is not the owner of chain {chain_id}")]
    NotOwner { chain_id: u64, caller: Address },

    #[error("chain {chain_id}: {requested} slots requested, at most {max_purchasable} purchasable")]
    ExceedsMaxStorage {
        chain_id: u64,
        requested: u64,
        max_purchasable: u64,
    },

    #[error("missing data: {0}")]
    MissingData(String),

    #[error("content too large: {field} is {len} chars, max {max}")]
    ContentTooLarge { field: String, len: usize, max: usize },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("{0} is not the params authority")]
    Unauthorized(Address),

    #[error("invalid anchor genesis: {0}")]
    InvalidGenesis(String),

    #[error("chain ids exhausted at {0}")]
    IdsExhausted(u64),

    #[error(transparent)]
    Msg(MsgError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<MsgError> for AnchorError {
    fn from(err: MsgError) -> Self {
        match err {
            MsgError::MissingData(what) => AnchorError::MissingData(what),
            MsgError::ContentTooLarge { field, len, max } => {
                AnchorError::ContentTooLarge { field, len, max }
            }
            other => AnchorError::Msg(other),
        }
    }
}

impl AnchorError {
    pub fn code(&self) -> u32 {
        match self {
            AnchorError::ChainAlreadyRegistered(_) => 301,
            AnchorError::ChainDoesNotExist(_) => 302,
            AnchorError::BlockAlreadyRecorded { .. } => 303,
            AnchorError::NotOwner { .. } => 304,
            AnchorError::ExceedsMaxStorage { .. } => 305,
            AnchorError::MissingData(_) => 306,
            AnchorError::ContentTooLarge { .. } => 307,
            AnchorError::InvalidParams(_) => 308,
            AnchorError::Unauthorized(_) => 309,
            AnchorError::InvalidGenesis(_) => 310,
            AnchorError::Msg(_) => 311,
            AnchorError::Codec(_) => 312,
            AnchorError::IdsExhausted(_) => 313,
        }
    }
}
