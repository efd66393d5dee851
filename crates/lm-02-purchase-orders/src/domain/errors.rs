use lm_01_escrow_ledger::EscrowError;
use shared_types::{Address, CodecError, MsgError, PurchaseOrderStatus};
use thiserror::Error;

/// Purchase order errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("purchase order {0} does not exist")]
    OrderDoesNotExist(u64),

    #[error("purchase order {id} already processed: {status}")]
    OrderAlreadyProcessed { id: u64, status: PurchaseOrderStatus },

    #[error("signer {signer} already decided on purchase order {id}")]
    SignerAlreadyDecided { id: u64, signer: Address },

    #[error("invalid decision: must be accept or reject")]
    InvalidDecision,

    #[error("{0} is not an authorized signer")]
    UnauthorizedSigner(Address),

    #[error("{0} is not whitelisted to raise purchase orders")]
    NotWhitelisted(Address),

    #[error("{0} is already whitelisted")]
    AlreadyWhitelisted(Address),

    #[error("invalid whitelist action: must be add or remove")]
    InvalidWhitelistAction,

    #[error("incorrect denomination: expected {expected}, got {actual}")]
    InvalidDenom { expected: String, actual: String },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("{0} is not the params authority")]
    Unauthorized(Address),

    #[error("invalid purchase order genesis: {0}")]
    InvalidGenesis(String),

    #[error("purchase order ids exhausted at {0}")]
    IdsExhausted(u64),

    /// Internal inconsistency found by an end-block pass. Chain-halting.
    #[error("purchase order state corrupted: {0}")]
    Fatal(String),

    #[error(transparent)]
    Msg(#[from] MsgError),

    #[error(transparent)]
    Escrow(#[from] EscrowError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl OrderError {
    /// Lift a message validation failure, keeping the decision and
    /// whitelist-action kinds distinct.
    pub fn from_msg(err: MsgError) -> Self {
        match err {
            MsgError::InvalidDecision => OrderError::InvalidDecision,
            MsgError::InvalidWhitelistAction => OrderError::InvalidWhitelistAction,
            other => OrderError::Msg(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            OrderError::OrderDoesNotExist(_) => 201,
            OrderError::OrderAlreadyProcessed { .. } => 202,
            OrderError::SignerAlreadyDecided { .. } => 203,
            OrderError::InvalidDecision => 204,
            OrderError::UnauthorizedSigner(_) => 205,
            OrderError::NotWhitelisted(_) => 206,
            OrderError::AlreadyWhitelisted(_) => 207,
            OrderError::InvalidWhitelistAction => 208,
            OrderError::InvalidDenom { .. } => 209,
            OrderError::InvalidParams(_) => 210,
            OrderError::Unauthorized(_) => 211,
            OrderError::InvalidGenesis(_) => 212,
            OrderError::Fatal(_) => 213,
            OrderError::Msg(_) => 214,
            OrderError::Escrow(e) => e.code(),
            OrderError::Codec(_) => 215,
            OrderError::IdsExhausted(_) => 216,
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            OrderError::Fatal(_) => true,
            OrderError::Escrow(e) => e.is_fatal(),
            _ => false,
        }
    }
}
