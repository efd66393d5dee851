//! # Anchor Storage (lm-03)
//!
//! Registry of external chains whose block hashes are anchored on this
//! ledger, with a per-chain cap on how many records stay in state.
//!
//! ## Records
//!
//! | Record | Owner of change |
//! |--------|-----------------|
//! | `AnchoredChain` | register, record (cursor and counters), prune |
//! | `AnchorRecord` | record (append only), prune (delete oldest) |
//! | `StorageCapacity` | register (default limit), purchase |
//!
//! ## Rules
//!
//! - Monikers are unique and the owner never changes.
//! - Heights strictly increase per chain; a height at or below
//!   `last_height` is never overwritten.
//! - `in_state_limit <= max_storage_limit`. When a record pushes the
//!   in-state count over the limit, the oldest records are deleted.
//!   `last_height` is kept.

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod ports;
pub mod service;

pub use domain::{
    AnchorError, AnchorParams, AnchorRecord, AnchoredChain, BlockFilter, ChainFilter,
    RecordOutcome, StorageCapacity, MAX_PAGE_LIMIT,
};
pub use genesis::{AnchorGenesis, ChainExport};
pub use ports::AnchorQuery;
pub use service::{
    AnchorStorageManager, DEFAULT_STARTING_CHAIN_ID, EVENT_PURCHASE_STORAGE, EVENT_RECORD,
    EVENT_REGISTER,
};
