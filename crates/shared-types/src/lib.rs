//! # Shared Types Crate
//!
//! Foundation shared by every ledger module: identities, coins, the ordered
//! store, the execution context, the bank port and the message set.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: messages and cross-module types live here.
//! - **Deterministic Iteration**: every collection is read through an
//!   ordered [`KvStore`] scan; nothing iterates a hash map.
//! - **Branch, Then Commit**: mutations that must be all-or-nothing run
//!   inside [`Context::run_atomic`].

pub mod bank;
pub mod codec;
pub mod coins;
pub mod context;
pub mod entities;
pub mod msgs;
pub mod store;

pub use bank::{Balance, BankError, BankGenesis, BankKeeper, StoreBank, FEE_COLLECTOR};
pub use codec::CodecError;
pub use coins::{validate_denom, Coin, CoinError, Coins};
pub use context::{Context, Event, ExecMode};
pub use entities::*;
pub use msgs::*;
pub use store::{BatchOperation, CacheStore, KvStore, MemStore, ScanResult};
