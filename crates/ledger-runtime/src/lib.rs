//! # Ledger Runtime Library
//!
//! Wires the ledger modules into one application and exposes it for the
//! `ledger-runtime` binary and for integration tests.
//!
//! ## Layout
//!
//! - `container/` - [`LedgerApp`] and its configuration
//! - `handlers/` - message routing into the module keepers
//! - `genesis/` - versioned snapshots and layout migrations
//! - `errors` - runtime error taxonomy and codes
//!
//! ## Transaction Flow
//!
//! ```text
//! Tx ─► ValidateBasic ─► CorrectAnchorFee ─► CheckLockedFunds ─► DeductFee ─► IncrementSequence
//!                                                                                   │
//!                                    committed even if a message fails ◄────────────┘
//!                                                   │
//!                                                   ▼
//!                                  route_all (all messages or none)
//! ```

pub mod container;
pub mod errors;
pub mod genesis;
pub mod handlers;

pub use container::{EndBlockReport, LedgerApp, LedgerConfig, TxReceipt};
pub use errors::RuntimeError;
pub use genesis::{GenesisError, GenesisState, MigrationError, MigrationPipeline, GENESIS_VERSION};
pub use handlers::{Keepers, MsgResponse};
