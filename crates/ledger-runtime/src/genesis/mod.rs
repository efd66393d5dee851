//! # Genesis
//!
//! Versioned state snapshots and the migrations between their layouts.

pub mod migrate;
pub mod state;

pub use migrate::{MigrationError, MigrationPipeline, MigrationStep};
pub use state::{GenesisError, GenesisState, GENESIS_VERSION};
