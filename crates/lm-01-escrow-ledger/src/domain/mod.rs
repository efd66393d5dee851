//! Domain layer: records, keys and errors of the escrow ledger.

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::*;
pub use errors::*;
