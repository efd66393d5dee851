//! # Ledger Container
//!
//! The configured application: store, keepers and block lifecycle.

pub mod app;
pub mod config;

pub use app::{EndBlockReport, LedgerApp, TxReceipt};
pub use config::{LedgerConfig, DEFAULT_AUTHORITY_MODULE};
