//! # Integration Flows
//!
//! Whole-ledger scenarios driven through [`LedgerApp`](ledger_runtime::LedgerApp):
//! admission, delivery and the end-block passes together.

pub mod anchor_flows;
pub mod escrow_flows;
pub mod fee_flows;
pub mod genesis_flows;
pub mod order_flows;
pub mod properties;
