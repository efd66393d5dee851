//! # Enterprise Ledger Test Suite
//!
//! Cross-crate flows driven through the full ledger application.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # LedgerHarness: blocks, funding, message builders
//! └── integration/      # Whole-ledger scenarios
//!     ├── anchor_flows.rs
//!     ├── escrow_flows.rs
//!     ├── fee_flows.rs
//!     ├── genesis_flows.rs
//!     ├── order_flows.rs
//!     └── properties.rs # seeded random workloads
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lm-tests
//! cargo test -p lm-tests integration::properties
//!
//! # Benchmarks
//! cargo bench -p lm-tests
//! ```

pub mod harness;
pub mod integration;

pub use harness::LedgerHarness;
