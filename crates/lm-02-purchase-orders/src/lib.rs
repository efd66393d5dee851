//! # Purchase Orders (lm-02)
//!
//! Whitelisted purchasers raise requests for new locked funds. A fixed set
//! of authorized signers votes on each request; at the end of every block
//! the tally decides it, and accepted orders are minted into escrow.
//!
//! ## Lifecycle
//!
//! ```text
//!   MsgRaisePurchaseOrder ──▶ Raised
//!   MsgProcessPurchaseOrder ──▶ decision appended (one per signer)
//!
//!   end_block:
//!     tally pass     Raised ──▶ Accepted | Rejected | (unchanged)
//!     accept pass    Accepted ──▶ Completed   (escrow.mint_and_lock)
//! ```
//!
//! ## Tally Rule
//!
//! | Order | Condition | Outcome |
//! |-------|-----------|---------|
//! | 1 | expired and `accepts < min_accepts` | Rejected |
//! | 2 | `rejects > signers - min_accepts` | Rejected |
//! | 3 | `accepts >= min_accepts` | Accepted |
//!
//! Orders that match none of these stay `Raised` for the next block.

pub mod domain;
pub mod genesis;
pub mod handler;
pub mod service;

pub use domain::{
    evaluate, Decision, EnterpriseParams, OrderError, OrderFilter, PurchaseOrder, TallySummary,
    TallyVerdict, MAX_PAGE_LIMIT,
};
pub use genesis::OrdersGenesis;
pub use handler::RaiseOrderResponse;
pub use service::{
    PurchaseOrderTally, DEFAULT_STARTING_ORDER_ID, EVENT_AUTO_REJECT, EVENT_COMPLETE,
    EVENT_DECISION, EVENT_RAISE, EVENT_TALLY, EVENT_WHITELIST,
};
