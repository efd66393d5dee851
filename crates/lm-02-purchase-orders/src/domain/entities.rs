//! Purchase order records and query filters.

use serde::{Deserialize, Serialize};
use shared_types::{page_window, Address, Coin, Timestamp};

pub use shared_types::{PurchaseOrderStatus, MAX_PAGE_LIMIT};

/// One signer's vote on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub signer: Address,
    pub decision: PurchaseOrderStatus,
    pub decision_time: Timestamp,
}

/// A request to mint escrowed funds.
///
/// `completion_time` is zero while the order is `Raised` and set once the
/// tally moves it on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: u64,
    pub purchaser: Address,
    pub amount: Coin,
    pub status: PurchaseOrderStatus,
    pub raise_time: Timestamp,
    pub completion_time: Timestamp,
    pub decisions: Vec<Decision>,
}

impl PurchaseOrder {
    pub fn new(id: u64, purchaser: Address, amount: Coin, raise_time: Timestamp) -> Self {
        Self {
            id,
            purchaser,
            amount,
            status: PurchaseOrderStatus::Raised,
            raise_time,
            completion_time: 0,
            decisions: Vec::new(),
        }
    }

    pub fn has_decided(&self, signer: &Address) -> bool {
        self.decisions.iter().any(|d| &d.signer == signer)
    }

    /// `(accepts, rejects)`.
    pub fn decision_counts(&self) -> (u64, u64) {
        self.decisions
            .iter()
            .fold((0, 0), |(acc, rej), d| match d.decision {
                PurchaseOrderStatus::Accepted => (acc + 1, rej),
                PurchaseOrderStatus::Rejected => (acc, rej + 1),
                _ => (acc, rej),
            })
    }
}

/// Filter for `orders` queries. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub purchaser: Option<Address>,
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            purchaser: None,
            page: 1,
            limit: MAX_PAGE_LIMIT,
        }
    }
}

impl OrderFilter {
    pub fn matches(&self, order: &PurchaseOrder) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.purchaser.map_or(true, |p| order.purchaser == p)
    }

    /// `(skip, take)` after clamping page and limit.
    pub fn window(&self) -> (usize, usize) {
        page_window(self.page, self.limit)
    }
}

/// What one tally pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallySummary {
    pub accepted: Vec<u64>,
    pub rejected: Vec<u64>,
    pub expired: Vec<u64>,
    pub pending: Vec<u64>,
}
