//! The tally rule, kept free of storage so it can be checked in isolation.
//!
//! Checks run in this order and the first match wins:
//!
//! 1. **Expiry**: `now - raise_time >= decision_time_limit` and
//!    `accepts < min_accepts`.
//! 2. **Veto**: `rejects > signers - min_accepts`.
//! 3. **Quorum**: `accepts >= min_accepts`.

use shared_types::Timestamp;

use super::entities::PurchaseOrder;
use super::params::EnterpriseParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyVerdict {
    Expired,
    Rejected,
    Accepted,
    Pending,
}

pub fn evaluate(order: &PurchaseOrder, now: Timestamp, params: &EnterpriseParams) -> TallyVerdict {
    let (accepts, rejects) = order.decision_counts();
    let age = now.saturating_sub(order.raise_time);

    if age >= params.decision_time_limit && accepts < params.min_accepts {
        TallyVerdict::Expired
    } else if rejects > params.reject_threshold() {
        TallyVerdict::Rejected
    } else if accepts >= params.min_accepts {
        TallyVerdict::Accepted
    } else {
        TallyVerdict::Pending
    }
}
