//! # Purchase Order Flows
//!
//! Raise, decide, tally and complete across blocks.

#[cfg(test)]
mod tests {
    use ledger_runtime::LedgerApp;
    use shared_types::{Address, PurchaseOrderStatus, U256};

    use crate::harness::LedgerHarness;

    use PurchaseOrderStatus::{Accepted, Completed, Raised, Rejected};

    fn purchaser(i: u8) -> Address {
        Address::new([0xB0 + i; 20])
    }

    // =========================================================================
    // TALLY
    // =========================================================================

    #[test]
    fn test_quorum_accepts_regardless_of_other_pending_orders() {
        let mut h = LedgerHarness::new();
        for i in 0..3 {
            h.whitelist(purchaser(i));
        }
        let first = h.raise(purchaser(0), 10).unwrap();
        let target = h.raise(purchaser(1), 20).unwrap();
        let last = h.raise(purchaser(2), 30).unwrap();

        // decisions arrive out of order across the three orders
        let (s0, s1, s2) = (h.signer(0), h.signer(1), h.signer(2));
        h.decide(last, s2, Accepted).unwrap();
        h.decide(target, s1, Accepted).unwrap();
        h.decide(first, s0, Rejected).unwrap();
        h.decide(target, s2, Accepted).unwrap();

        let report = h.next_block();
        assert_eq!(report.tally.accepted, vec![target]);
        assert_eq!(report.tally.pending, vec![first, last]);
        assert!(report.tally.rejected.is_empty());

        assert_eq!(h.order(target).status, Completed);
        assert_eq!(h.order(first).status, Raised);
        assert_eq!(h.locked(purchaser(1)), U256::from(20u64));
        assert!(h.locked(purchaser(0)).is_zero());
    }

    #[test]
    fn test_stale_order_rejected_without_decisions() {
        let mut h = LedgerHarness::new();
        h.whitelist(purchaser(0));
        let raised_at = h.now();
        let id = h.raise(purchaser(0), 50).unwrap();
        let limit = h.app.config().enterprise.decision_time_limit;

        // one second short of the limit: still pending
        let report = h.end_and_advance(limit - 1);
        assert_eq!(report.tally.pending, vec![id]);
        assert_eq!(h.now(), raised_at + limit - 1);

        let report = h.end_and_advance(1);
        assert_eq!(report.tally.pending, vec![id]);
        assert_eq!(h.now(), raised_at + limit);

        let report = h.next_block();
        assert_eq!(report.tally.expired, vec![id]);
        assert_eq!(h.order(id).status, Rejected);
        assert!(h.locked(purchaser(0)).is_zero());
    }

    #[test]
    fn test_veto_rejects_when_quorum_unreachable() {
        let mut h = LedgerHarness::new();
        h.whitelist(purchaser(0));
        let id = h.raise(purchaser(0), 50).unwrap();
        let (s0, s1) = (h.signer(0), h.signer(1));
        h.decide(id, s0, Rejected).unwrap();
        h.decide(id, s1, Rejected).unwrap();

        let report = h.next_block();
        assert_eq!(report.tally.rejected, vec![id]);
        assert_eq!(h.order(id).status, Rejected);
    }

    // =========================================================================
    // ADMISSION OF ORDER MESSAGES
    // =========================================================================

    #[test]
    fn test_raise_requires_whitelist() {
        let mut h = LedgerHarness::new();
        let err = h.raise(purchaser(0), 10).unwrap_err();
        assert_eq!(err.code(), 206);
    }

    #[test]
    fn test_decision_rules() {
        let mut h = LedgerHarness::new();
        h.whitelist(purchaser(0));
        let id = h.raise(purchaser(0), 10).unwrap();
        let s0 = h.signer(0);

        let outsider = Address::new([0x99; 20]);
        assert_eq!(h.decide(id, outsider, Accepted).unwrap_err().code(), 205);
        assert_eq!(h.decide(id + 40, s0, Accepted).unwrap_err().code(), 201);
        // rejected by stateless admission checks
        assert_eq!(h.decide(id, s0, Raised).unwrap_err().code(), 408);

        h.decide(id, s0, Accepted).unwrap();
        assert_eq!(h.decide(id, s0, Accepted).unwrap_err().code(), 203);
    }

    #[test]
    fn test_completed_order_cannot_be_decided_again() {
        let mut h = LedgerHarness::new();
        let id = h.fund_locked(purchaser(0), 10);
        let s2 = h.signer(2);
        assert_eq!(h.decide(id, s2, Accepted).unwrap_err().code(), 202);
        assert_eq!(h.order(id).status, Completed);
    }

    #[test]
    fn test_quorum_change_applies_to_pending_orders() {
        let mut h = LedgerHarness::new();
        h.whitelist(purchaser(0));
        let id = h.raise(purchaser(0), 10).unwrap();
        let s0 = h.signer(0);
        h.decide(id, s0, Accepted).unwrap();

        let authority = h.app.config().authority;
        let mut params = h.app.config().enterprise.clone();
        params.min_accepts = 1;
        update(&mut h.app, &authority, params);

        let report = h.next_block();
        assert_eq!(report.tally.accepted, vec![id]);
        assert_eq!(h.locked(purchaser(0)), U256::from(10u64));
    }

    fn update(app: &mut LedgerApp, authority: &Address, params: lm_02_purchase_orders::EnterpriseParams) {
        app.update_enterprise_params(authority, params).unwrap();
    }
}
