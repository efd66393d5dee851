//! # Anchor Flows
//!
//! Chain registration, block recording with in-state pruning and storage
//! purchases up to the configured maximum.

#[cfg(test)]
mod tests {
    use ledger_runtime::LedgerConfig;
    use shared_types::Address;

    use crate::harness::LedgerHarness;

    fn owner() -> Address {
        Address::new([0xCC; 20])
    }

    fn registered(config: LedgerConfig, budget: u64) -> (LedgerHarness, u64) {
        let mut h = LedgerHarness::with_config(config, Vec::new());
        h.fund_locked(owner(), budget);
        let chain_id = h.register(owner(), "anchored").unwrap();
        (h, chain_id)
    }

    #[test]
    fn test_heights_strictly_increase() {
        let (mut h, chain_id) = registered(LedgerConfig::for_testing(), 2_000);
        h.record(owner(), chain_id, 5).unwrap();

        assert_eq!(h.record(owner(), chain_id, 5).unwrap_err().code(), 303);
        assert_eq!(h.record(owner(), chain_id, 4).unwrap_err().code(), 303);
        h.record(owner(), chain_id, 6).unwrap();
        assert_eq!(h.block_heights(chain_id), vec![5, 6]);
    }

    #[test]
    fn test_oldest_records_pruned_past_limit() {
        let (mut h, chain_id) = registered(LedgerConfig::for_testing(), 2_000);
        let limit = h.in_state_limit(chain_id);
        for height in 1..=limit + 2 {
            h.record(owner(), chain_id, height * 10).unwrap();
        }
        let heights = h.block_heights(chain_id);
        assert_eq!(heights.len() as u64, limit);
        assert_eq!(heights.first(), Some(&30));

        let chain = h
            .app
            .query(|ctx, k| k.anchor.get_chain(ctx, chain_id).unwrap())
            .unwrap();
        assert_eq!(chain.last_height, (limit + 2) * 10);
        assert_eq!(chain.lowest_height_in_state, 30);
        assert_eq!(chain.num_blocks_in_state, limit);
        h.app.assert_invariants().unwrap();
    }

    #[test]
    fn test_purchase_boundary_at_max_storage() {
        let mut config = LedgerConfig::for_testing();
        config.anchor.default_storage_limit = 290;
        config.anchor.max_storage_limit = 300;
        config.anchor.fee_purchase_storage = 1;
        let (mut h, chain_id) = registered(config, 2_000);
        assert_eq!(h.in_state_limit(chain_id), 290);

        let err = h
            .deliver(vec![LedgerHarness::purchase_msg(owner(), chain_id, 11)], 11)
            .unwrap_err();
        assert_eq!(err.code(), 406);
        assert_eq!(h.in_state_limit(chain_id), 290);

        h.deliver(vec![LedgerHarness::purchase_msg(owner(), chain_id, 10)], 10)
            .unwrap();
        assert_eq!(h.in_state_limit(chain_id), 300);

        let err = h
            .deliver(vec![LedgerHarness::purchase_msg(owner(), chain_id, 1)], 1)
            .unwrap_err();
        assert_eq!(err.code(), 406);
    }

    #[test]
    fn test_purchased_slots_keep_more_records() {
        let (mut h, chain_id) = registered(LedgerConfig::for_testing(), 2_000);
        let fee = h.app.config().anchor.fee_purchase_storage * 2;
        h.deliver(vec![LedgerHarness::purchase_msg(owner(), chain_id, 2)], fee)
            .unwrap();
        for height in 1..=5 {
            h.record(owner(), chain_id, height).unwrap();
        }
        assert_eq!(h.block_heights(chain_id), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_registration_and_ownership_errors() {
        let (mut h, chain_id) = registered(LedgerConfig::for_testing(), 3_000);
        assert_eq!(h.register(owner(), "anchored").unwrap_err().code(), 301);

        let intruder = Address::new([0xDD; 20]);
        h.fund_locked(intruder, 100);
        assert_eq!(h.record(intruder, chain_id, 1).unwrap_err().code(), 304);
        assert_eq!(h.record(owner(), chain_id + 1, 1).unwrap_err().code(), 302);
    }

    #[test]
    fn test_chain_queries() {
        let (mut h, chain_id) = registered(LedgerConfig::for_testing(), 3_000);
        let by_moniker = h
            .app
            .query(|ctx, k| k.anchor.chain_by_moniker(ctx, "anchored").unwrap())
            .unwrap();
        assert_eq!(by_moniker.id, chain_id);
        assert_eq!(by_moniker.owner, owner());
        assert_eq!(by_moniker.base_type, "geth");
    }
}
