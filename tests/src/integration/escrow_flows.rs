//! # Escrow Flows
//!
//! Locked funds paying anchor fees through the admission chain, including
//! the release-everything policy when locked funds only partly cover a fee.

#[cfg(test)]
mod tests {
    use ledger_runtime::LedgerConfig;
    use shared_types::{Address, U256};

    use crate::harness::LedgerHarness;

    fn owner() -> Address {
        Address::new([0xE1; 20])
    }

    /// Record fee set to `record_fee`; owner starts with `spendable` in the
    /// bank and, after registering, exactly 100 locked.
    fn with_locked_100(record_fee: u64, spendable: u64) -> (LedgerHarness, u64) {
        let mut config = LedgerConfig::for_testing();
        config.anchor.fee_record = record_fee;
        let balances = if spendable > 0 { vec![(owner(), spendable)] } else { Vec::new() };
        let mut h = LedgerHarness::with_config(config, balances);

        let fee_register = h.app.config().anchor.fee_register;
        h.fund_locked(owner(), fee_register + 100);
        let chain_id = h.register(owner(), "escrowed").unwrap();
        assert_eq!(h.locked(owner()), U256::from(100u64));
        assert_eq!(h.spendable(owner()), U256::from(spendable));
        (h, chain_id)
    }

    #[test]
    fn test_fee_covered_by_locked_unlocks_exactly_the_fee() {
        let (mut h, chain_id) = with_locked_100(60, 0);
        h.record(owner(), chain_id, 1).unwrap();
        assert_eq!(h.locked(owner()), U256::from(40u64));
        assert!(h.spendable(owner()).is_zero());
        h.app.assert_invariants().unwrap();
    }

    #[test]
    fn test_insufficient_funds_leaves_locked_untouched() {
        let (mut h, chain_id) = with_locked_100(150, 0);
        let err = h.record(owner(), chain_id, 1).unwrap_err();
        assert_eq!(err.code(), 404);
        assert_eq!(h.locked(owner()), U256::from(100u64));
        assert!(h.block_heights(chain_id).is_empty());
    }

    #[test]
    fn test_partial_cover_releases_entire_locked_balance() {
        let (mut h, chain_id) = with_locked_100(150, 60);
        h.record(owner(), chain_id, 1).unwrap();
        assert!(h.locked(owner()).is_zero());
        // 60 spendable + 100 released - 150 fee
        assert_eq!(h.spendable(owner()), U256::from(10u64));
        h.app.assert_invariants().unwrap();
    }

    #[test]
    fn test_spent_tally_and_user_account() {
        let (mut h, chain_id) = with_locked_100(60, 0);
        h.record(owner(), chain_id, 1).unwrap();
        let fee_register = h.app.config().anchor.fee_register;

        let account = h
            .app
            .query(|ctx, k| k.escrow.enterprise_user_account(ctx, &owner()).unwrap());
        assert_eq!(account.locked.amount, U256::from(40u64));
        assert_eq!(account.spent.amount, U256::from(fee_register + 60));
        assert_eq!(account.available.amount, U256::from(40u64));

        let (supply, spendable_supply) = h.app.query(|ctx, k| {
            (
                k.escrow.total_supply_with_locked(ctx).unwrap().amount,
                k.escrow.total_spendable_supply(ctx).unwrap().amount,
            )
        });
        // everything minted is either still locked or sitting with the fee collector
        assert_eq!(supply, U256::from(fee_register + 100));
        assert_eq!(spendable_supply, U256::from(fee_register + 60));
    }

    #[test]
    fn test_non_anchor_tx_never_touches_escrow() {
        let (mut h, _) = with_locked_100(60, 0);
        let other = Address::new([0xE2; 20]);
        h.whitelist(other);
        assert_eq!(h.locked(owner()), U256::from(100u64));
    }
}
