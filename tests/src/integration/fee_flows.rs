//! # Fee Admission Flows
//!
//! Anchor transactions against the standard admission chain: exact-fee
//! pricing on admission, payer ownership, denomination checks and the
//! fee staying paid when a message fails.

#[cfg(test)]
mod tests {
    use shared_types::{Address, Coin, Coins, Tx, U256};

    use crate::harness::LedgerHarness;

    fn owner() -> Address {
        Address::new([0x0A; 20])
    }

    /// Owner with a registered chain and `extra` locked beyond the
    /// registration fee.
    fn setup(extra: u64) -> (LedgerHarness, u64) {
        let mut h = LedgerHarness::new();
        let fee_register = h.app.config().anchor.fee_register;
        h.fund_locked(owner(), fee_register + extra);
        let chain_id = h.register(owner(), "alpha").unwrap();
        (h, chain_id)
    }

    // =========================================================================
    // EXACT FEE
    // =========================================================================

    #[test]
    fn test_record_fee_must_match_schedule_on_admission() {
        let (mut h, chain_id) = setup(100);
        let fee = h.app.config().anchor.fee_record;
        let msg = || LedgerHarness::record_msg(owner(), chain_id, 1);

        let err = h.check(vec![msg()], fee - 1).unwrap_err();
        assert_eq!(err.code(), 401);
        let err = h.check(vec![msg()], fee + 1).unwrap_err();
        assert_eq!(err.code(), 402);
        h.check(vec![msg()], fee).unwrap();

        // admission kept nothing
        assert_eq!(h.locked(owner()), U256::from(100u64));
        h.deliver(vec![msg()], fee).unwrap();
        assert_eq!(h.locked(owner()), U256::from(100 - fee));
    }

    #[test]
    fn test_multi_message_fee_is_summed() {
        let (mut h, chain_id) = setup(100);
        let params = h.app.config().anchor.clone();
        let msgs = vec![
            LedgerHarness::record_msg(owner(), chain_id, 1),
            LedgerHarness::record_msg(owner(), chain_id, 2),
            LedgerHarness::purchase_msg(owner(), chain_id, 2),
        ];
        let expected = 2 * params.fee_record + 2 * params.fee_purchase_storage;
        assert_eq!(h.check(msgs.clone(), expected - 1).unwrap_err().code(), 401);
        h.check(msgs.clone(), expected).unwrap();
        h.deliver(msgs, expected).unwrap();
        assert_eq!(h.block_heights(chain_id), vec![1, 2]);
    }

    #[test]
    fn test_wrong_fee_denomination() {
        let (mut h, chain_id) = setup(100);
        let tx = Tx::new(
            vec![LedgerHarness::record_msg(owner(), chain_id, 1)],
            Coins::single(Coin::new("uatom", 10u64)),
        );
        assert_eq!(h.app.check_tx(&tx).unwrap_err().code(), 403);
    }

    // =========================================================================
    // PAYER AND OWNERSHIP
    // =========================================================================

    #[test]
    fn test_payer_must_own_every_anchor_message() {
        let (mut h, chain_id) = setup(100);
        let payer = Address::new([0x0B; 20]);
        h.fund_locked(payer, 100);
        let fee = h.app.config().anchor.fee_record;

        let tx = Tx::new(vec![LedgerHarness::record_msg(owner(), chain_id, 1)], h.coins(fee)).with_fee_payer(payer);
        let err = h.app.deliver_tx(&tx).unwrap_err();
        assert_eq!(err.code(), 405);
        assert_eq!(h.locked(payer), U256::from(100u64));
    }

    #[test]
    fn test_unfunded_payer_rejected_before_mutation() {
        let mut h = LedgerHarness::new();
        let fee = h.app.config().anchor.fee_register;
        let err = h.deliver(vec![LedgerHarness::register_msg(owner(), "alpha")], fee).unwrap_err();
        assert_eq!(err.code(), 404);
        assert!(h.app.query(|ctx, k| k.anchor.all_chains(ctx).unwrap()).is_empty());
    }

    // =========================================================================
    // FEE KEPT ON MESSAGE FAILURE
    // =========================================================================

    #[test]
    fn test_fee_paid_when_a_later_message_fails() {
        let (mut h, chain_id) = setup(100);
        let fee = h.app.config().anchor.fee_record;
        let msgs = vec![
            LedgerHarness::record_msg(owner(), chain_id, 1),
            // unknown chain
            LedgerHarness::record_msg(owner(), chain_id + 7, 1),
        ];
        let err = h.deliver(msgs, 2 * fee).unwrap_err();
        assert_eq!(err.code(), 302);

        // first record rolled back with the second, fee still taken
        assert!(h.block_heights(chain_id).is_empty());
        assert_eq!(h.locked(owner()), U256::from(100 - 2 * fee));
        h.app.assert_invariants().unwrap();
    }

    #[test]
    fn test_sequence_advances_only_when_admitted() {
        let (mut h, chain_id) = setup(100);
        let fee = h.app.config().anchor.fee_record;
        let seq = |h: &mut LedgerHarness| {
            h.app
                .query(|ctx, _| lm_04_fee_validation::sequence(ctx, &owner()).unwrap())
        };
        let before = seq(&mut h);
        h.record(owner(), chain_id, 1).unwrap();
        assert_eq!(seq(&mut h), before + 1);

        let tx = Tx::new(
            vec![LedgerHarness::record_msg(owner(), chain_id, 2)],
            Coins::single(Coin::new("uatom", fee)),
        );
        assert!(h.app.deliver_tx(&tx).is_err());
        assert_eq!(seq(&mut h), before + 1);
    }
}
