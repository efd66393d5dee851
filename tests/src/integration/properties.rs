//! # Randomized Ledger Properties
//!
//! Seeded random workloads over the whole ledger. After every block:
//!
//! - `total locked == Σ locked == escrow account balance`
//! - anchor counters agree with the stored records
//! - per-chain `last_height` never decreases

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::{Address, PurchaseOrderStatus, U256};

    use crate::harness::LedgerHarness;

    const ACCOUNTS: u8 = 4;

    fn account(i: u8) -> Address {
        Address::new([0x70 + i; 20])
    }

    /// One random transaction. Failures are expected and ignored; the
    /// properties are checked on whatever state results.
    fn random_tx(h: &mut LedgerHarness, rng: &mut StdRng, chains: &mut BTreeMap<u8, u64>, pending: &mut Vec<u64>) {
        let who = rng.gen_range(0..ACCOUNTS);
        let params = h.app.config().anchor.clone();
        match rng.gen_range(0..6) {
            0 => {
                if let Ok(id) = h.raise(account(who), rng.gen_range(1..3_000)) {
                    pending.push(id);
                }
            }
            1 => {
                if let Some(&id) = pending.get(rng.gen_range(0..pending.len().max(1))) {
                    let signer = h.signer(rng.gen_range(0..3));
                    let decision = if rng.gen_bool(0.8) {
                        PurchaseOrderStatus::Accepted
                    } else {
                        PurchaseOrderStatus::Rejected
                    };
                    let _ = h.decide(id, signer, decision);
                }
            }
            2 => {
                if !chains.contains_key(&who) {
                    if let Ok(chain_id) = h.register(account(who), &format!("chain-{}", who)) {
                        chains.insert(who, chain_id);
                    }
                }
            }
            3 | 4 => {
                if let Some(&chain_id) = chains.get(&who) {
                    let height = rng.gen_range(1..200);
                    // occasionally mispriced
                    let fee = params.fee_record + if rng.gen_bool(0.1) { 1 } else { 0 };
                    let _ = h.deliver(vec![LedgerHarness::record_msg(account(who), chain_id, height)], fee);
                }
            }
            _ => {
                if let Some(&chain_id) = chains.get(&who) {
                    let number = rng.gen_range(1..4);
                    let fee = params.fee_purchase_storage * number;
                    let _ = h.deliver(vec![LedgerHarness::purchase_msg(account(who), chain_id, number)], fee);
                }
            }
        }
    }

    fn run_workload(seed: u64, blocks: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut h = LedgerHarness::new();
        for i in 0..ACCOUNTS {
            h.whitelist(account(i));
        }

        let mut chains = BTreeMap::new();
        let mut pending = Vec::new();
        let mut last_heights: BTreeMap<u64, u64> = BTreeMap::new();

        for _ in 0..blocks {
            for _ in 0..rng.gen_range(1..8) {
                random_tx(&mut h, &mut rng, &mut chains, &mut pending);
            }
            let report = h.next_block();
            pending.retain(|id| report.tally.pending.contains(id));

            let totals = h.app.assert_invariants().unwrap();
            assert_eq!(totals.total_locked, totals.sum_locked);
            assert_eq!(totals.sum_locked, totals.module_balance);

            let locked: U256 = (0..ACCOUNTS).fold(U256::zero(), |acc, i| acc + h.locked(account(i)));
            assert_eq!(locked, totals.total_locked);

            for chain in h.app.query(|ctx, k| k.anchor.all_chains(ctx).unwrap()) {
                let previous = last_heights.insert(chain.id, chain.last_height).unwrap_or(0);
                assert!(chain.last_height >= previous);
            }
        }
        assert!(!h.app.is_halted());
    }

    #[test]
    fn test_invariants_hold_under_random_workload() {
        for seed in [1, 7, 42] {
            run_workload(seed, 40);
        }
    }

    #[test]
    fn test_invariants_survive_export_and_reimport() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut h = LedgerHarness::new();
        let mut chains = BTreeMap::new();
        let mut pending = Vec::new();
        for i in 0..ACCOUNTS {
            h.whitelist(account(i));
        }
        for _ in 0..20 {
            for _ in 0..5 {
                random_tx(&mut h, &mut rng, &mut chains, &mut pending);
            }
            let report = h.next_block();
            pending.retain(|id| report.tally.pending.contains(id));
        }

        let exported = h.app.export_genesis().unwrap();
        let mut imported =
            ledger_runtime::LedgerApp::from_genesis(h.app.config().clone(), &exported).unwrap();
        assert_eq!(
            imported.assert_invariants().unwrap(),
            h.app.assert_invariants().unwrap()
        );
    }
}
