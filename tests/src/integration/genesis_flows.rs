//! # Genesis Flows
//!
//! Export from a live ledger, re-import, and the upgrade path from older
//! genesis layouts through the migration pipeline.

#[cfg(test)]
mod tests {
    use ledger_runtime::{GenesisState, LedgerApp, LedgerConfig, MigrationPipeline, GENESIS_VERSION};
    use lm_01_escrow_ledger::SpentBalance;
    use serde_json::{json, Value};
    use shared_types::{Address, Coin, U256};

    use crate::harness::LedgerHarness;

    fn owner() -> Address {
        Address::new([0x6E; 20])
    }

    /// Ledger with one completed order, one chain and `records` blocks kept
    /// in state under a limit of 10.
    fn live_ledger(records: u64) -> LedgerHarness {
        let mut config = LedgerConfig::for_testing();
        config.anchor.default_storage_limit = 10;
        let mut h = LedgerHarness::with_config(config, Vec::new());
        h.fund_locked(owner(), 1_500);
        let chain_id = h.register(owner(), "exported").unwrap();
        for height in 1..=records {
            h.record(owner(), chain_id, height).unwrap();
        }
        h
    }

    /// Rewrite a current export into the version 1 layout.
    fn downgrade_to_v1(mut genesis: Value) -> Value {
        genesis["version"] = json!(1);
        let escrow = genesis["escrow"].as_object_mut().unwrap();
        escrow.remove("spent");
        escrow.remove("total_spent");

        let params = genesis["anchor"]["params"].as_object_mut().unwrap();
        params.remove("fee_purchase_storage");
        params.remove("default_storage_limit");
        params.remove("max_storage_limit");

        for export in genesis["anchor"]["chains"].as_array_mut().unwrap() {
            let export = export.as_object_mut().unwrap();
            export.remove("in_state_limit");
            let chain = export.get_mut("chain").unwrap().as_object_mut().unwrap();
            let base_type = chain.remove("base_type").unwrap();
            chain.insert("type".into(), base_type);
            chain.remove("num_blocks_in_state");
            chain.remove("lowest_height_in_state");
        }
        genesis
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut h = live_ledger(4);
        let exported = h.app.export_genesis().unwrap();
        assert_eq!(exported.version, GENESIS_VERSION);

        let json = exported.to_json_pretty().unwrap();
        let parsed = GenesisState::from_json(&json).unwrap();
        let mut config = LedgerConfig::for_testing();
        config.anchor.default_storage_limit = 10;
        let mut imported = LedgerApp::from_genesis(config, &parsed).unwrap();

        assert_eq!(imported.export_genesis().unwrap(), exported);
        assert_eq!(imported.height(), 0);
        imported.assert_invariants().unwrap();
    }

    #[test]
    fn test_v1_export_migrates_and_imports() {
        let mut h = live_ledger(6);
        let current = serde_json::to_value(h.app.export_genesis().unwrap()).unwrap();
        let actual_spent = current["escrow"]["spent"].clone();
        let v1 = downgrade_to_v1(current);

        let pipeline = MigrationPipeline::standard_with(&LedgerConfig::for_testing().anchor);
        let migrated = pipeline.migrate(v1, GENESIS_VERSION).unwrap();
        let state: GenesisState = serde_json::from_value(migrated).unwrap();

        // newest three kept under the testing default limit
        let chain = &state.anchor.chains[0];
        let heights: Vec<u64> = chain.blocks.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![4, 5, 6]);
        assert_eq!(chain.in_state_limit, 3);
        assert_eq!(chain.chain.last_height, 6);
        assert_eq!(chain.chain.base_type, "geth");

        // completed 1500, still locked 1500 - 1000 - 60
        let spent: Vec<SpentBalance> = serde_json::from_value(actual_spent).unwrap();
        assert_eq!(state.escrow.spent, spent);
        assert_eq!(state.escrow.total_spent, Coin::new("nund", 1_060u64));

        let mut app = LedgerApp::from_genesis(LedgerConfig::for_testing(), &state).unwrap();
        let locked = app.query(|ctx, k| k.escrow.locked_balance(ctx, &owner()).unwrap().amount.amount);
        assert_eq!(locked, U256::from(440u64));
    }

    #[test]
    fn test_old_layout_refused_without_migration() {
        let mut h = live_ledger(1);
        let v1 = downgrade_to_v1(serde_json::to_value(h.app.export_genesis().unwrap()).unwrap());
        let err = GenesisState::from_json(&v1.to_string()).unwrap_err();
        assert_eq!(err.code(), 602);
    }

    #[test]
    fn test_import_rejects_unbacked_locked_funds() {
        let mut h = live_ledger(0);
        let mut state = h.app.export_genesis().unwrap();
        // claim more locked than the escrow account holds
        state.escrow.locked[0].amount = Coin::new("nund", 9_999u64);
        state.escrow.total_locked = Coin::new("nund", 9_999u64);
        let err = LedgerApp::from_genesis(LedgerConfig::for_testing(), &state).err().unwrap();
        assert_eq!(err.code(), 102);
    }
}
