//! # Ledger Harness
//!
//! Drives a [`LedgerApp`] the way a block producer would: one block per
//! call, transactions delivered through the full admission chain.

use ledger_runtime::{EndBlockReport, LedgerApp, LedgerConfig, MsgResponse, RuntimeError, TxReceipt};
use lm_01_escrow_ledger::EscrowApi;
use lm_02_purchase_orders::PurchaseOrder;
use shared_types::{
    Address, Balance, BankKeeper, BlockHashes, BlockInfo, Coin, Coins, Msg, MsgProcessPurchaseOrder,
    MsgPurchaseChainStorage, MsgRaisePurchaseOrder, MsgRecordChainBlock, MsgRegisterChain,
    MsgWhitelistAddress, PurchaseOrderStatus, Tx, WhitelistAction, U256,
};

use ledger_runtime::GenesisState;

/// Seconds between harness blocks.
pub const BLOCK_INTERVAL: u64 = 5;

pub struct LedgerHarness {
    pub app: LedgerApp,
}

impl LedgerHarness {
    /// Testing config, empty genesis, sitting at height 1.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::for_testing(), Vec::new())
    }

    /// Start from `config` with `balances` seeded in the bank.
    pub fn with_config(config: LedgerConfig, balances: Vec<(Address, u64)>) -> Self {
        let mut genesis = GenesisState::new(&config);
        genesis.genesis_time = 1_000;
        genesis.bank.balances = balances
            .into_iter()
            .map(|(address, amount)| Balance {
                address,
                coins: Coins::single(Coin::new(config.enterprise.denom.clone(), amount)),
            })
            .collect();
        let mut app = LedgerApp::from_genesis(config, &genesis).expect("genesis imports");
        app.begin_block(BlockInfo::new(1, 1_000 + BLOCK_INTERVAL))
            .expect("first block opens");
        Self { app }
    }

    pub fn denom(&self) -> String {
        self.app.config().enterprise.denom.clone()
    }

    pub fn coins(&self, amount: u64) -> Coins {
        Coins::single(Coin::new(self.denom(), amount))
    }

    pub fn signer(&self, i: usize) -> Address {
        self.app.config().enterprise.signers[i]
    }

    pub fn now(&self) -> u64 {
        self.app.block().time
    }

    // =========================================================================
    // BLOCKS
    // =========================================================================

    /// Close the current block and open the next one `advance` seconds later.
    pub fn end_and_advance(&mut self, advance: u64) -> EndBlockReport {
        let report = self.app.end_block().expect("end block");
        let block = self.app.block();
        self.app
            .begin_block(BlockInfo::new(block.height + 1, block.time + advance))
            .expect("next block opens");
        report
    }

    pub fn next_block(&mut self) -> EndBlockReport {
        self.end_and_advance(BLOCK_INTERVAL)
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    pub fn deliver(&mut self, msgs: Vec<Msg>, fee: u64) -> Result<TxReceipt, RuntimeError> {
        let fee = if fee == 0 { Coins::new() } else { self.coins(fee) };
        self.app.deliver_tx(&Tx::new(msgs, fee))
    }

    pub fn check(&mut self, msgs: Vec<Msg>, fee: u64) -> Result<(), RuntimeError> {
        let fee = if fee == 0 { Coins::new() } else { self.coins(fee) };
        self.app.check_tx(&Tx::new(msgs, fee))
    }

    pub fn whitelist(&mut self, address: Address) {
        let signer = self.signer(0);
        self.deliver(
            vec![Msg::WhitelistAddress(MsgWhitelistAddress {
                address,
                action: WhitelistAction::Add,
                signer,
            })],
            0,
        )
        .expect("whitelist");
    }

    pub fn raise(&mut self, purchaser: Address, amount: u64) -> Result<u64, RuntimeError> {
        let amount = Coin::new(self.denom(), amount);
        let receipt = self.deliver(
            vec![Msg::RaisePurchaseOrder(MsgRaisePurchaseOrder { purchaser, amount })],
            0,
        )?;
        match receipt.responses.first() {
            Some(MsgResponse::RaisePurchaseOrder { purchase_order_id }) => Ok(*purchase_order_id),
            other => panic!("unexpected raise response {:?}", other),
        }
    }

    pub fn decide(&mut self, id: u64, signer: Address, decision: PurchaseOrderStatus) -> Result<(), RuntimeError> {
        self.deliver(
            vec![Msg::ProcessPurchaseOrder(MsgProcessPurchaseOrder {
                purchase_order_id: id,
                decision,
                signer,
            })],
            0,
        )
        .map(|_| ())
    }

    /// Whitelist, raise, accept with `min_accepts` signers and close the
    /// block, leaving `amount` locked for `purchaser`.
    pub fn fund_locked(&mut self, purchaser: Address, amount: u64) -> u64 {
        self.whitelist(purchaser);
        let id = self.raise(purchaser, amount).expect("raise");
        let quorum = self.app.config().enterprise.min_accepts as usize;
        for i in 0..quorum {
            let signer = self.signer(i);
            self.decide(id, signer, PurchaseOrderStatus::Accepted).expect("accept");
        }
        let report = self.next_block();
        assert!(report.tally.accepted.contains(&id));
        id
    }

    pub fn register_msg(owner: Address, moniker: &str) -> Msg {
        Msg::RegisterChain(MsgRegisterChain {
            moniker: moniker.into(),
            name: format!("{} chain", moniker),
            genesis_hash: "0xgenesis".into(),
            base_type: "geth".into(),
            owner,
        })
    }

    pub fn record_msg(owner: Address, chain_id: u64, height: u64) -> Msg {
        Msg::RecordChainBlock(MsgRecordChainBlock {
            chain_id,
            height,
            hashes: BlockHashes::new(format!("0x{:064x}", height)),
            owner,
        })
    }

    pub fn purchase_msg(owner: Address, chain_id: u64, number: u64) -> Msg {
        Msg::PurchaseChainStorage(MsgPurchaseChainStorage {
            chain_id,
            number,
            owner,
        })
    }

    /// Register `moniker` paying the scheduled fee. Returns the chain id.
    pub fn register(&mut self, owner: Address, moniker: &str) -> Result<u64, RuntimeError> {
        let fee = self.app.config().anchor.fee_register;
        let receipt = self.deliver(vec![Self::register_msg(owner, moniker)], fee)?;
        match receipt.responses.first() {
            Some(MsgResponse::RegisterChain { chain_id }) => Ok(*chain_id),
            other => panic!("unexpected register response {:?}", other),
        }
    }

    pub fn record(&mut self, owner: Address, chain_id: u64, height: u64) -> Result<TxReceipt, RuntimeError> {
        let fee = self.app.config().anchor.fee_record;
        self.deliver(vec![Self::record_msg(owner, chain_id, height)], fee)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn locked(&mut self, addr: Address) -> U256 {
        self.app
            .query(|ctx, k| k.escrow.locked_amount(ctx, &addr).expect("locked").amount)
    }

    pub fn spendable(&mut self, addr: Address) -> U256 {
        let denom = self.denom();
        self.app.query(|ctx, k| {
            k.bank
                .spendable_coins(ctx, &addr)
                .expect("spendable")
                .amount_of(&denom)
        })
    }

    pub fn order(&mut self, id: u64) -> PurchaseOrder {
        self.app
            .query(|ctx, k| k.orders.get_order(ctx, id).expect("order"))
            .expect("order exists")
    }

    pub fn block_heights(&mut self, chain_id: u64) -> Vec<u64> {
        self.app.query(|ctx, k| {
            k.anchor
                .all_blocks(ctx, chain_id)
                .expect("blocks")
                .into_iter()
                .map(|b| b.height)
                .collect()
        })
    }

    pub fn in_state_limit(&mut self, chain_id: u64) -> u64 {
        self.app
            .query(|ctx, k| k.anchor.in_state_limit(ctx, chain_id).expect("limit"))
    }
}

impl Default for LedgerHarness {
    fn default() -> Self {
        Self::new()
    }
}
