//! # Enterprise Ledger Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | check_tx | admission of one anchor record on a discarded branch |
//! | deliver_tx | admission, fee from locked funds, record with pruning |
//! | end_block | tally and completion over N raised orders |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lm_tests::LedgerHarness;
use shared_types::{Address, PurchaseOrderStatus};
use std::time::Duration;

fn owner() -> Address {
    Address::new([0xBE; 20])
}

/// Owner with a chain and enough locked funds for every iteration.
fn funded_chain() -> (LedgerHarness, u64) {
    let mut h = LedgerHarness::new();
    h.fund_locked(owner(), 1_000_000_000);
    let chain_id = h.register(owner(), "bench").expect("register");
    (h, chain_id)
}

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("ante-chain");
    group.measurement_time(Duration::from_secs(5));

    let (mut h, chain_id) = funded_chain();
    let fee = h.app.config().anchor.fee_record;
    group.bench_function("check_tx_record", |b| {
        b.iter(|| {
            let msgs = vec![LedgerHarness::record_msg(owner(), chain_id, 1)];
            black_box(h.check(msgs, fee).is_ok())
        })
    });

    let (mut h, chain_id) = funded_chain();
    let mut height = 0u64;
    group.bench_function("deliver_tx_record_with_pruning", |b| {
        b.iter(|| {
            height += 1;
            black_box(h.record(owner(), chain_id, height).is_ok())
        })
    });

    group.finish();
}

fn bench_end_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("end-block-tally");
    group.measurement_time(Duration::from_secs(5));

    for size in [10u64, 100, 500] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("accept_and_complete", size), &size, |b, &size| {
            b.iter_with_setup(
                || {
                    let mut h = LedgerHarness::new();
                    let (s0, s1) = (h.signer(0), h.signer(1));
                    for i in 0..size {
                        let purchaser = Address::new([(i % 200) as u8 + 1; 20]);
                        if i < 200 {
                            h.whitelist(purchaser);
                        }
                        let id = h.raise(purchaser, 100).expect("raise");
                        h.decide(id, s0, PurchaseOrderStatus::Accepted).expect("accept");
                        h.decide(id, s1, PurchaseOrderStatus::Accepted).expect("accept");
                    }
                    h
                },
                |mut h| black_box(h.app.end_block().is_ok()),
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_admission, bench_end_block);
criterion_main!(benches);
