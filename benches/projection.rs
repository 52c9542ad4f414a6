//! 推演效能基準：順序 vs. 並行

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use depletion::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

struct Fixture {
    snapshot: Vec<OpeningStock>,
    rates: Vec<RateOfSaleRecord>,
    receipts: Vec<ReceiptEvent>,
}

fn fixture(stores: usize, items: usize) -> Fixture {
    let mut rng = StdRng::seed_from_u64(42);
    let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

    let mut fixture = Fixture {
        snapshot: Vec::new(),
        rates: Vec::new(),
        receipts: Vec::new(),
    };

    for s in 0..stores {
        let store = format!("STORE-{:04}", s);
        for i in 0..items {
            let item = format!("SKU-{:03}", i);
            fixture
                .snapshot
                .push(OpeningStock::warehouse(&store, &item, rng.gen_range(0..500)));
            fixture
                .snapshot
                .push(OpeningStock::store(&store, &item, rng.gen_range(0..80)));
            fixture.rates.push(RateOfSaleRecord::per_day(
                &store,
                &item,
                RatePeriod::new(start, end),
                Decimal::new(rng.gen_range(0..1_500), 2),
            ));
            for week in (2..52).step_by(4) {
                fixture.receipts.push(ReceiptEvent::transfer(
                    &store,
                    &item,
                    start + chrono::Duration::weeks(week),
                    rng.gen_range(1..60),
                ));
            }
        }
    }

    fixture
}

fn bench_projection(c: &mut Criterion) {
    let fixture = fixture(200, 20);
    let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let mut group = c.benchmark_group("projection_52_weeks");
    group.sample_size(10);

    for parallel in [false, true] {
        let engine = ProjectionEngine::new(
            ProjectionConfig::weeks(start, 52).with_parallel(parallel),
            RateTable::new(fixture.rates.clone()).unwrap(),
            ReceiptTable::new(fixture.receipts.clone()).unwrap(),
        )
        .unwrap();

        group.bench_with_input(
            BenchmarkId::new("parallel", parallel),
            &fixture.snapshot,
            |b, snapshot| b.iter(|| engine.run(black_box(snapshot)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
