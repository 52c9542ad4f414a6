//! 倉庫 → 門店兩層網路推演範例

use chrono::NaiveDate;
use depletion::*;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("===== Two-Tier Network Projection =====\n");

    let start = NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date");
    let year_end = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");

    // 週日閉店
    let mut trading_days = [true; 7];
    trading_days[6] = false;
    let calendar = TradingCalendar::new("NO-SUNDAY".to_string()).with_trading_days(trading_days);

    let config = ProjectionConfig::weeks(start, 6)
        .with_calendar(calendar)
        .with_parallel(true);

    let stores = ["STORE-01", "STORE-02", "STORE-03"];
    let sizes = [("TEE-S", 3), ("TEE-M", 5), ("TEE-L", 4)];

    let mut snapshot = Vec::new();
    let mut rates = Vec::new();
    let mut receipts = Vec::new();

    for (i, store) in stores.iter().enumerate() {
        for (item, base_rate) in sizes {
            snapshot.push(OpeningStock::warehouse(*store, item, 120));
            snapshot.push(OpeningStock::store(*store, item, 20 + 10 * i as i64));

            rates.push(RateOfSaleRecord::per_day(
                *store,
                item,
                RatePeriod::new(start, year_end),
                Decimal::from(base_rate) + Decimal::new(5 * i as i64, 1),
            ));

            // 每兩週從倉庫調撥一次
            for week in [1, 3, 5] {
                receipts.push(
                    ReceiptEvent::transfer(*store, item, start + chrono::Duration::weeks(week), 45)
                        .with_source_ref(format!("TO-{}-{}-{}", store, item, week)),
                );
            }
        }
    }

    let engine = ProjectionEngine::new(config, RateTable::new(rates)?, ReceiptTable::new(receipts)?)?;
    let run = engine.run(&snapshot)?;

    for key in run.projections.keys() {
        let series = run.projections.series(key);
        let closing: Vec<_> = series.iter().map(|p| p.closing_qty).collect();
        let stock_outs = series.iter().filter(|p| p.stock_out).count();
        let warehouse = series.last().map(|p| p.warehouse_closing_qty).unwrap_or_default();
        println!(
            "{:<16} store {:?}  warehouse {:>4}  stock-out weeks {}",
            key.to_string(),
            closing,
            warehouse,
            stock_outs
        );
    }

    tracing::info!(
        "門店剩餘 {} 件，倉庫剩餘 {} 件",
        run.ledger.total_on_hand(Tier::Store),
        run.ledger.total_on_hand(Tier::Warehouse)
    );

    Ok(())
}
