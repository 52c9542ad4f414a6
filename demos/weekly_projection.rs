//! 單一門店週度庫存推演範例
//!
//! 展示缺貨後補貨、餘數追趕的完整推演流程

use chrono::NaiveDate;
use depletion::*;
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("===== Weekly Depletion Projection =====\n");

    // 步驟 1: 推演配置（8 週，週一起算）
    let start = NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date");
    let config = ProjectionConfig::weeks(start, 8);
    println!("[1] Horizon: {} + {} days, step {} days\n", start, config.horizon_length_days, config.step_length_days);

    // 步驟 2: 預測銷售速率（3 月每日 6.5 件，4 月每週 28 件）
    let rates = RateTable::new(vec![
        RateOfSaleRecord::per_day(
            "STORE-01",
            "TEE-M",
            RatePeriod::new(start, NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date")),
            Decimal::new(65, 1),
        ),
        RateOfSaleRecord::per_day(
            "STORE-01",
            "TEE-M",
            RatePeriod::new(
                NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date"),
                NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
            ),
            Decimal::from(28),
        )
        .with_unit(RateUnit::PerWeek),
    ])?;

    // 步驟 3: 到貨計劃
    let receipts = ReceiptTable::new(vec![
        ReceiptEvent::new("STORE-01", "TEE-M", Tier::Store, NaiveDate::from_ymd_opt(2025, 3, 19).expect("valid date"), 60)
            .with_source_ref("PO-1001"),
    ])?;

    // 步驟 4: 執行推演
    let engine = ProjectionEngine::new(config, rates, receipts)?;
    let run = engine.run(&[OpeningStock::store("STORE-01", "TEE-M", 80)])?;

    println!("[2] Projection");
    println!("    week_start  open  in  sales  close  carry");
    for p in run.projections.records() {
        println!(
            "    {}  {:>4} {:>3} {:>6} {:>6}  {}",
            p.week_start, p.opening_qty, p.inward_qty, p.forecasted_sales_qty, p.closing_qty, p.carry_forward
        );
    }

    println!("\n[3] Warnings: {}", run.warnings.len());
    for w in &run.warnings {
        println!("    {:?} {}/{}: {}", w.kind, w.location, w.item, w.message);
    }

    println!("\n[4] JSON");
    println!("{}", serde_json::to_string_pretty(run.projections.records())?);

    Ok(())
}
