//! # Depletion
//!
//! 零售庫存消耗推演：根據期初庫存、到貨計劃與預測銷售速率，
//! 逐週推算每個門店/商品的庫存直到售罄或時界結束

pub use depletion_calc as calc;
pub use depletion_core as model;

pub use depletion_calc::{
    ProjectionEngine, ProjectionRecorder, ProjectionRun, ProjectionWarning, RateTable,
    ReceiptTable, StockLedger, WarningKind,
};
pub use depletion_core::{
    DepletionError, OpeningStock, ProjectionConfig, RateOfSaleRecord, RatePeriod, RateUnit,
    ReceiptEvent, RoundingRule, StockKey, Tier, TradingCalendar, WeeklyProjection,
};

/// 初始化日誌（`RUST_LOG` 未設置時預設 info；重複調用無副作用）
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
