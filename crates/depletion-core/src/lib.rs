//! # Depletion Core
//!
//! 庫存消耗推演的核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod projection;
pub mod rate;
pub mod receipt;
pub mod stock;

// Re-export 主要類型
pub use calendar::TradingCalendar;
pub use config::{ProjectionConfig, RoundingRule};
pub use projection::WeeklyProjection;
pub use rate::{RateOfSaleRecord, RatePeriod, RateUnit};
pub use receipt::{ReceiptEvent, ReceiptSource, TierReceipts};
pub use stock::{OpeningStock, StockKey, StockPosition, Tier};

use chrono::NaiveDate;

/// 推演錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum DepletionError {
    #[error("配置錯誤: {0}")]
    Configuration(String),

    #[error("不變量被破壞 [{location}/{item} @ {step_start}]: {detail}")]
    InvariantViolation {
        location: String,
        item: String,
        step_start: NaiveDate,
        detail: String,
    },

    #[error("無效的到貨記錄: {0}")]
    InvalidReceipt(String),

    #[error("無效的銷售速率: {0}")]
    InvalidRate(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DepletionError {
    /// 建立帶有物料/門店/步次上下文的不變量錯誤
    pub fn invariant(key: &StockKey, step_start: NaiveDate, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            location: key.location.clone(),
            item: key.item.clone(),
            step_start,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepletionError>;
