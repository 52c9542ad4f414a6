//! 週度推演結果模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stock::StockKey;

/// 週度庫存推演記錄（門店層級，建立後不可變）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProjection {
    pub location: String,

    pub item: String,

    /// 步次序號（從 0 開始）
    pub step_index: usize,

    /// 週起始日
    pub week_start: NaiveDate,

    /// 週結束日（含）
    pub week_end: NaiveDate,

    /// 期初庫存（本步到貨前）
    pub opening_qty: i64,

    /// 本步入庫（直送 + 調撥）
    pub inward_qty: i64,

    /// 其中來自倉庫調撥的數量
    pub transferred_qty: i64,

    /// 預測銷售（整數件）
    pub forecasted_sales_qty: i64,

    /// 期末庫存
    pub closing_qty: i64,

    /// 結轉到下一步的銷售餘數（含未滿足需求）
    pub carry_forward: Decimal,

    /// 缺貨：本步取整後的需求超過可售庫存，期末為零且仍有需求未滿足
    #[serde(default)]
    pub stock_out: bool,

    /// 倉庫期末庫存
    pub warehouse_closing_qty: i64,
}

impl WeeklyProjection {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.location.clone(), self.item.clone())
    }

    /// 本步可售庫存（期初 + 入庫）
    pub fn available_qty(&self) -> i64 {
        self.opening_qty + self.inward_qty
    }

    /// 檢查守恆：期末 = 期初 + 入庫 - 銷售，且均非負
    pub fn is_balanced(&self) -> bool {
        self.opening_qty >= 0
            && self.closing_qty >= 0
            && self.closing_qty == self.opening_qty + self.inward_qty - self.forecasted_sales_qty
    }
}
