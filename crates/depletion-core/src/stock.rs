//! 庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 庫存層級
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// 倉庫（不發生銷售）
    Warehouse,
    /// 門店（銷售發生處）
    Store,
}

/// 庫存鍵：門店 + 商品
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    /// 門店/地點ID
    pub location: String,

    /// 商品ID
    pub item: String,
}

impl StockKey {
    pub fn new(location: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            item: item.into(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.item)
    }
}

/// 單一層級的庫存狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockPosition {
    /// 現有庫存
    pub on_hand_qty: i64,

    /// 尚未實現為整數件的銷售餘數
    pub fractional_carry: Decimal,
}

impl StockPosition {
    /// 創建新的庫存狀態（餘數為零）
    pub fn new(on_hand_qty: i64) -> Self {
        Self {
            on_hand_qty,
            fractional_carry: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置餘數
    pub fn with_carry(mut self, fractional_carry: Decimal) -> Self {
        self.fractional_carry = fractional_carry;
        self
    }

    /// 檢查是否已售罄
    pub fn is_exhausted(&self) -> bool {
        self.on_hand_qty == 0
    }
}

/// 期初庫存快照（一行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningStock {
    pub location: String,
    pub item: String,
    pub tier: Tier,
    pub quantity: i64,
}

impl OpeningStock {
    pub fn new(location: impl Into<String>, item: impl Into<String>, tier: Tier, quantity: i64) -> Self {
        Self {
            location: location.into(),
            item: item.into(),
            tier,
            quantity,
        }
    }

    /// 門店層級的快照
    pub fn store(location: impl Into<String>, item: impl Into<String>, quantity: i64) -> Self {
        Self::new(location, item, Tier::Store, quantity)
    }

    /// 倉庫層級的快照
    pub fn warehouse(location: impl Into<String>, item: impl Into<String>, quantity: i64) -> Self {
        Self::new(location, item, Tier::Warehouse, quantity)
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.location.clone(), self.item.clone())
    }
}
