//! 到貨模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stock::{StockKey, Tier};
use crate::DepletionError;

/// 到貨來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptSource {
    /// 外部供應（供應商、生產）
    #[default]
    External,
    /// 同一門店/商品的倉庫調撥
    Warehouse,
}

/// 計劃到貨
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptEvent {
    /// 到貨ID
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    pub location: String,

    pub item: String,

    /// 到達層級
    pub tier: Tier,

    /// 生效週（落在哪個步次視窗內即在該步次入庫）
    pub effective_week: NaiveDate,

    /// 到貨數量（必須為正）
    pub quantity: i64,

    /// 來源
    #[serde(default)]
    pub source: ReceiptSource,

    /// 來源單據
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl ReceiptEvent {
    /// 創建新的外部到貨
    pub fn new(
        location: impl Into<String>,
        item: impl Into<String>,
        tier: Tier,
        effective_week: NaiveDate,
        quantity: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            location: location.into(),
            item: item.into(),
            tier,
            effective_week,
            quantity,
            source: ReceiptSource::External,
            source_ref: None,
        }
    }

    /// 創建倉庫到門店的調撥
    pub fn transfer(
        location: impl Into<String>,
        item: impl Into<String>,
        effective_week: NaiveDate,
        quantity: i64,
    ) -> Self {
        Self {
            source: ReceiptSource::Warehouse,
            ..Self::new(location, item, Tier::Store, effective_week, quantity)
        }
    }

    /// 建構器模式：設置來源單據
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.location.clone(), self.item.clone())
    }

    /// 檢查是否為倉庫調撥
    pub fn is_transfer(&self) -> bool {
        self.tier == Tier::Store && self.source == ReceiptSource::Warehouse
    }
}

/// 單一步次、單一庫存鍵的到貨彙總
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierReceipts {
    /// 外部到倉庫
    pub warehouse: i64,
    /// 外部直送門店
    pub store: i64,
    /// 倉庫調撥到門店
    pub transfer: i64,
}

impl TierReceipts {
    /// 累加一筆到貨；合計超出 `i64` 範圍時視為無效輸入
    pub fn add(&mut self, event: &ReceiptEvent) -> crate::Result<()> {
        let slot = match (event.tier, event.source) {
            (Tier::Warehouse, _) => &mut self.warehouse,
            (Tier::Store, ReceiptSource::External) => &mut self.store,
            (Tier::Store, ReceiptSource::Warehouse) => &mut self.transfer,
        };
        let current = *slot;
        *slot = current.checked_add(event.quantity).ok_or_else(|| {
            DepletionError::InvalidReceipt(format!(
                "{}/{} @ {} 到貨合計溢位: {} + {}",
                event.location, event.item, event.effective_week, current, event.quantity
            ))
        })?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.warehouse == 0 && self.store == 0 && self.transfer == 0
    }

    pub fn total(&self) -> Option<i64> {
        self.warehouse.checked_add(self.store)?.checked_add(self.transfer)
    }
}
