//! 外部資料提供者：銷售速率與到貨計劃
//!
//! 兩者都必須在推演開始前完全載入，步次內的查詢不阻塞。

use chrono::NaiveDate;
use depletion_core::{DepletionError, RateOfSaleRecord, ReceiptEvent, StockKey, TierReceipts};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::horizon::StepWindow;

/// 銷售速率提供者
pub trait RateOfSaleProvider: Sync {
    /// 指定日期的每日預測件數；查無資料時返回 `None`（不可自行捏造速率）
    fn rate_for(&self, key: &StockKey, date: NaiveDate) -> Option<Decimal>;
}

/// 到貨計劃
pub trait ReceiptSchedule: Sync {
    /// 指定步次內的到貨彙總；查無資料視為零
    fn receipts_for(
        &self,
        key: &StockKey,
        window: &StepWindow,
    ) -> depletion_core::Result<TierReceipts>;

    /// 指定步次內有到貨的庫存鍵
    fn keys_with_receipts(&self, window: &StepWindow) -> Vec<StockKey>;

    /// 生效日落在 [start, end) 之外的到貨（用於報告逾期與超出時界的到貨）
    fn events_outside(&self, _start: NaiveDate, _end: NaiveDate) -> Vec<&ReceiptEvent> {
        Vec::new()
    }
}

/// 以表格實現的銷售速率提供者
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    /// 庫存鍵 → 按期間起始日排序的速率
    rates: BTreeMap<StockKey, Vec<RateOfSaleRecord>>,
}

impl RateTable {
    /// 建立速率表；負速率或空期間視為無效輸入
    pub fn new(records: Vec<RateOfSaleRecord>) -> depletion_core::Result<Self> {
        let mut rates: BTreeMap<StockKey, Vec<RateOfSaleRecord>> = BTreeMap::new();

        for record in records {
            if record.rate < Decimal::ZERO {
                return Err(DepletionError::InvalidRate(format!(
                    "{}/{} 速率為負: {}",
                    record.location, record.item, record.rate
                )));
            }
            if record.period.is_empty() {
                return Err(DepletionError::InvalidRate(format!(
                    "{}/{} 期間為空: [{}, {})",
                    record.location, record.item, record.period.start, record.period.end
                )));
            }
            rates.entry(record.key()).or_default().push(record);
        }

        for list in rates.values_mut() {
            list.sort_by_key(|r| r.period.start);
        }

        Ok(Self { rates })
    }

    pub fn len(&self) -> usize {
        self.rates.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateOfSaleProvider for RateTable {
    fn rate_for(&self, key: &StockKey, date: NaiveDate) -> Option<Decimal> {
        // 期間重疊時取起始日最晚者
        self.rates
            .get(key)?
            .iter()
            .rev()
            .find(|r| r.period.contains(date))
            .map(|r| r.units_per_day(date))
    }
}

/// 以表格實現的到貨計劃
#[derive(Debug, Clone, Default)]
pub struct ReceiptTable {
    /// 庫存鍵 → 按生效週排序的到貨
    receipts: BTreeMap<StockKey, Vec<ReceiptEvent>>,
}

impl ReceiptTable {
    /// 建立到貨表；非正數量視為無效輸入
    pub fn new(events: Vec<ReceiptEvent>) -> depletion_core::Result<Self> {
        let mut receipts: BTreeMap<StockKey, Vec<ReceiptEvent>> = BTreeMap::new();

        for event in events {
            if event.quantity <= 0 {
                return Err(DepletionError::InvalidReceipt(format!(
                    "{}/{} @ {} 數量必須為正: {}",
                    event.location, event.item, event.effective_week, event.quantity
                )));
            }
            receipts.entry(event.key()).or_default().push(event);
        }

        for list in receipts.values_mut() {
            list.sort_by_key(|e| e.effective_week);
        }

        Ok(Self { receipts })
    }

    /// 步次視窗內的到貨；第一步同時承接推演起始日之前的逾期到貨
    fn events_in<'a>(
        &'a self,
        key: &StockKey,
        window: &'a StepWindow,
    ) -> impl Iterator<Item = &'a ReceiptEvent> + 'a {
        self.receipts
            .get(key)
            .into_iter()
            .flatten()
            .filter(move |e| Self::applies_in(e, window))
    }

    fn applies_in(event: &ReceiptEvent, window: &StepWindow) -> bool {
        event.effective_week < window.end
            && (window.is_first() || event.effective_week >= window.start)
    }

    /// 所有到貨數量合計
    pub fn total_quantity(&self) -> i64 {
        self.receipts.values().flatten().map(|e| e.quantity).sum()
    }

    pub fn len(&self) -> usize {
        self.receipts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}

impl ReceiptSchedule for ReceiptTable {
    fn receipts_for(
        &self,
        key: &StockKey,
        window: &StepWindow,
    ) -> depletion_core::Result<TierReceipts> {
        let mut receipts = TierReceipts::default();
        for event in self.events_in(key, window) {
            receipts.add(event)?;
        }
        Ok(receipts)
    }

    fn keys_with_receipts(&self, window: &StepWindow) -> Vec<StockKey> {
        self.receipts
            .iter()
            .filter(|(_, events)| events.iter().any(|e| Self::applies_in(e, window)))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn events_outside(&self, start: NaiveDate, end: NaiveDate) -> Vec<&ReceiptEvent> {
        self.receipts
            .values()
            .flatten()
            .filter(|e| e.effective_week < start || e.effective_week >= end)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depletion_core::{RatePeriod, RateUnit, Tier};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn key() -> StockKey {
        StockKey::new("S01", "TEE-M")
    }

    #[test]
    fn test_rate_lookup_by_period() {
        let table = RateTable::new(vec![
            RateOfSaleRecord::per_day(
                "S01",
                "TEE-M",
                RatePeriod::new(date(2025, 3, 1), date(2025, 4, 1)),
                Decimal::from(10),
            ),
            RateOfSaleRecord::per_day(
                "S01",
                "TEE-M",
                RatePeriod::new(date(2025, 4, 1), date(2025, 5, 1)),
                Decimal::from(300),
            )
            .with_unit(RateUnit::PerMonth),
        ])
        .unwrap();

        assert_eq!(table.rate_for(&key(), date(2025, 3, 15)), Some(Decimal::from(10)));
        assert_eq!(table.rate_for(&key(), date(2025, 4, 15)), Some(Decimal::from(10)));
        assert_eq!(table.rate_for(&key(), date(2025, 5, 1)), None);
        assert_eq!(table.rate_for(&StockKey::new("S02", "TEE-M"), date(2025, 3, 15)), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rate_rejects_negative() {
        let result = RateTable::new(vec![RateOfSaleRecord::per_day(
            "S01",
            "TEE-M",
            RatePeriod::new(date(2025, 3, 1), date(2025, 4, 1)),
            Decimal::from(-1),
        )]);

        assert!(matches!(result, Err(DepletionError::InvalidRate(_))));
    }

    #[test]
    fn test_receipts_in_window() {
        let table = ReceiptTable::new(vec![
            ReceiptEvent::new("S01", "TEE-M", Tier::Warehouse, date(2025, 3, 5), 100),
            ReceiptEvent::new("S01", "TEE-M", Tier::Store, date(2025, 3, 10), 40),
            ReceiptEvent::transfer("S01", "TEE-M", date(2025, 3, 12), 60),
        ])
        .unwrap();

        let first = StepWindow::new(0, date(2025, 3, 3), date(2025, 3, 10));
        let second = StepWindow::new(1, date(2025, 3, 10), date(2025, 3, 17));

        let receipts = table.receipts_for(&key(), &first).unwrap();
        assert_eq!(receipts, TierReceipts { warehouse: 100, store: 0, transfer: 0 });

        let receipts = table.receipts_for(&key(), &second).unwrap();
        assert_eq!(receipts, TierReceipts { warehouse: 0, store: 40, transfer: 60 });

        assert_eq!(table.keys_with_receipts(&second), vec![key()]);
        assert_eq!(table.total_quantity(), 200);
    }

    #[test]
    fn test_overdue_receipts_land_in_first_step() {
        let table = ReceiptTable::new(vec![ReceiptEvent::new(
            "S01",
            "TEE-M",
            Tier::Store,
            date(2025, 2, 17),
            12,
        )])
        .unwrap();

        let first = StepWindow::new(0, date(2025, 3, 3), date(2025, 3, 10));
        let second = StepWindow::new(1, date(2025, 3, 10), date(2025, 3, 17));

        assert_eq!(table.receipts_for(&key(), &first).unwrap().store, 12);
        assert!(table.receipts_for(&key(), &second).unwrap().is_empty());
    }

    #[test]
    fn test_receipt_rejects_non_positive() {
        let result = ReceiptTable::new(vec![ReceiptEvent::new(
            "S01",
            "TEE-M",
            Tier::Store,
            date(2025, 3, 3),
            0,
        )]);

        assert!(matches!(result, Err(DepletionError::InvalidReceipt(_))));
    }

    #[test]
    fn test_receipts_overflow_in_window() {
        let table = ReceiptTable::new(vec![
            ReceiptEvent::new("S01", "TEE-M", Tier::Warehouse, date(2025, 3, 3), i64::MAX),
            ReceiptEvent::new("S01", "TEE-M", Tier::Warehouse, date(2025, 3, 4), 1),
        ])
        .unwrap();

        let first = StepWindow::new(0, date(2025, 3, 3), date(2025, 3, 10));
        let result = table.receipts_for(&key(), &first);
        assert!(matches!(result, Err(DepletionError::InvalidReceipt(_))));
    }

    #[test]
    fn test_events_outside_horizon() {
        let table = ReceiptTable::new(vec![
            ReceiptEvent::new("S01", "TEE-M", Tier::Store, date(2025, 2, 24), 5),
            ReceiptEvent::new("S01", "TEE-M", Tier::Store, date(2025, 3, 3), 10),
            ReceiptEvent::new("S01", "TEE-M", Tier::Store, date(2025, 6, 2), 15),
        ])
        .unwrap();

        let outside = table.events_outside(date(2025, 3, 3), date(2025, 4, 1));
        let quantities: Vec<_> = outside.iter().map(|e| e.quantity).collect();
        assert_eq!(quantities, vec![5, 15]);
    }
}
