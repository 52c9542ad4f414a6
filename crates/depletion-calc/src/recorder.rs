//! 推演結果記錄器

use depletion_core::{DepletionError, StockKey, WeeklyProjection};
use std::collections::BTreeMap;

/// 只追加的週度推演記錄集合
#[derive(Debug, Clone, Default)]
pub struct ProjectionRecorder {
    records: Vec<WeeklyProjection>,
    /// 庫存鍵 → 記錄索引（按步次順序）
    index: BTreeMap<StockKey, Vec<usize>>,
}

impl ProjectionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一筆記錄；同一庫存鍵的週起始日必須嚴格遞增
    pub fn record(&mut self, projection: WeeklyProjection) -> depletion_core::Result<()> {
        let key = projection.key();
        let positions = self.index.entry(key.clone()).or_default();

        if let Some(&last) = positions.last() {
            let previous = &self.records[last];
            if previous.week_start >= projection.week_start {
                return Err(DepletionError::invariant(
                    &key,
                    projection.week_start,
                    format!("步次不遞增：上一筆週起始 {}", previous.week_start),
                ));
            }
        }

        positions.push(self.records.len());
        self.records.push(projection);
        Ok(())
    }

    /// 所有記錄（步次優先，再按庫存鍵）
    pub fn records(&self) -> &[WeeklyProjection] {
        &self.records
    }

    /// 單一庫存鍵的完整時間序列
    pub fn series(&self, key: &StockKey) -> Vec<&WeeklyProjection> {
        self.index
            .get(key)
            .map(|positions| positions.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// 已記錄的庫存鍵
    pub fn keys(&self) -> impl Iterator<Item = &StockKey> {
        self.index.keys()
    }

    /// 指定步次的所有記錄
    pub fn step(&self, step_index: usize) -> impl Iterator<Item = &WeeklyProjection> {
        self.records.iter().filter(move |r| r.step_index == step_index)
    }

    /// 單一庫存鍵的累計銷售
    pub fn total_sales(&self, key: &StockKey) -> i64 {
        self.series(key).iter().map(|r| r.forecasted_sales_qty).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 取出記錄表
    pub fn into_records(self) -> Vec<WeeklyProjection> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(location: &str, step_index: usize, sales: i64) -> WeeklyProjection {
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
            + chrono::Duration::weeks(step_index as i64);
        WeeklyProjection {
            location: location.to_string(),
            item: "TEE-M".to_string(),
            step_index,
            week_start: start,
            week_end: start + chrono::Duration::days(6),
            opening_qty: 100,
            inward_qty: 0,
            transferred_qty: 0,
            forecasted_sales_qty: sales,
            closing_qty: 100 - sales,
            carry_forward: Decimal::ZERO,
            stock_out: false,
            warehouse_closing_qty: 0,
        }
    }

    #[test]
    fn test_series_by_key() {
        let mut recorder = ProjectionRecorder::new();
        recorder.record(record("S01", 0, 10)).unwrap();
        recorder.record(record("S02", 0, 1)).unwrap();
        recorder.record(record("S01", 1, 20)).unwrap();
        recorder.record(record("S02", 1, 2)).unwrap();

        let key = StockKey::new("S01", "TEE-M");
        let series = recorder.series(&key);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].step_index, 0);
        assert_eq!(series[1].step_index, 1);
        assert_eq!(recorder.total_sales(&key), 30);
        assert_eq!(recorder.step(1).count(), 2);
        assert_eq!(recorder.keys().count(), 2);
        assert_eq!(recorder.len(), 4);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let mut recorder = ProjectionRecorder::new();
        recorder.record(record("S01", 1, 10)).unwrap();

        let result = recorder.record(record("S01", 0, 10));
        assert!(matches!(result, Err(DepletionError::InvariantViolation { .. })));

        let result = recorder.record(record("S01", 1, 10));
        assert!(result.is_err());
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_unknown_key_has_empty_series() {
        let recorder = ProjectionRecorder::new();
        assert!(recorder.series(&StockKey::new("S99", "X")).is_empty());
        assert!(recorder.is_empty());
    }
}
