//! 庫存台帳

use chrono::NaiveDate;
use depletion_core::{DepletionError, OpeningStock, StockKey, StockPosition, Tier};
use std::collections::BTreeMap;

/// 單一庫存鍵在兩個層級的庫存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierPositions {
    pub warehouse: StockPosition,
    pub store: StockPosition,
}

impl TierPositions {
    pub fn get(&self, tier: Tier) -> &StockPosition {
        match tier {
            Tier::Warehouse => &self.warehouse,
            Tier::Store => &self.store,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut StockPosition {
        match tier {
            Tier::Warehouse => &mut self.warehouse,
            Tier::Store => &mut self.store,
        }
    }
}

/// 庫存台帳：按庫存鍵排序的庫存狀態表
///
/// 每個步次消耗舊台帳並產生新台帳，台帳本身不在步次之間共享。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockLedger {
    positions: BTreeMap<StockKey, TierPositions>,
}

impl StockLedger {
    /// 創建空台帳
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 `as_of` 當日的期初快照建立台帳（同鍵同層級的多行會合併）
    pub fn from_snapshot(rows: &[OpeningStock], as_of: NaiveDate) -> depletion_core::Result<Self> {
        let mut ledger = Self::new();
        for row in rows {
            let key = row.key();
            let position = ledger.observe(key.clone()).get_mut(row.tier);
            position.on_hand_qty = position
                .on_hand_qty
                .checked_add(row.quantity)
                .ok_or_else(|| {
                    DepletionError::invariant(&key, as_of, format!("{:?} 期初快照合計溢位", row.tier))
                })?;
        }

        tracing::debug!("期初快照 {} 行，庫存鍵 {} 個", rows.len(), ledger.len());
        Ok(ledger)
    }

    /// 取得或建立庫存鍵（首次出現時兩個層級都從零開始）
    pub fn observe(&mut self, key: StockKey) -> &mut TierPositions {
        self.positions.entry(key).or_default()
    }

    pub fn contains(&self, key: &StockKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &StockKey) -> Option<&TierPositions> {
        self.positions.get(key)
    }

    /// 查詢單一層級的庫存
    pub fn position(&self, key: &StockKey, tier: Tier) -> Option<&StockPosition> {
        self.positions.get(key).map(|p| p.get(tier))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 按鍵順序遍歷
    pub fn iter(&self) -> impl Iterator<Item = (&StockKey, &TierPositions)> {
        self.positions.iter()
    }

    /// 某層級的庫存總量
    pub fn total_on_hand(&self, tier: Tier) -> i64 {
        self.positions.values().map(|p| p.get(tier).on_hand_qty).sum()
    }

    /// 拆解為按鍵排序的列表
    pub fn into_entries(self) -> Vec<(StockKey, TierPositions)> {
        self.positions.into_iter().collect()
    }
}

impl FromIterator<(StockKey, TierPositions)> for StockLedger {
    fn from_iter<I: IntoIterator<Item = (StockKey, TierPositions)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_from_snapshot_merges_rows() {
        let ledger = StockLedger::from_snapshot(
            &[
                OpeningStock::store("S01", "TEE-M", 30),
                OpeningStock::store("S01", "TEE-M", 20),
                OpeningStock::warehouse("S01", "TEE-M", 200),
                OpeningStock::store("S02", "TEE-M", 5),
            ],
            as_of(),
        )
        .unwrap();

        let key = StockKey::new("S01", "TEE-M");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.position(&key, Tier::Store).unwrap().on_hand_qty, 50);
        assert_eq!(ledger.position(&key, Tier::Warehouse).unwrap().on_hand_qty, 200);
        assert_eq!(ledger.total_on_hand(Tier::Store), 55);
    }

    #[test]
    fn test_from_snapshot_overflow_rejected() {
        let result = StockLedger::from_snapshot(
            &[
                OpeningStock::store("S01", "TEE-M", i64::MAX),
                OpeningStock::store("S01", "TEE-M", 1),
            ],
            as_of(),
        );

        assert!(matches!(result, Err(DepletionError::InvariantViolation { .. })));
    }

    #[test]
    fn test_observe_creates_zero_positions() {
        let mut ledger = StockLedger::new();
        let key = StockKey::new("S09", "CAP");

        let positions = ledger.observe(key.clone());
        assert_eq!(*positions, TierPositions::default());

        positions.warehouse.on_hand_qty = 12;
        assert!(ledger.contains(&key));
        assert_eq!(ledger.position(&key, Tier::Warehouse).unwrap().on_hand_qty, 12);
        assert_eq!(ledger.position(&key, Tier::Store).unwrap().on_hand_qty, 0);
    }

    #[test]
    fn test_entries_round_trip_in_key_order() {
        let ledger = StockLedger::from_snapshot(
            &[
                OpeningStock::store("S02", "A", 1),
                OpeningStock::store("S01", "B", 2),
                OpeningStock::store("S01", "A", 3),
            ],
            as_of(),
        )
        .unwrap();

        let entries = ledger.clone().into_entries();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["S01/A", "S01/B", "S02/A"]);

        let rebuilt: StockLedger = entries.into_iter().collect();
        assert_eq!(rebuilt, ledger);
    }
}
