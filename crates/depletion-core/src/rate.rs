//! 銷售速率模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::days_in_month;
use crate::stock::StockKey;

/// 速率單位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    /// 每日件數
    #[default]
    PerDay,
    /// 每週件數
    PerWeek,
    /// 每月件數（按該日所在月份的實際天數折算）
    PerMonth,
}

impl RateUnit {
    /// 將速率換算為指定日期的每日件數
    pub fn to_per_day(self, value: Decimal, date: NaiveDate) -> Decimal {
        match self {
            RateUnit::PerDay => value,
            RateUnit::PerWeek => value / Decimal::from(7),
            RateUnit::PerMonth => value / Decimal::from(days_in_month(date)),
        }
    }
}

/// 速率有效期間 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RatePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// 預測銷售速率
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateOfSaleRecord {
    pub location: String,

    pub item: String,

    /// 有效期間
    pub period: RatePeriod,

    /// 速率數值（單位見 `unit`）
    pub rate: Decimal,

    /// 速率單位
    #[serde(default)]
    pub unit: RateUnit,
}

impl RateOfSaleRecord {
    /// 創建每日速率記錄
    pub fn per_day(
        location: impl Into<String>,
        item: impl Into<String>,
        period: RatePeriod,
        units_per_day: Decimal,
    ) -> Self {
        Self {
            location: location.into(),
            item: item.into(),
            period,
            rate: units_per_day,
            unit: RateUnit::PerDay,
        }
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: RateUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.location.clone(), self.item.clone())
    }

    /// 指定日期的每日件數
    pub fn units_per_day(&self, date: NaiveDate) -> Decimal {
        self.unit.to_per_day(self.rate, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(RateUnit::PerDay, 10, date(2025, 3, 5), Decimal::from(10))]
    #[case(RateUnit::PerWeek, 70, date(2025, 3, 5), Decimal::from(10))]
    #[case(RateUnit::PerMonth, 310, date(2025, 3, 5), Decimal::from(10))]
    #[case(RateUnit::PerMonth, 280, date(2025, 2, 14), Decimal::from(10))]
    #[case(RateUnit::PerMonth, 290, date(2024, 2, 14), Decimal::from(10))]
    fn test_unit_conversion(
        #[case] unit: RateUnit,
        #[case] value: i64,
        #[case] on: NaiveDate,
        #[case] expected: Decimal,
    ) {
        assert_eq!(unit.to_per_day(Decimal::from(value), on), expected);
    }

    #[test]
    fn test_period_contains() {
        let period = RatePeriod::new(date(2025, 3, 1), date(2025, 4, 1));

        assert!(period.contains(date(2025, 3, 1)));
        assert!(period.contains(date(2025, 3, 31)));
        assert!(!period.contains(date(2025, 4, 1)));
        assert!(!period.is_empty());
    }
}
