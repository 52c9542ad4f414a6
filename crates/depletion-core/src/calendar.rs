//! 營業日曆模型

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{DepletionError, Result};

/// 營業日曆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingCalendar {
    /// 營業日（週一到週日，true表示營業）
    /// 索引 0 = 週一, 1 = 週二, ..., 6 = 週日
    pub trading_days: [bool; 7],

    /// 閉店日列表
    pub closures: Vec<NaiveDate>,

    /// 日曆ID
    pub calendar_id: String,
}

impl TradingCalendar {
    /// 創建全年無休日曆（預設）
    pub fn new(calendar_id: String) -> Self {
        Self {
            trading_days: [true; 7],
            closures: Vec::new(),
            calendar_id,
        }
    }

    /// 建構器模式：設置營業日
    pub fn with_trading_days(mut self, trading_days: [bool; 7]) -> Self {
        self.trading_days = trading_days;
        self
    }

    /// 建構器模式：設置閉店日
    pub fn with_closures(mut self, mut closures: Vec<NaiveDate>) -> Self {
        closures.sort();
        closures.dedup();
        self.closures = closures;
        self
    }

    /// 添加閉店日
    pub fn add_closure(&mut self, date: NaiveDate) {
        if let Err(pos) = self.closures.binary_search(&date) {
            self.closures.insert(pos, date);
        }
    }

    /// 檢查是否為營業日
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        if self.closures.binary_search(&date).is_ok() {
            return false;
        }

        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.trading_days[weekday_index]
    }

    /// 列出 [start, end) 之間的營業日
    pub fn trading_days_in(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| self.is_trading_day(*d))
            .collect()
    }

    /// 計算 [start, end) 之間的營業日數量
    pub fn trading_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        self.trading_days_in(start, end).len() as u32
    }
}

impl Default for TradingCalendar {
    fn default() -> Self {
        Self::new("ALL-DAYS".to_string())
    }
}

/// 日期加天數（溢出時返回錯誤）
pub fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| DepletionError::InvalidDate(format!("{} + {} 天溢出", date, days)))
}

/// 日期所在月份的天數
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        // 僅在 chrono 可表示範圍的最末月份發生
        _ => 31,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_trades_every_day() {
        let calendar = TradingCalendar::default();

        // 2025-10-11 是週六, 2025-10-12 是週日
        assert!(calendar.is_trading_day(date(2025, 10, 11)));
        assert!(calendar.is_trading_day(date(2025, 10, 12)));
        assert_eq!(calendar.trading_days_between(date(2025, 10, 6), date(2025, 10, 13)), 7);
    }

    #[test]
    fn test_closed_weekday() {
        // 週日休息
        let mut trading_days = [true; 7];
        trading_days[6] = false;
        let calendar = TradingCalendar::new("NO-SUNDAY".to_string()).with_trading_days(trading_days);

        let days = calendar.trading_days_in(date(2025, 10, 6), date(2025, 10, 13));
        assert_eq!(days.len(), 6);
        assert!(!days.contains(&date(2025, 10, 12)));
    }

    #[test]
    fn test_closures() {
        let mut calendar = TradingCalendar::default();
        calendar.add_closure(date(2025, 12, 25));
        calendar.add_closure(date(2025, 12, 25));
        calendar.add_closure(date(2025, 12, 24));

        assert_eq!(calendar.closures, vec![date(2025, 12, 24), date(2025, 12, 25)]);
        assert!(!calendar.is_trading_day(date(2025, 12, 25)));
        assert_eq!(calendar.trading_days_between(date(2025, 12, 22), date(2025, 12, 29)), 5);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2025, 1, 15)), 31);
        assert_eq!(days_in_month(date(2025, 2, 1)), 28);
        assert_eq!(days_in_month(date(2024, 2, 29)), 29);
        assert_eq!(days_in_month(date(2025, 12, 31)), 31);
    }

    #[test]
    fn test_add_days_overflow() {
        assert_eq!(add_days(date(2025, 1, 1), 7).unwrap(), date(2025, 1, 8));
        assert!(add_days(NaiveDate::MAX, 1).is_err());
    }
}
