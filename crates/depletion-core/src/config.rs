//! 推演配置模型

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::calendar::{add_days, TradingCalendar};
use crate::{DepletionError, Result};

/// 預設步長（天）
pub const DEFAULT_STEP_LENGTH_DAYS: i64 = 7;

/// 銷售件數取整規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingRule {
    /// 四捨五入（.5 遠離零）
    #[default]
    HalfAwayFromZero,
    /// 銀行家捨入（.5 取偶數）
    HalfEven,
}

impl RoundingRule {
    /// 取整為整數件
    pub fn round(self, value: Decimal) -> Decimal {
        let strategy = match self {
            RoundingRule::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingRule::HalfEven => RoundingStrategy::MidpointNearestEven,
        };
        value.round_dp_with_strategy(0, strategy)
    }
}

/// 推演配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// 推演起始日
    pub horizon_start: NaiveDate,

    /// 推演總天數
    pub horizon_length_days: i64,

    /// 步長（天）
    #[serde(default = "default_step_length")]
    pub step_length_days: i64,

    /// 取整規則
    #[serde(default)]
    pub rounding: RoundingRule,

    /// 同一步次內是否按庫存鍵並行計算
    #[serde(default)]
    pub parallel: bool,

    /// 營業日曆（僅營業日產生銷售）
    #[serde(default)]
    pub calendar: TradingCalendar,
}

fn default_step_length() -> i64 {
    DEFAULT_STEP_LENGTH_DAYS
}

impl ProjectionConfig {
    /// 創建新的推演配置（步長預設 7 天）
    pub fn new(horizon_start: NaiveDate, horizon_length_days: i64) -> Self {
        Self {
            horizon_start,
            horizon_length_days,
            step_length_days: DEFAULT_STEP_LENGTH_DAYS,
            rounding: RoundingRule::default(),
            parallel: false,
            calendar: TradingCalendar::default(),
        }
    }

    /// 以週數創建配置
    pub fn weeks(horizon_start: NaiveDate, weeks: i64) -> Self {
        Self::new(horizon_start, weeks * DEFAULT_STEP_LENGTH_DAYS)
    }

    /// 從 JSON 載入配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置步長
    pub fn with_step_length(mut self, days: i64) -> Self {
        self.step_length_days = days;
        self
    }

    /// 建構器模式：設置取整規則
    pub fn with_rounding(mut self, rounding: RoundingRule) -> Self {
        self.rounding = rounding;
        self
    }

    /// 建構器模式：設置是否並行
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 建構器模式：設置營業日曆
    pub fn with_calendar(mut self, calendar: TradingCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.horizon_length_days <= 0 {
            return Err(DepletionError::Configuration(format!(
                "推演天數必須大於 0，實際為 {}",
                self.horizon_length_days
            )));
        }
        if self.step_length_days <= 0 {
            return Err(DepletionError::Configuration(format!(
                "步長必須大於 0，實際為 {}",
                self.step_length_days
            )));
        }
        self.horizon_end().map(|_| ())
    }

    /// 推演結束日（不含）
    pub fn horizon_end(&self) -> Result<NaiveDate> {
        add_days(self.horizon_start, self.horizon_length_days)
    }

    /// 步次數量（最後一步可能不足一個步長）
    pub fn step_count(&self) -> usize {
        if self.horizon_length_days <= 0 || self.step_length_days <= 0 {
            return 0;
        }
        ((self.horizon_length_days + self.step_length_days - 1) / self.step_length_days) as usize
    }
}
