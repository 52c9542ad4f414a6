//! # Depletion Calculation Engine
//!
//! 庫存消耗推演引擎：按步次推進時間，逐週推算每個門店/商品的庫存

pub mod depletion;
pub mod engine;
pub mod flow;
pub mod horizon;
pub mod ledger;
pub mod pipeline;
pub mod provider;
pub mod recorder;

// Re-export 主要類型
pub use depletion::{DepletionCalculator, DepletionOutcome};
pub use engine::ProjectionEngine;
pub use flow::{FlowOutcome, TwoTierFlow};
pub use horizon::{HorizonDriver, StepWindow};
pub use ledger::{StockLedger, TierPositions};
pub use provider::{RateOfSaleProvider, RateTable, ReceiptSchedule, ReceiptTable};
pub use recorder::ProjectionRecorder;

use chrono::NaiveDate;
use depletion_core::StockKey;

/// 推演執行結果
#[derive(Debug, Clone)]
pub struct ProjectionRun {
    /// 週度推演記錄
    pub projections: ProjectionRecorder,

    /// 最後一個已完成步次之後的台帳
    pub ledger: StockLedger,

    /// 警告信息
    pub warnings: Vec<ProjectionWarning>,

    /// 已完成步次數
    pub steps_completed: usize,

    /// 是否被取消（取消前的記錄仍然有效）
    pub cancelled: bool,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ProjectionRun {
    /// 創建空的執行結果
    pub fn empty(ledger: StockLedger) -> Self {
        Self {
            projections: ProjectionRecorder::new(),
            ledger,
            warnings: Vec::new(),
            steps_completed: 0,
            cancelled: false,
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ProjectionWarning) {
        self.warnings.push(warning);
    }

    /// 指定類型的警告
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &ProjectionWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// 推演警告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionWarning {
    pub location: String,
    pub item: String,
    pub step_start: Option<NaiveDate>,
    pub kind: WarningKind,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ProjectionWarning {
    pub fn new(
        key: &StockKey,
        step_start: Option<NaiveDate>,
        kind: WarningKind,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            location: key.location.clone(),
            item: key.item.clone(),
            step_start,
            kind,
            message,
            severity,
        }
    }

    pub fn info(key: &StockKey, step_start: Option<NaiveDate>, kind: WarningKind, message: String) -> Self {
        Self::new(key, step_start, kind, message, WarningSeverity::Info)
    }

    pub fn warning(key: &StockKey, step_start: Option<NaiveDate>, kind: WarningKind, message: String) -> Self {
        Self::new(key, step_start, kind, message, WarningSeverity::Warning)
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.location.clone(), self.item.clone())
    }
}

/// 警告類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// 步次內查無銷售速率（視為零）
    MissingRate,
    /// 調撥數量超過倉庫庫存
    TransferShortfall,
    /// 推演起始日之前的到貨（併入第一步）
    OverdueReceipt,
    /// 推演結束後才到的到貨（不入庫）
    ReceiptBeyondHorizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
}
