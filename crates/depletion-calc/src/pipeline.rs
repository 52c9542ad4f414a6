//! 單步、單庫存鍵的處理管線
//!
//! 每個步次對每個庫存鍵依固定順序執行 [`STEP_PIPELINE`] 中的階段。
//! 各庫存鍵之間互不共享狀態，可以並行。

use depletion_core::{
    DepletionError, ProjectionConfig, StockKey, TierReceipts, WeeklyProjection,
};
use rust_decimal::Decimal;

use crate::depletion::{DepletionCalculator, DepletionOutcome};
use crate::flow::{FlowOutcome, TwoTierFlow};
use crate::horizon::StepWindow;
use crate::ledger::TierPositions;
use crate::provider::{RateOfSaleProvider, ReceiptSchedule};
use crate::{ProjectionWarning, WarningKind};

/// 管線階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStage {
    /// 外部到貨入倉庫
    ApplyWarehouseReceipts,
    /// 直送與調撥入門店
    ApplyStoreReceipts,
    /// 計算門店銷售消耗
    Deplete,
    /// 產生週度記錄
    Record,
}

/// 固定的階段順序
pub const STEP_PIPELINE: [StepStage; 4] = [
    StepStage::ApplyWarehouseReceipts,
    StepStage::ApplyStoreReceipts,
    StepStage::Deplete,
    StepStage::Record,
];

/// 管線的外部輸入（步次內唯讀）
#[derive(Clone, Copy)]
pub struct StepInputs<'a> {
    pub config: &'a ProjectionConfig,
    pub rates: &'a dyn RateOfSaleProvider,
    pub receipts: &'a dyn ReceiptSchedule,
}

/// 單一庫存鍵在單一步次的處理結果
#[derive(Debug, Clone)]
pub struct KeyStepOutput {
    pub key: StockKey,
    pub positions: TierPositions,
    pub projection: WeeklyProjection,
    pub warnings: Vec<ProjectionWarning>,
}

/// 單一庫存鍵在單一步次的處理上下文
struct KeyStep<'a> {
    key: StockKey,
    window: &'a StepWindow,
    inputs: StepInputs<'a>,
    opening: TierPositions,
    positions: TierPositions,
    receipts: TierReceipts,
    flow: FlowOutcome,
    depletion: Option<DepletionOutcome>,
    projection: Option<WeeklyProjection>,
    warnings: Vec<ProjectionWarning>,
}

impl<'a> KeyStep<'a> {
    fn run_stage(&mut self, stage: StepStage) -> depletion_core::Result<()> {
        tracing::trace!("{} @ {}: {:?}", self.key, self.window.start, stage);

        match stage {
            StepStage::ApplyWarehouseReceipts => TwoTierFlow::apply_warehouse_receipts(
                &self.key,
                self.window,
                &mut self.positions,
                &self.receipts,
                &mut self.flow,
            ),
            StepStage::ApplyStoreReceipts => {
                TwoTierFlow::apply_store_receipts(
                    &self.key,
                    self.window,
                    &mut self.positions,
                    &self.receipts,
                    &mut self.flow,
                )?;
                if self.flow.transfer_shortfall > 0 {
                    self.warnings.push(ProjectionWarning::warning(
                        &self.key,
                        Some(self.window.start),
                        WarningKind::TransferShortfall,
                        format!(
                            "計劃調撥 {} 件，實際調撥 {} 件",
                            self.receipts.transfer, self.flow.transferred
                        ),
                    ));
                }
                Ok(())
            }
            StepStage::Deplete => {
                let raw_sales = self.raw_sales();
                let outcome = DepletionCalculator::deplete(
                    &self.key,
                    self.window,
                    self.positions.store,
                    raw_sales,
                    self.inputs.config.rounding,
                )?;
                self.positions.store.on_hand_qty = outcome.closing_qty;
                self.positions.store.fractional_carry = outcome.carry_forward;
                self.depletion = Some(outcome);
                Ok(())
            }
            StepStage::Record => {
                let depletion = self.depletion.ok_or_else(|| {
                    DepletionError::invariant(&self.key, self.window.start, "記錄階段早於消耗階段")
                })?;
                self.projection = Some(self.build_projection(&depletion));
                Ok(())
            }
        }
    }

    /// 營業日逐日累計預測需求；缺少速率的日子按零計
    fn raw_sales(&mut self) -> Decimal {
        let trading_days = self
            .inputs
            .config
            .calendar
            .trading_days_in(self.window.start, self.window.end);

        let mut missing = 0usize;
        let daily = trading_days.iter().map(|&day| {
            self.inputs.rates.rate_for(&self.key, day).unwrap_or_else(|| {
                missing += 1;
                Decimal::ZERO
            })
        });
        let raw_sales = DepletionCalculator::raw_sales(daily);

        if missing > 0 {
            tracing::info!(
                "{} @ {}: {}/{} 個營業日查無銷售速率，按零計",
                self.key,
                self.window.start,
                missing,
                trading_days.len()
            );
            self.warnings.push(ProjectionWarning::info(
                &self.key,
                Some(self.window.start),
                WarningKind::MissingRate,
                format!("{}/{} 個營業日查無銷售速率", missing, trading_days.len()),
            ));
        }

        raw_sales
    }

    fn build_projection(&self, depletion: &DepletionOutcome) -> WeeklyProjection {
        WeeklyProjection {
            location: self.key.location.clone(),
            item: self.key.item.clone(),
            step_index: self.window.index,
            week_start: self.window.start,
            week_end: self.window.last_day(),
            opening_qty: self.opening.store.on_hand_qty,
            inward_qty: self.flow.store_total_inward(),
            transferred_qty: self.flow.transferred,
            forecasted_sales_qty: depletion.sales_qty,
            closing_qty: self.positions.store.on_hand_qty,
            carry_forward: depletion.carry_forward,
            stock_out: depletion.stock_out,
            warehouse_closing_qty: self.positions.warehouse.on_hand_qty,
        }
    }
}

/// 對單一庫存鍵執行完整管線：`(期初狀態, 步次輸入) → (期末狀態, 記錄)`
pub fn run_key_step(
    key: StockKey,
    opening: TierPositions,
    window: &StepWindow,
    inputs: StepInputs<'_>,
) -> depletion_core::Result<KeyStepOutput> {
    let receipts = inputs.receipts.receipts_for(&key, window)?;

    let mut step = KeyStep {
        key,
        window,
        inputs,
        opening,
        positions: opening,
        receipts,
        flow: FlowOutcome::default(),
        depletion: None,
        projection: None,
        warnings: Vec::new(),
    };

    for stage in STEP_PIPELINE {
        step.run_stage(stage)?;
    }

    let KeyStep {
        key,
        positions,
        projection,
        warnings,
        ..
    } = step;
    let projection = projection.ok_or_else(|| {
        DepletionError::invariant(&key, window.start, "管線未產生週度記錄")
    })?;

    Ok(KeyStepOutput {
        key,
        positions,
        projection,
        warnings,
    })
}
