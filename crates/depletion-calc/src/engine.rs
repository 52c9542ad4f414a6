//! 庫存消耗推演主引擎

use depletion_core::{OpeningStock, ProjectionConfig, WeeklyProjection};
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::horizon::{HorizonDriver, StepWindow};
use crate::ledger::StockLedger;
use crate::pipeline::{run_key_step, KeyStepOutput, StepInputs};
use crate::provider::{RateOfSaleProvider, ReceiptSchedule};
use crate::{ProjectionRun, ProjectionWarning, WarningKind};

/// 單一步次的結果
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 本步結束後的台帳
    pub ledger: StockLedger,
    /// 本步的週度記錄（按庫存鍵排序）
    pub projections: Vec<WeeklyProjection>,
    pub warnings: Vec<ProjectionWarning>,
}

/// 庫存消耗推演引擎
pub struct ProjectionEngine<R, S> {
    /// 推演配置
    config: ProjectionConfig,

    /// 銷售速率提供者
    rates: R,

    /// 到貨計劃
    receipts: S,
}

impl<R, S> ProjectionEngine<R, S>
where
    R: RateOfSaleProvider,
    S: ReceiptSchedule,
{
    /// 創建新的推演引擎（配置無效時立即返回錯誤）
    pub fn new(config: ProjectionConfig, rates: R, receipts: S) -> depletion_core::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rates,
            receipts,
        })
    }

    /// 推演整個時界
    pub fn run(&self, snapshot: &[OpeningStock]) -> depletion_core::Result<ProjectionRun> {
        self.run_with_cancel(snapshot, &AtomicBool::new(false))
    }

    /// 推演整個時界；每完成一步檢查一次取消旗標
    pub fn run_with_cancel(
        &self,
        snapshot: &[OpeningStock],
        cancel: &AtomicBool,
    ) -> depletion_core::Result<ProjectionRun> {
        let start_time = std::time::Instant::now();
        let driver = HorizonDriver::new(&self.config)?;

        tracing::info!(
            "開始庫存推演：期初 {} 行，{} 步，起始 {}",
            snapshot.len(),
            driver.windows().len(),
            self.config.horizon_start
        );

        let mut run = ProjectionRun::empty(StockLedger::new());
        self.report_receipts_outside_horizon(&mut run)?;

        let mut ledger = StockLedger::from_snapshot(snapshot, self.config.horizon_start)?;

        let outcome = driver.drive(|window| {
            let step = self.step(std::mem::take(&mut ledger), window)?;

            for projection in step.projections {
                run.projections.record(projection)?;
            }
            run.warnings.extend(step.warnings);
            ledger = step.ledger;

            if cancel.load(Ordering::Acquire) {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        })?;

        run.ledger = ledger;
        run.steps_completed = outcome.steps_completed;
        run.cancelled = outcome.stopped_early;
        run.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "庫存推演完成：{} 步，記錄 {} 筆，警告 {} 筆，耗時 {:?}",
            run.steps_completed,
            run.projections.len(),
            run.warnings.len(),
            start_time.elapsed()
        );

        Ok(run)
    }

    /// 推進一步：`(期初台帳, 步次視窗) → (期末台帳, 記錄)`
    pub fn step(
        &self,
        mut ledger: StockLedger,
        window: &StepWindow,
    ) -> depletion_core::Result<StepResult> {
        // 首次在到貨計劃中出現的庫存鍵
        for key in self.receipts.keys_with_receipts(window) {
            if !ledger.contains(&key) {
                tracing::debug!("{} 於 {} 首次出現", key, window.start);
                ledger.observe(key);
            }
        }

        let inputs = StepInputs {
            config: &self.config,
            rates: &self.rates,
            receipts: &self.receipts,
        };
        let entries = ledger.into_entries();

        let outputs: Vec<KeyStepOutput> = if self.config.parallel {
            entries
                .into_par_iter()
                .map(|(key, positions)| run_key_step(key, positions, window, inputs))
                .collect::<depletion_core::Result<Vec<_>>>()?
        } else {
            entries
                .into_iter()
                .map(|(key, positions)| run_key_step(key, positions, window, inputs))
                .collect::<depletion_core::Result<Vec<_>>>()?
        };

        let mut next_ledger = Vec::with_capacity(outputs.len());
        let mut projections = Vec::with_capacity(outputs.len());
        let mut warnings = Vec::new();
        for output in outputs {
            next_ledger.push((output.key, output.positions));
            projections.push(output.projection);
            warnings.extend(output.warnings);
        }

        tracing::debug!(
            "第 {} 步 [{}, {})：庫存鍵 {} 個，銷售 {} 件",
            window.index,
            window.start,
            window.end,
            projections.len(),
            projections.iter().map(|p| p.forecasted_sales_qty).sum::<i64>()
        );

        Ok(StepResult {
            ledger: next_ledger.into_iter().collect(),
            projections,
            warnings,
        })
    }

    /// 報告逾期（併入第一步）與超出時界（不入庫）的到貨
    fn report_receipts_outside_horizon(&self, run: &mut ProjectionRun) -> depletion_core::Result<()> {
        let start = self.config.horizon_start;
        let end = self.config.horizon_end()?;

        for event in self.receipts.events_outside(start, end) {
            let key = event.key();
            if event.effective_week < start {
                run.add_warning(ProjectionWarning::info(
                    &key,
                    Some(start),
                    WarningKind::OverdueReceipt,
                    format!("{} 的到貨 {} 件併入第一步", event.effective_week, event.quantity),
                ));
            } else {
                tracing::warn!(
                    "{}: {} 的到貨 {} 件在推演結束 {} 之後，不會入庫",
                    key,
                    event.effective_week,
                    event.quantity,
                    end
                );
                run.add_warning(ProjectionWarning::warning(
                    &key,
                    None,
                    WarningKind::ReceiptBeyondHorizon,
                    format!("{} 的到貨 {} 件超出推演時界", event.effective_week, event.quantity),
                ));
            }
        }

        Ok(())
    }

    /// 獲取推演配置引用
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }
}
