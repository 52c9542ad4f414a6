//! 推演時界與步次視窗

use chrono::NaiveDate;
use depletion_core::calendar::add_days;
use depletion_core::{DepletionError, ProjectionConfig};
use std::ops::ControlFlow;

/// 單一步次視窗 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepWindow {
    /// 步次序號
    pub index: usize,
    /// 起始日（含）
    pub start: NaiveDate,
    /// 結束日（不含）
    pub end: NaiveDate,
}

impl StepWindow {
    pub fn new(index: usize, start: NaiveDate, end: NaiveDate) -> Self {
        Self { index, start, end }
    }

    /// 視窗天數
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// 視窗最後一天（含）
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }
}

/// 時界驅動的執行結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveOutcome {
    /// 已完成的步次數
    pub steps_completed: usize,
    /// 是否提前停止
    pub stopped_early: bool,
}

/// 時界驅動器：按順序產生步次視窗並逐一處理
#[derive(Debug, Clone)]
pub struct HorizonDriver {
    windows: Vec<StepWindow>,
}

impl HorizonDriver {
    /// 根據配置建立步次視窗
    pub fn new(config: &ProjectionConfig) -> depletion_core::Result<Self> {
        config.validate()?;

        let horizon_end = config.horizon_end()?;
        let mut windows = Vec::with_capacity(config.step_count());
        let mut current = config.horizon_start;

        while current < horizon_end {
            let next = add_days(current, config.step_length_days)?.min(horizon_end);
            windows.push(StepWindow::new(windows.len(), current, next));
            current = next;
        }

        tracing::debug!(
            "時界 {} ~ {}，步長 {} 天，共 {} 步",
            config.horizon_start,
            horizon_end,
            config.step_length_days,
            windows.len()
        );

        Ok(Self { windows })
    }

    /// 所有步次視窗
    pub fn windows(&self) -> &[StepWindow] {
        &self.windows
    }

    /// 依序處理每個視窗；回呼返回 `Break` 時於該步完成後停止
    pub fn drive<F>(&self, mut process_step: F) -> depletion_core::Result<DriveOutcome>
    where
        F: FnMut(&StepWindow) -> depletion_core::Result<ControlFlow<()>>,
    {
        let mut previous_end: Option<NaiveDate> = None;
        let mut steps_completed = 0;

        for window in &self.windows {
            if window.end <= window.start || previous_end.is_some_and(|end| end != window.start) {
                return Err(DepletionError::Configuration(format!(
                    "步次視窗不連續: #{} [{}, {})",
                    window.index, window.start, window.end
                )));
            }

            let flow = process_step(window)?;
            steps_completed += 1;
            previous_end = Some(window.end);

            if flow.is_break() {
                tracing::info!("推演於第 {} 步後停止", steps_completed);
                return Ok(DriveOutcome {
                    steps_completed,
                    stopped_early: steps_completed < self.windows.len(),
                });
            }
        }

        Ok(DriveOutcome {
            steps_completed,
            stopped_early: false,
        })
    }
}
