//! 銷售消耗計算
//!
//! 每一步的預測銷售只能以整數件離開庫存，未實現的小數部分（以及因缺貨
//! 未能滿足的需求）以餘數形式結轉到下一步，使長期平均消耗等於
//! `每日速率 × 天數`。

use depletion_core::{DepletionError, RoundingRule, StockKey, StockPosition};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::horizon::StepWindow;

/// 單步消耗結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepletionOutcome {
    /// 本步可售庫存
    pub available_qty: i64,
    /// 本步原始預測需求（未含餘數）
    pub raw_sales: Decimal,
    /// 本步實際銷售（整數件）
    pub sales_qty: i64,
    /// 期末庫存
    pub closing_qty: i64,
    /// 結轉餘數
    pub carry_forward: Decimal,
    /// 取整後的需求超過可售庫存（缺貨）
    pub stock_out: bool,
}

/// 銷售消耗計算器
pub struct DepletionCalculator;

impl DepletionCalculator {
    /// 計算單一庫存鍵在單一步次的銷售與期末庫存
    ///
    /// `position.on_hand_qty` 為本步已入庫後的可售庫存；`raw_sales` 為本步
    /// 按每日速率累計的預測需求。
    pub fn deplete(
        key: &StockKey,
        window: &StepWindow,
        position: StockPosition,
        raw_sales: Decimal,
        rounding: RoundingRule,
    ) -> depletion_core::Result<DepletionOutcome> {
        let available_qty = position.on_hand_qty;
        if available_qty < 0 {
            return Err(DepletionError::invariant(
                key,
                window.start,
                format!("期初庫存為負: {}", available_qty),
            ));
        }

        // 前期餘數加回本期需求
        let carried_sales = position.fractional_carry + raw_sales;

        // 負的累計需求不產生負銷售
        let rounded = rounding.round(carried_sales).max(Decimal::ZERO);
        let (sales_qty, stock_out) = match rounded.to_i64() {
            Some(qty) => (qty.min(available_qty), qty > available_qty),
            None => (available_qty, true),
        };

        let closing_qty = available_qty - sales_qty;
        let carry_forward = carried_sales - Decimal::from(sales_qty);

        Ok(DepletionOutcome {
            available_qty,
            raw_sales,
            sales_qty,
            closing_qty,
            carry_forward,
            stock_out,
        })
    }

    /// 按營業日累計的原始預測需求
    pub fn raw_sales<I>(daily_rates: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        daily_rates.into_iter().sum()
    }
}
