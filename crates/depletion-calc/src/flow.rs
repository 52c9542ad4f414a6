//! 兩層庫存流轉（倉庫 → 門店）

use depletion_core::{DepletionError, StockKey, TierReceipts};

use crate::horizon::StepWindow;
use crate::ledger::TierPositions;

/// 單步流轉結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowOutcome {
    /// 外部到倉庫數量
    pub warehouse_inward: i64,
    /// 外部直送門店數量
    pub store_inward: i64,
    /// 實際調撥到門店的數量
    pub transferred: i64,
    /// 計劃調撥但倉庫庫存不足的數量
    pub transfer_shortfall: i64,
}

impl FlowOutcome {
    /// 門店本步入庫總量
    pub fn store_total_inward(&self) -> i64 {
        self.store_inward + self.transferred
    }
}

/// 兩層流轉解析器
///
/// 同一步內固定順序：先入倉庫，再入門店（含調撥）。倉庫不發生銷售，
/// 剩餘庫存原樣成為下一步的倉庫期初。
pub struct TwoTierFlow;

impl TwoTierFlow {
    /// 第一階段：外部到貨入倉庫
    pub fn apply_warehouse_receipts(
        key: &StockKey,
        window: &StepWindow,
        positions: &mut TierPositions,
        receipts: &TierReceipts,
        outcome: &mut FlowOutcome,
    ) -> depletion_core::Result<()> {
        if positions.warehouse.on_hand_qty < 0 {
            return Err(DepletionError::invariant(
                key,
                window.start,
                format!("倉庫期初庫存為負: {}", positions.warehouse.on_hand_qty),
            ));
        }

        let opening = positions.warehouse.on_hand_qty;
        positions.warehouse.on_hand_qty =
            opening.checked_add(receipts.warehouse).ok_or_else(|| {
                DepletionError::invariant(
                    key,
                    window.start,
                    format!("倉庫庫存溢位: {} + {}", opening, receipts.warehouse),
                )
            })?;
        outcome.warehouse_inward = receipts.warehouse;
        Ok(())
    }

    /// 第二階段：直送到貨與倉庫調撥入門店
    pub fn apply_store_receipts(
        key: &StockKey,
        window: &StepWindow,
        positions: &mut TierPositions,
        receipts: &TierReceipts,
        outcome: &mut FlowOutcome,
    ) -> depletion_core::Result<()> {
        if positions.store.on_hand_qty < 0 {
            return Err(DepletionError::invariant(
                key,
                window.start,
                format!("門店期初庫存為負: {}", positions.store.on_hand_qty),
            ));
        }

        let transferred = receipts.transfer.min(positions.warehouse.on_hand_qty);
        let shortfall = receipts.transfer - transferred;
        if shortfall > 0 {
            tracing::warn!(
                "{} @ {}: 調撥 {} 件，倉庫僅有 {} 件",
                key,
                window.start,
                receipts.transfer,
                positions.warehouse.on_hand_qty
            );
        }

        let store_closing = receipts
            .store
            .checked_add(transferred)
            .and_then(|inward| positions.store.on_hand_qty.checked_add(inward))
            .ok_or_else(|| {
                DepletionError::invariant(
                    key,
                    window.start,
                    format!(
                        "門店庫存溢位: {} + {} + {}",
                        positions.store.on_hand_qty, receipts.store, transferred
                    ),
                )
            })?;

        positions.warehouse.on_hand_qty -= transferred;
        positions.store.on_hand_qty = store_closing;

        outcome.store_inward = receipts.store;
        outcome.transferred = transferred;
        outcome.transfer_shortfall = shortfall;
        Ok(())
    }
}
