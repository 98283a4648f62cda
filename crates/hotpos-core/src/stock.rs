//! # Low-Stock Consolidation
//!
//! Merges per-branch low-stock lists into one list ordered by how little is
//! left, and derives the status badge shown next to each row.
//!
//! ## Status Ladder
//! ```text
//! fill = quantity / reorder_level × 100
//!
//!   0% ──────── 25% ──────── 50% ─────────── 100% ─────────►
//!   │ Critical  │    Low     │    Warning     │     Ok
//!
//! reorder_level = 0  →  fill counts as 100% (Warning)
//! ```
//! Status is display-only. Ordering always uses the raw quantity, so a
//! "Warning" row with 3 units sorts ahead of a "Critical" row with 5.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{BranchId, StockLevelRecord};

/// Default number of rows kept after consolidation.
pub const DEFAULT_LOW_STOCK_CAP: usize = 20;

// =============================================================================
// Stock Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockStatus {
    Critical,
    Low,
    Warning,
    Ok,
}

impl StockStatus {
    /// Classifies a stock position against its reorder threshold.
    ///
    /// ```rust
    /// use hotpos_core::stock::StockStatus;
    ///
    /// assert_eq!(StockStatus::classify(2, 10), StockStatus::Critical);
    /// assert_eq!(StockStatus::classify(5, 10), StockStatus::Low);
    /// assert_eq!(StockStatus::classify(10, 10), StockStatus::Warning);
    /// assert_eq!(StockStatus::classify(3, 0), StockStatus::Warning);
    /// ```
    pub fn classify(quantity: i64, reorder_level: i64) -> Self {
        // Integer comparisons against the percentage thresholds:
        // q/r ≤ 1/4  ⇔  4q ≤ r, and so on.
        if reorder_level <= 0 {
            return StockStatus::Warning;
        }
        let q = i128::from(quantity);
        let r = i128::from(reorder_level);
        if q * 4 <= r {
            StockStatus::Critical
        } else if q * 2 <= r {
            StockStatus::Low
        } else if q <= r {
            StockStatus::Warning
        } else {
            StockStatus::Ok
        }
    }

    #[inline]
    pub fn is_critical(&self) -> bool {
        matches!(self, StockStatus::Critical)
    }
}

/// Fill percentage for the progress bar, clamped to 0..=100.
pub fn fill_pct(quantity: i64, reorder_level: i64) -> f64 {
    if reorder_level <= 0 {
        return 100.0;
    }
    let pct = quantity as f64 / reorder_level as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

// =============================================================================
// Low Stock Row
// =============================================================================

/// One product at one branch, ready for the low-stock table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LowStockRow {
    pub branch_id: BranchId,
    pub branch_name: String,
    pub product_id: i64,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i64,
    pub reorder_level: i64,
    pub status: StockStatus,
    pub fill_pct: f64,

    /// quantity × cost price.
    pub stock_value: Money,
}

impl From<&StockLevelRecord> for LowStockRow {
    fn from(record: &StockLevelRecord) -> Self {
        LowStockRow {
            branch_id: record.branch_id,
            branch_name: record.branch_name.clone(),
            product_id: record.product_id,
            product_name: record.product_name.clone(),
            product_sku: record.product_sku.clone(),
            quantity: record.quantity,
            reorder_level: record.reorder_level,
            status: StockStatus::classify(record.quantity, record.reorder_level),
            fill_pct: fill_pct(record.quantity, record.reorder_level),
            stock_value: record.cost_price.multiply_quantity(record.quantity),
        }
    }
}

// =============================================================================
// Consolidation
// =============================================================================

/// Sorts rows ascending by quantity and keeps the first `cap`.
///
/// The sort is stable, so rows with equal quantity keep the order of the
/// input (branch resolution order, then the order each branch returned).
pub fn consolidate(records: &[StockLevelRecord], cap: usize) -> Vec<LowStockRow> {
    let mut rows: Vec<LowStockRow> = records.iter().map(LowStockRow::from).collect();
    rows.sort_by_key(|row| row.quantity);
    rows.truncate(cap);
    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
