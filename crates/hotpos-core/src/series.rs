//! # Daily Sales Series
//!
//! Pure bucketing of per-branch sale records into a dense, one-row-per-day
//! chart table.
//!
//! ## Shape of the Output
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    SalesSeries (days = 4, 2 branches)                   │
//! │                                                                         │
//! │  branches: [ {id: 1, "Ntinda", #8b5cf6}, {id: 2, "Kireka", #f59e0b} ]   │
//! │                                                                         │
//! │  rows:                                                                  │
//! │  ┌────────────┬───────────────┬───────────────┐                         │
//! │  │ date       │ totals[1]     │ totals[2]     │                         │
//! │  ├────────────┼───────────────┼───────────────┤                         │
//! │  │ 2026-10-16 │ 120000        │ 0             │  ◄── no sales = 0       │
//! │  │ 2026-10-17 │ 0             │ 0             │  ◄── still present      │
//! │  │ 2026-10-18 │ 45050         │ 98000         │                         │
//! │  │ 2026-10-19 │ 3000          │ 0             │  ◄── failed fetch = 0   │
//! │  └────────────┴───────────────┴───────────────┘                         │
//! │                                                                         │
//! │  Columns are keyed by BranchId, never by display name: two branches     │
//! │  called "Main" stay two columns.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Calendar Rules
//! - The range is inclusive and anchored on a caller-supplied local date
//! - A sale lands in the bucket whose `YYYY-MM-DD` key prefixes its
//!   `sale_date` text; no timezone conversion happens here

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Branch, BranchId, SaleRecord};

// =============================================================================
// Constants
// =============================================================================

/// Default number of days shown on the sales chart.
pub const DEFAULT_SERIES_DAYS: u32 = 30;

/// Fixed chart palette. Colors are assigned by resolution order and cycle.
pub const BRANCH_COLORS: [&str; 10] = [
    "#8b5cf6", // violet
    "#f59e0b", // amber
    "#10b981", // emerald
    "#3b82f6", // blue
    "#ef4444", // red
    "#ec4899", // pink
    "#06b6d4", // cyan
    "#f97316", // orange
    "#14b8a6", // teal
    "#a855f7", // purple
];

/// Palette color for the branch at `index` in resolution order.
#[inline]
pub fn color_for(index: usize) -> &'static str {
    BRANCH_COLORS[index % BRANCH_COLORS.len()]
}

/// Calendar key used for bucketing (`2026-10-19`).
#[inline]
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days`-long range ending on `today`
    /// (`today - (days - 1) ..= today`). `None` when `days` is zero.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use hotpos_core::series::DateRange;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let range = DateRange::ending(today, 3).unwrap();
    /// assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
    /// assert_eq!(range.dates().len(), 3);
    /// ```
    pub fn ending(today: NaiveDate, days: u32) -> Option<Self> {
        let back = days.checked_sub(1)?;
        let start = today.checked_sub_days(Days::new(u64::from(back)))?;
        Some(DateRange { start, end: today })
    }

    /// Every date in the range, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// Number of days in the range.
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}

// =============================================================================
// View Models
// =============================================================================

/// How one branch's fetch settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FetchStatus {
    /// The fetch succeeded and returned records.
    Data,
    /// The fetch succeeded with nothing to report.
    Empty,
    /// The fetch failed; the branch contributes zeros.
    Failed,
}

/// Column descriptor for one branch in a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SeriesBranch {
    pub id: BranchId,
    pub name: String,
    pub code: String,
    pub color: String,
    pub status: FetchStatus,
}

/// One calendar day across every branch in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChartRow {
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// One entry per branch in scope, zero when the branch had no sales.
    pub totals: BTreeMap<BranchId, Money>,
}

impl ChartRow {
    /// Total for one branch; zero for a branch outside the scope.
    pub fn total_for(&self, id: BranchId) -> Money {
        self.totals.get(&id).copied().unwrap_or_default()
    }

    /// Sum across all branches for the day.
    pub fn day_total(&self) -> Money {
        self.totals.values().sum()
    }
}

/// The complete chart payload: column descriptors plus dense rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSeries {
    /// Columns in resolution (catalog) order.
    pub branches: Vec<SeriesBranch>,

    /// Ascending, one per day.
    pub rows: Vec<ChartRow>,
}

impl SalesSeries {
    /// A series with no columns and no rows.
    pub fn empty() -> Self {
        SalesSeries {
            branches: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Total over the whole range for one branch.
    pub fn branch_total(&self, id: BranchId) -> Money {
        self.rows.iter().map(|row| row.total_for(id)).sum()
    }

    /// Branches whose fetch failed.
    pub fn failed_branches(&self) -> impl Iterator<Item = &SeriesBranch> {
        self.branches
            .iter()
            .filter(|b| b.status == FetchStatus::Failed)
    }
}

// =============================================================================
// Bucketing
// =============================================================================

/// One branch's fetched input to [`build_series`].
#[derive(Debug, Clone, Copy)]
pub struct BranchSales<'a> {
    pub branch: &'a Branch,
    pub status: FetchStatus,
    pub sales: &'a [SaleRecord],
}

/// Sums each branch's sales per calendar day.
///
/// Only the first ten characters of `sale_date` are compared, which is the
/// same as a prefix match against a `YYYY-MM-DD` key.
fn daily_totals(sales: &[SaleRecord]) -> HashMap<&str, Money> {
    let mut totals: HashMap<&str, Money> = HashMap::new();
    for sale in sales {
        if let Some(day) = sale.sale_date.get(..10) {
            *totals.entry(day).or_default() += sale.grand_total;
        }
    }
    totals
}

/// Builds the dense series for `range` from per-branch inputs.
///
/// Every cell is at least zero: a day whose sales net out negative
/// renders as zero.
///
/// Column order and colors follow `inputs` order exactly, so callers that
/// pass branches in catalog order get the same colors on every call.
pub fn build_series(range: DateRange, inputs: &[BranchSales<'_>]) -> SalesSeries {
    let branches: Vec<SeriesBranch> = inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| SeriesBranch {
            id: input.branch.id,
            name: input.branch.name.clone(),
            code: input.branch.code.clone(),
            color: color_for(idx).to_string(),
            status: input.status,
        })
        .collect();

    let per_branch: Vec<(BranchId, HashMap<&str, Money>)> = inputs
        .iter()
        .map(|input| (input.branch.id, daily_totals(input.sales)))
        .collect();

    let rows = range
        .dates()
        .into_iter()
        .map(|date| {
            let key = day_key(date);
            let totals = per_branch
                .iter()
                .map(|(id, days)| {
                    let total = days.get(key.as_str()).copied().unwrap_or_default();
                    (*id, total.max(Money::default()))
                })
                .collect();
            ChartRow { date, totals }
        })
        .collect();

    SalesSeries { branches, rows }
}

// =============================================================================
// Unit Tests
// =============================================================================
