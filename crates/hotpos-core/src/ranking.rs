//! # Branch Ranking
//!
//! Orders branches by a revenue metric and derives a growth figure from each
//! branch's own summary statistics.
//!
//! ## Growth Formula
//! ```text
//! growth % = (month / (year / 12) - 1) × 100     when year > 0
//!          = 0                                   otherwise
//! ```
//! The baseline assumes revenue is spread evenly over the year, so seasonal
//! or newly opened branches read high. The formula is kept as-is; only the
//! divide-by-zero case is defined.
//!
//! ## Top / Bottom Selection
//! ```text
//! ranked (descending):  B 300 ─ C 200 ─ A 100 ─ D 50 ─ E 10
//!                       └──── top 3 ────┘
//!                                    └─── last 3 ───┘
//! bottom = last 3 reversed:  E 10, D 50, A 100
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{Branch, BranchId, BranchStats};

/// Default length of the top and bottom lists.
pub const DEFAULT_RANKING_SIZE: usize = 3;

// =============================================================================
// Ranking Metric
// =============================================================================

/// The statistic branches are ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RankingMetric {
    TodayRevenue,
    #[default]
    MonthRevenue,
    YearRevenue,
    AverageTransactionValue,
}

impl RankingMetric {
    /// Reads this metric out of a branch's stats.
    pub fn value(&self, stats: &BranchStats) -> Money {
        match self {
            RankingMetric::TodayRevenue => stats.total_sales_today,
            RankingMetric::MonthRevenue => stats.total_sales_this_month,
            RankingMetric::YearRevenue => stats.total_sales_this_year,
            RankingMetric::AverageTransactionValue => stats.average_transaction_value,
        }
    }

    /// Human label for cards.
    pub fn label(&self) -> &'static str {
        match self {
            RankingMetric::TodayRevenue => "Revenue today",
            RankingMetric::MonthRevenue => "Revenue",
            RankingMetric::YearRevenue => "Revenue this year",
            RankingMetric::AverageTransactionValue => "Average sale",
        }
    }
}

impl fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingMetric::TodayRevenue => write!(f, "today"),
            RankingMetric::MonthRevenue => write!(f, "month"),
            RankingMetric::YearRevenue => write!(f, "year"),
            RankingMetric::AverageTransactionValue => write!(f, "average"),
        }
    }
}

impl FromStr for RankingMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "today" => Ok(RankingMetric::TodayRevenue),
            "month" => Ok(RankingMetric::MonthRevenue),
            "year" => Ok(RankingMetric::YearRevenue),
            "average" | "avg" => Ok(RankingMetric::AverageTransactionValue),
            other => Err(CoreError::InvalidMetric(other.to_string())),
        }
    }
}

// =============================================================================
// Growth
// =============================================================================

/// Month revenue relative to the year's average month, in percent.
///
/// ```rust
/// use hotpos_core::money::Money;
/// use hotpos_core::ranking::growth_pct;
///
/// // 12,000 this year → 1,000 per month; 1,500 this month → +50%.
/// let g = growth_pct(Money::from_cents(150_000), Money::from_cents(1_200_000));
/// assert!((g - 50.0).abs() < 1e-9);
///
/// assert_eq!(growth_pct(Money::from_cents(500), Money::zero()), 0.0);
/// ```
pub fn growth_pct(month: Money, year: Money) -> f64 {
    if !year.is_positive() {
        return 0.0;
    }
    let baseline = year.as_major_f64() / 12.0;
    (month.as_major_f64() / baseline - 1.0) * 100.0
}

// =============================================================================
// View Models
// =============================================================================

/// One branch's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RankedBranch {
    pub branch_id: BranchId,
    pub name: String,
    pub code: String,
    pub metric: RankingMetric,
    pub value: Money,
    pub growth_pct: f64,
}

/// Ranking result for the comparison view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BranchRanking {
    pub metric: RankingMetric,

    /// Best performers, best first.
    pub top: Vec<RankedBranch>,

    /// Worst performers, worst first.
    pub bottom: Vec<RankedBranch>,

    /// Every ranked branch, best first.
    pub ranked: Vec<RankedBranch>,

    /// Branches left out because their stats could not be fetched.
    pub excluded: Vec<BranchId>,
}

impl BranchRanking {
    /// No ranking (single-branch scope or no data).
    pub fn empty(metric: RankingMetric) -> Self {
        BranchRanking {
            metric,
            top: Vec::new(),
            bottom: Vec::new(),
            ranked: Vec::new(),
            excluded: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Ranks the given branches by `metric`, descending.
///
/// The sort is stable: branches with equal values keep the order they were
/// passed in (catalog order). Only branches with stats should be passed;
/// failed fetches belong in `excluded`, not here as zeros.
pub fn rank(
    entries: &[(Branch, BranchStats)],
    metric: RankingMetric,
    size: usize,
    excluded: Vec<BranchId>,
) -> BranchRanking {
    let mut ranked: Vec<RankedBranch> = entries
        .iter()
        .map(|(branch, stats)| RankedBranch {
            branch_id: branch.id,
            name: branch.name.clone(),
            code: branch.code.clone(),
            metric,
            value: metric.value(stats),
            growth_pct: growth_pct(stats.total_sales_this_month, stats.total_sales_this_year),
        })
        .collect();

    ranked.sort_by(|a, b| b.value.cmp(&a.value));

    let top = ranked.iter().take(size).cloned().collect();
    let bottom = ranked
        .iter()
        .skip(ranked.len().saturating_sub(size))
        .rev()
        .cloned()
        .collect();

    BranchRanking {
        metric,
        top,
        bottom,
        ranked,
        excluded,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
