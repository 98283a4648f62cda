//! # Ranking Aggregator
//!
//! Fetches summary stats for every active branch and ranks them. Only
//! meaningful company-wide; a single-branch scope yields an empty ranking.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use hotpos_core::ranking::{rank, BranchRanking, RankingMetric};
use hotpos_core::{Branch, BranchId, BranchStats, Scope};

use crate::catalog::BranchCatalog;
use crate::error::MetricsError;
use crate::source::fan_out;

/// Top and bottom performers across branches.
pub struct RankingAggregator {
    catalog: Arc<BranchCatalog>,
    fetch_timeout: Duration,
    size: usize,
}

impl RankingAggregator {
    pub fn new(catalog: Arc<BranchCatalog>, fetch_timeout: Duration, size: usize) -> Self {
        RankingAggregator {
            catalog,
            fetch_timeout,
            size,
        }
    }

    /// Ranks every active branch by `metric`.
    ///
    /// Branches whose stats cannot be fetched are listed in `excluded`
    /// rather than ranked as zero.
    pub async fn rank_branches(&self, scope: Scope, metric: RankingMetric) -> BranchRanking {
        if let Scope::SingleBranch(id) = scope {
            let reason = MetricsError::UnsupportedOperation(format!(
                "ranking needs the company view (scope is branch {id})"
            ));
            debug!(error = %reason, "Skipping ranking");
            return BranchRanking::empty(metric);
        }

        let branches = self.catalog.resolve(scope).await;
        let source = self.catalog.source();
        let outcomes = fan_out(&branches, self.fetch_timeout, |id| {
            source.dashboard_stats(Some(id))
        })
        .await;

        let mut entries: Vec<(Branch, BranchStats)> = Vec::with_capacity(outcomes.len());
        let mut excluded: Vec<BranchId> = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(stats) => entries.push((outcome.branch, stats)),
                Err(_) => excluded.push(outcome.branch.id),
            }
        }

        let ranking = rank(&entries, metric, self.size, excluded);
        info!(
            metric = %metric,
            ranked = ranking.ranked.len(),
            excluded = ranking.excluded.len(),
            "Branch ranking built"
        );
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope_store::MemoryScopeStore;
    use crate::source::fake::FakeSource;
    use hotpos_core::Money;

    fn stats(month: i64, year: i64) -> BranchStats {
        BranchStats {
            total_sales_this_month: Money::from_cents(month),
            total_sales_this_year: Money::from_cents(year),
            ..Default::default()
        }
    }

    async fn aggregator(source: FakeSource) -> RankingAggregator {
        let catalog = Arc::new(BranchCatalog::new(
            Arc::new(source),
            Arc::new(MemoryScopeStore::new()),
        ));
        let _ = catalog.load_branches().await;
        RankingAggregator::new(catalog, Duration::from_secs(15), 3)
    }

    fn source() -> FakeSource {
        let mut source = FakeSource::with_branches(vec![
            Branch::new(1, "A", "A"),
            Branch::new(2, "B", "B"),
            Branch::new(3, "C", "C"),
            Branch::new(4, "D", "D"),
        ]);
        source.stats.insert(BranchId(1), stats(100, 0));
        source.stats.insert(BranchId(2), stats(300, 0));
        source.stats.insert(BranchId(3), stats(200, 0));
        source.stats.insert(BranchId(4), stats(50, 1200));
        source
    }

    #[tokio::test]
    async fn test_company_ranking() {
        let agg = aggregator(source()).await;
        let ranking = agg.rank_branches(Scope::CompanyWide, RankingMetric::MonthRevenue).await;

        let top: Vec<&str> = ranking.top.iter().map(|r| r.name.as_str()).collect();
        let bottom: Vec<&str> = ranking.bottom.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(top, vec!["B", "C", "A"]);
        assert_eq!(bottom, vec!["D", "A", "C"]);
        assert!(ranking.top.iter().all(|r| r.growth_pct == 0.0));
        // D: 50 this month against a 100/month average.
        assert!((ranking.bottom[0].growth_pct + 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_branch_is_excluded_not_zeroed() {
        let mut source = source();
        source.failing.insert(BranchId(2));
        let agg = aggregator(source).await;

        let ranking = agg.rank_branches(Scope::CompanyWide, RankingMetric::MonthRevenue).await;
        assert_eq!(ranking.excluded, vec![BranchId(2)]);
        assert_eq!(ranking.ranked.len(), 3);
        assert!(ranking.ranked.iter().all(|r| r.branch_id != BranchId(2)));
    }

    #[tokio::test]
    async fn test_single_branch_scope_is_empty() {
        let agg = aggregator(source()).await;
        let ranking = agg
            .rank_branches(Scope::SingleBranch(BranchId(1)), RankingMetric::MonthRevenue)
            .await;
        assert!(ranking.top.is_empty());
        assert!(ranking.bottom.is_empty());
        assert!(ranking.is_empty());
    }
}
