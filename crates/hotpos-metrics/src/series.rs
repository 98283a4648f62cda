//! # Time Series Aggregator
//!
//! Fetches every in-scope branch's sales for a trailing window and buckets
//! them into one row per calendar day.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use hotpos_core::series::{build_series, BranchSales, DateRange, SalesSeries};
use hotpos_core::Scope;

use crate::catalog::BranchCatalog;
use crate::source::fan_out;

/// Daily sales per branch over a trailing window.
pub struct TimeSeriesAggregator {
    catalog: Arc<BranchCatalog>,
    fetch_timeout: Duration,
}

impl TimeSeriesAggregator {
    pub fn new(catalog: Arc<BranchCatalog>, fetch_timeout: Duration) -> Self {
        TimeSeriesAggregator {
            catalog,
            fetch_timeout,
        }
    }

    /// The `days`-long series ending today in the viewer's local calendar.
    pub async fn build_series(&self, scope: Scope, days: u32) -> SalesSeries {
        self.build_series_ending(scope, days, Local::now().date_naive())
            .await
    }

    /// The `days`-long series ending on `today`.
    ///
    /// Never fails: branches whose fetch fails are present with zeros and
    /// `FetchStatus::Failed`. Zero days yields an empty series without
    /// touching the network.
    pub async fn build_series_ending(&self, scope: Scope, days: u32, today: NaiveDate) -> SalesSeries {
        let Some(range) = DateRange::ending(today, days) else {
            debug!("Zero-day series requested");
            return SalesSeries::empty();
        };

        let branches = self.catalog.resolve(scope).await;
        let source = self.catalog.source();
        let outcomes = fan_out(&branches, self.fetch_timeout, |id| {
            source.sales_in_range(id, range.start, range.end)
        })
        .await;

        let inputs: Vec<BranchSales<'_>> = outcomes
            .iter()
            .map(|outcome| BranchSales {
                branch: &outcome.branch,
                status: outcome.status(),
                sales: outcome.items(),
            })
            .collect();

        let series = build_series(range, &inputs);
        info!(
            scope = %scope,
            days = days,
            branches = series.branches.len(),
            failed = series.failed_branches().count(),
            "Sales series built"
        );
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope_store::MemoryScopeStore;
    use crate::source::fake::FakeSource;
    use hotpos_core::series::{FetchStatus, BRANCH_COLORS};
    use hotpos_core::{Branch, BranchId, Money, SaleRecord};
    use std::sync::atomic::Ordering;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale(branch: i64, when: &str, cents: i64) -> SaleRecord {
        SaleRecord {
            id: 0,
            branch_id: BranchId(branch),
            sale_date: when.into(),
            grand_total: Money::from_cents(cents),
        }
    }

    async fn aggregator(source: FakeSource) -> (TimeSeriesAggregator, Arc<FakeSource>) {
        let source = Arc::new(source);
        let catalog = Arc::new(BranchCatalog::new(source.clone(), Arc::new(MemoryScopeStore::new())));
        let _ = catalog.load_branches().await;
        (TimeSeriesAggregator::new(catalog, Duration::from_secs(15)), source)
    }

    fn two_branches() -> FakeSource {
        let mut source = FakeSource::with_branches(vec![
            Branch::new(1, "Ntinda", "NT"),
            Branch::new(2, "Kireka", "KR"),
        ]);
        source.sales.insert(
            BranchId(1),
            vec![sale(1, "2026-10-18T10:00:00", 1000), sale(1, "2026-10-19T09:00:00", 250)],
        );
        source.sales.insert(BranchId(2), vec![sale(2, "2026-10-19T11:00:00", 700)]);
        source
    }

    #[tokio::test]
    async fn test_company_series_is_dense() {
        let (agg, _) = aggregator(two_branches()).await;
        let series = agg
            .build_series_ending(Scope::CompanyWide, 30, date(2026, 10, 19))
            .await;

        assert_eq!(series.rows.len(), 30);
        assert!(series.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.rows.iter().all(|r| r.totals.len() == 2));
        assert_eq!(series.rows[29].total_for(BranchId(1)).cents(), 250);
        assert_eq!(series.rows[28].total_for(BranchId(1)).cents(), 1000);
        assert_eq!(series.rows[29].day_total().cents(), 950);
    }

    #[tokio::test]
    async fn test_failing_branch_is_zero_filled() {
        let mut source = two_branches();
        source.failing.insert(BranchId(2));
        let (agg, _) = aggregator(source).await;

        let series = agg
            .build_series_ending(Scope::CompanyWide, 7, date(2026, 10, 19))
            .await;

        assert_eq!(series.rows.len(), 7);
        assert_eq!(series.branches[1].status, FetchStatus::Failed);
        assert!(series.rows.iter().all(|r| r.total_for(BranchId(2)).is_zero()));
        assert!(series.rows.iter().all(|r| r.totals.contains_key(&BranchId(2))));
        assert_eq!(series.branch_total(BranchId(1)).cents(), 1250);
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_output() {
        let (agg, _) = aggregator(two_branches()).await;
        let a = agg.build_series_ending(Scope::CompanyWide, 5, date(2026, 10, 19)).await;
        let b = agg.build_series_ending(Scope::CompanyWide, 5, date(2026, 10, 19)).await;
        assert_eq!(a, b);
        assert_eq!(a.branches[0].color, BRANCH_COLORS[0]);
        assert_eq!(a.branches[1].color, BRANCH_COLORS[1]);
    }

    #[tokio::test]
    async fn test_single_branch_unknown_id_gets_placeholder() {
        let (agg, _) = aggregator(two_branches()).await;
        let series = agg
            .build_series_ending(Scope::SingleBranch(BranchId(42)), 3, date(2026, 10, 19))
            .await;

        assert_eq!(series.branches.len(), 1);
        assert_eq!(series.branches[0].name, "Branch");
        assert_eq!(series.branches[0].status, FetchStatus::Empty);
        assert_eq!(series.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_days_skips_fetching() {
        let (agg, source) = aggregator(two_branches()).await;
        let series = agg
            .build_series_ending(Scope::CompanyWide, 0, date(2026, 10, 19))
            .await;
        assert!(series.rows.is_empty());
        assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalog_down_gives_empty_series_rows() {
        let (agg, _) = aggregator(FakeSource::default()).await;
        let series = agg
            .build_series_ending(Scope::CompanyWide, 4, date(2026, 10, 19))
            .await;
        assert!(series.branches.is_empty());
        assert_eq!(series.rows.len(), 4);
        assert!(series.rows.iter().all(|r| r.totals.is_empty()));
    }
}
