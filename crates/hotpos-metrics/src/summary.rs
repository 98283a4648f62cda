//! # Summary Statistics
//!
//! The headline cards (sales today / this month / this year, transaction
//! counts, expenses, profit) for the current scope.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use hotpos_core::{BranchStats, Scope};

use crate::catalog::BranchCatalog;
use crate::error::MetricsError;

pub struct SummaryAggregator {
    catalog: Arc<BranchCatalog>,
    fetch_timeout: Duration,
}

impl SummaryAggregator {
    pub fn new(catalog: Arc<BranchCatalog>, fetch_timeout: Duration) -> Self {
        SummaryAggregator {
            catalog,
            fetch_timeout,
        }
    }

    /// Stats for `scope`, or None when they cannot be fetched.
    ///
    /// Company scope asks the API for its own company-wide totals instead of
    /// summing branches.
    pub async fn summarize(&self, scope: Scope) -> Option<BranchStats> {
        let fetch = self.catalog.source().dashboard_stats(scope.branch_id());
        let result = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(MetricsError::Timeout(self.fetch_timeout.as_secs())),
        };

        match result {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(
                    scope = %scope,
                    error = %e,
                    retryable = e.is_retryable(),
                    auth = e.is_auth_error(),
                    "Summary stats unavailable"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope_store::MemoryScopeStore;
    use crate::source::fake::FakeSource;
    use hotpos_core::{Branch, BranchId, Money};

    fn summary(source: FakeSource) -> SummaryAggregator {
        let catalog = Arc::new(BranchCatalog::new(
            Arc::new(source),
            Arc::new(MemoryScopeStore::new()),
        ));
        SummaryAggregator::new(catalog, Duration::from_secs(15))
    }

    #[tokio::test]
    async fn test_company_and_branch_stats() {
        let mut source = FakeSource::with_branches(vec![Branch::new(1, "Ntinda", "NT")]);
        source.company_stats = Some(BranchStats {
            total_sales_today: Money::from_cents(9_000),
            ..Default::default()
        });
        source.stats.insert(
            BranchId(1),
            BranchStats {
                total_sales_today: Money::from_cents(4_000),
                ..Default::default()
            },
        );
        let summary = summary(source);

        let company = summary.summarize(Scope::CompanyWide).await.unwrap();
        assert_eq!(company.total_sales_today.cents(), 9_000);

        let branch = summary.summarize(Scope::SingleBranch(BranchId(1))).await.unwrap();
        assert_eq!(branch.total_sales_today.cents(), 4_000);
    }

    #[tokio::test]
    async fn test_failure_gives_none() {
        let mut source = FakeSource::default();
        source.failing.insert(BranchId(5));
        let summary = summary(source);

        assert!(summary.summarize(Scope::CompanyWide).await.is_none());
        assert!(summary.summarize(Scope::SingleBranch(BranchId(5))).await.is_none());
    }
}
