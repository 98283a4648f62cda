//! # Branch Data Source
//!
//! The seam between aggregation and transport, plus the per-branch fan-out
//! every aggregator uses.
//!
//! ## Fan-Out Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         fan_out(branches)                               │
//! │                                                                         │
//! │   Branch 1 ──► fetch ──► timeout ──► Ok(records)     ─┐                │
//! │   Branch 2 ──► fetch ──► timeout ──► Err(500)        ─┼─► join_all     │
//! │   Branch 3 ──► fetch ──► (15s)   ──► Err(timed out)  ─┘       │        │
//! │                                                              ▼         │
//! │              [Outcome(1, Data), Outcome(2, Failed), Outcome(3, Failed)]│
//! │                                                                         │
//! │  • All fetches start together                                          │
//! │  • No short-circuit: one failure never cancels the others              │
//! │  • Outcomes come back in input order, not completion order             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::future::join_all;
use tracing::{debug, warn};

use hotpos_core::series::FetchStatus;
use hotpos_core::{Branch, BranchId, BranchStats, SaleRecord, StockLevelRecord};

use crate::error::{MetricsError, MetricsResult};

// =============================================================================
// Data Source Trait
// =============================================================================

/// Read-only access to per-branch POS data.
///
/// Every call is independently failable. Implementations must not retry
/// internally in a way that outlives the caller's timeout.
#[async_trait]
pub trait BranchDataSource: Send + Sync {
    /// Every branch the backend knows, active or not.
    async fn list_branches(&self) -> MetricsResult<Vec<Branch>>;

    /// Sales for one branch over an inclusive calendar range.
    async fn sales_in_range(
        &self,
        branch: BranchId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> MetricsResult<Vec<SaleRecord>>;

    /// Stock records at or below their reorder level for one branch.
    async fn low_stock(&self, branch: BranchId) -> MetricsResult<Vec<StockLevelRecord>>;

    /// Summary stats for one branch, or company-wide when `branch` is None.
    async fn dashboard_stats(&self, branch: Option<BranchId>) -> MetricsResult<BranchStats>;
}

// =============================================================================
// Branch Outcome
// =============================================================================

/// How one branch's fetch settled.
#[derive(Debug)]
pub struct BranchOutcome<T> {
    pub branch: Branch,
    pub result: MetricsResult<T>,
}

impl<T> BranchOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl<T> BranchOutcome<Vec<T>> {
    /// Data / Empty / Failed for list-shaped fetches.
    pub fn status(&self) -> FetchStatus {
        match &self.result {
            Ok(items) if items.is_empty() => FetchStatus::Empty,
            Ok(_) => FetchStatus::Data,
            Err(_) => FetchStatus::Failed,
        }
    }

    /// The fetched items, or nothing if the fetch failed.
    pub fn items(&self) -> &[T] {
        self.result.as_deref().unwrap_or(&[])
    }
}

// =============================================================================
// Fan-Out
// =============================================================================

/// Runs `fetch` for every branch concurrently and gathers settled outcomes.
///
/// Each fetch is bounded by `timeout`. Failures and timeouts are wrapped as
/// [`MetricsError::PerBranchFetchFailed`] and logged; they never abort the
/// batch.
pub async fn fan_out<T, F, Fut>(
    branches: &[Branch],
    timeout: Duration,
    fetch: F,
) -> Vec<BranchOutcome<T>>
where
    F: Fn(BranchId) -> Fut,
    Fut: Future<Output = MetricsResult<T>>,
{
    let pending = branches.iter().map(|branch| {
        let fut = fetch(branch.id);
        async move {
            let result = match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(MetricsError::Timeout(timeout.as_secs())),
            };

            let result = match result {
                Ok(value) => {
                    debug!(branch_id = %branch.id, "Branch fetch succeeded");
                    Ok(value)
                }
                Err(e) => {
                    warn!(
                        branch_id = %branch.id,
                        branch = %branch.name,
                        error = %e,
                        retryable = e.is_retryable(),
                        auth = e.is_auth_error(),
                        "Branch fetch failed"
                    );
                    Err(MetricsError::PerBranchFetchFailed {
                        branch_id: branch.id,
                        reason: e.to_string(),
                    })
                }
            };

            BranchOutcome {
                branch: branch.clone(),
                result,
            }
        }
    });

    join_all(pending).await
}

// =============================================================================
// Test Support
// =============================================================================


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;

    fn branches() -> Vec<Branch> {
        vec![
            Branch::new(1, "Ntinda", "NT"),
            Branch::new(2, "Kireka", "KR"),
            Branch::new(3, "Mukono", "MK"),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_keeps_input_order_and_isolates_failures() {
        let mut source = FakeSource::with_branches(branches());
        source.failing.insert(BranchId(2));
        source.delays.insert(BranchId(1), Duration::from_secs(5));
        source.stock.insert(
            BranchId(3),
            vec![StockLevelRecord {
                branch_id: BranchId(3),
                branch_name: "Mukono".into(),
                product_id: 1,
                product_name: "Sugar".into(),
                product_sku: "SUG".into(),
                quantity: 1,
                reorder_level: 10,
                cost_price: Default::default(),
                selling_price: Default::default(),
            }],
        );

        let list = branches();
        let outcomes = fan_out(&list, Duration::from_secs(15), |id| source.low_stock(id)).await;

        let ids: Vec<i64> = outcomes.iter().map(|o| o.branch.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(outcomes[0].status(), FetchStatus::Empty);
        assert_eq!(outcomes[1].status(), FetchStatus::Failed);
        assert_eq!(outcomes[2].status(), FetchStatus::Data);
        assert!(outcomes[1].items().is_empty());
        assert!(matches!(
            outcomes[1].result,
            Err(MetricsError::PerBranchFetchFailed { branch_id: BranchId(2), .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_times_out_slow_branch() {
        let mut source = FakeSource::with_branches(branches());
        source.delays.insert(BranchId(3), Duration::from_secs(60));

        let list = branches();
        let outcomes = fan_out(&list, Duration::from_secs(15), |id| source.low_stock(id)).await;

        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        match &outcomes[2].result {
            Err(MetricsError::PerBranchFetchFailed { reason, .. }) => {
                assert!(reason.contains("timed out after 15 seconds"));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fan_out_with_no_branches() {
        let source = FakeSource::default();
        let outcomes = fan_out(&[], Duration::from_secs(1), |id| source.low_stock(id)).await;
        assert!(outcomes.is_empty());
    }
}
