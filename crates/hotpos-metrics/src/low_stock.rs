//! # Low-Stock Consolidator
//!
//! Merges each in-scope branch's low-stock list into one capped list,
//! lowest quantity first.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use hotpos_core::stock::{consolidate, LowStockRow};
use hotpos_core::{Scope, StockLevelRecord};

use crate::catalog::BranchCatalog;
use crate::source::fan_out;

pub struct LowStockConsolidator {
    catalog: Arc<BranchCatalog>,
    fetch_timeout: Duration,
}

impl LowStockConsolidator {
    pub fn new(catalog: Arc<BranchCatalog>, fetch_timeout: Duration) -> Self {
        LowStockConsolidator {
            catalog,
            fetch_timeout,
        }
    }

    /// Up to `cap` rows across the scope, ascending by quantity.
    ///
    /// Failed branches contribute nothing. Rows the API returns without a
    /// branch name take the catalog's name for that branch.
    pub async fn consolidate_low_stock(&self, scope: Scope, cap: usize) -> Vec<LowStockRow> {
        let branches = self.catalog.resolve(scope).await;
        let source = self.catalog.source();
        let outcomes = fan_out(&branches, self.fetch_timeout, |id| source.low_stock(id)).await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        let records: Vec<StockLevelRecord> = outcomes
            .iter()
            .flat_map(|outcome| {
                outcome.items().iter().cloned().map(move |mut record| {
                    if record.branch_name.is_empty() {
                        record.branch_name = outcome.branch.name.clone();
                    }
                    record
                })
            })
            .collect();

        let rows = consolidate(&records, cap);
        info!(
            scope = %scope,
            merged = records.len(),
            kept = rows.len(),
            failed = failed,
            "Low-stock list consolidated"
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope_store::MemoryScopeStore;
    use crate::source::fake::FakeSource;
    use hotpos_core::stock::StockStatus;
    use hotpos_core::{Branch, BranchId, Money};

    fn item(branch: i64, product: i64, name: &str, qty: i64, reorder: i64) -> StockLevelRecord {
        StockLevelRecord {
            branch_id: BranchId(branch),
            branch_name: String::new(),
            product_id: product,
            product_name: name.into(),
            product_sku: format!("SKU-{product}"),
            quantity: qty,
            reorder_level: reorder,
            cost_price: Money::from_cents(100),
            selling_price: Money::from_cents(150),
        }
    }

    async fn consolidator(source: FakeSource) -> LowStockConsolidator {
        let catalog = Arc::new(BranchCatalog::new(
            Arc::new(source),
            Arc::new(MemoryScopeStore::new()),
        ));
        let _ = catalog.load_branches().await;
        LowStockConsolidator::new(catalog, Duration::from_secs(15))
    }

    fn branches() -> Vec<Branch> {
        vec![Branch::new(1, "Ntinda", "NT"), Branch::new(2, "Kireka", "KR")]
    }

    #[tokio::test]
    async fn test_failing_branch_contributes_nothing() {
        let mut source = FakeSource::with_branches(branches());
        source.stock.insert(BranchId(1), vec![item(1, 10, "X", 2, 10)]);
        source.failing.insert(BranchId(2));

        let rows = consolidator(source)
            .await
            .consolidate_low_stock(Scope::CompanyWide, 20)
            .await;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "X");
        assert_eq!(rows[0].status, StockStatus::Critical);
        assert_eq!(rows[0].branch_name, "Ntinda");
    }

    #[tokio::test]
    async fn test_merge_sorts_across_branches_and_caps() {
        let mut source = FakeSource::with_branches(branches());
        source.stock.insert(
            BranchId(1),
            vec![item(1, 1, "Rice", 8, 10), item(1, 2, "Salt", 1, 10)],
        );
        source.stock.insert(
            BranchId(2),
            vec![item(2, 3, "Soap", 4, 10), item(2, 4, "Oil", 6, 5)],
        );

        let rows = consolidator(source)
            .await
            .consolidate_low_stock(Scope::CompanyWide, 3)
            .await;

        let names: Vec<&str> = rows.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Salt", "Soap", "Oil"]);
    }

    #[tokio::test]
    async fn test_single_branch_failure_gives_empty_list() {
        let mut source = FakeSource::with_branches(branches());
        source.stock.insert(BranchId(2), vec![item(2, 3, "Soap", 4, 10)]);
        source.failing.insert(BranchId(1));
        let consolidator = consolidator(source).await;

        let rows = consolidator
            .consolidate_low_stock(Scope::SingleBranch(BranchId(1)), 20)
            .await;
        assert!(rows.is_empty());

        let rows = consolidator
            .consolidate_low_stock(Scope::SingleBranch(BranchId(2)), 20)
            .await;
        assert_eq!(rows.len(), 1);
    }
}
