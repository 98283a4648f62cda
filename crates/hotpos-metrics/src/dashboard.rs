//! # Dashboard
//!
//! Presentation-facing orchestrator: owns the catalog, one aggregator per
//! view, and one [`ViewSlot`] per view.
//!
//! ## Refresh Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       refresh_all(scope, metric)                        │
//! │                                                                         │
//! │   ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐  │
//! │   │ series slot  │ │ ranking slot │ │ low-stock    │ │ summary slot │  │
//! │   │ begin() → t  │ │ begin() → t  │ │ slot         │ │ begin() → t  │  │
//! │   │ aggregate    │ │ aggregate    │ │ begin() → t  │ │ fetch stats  │  │
//! │   │ publish(t)   │ │ publish(t)   │ │ publish(t)   │ │ publish(t)   │  │
//! │   └──────┬───────┘ └──────┬───────┘ └──────┬───────┘ └──────┬───────┘  │
//! │          └────────────────┴───── watch ────┴────────────────┘           │
//! │                                    │                                    │
//! │                              subscribers                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A refresh started for an old scope that finishes after a newer refresh
//! has begun is dropped by its slot.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use ts_rs::TS;

use hotpos_core::ranking::{BranchRanking, RankingMetric};
use hotpos_core::series::SalesSeries;
use hotpos_core::stock::LowStockRow;
use hotpos_core::{Branch, BranchStats, Scope};

use crate::api::ApiClient;
use crate::catalog::BranchCatalog;
use crate::config::{DashboardSettings, MetricsConfig};
use crate::error::MetricsResult;
use crate::guard::ViewSlot;
use crate::low_stock::LowStockConsolidator;
use crate::ranking::RankingAggregator;
use crate::scope_store::{FileScopeStore, ScopeStore};
use crate::series::TimeSeriesAggregator;
use crate::source::BranchDataSource;
use crate::summary::SummaryAggregator;

/// Everything the dashboard currently shows.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardSnapshot {
    pub scope: Scope,
    pub branches: Vec<Branch>,
    pub series: Option<SalesSeries>,
    pub ranking: Option<BranchRanking>,
    pub low_stock: Option<Vec<LowStockRow>>,
    pub summary: Option<BranchStats>,
    pub catalog_error: Option<String>,
}

pub struct Dashboard {
    catalog: Arc<BranchCatalog>,
    settings: DashboardSettings,

    series: TimeSeriesAggregator,
    ranking: RankingAggregator,
    low_stock: LowStockConsolidator,
    summary: SummaryAggregator,

    series_slot: ViewSlot<SalesSeries>,
    ranking_slot: ViewSlot<BranchRanking>,
    low_stock_slot: ViewSlot<Vec<LowStockRow>>,
    summary_slot: ViewSlot<Option<BranchStats>>,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn BranchDataSource>,
        store: Arc<dyn ScopeStore>,
        settings: DashboardSettings,
    ) -> Self {
        let catalog = Arc::new(BranchCatalog::new(source, store));
        let timeout = settings.fetch_timeout();

        Dashboard {
            series: TimeSeriesAggregator::new(catalog.clone(), timeout),
            ranking: RankingAggregator::new(catalog.clone(), timeout, settings.ranking_size),
            low_stock: LowStockConsolidator::new(catalog.clone(), timeout),
            summary: SummaryAggregator::new(catalog.clone(), timeout),
            series_slot: ViewSlot::new("series"),
            ranking_slot: ViewSlot::new("ranking"),
            low_stock_slot: ViewSlot::new("low_stock"),
            summary_slot: ViewSlot::new("summary"),
            catalog,
            settings,
        }
    }

    /// Wires the REST client and file scope store from configuration.
    pub fn from_config(config: &MetricsConfig) -> MetricsResult<Self> {
        let source = Arc::new(ApiClient::new(&config.api)?);
        let store = Arc::new(FileScopeStore::at_or_default(config.scope.store_path.clone())?);
        info!(api = %config.api.base_url, store = ?store.path(), "Dashboard configured");
        Ok(Self::new(source, store, config.dashboard.clone()))
    }

    pub fn catalog(&self) -> &Arc<BranchCatalog> {
        &self.catalog
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Rebuilds the sales chart. Returns false if superseded.
    pub async fn refresh_series(&self, scope: Scope) -> bool {
        let days = self.settings.series_days;
        self.series_slot
            .run(self.series.build_series(scope, days))
            .await
    }

    pub async fn refresh_ranking(&self, scope: Scope, metric: RankingMetric) -> bool {
        self.ranking_slot
            .run(self.ranking.rank_branches(scope, metric))
            .await
    }

    pub async fn refresh_low_stock(&self, scope: Scope) -> bool {
        let cap = self.settings.low_stock_cap;
        self.low_stock_slot
            .run(self.low_stock.consolidate_low_stock(scope, cap))
            .await
    }

    pub async fn refresh_summary(&self, scope: Scope) -> bool {
        self.summary_slot.run(self.summary.summarize(scope)).await
    }

    /// Refreshes every view for `scope` concurrently.
    pub async fn refresh_all(&self, scope: Scope, metric: RankingMetric) {
        tokio::join!(
            self.refresh_series(scope),
            self.refresh_ranking(scope, metric),
            self.refresh_low_stock(scope),
            self.refresh_summary(scope),
        );
    }

    /// Refreshes every view for the catalog's current scope.
    pub async fn refresh_current(&self) {
        let scope = self.catalog.scope().await;
        self.refresh_all(scope, self.settings.ranking_metric).await;
    }

    /// Persists a new scope and refreshes every view for it.
    pub async fn select(&self, scope: Scope) -> MetricsResult<()> {
        self.catalog.set_scope(scope).await?;
        self.refresh_all(scope, self.settings.ranking_metric).await;
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn series_slot(&self) -> &ViewSlot<SalesSeries> {
        &self.series_slot
    }

    pub fn ranking_slot(&self) -> &ViewSlot<BranchRanking> {
        &self.ranking_slot
    }

    pub fn low_stock_slot(&self) -> &ViewSlot<Vec<LowStockRow>> {
        &self.low_stock_slot
    }

    pub fn summary_slot(&self) -> &ViewSlot<Option<BranchStats>> {
        &self.summary_slot
    }

    /// Current contents of every slot.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            scope: self.catalog.scope().await,
            branches: self.catalog.branches().await,
            series: self.series_slot.current(),
            ranking: self.ranking_slot.current(),
            low_stock: self.low_stock_slot.current(),
            summary: self.summary_slot.current().flatten(),
            catalog_error: self.catalog.last_error().await,
        }
    }
}
