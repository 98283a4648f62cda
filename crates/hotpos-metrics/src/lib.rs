//! # hotpos-metrics: Multi-Branch Dashboard Aggregation
//!
//! This crate turns per-branch POS data into the company-wide dashboard
//! views, tolerating the failure of any single branch.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Metrics Architecture                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   Dashboard (Main Orchestrator)                  │  │
//! │  │                                                                  │  │
//! │  │  One ViewSlot per view; stale results are dropped               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │      ┌──────────────┬─────────┴────────┬──────────────────┐            │
//! │      ▼              ▼                  ▼                  ▼             │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────────────┐  ┌──────────┐        │
//! │  │ TimeSeries│ │ Ranking  │  │ LowStock-        │  │ Summary  │        │
//! │  │ Aggregator│ │Aggregator│  │ Consolidator     │  │Aggregator│        │
//! │  └─────┬────┘  └────┬─────┘  └────────┬─────────┘  └────┬─────┘        │
//! │        └────────────┴───── fan_out ───┴─────────────────┘              │
//! │                               │                                         │
//! │  ┌────────────────┐  ┌────────▼────────┐  ┌────────────────────────┐   │
//! │  │ BranchCatalog  │  │BranchDataSource │  │ ScopeStore             │   │
//! │  │ active set +   │  │ ApiClient       │  │ Memory / File          │   │
//! │  │ current scope  │  │ (reqwest)       │  │                        │   │
//! │  └────────────────┘  └─────────────────┘  └────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`dashboard`] - `Dashboard` orchestrator and snapshot
//! - [`catalog`] - Active branches and persisted scope
//! - [`series`] - Daily sales series per branch
//! - [`ranking`] - Top / bottom branches
//! - [`low_stock`] - Cross-branch low-stock list
//! - [`summary`] - Headline statistics
//! - [`guard`] - Stale-response guard (`ViewSlot`)
//! - [`source`] - `BranchDataSource` trait and per-branch fan-out
//! - [`api`] - REST implementation of `BranchDataSource`
//! - [`scope_store`] - Scope persistence
//! - [`config`] - Configuration (TOML + environment)
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hotpos_metrics::{Dashboard, MetricsConfig};
//!
//! let config = MetricsConfig::load_or_default(None);
//! let dashboard = Dashboard::from_config(&config)?;
//!
//! // A catalog failure still leaves a renderable (empty) dashboard.
//! let _ = dashboard.catalog().load_branches().await;
//! dashboard.refresh_current().await;
//!
//! let snapshot = dashboard.snapshot().await;
//! println!("{} branches", snapshot.branches.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod low_stock;
pub mod ranking;
pub mod scope_store;
pub mod series;
pub mod source;
pub mod summary;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::ApiClient;
pub use catalog::BranchCatalog;
pub use config::{ApiSettings, DashboardSettings, MetricsConfig, ScopeSettings};
pub use dashboard::{Dashboard, DashboardSnapshot};
pub use error::{MetricsError, MetricsResult};
pub use guard::{Published, Ticket, ViewSlot};
pub use low_stock::LowStockConsolidator;
pub use ranking::RankingAggregator;
pub use scope_store::{FileScopeStore, MemoryScopeStore, ScopeStore};
pub use series::TimeSeriesAggregator;
pub use source::{fan_out, BranchDataSource, BranchOutcome};
pub use summary::SummaryAggregator;
