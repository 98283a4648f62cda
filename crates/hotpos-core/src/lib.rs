//! # hotpos-core: Pure Consolidation Logic for HotPOS Dashboards
//!
//! This crate holds the multi-branch math behind the dashboard: bucketing
//! sales into daily series, ranking branches, and merging low-stock lists.
//! Everything here is a pure function over already-fetched records.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      HotPOS Dashboard Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (web UI / CLI)                     │   │
//! │  │    Sales chart ──► Branch comparison ──► Low-stock table       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SalesSeries / BranchRanking / rows     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          hotpos-metrics (catalog, fan-out, stale guard)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ hotpos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐           │   │
//! │  │   │  types  │  │  money  │  │ series  │  │ ranking │  stock    │   │
//! │  │   │ Branch  │  │  Money  │  │ChartRow │  │ growth  │  status   │   │
//! │  │   │  Scope  │  │ Decimal │  │ colors  │  │ top/bot │  cap      │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Branch, Scope and the raw API records
//! - [`money`] - Money type with integer arithmetic
//! - [`series`] - Daily sales buckets and chart colors
//! - [`ranking`] - Branch ranking and growth
//! - [`stock`] - Low-stock status and consolidation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same records in, same view model out (colors included)
//! 2. **No Clock**: "today" is always passed in by the caller
//! 3. **Integer Money**: every amount is cents in an i64
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use hotpos_core::series::{build_series, BranchSales, DateRange, FetchStatus};
//! use hotpos_core::{Branch, BranchId};
//!
//! let branch = Branch::new(1, "Ntinda", "NT");
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let range = DateRange::ending(today, 7).unwrap();
//!
//! let series = build_series(
//!     range,
//!     &[BranchSales { branch: &branch, status: FetchStatus::Empty, sales: &[] }],
//! );
//! assert_eq!(series.rows.len(), 7);
//! assert!(series.rows[6].total_for(BranchId(1)).is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ranking;
pub mod series;
pub mod stock;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use ranking::{BranchRanking, RankedBranch, RankingMetric};
pub use series::{ChartRow, DateRange, FetchStatus, SalesSeries, SeriesBranch};
pub use stock::{LowStockRow, StockStatus};
pub use types::*;
