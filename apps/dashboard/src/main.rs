//! # HotPOS Dashboard CLI
//!
//! Loads the branch catalog, refreshes every dashboard view and prints the
//! snapshot as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! hotpos-dashboard                      # remembered scope, config defaults
//! hotpos-dashboard --scope 4 --days 7   # select branch 4 (persisted)
//! hotpos-dashboard --scope all --metric year
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hotpos_core::ranking::RankingMetric;
use hotpos_core::Scope;
use hotpos_metrics::{Dashboard, MetricsConfig};

#[derive(Debug, Parser)]
#[command(name = "hotpos-dashboard", version, about = "Multi-branch POS dashboard snapshot")]
struct Args {
    /// Config file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// `all` or a branch id. The choice is remembered for later runs.
    #[arg(long)]
    scope: Option<Scope>,

    /// Days on the sales chart.
    #[arg(long)]
    days: Option<u32>,

    /// Ranking metric: today, month, year or average.
    #[arg(long)]
    metric: Option<RankingMetric>,

    /// Rows kept in the low-stock list.
    #[arg(long)]
    low_stock_cap: Option<usize>,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config =
        MetricsConfig::load(args.config.clone()).context("Failed to load configuration")?;
    if let Some(days) = args.days {
        config.dashboard.series_days = days;
    }
    if let Some(metric) = args.metric {
        config.dashboard.ranking_metric = metric;
    }
    if let Some(cap) = args.low_stock_cap {
        config.dashboard.low_stock_cap = cap;
    }
    config.validate().context("Invalid configuration")?;

    if args.write_config {
        config.save(args.config).context("Failed to save configuration")?;
        return Ok(());
    }

    let dashboard = Dashboard::from_config(&config)?;

    if let Err(e) = dashboard.catalog().load_branches().await {
        warn!(error = %e, "Continuing without branch catalog");
    }

    match args.scope {
        Some(scope) => dashboard
            .select(scope)
            .await
            .with_context(|| format!("Cannot select scope '{scope}'"))?,
        None => dashboard.refresh_current().await,
    }

    let snapshot = dashboard.snapshot().await;
    info!(
        scope = %snapshot.scope,
        branches = snapshot.branches.len(),
        "Dashboard refreshed"
    );

    let json = if args.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{json}");

    Ok(())
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show per-branch fetch detail
/// - `RUST_LOG=hotpos_metrics=trace` - Trace the metrics crate only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotpos_core::BranchId;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "hotpos-dashboard",
            "--scope",
            "4",
            "--days",
            "7",
            "--metric",
            "year",
            "--compact",
        ]);
        assert_eq!(args.scope, Some(Scope::SingleBranch(BranchId(4))));
        assert_eq!(args.days, Some(7));
        assert_eq!(args.metric, Some(RankingMetric::YearRevenue));
        assert!(args.compact);
        assert!(!args.write_config);
    }

    #[test]
    fn test_args_reject_bad_scope() {
        assert!(Args::try_parse_from(["hotpos-dashboard", "--scope", "downtown"]).is_err());
    }
}
