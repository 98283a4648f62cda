//! # Metrics Configuration
//!
//! Configuration for the API connection and the dashboard aggregates.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HOTPOS_API_URL=https://pos.example.com/api                         │
//! │     HOTPOS_API_TOKEN=eyJhbGciOi...                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/dashboard/metrics.toml (Linux)                           │
//! │     ~/Library/Application Support/com.hotpos.dashboard/metrics.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost API, 30-day series, top/bottom 3, 20 low-stock rows      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # metrics.toml
//! [api]
//! base_url = "http://localhost:8081/api"
//! token = "eyJhbGciOi..."
//! timeout_secs = 30
//!
//! [dashboard]
//! series_days = 30
//! low_stock_cap = 20
//! ranking_size = 3
//! ranking_metric = "month_revenue"
//! fetch_timeout_secs = 15
//!
//! [scope]
//! store_path = "/var/lib/hotpos/scope.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use hotpos_core::ranking::{RankingMetric, DEFAULT_RANKING_SIZE};
use hotpos_core::series::DEFAULT_SERIES_DAYS;
use hotpos_core::stock::DEFAULT_LOW_STOCK_CAP;

use crate::error::{MetricsError, MetricsResult};

// =============================================================================
// API Settings
// =============================================================================

/// Connection settings for the branch REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base path every endpoint hangs off (`.../api`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent on every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Whole-request timeout for the HTTP client (seconds).
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8081/api".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

// =============================================================================
// Dashboard Settings
// =============================================================================

/// Sizing and timing for the aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Days on the sales chart.
    #[serde(default = "default_series_days")]
    pub series_days: u32,

    /// Rows kept in the consolidated low-stock list.
    #[serde(default = "default_low_stock_cap")]
    pub low_stock_cap: usize,

    /// Length of the top and bottom ranking lists.
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,

    /// Metric the comparison view ranks by.
    #[serde(default)]
    pub ranking_metric: RankingMetric,

    /// Upper bound on any one branch's fetch (seconds).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_series_days() -> u32 {
    DEFAULT_SERIES_DAYS
}

fn default_low_stock_cap() -> usize {
    DEFAULT_LOW_STOCK_CAP
}

fn default_ranking_size() -> usize {
    DEFAULT_RANKING_SIZE
}

fn default_fetch_timeout() -> u64 {
    15
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            series_days: default_series_days(),
            low_stock_cap: default_low_stock_cap(),
            ranking_size: default_ranking_size(),
            ranking_metric: RankingMetric::default(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl DashboardSettings {
    /// Per-branch fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// =============================================================================
// Scope Settings
// =============================================================================

/// Where the selected branch is remembered between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScopeSettings {
    /// Explicit scope file. Falls back to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

// =============================================================================
// Main Metrics Configuration
// =============================================================================

/// Complete metrics configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,

    #[serde(default)]
    pub scope: ScopeSettings,
}

impl MetricsConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (metrics.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> MetricsResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading metrics config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load metrics config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> MetricsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| MetricsError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Metrics config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> MetricsResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MetricsError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(MetricsError::InvalidConfig(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.dashboard.series_days == 0 {
            return Err(MetricsError::InvalidConfig(
                "series_days must be greater than 0".into(),
            ));
        }

        if self.dashboard.fetch_timeout_secs == 0 {
            return Err(MetricsError::InvalidConfig(
                "fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `HOTPOS_*` overrides from `lookup`. Unparseable numbers are
    /// ignored with a warning.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HOTPOS_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(token) = lookup("HOTPOS_API_TOKEN") {
            debug!("Overriding API token from environment");
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(days) = lookup("HOTPOS_SERIES_DAYS") {
            match days.parse::<u32>() {
                Ok(d) => self.dashboard.series_days = d,
                Err(_) => warn!(value = %days, "Ignoring invalid HOTPOS_SERIES_DAYS"),
            }
        }

        if let Some(cap) = lookup("HOTPOS_LOW_STOCK_CAP") {
            match cap.parse::<usize>() {
                Ok(c) => self.dashboard.low_stock_cap = c,
                Err(_) => warn!(value = %cap, "Ignoring invalid HOTPOS_LOW_STOCK_CAP"),
            }
        }

        if let Some(secs) = lookup("HOTPOS_FETCH_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => {
                    debug!(secs = s, "Overriding fetch timeout from environment");
                    self.dashboard.fetch_timeout_secs = s;
                }
                Err(_) => warn!(value = %secs, "Ignoring invalid HOTPOS_FETCH_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hotpos", "dashboard")
            .map(|dirs| dirs.config_dir().join("metrics.toml"))
    }
}
