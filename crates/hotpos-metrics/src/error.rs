//! # Metrics Error Types
//!
//! Error types for catalog loading, per-branch fetches and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Metrics Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Catalog      │  │   Per-Branch    │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Catalog-       │  │  PerBranch-     │  │  InvalidConfig          │ │
//! │  │   Unavailable   │  │   FetchFailed   │  │  InvalidUrl             │ │
//! │  │  UnknownBranch  │  │  Unsupported-   │  │  ConfigLoad/SaveFailed  │ │
//! │  │                 │  │   Operation     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Transport     │  │  Scope Store    │  │      Internal           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Connection     │  │  ScopeStore     │  │  Core / Internal        │ │
//! │  │  Timeout        │  │                 │  │                         │ │
//! │  │  Unauthorized   │  │                 │  │                         │ │
//! │  │  HttpStatus     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only [`MetricsError::CatalogUnavailable`] is ever returned to callers of
//! the aggregators. Every other failure is contained to the branch it came
//! from and shows up as a degraded slice of the view.

use hotpos_core::{BranchId, CoreError};
use thiserror::Error;

/// Result type alias for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Every failure the metrics layer can observe.
#[derive(Debug, Error)]
pub enum MetricsError {
    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// The branch list could not be fetched.
    #[error("Branch catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A scope named a branch that is not in the active set.
    #[error("Unknown or inactive branch: {0}")]
    UnknownBranch(BranchId),

    // =========================================================================
    // Per-Branch Errors
    // =========================================================================
    /// One branch's data could not be fetched. Never aborts an aggregation.
    #[error("Fetch failed for branch {branch_id}: {reason}")]
    PerBranchFetchFailed { branch_id: BranchId, reason: String },

    /// The aggregate is not defined for the requested scope.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid metrics configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The API could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A request did not complete in time.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// 401 or 403 from the API.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    // =========================================================================
    // Scope Store Errors
    // =========================================================================
    #[error("Scope store error: {0}")]
    ScopeStore(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for MetricsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MetricsError::DeserializationFailed(err.to_string())
        } else if err.is_builder() {
            MetricsError::InvalidUrl(err.to_string())
        } else {
            MetricsError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::DeserializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for MetricsError {
    fn from(err: url::ParseError) -> Self {
        MetricsError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for MetricsError {
    fn from(err: std::io::Error) -> Self {
        MetricsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for MetricsError {
    fn from(err: toml::de::Error) -> Self {
        MetricsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for MetricsError {
    fn from(err: toml::ser::Error) -> Self {
        MetricsError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl MetricsError {
    /// Returns true if a later refresh could plausibly succeed.
    ///
    /// ## Retryable Errors
    /// - Connection failures and timeouts
    /// - 5xx responses
    /// - Per-branch failures (the next refresh re-fetches the branch)
    pub fn is_retryable(&self) -> bool {
        match self {
            MetricsError::ConnectionFailed(_)
            | MetricsError::Timeout(_)
            | MetricsError::CatalogUnavailable(_)
            | MetricsError::PerBranchFetchFailed { .. } => true,
            MetricsError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MetricsError::InvalidConfig(_)
                | MetricsError::InvalidUrl(_)
                | MetricsError::ConfigLoadFailed(_)
                | MetricsError::ConfigSaveFailed(_)
        )
    }

    /// Returns true for 401/403 responses.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, MetricsError::Unauthorized(_))
    }
}
