//! # Error Types
//!
//! Domain-specific error types for hotpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hotpos-core errors (this file)                                        │
//! │  └── CoreError       - Malformed domain input                          │
//! │                                                                         │
//! │  hotpos-metrics errors (separate crate)                                │
//! │  └── MetricsError    - Catalog, per-branch fetch, config, transport    │
//! │                                                                         │
//! │  Flow: CoreError → MetricsError → logged / degraded view               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in the pure consolidation math can fail on well-formed input;
//! these errors only surface while parsing values handed in from outside.

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A decimal amount does not fit in i64 cents.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// A branch id could not be parsed.
    ///
    /// ## When This Occurs
    /// - A persisted scope file was edited by hand
    /// - A CLI argument is not a number
    #[error("Invalid branch id: '{0}'")]
    InvalidBranchId(String),

    /// A scope string is neither `all` nor a branch id.
    #[error("Invalid scope '{0}': expected 'all' or a branch id")]
    InvalidScope(String),

    /// A ranking metric name is not recognised.
    #[error("Invalid ranking metric '{0}': expected today, month, year or average")]
    InvalidMetric(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::InvalidBranchId("abc".into()).to_string(),
            "Invalid branch id: 'abc'"
        );
        assert_eq!(
            CoreError::InvalidScope("everywhere".into()).to_string(),
            "Invalid scope 'everywhere': expected 'all' or a branch id"
        );
    }
}
