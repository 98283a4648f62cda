//! # Domain Types
//!
//! The read-only records this layer receives from the branch API, plus the
//! `Scope` selector.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │     Branch      │   │   SaleRecord    │   │  StockLevelRecord   │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (BranchId)  │   │  branch_id      │   │  branch_id          │   │
//! │  │  name, code     │   │  sale_date      │   │  product_id / sku   │   │
//! │  │  is_active      │   │  grand_total    │   │  quantity, reorder  │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌───────────────────────────────────────────┐   │
//! │  │  BranchStats    │   │  Scope                                    │   │
//! │  │  ─────────────  │   │  ───────────────────────────────────────  │   │
//! │  │  today / month  │   │  CompanyWide        (no branch filter)    │   │
//! │  │  / year sales   │   │  SingleBranch(id)   (one branch)          │   │
//! │  └─────────────────┘   └───────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names follow the API's camelCase JSON. Amounts arrive as decimals in
//! major units and are converted to [`Money`] on the way in.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::{self, Money};

// =============================================================================
// Branch Identity
// =============================================================================

/// Stable branch identifier assigned by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct BranchId(pub i64);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BranchId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(BranchId)
            .map_err(|_| CoreError::InvalidBranchId(s.to_string()))
    }
}

impl From<i64> for BranchId {
    fn from(id: i64) -> Self {
        BranchId(id)
    }
}

// =============================================================================
// Branch
// =============================================================================

/// A store location as returned by the branch list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Branch {
    pub id: BranchId,

    /// Display name ("Kampala Road").
    pub name: String,

    /// Short code ("KLA-01").
    #[serde(default)]
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Deactivated branches never feed an aggregate. A missing field means
    /// active; an explicit `null` means inactive.
    #[serde(default = "default_active", deserialize_with = "nullable_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

fn nullable_active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Label used when a selected branch cannot be found in the catalog.
pub const PLACEHOLDER_BRANCH_NAME: &str = "Branch";

impl Branch {
    /// Creates an active branch with no contact details.
    pub fn new(id: impl Into<BranchId>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Branch {
            id: id.into(),
            name: name.into(),
            code: code.into(),
            address: None,
            phone: None,
            email: None,
            is_active: true,
        }
    }

    /// Minimal stand-in for a branch the catalog does not know, so a chart
    /// can still render with a generic label.
    pub fn placeholder(id: BranchId) -> Self {
        Branch::new(id, PLACEHOLDER_BRANCH_NAME, "")
    }
}

// =============================================================================
// Scope
// =============================================================================

/// The branch-filtering context for a query.
///
/// ## Persistence
/// Only `SingleBranch` is ever written to the scope store. `CompanyWide` is
/// represented by the absence of a stored id, so a lost or corrupt store
/// always degrades to the company-wide view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "branchId", rename_all = "camelCase")]
#[ts(export)]
pub enum Scope {
    /// No branch filter: aggregate over all active branches.
    #[default]
    CompanyWide,

    /// Exactly one branch.
    SingleBranch(BranchId),
}

impl Scope {
    /// Returns true for the company-wide view.
    #[inline]
    pub fn is_company_wide(&self) -> bool {
        matches!(self, Scope::CompanyWide)
    }

    /// The selected branch, if any.
    #[inline]
    pub fn branch_id(&self) -> Option<BranchId> {
        match self {
            Scope::CompanyWide => None,
            Scope::SingleBranch(id) => Some(*id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::CompanyWide => write!(f, "all"),
            Scope::SingleBranch(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Scope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "company" | "company-wide" => Ok(Scope::CompanyWide),
            other => other
                .parse::<BranchId>()
                .map(Scope::SingleBranch)
                .map_err(|_| CoreError::InvalidScope(s.to_string())),
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One sale as returned by the sales-by-range endpoint.
///
/// Only the fields the aggregators read are modelled; the rest of the sale
/// payload (items, payments, customer) is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: i64,

    pub branch_id: BranchId,

    /// Branch-local timestamp text, e.g. `2026-10-19T14:03:11`.
    /// Bucketing matches on its `YYYY-MM-DD` prefix.
    pub sale_date: String,

    /// Total after tax and discount.
    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub grand_total: Money,
}

// =============================================================================
// Stock Level Record
// =============================================================================

/// One product's stock position at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelRecord {
    pub branch_id: BranchId,

    #[serde(default)]
    pub branch_name: String,

    pub product_id: i64,

    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub product_sku: String,

    pub quantity: i64,

    /// Threshold at or below which the product should be reordered.
    #[serde(default)]
    pub reorder_level: i64,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub cost_price: Money,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub selling_price: Money,
}

// =============================================================================
// Branch Stats
// =============================================================================

/// Summary statistics for one branch, or for the whole company when the
/// request omits a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BranchStats {
    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub total_sales_today: Money,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub total_sales_this_month: Money,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub total_sales_this_year: Money,

    #[serde(default)]
    pub transaction_count_today: i64,

    #[serde(default)]
    pub transaction_count_this_month: i64,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub average_transaction_value: Money,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub total_expenses_this_month: Money,

    #[serde(default, deserialize_with = "money::deserialize_major")]
    pub net_profit_this_month: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("all".parse::<Scope>().unwrap(), Scope::CompanyWide);
        assert_eq!("ALL".parse::<Scope>().unwrap(), Scope::CompanyWide);
        assert_eq!(
            "7".parse::<Scope>().unwrap(),
            Scope::SingleBranch(BranchId(7))
        );
        assert!("downtown".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_display_round_trips() {
        for scope in [Scope::CompanyWide, Scope::SingleBranch(BranchId(42))] {
            assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
        }
    }

    #[test]
    fn test_scope_default_is_company_wide() {
        assert!(Scope::default().is_company_wide());
        assert_eq!(Scope::default().branch_id(), None);
    }

    #[test]
    fn test_branch_deserializes_api_payload() {
        let json = r#"{
            "id": 3,
            "name": "Ntinda",
            "code": "NT",
            "address": "Plot 4",
            "isActive": false,
            "createdAt": "2025-01-01T00:00:00"
        }"#;
        let branch: Branch = serde_json::from_str(json).unwrap();
        assert_eq!(branch.id, BranchId(3));
        assert_eq!(branch.address.as_deref(), Some("Plot 4"));
        assert!(!branch.is_active);
    }

    #[test]
    fn test_branch_list_with_null_active_flag() {
        let json = r#"[
            {"id": 1, "name": "Ntinda", "code": "NT", "isActive": true},
            {"id": 2, "name": "Kireka", "code": "KR", "isActive": null},
            {"id": 3, "name": "Bweyogerere", "code": "BW"}
        ]"#;
        let branches: Vec<Branch> = serde_json::from_str(json).unwrap();
        assert_eq!(branches.len(), 3);
        assert!(branches[0].is_active);
        assert!(!branches[1].is_active);
        assert!(branches[2].is_active);
    }

    #[test]
    fn test_placeholder_branch() {
        let b = Branch::placeholder(BranchId(9));
        assert_eq!(b.name, PLACEHOLDER_BRANCH_NAME);
        assert!(b.code.is_empty());
        assert!(b.is_active);
    }

    #[test]
    fn test_sale_record_ignores_extra_fields() {
        let json = r#"{
            "id": 1,
            "branchId": 2,
            "branchName": "Ntinda",
            "saleNumber": "S-0001",
            "saleDate": "2026-10-19T09:15:00",
            "grandTotal": 15000.5,
            "items": []
        }"#;
        let sale: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(sale.branch_id, BranchId(2));
        assert_eq!(sale.grand_total.cents(), 1_500_050);
    }

    #[test]
    fn test_stats_missing_fields_default_to_zero() {
        let stats: BranchStats =
            serde_json::from_str(r#"{"totalSalesThisMonth": 1200}"#).unwrap();
        assert_eq!(stats.total_sales_this_month.cents(), 120_000);
        assert!(stats.total_sales_this_year.is_zero());
    }
}
