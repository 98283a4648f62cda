//! # Branch Catalog
//!
//! The active branch set and the current scope, shared by every aggregator.
//!
//! ## Load Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         load_branches()                                 │
//! │                                                                         │
//! │  list_branches() ──► Err ──► branches = []                              │
//! │        │                     scope    = CompanyWide (memory only)       │
//! │        │                     store untouched, CatalogUnavailable        │
//! │        ▼                                                                │
//! │  keep is_active only                                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  store.load() ──► None ─────────────────────► CompanyWide               │
//! │        │                                                                │
//! │        ├──► Some(id) and id is active ──────► SingleBranch(id)          │
//! │        │                                                                │
//! │        └──► Some(id) not in active set ─────► store.clear()             │
//! │                                               CompanyWide (healed)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use hotpos_core::{Branch, BranchId, Scope};

use crate::error::{MetricsError, MetricsResult};
use crate::scope_store::ScopeStore;
use crate::source::BranchDataSource;

#[derive(Debug, Default)]
struct CatalogState {
    branches: Vec<Branch>,
    scope: Scope,
    last_error: Option<String>,
}

/// Active branches plus the persisted scope selection.
pub struct BranchCatalog {
    source: Arc<dyn BranchDataSource>,
    store: Arc<dyn ScopeStore>,
    state: RwLock<CatalogState>,
    /// Serializes `set_scope` so the store and the in-memory scope agree.
    selecting: Mutex<()>,
}

impl BranchCatalog {
    /// Creates an empty catalog. Call [`load_branches`](Self::load_branches)
    /// before reading branches or scope.
    pub fn new(source: Arc<dyn BranchDataSource>, store: Arc<dyn ScopeStore>) -> Self {
        BranchCatalog {
            source,
            store,
            state: RwLock::new(CatalogState::default()),
            selecting: Mutex::new(()),
        }
    }

    /// The data source the catalog was built with.
    pub fn source(&self) -> &Arc<dyn BranchDataSource> {
        &self.source
    }

    /// Fetches the branch list and restores the persisted scope.
    ///
    /// On failure the branch set becomes empty and the scope falls back to
    /// company-wide in memory; the stored selection is left for a later
    /// successful load to validate.
    pub async fn load_branches(&self) -> MetricsResult<Vec<Branch>> {
        let all = match self.source.list_branches().await {
            Ok(all) => all,
            Err(e) => {
                warn!(error = %e, "Failed to load branch catalog");
                let mut state = self.state.write().await;
                state.branches.clear();
                state.scope = Scope::CompanyWide;
                state.last_error = Some(e.to_string());
                return Err(MetricsError::CatalogUnavailable(e.to_string()));
            }
        };

        let total = all.len();
        let active: Vec<Branch> = all.into_iter().filter(|b| b.is_active).collect();
        let scope = self.restore_scope(&active);

        info!(
            total = total,
            active = active.len(),
            scope = %scope,
            "Branch catalog loaded"
        );

        let mut state = self.state.write().await;
        state.branches = active.clone();
        state.scope = scope;
        state.last_error = None;

        Ok(active)
    }

    /// Reads the stored selection and validates it against `active`.
    fn restore_scope(&self, active: &[Branch]) -> Scope {
        match self.store.load() {
            Ok(Some(id)) if active.iter().any(|b| b.id == id) => {
                debug!(branch_id = %id, "Restored branch selection");
                Scope::SingleBranch(id)
            }
            Ok(Some(id)) => {
                info!(branch_id = %id, "Stored branch is no longer active, resetting to company view");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear stale branch selection");
                }
                Scope::CompanyWide
            }
            Ok(None) => Scope::CompanyWide,
            Err(e) => {
                warn!(error = %e, "Failed to read branch selection");
                Scope::CompanyWide
            }
        }
    }

    /// Changes and persists the scope.
    ///
    /// A branch outside the active set is rejected with
    /// [`MetricsError::UnknownBranch`] and nothing changes. The store write
    /// runs on the blocking pool with no catalog lock held.
    pub async fn set_scope(&self, scope: Scope) -> MetricsResult<()> {
        let _selecting = self.selecting.lock().await;

        if let Scope::SingleBranch(id) = scope {
            if self.find(id).await.is_none() {
                return Err(MetricsError::UnknownBranch(id));
            }
        }

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || match scope {
            Scope::SingleBranch(id) => store.save(id),
            Scope::CompanyWide => store.clear(),
        })
        .await
        .map_err(|e| MetricsError::Internal(format!("Scope store task failed: {e}")))??;

        info!(scope = %scope, "Scope changed");
        self.state.write().await.scope = scope;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub async fn scope(&self) -> Scope {
        self.state.read().await.scope
    }

    pub async fn is_company_view(&self) -> bool {
        self.state.read().await.scope.is_company_wide()
    }

    /// Active branches in catalog order.
    pub async fn branches(&self) -> Vec<Branch> {
        self.state.read().await.branches.clone()
    }

    pub async fn find(&self, id: BranchId) -> Option<Branch> {
        self.state
            .read()
            .await
            .branches
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// The selected branch in single-branch scope.
    pub async fn selected_branch(&self) -> Option<Branch> {
        let state = self.state.read().await;
        let id = state.scope.branch_id()?;
        state.branches.iter().find(|b| b.id == id).cloned()
    }

    /// Message from the last failed load, cleared by a successful one.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// The branches an aggregate over `scope` covers, in catalog order.
    ///
    /// - Company-wide: every active branch. If the catalog is empty, one
    ///   direct listing is attempted; if that fails too, no branches.
    /// - Single branch: the catalog entry, or a placeholder when the id is
    ///   not in the catalog.
    pub async fn resolve(&self, scope: Scope) -> Vec<Branch> {
        match scope {
            Scope::SingleBranch(id) => {
                vec![self.find(id).await.unwrap_or_else(|| Branch::placeholder(id))]
            }
            Scope::CompanyWide => {
                let branches = self.branches().await;
                if !branches.is_empty() {
                    return branches;
                }
                match self.source.list_branches().await {
                    Ok(all) => all.into_iter().filter(|b| b.is_active).collect(),
                    Err(e) => {
                        warn!(error = %e, "Branch list unavailable, aggregating over no branches");
                        Vec::new()
                    }
                }
            }
        }
    }
}
