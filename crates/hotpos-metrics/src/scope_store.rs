//! # Scope Store
//!
//! Remembers which branch the viewer last selected.
//!
//! Only a branch id is ever stored. "Company-wide" is the absence of a
//! stored id, so a missing or unreadable store always degrades to the
//! company view.
//!
//! ```text
//! set_scope(SingleBranch(4))  ──►  save(4)   ──►  {"selectedBranchId": 4}
//! set_scope(CompanyWide)      ──►  clear()   ──►  (file removed)
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hotpos_core::BranchId;

use crate::error::{MetricsError, MetricsResult};

/// Persistence for the selected branch.
pub trait ScopeStore: Send + Sync {
    /// The stored branch id, if any.
    fn load(&self) -> MetricsResult<Option<BranchId>>;

    fn save(&self, branch: BranchId) -> MetricsResult<()>;

    fn clear(&self) -> MetricsResult<()>;
}

// =============================================================================
// Memory Store
// =============================================================================

/// Process-local store for tests and server-side sessions.
#[derive(Debug, Default)]
pub struct MemoryScopeStore {
    selected: Mutex<Option<BranchId>>,
}

impl MemoryScopeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `branch`.
    pub fn with_selection(branch: BranchId) -> Self {
        MemoryScopeStore {
            selected: Mutex::new(Some(branch)),
        }
    }

    fn lock(&self) -> MetricsResult<std::sync::MutexGuard<'_, Option<BranchId>>> {
        self.selected
            .lock()
            .map_err(|_| MetricsError::ScopeStore("scope lock poisoned".into()))
    }
}

impl ScopeStore for MemoryScopeStore {
    fn load(&self) -> MetricsResult<Option<BranchId>> {
        Ok(*self.lock()?)
    }

    fn save(&self, branch: BranchId) -> MetricsResult<()> {
        *self.lock()? = Some(branch);
        Ok(())
    }

    fn clear(&self) -> MetricsResult<()> {
        *self.lock()? = None;
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredScope {
    selected_branch_id: BranchId,
}

/// JSON file store, by default under the platform data directory.
#[derive(Debug, Clone)]
pub struct FileScopeStore {
    path: PathBuf,
}

impl FileScopeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileScopeStore { path: path.into() }
    }

    /// Store at `path`, or at the default location when `path` is None.
    pub fn at_or_default(path: Option<PathBuf>) -> MetricsResult<Self> {
        path.or_else(Self::default_path)
            .map(Self::new)
            .ok_or_else(|| MetricsError::ScopeStore("No data directory available".into()))
    }

    /// `<data dir>/scope.json`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hotpos", "dashboard")
            .map(|dirs| dirs.data_dir().join("scope.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScopeStore for FileScopeStore {
    fn load(&self) -> MetricsResult<Option<BranchId>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetricsError::ScopeStore(e.to_string())),
        };

        match serde_json::from_str::<StoredScope>(&contents) {
            Ok(stored) => Ok(Some(stored.selected_branch_id)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring unreadable scope file");
                Ok(None)
            }
        }
    }

    fn save(&self, branch: BranchId) -> MetricsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| MetricsError::ScopeStore(e.to_string()))?;
        }
        let contents = serde_json::to_string(&StoredScope {
            selected_branch_id: branch,
        })?;
        std::fs::write(&self.path, contents).map_err(|e| MetricsError::ScopeStore(e.to_string()))?;
        debug!(path = ?self.path, branch_id = %branch, "Scope saved");
        Ok(())
    }

    fn clear(&self) -> MetricsResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MetricsError::ScopeStore(e.to_string())),
        }
    }
}
