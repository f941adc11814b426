//! In-use markers for files touched by in-flight requests.
//!
//! The reaper consults [`Leases`] before deleting anything, so an upload being
//! converted or a result being written is never removed underneath a request.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Thread-safe set of leased paths with per-path counts.
#[derive(Clone, Debug, Default)]
pub struct Leases {
    held: Arc<DashMap<PathBuf, usize>>,
}

impl Leases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lease a path until the returned guard is dropped.
    ///
    /// # Arguments
    /// * `path` - The file to protect from the reaper.
    ///
    /// # Returns
    /// A guard that releases the lease on drop. Several guards may be held
    /// for the same path at once.
    pub fn acquire(&self, path: impl Into<PathBuf>) -> LeaseGuard {
        let path = path.into();
        *self.held.entry(path.clone()).or_insert(0) += 1;
        tracing::trace!(path = %path.display(), "Lease acquired");

        LeaseGuard {
            leases: self.clone(),
            path,
        }
    }

    /// Whether any guard for `path` is alive.
    pub fn is_leased(&self, path: &Path) -> bool {
        self.held.contains_key(path)
    }

    /// Number of distinct leased paths.
    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    fn release(&self, path: &Path) {
        self.held.remove_if_mut(path, |_, count| {
            *count -= 1;
            *count == 0
        });
        tracing::trace!(path = %path.display(), "Lease released");
    }
}

/// Releases its lease when dropped.
#[derive(Debug)]
pub struct LeaseGuard {
    leases: Leases,
    path: PathBuf,
}

impl LeaseGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.leases.release(&self.path);
    }
}
