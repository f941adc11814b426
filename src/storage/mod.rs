//! On-disk storage for uploads and converted files.
//!
//! Files live flat in two directories. Every name that reaches the
//! filesystem has been through [`secure_filename`], so a lookup with a name
//! that changes under sanitising is treated as missing.

pub mod leases;
pub mod reaper;

use docforge_common::names::{file_category, secure_filename};
use docforge_common::{Category, Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;

pub use leases::{LeaseGuard, Leases};
pub use reaper::{start_sweep_task, Reaper, ReaperReport, SweepReport};

/// A file accepted by [`FileStore::save_upload`].
#[derive(Debug, Clone, Serialize)]
pub struct StoredUpload {
    /// Sanitised name the file was stored under.
    pub filename: String,
    pub category: Category,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl FileStore {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            upload_dir: storage.upload_dir.clone(),
            processed_dir: storage.processed_dir.clone(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Create both storage directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.processed_dir)?;
        Ok(())
    }

    /// Sanitise `name`, check its extension, and write `bytes` to the upload
    /// directory. An existing upload with the same name is replaced.
    pub async fn save_upload(&self, name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        if name.is_empty() {
            return Err(Error::Validation("No selected file".into()));
        }

        let filename = secure_filename(name);
        let category = file_category(&filename)
            .ok_or_else(|| Error::Validation("File type not allowed".into()))?;

        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Stored upload {:?} ({} bytes, {})", path, bytes.len(), category);

        Ok(StoredUpload { filename, category })
    }

    /// Path of an existing upload.
    pub fn upload_path(&self, name: &str) -> Result<PathBuf> {
        resolve(&self.upload_dir, name, "File")
    }

    /// Lease an upload, then resolve it like [`FileStore::upload_path`].
    ///
    /// The lease is taken before the lookup so a concurrent sweep cannot
    /// remove the file between the two. On error the lease is released.
    pub fn lease_upload(&self, leases: &Leases, name: &str) -> Result<(PathBuf, LeaseGuard)> {
        let guard = leases.acquire(self.upload_dir.join(secure_filename(name)));
        let path = self.upload_path(name)?;
        Ok((path, guard))
    }

    /// Path of an existing converted file.
    pub fn processed_path(&self, name: &str) -> Result<PathBuf> {
        resolve(&self.processed_dir, name, "File")
    }
}

fn resolve(dir: &Path, name: &str, entity: &str) -> Result<PathBuf> {
    let safe = secure_filename(name);
    if safe.is_empty() || safe != name {
        return Err(Error::not_found(entity, name));
    }

    let path = dir.join(safe);
    if !path.is_file() {
        return Err(Error::not_found(entity, name));
    }
    Ok(path)
}
