//! Age-based cleanup of the upload and processed directories.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

use super::leases::Leases;
use crate::config::StorageConfig;

/// Outcome of one sweep over a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Files deleted.
    pub removed: usize,
    /// Expired files left alone because they are leased.
    pub skipped: usize,
    /// Files that could not be inspected or deleted.
    pub errors: usize,
}

/// Sweep `dir`, deleting regular files older than `max_age`.
pub fn sweep(dir: &Path, max_age: Duration, leases: &Leases) -> SweepReport {
    sweep_at(dir, max_age, SystemTime::now(), leases)
}

/// [`sweep`] with an explicit notion of "now".
///
/// A file is expired when `now - mtime` is strictly greater than `max_age`.
/// Subdirectories are not entered. Failures are logged and counted.
pub fn sweep_at(dir: &Path, max_age: Duration, now: SystemTime, leases: &Leases) -> SweepReport {
    let mut report = SweepReport::default();

    if !dir.is_dir() {
        return report;
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read entry in {:?}: {}", dir, e);
                report.errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => modified,
            Ok(Err(e)) => {
                tracing::warn!("No modification time for {:?}: {}", path, e);
                report.errors += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to stat {:?}: {}", path, e);
                report.errors += 1;
                continue;
            }
        };

        // Timestamps in the future count as age zero.
        let age = now.duration_since(modified).unwrap_or_default();
        if age <= max_age {
            continue;
        }

        if leases.is_leased(path) {
            tracing::debug!("Skipping expired file in use: {:?}", path);
            report.skipped += 1;
            continue;
        }

        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed expired file {:?} (age {}s)", path, age.as_secs());
                report.removed += 1;
            }
            // Deleted concurrently by another sweep.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove {:?}: {}", path, e);
                report.errors += 1;
            }
        }
    }

    report
}

/// Sweeps both storage directories with their own age limits.
#[derive(Clone)]
pub struct Reaper {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
    upload_max_age: Duration,
    processed_max_age: Duration,
    leases: Leases,
}

/// Reports for the two directories of one [`Reaper::sweep_all`] pass.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReaperReport {
    pub uploads: SweepReport,
    pub processed: SweepReport,
}

impl Reaper {
    pub fn new(storage: &StorageConfig, leases: Leases) -> Self {
        Self {
            upload_dir: storage.upload_dir.clone(),
            processed_dir: storage.processed_dir.clone(),
            upload_max_age: Duration::from_secs(storage.upload_max_age_mins * 60),
            processed_max_age: Duration::from_secs(storage.processed_max_age_mins * 60),
            leases,
        }
    }

    /// Sweep uploads, then processed files.
    pub fn sweep_all(&self) -> ReaperReport {
        let report = ReaperReport {
            uploads: sweep(&self.upload_dir, self.upload_max_age, &self.leases),
            processed: sweep(&self.processed_dir, self.processed_max_age, &self.leases),
        };

        if report.uploads.removed + report.processed.removed > 0 {
            tracing::info!(
                uploads = report.uploads.removed,
                processed = report.processed.removed,
                "Removed expired files"
            );
        }

        report
    }
}

/// Start a background task that sweeps on a fixed interval.
///
/// # Arguments
/// * `reaper` - The reaper to run.
/// * `interval_secs` - Seconds between sweeps.
///
/// # Returns
/// A join handle for the background task.
pub fn start_sweep_task(reaper: Reaper, interval_secs: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let reaper = reaper.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || reaper.sweep_all()).await {
                tracing::error!("Sweep task failed: {}", e);
            }
        }
    })
}
