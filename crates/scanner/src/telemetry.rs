use crate::FolderSize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

/// Running totals of what the scans have found so far.
///
/// A directory's files are counted once, the first time that directory is
/// read. Cache hits and rescans after eviction add nothing.
#[derive(Debug, Default)]
pub struct ScanTelemetry {
    files: AtomicU64,
    bytes: AtomicU64,
    primary_scan: OnceLock<Duration>,
    seen_dirs: Mutex<HashSet<PathBuf>>,
    current_path: Mutex<Option<PathBuf>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySnapshot {
    pub total_files: u64,
    pub total_bytes: u64,
    pub primary_scan: Option<Duration>,
    pub current_path: Option<PathBuf>,
}

impl TelemetrySnapshot {
    pub fn primary_scan_seconds(&self) -> Option<f64> {
        self.primary_scan.map(|elapsed| elapsed.as_secs_f64())
    }
}

impl ScanTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per directory path.
    pub fn first_visit(&self, dir: &Path) -> bool {
        self.seen_dirs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dir.to_path_buf())
    }

    pub fn record_discovered(&self, found: FolderSize) {
        if found == FolderSize::ZERO {
            return;
        }
        self.files.fetch_add(found.file_count, Ordering::Relaxed);
        self.bytes.fetch_add(found.byte_total, Ordering::Relaxed);
    }

    /// Record the duration of the first listing. Later calls are ignored and
    /// return `false`.
    pub fn record_primary_scan(&self, elapsed: Duration) -> bool {
        self.primary_scan.set(elapsed).is_ok()
    }

    pub fn set_current_path(&self, path: &Path) {
        *self
            .current_path
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(path.to_path_buf());
    }

    pub fn total_files(&self) -> u64 {
        self.files.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            total_files: self.total_files(),
            total_bytes: self.total_bytes(),
            primary_scan: self.primary_scan.get().copied(),
            current_path: self
                .current_path
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
