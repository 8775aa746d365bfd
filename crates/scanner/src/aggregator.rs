use crate::entry::{read_children, ChildOutcome};
use crate::{ExclusionList, FolderSize, ProgressThrottle, ScanTelemetry};
use dirlens_priority_cache::{CacheStats, PriorityCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recursive `(file_count, byte_total)` of directory trees, memoized per path.
///
/// Filesystem errors never abort a scan. An unreadable directory counts as
/// empty and an unreadable child contributes nothing, so results can only
/// undercount.
pub struct DirectorySizeAggregator {
    cache: PriorityCache<PathBuf, FolderSize>,
    exclusions: ExclusionList,
    telemetry: Arc<ScanTelemetry>,
    progress: ProgressThrottle,
}

impl DirectorySizeAggregator {
    pub fn new(
        cache_capacity: usize,
        exclusions: ExclusionList,
        telemetry: Arc<ScanTelemetry>,
    ) -> Self {
        Self::with_cache(PriorityCache::new(cache_capacity), exclusions, telemetry)
    }

    pub fn with_cache(
        cache: PriorityCache<PathBuf, FolderSize>,
        exclusions: ExclusionList,
        telemetry: Arc<ScanTelemetry>,
    ) -> Self {
        Self {
            cache,
            exclusions,
            telemetry,
            progress: ProgressThrottle::default(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressThrottle) -> Self {
        self.progress = progress;
        self
    }

    pub fn exclusions(&self) -> &ExclusionList {
        &self.exclusions
    }

    pub fn telemetry(&self) -> &Arc<ScanTelemetry> {
        &self.telemetry
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Total size of everything under `path`.
    ///
    /// Excluded paths short-circuit to zero before the cache is consulted, so
    /// they never occupy a cache slot.
    pub fn folder_size(&self, path: &Path) -> FolderSize {
        if self.exclusions.is_excluded(path) {
            log::debug!("Skipping '{}' because of exclusion", path.display());
            return FolderSize::ZERO;
        }
        self.cache
            .get_or_compute(path.to_path_buf(), |dir| self.scan_directory(dir))
    }

    fn scan_directory(&self, dir: &Path) -> FolderSize {
        if self.progress.try_acquire() {
            log::info!("Examining {}...", dir.display());
            self.telemetry.set_current_path(dir);
        }

        let children = match read_children(dir) {
            Ok(children) => children,
            Err(err) => {
                log::debug!("Cannot read {}: {err}", dir.display());
                return FolderSize::ZERO;
            }
        };

        let mut total = FolderSize::ZERO;
        let mut regular_files = FolderSize::ZERO;
        for child in children {
            match child {
                ChildOutcome::Directory { path } => total += self.folder_size(&path),
                ChildOutcome::File { len, .. } => regular_files += FolderSize::single_file(len),
                ChildOutcome::Other { path } => {
                    log::debug!("Counting unusual entry {} as empty", path.display());
                    total += FolderSize::single_file(0);
                }
                ChildOutcome::Inaccessible { path, error } => {
                    log::trace!(
                        "Ignoring inaccessible entry {}: {error}",
                        path.as_deref().unwrap_or(dir).display()
                    );
                }
            }
        }

        if self.telemetry.first_visit(dir) {
            self.telemetry.record_discovered(regular_files);
        }
        total + regular_files
    }
}
