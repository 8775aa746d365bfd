use crate::listing::{build_listing, Listing};
use crate::{ListingError, Result};
use dirlens_priority_cache::{CacheStats, PriorityCache};
use dirlens_scanner::DirectorySizeAggregator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};

/// Single-flight proportional listings.
///
/// At most one listing is computed at a time. A caller that cannot get the
/// lock within `lock_timeout` fails with [`ListingError::Contention`] instead of
/// queueing forever. Finished listings go through a small value-priority cache,
/// so repeated queries may not reflect later filesystem changes.
pub struct ListingService {
    aggregator: Arc<DirectorySizeAggregator>,
    listings: PriorityCache<PathBuf, Arc<Listing>>,
    lock: Arc<TokioMutex<()>>,
    lock_timeout: Duration,
}

impl ListingService {
    pub fn new(
        aggregator: Arc<DirectorySizeAggregator>,
        listings: PriorityCache<PathBuf, Arc<Listing>>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            aggregator,
            listings,
            lock: Arc::new(TokioMutex::new(())),
            lock_timeout,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.listings.stats()
    }

    pub async fn list_children(&self, path: &Path) -> Result<Arc<Listing>> {
        let dir = tokio::fs::canonicalize(path)
            .await
            .map_err(|err| ListingError::from_open(path.into(), err))?;
        if let Some(cached) = self.listings.get(&dir) {
            log::debug!("Serving cached listing of {}", dir.display());
            return Ok(cached);
        }

        let began = Instant::now();
        let guard = self.acquire().await?;

        // a listing that held the lock before us may have produced this one
        if let Some(cached) = self.listings.get(&dir) {
            return Ok(cached);
        }

        log::info!("Proportional listing {} ...", dir.display());
        let aggregator = Arc::clone(&self.aggregator);
        let target = dir.clone();
        let listing = run_locked(guard, move || build_listing(&aggregator, &target)).await??;

        let elapsed = began.elapsed();
        log::info!(
            "Done proportional listing of {}, size is {}, took {:.3} seconds",
            dir.display(),
            listing.total.byte_total,
            elapsed.as_secs_f64()
        );
        if self.aggregator.telemetry().record_primary_scan(elapsed) {
            log::info!("Primary scan took {:.3} seconds", elapsed.as_secs_f64());
        }
        log::debug!("Size cache: {:?}", self.aggregator.cache_stats());

        let listing = Arc::new(listing);
        self.listings.offer(dir, Arc::clone(&listing));
        Ok(listing)
    }

    async fn acquire(&self) -> Result<OwnedMutexGuard<()>> {
        tokio::time::timeout(self.lock_timeout, Arc::clone(&self.lock).lock_owned())
            .await
            .map_err(|_| ListingError::Contention {
                timeout: self.lock_timeout,
            })
    }
}

/// Run blocking `work` off the runtime. The guard moves into the worker, so
/// the lock stays held until `work` returns even if the caller stops waiting.
async fn run_locked<T, F>(guard: OwnedMutexGuard<()>, work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        work()
    })
    .await
    .map_err(|err| ListingError::Worker(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirlens_scanner::{ExclusionList, ScanTelemetry};
    use std::fs;
    use tempfile::tempdir;

    fn service(lock_timeout: Duration) -> ListingService {
        let aggregator = Arc::new(DirectorySizeAggregator::new(
            64,
            ExclusionList::default(),
            Arc::new(ScanTelemetry::new()),
        ));
        ListingService::new(aggregator, PriorityCache::new(8), lock_timeout)
    }

    #[tokio::test]
    async fn held_lock_yields_contention_instead_of_waiting() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), b"abc").unwrap();
        let service = service(Duration::from_millis(50));

        let held = service.lock.lock().await;
        let started = Instant::now();
        let err = service.list_children(temp.path()).await.unwrap_err();
        assert!(matches!(err, ListingError::Contention { .. }), "{err}");
        assert!(started.elapsed() < Duration::from_secs(5));

        drop(held);
        let listing = service.list_children(temp.path()).await.unwrap();
        assert_eq!(listing.entries.len(), 1);
    }

    #[tokio::test]
    async fn lock_is_released_after_a_failed_listing() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("plain.txt"), b"abc").unwrap();
        let service = service(Duration::from_millis(50));

        let err = service
            .list_children(&temp.path().join("plain.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::Access { .. }), "{err}");

        assert!(service.lock.try_lock().is_ok());
        assert!(service.list_children(temp.path()).await.is_ok());
    }

    #[tokio::test]
    async fn repeated_listing_is_served_from_cache() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.txt"), vec![0u8; 10]).unwrap();
        let service = service(Duration::from_secs(1));

        let first = service.list_children(temp.path()).await.unwrap();
        fs::write(temp.path().join("late.txt"), vec![0u8; 10]).unwrap();
        let second = service.list_children(temp.path()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.entries.len(), 1, "cached listing is a snapshot");
        assert_eq!(service.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn only_the_first_listing_sets_primary_scan_time() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        let service = service(Duration::from_secs(1));
        let telemetry = Arc::clone(service.aggregator.telemetry());

        service.list_children(temp.path()).await.unwrap();
        let first = telemetry.snapshot().primary_scan;
        assert!(first.is_some());

        service
            .list_children(&temp.path().join("sub"))
            .await
            .unwrap();
        assert_eq!(telemetry.snapshot().primary_scan, first);
    }

    #[tokio::test]
    async fn abandoned_listing_keeps_the_lock_until_work_finishes() {
        let service = service(Duration::from_secs(1));
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

        let guard = service.acquire().await.unwrap();
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            run_locked(guard, move || release_rx.recv().is_ok()),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(service.lock.try_lock().is_err());

        release_tx.send(()).unwrap();
        let relock = tokio::time::timeout(Duration::from_secs(5), service.lock.lock()).await;
        assert!(relock.is_ok());
    }

    #[tokio::test]
    async fn second_listing_fails_fast_while_a_slow_one_runs() {
        let temp = tempdir().unwrap();
        let slow = temp.path().join("slow");
        for d in 0..300 {
            let dir = slow.join(format!("d{d}"));
            fs::create_dir_all(&dir).unwrap();
            for f in 0..50 {
                fs::write(dir.join(format!("f{f}")), b"x").unwrap();
            }
        }
        let other = temp.path().join("other");
        fs::create_dir(&other).unwrap();
        let service = Arc::new(service(Duration::from_millis(1)));

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.list_children(&slow).await }
        });
        while service.lock.try_lock().is_ok() {
            tokio::task::yield_now().await;
        }

        let err = service.list_children(&other).await.unwrap_err();
        assert!(matches!(err, ListingError::Contention { .. }), "{err}");

        let listing = first.await.unwrap().unwrap();
        assert_eq!(listing.entries.len(), 300);
        assert_eq!(listing.total.file_count, 300 * 50);
    }
}
