use crate::{ConfigError, DirlensConfig, Listing, ListingError, ListingService, Result};
use dirlens_priority_cache::PriorityCache;
use dirlens_protocol::{ListingResponse, ListingSummary, ScanStatus};
use dirlens_scanner::{
    DirectorySizeAggregator, ExclusionList, FolderSize, ProgressThrottle, ScanTelemetry,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything one process shares between requests: telemetry, the folder size
/// cache, the listing cache and the listing lock.
///
/// Build one per process (or per test) and hand it to whatever serves requests.
pub struct ScanContext {
    telemetry: Arc<ScanTelemetry>,
    aggregator: Arc<DirectorySizeAggregator>,
    listings: ListingService,
}

impl ScanContext {
    pub fn new(config: &DirlensConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let size_cache = PriorityCache::with_signed_capacity(config.size_cache_capacity)
            .map_err(|_| ConfigError::InvalidCapacity {
                field: "size_cache_capacity",
                value: config.size_cache_capacity,
            })?;
        let listing_cache = PriorityCache::with_signed_capacity(config.listing_cache_capacity)
            .map_err(|_| ConfigError::InvalidCapacity {
                field: "listing_cache_capacity",
                value: config.listing_cache_capacity,
            })?;

        let telemetry = Arc::new(ScanTelemetry::new());
        let aggregator = Arc::new(
            DirectorySizeAggregator::with_cache(
                size_cache,
                ExclusionList::new(&config.exclude),
                Arc::clone(&telemetry),
            )
            .with_progress(ProgressThrottle::new(config.progress_interval())),
        );
        let listings =
            ListingService::new(Arc::clone(&aggregator), listing_cache, config.lock_timeout());

        Ok(Self {
            telemetry,
            aggregator,
            listings,
        })
    }

    pub fn telemetry(&self) -> &Arc<ScanTelemetry> {
        &self.telemetry
    }

    pub fn aggregator(&self) -> &Arc<DirectorySizeAggregator> {
        &self.aggregator
    }

    pub fn listings(&self) -> &ListingService {
        &self.listings
    }

    pub async fn list_children(&self, path: &Path) -> Result<Arc<Listing>> {
        self.listings.list_children(path).await
    }

    /// Listing plus the running scan summary.
    pub async fn get_listing(&self, path: &Path) -> Result<ListingResponse> {
        let listing = self.listings.list_children(path).await?;
        let snapshot = self.telemetry.snapshot();
        Ok(ListingResponse {
            path: listing.path.display().to_string(),
            entries: listing.entries.clone(),
            summary: ListingSummary::new(
                snapshot.total_files,
                snapshot.total_bytes,
                snapshot.primary_scan_seconds().unwrap_or_default(),
            ),
        })
    }

    /// Recursive size of one directory, computed off the async runtime.
    pub async fn folder_size(&self, path: &Path) -> Result<FolderSize> {
        let aggregator = Arc::clone(&self.aggregator);
        let dir: PathBuf = tokio::fs::canonicalize(path)
            .await
            .map_err(|err| ListingError::from_open(path.to_path_buf(), err))?;
        tokio::task::spawn_blocking(move || aggregator.folder_size(&dir))
            .await
            .map_err(|err| ListingError::Worker(err.to_string()))
    }

    pub fn scan_status(&self) -> ScanStatus {
        let snapshot = self.telemetry.snapshot();
        ScanStatus::new(
            snapshot.total_files,
            snapshot.total_bytes,
            snapshot
                .current_path
                .map(|path| path.display().to_string()),
        )
    }
}
