use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counters for one cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,

    /// Lookups that ran the compute function
    pub misses: u64,

    /// Entries pushed out by a larger value
    pub evictions: u64,

    /// Computed values not kept because the cache was full of larger ones
    pub rejections: u64,

    /// Entries currently held
    pub len: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    rejections: AtomicU64,
}

impl StatCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, len: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            len,
        }
    }
}
