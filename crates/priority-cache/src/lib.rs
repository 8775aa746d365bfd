//! # dirlens priority cache
//!
//! Bounded memoization where the *value* decides what stays cached.
//!
//! ```text
//! get_or_compute(key)
//!     │
//!     ├──> hit ───────────────> stored value
//!     │
//!     ├──> being computed ────> wait for that computation
//!     │
//!     └──> miss ──> compute ──┬─> room left           ─> insert
//!                             ├─> value > minimum     ─> evict minimum, insert
//!                             └─> value <= minimum    ─> return uncached
//! ```
//!
//! Large results are expensive to rebuild, so they win over small ones once the
//! cache is full.
//!
//! ## Example
//!
//! ```
//! use dirlens_priority_cache::PriorityCache;
//!
//! let cache: PriorityCache<&str, u64> = PriorityCache::new(2);
//! assert_eq!(cache.get_or_compute("a", |_| 10), 10);
//! assert_eq!(cache.get_or_compute("b", |_| 20), 20);
//! // full: 5 is below the minimum (10) so it is not kept
//! assert_eq!(cache.get_or_compute("c", |_| 5), 5);
//! assert!(!cache.contains(&"c"));
//! ```

mod cache;
mod error;
mod stats;

pub use cache::{CachePriority, PriorityCache};
pub use error::{CacheError, Result};
pub use stats::CacheStats;
