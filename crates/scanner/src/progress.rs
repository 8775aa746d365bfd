use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const NEVER: u64 = u64::MAX;

/// Rate limiter for advisory progress messages.
#[derive(Debug)]
pub struct ProgressThrottle {
    origin: Instant,
    interval_ms: u64,
    last_ms: AtomicU64,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            last_ms: AtomicU64::new(NEVER),
        }
    }

    /// `true` when at least one interval has passed since the last report.
    /// Only one of several racing callers wins.
    pub fn try_acquire(&self) -> bool {
        let now = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(NEVER - 1);
        let last = self.last_ms.load(Ordering::Relaxed);
        if last != NEVER && now.saturating_sub(last) < self.interval_ms {
            return false;
        }
        self.last_ms
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }
}

impl Default for ProgressThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
