use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for monotonic experiment clocks
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync + std::fmt::Debug;
    fn now(&self) -> Self::Timestamp;
    /// Time from `earlier` to `later`, zero if `later` is not after `earlier`
    fn between(&self, earlier: Self::Timestamp, later: Self::Timestamp) -> Duration;

    fn elapsed(&self, ts: Self::Timestamp) -> Duration {
        self.between(ts, self.now())
    }
}

/// Monotonic nanosecond clock anchored at construction
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    pub start: Instant,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
    fn between(&self, earlier: u64, later: u64) -> Duration {
        Duration::from_nanos(later.saturating_sub(earlier))
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock that only moves when told to; clones share the same time.
///
/// Drives sessions deterministically in tests and replays.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_ns
            .fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.now_ns.store(at.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
    fn between(&self, earlier: u64, later: u64) -> Duration {
        Duration::from_nanos(later.saturating_sub(earlier))
    }
}
