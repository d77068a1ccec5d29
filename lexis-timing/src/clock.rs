use crate::timer::Timer;
use std::time::Duration;

/// Session clock: started once when the welcome screen is confirmed, never reset.
#[derive(Debug, Clone)]
pub struct SessionClock<T: Timer> {
    timer: T,
    started: T::Timestamp,
}

impl<T: Timer> SessionClock<T> {
    pub fn start(timer: T) -> Self {
        let started = timer.now();
        Self { timer, started }
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed(self.started)
    }

    /// Elapsed session time at a timestamp taken from the same timer
    pub fn elapsed_at(&self, ts: T::Timestamp) -> Duration {
        self.timer.between(self.started, ts)
    }
}
