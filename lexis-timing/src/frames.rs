use std::collections::VecDeque;
use std::time::Duration;

/// Summary of recorded frame durations
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
    pub samples: usize,
}

/// Bounded log of the most recent frame intervals
#[derive(Debug, Clone)]
pub struct FrameLog {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    last_present: Option<Duration>,
}

impl FrameLog {
    pub fn new(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            last_present: None,
        }
    }

    /// Marks a frame presented at `at` (time since a fixed origin) and
    /// records the interval since the previous one.
    pub fn present(&mut self, at: Duration) {
        if let Some(prev) = self.last_present {
            self.record(at.saturating_sub(prev));
        }
        self.last_present = Some(at);
    }

    pub fn record(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(d);
    }

    pub fn len(&self) -> usize {
        self.frame_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_times.is_empty()
    }

    pub fn stats(&self) -> FrameStats {
        let times: Vec<f64> = self
            .frame_times
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return FrameStats {
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                min_frame_time_ns: 0.0,
                max_frame_time_ns: 0.0,
                effective_fps: 0.0,
                samples: 0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        FrameStats {
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
            samples: times.len(),
        }
    }
}

impl Default for FrameLog {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_reports_zeroes() {
        let stats = FrameLog::default().stats();
        assert_eq!(stats.samples, 0);
        assert_eq!(stats.effective_fps, 0.0);
    }

    #[test]
    fn stats_over_steady_frames() {
        let mut log = FrameLog::new(10);
        for _ in 0..4 {
            log.record(Duration::from_millis(10));
        }
        let stats = log.stats();
        assert_eq!(stats.samples, 4);
        assert!((stats.effective_fps - 100.0).abs() < 1e-9);
        assert_eq!(stats.jitter_ns, 0.0);
        assert_eq!(stats.min_frame_time_ns, stats.max_frame_time_ns);
    }

    #[test]
    fn presents_record_intervals_between_frames() {
        let mut log = FrameLog::default();
        log.present(Duration::from_millis(1000));
        assert!(log.is_empty());
        log.present(Duration::from_millis(1016));
        log.present(Duration::from_millis(1033));
        log.present(Duration::from_millis(1050));
        let stats = log.stats();
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.min_frame_time_ns, 16_000_000.0);
        assert_eq!(stats.max_frame_time_ns, 17_000_000.0);
        assert!((stats.effective_fps - 60.0).abs() < 0.1);
    }

    #[test]
    fn keeps_only_latest_samples() {
        let mut log = FrameLog::new(2);
        log.record(Duration::from_millis(100));
        log.record(Duration::from_millis(10));
        log.record(Duration::from_millis(20));
        assert_eq!(log.len(), 2);
        assert_eq!(log.stats().max_frame_time_ns, 20_000_000.0);
    }
}
