//! Run clock for progress and ETA reporting.
//!
//! A render run is anchored to a monotonic epoch taken when the job loop
//! starts. Remaining time is extrapolated from the average duration of the
//! jobs completed so far.

use std::time::Instant;

/// Monotonic clock anchored at the start of a render run.
#[derive(Debug, Clone)]
pub struct RunClock {
    /// The instant the run started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RunClock {
    /// Create a new run clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since the run started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at run start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Estimated seconds remaining after `done` of `total` jobs.
    pub fn eta_secs(&self, done: u32, total: u32) -> f64 {
        estimate_remaining(self.elapsed_secs(), done, total)
    }
}

/// Extrapolate remaining time from the mean per-job duration.
///
/// Returns 0.0 before the first job completes or once all jobs are done.
pub fn estimate_remaining(elapsed_secs: f64, done: u32, total: u32) -> f64 {
    if done == 0 || done >= total {
        return 0.0;
    }
    let per_job = elapsed_secs / done as f64;
    per_job * (total - done) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = RunClock::start();
        assert!(clock.elapsed_secs() < 1.0);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_estimate_remaining() {
        assert!((estimate_remaining(10.0, 2, 6) - 20.0).abs() < 1e-9);
        assert_eq!(estimate_remaining(10.0, 0, 6), 0.0);
        assert_eq!(estimate_remaining(10.0, 6, 6), 0.0);
    }
}
