//! Polling policy arithmetic for asynchronous vendor jobs.
//!
//! A [`PollPolicy`] defines a bounded exponential-backoff schedule: the
//! delay before attempt `n` grows by a multiplier up to a cap, and the
//! total number of attempts is bounded. The loop that executes the schedule
//! lives in the vendors crate; this module is pure arithmetic so the
//! schedule itself can be unit tested.

use std::time::Duration;

/// Bounded exponential-backoff polling schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first status probe.
    pub initial_interval: Duration,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_multiplier: f64,
    /// Maximum number of status probes before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// Default schedule for video-length vendor jobs: 2s, 3s, 4.5s, ...
    /// capped at 15s, for at most 40 probes (a bit over 9 minutes of wall
    /// time including the probes themselves).
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(15),
            backoff_multiplier: 1.5,
            max_attempts: 40,
        }
    }
}

impl PollPolicy {
    /// Delay to sleep before the given attempt (0-based).
    ///
    /// `delay_for(0)` is the initial interval; each subsequent attempt
    /// multiplies the previous delay by the backoff multiplier, clamped to
    /// the maximum interval.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let scaled = self.initial_interval.as_secs_f64() * factor;
        let capped = scaled.min(self.max_interval.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Upper bound on the total time spent sleeping across all attempts.
    pub fn total_budget(&self) -> Duration {
        (0..self.max_attempts).map(|a| self.delay_for(a)).sum()
    }
}
