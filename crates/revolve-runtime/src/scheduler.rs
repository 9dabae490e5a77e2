//! [`ActuationScheduler`] – gates brain updates on simulated time.
//!
//! # Algorithm
//!
//! On every host tick the scheduler compares the time since the last
//! executed tick against the actuation period. Only a strictly larger gap
//! fires; firing moves the reference point to the current time. Missed
//! periods are never replayed, so a large jump in simulated time produces a
//! single update.
//!
//! The reference point starts at simulated time 0, not at the time the
//! controller attached, so a controller attached late fires on its first
//! tick.
//!
//! # Example
//!
//! ```rust
//! use revolve_runtime::scheduler::ActuationScheduler;
//!
//! let mut scheduler = ActuationScheduler::from_update_rate(10.0);
//!
//! assert!(!scheduler.tick(0.1)); // exactly one period: not yet
//! assert!(scheduler.tick(0.11));
//! assert!(!scheduler.tick(0.15));
//! ```

/// Fires at most once per actuation period of simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct ActuationScheduler {
    period: f64,
    last_actuation: f64,
}

impl ActuationScheduler {
    /// A scheduler with the given period in seconds and no actuation yet.
    pub fn new(period: f64) -> Self {
        Self {
            period,
            last_actuation: 0.0,
        }
    }

    /// Period `1 / update_rate`.
    ///
    /// A rate of 0 gives an infinite period, so the brain never runs. A
    /// negative rate gives a negative period, which fires on every tick.
    pub fn from_update_rate(update_rate: f64) -> Self {
        Self::new(1.0 / update_rate)
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Simulated time of the most recent executed tick, 0 before the first.
    pub fn last_actuation(&self) -> f64 {
        self.last_actuation
    }

    /// Record a host tick at `now`; returns whether the brain should run.
    pub fn tick(&mut self, now: f64) -> bool {
        if now - self.last_actuation > self.period {
            self.last_actuation = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        let mut s = ActuationScheduler::new(0.5);
        assert!(!s.tick(0.5));
        assert_eq!(s.last_actuation(), 0.0);
        assert!(s.tick(0.5001));
        assert_eq!(s.last_actuation(), 0.5001);
    }

    #[test]
    fn last_actuation_moves_only_when_firing() {
        let mut s = ActuationScheduler::new(1.0);
        assert!(s.tick(1.0001));
        for now in [1.2, 1.5, 1.9, 2.0] {
            assert!(!s.tick(now));
            assert_eq!(s.last_actuation(), 1.0001);
        }
        assert!(s.tick(2.1));
        assert!(!s.tick(3.0));
        assert_eq!(s.last_actuation(), 2.1);
    }

    #[test]
    fn late_start_fires_on_first_tick() {
        let mut s = ActuationScheduler::from_update_rate(2.0);
        assert!(s.tick(10.1));
        assert_eq!(s.last_actuation(), 10.1);
        assert!(!s.tick(10.5));
        assert!(s.tick(10.61));
    }

    #[test]
    fn no_catch_up_after_time_jump() {
        let mut s = ActuationScheduler::new(0.1);
        assert!(s.tick(10.0));
        assert!(!s.tick(10.05));
        assert!(s.tick(10.2));
    }

    #[test]
    fn zero_period_fires_whenever_time_advances() {
        let mut s = ActuationScheduler::new(0.0);
        assert!(!s.tick(0.0));
        assert!(s.tick(0.001));
        assert!(!s.tick(0.001));
        assert!(s.tick(0.002));
    }

    #[test]
    fn zero_rate_never_fires() {
        let mut s = ActuationScheduler::from_update_rate(0.0);
        assert_eq!(s.period(), f64::INFINITY);
        assert!(!s.tick(1.0e9));
        assert_eq!(s.last_actuation(), 0.0);
    }

    #[test]
    fn negative_rate_fires_every_tick() {
        let mut s = ActuationScheduler::from_update_rate(-2.0);
        assert_eq!(s.period(), -0.5);
        assert!(s.tick(0.0));
        assert!(s.tick(0.0));
    }

    #[test]
    fn period_from_update_rate() {
        assert_eq!(ActuationScheduler::from_update_rate(8.0).period(), 0.125);
    }
}
