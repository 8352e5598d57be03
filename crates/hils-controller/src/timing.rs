//! Timing Driver (§4.8 / C8): a single monotonic clock reading drives
//! scheduling; wall time never enters the scheduling decision, only the
//! archival telemetry fields.

use std::time::{Duration, Instant};

use tracing::warn;

pub struct TickScheduler {
    period: Duration,
    deadline_misses: u64,
}

impl TickScheduler {
    pub fn new(rate_hz: f64) -> Self {
        Self { period: Duration::from_secs_f64(1.0 / rate_hz), deadline_misses: 0 }
    }

    pub fn deadline_misses(&self) -> u64 {
        self.deadline_misses
    }

    /// Sleep until `tick_start + period`. If that instant has already
    /// passed, log the overrun, record a deadline miss, and return
    /// immediately without catch-up sleeping.
    pub fn sleep_until_next(&mut self, tick_start: Instant) {
        let deadline = tick_start + self.period;
        let now = Instant::now();
        if now >= deadline {
            self.deadline_misses += 1;
            warn!("deadline miss: tick overran by {:?}", now - deadline);
            return;
        }
        std::thread::sleep(deadline - now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_miss_when_tick_finishes_early() {
        let mut sched = TickScheduler::new(1000.0); // 1ms period
        let start = Instant::now();
        sched.sleep_until_next(start);
        assert_eq!(sched.deadline_misses(), 0);
    }

    #[test]
    fn miss_recorded_when_tick_overruns() {
        let mut sched = TickScheduler::new(1_000_000.0); // 1us period, trivially overrun
        let start = Instant::now() - Duration::from_millis(10);
        sched.sleep_until_next(start);
        assert_eq!(sched.deadline_misses(), 1);
    }
}
