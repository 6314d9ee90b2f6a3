use std::{
    thread::sleep,
    time::{Duration, Instant},
};

/// Paces a foreground loop that polls a running simulation.
///
/// Polls are scheduled on fixed deadlines `period` apart. A poll that overruns
/// its slot does not cause a burst of catch-up polls: the schedule restarts one
/// period after the late poll. [`record`](Self::record) turns the generation
/// numbers seen at each poll into a smoothed generations-per-second rate.
pub struct PollLimiter {
    period: Duration,
    next_poll: Instant,
    last_seen: (Instant, u64),
    generation_rate: f64,
}

impl PollLimiter {
    /// Non-positive or non-finite rates disable pacing.
    pub fn new(max_hz: f64) -> Self {
        let now = Instant::now();
        let mut limiter = Self {
            period: Duration::ZERO,
            next_poll: now,
            last_seen: (now, 0),
            generation_rate: 0.,
        };
        limiter.set_max_hz(max_hz);
        limiter
    }

    pub fn set_max_hz(&mut self, max_hz: f64) {
        self.period = if max_hz.is_finite() && max_hz > 0. {
            Duration::from_secs_f64(1. / max_hz)
        } else {
            Duration::ZERO
        };
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps until the next poll is due.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next_poll > now {
            sleep(self.next_poll - now);
        }
        self.next_poll = self.next_poll.max(Instant::now()) + self.period;
    }

    /// Records the generation number read by this poll and returns how many
    /// generations were published since the previous one.
    ///
    /// A number lower than the last one means the field was replaced and the
    /// counter restarted, so everything up to `generation` is new.
    pub fn record(&mut self, generation: u64) -> u64 {
        let now = Instant::now();
        let (seen_at, seen) = self.last_seen;
        let advanced = if generation >= seen {
            generation - seen
        } else {
            generation
        };
        let elapsed = now.duration_since(seen_at).as_secs_f64();
        if elapsed > 0. {
            let sample = advanced as f64 / elapsed;
            self.generation_rate += (sample - self.generation_rate) * 0.1;
        }
        self.last_seen = (now, generation);
        advanced
    }

    /// Smoothed generations per second over the recorded polls, 0 before any.
    pub fn generation_rate(&self) -> f64 {
        self.generation_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_paces_polls() {
        let mut limiter = PollLimiter::new(50.);
        assert!((limiter.period().as_secs_f64() - 0.02).abs() < 1e-6);
        let timer = Instant::now();
        for _ in 0..3 {
            limiter.wait();
        }
        // the first poll is due at once
        assert!(timer.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_overrun_is_not_caught_up() {
        let mut limiter = PollLimiter::new(100.);
        limiter.wait();
        sleep(Duration::from_millis(50));

        limiter.wait();
        let timer = Instant::now();
        limiter.wait();
        assert!(timer.elapsed() >= Duration::from_millis(9));
    }

    #[test]
    fn test_unlimited() {
        let mut limiter = PollLimiter::new(0.);
        assert_eq!(limiter.period(), Duration::ZERO);
        limiter.set_max_hz(f64::NAN);
        let timer = Instant::now();
        for _ in 0..100 {
            limiter.wait();
        }
        assert!(timer.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_record_counts_advance() {
        let mut limiter = PollLimiter::new(0.);
        assert_eq!(limiter.generation_rate(), 0.);

        sleep(Duration::from_millis(1));
        assert_eq!(limiter.record(5), 5);
        sleep(Duration::from_millis(1));
        assert_eq!(limiter.record(12), 7);
        assert!(limiter.generation_rate() > 0.);

        // field replaced, counter back near zero
        assert_eq!(limiter.record(3), 3);
        assert_eq!(limiter.record(3), 0);
    }
}
