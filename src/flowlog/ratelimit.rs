use std::time::{Duration, Instant};
use parking_lot::Mutex;

pub struct RateLimited {
    last:     Mutex<Option<Instant>>,
    interval: Duration,
}

impl RateLimited {
    pub fn new(interval: Duration) -> Self {
        Self {
            last:     Mutex::new(None),
            interval: interval,
        }
    }

    /// Returns true at most once per interval.
    pub fn ready(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock();
        match *last {
            Some(t) if now.saturating_duration_since(t) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
