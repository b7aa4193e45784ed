use std::time::Instant;

/// Flow logs emitted since the last reset.
#[derive(Debug)]
pub struct FlowLogAvg {
    total: usize,
    since: Instant,
}

impl FlowLogAvg {
    pub fn new() -> Self {
        Self {
            total: 0,
            since: Instant::now(),
        }
    }

    pub fn update(&mut self, count: usize) {
        self.total += count;
    }

    pub fn reset(&mut self) {
        self.total = 0;
        self.since = Instant::now();
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn since(&self) -> Instant {
        self.since
    }

    pub fn per_minute(&self) -> f64 {
        let minutes = self.since.elapsed().as_secs_f64() / 60.0;
        match minutes > 0.0 {
            true  => self.total as f64 / minutes,
            false => 0.0,
        }
    }
}
