use std::sync::Arc;
use parking_lot::Mutex;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Report {
    pub live:  bool,
    pub ready: bool,
}

#[derive(Clone, Default)]
pub struct Health {
    state: Arc<Mutex<Report>>,
}

impl Health {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, live: bool, ready: bool) {
        *self.state.lock() = Report { live, ready };
    }

    pub fn summary(&self) -> Report {
        *self.state.lock()
    }
}
