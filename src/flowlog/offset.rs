use std::collections::HashMap;

/// Per-stream lag of the downstream log pipeline.
pub type Offsets = HashMap<String, i64>;

pub trait LogOffset: Send + Sync {
    fn read(&self) -> Offsets;

    fn is_behind(&self, offsets: &Offsets) -> bool;

    fn increase_factor(&self, offsets: &Offsets) -> usize;
}

pub struct NoOpLogOffset;

impl LogOffset for NoOpLogOffset {
    fn read(&self) -> Offsets {
        Offsets::new()
    }

    fn is_behind(&self, _offsets: &Offsets) -> bool {
        false
    }

    fn increase_factor(&self, _offsets: &Offsets) -> usize {
        1
    }
}
