// Wall-clock source.

use crate::phase;

pub trait WallClock {
    /// Seconds on the device clock. Only the time of day is meaningful.
    fn now_secs(&mut self) -> u64;

    fn seconds_of_day(&mut self) -> u32 {
        phase::seconds_of_day(self.now_secs())
    }
}

/// Fixed clock for host tests and replays.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedClock(pub u64);

impl WallClock for FixedClock {
    fn now_secs(&mut self) -> u64 {
        self.0
    }
}
