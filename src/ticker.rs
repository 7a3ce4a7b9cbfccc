use std::time::Duration;

/// Dashboard redraw interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Ticks between store reloads (one second at the default rate)
pub const RELOAD_EVERY_TICKS: u32 = 4;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

/// Counts redraw ticks and says when the store should be re-read
#[derive(Debug, Default)]
pub struct Ticker {
    count: u32,
}

impl Ticker {
    /// Advance one tick; returns true when a reload is due
    pub fn tick(&mut self) -> bool {
        self.count = (self.count + 1) % RELOAD_EVERY_TICKS;
        self.count == 0
    }
}
