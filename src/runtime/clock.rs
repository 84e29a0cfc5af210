//! Tick timing for the update loop.

use std::time::{Duration, Instant};

/// Timing of the current update tick.
///
/// Handed to every [`Widget::on_update`](crate::widget::Widget::on_update)
/// call and to the global update hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    now: Instant,
    ticks: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// A clock that has not ticked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A clock whose first tick is measured from `start`.
    #[must_use]
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            now: start,
            ticks: 0,
        }
    }

    /// Advance to the current time.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advance to `now`. Times before the current tick are clamped to it.
    pub fn tick_at(&mut self, now: Instant) {
        self.last = self.now;
        self.now = now.max(self.now);
        self.ticks = self.ticks.saturating_add(1);
    }

    /// Time of the current tick.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Time between the previous tick and this one.
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        self.now.duration_since(self.last)
    }

    /// Time since the clock started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now.duration_since(self.start)
    }

    /// Number of ticks so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
