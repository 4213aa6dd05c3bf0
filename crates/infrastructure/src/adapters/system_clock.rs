//! Wall-clock adapter for the [`Clock`] port.

use chrono::{DateTime, Utc};
use courier_application::Clock;

/// Reads the operating system clock. Used to stamp history entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates the clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
