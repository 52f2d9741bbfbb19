use chrono::{Local, NaiveDateTime, TimeDelta};
use pocketcal_core::hal::Clock;

/// Local wall time, shifted by whatever the user set the clock to.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: TimeDelta,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            offset: TimeDelta::zero(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local() + self.offset
    }

    fn adjust(&mut self, to: NaiveDateTime) {
        self.offset = to - Local::now().naive_local();
    }
}
