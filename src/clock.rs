/// Source of "now" for the schedule engine.
///
/// Validation depends on the wall clock, so it is passed in rather than
/// read globally. Any `Fn() -> NaiveDateTime` works as a clock.

use chrono::{Local, NaiveDateTime};

pub trait Clock {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDateTime,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}
