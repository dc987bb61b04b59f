use chrono::{DateTime, FixedOffset, Local, NaiveDateTime};

/// Source of the current moment, used to resolve weekdays into dates and to
/// stamp serialized events.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Pins the clock to a wall-clock time at UTC offset zero.
    #[must_use]
    pub fn at(naive: NaiveDateTime) -> Self {
        Self(naive.and_utc().fixed_offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
