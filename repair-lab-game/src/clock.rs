//! Wall-clock abstraction. Each transition captures exactly one [`Moment`].
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::cell::Cell;

/// A single capture of "now": epoch milliseconds plus the local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub epoch_ms: i64,
    pub date: NaiveDate,
}

impl Moment {
    #[must_use]
    pub const fn new(epoch_ms: i64, date: NaiveDate) -> Self {
        Self { epoch_ms, date }
    }

    /// Moment for a UTC timestamp, using the UTC calendar day.
    #[must_use]
    pub fn from_utc(at: DateTime<Utc>) -> Self {
        Self {
            epoch_ms: at.timestamp_millis(),
            date: at.date_naive(),
        }
    }

    /// Milliseconds elapsed since `earlier_ms`.
    #[must_use]
    pub const fn since(&self, earlier_ms: i64) -> i64 {
        self.epoch_ms.saturating_sub(earlier_ms)
    }

    /// The calendar day before this moment's date.
    #[must_use]
    pub fn yesterday(&self) -> Option<NaiveDate> {
        self.date.pred_opt()
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Moment;
}

/// Real clock: UTC milliseconds with the local calendar day for streaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        let local = Local::now();
        Moment {
            epoch_ms: local.timestamp_millis(),
            date: local.date_naive(),
        }
    }
}

/// Hand-driven clock for tests and simulations. The calendar day follows UTC.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Cell<i64>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Cell::new(epoch_ms),
        }
    }

    /// Clock starting at midday UTC on the given date.
    #[must_use]
    pub fn at_noon(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map_or(0, |naive| Utc.from_utc_datetime(&naive).timestamp_millis());
        Self::new(noon)
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.epoch_ms.set(self.epoch_ms.get().saturating_add(delta_ms));
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs.saturating_mul(1_000));
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_ms(days.saturating_mul(86_400_000));
    }

    pub fn set_ms(&self, epoch_ms: i64) {
        self.epoch_ms.set(epoch_ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Moment {
        let epoch_ms = self.epoch_ms.get();
        let date = DateTime::<Utc>::from_timestamp_millis(epoch_ms)
            .map_or(NaiveDate::MIN, |at| at.date_naive());
        Moment { epoch_ms, date }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Moment {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> Moment {
        (**self).now()
    }
}
