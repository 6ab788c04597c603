//! Time source and id allocation.
//!
//! # Invariants
//! - Calendar-day math uses the UTC date of a timestamp.
//! - Issued ids are strictly greater than every id already present.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for every date-dependent operation.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of `now()`.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant; tests advance it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Noon UTC on `date`, so day arithmetic never straddles midnight.
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc();
        Self::new(noon)
    }

    pub fn advance_days(&mut self, days: i64) {
        self.now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Allocates a creation-timestamp id that does not collide with `existing`.
///
/// Two creations in the same millisecond get consecutive ids.
pub fn next_id(now: DateTime<Utc>, existing: impl IntoIterator<Item = i64>) -> i64 {
    let candidate = now.timestamp_millis().max(1);
    match existing.into_iter().max() {
        Some(max) if max >= candidate => max + 1,
        _ => candidate,
    }
}
