//! Wall-clock seam for scheduling and calendar-day math.
//!
//! Timestamps are stored in UTC; "today" and weekday labels are computed in the
//! clock's time zone, so each timestamp gets the offset in force at that instant.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};

pub trait Clock {
  /// Zone used for calendar days
  type Tz: TimeZone;

  fn now(&self) -> DateTime<Self::Tz>;

  fn now_utc(&self) -> DateTime<Utc> {
    self.now().with_timezone(&Utc)
  }
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  type Tz = Local;

  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
  pub fn new(now: DateTime<FixedOffset>) -> Self {
    Self(now)
  }

  pub fn utc(now: DateTime<Utc>) -> Self {
    Self(now.fixed_offset())
  }
}

impl Clock for FixedClock {
  type Tz = FixedOffset;

  fn now(&self) -> DateTime<FixedOffset> {
    self.0
  }
}

impl<C: Clock + ?Sized> Clock for &C {
  type Tz = C::Tz;

  fn now(&self) -> DateTime<C::Tz> {
    (**self).now()
  }
}

/// Calendar date of `timestamp` in `now`'s time zone
pub fn local_date<Tz: TimeZone>(timestamp: DateTime<Utc>, now: &DateTime<Tz>) -> NaiveDate {
  timestamp.with_timezone(&now.timezone()).date_naive()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_fixed_clock_is_frozen() {
    let instant = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let clock = FixedClock::utc(instant);
    assert_eq!(clock.now_utc(), instant);
    assert_eq!(clock.now_utc(), instant);
  }

  #[test]
  fn test_local_date_uses_offset() {
    // 23:30 UTC is already the next day at UTC+2
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = plus_two.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap();
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap();

    assert_eq!(local_date(ts, &now), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
  }

  #[test]
  fn test_system_clock_dates_follow_local_zone() {
    let now = SystemClock.now();
    // half a year back usually sits on the other side of a DST change
    for days_back in [0, 91, 182, 273] {
      let ts = now.with_timezone(&Utc) - chrono::Duration::days(days_back);
      assert_eq!(local_date(ts, &now), ts.with_timezone(&Local).date_naive());
    }
  }
}
