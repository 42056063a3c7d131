use std::sync::RwLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used by tests.
pub struct FixedClock(RwLock<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(RwLock::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.write().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date format, expected YYYY-MM-DD")]
    Malformed,
    #[error("Date {0} does not exist")]
    NoSuchDay(String),
}

/// Truncate an instant to UTC midnight of the same day.
pub fn start_of_utc_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(at)
}

/// UTC midnight of the day before `at`.
pub fn previous_utc_day(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_utc_day(at) - Duration::days(1)
}

/// UTC midnight of the day after `at`.
pub fn next_utc_day(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_utc_day(at) + Duration::days(1)
}

/// Parse `YYYY-MM-DD` into the UTC midnight instant of that day.
pub fn parse_calendar_date(raw: &str) -> Result<DateTime<Utc>, CalendarError> {
    let mut parts = raw.trim().split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CalendarError::Malformed);
    };

    let year: i32 = y.parse().map_err(|_| CalendarError::Malformed)?;
    let month: u32 = m.parse().map_err(|_| CalendarError::Malformed)?;
    let day: u32 = d.parse().map_err(|_| CalendarError::Malformed)?;
    if year <= 0 || month == 0 || day == 0 {
        return Err(CalendarError::Malformed);
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| CalendarError::NoSuchDay(raw.trim().to_string()))
}
