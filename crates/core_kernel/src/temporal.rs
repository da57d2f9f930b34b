//! Time handling for the service desk
//!
//! - [`Clock`]: the source of "now" for lifecycle operations, swappable in tests
//! - [`Timezone`]: the business time zone used for calendar-month reporting
//! - [`MonthWindow`]: a half-open calendar month expressed in UTC

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid calendar date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Local midnight of {0} does not exist in the business time zone")]
    NonexistentLocalTime(NaiveDate),

    #[error("Unknown time zone: {0}")]
    UnknownTimezone(String),
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock for deterministic tests and replays
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Moves the clock forward (or backward, for a negative duration)
    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Business time zone, serialized as its IANA name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Local calendar date of a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    /// First instant of the local day, as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(self.0).earliest())
            .map(|local| local.with_timezone(&Utc))
            .ok_or(TemporalError::NonexistentLocalTime(date))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Europe::Paris)
    }
}

/// A calendar month in the business time zone, as the half-open UTC range
/// `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// The month containing `instant`
    pub fn containing(instant: DateTime<Utc>, tz: Timezone) -> Result<Self, TemporalError> {
        let local = tz.local_date(instant);
        Self::of(local.year(), local.month(), tz)
    }

    /// The given calendar month
    pub fn of(year: i32, month: u32, tz: Timezone) -> Result<Self, TemporalError> {
        let first = first_of_month(year, month)?;
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let next_first = first_of_month(next_year, next_month)?;

        Ok(Self {
            year,
            month,
            start: tz.start_of_day(first)?,
            end: tz.start_of_day(next_first)?,
        })
    }

    /// The calendar month immediately before this one
    pub fn previous(&self, tz: Timezone) -> Result<Self, TemporalError> {
        if self.month == 1 {
            Self::of(self.year - 1, 12, tz)
        } else {
            Self::of(self.year, self.month - 1, tz)
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, TemporalError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(TemporalError::InvalidDate {
        year,
        month,
        day: 1,
    })
}
