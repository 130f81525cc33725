//! CF time axis decoding
//!
//! Climate model output stores time as numeric offsets from a reference date
//! (`"days since 1950-01-01"`) interpreted in one of several model calendars.
//! This module turns those offsets into calendar dates, counts days between
//! dates, and provides the day-of-year lookups used by the percentile
//! thresholds.

use crate::errors::{ClimdexError, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;

const SECONDS_PER_DAY: f64 = 86_400.0;

const MONTH_LENGTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Model calendars understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    /// Proleptic Gregorian calendar (`standard`, `gregorian`, `proleptic_gregorian`)
    Gregorian,
    /// 365-day calendar without leap years (`noleap`, `365_day`)
    NoLeap,
    /// 366-day calendar where every year is a leap year (`all_leap`, `366_day`)
    AllLeap,
    /// Twelve 30-day months (`360_day`)
    Day360,
}

impl Calendar {
    /// Parse a CF `calendar` attribute value.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Self::Gregorian),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            "all_leap" | "366_day" => Ok(Self::AllLeap),
            "360_day" => Ok(Self::Day360),
            other => Err(ClimdexError::UnsupportedCalendar {
                calendar: other.to_string(),
            }),
        }
    }

    /// Canonical CF name for this calendar
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gregorian => "standard",
            Self::NoLeap => "noleap",
            Self::AllLeap => "all_leap",
            Self::Day360 => "360_day",
        }
    }

    #[must_use]
    pub fn is_leap(self, year: i32) -> bool {
        match self {
            Self::Gregorian => (year % 4 == 0 && year % 100 != 0) || year % 400 == 0,
            Self::NoLeap | Self::Day360 => false,
            Self::AllLeap => true,
        }
    }

    #[must_use]
    pub fn days_in_month(self, year: i32, month: u8) -> u8 {
        match self {
            Self::Day360 => 30,
            _ if month == 2 && self.is_leap(year) => 29,
            _ => MONTH_LENGTHS[usize::from(month.clamp(1, 12)) - 1],
        }
    }

    #[must_use]
    pub fn days_in_year(self, year: i32) -> u16 {
        match self {
            Self::Day360 => 360,
            _ if self.is_leap(year) => 366,
            _ => 365,
        }
    }

    /// Longest possible year, which sizes the day-of-year threshold tables
    #[must_use]
    pub const fn max_days_in_year(self) -> u16 {
        match self {
            Self::Gregorian | Self::AllLeap => 366,
            Self::NoLeap => 365,
            Self::Day360 => 360,
        }
    }

    /// Validate and build a date in this calendar.
    pub fn date(self, year: i32, month: u8, day: u8) -> Result<CalDate> {
        if !(1..=12).contains(&month) || day == 0 || day > self.days_in_month(year, month) {
            return Err(ClimdexError::InvalidTime {
                reason: format!(
                    "{year:04}-{month:02}-{day:02} is not a valid date in the {} calendar",
                    self.as_str()
                ),
            });
        }
        Ok(CalDate { year, month, day })
    }

    /// 1-based day of year of `date`.
    #[must_use]
    pub fn day_of_year(self, date: CalDate) -> u16 {
        let before: u16 = (1..date.month)
            .map(|m| u16::from(self.days_in_month(date.year, m)))
            .sum();
        before + u16::from(date.day)
    }

    /// Number of days from an arbitrary calendar-specific origin to `date`.
    ///
    /// Only differences between two values from the same calendar are meaningful.
    pub fn day_number(self, date: CalDate) -> Result<i64> {
        match self {
            Self::Gregorian => {
                let naive = NaiveDate::from_ymd_opt(
                    date.year,
                    u32::from(date.month),
                    u32::from(date.day),
                )
                .ok_or_else(|| ClimdexError::InvalidTime {
                    reason: format!("{date} is not a valid Gregorian date"),
                })?;
                Ok(i64::from(naive.num_days_from_ce()))
            }
            _ => {
                let year_len = i64::from(self.days_in_year(date.year));
                Ok(i64::from(date.year) * year_len + i64::from(self.day_of_year(date)) - 1)
            }
        }
    }

    /// Inverse of [`Calendar::day_number`].
    pub fn from_day_number(self, number: i64) -> Result<CalDate> {
        match self {
            Self::Gregorian => {
                let days = i32::try_from(number).map_err(|_| ClimdexError::InvalidTime {
                    reason: format!("day number {number} is out of range"),
                })?;
                let naive = NaiveDate::from_num_days_from_ce_opt(days).ok_or_else(|| {
                    ClimdexError::InvalidTime {
                        reason: format!("day number {number} is out of range"),
                    }
                })?;
                Ok(CalDate {
                    year: naive.year(),
                    month: naive.month() as u8,
                    day: naive.day() as u8,
                })
            }
            _ => {
                let year_len = i64::from(self.max_days_in_year());
                let year = i32::try_from(number.div_euclid(year_len)).map_err(|_| {
                    ClimdexError::InvalidTime {
                        reason: format!("day number {number} is out of range"),
                    }
                })?;
                let mut remaining = number.rem_euclid(year_len) as u16;
                let mut month = 1u8;
                loop {
                    let len = u16::from(self.days_in_month(year, month));
                    if remaining < len {
                        break;
                    }
                    remaining -= len;
                    month += 1;
                }
                Ok(CalDate {
                    year,
                    month,
                    day: remaining as u8 + 1,
                })
            }
        }
    }

    /// Add (or subtract) whole days to a date.
    pub fn add_days(self, date: CalDate, days: i64) -> Result<CalDate> {
        self.from_day_number(self.day_number(date)? + days)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date in a model calendar; ordering is chronological
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for CalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Parsed CF time units, e.g. `hours since 2000-01-01 12:00:00`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeUnits {
    /// Length of one offset unit in seconds
    pub step_seconds: f64,
    /// Reference date
    pub reference: CalDate,
    /// Time of day of the reference, in seconds after midnight
    pub reference_seconds: f64,
    pub calendar: Calendar,
}

impl TimeUnits {
    /// Parse a CF `units` string for the given calendar.
    pub fn parse(units: &str, calendar: Calendar) -> Result<Self> {
        let invalid = |reason: &str| ClimdexError::InvalidTime {
            reason: format!("{reason}: '{units}'"),
        };

        let mut parts = units.trim().splitn(3, char::is_whitespace);
        let unit = parts.next().unwrap_or_default().to_ascii_lowercase();
        if parts.next().map(str::to_ascii_lowercase).as_deref() != Some("since") {
            return Err(invalid("expected '<unit> since <date>'"));
        }
        let stamp = parts.next().ok_or_else(|| invalid("missing reference date"))?.trim();

        let step_seconds = match unit.as_str() {
            "days" | "day" | "d" => SECONDS_PER_DAY,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            _ => return Err(invalid("unsupported time unit")),
        };

        let (date_part, time_part) = match stamp.split_once(['T', ' ']) {
            Some((d, t)) => (d, Some(t.trim())),
            None => (stamp, None),
        };

        let fields: Vec<&str> = date_part.split('-').collect();
        let (year, month, day) = match fields.as_slice() {
            [y, m, d] => (
                y.parse::<i32>().map_err(|_| invalid("bad reference year"))?,
                m.parse::<u8>().map_err(|_| invalid("bad reference month"))?,
                d.parse::<u8>().map_err(|_| invalid("bad reference day"))?,
            ),
            _ => return Err(invalid("bad reference date")),
        };
        let reference = calendar.date(year, month, day)?;

        let reference_seconds = match time_part {
            Some(t) if !t.is_empty() => parse_time_of_day(t).ok_or_else(|| invalid("bad reference time"))?,
            _ => 0.0,
        };

        Ok(Self {
            step_seconds,
            reference,
            reference_seconds,
            calendar,
        })
    }

    /// Calendar date on which the given offset falls.
    pub fn decode(&self, offset: f64) -> Result<CalDate> {
        if !offset.is_finite() {
            return Err(ClimdexError::InvalidTime {
                reason: format!("non-finite time value {offset}"),
            });
        }
        let seconds = offset * self.step_seconds + self.reference_seconds;
        let days = (seconds / SECONDS_PER_DAY).floor() as i64;
        self.calendar.add_days(self.reference, days)
    }
}

/// Parse `HH:MM[:SS[.fff]]`, ignoring a trailing `Z` or UTC offset of zero.
fn parse_time_of_day(text: &str) -> Option<f64> {
    let text = text
        .split_whitespace()
        .next()?
        .trim_end_matches('Z')
        .trim_end_matches("+00:00");
    let mut fields = text.split(':');
    let hours: f64 = fields.next()?.parse().ok()?;
    let minutes: f64 = fields.next().map_or(Some(0.0), |m| m.parse().ok())?;
    let seconds: f64 = fields.next().map_or(Some(0.0), |s| s.parse().ok())?;
    Some(hours * 3_600.0 + minutes * 60.0 + seconds)
}
