//! Annual (`YS`) grouping of a daily time axis
//!
//! Indicators reduce each calendar year of a daily series to one value. A
//! year only produces a value when it is complete and none of the inputs is
//! missing inside it; otherwise the result is NaN.

use crate::calendar::{CalDate, Calendar};
use crate::errors::{ClimdexError, Result};
use std::ops::Range;

/// One calendar year of the daily axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSpan {
    pub year: i32,
    /// Indices of the year's days on the daily axis
    pub range: Range<usize>,
    /// Whether every day of the year is present
    pub complete: bool,
}

/// Daily time axis with its day-of-year and year groupings
#[derive(Debug, Clone)]
pub struct TimeAxis {
    pub calendar: Calendar,
    pub dates: Vec<CalDate>,
    /// 1-based day of year of each date
    pub doys: Vec<u16>,
    pub years: Vec<YearSpan>,
}

impl TimeAxis {
    /// Build the axis from a continuous daily sequence of dates.
    pub fn new(calendar: Calendar, dates: &[CalDate]) -> Result<Self> {
        for pair in dates.windows(2) {
            if calendar.day_number(pair[1])? - calendar.day_number(pair[0])? != 1 {
                return Err(ClimdexError::InvalidTime {
                    reason: format!(
                        "daily axis is not continuous between {} and {}",
                        pair[0], pair[1]
                    ),
                });
            }
        }

        let doys = dates.iter().map(|d| calendar.day_of_year(*d)).collect();

        let mut years: Vec<YearSpan> = Vec::new();
        for (index, date) in dates.iter().enumerate() {
            match years.last_mut() {
                Some(span) if span.year == date.year => span.range.end = index + 1,
                _ => years.push(YearSpan {
                    year: date.year,
                    range: index..index + 1,
                    complete: false,
                }),
            }
        }
        for span in &mut years {
            span.complete = span.range.len() == usize::from(calendar.days_in_year(span.year));
        }

        Ok(Self {
            calendar,
            dates: dates.to_vec(),
            doys,
            years,
        })
    }

    /// Number of rows in a day-of-year threshold table
    #[must_use]
    pub fn ndoy(&self) -> usize {
        usize::from(self.calendar.max_days_in_year())
    }

    #[must_use]
    pub fn year_labels(&self) -> Vec<i32> {
        self.years.iter().map(|span| span.year).collect()
    }

    /// Reduce each year with `reduce`, masking incomplete years and years in
    /// which any of `checked` has a NaN value.
    pub fn annual<F>(&self, checked: &[&[f32]], mut reduce: F) -> Vec<f32>
    where
        F: FnMut(Range<usize>) -> f32,
    {
        self.years
            .iter()
            .map(|span| {
                let missing = !span.complete
                    || checked
                        .iter()
                        .any(|series| series[span.range.clone()].iter().any(|v| v.is_nan()));
                if missing {
                    f32::NAN
                } else {
                    reduce(span.range.clone())
                }
            })
            .collect()
    }
}
