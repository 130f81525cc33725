//! Annual output container
//!
//! [`OutputDataset`] collects the indicator results on a `(time, lat, lon)`
//! grid where `time` has one step per calendar year.

use crate::calendar::Calendar;
use crate::dataset::{Attributes, Coordinate, Dataset};
use crate::errors::{ClimdexError, Result};
use ndarray::Array3;

/// One indicator result with its attributes
#[derive(Debug, Clone)]
pub struct OutputVariable {
    pub name: String,
    /// `(year, lat, lon)`
    pub data: Array3<f32>,
    pub attributes: Attributes,
}

/// Annual indicator dataset ready for writing
#[derive(Debug, Clone)]
pub struct OutputDataset {
    /// Global attributes copied from the input
    pub attributes: Attributes,
    pub calendar: Calendar,
    pub calendar_name: String,
    /// Year label of every time step
    pub years: Vec<i32>,
    pub lat: Coordinate,
    pub lon: Coordinate,
    /// Variables in insertion order
    pub variables: Vec<OutputVariable>,
}

impl OutputDataset {
    /// Empty output sharing the grid, calendar and global attributes of `input`.
    #[must_use]
    pub fn new(input: &Dataset, years: Vec<i32>) -> Self {
        Self {
            attributes: input.attributes.clone(),
            calendar: input.calendar,
            calendar_name: input.calendar_name.clone(),
            years,
            lat: input.lat.clone(),
            lon: input.lon.clone(),
            variables: Vec::new(),
        }
    }

    /// Insert a variable, replacing any existing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ClimdexError::DimensionMismatch`] if `variable` is not shaped
    /// `(years, lat, lon)`.
    pub fn insert(&mut self, variable: OutputVariable) -> Result<()> {
        let expected = self.shape();
        let found = variable.data.dim();
        if found != expected {
            return Err(ClimdexError::DimensionMismatch {
                var: variable.name,
                path: "<output>".into(),
                expected: format!("{expected:?}"),
                found: format!("{found:?}"),
            });
        }
        match self.variables.iter_mut().find(|v| v.name == variable.name) {
            Some(slot) => *slot = variable,
            None => self.variables.push(variable),
        }
        Ok(())
    }

    /// `(nyears, nlat, nlon)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.years.len(), self.lat.len(), self.lon.len())
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&OutputVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// CF units of the time coordinate
    #[must_use]
    pub fn time_units(&self) -> String {
        let first = self.years.first().copied().unwrap_or(1970);
        format!("days since {first:04}-01-01 00:00:00")
    }

    /// Offset of each year's first day from the start of the first year, in
    /// days of the output calendar.
    pub fn time_offsets(&self) -> Result<Vec<f64>> {
        let Some(&first) = self.years.first() else {
            return Ok(Vec::new());
        };
        let origin = self.calendar.day_number(self.calendar.date(first, 1, 1)?)?;
        self.years
            .iter()
            .map(|&year| {
                let start = self.calendar.day_number(self.calendar.date(year, 1, 1)?)?;
                Ok((start - origin) as f64)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalDate;
    use netcdf::AttributeValue;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn input(calendar: Calendar) -> Dataset {
        let coordinate = |name: &str, n: usize| Coordinate {
            name: name.to_string(),
            values: (0..n).map(|i| i as f64).collect(),
            attributes: Vec::new(),
        };
        Dataset {
            source: PathBuf::from("in.nc"),
            calendar,
            calendar_name: calendar.as_str().to_string(),
            dates: vec![CalDate { year: 2000, month: 1, day: 1 }],
            lat: coordinate("lat", 2),
            lon: coordinate("lon", 3),
            attributes: vec![("title".to_string(), AttributeValue::Str("x".into()))],
            variables: BTreeMap::new(),
        }
    }

    fn variable(name: &str, shape: (usize, usize, usize), value: f32) -> OutputVariable {
        OutputVariable {
            name: name.to_string(),
            data: Array3::from_elem(shape, value),
            attributes: Vec::new(),
        }
    }

    #[test]
    fn insert_replaces_by_name_and_keeps_order() {
        let mut out = OutputDataset::new(&input(Calendar::Gregorian), vec![2000, 2001]);
        out.insert(variable("a", (2, 2, 3), 1.0)).unwrap();
        out.insert(variable("b", (2, 2, 3), 2.0)).unwrap();
        out.insert(variable("a", (2, 2, 3), 3.0)).unwrap();
        assert_eq!(out.names(), vec!["a", "b"]);
        assert_eq!(out.variable("a").unwrap().data[[0, 0, 0]], 3.0);
        assert_eq!(out.attributes, input(Calendar::Gregorian).attributes);
    }

    #[test]
    fn insert_rejects_wrong_shape() {
        let mut out = OutputDataset::new(&input(Calendar::Gregorian), vec![2000]);
        assert!(matches!(
            out.insert(variable("a", (2, 2, 3), 1.0)),
            Err(ClimdexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn time_offsets_follow_the_calendar() {
        let years = vec![2000, 2001, 2002];
        let out = OutputDataset::new(&input(Calendar::Gregorian), years.clone());
        assert_eq!(out.time_units(), "days since 2000-01-01 00:00:00");
        assert_eq!(out.time_offsets().unwrap(), vec![0.0, 366.0, 731.0]);

        let out = OutputDataset::new(&input(Calendar::NoLeap), years.clone());
        assert_eq!(out.time_offsets().unwrap(), vec![0.0, 365.0, 730.0]);

        let out = OutputDataset::new(&input(Calendar::Day360), years);
        assert_eq!(out.time_offsets().unwrap(), vec![0.0, 360.0, 720.0]);
    }
}
