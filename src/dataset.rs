//! In-memory gridded dataset
//!
//! A [`Dataset`] holds the concatenated input: `(time, lat, lon)` arrays for
//! each variable, decoded dates, coordinates, and the attributes needed to
//! describe the output.

use crate::calendar::{CalDate, Calendar};
use crate::errors::{ClimdexError, Result};
use ndarray::{Array3, Axis, Zip};
use netcdf::AttributeValue;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const TIME_DIM: &str = "time";
pub const LAT_DIM: &str = "lat";
pub const LON_DIM: &str = "lon";

/// Precipitation flux variable
pub const PR: &str = "pr";
/// Daily maximum near-surface air temperature
pub const TASMAX: &str = "tasmax";
/// Daily minimum near-surface air temperature
pub const TASMIN: &str = "tasmin";

/// Variables every input file must provide
pub const INPUT_VARIABLES: [&str; 3] = [PR, TASMAX, TASMIN];

/// Ordered attribute list, kept in file order
pub type Attributes = Vec<(String, AttributeValue)>;

/// Look up an attribute by name
pub fn find_attribute<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a AttributeValue> {
    attributes
        .iter()
        .find_map(|(key, value)| (key == name).then_some(value))
}

/// Set an attribute, replacing an existing one in place
pub fn set_attribute(attributes: &mut Attributes, name: &str, value: AttributeValue) {
    match attributes.iter_mut().find(|(key, _)| key == name) {
        Some(slot) => slot.1 = value,
        None => attributes.push((name.to_string(), value)),
    }
}

/// A 1-D coordinate such as `lat` or `lon`
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub name: String,
    pub values: Vec<f64>,
    pub attributes: Attributes,
}

impl Coordinate {
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A `(time, lat, lon)` data variable
#[derive(Debug, Clone)]
pub struct DataVariable {
    pub name: String,
    pub data: Array3<f32>,
    pub attributes: Attributes,
}

/// The concatenated input dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    /// First input file, used in error messages
    pub source: PathBuf,
    pub calendar: Calendar,
    /// `calendar` attribute as written in the input, echoed into the output
    pub calendar_name: String,
    /// Calendar date of every timestep, non-decreasing
    pub dates: Vec<CalDate>,
    pub lat: Coordinate,
    pub lon: Coordinate,
    /// Global attributes
    pub attributes: Attributes,
    pub variables: BTreeMap<String, DataVariable>,
}

impl Dataset {
    /// Get a variable by name
    pub fn variable(&self, name: &str) -> Result<&DataVariable> {
        self.variables
            .get(name)
            .ok_or_else(|| ClimdexError::VariableNotFound {
                var: name.to_string(),
                path: self.source.clone(),
            })
    }

    #[must_use]
    pub fn ntime(&self) -> usize {
        self.dates.len()
    }

    /// `(nlat, nlon)`
    #[must_use]
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Resample the time axis to one step per calendar day, averaging every
    /// timestep that falls on the same date.
    ///
    /// NaN values are skipped; a day with no valid value is NaN.
    /// Dates between the first and last timestep that have no data at all
    /// are emitted as all-NaN days so the result has a continuous daily axis.
    pub fn resample_daily_mean(&self) -> Result<Dataset> {
        let (Some(first), Some(last)) = (self.dates.first(), self.dates.last()) else {
            return Err(ClimdexError::InvalidTime {
                reason: "dataset has an empty time axis".to_string(),
            });
        };

        let start = self.calendar.day_number(*first)?;
        let end = self.calendar.day_number(*last)?;
        let ndays = usize::try_from(end - start + 1).map_err(|_| ClimdexError::InvalidTime {
            reason: format!("time axis is not ordered ({first} after {last})"),
        })?;

        let day_index = self
            .dates
            .iter()
            .map(|date| Ok((self.calendar.day_number(*date)? - start) as usize))
            .collect::<Result<Vec<usize>>>()?;

        let dates = (0..ndays as i64)
            .map(|offset| self.calendar.from_day_number(start + offset))
            .collect::<Result<Vec<CalDate>>>()?;

        let (nlat, nlon) = self.grid_shape();
        let mut variables = BTreeMap::new();

        for (name, var) in &self.variables {
            let mut sums = Array3::<f64>::zeros((ndays, nlat, nlon));
            let mut counts = Array3::<u32>::zeros((ndays, nlat, nlon));

            for (step, &day) in day_index.iter().enumerate() {
                let values = var.data.index_axis(Axis(0), step);
                Zip::from(sums.index_axis_mut(Axis(0), day))
                    .and(counts.index_axis_mut(Axis(0), day))
                    .and(&values)
                    .for_each(|sum, count, &value| {
                        if !value.is_nan() {
                            *sum += f64::from(value);
                            *count += 1;
                        }
                    });
            }

            let mut data = Array3::<f32>::from_elem((ndays, nlat, nlon), f32::NAN);
            Zip::from(&mut data)
                .and(&sums)
                .and(&counts)
                .for_each(|out, &sum, &count| {
                    if count > 0 {
                        *out = (sum / f64::from(count)) as f32;
                    }
                });

            variables.insert(
                name.clone(),
                DataVariable {
                    name: name.clone(),
                    data,
                    attributes: var.attributes.clone(),
                },
            );
        }

        tracing::debug!(
            from = self.ntime(),
            to = ndays,
            "resampled time axis to daily means"
        );

        Ok(Dataset {
            source: self.source.clone(),
            calendar: self.calendar,
            calendar_name: self.calendar_name.clone(),
            dates,
            lat: self.lat.clone(),
            lon: self.lon.clone(),
            attributes: self.attributes.clone(),
            variables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinate(name: &str, n: usize) -> Coordinate {
        Coordinate {
            name: name.to_string(),
            values: (0..n).map(|i| i as f64).collect(),
            attributes: Vec::new(),
        }
    }

    fn dataset(dates: Vec<CalDate>, values: Vec<f32>) -> Dataset {
        let nt = dates.len();
        let data = Array3::from_shape_vec((nt, 1, 1), values).unwrap();
        let mut variables = BTreeMap::new();
        variables.insert(
            TASMAX.to_string(),
            DataVariable {
                name: TASMAX.to_string(),
                data,
                attributes: vec![("units".to_string(), AttributeValue::Str("K".into()))],
            },
        );
        Dataset {
            source: PathBuf::from("test.nc"),
            calendar: Calendar::Gregorian,
            calendar_name: "standard".to_string(),
            dates,
            lat: coordinate(LAT_DIM, 1),
            lon: coordinate(LON_DIM, 1),
            attributes: vec![("title".to_string(), AttributeValue::Str("t".into()))],
            variables,
        }
    }

    fn d(year: i32, month: u8, day: u8) -> CalDate {
        CalDate { year, month, day }
    }

    #[test]
    fn averages_sub_daily_steps() {
        let ds = dataset(
            vec![d(2000, 1, 1), d(2000, 1, 1), d(2000, 1, 2), d(2000, 1, 2)],
            vec![1.0, 3.0, 10.0, f32::NAN],
        );
        let daily = ds.resample_daily_mean().unwrap();
        let data = &daily.variable(TASMAX).unwrap().data;
        assert_eq!(daily.dates, vec![d(2000, 1, 1), d(2000, 1, 2)]);
        assert_eq!(data[[0, 0, 0]], 2.0);
        assert_eq!(data[[1, 0, 0]], 10.0);
    }

    #[test]
    fn fills_gaps_with_nan_and_keeps_attributes() {
        let ds = dataset(vec![d(1999, 12, 31), d(2000, 1, 2)], vec![5.0, 7.0]);
        let daily = ds.resample_daily_mean().unwrap();
        let var = daily.variable(TASMAX).unwrap();
        assert_eq!(daily.ntime(), 3);
        assert_eq!(daily.dates[1], d(2000, 1, 1));
        assert!(var.data[[1, 0, 0]].is_nan());
        assert_eq!(var.data[[2, 0, 0]], 7.0);
        assert_eq!(var.attributes, ds.variable(TASMAX).unwrap().attributes);
        assert_eq!(daily.attributes, ds.attributes);
    }

    #[test]
    fn missing_variable_is_reported() {
        let ds = dataset(vec![d(2000, 1, 1)], vec![1.0]);
        assert!(matches!(
            ds.variable(PR),
            Err(ClimdexError::VariableNotFound { .. })
        ));
    }

    #[test]
    fn attribute_helpers_replace_in_place() {
        let mut attrs: Attributes = vec![
            ("units".to_string(), AttributeValue::Str("degC".into())),
            ("long_name".to_string(), AttributeValue::Str("x".into())),
        ];
        set_attribute(&mut attrs, "units", AttributeValue::Str("K".into()));
        assert_eq!(attrs[0].0, "units");
        assert_eq!(
            find_attribute(&attrs, "units"),
            Some(&AttributeValue::Str("K".into()))
        );
        assert!(find_attribute(&attrs, "missing").is_none());
    }
}
