//! Indicator evaluation over the daily dataset

use super::annual::TimeAxis;
use super::operations::Indicator;
use super::parallel::map_cells;
use super::percentile::percentile_doy;
use super::run_length::{longest_run, trailing_sum, windowed_run_count};
use crate::config::IndicesConfig;
use crate::dataset::{Attributes, Dataset, TASMAX, TASMIN};
use crate::errors::{ClimdexError, Result};
use crate::output::{OutputDataset, OutputVariable};
use crate::progress::progress;
use crate::units::celsius_to_kelvin;
use ndarray::Array3;
use netcdf::AttributeValue;

/// Day-of-year percentile tables shared by the percentile indicators
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Low percentile of daily mean temperature
    pub t10: Array3<f32>,
    /// High percentile of daily mean temperature
    pub t90: Array3<f32>,
    /// Low percentile of daily minimum temperature
    pub tn10: Array3<f32>,
}

impl Thresholds {
    /// Compute the tables from `tasmin` and `tasmax`.
    ///
    /// Daily mean temperature is taken as the midpoint of the two.
    pub fn compute(
        tasmin: &Array3<f32>,
        tasmax: &Array3<f32>,
        axis: &TimeAxis,
        config: &IndicesConfig,
    ) -> Result<Self> {
        let tas = (tasmin + tasmax) / 2.0_f32;
        let window = config.percentile_window;
        Ok(Self {
            t10: percentile_doy(&tas, axis, window, config.low_percentile)?,
            t90: percentile_doy(&tas, axis, window, config.high_percentile)?,
            tn10: percentile_doy(tasmin, axis, window, config.low_percentile)?,
        })
    }
}

/// Computes indicators for one daily dataset
pub struct Evaluator<'a> {
    dataset: &'a Dataset,
    config: &'a IndicesConfig,
    axis: TimeAxis,
    thresholds: Option<Thresholds>,
}

impl<'a> Evaluator<'a> {
    /// Prepare evaluation of a daily dataset.
    ///
    /// # Errors
    ///
    /// Fails if the dataset's time axis is not a continuous daily sequence.
    pub fn new(dataset: &'a Dataset, config: &'a IndicesConfig) -> Result<Self> {
        let axis = TimeAxis::new(dataset.calendar, &dataset.dates)?;
        Ok(Self {
            dataset,
            config,
            axis,
            thresholds: None,
        })
    }

    #[must_use]
    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Percentile tables, computed on first use.
    pub fn thresholds(&mut self) -> Result<&Thresholds> {
        if self.thresholds.is_none() {
            progress!("⚡ Computing day-of-year percentile thresholds");
            let tasmin = &self.dataset.variable(TASMIN)?.data;
            let tasmax = &self.dataset.variable(TASMAX)?.data;
            self.thresholds = Some(Thresholds::compute(tasmin, tasmax, &self.axis, self.config)?);
        }
        self.thresholds
            .as_ref()
            .ok_or_else(|| ClimdexError::Generic("percentile thresholds unavailable".to_string()))
    }

    /// Annual `(year, lat, lon)` values of one indicator.
    pub fn compute(&mut self, indicator: Indicator) -> Result<Array3<f32>> {
        let nyears = self.axis.years.len();
        let primary = indicator.inputs()[0];

        if indicator.uses_percentiles() {
            self.thresholds()?;
        }
        let dataset = self.dataset;
        let data = &dataset.variable(primary)?.data;
        let kernel = Kernel::new(&self.axis, self.config);

        let table = match (indicator, self.thresholds.as_ref()) {
            (Indicator::Tx10p | Indicator::Tn10p, Some(t)) => Some(&t.t10),
            (Indicator::Tx90p | Indicator::Tn90p, Some(t)) => Some(&t.t90),
            (Indicator::ColdSpellDurationIndex, Some(t)) => Some(&t.tn10),
            _ => None,
        };

        match table {
            Some(table) => map_cells(&[data, table], nyears, |series| {
                kernel.annual(indicator, &series[0], Some(series[1].as_slice()))
            }),
            None => map_cells(&[data], nyears, |series| {
                kernel.annual(indicator, &series[0], None)
            }),
        }
    }

    /// Evaluate every indicator in order and collect the results.
    pub fn evaluate_all(mut self) -> Result<OutputDataset> {
        let mut output = OutputDataset::new(self.dataset, self.axis.year_labels());
        for indicator in Indicator::ALL {
            let name = indicator.name(self.config);
            progress!("⚡ Computing {name}");
            let data = self.compute(indicator)?;
            output.insert(OutputVariable {
                attributes: indicator_attributes(indicator, self.config),
                name,
                data,
            })?;
        }
        Ok(output)
    }
}

fn indicator_attributes(indicator: Indicator, config: &IndicesConfig) -> Attributes {
    let meta = indicator.metadata(config);
    let mut attributes: Attributes = vec![
        ("units".to_string(), AttributeValue::Str(meta.units.to_string())),
        ("long_name".to_string(), AttributeValue::Str(meta.long_name)),
        ("description".to_string(), AttributeValue::Str(meta.description)),
    ];
    if let Some(standard_name) = meta.standard_name {
        attributes.push((
            "standard_name".to_string(),
            AttributeValue::Str(standard_name.to_string()),
        ));
    }
    attributes.push((
        "cell_methods".to_string(),
        AttributeValue::Str(meta.cell_methods.to_string()),
    ));
    attributes
}

/// Per-cell reductions with thresholds in crate units (mm/day, K)
struct Kernel<'a> {
    axis: &'a TimeAxis,
    wet: f32,
    freezing: f32,
    summer: f32,
    tropical: f32,
    rx_window: usize,
    csdi_window: usize,
}

impl<'a> Kernel<'a> {
    fn new(axis: &'a TimeAxis, config: &IndicesConfig) -> Self {
        Self {
            axis,
            wet: config.wet_day_threshold as f32,
            freezing: celsius_to_kelvin(config.freezing_threshold),
            summer: celsius_to_kelvin(config.summer_day_threshold),
            tropical: celsius_to_kelvin(config.tropical_night_threshold),
            rx_window: config.rx_window,
            csdi_window: config.csdi_window,
        }
    }

    /// One value per year for a single cell.
    ///
    /// `table` is the day-of-year threshold series for percentile indicators.
    fn annual(&self, indicator: Indicator, values: &[f32], table: Option<&[f32]>) -> Vec<f32> {
        let axis = self.axis;
        let checked = [values];
        let count = |range: std::ops::Range<usize>, pred: &dyn Fn(f32) -> bool| {
            values[range].iter().filter(|&&v| pred(v)).count() as f32
        };
        // threshold of the day of year at index `t`
        let threshold = |t: usize| {
            table
                .and_then(|tab| tab.get(usize::from(axis.doys[t]) - 1).copied())
                .unwrap_or(f32::NAN)
        };

        match indicator {
            Indicator::WetDays => axis.annual(&checked, |r| count(r, &|v| v >= self.wet)),
            Indicator::MaxConsecutiveDryDays => axis.annual(&checked, |r| {
                longest_run(values[r].iter().map(|&v| v < self.wet)) as f32
            }),
            Indicator::MaxConsecutiveWetDays => axis.annual(&checked, |r| {
                longest_run(values[r].iter().map(|&v| v >= self.wet)) as f32
            }),
            Indicator::PrecipAccumulation => axis.annual(&checked, |r| {
                values[r].iter().map(|&v| f64::from(v)).sum::<f64>() as f32
            }),
            Indicator::DailyPrIntensity => axis.annual(&checked, |r| {
                let (total, days) = values[r]
                    .iter()
                    .filter(|&&v| v >= self.wet)
                    .fold((0.0_f64, 0_u32), |(s, n), &v| (s + f64::from(v), n + 1));
                if days == 0 {
                    tracing::debug!("no wet days in year, intensity undefined");
                    f32::NAN
                } else {
                    (total / f64::from(days)) as f32
                }
            }),
            Indicator::Max1DayPrecipitation | Indicator::TxMax | Indicator::TnMax => {
                axis.annual(&checked, |r| values[r].iter().copied().fold(f32::NEG_INFINITY, f32::max))
            }
            Indicator::TxMin | Indicator::TnMin => {
                axis.annual(&checked, |r| values[r].iter().copied().fold(f32::INFINITY, f32::min))
            }
            Indicator::MaxNDayPrecipitation => axis.annual(&checked, |r| {
                r.filter_map(|end| trailing_sum(values, end, self.rx_window))
                    .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
                    .map_or(f32::NAN, |best| best as f32)
            }),
            Indicator::FrostDays | Indicator::IceDays => {
                axis.annual(&checked, |r| count(r, &|v| v < self.freezing))
            }
            Indicator::TxDaysAbove => axis.annual(&checked, |r| count(r, &|v| v > self.summer)),
            Indicator::TropicalNights => {
                axis.annual(&checked, |r| count(r, &|v| v > self.tropical))
            }
            Indicator::Tx10p | Indicator::Tn10p => axis.annual(&checked, |r| {
                r.filter(|&t| values[t] < threshold(t)).count() as f32
            }),
            Indicator::Tx90p | Indicator::Tn90p => axis.annual(&checked, |r| {
                r.filter(|&t| values[t] > threshold(t)).count() as f32
            }),
            Indicator::ColdSpellDurationIndex => axis.annual(&checked, |r| {
                windowed_run_count(r.map(|t| values[t] < threshold(t)), self.csdi_window) as f32
            }),
        }
    }
}
