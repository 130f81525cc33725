//! Day-of-year percentile thresholds
//!
//! For every day of the year, the threshold is a percentile of all values
//! falling in a centred window around that day, pooled over every year of the
//! record. Percentiles use the median-unbiased estimator (Hyndman & Fan
//! type 8, alpha = beta = 1/3).
//!
//! Day 366 only occurs in leap years, so its own sample would be a quarter
//! the size of every other day's. On calendars with 366-day years the table
//! is instead built for days 1..=365 and linearly stretched onto 1..=366.

use super::annual::TimeAxis;
use super::parallel::map_cells;
use crate::errors::Result;
use ndarray::Array3;

const ALPHA: f64 = 1.0 / 3.0;
const BETA: f64 = 1.0 / 3.0;

/// Days of year in a regular year
const COMMON_YEAR_DAYS: usize = 365;

/// Type 8 quantile of already sorted, non-NaN values; `q` in `0..=1`.
///
/// Returns NaN for an empty sample.
pub fn quantile_sorted(sorted: &[f32], q: f64) -> f32 {
    let n = sorted.len();
    if n == 0 {
        return f32::NAN;
    }
    // 0-based virtual index
    let position = n as f64 * q + ALPHA + q * (1.0 - ALPHA - BETA) - 1.0;
    if position <= 0.0 {
        return sorted[0];
    }
    if position >= (n - 1) as f64 {
        return sorted[n - 1];
    }
    let lower = position.floor();
    let frac = position - lower;
    let lo = f64::from(sorted[lower as usize]);
    let hi = f64::from(sorted[lower as usize + 1]);
    (lo + frac * (hi - lo)) as f32
}

/// Offsets of a centred window; an even window extends one day further back.
fn window_offsets(window: usize) -> std::ops::RangeInclusive<isize> {
    let back = (window / 2) as isize;
    let forward = window as isize - 1 - back;
    -back..=forward
}

/// Percentile `per` (0..=100) per day of year for one cell's daily series.
///
/// `doys` holds the 1-based day of year of each value; the result has
/// `ndoy` entries, NaN where a day of year has no valid sample.
pub fn percentile_doy_series(
    values: &[f32],
    doys: &[u16],
    ndoy: usize,
    window: usize,
    per: f64,
) -> Vec<f32> {
    let mut samples: Vec<Vec<f32>> = vec![Vec::new(); ndoy];
    let n = values.len() as isize;

    for (t, &doy) in doys.iter().enumerate() {
        let bucket = &mut samples[usize::from(doy) - 1];
        for offset in window_offsets(window) {
            let source = t as isize + offset;
            if (0..n).contains(&source) {
                let value = values[source as usize];
                if !value.is_nan() {
                    bucket.push(value);
                }
            }
        }
    }

    let table: Vec<f32> = samples
        .into_iter()
        .map(|mut bucket| {
            bucket.sort_by(f32::total_cmp);
            quantile_sorted(&bucket, per / 100.0)
        })
        .collect();

    if ndoy == COMMON_YEAR_DAYS + 1 {
        stretch_curve(&table[..COMMON_YEAR_DAYS], ndoy)
    } else {
        table
    }
}

/// Linearly resample a day-of-year curve onto `target` days.
///
/// The first and last entries stay at the first and last day; interior gaps
/// are interpolated first, leading and trailing gaps stay NaN.
pub fn stretch_curve(curve: &[f32], target: usize) -> Vec<f32> {
    let filled = fill_interior_gaps(curve);
    let n = filled.len();
    if n < 2 || target < 2 {
        return filled;
    }
    let step = (n - 1) as f64 / (target - 1) as f64;
    (0..target)
        .map(|day| {
            let position = day as f64 * step;
            let lower = position.floor() as usize;
            if lower + 1 >= n {
                return filled[n - 1];
            }
            let frac = position - lower as f64;
            let lo = f64::from(filled[lower]);
            let hi = f64::from(filled[lower + 1]);
            (lo + frac * (hi - lo)) as f32
        })
        .collect()
}

/// Linear interpolation across NaN runs bounded by finite values on both sides.
fn fill_interior_gaps(curve: &[f32]) -> Vec<f32> {
    let mut filled = curve.to_vec();
    let mut previous: Option<usize> = None;
    for index in 0..filled.len() {
        if filled[index].is_nan() {
            continue;
        }
        if let Some(start) = previous {
            let span = index - start;
            if span > 1 {
                let (a, b) = (f64::from(filled[start]), f64::from(filled[index]));
                for gap in start + 1..index {
                    let frac = (gap - start) as f64 / span as f64;
                    filled[gap] = (a + frac * (b - a)) as f32;
                }
            }
        }
        previous = Some(index);
    }
    filled
}

/// Day-of-year percentile thresholds for a gridded daily series.
///
/// The result is indexed `(dayofyear - 1, lat, lon)`.
pub fn percentile_doy(
    data: &Array3<f32>,
    axis: &TimeAxis,
    window: usize,
    per: f64,
) -> Result<Array3<f32>> {
    let ndoy = axis.ndoy();
    let doys = &axis.doys;
    map_cells(&[data], ndoy, |series| {
        percentile_doy_series(&series[0], doys, ndoy, window, per)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type8_matches_reference_values() {
        let sorted: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        // numpy.percentile(range(1, 11), [10, 50, 90], method="median_unbiased")
        assert!((quantile_sorted(&sorted, 0.1) - 1.366_666_7).abs() < 1e-5);
        assert!((quantile_sorted(&sorted, 0.5) - 5.5).abs() < 1e-6);
        assert!((quantile_sorted(&sorted, 0.9) - 9.633_333).abs() < 1e-5);
    }

    #[test]
    fn type8_edge_cases() {
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[4.0], 0.1), 4.0);
        assert_eq!(quantile_sorted(&[1.0, 2.0], 0.0), 1.0);
        assert_eq!(quantile_sorted(&[1.0, 2.0], 1.0), 2.0);
    }

    #[test]
    fn window_offsets_are_centred() {
        assert_eq!(window_offsets(5), -2..=2);
        assert_eq!(window_offsets(1), 0..=0);
        assert_eq!(window_offsets(4), -2..=1);
    }

    #[test]
    fn pools_window_across_years() {
        // two 3-day "years" with day-of-year 1..=3
        let values = [1.0, 2.0, 3.0, 10.0, 20.0, 30.0];
        let doys = [1, 2, 3, 1, 2, 3];
        let median = percentile_doy_series(&values, &doys, 3, 3, 50.0);
        // doy 1: {1, 2} from year one, {3, 10, 20} from year two
        assert!((median[0] - 3.0).abs() < 1e-6);
        // doy 2: {1, 2, 3} and {10, 20, 30}
        assert!((median[1] - 6.5).abs() < 1e-6);
        // doy 3: {2, 3, 10} and {20, 30}
        assert!((median[2] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn leap_day_threshold_is_stretched_from_common_year() {
        // one value per day of year: the 365-day curve is the identity
        let mut values: Vec<f32> = (1..=366).map(|d| d as f32).collect();
        values[365] = 1_000.0;
        let doys: Vec<u16> = (1..=366).collect();
        let table = percentile_doy_series(&values, &doys, 366, 1, 50.0);

        assert_eq!(table.len(), 366);
        assert_eq!(table[0], 1.0);
        // day 366 comes from the end of the curve, not its own sample
        assert!((table[365] - 365.0).abs() < 1e-4);
        let expected = 1.0 + 182.0 * 364.0 / 365.0;
        assert!((f64::from(table[182]) - expected).abs() < 1e-3);
        assert!(table.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn stretch_fills_interior_gaps_only() {
        let curve = [f32::NAN, 1.0, f32::NAN, 3.0, f32::NAN];
        assert_eq!(fill_interior_gaps(&curve)[2], 2.0);
        let stretched = stretch_curve(&curve, 9);
        assert!(stretched[0].is_nan());
        assert!(stretched[8].is_nan());
        // day 5 of 9 sits on source index 2
        assert_eq!(stretched[4], 2.0);
    }

    #[test]
    fn missing_days_of_year_are_nan() {
        let values = [1.0, f32::NAN];
        let doys = [1, 2];
        let p = percentile_doy_series(&values, &doys, 4, 1, 10.0);
        assert_eq!(p[0], 1.0);
        assert!(p[1].is_nan());
        assert!(p[2].is_nan());
        assert!(p[3].is_nan());
    }
}
