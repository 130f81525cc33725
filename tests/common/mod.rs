//! Synthetic NetCDF inputs for the integration tests

#![allow(dead_code)]

use ndarray::Array3;
use netcdf::create;
use std::f64::consts::PI;
use std::path::Path;

/// How the three input variables are filled
#[derive(Debug, Clone, Copy)]
pub enum Values {
    /// Seasonal cycle plus a spatial gradient, with dry and wet days
    Varying,
    /// The same value everywhere: pr in mm/day, temperatures in K
    Constant { pr: f32, tasmax: f32, tasmin: f32 },
}

/// Layout of one synthetic input file
#[derive(Debug, Clone)]
pub struct InputLayout {
    /// First day, counted from 2001-01-01
    pub start_day: usize,
    pub ndays: usize,
    pub steps_per_day: usize,
    pub nlat: usize,
    pub nlon: usize,
    pub pr_units: &'static str,
    pub temp_units: &'static str,
    pub values: Values,
    pub title: &'static str,
    /// CF calendar of the time axis
    pub calendar: &'static str,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self {
            start_day: 0,
            ndays: 730,
            steps_per_day: 1,
            nlat: 3,
            nlon: 4,
            pr_units: "mm/day",
            temp_units: "K",
            values: Values::Varying,
            title: "synthetic model output",
            calendar: "noleap",
        }
    }
}

/// Value of `var` on absolute day `day` at cell `(i, j)`.
pub fn value(values: Values, var: &str, day: usize, i: usize, j: usize) -> f32 {
    match values {
        Values::Constant { pr, tasmax, tasmin } => match var {
            "pr" => pr,
            "tasmax" => tasmax,
            _ => tasmin,
        },
        Values::Varying => {
            let season = (2.0 * PI * day as f64 / 365.0).sin();
            match var {
                // dry most of the time, wet every few days
                "pr" => ((day * 7 + i * 3 + j) % 10) as f32 * 0.5,
                "tasmax" => (295.0 + 12.0 * season + i as f64 - j as f64) as f32,
                _ => (283.0 + 10.0 * season + i as f64 - j as f64 + (day % 3) as f64) as f32,
            }
        }
    }
}

/// Write one input file with `pr`, `tasmax` and `tasmin` on `(time, lat, lon)`.
pub fn write_input(path: &Path, layout: &InputLayout) {
    let ntime = layout.ndays * layout.steps_per_day;
    let mut file = create(path).expect("Failed to create NetCDF file");

    file.add_dimension("time", ntime).expect("Failed to add time");
    file.add_dimension("lat", layout.nlat).expect("Failed to add lat");
    file.add_dimension("lon", layout.nlon).expect("Failed to add lon");

    file.add_attribute("title", layout.title).expect("Failed to add title");
    file.add_attribute("institution", "test suite")
        .expect("Failed to add institution");
    file.add_attribute("realization", 1_i32)
        .expect("Failed to add realization");

    let times: Vec<f64> = (0..ntime)
        .map(|k| (layout.start_day * layout.steps_per_day + k) as f64 / layout.steps_per_day as f64)
        .collect();
    let mut time = file
        .add_variable::<f64>("time", &["time"])
        .expect("Failed to add time variable");
    time.put_attribute("units", "days since 2001-01-01 00:00:00")
        .expect("Failed to add time units");
    time.put_attribute("calendar", layout.calendar)
        .expect("Failed to add calendar");
    time.put_values(&times, ..).expect("Failed to write time");

    let lats: Vec<f64> = (0..layout.nlat).map(|i| -30.0 + 15.0 * i as f64).collect();
    let mut lat = file
        .add_variable::<f64>("lat", &["lat"])
        .expect("Failed to add lat variable");
    lat.put_attribute("units", "degrees_north").expect("Failed to add lat units");
    lat.put_values(&lats, ..).expect("Failed to write lat");

    let lons: Vec<f64> = (0..layout.nlon).map(|j| 10.0 * j as f64).collect();
    let mut lon = file
        .add_variable::<f64>("lon", &["lon"])
        .expect("Failed to add lon variable");
    lon.put_attribute("units", "degrees_east").expect("Failed to add lon units");
    lon.put_values(&lons, ..).expect("Failed to write lon");

    for (name, units) in [
        ("pr", layout.pr_units),
        ("tasmax", layout.temp_units),
        ("tasmin", layout.temp_units),
    ] {
        let data = Array3::from_shape_fn((ntime, layout.nlat, layout.nlon), |(k, i, j)| {
            let day = layout.start_day + k / layout.steps_per_day;
            let v = value(layout.values, name, day, i, j);
            if name != "pr" && units == "degC" {
                v - 273.15
            } else {
                v
            }
        });
        let mut var = file
            .add_variable::<f32>(name, &["time", "lat", "lon"])
            .expect("Failed to add data variable");
        var.put_attribute("units", units).expect("Failed to add units");
        var.put(data.view(), ..).expect("Failed to write data");
    }
}

/// Read a whole output variable.
pub fn read_values(path: &Path, name: &str) -> Vec<f32> {
    let file = netcdf::open(path).expect("Failed to open output");
    let var = file
        .variable(name)
        .unwrap_or_else(|| panic!("variable {name} missing"));
    var.get_values::<f32, _>(..).expect("Failed to read values")
}

/// NaN-aware element-wise equality
pub fn same_values(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}
