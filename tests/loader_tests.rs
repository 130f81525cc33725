mod common;

use common::{write_input, InputLayout, Values};
use nc_climdex::calendar::CalDate;
use nc_climdex::dataset::{PR, TASMAX};
use nc_climdex::loader::{discover_files, load_dataset, open_dataset};
use nc_climdex::ClimdexError;
use std::fs;
use tempfile::tempdir;

#[test]
fn discovery_is_sorted_and_case_insensitive() {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = InputLayout { ndays: 3, ..InputLayout::default() };
    write_input(&dir.path().join("b.NC"), &layout);
    write_input(&dir.path().join("a.nc"), &layout);
    fs::write(dir.path().join("notes.txt"), "not netcdf").unwrap();

    let files = discover_files(dir.path(), "*.nc").unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a.nc", "b.NC"]);
}

#[test]
fn custom_pattern_narrows_the_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let layout = InputLayout { ndays: 3, ..InputLayout::default() };
    write_input(&dir.path().join("pr_2001.nc"), &layout);
    write_input(&dir.path().join("other.nc"), &layout);

    let files = discover_files(dir.path(), "pr_*.nc").unwrap();
    assert_eq!(files.len(), 1);
    assert!(matches!(
        discover_files(dir.path(), "*.grib"),
        Err(ClimdexError::NoInputFiles { .. })
    ));
}

#[test]
fn files_are_concatenated_in_time_order() {
    let dir = tempdir().expect("Failed to create temp dir");
    let late = dir.path().join("late.nc");
    let early = dir.path().join("early.nc");
    write_input(&late, &InputLayout { start_day: 10, ndays: 5, ..InputLayout::default() });
    write_input(&early, &InputLayout { start_day: 0, ndays: 10, ..InputLayout::default() });

    let dataset = load_dataset(&[late, early]).unwrap();
    assert_eq!(dataset.ntime(), 15);
    assert_eq!(dataset.dates[0], CalDate { year: 2001, month: 1, day: 1 });
    assert_eq!(dataset.dates[14], CalDate { year: 2001, month: 1, day: 15 });
    assert_eq!(dataset.calendar_name, "noleap");
    assert_eq!(dataset.grid_shape(), (3, 4));

    let tasmax = &dataset.variable(TASMAX).unwrap().data;
    assert_eq!(tasmax[[12, 1, 2]], common::value(Values::Varying, "tasmax", 12, 1, 2));
}

#[test]
fn overlapping_files_are_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_input(&dir.path().join("a.nc"), &InputLayout { ndays: 10, ..InputLayout::default() });
    write_input(
        &dir.path().join("b.nc"),
        &InputLayout { start_day: 9, ndays: 10, ..InputLayout::default() },
    );

    let err = open_dataset(dir.path(), "*.nc").unwrap_err();
    assert!(matches!(err, ClimdexError::InconsistentInputs { .. }), "{err}");
}

#[test]
fn precipitation_flux_becomes_mm_per_day() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("flux.nc");
    // 2 mm/day written as a flux
    write_input(
        &path,
        &InputLayout {
            ndays: 2,
            pr_units: "kg m-2 s-1",
            values: Values::Constant {
                pr: 2.0 / 86_400.0,
                tasmax: 300.0,
                tasmin: 290.0,
            },
            ..InputLayout::default()
        },
    );

    let dataset = load_dataset(&[path]).unwrap();
    let pr = dataset.variable(PR).unwrap();
    assert!(pr.data.iter().all(|v| (v - 2.0).abs() < 1e-4));
    assert!(pr
        .attributes
        .iter()
        .any(|(k, v)| k == "units" && *v == netcdf::AttributeValue::Str("mm d-1".into())));
}

/// Write a file whose variables are stored as packed `i16` with a fill value.
fn write_packed_input(path: &std::path::Path) {
    let mut file = netcdf::create(path).expect("Failed to create NetCDF file");
    file.add_dimension("time", 2).expect("Failed to add time");
    file.add_dimension("lat", 1).expect("Failed to add lat");
    file.add_dimension("lon", 2).expect("Failed to add lon");

    let mut time = file
        .add_variable::<f64>("time", &["time"])
        .expect("Failed to add time variable");
    time.put_attribute("units", "days since 2001-01-01")
        .expect("Failed to add time units");
    time.put_attribute("calendar", "noleap")
        .expect("Failed to add calendar");
    time.put_values(&[0.0, 1.0], ..).expect("Failed to write time");

    for (name, units, offset, raw) in [
        ("pr", "mm/day", 0.0_f32, [200_i16, -9999, 0, 150]),
        ("tasmax", "K", 273.15, [2685, 2685, -9999, 2500]),
        ("tasmin", "K", 273.15, [1685, 1685, 1685, 1685]),
    ] {
        let mut var = file
            .add_variable::<i16>(name, &["time", "lat", "lon"])
            .expect("Failed to add data variable");
        var.put_attribute("_FillValue", -9999_i16)
            .expect("Failed to add fill value");
        var.put_attribute("scale_factor", 0.01_f32)
            .expect("Failed to add scale factor");
        var.put_attribute("add_offset", offset)
            .expect("Failed to add offset");
        var.put_attribute("units", units).expect("Failed to add units");
        var.put_values(&raw, ..).expect("Failed to write data");
    }
}

#[test]
fn packed_values_are_unpacked_and_fill_becomes_nan() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("packed.nc");
    write_packed_input(&path);

    let dataset = load_dataset(&[path]).unwrap();
    // bare lat/lon dimensions get index coordinates
    assert_eq!(dataset.lon.values, vec![0.0, 1.0]);

    let pr = &dataset.variable(PR).unwrap().data;
    assert!((pr[[0, 0, 0]] - 2.0).abs() < 1e-4);
    assert!(pr[[0, 0, 1]].is_nan());
    assert_eq!(pr[[1, 0, 0]], 0.0);
    assert!((pr[[1, 0, 1]] - 1.5).abs() < 1e-4);

    let tasmax = dataset.variable(TASMAX).unwrap();
    assert!((tasmax.data[[0, 0, 0]] - 300.0).abs() < 1e-3);
    assert!(tasmax.data[[1, 0, 0]].is_nan());
    assert!((tasmax.data[[1, 0, 1]] - 298.15).abs() < 1e-3);

    for name in [PR, TASMAX] {
        let attributes = &dataset.variable(name).unwrap().attributes;
        for packing in ["_FillValue", "missing_value", "scale_factor", "add_offset"] {
            assert!(
                attributes.iter().all(|(key, _)| key != packing),
                "{name} still carries {packing}"
            );
        }
        assert!(attributes.iter().any(|(key, _)| key == "units"));
    }
}
