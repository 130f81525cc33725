//! NetCDF output writing
//!
//! The annual indicator dataset is written to a NetCDF-4 file next to the
//! requested output path and moved over it only once every variable is in
//! place, so a failed run never leaves a partial file behind.

use crate::dataset::{Attributes, Coordinate, LAT_DIM, LON_DIM, TIME_DIM};
use crate::encoding::{Encodings, VariableEncoding};
use crate::errors::{ClimdexError, Result};
use crate::output::OutputDataset;
use netcdf::{create, AttributeValue, FileMut};
use std::fs::OpenOptions;
use std::path::Path;

/// Coordinate attributes that do not carry over to the output grid
const DROPPED_COORDINATE_ATTRIBUTES: [&str; 3] = ["_FillValue", "missing_value", "bounds"];

/// Writes an [`OutputDataset`] to a NetCDF-4 file
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
}

impl<'a> NetCDFWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write `output` with the given per-variable encodings.
    ///
    /// An existing file at the output path is replaced. Nothing time-dependent
    /// is recorded, so the same dataset always produces the same file.
    pub fn write_dataset(&self, output: &OutputDataset, encodings: &Encodings) -> Result<()> {
        let directory = match self.output_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        // opened like a regular new file so the output gets the usual
        // umask-derived mode rather than tempfile's owner-only 0600
        let staging = tempfile::Builder::new()
            .prefix(".nc_climdex-")
            .suffix(".nc.tmp")
            .make_in(directory, |path| {
                OpenOptions::new().write(true).create_new(true).open(path)
            })?
            .into_temp_path();

        {
            let mut file = create(&staging)?;
            write_contents(&mut file, output, encodings)?;
        }

        staging.persist(self.output_path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.output_path.display(), "output persisted");
        Ok(())
    }
}

fn write_contents(file: &mut FileMut, output: &OutputDataset, encodings: &Encodings) -> Result<()> {
    let (nyears, nlat, nlon) = output.shape();
    file.add_dimension(TIME_DIM, nyears)?;
    file.add_dimension(LAT_DIM, nlat)?;
    file.add_dimension(LON_DIM, nlon)?;

    for (name, value) in &output.attributes {
        file.add_attribute(name, value.clone())?;
    }

    let mut time = file.add_variable::<f64>(TIME_DIM, &[TIME_DIM])?;
    time.put_attribute("units", output.time_units())?;
    time.put_attribute("calendar", output.calendar_name.as_str())?;
    time.put_attribute("standard_name", "time")?;
    time.put_attribute("axis", "T")?;
    time.put_values(&output.time_offsets()?, ..)?;

    write_coordinate(file, LAT_DIM, &output.lat)?;
    write_coordinate(file, LON_DIM, &output.lon)?;

    for variable in &output.variables {
        let encoding = encodings.get(&variable.name).ok_or_else(|| {
            ClimdexError::Generic(format!("no encoding for variable '{}'", variable.name))
        })?;
        let mut var = file.add_variable::<f32>(&variable.name, &[TIME_DIM, LAT_DIM, LON_DIM])?;
        var.put_attribute("_FillValue", f32::NAN)?;
        apply_encoding(&mut var, encoding)?;
        put_attributes(&mut var, &variable.attributes)?;
        var.put(variable.data.view(), ..)?;
    }

    Ok(())
}

fn write_coordinate(file: &mut FileMut, dim: &str, coordinate: &Coordinate) -> Result<()> {
    let mut var = file.add_variable::<f64>(dim, &[dim])?;
    let kept: Attributes = coordinate
        .attributes
        .iter()
        .filter(|(name, _)| !DROPPED_COORDINATE_ATTRIBUTES.contains(&name.as_str()))
        .cloned()
        .collect();
    put_attributes(&mut var, &kept)?;
    var.put_values(&coordinate.values, ..)?;
    Ok(())
}

fn apply_encoding(var: &mut netcdf::VariableMut, encoding: &VariableEncoding) -> Result<()> {
    if encoding.deflate_level > 0 {
        var.set_compression(encoding.deflate_level, encoding.shuffle)?;
    }
    var.set_chunking(&encoding.chunks)?;
    Ok(())
}

fn put_attributes(var: &mut netcdf::VariableMut, attributes: &Attributes) -> Result<()> {
    for (name, value) in attributes {
        var.put_attribute(name, value.clone())?;
    }
    Ok(())
}

/// Read the global attributes of a NetCDF file, in file order.
pub fn read_global_attributes(path: &Path) -> Result<Vec<(String, AttributeValue)>> {
    let file = netcdf::open(path)?;
    file.attributes()
        .map(|attr| Ok((attr.name().to_string(), attr.value()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::encoding::compute_encodings;
    use crate::output::OutputVariable;
    use ndarray::Array3;
    use tempfile::tempdir;

    fn output() -> OutputDataset {
        let coordinate = |name: &str, values: Vec<f64>| Coordinate {
            name: name.to_string(),
            values,
            attributes: vec![
                ("units".to_string(), AttributeValue::Str("degrees".into())),
                ("_FillValue".to_string(), AttributeValue::Double(1e20)),
            ],
        };
        OutputDataset {
            attributes: vec![
                ("title".to_string(), AttributeValue::Str("synthetic".into())),
                ("realization".to_string(), AttributeValue::Int(1)),
            ],
            calendar: Calendar::NoLeap,
            calendar_name: "noleap".to_string(),
            years: vec![2001, 2002],
            lat: coordinate("lat", vec![-10.0, 10.0]),
            lon: coordinate("lon", vec![0.0, 120.0, 240.0]),
            variables: vec![OutputVariable {
                name: "cdd".to_string(),
                data: Array3::from_shape_fn((2, 2, 3), |(t, i, j)| (t * 100 + i * 10 + j) as f32),
                attributes: vec![("units".to_string(), AttributeValue::Str("days".into()))],
            }],
        }
    }

    #[test]
    fn writes_coordinates_variables_and_globals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.nc");
        let out = output();
        let encodings = compute_encodings(&out, 4).unwrap();
        NetCDFWriter::new(&path).write_dataset(&out, &encodings).unwrap();

        let file = netcdf::open(&path).unwrap();
        let time = file.variable("time").unwrap();
        assert_eq!(time.get_values::<f64, _>(..).unwrap(), vec![0.0, 365.0]);
        assert_eq!(
            time.attribute_value("units").unwrap().unwrap(),
            AttributeValue::Str("days since 2001-01-01 00:00:00".into())
        );
        assert_eq!(
            time.attribute_value("calendar").unwrap().unwrap(),
            AttributeValue::Str("noleap".into())
        );

        let lat = file.variable("lat").unwrap();
        assert!(lat.attribute("_FillValue").is_none());
        assert_eq!(lat.get_values::<f64, _>(..).unwrap(), vec![-10.0, 10.0]);

        let cdd = file.variable("cdd").unwrap();
        let values = cdd.get_values::<f32, _>(..).unwrap();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[11], 112.0);

        assert_eq!(read_global_attributes(&path).unwrap(), out.attributes);

        // only the output file is left in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn output_mode_matches_a_plain_new_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.nc");
        let out = output();
        let encodings = compute_encodings(&out, 4).unwrap();
        NetCDFWriter::new(&path).write_dataset(&out, &encodings).unwrap();

        let plain = dir.path().join("plain.txt");
        std::fs::File::create(&plain).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[test]
    fn missing_encoding_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.nc");
        let result = NetCDFWriter::new(&path).write_dataset(&output(), &Encodings::new());
        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
