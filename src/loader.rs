//! Multi-file NetCDF loading
//!
//! Finds every file matching a pattern in the input folder, reads `pr`,
//! `tasmax` and `tasmin` from each, checks that the files describe the same
//! grid, and concatenates them along time into one [`Dataset`].

use crate::calendar::{CalDate, Calendar, TimeUnits};
use crate::dataset::{
    find_attribute, set_attribute, Attributes, Coordinate, DataVariable, Dataset,
    INPUT_VARIABLES, LAT_DIM, LON_DIM, PR, TIME_DIM,
};
use crate::errors::{ClimdexError, Result};
use crate::progress::progress;
use crate::units::{self, Quantity};
use glob::MatchOptions;
use ndarray::{Array3, Axis};
use netcdf::{AttributeValue, File, Variable};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Attributes that describe the on-disk packing and are consumed on load
const PACKING_ATTRIBUTES: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Find the input files in `dir` matching `pattern`, sorted by path.
///
/// Matching is case-insensitive so `*.nc` also picks up `*.NC`.
pub fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        pattern
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&full_pattern, options)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ClimdexError::NoInputFiles {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }

    tracing::debug!(count = files.len(), pattern = %full_pattern, "discovered input files");
    Ok(files)
}

/// Discover and load every matching file in `dir`.
pub fn open_dataset(dir: &Path, pattern: &str) -> Result<Dataset> {
    let files = discover_files(dir, pattern)?;
    load_dataset(&files)
}

/// Everything read from one input file
struct FileContents {
    path: PathBuf,
    calendar: Calendar,
    calendar_name: String,
    /// Seconds since the calendar origin, one per timestep
    instants: Vec<f64>,
    dates: Vec<CalDate>,
    lat: Coordinate,
    lon: Coordinate,
    attributes: Attributes,
    variables: Vec<DataVariable>,
}

/// Load and concatenate `files` along time.
///
/// Files may be given in any order; timesteps are ordered by their decoded
/// time. The first file in time order supplies global and variable
/// attributes.
pub fn load_dataset(files: &[PathBuf]) -> Result<Dataset> {
    let mut contents = files
        .iter()
        .map(|path| read_file(path))
        .collect::<Result<Vec<FileContents>>>()?;

    let Some(reference) = contents.first() else {
        return Err(ClimdexError::Generic("no input files given".to_string()));
    };
    for other in &contents[1..] {
        check_consistent(reference, other)?;
    }

    contents.sort_by(|a, b| a.instants[0].total_cmp(&b.instants[0]));

    // (instant, file, step) for every timestep across all files
    let mut order: Vec<(f64, usize, usize)> = contents
        .iter()
        .enumerate()
        .flat_map(|(f, c)| c.instants.iter().enumerate().map(move |(t, &i)| (i, f, t)))
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    if let Some(pair) = order.windows(2).find(|w| w[0].0 == w[1].0) {
        let (_, file, step) = pair[1];
        return Err(ClimdexError::InconsistentInputs {
            message: format!(
                "duplicate timestep {} in {} and {}",
                contents[file].dates[step],
                contents[pair[0].1].path.display(),
                contents[file].path.display()
            ),
        });
    }

    let first = &contents[0];
    let (nlat, nlon) = (first.lat.len(), first.lon.len());
    let dates: Vec<CalDate> = order.iter().map(|&(_, f, t)| contents[f].dates[t]).collect();

    let mut variables = BTreeMap::new();
    for (index, template) in first.variables.iter().enumerate() {
        let mut data = Array3::<f32>::zeros((order.len(), nlat, nlon));
        for (row, &(_, f, t)) in order.iter().enumerate() {
            data.index_axis_mut(Axis(0), row)
                .assign(&contents[f].variables[index].data.index_axis(Axis(0), t));
        }
        variables.insert(
            template.name.clone(),
            DataVariable {
                name: template.name.clone(),
                data,
                attributes: template.attributes.clone(),
            },
        );
    }

    progress!(
        "🚀 Loaded {} timesteps from {} file(s) on a {nlat} × {nlon} grid",
        dates.len(),
        contents.len()
    );

    Ok(Dataset {
        source: first.path.clone(),
        calendar: first.calendar,
        calendar_name: first.calendar_name.clone(),
        dates,
        lat: first.lat.clone(),
        lon: first.lon.clone(),
        attributes: first.attributes.clone(),
        variables,
    })
}

fn check_consistent(reference: &FileContents, other: &FileContents) -> Result<()> {
    let mismatch = |what: &str| ClimdexError::InconsistentInputs {
        message: format!(
            "{what} differs between {} and {}",
            reference.path.display(),
            other.path.display()
        ),
    };

    if reference.calendar != other.calendar {
        return Err(mismatch("calendar"));
    }
    if reference.lat.len() != other.lat.len() {
        return Err(mismatch("'lat' dimension size"));
    }
    if reference.lon.len() != other.lon.len() {
        return Err(mismatch("'lon' dimension size"));
    }
    if reference.lat.values != other.lat.values {
        return Err(mismatch("'lat' coordinate"));
    }
    if reference.lon.values != other.lon.values {
        return Err(mismatch("'lon' coordinate"));
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<FileContents> {
    tracing::debug!(path = %path.display(), "reading input file");
    let file = netcdf::open(path)?;

    let (calendar, calendar_name, units) = read_time_metadata(&file, path)?;
    let offsets = file
        .variable(TIME_DIM)
        .ok_or_else(|| ClimdexError::VariableNotFound {
            var: TIME_DIM.to_string(),
            path: path.to_path_buf(),
        })?
        .get_values::<f64, _>(..)?;
    if offsets.is_empty() {
        return Err(ClimdexError::InvalidTime {
            reason: format!("{} has an empty time axis", path.display()),
        });
    }

    let reference_day = calendar.day_number(units.reference)? as f64;
    let instants = offsets
        .iter()
        .map(|&v| reference_day * 86_400.0 + units.reference_seconds + v * units.step_seconds)
        .collect();
    let dates = offsets
        .iter()
        .map(|&v| units.decode(v))
        .collect::<Result<Vec<CalDate>>>()?;

    let lat = read_coordinate(&file, LAT_DIM, path)?;
    let lon = read_coordinate(&file, LON_DIM, path)?;

    let variables = INPUT_VARIABLES
        .iter()
        .map(|name| read_variable(&file, name, path, offsets.len(), lat.len(), lon.len()))
        .collect::<Result<Vec<DataVariable>>>()?;

    let attributes = file
        .attributes()
        .map(|attr| Ok((attr.name().to_string(), attr.value()?)))
        .collect::<Result<Attributes>>()?;

    Ok(FileContents {
        path: path.to_path_buf(),
        calendar,
        calendar_name,
        instants,
        dates,
        lat,
        lon,
        attributes,
        variables,
    })
}

fn read_time_metadata(file: &File, path: &Path) -> Result<(Calendar, String, TimeUnits)> {
    let var = file
        .variable(TIME_DIM)
        .ok_or_else(|| ClimdexError::VariableNotFound {
            var: TIME_DIM.to_string(),
            path: path.to_path_buf(),
        })?;

    let units = string_attribute(&var, "units")?.ok_or_else(|| ClimdexError::InvalidTime {
        reason: format!("time variable in {} has no 'units' attribute", path.display()),
    })?;
    let calendar_name =
        string_attribute(&var, "calendar")?.unwrap_or_else(|| "standard".to_string());
    let calendar = Calendar::parse(&calendar_name)?;
    let units = TimeUnits::parse(&units, calendar)?;

    Ok((calendar, calendar_name, units))
}

/// Read a coordinate variable; a bare dimension gets index values.
fn read_coordinate(file: &File, name: &str, path: &Path) -> Result<Coordinate> {
    let dim = file
        .dimension(name)
        .ok_or_else(|| ClimdexError::InconsistentInputs {
            message: format!("{} has no '{name}' dimension", path.display()),
        })?;

    match file.variable(name) {
        Some(var) => {
            let attributes = var
                .attributes()
                .map(|attr| Ok((attr.name().to_string(), attr.value()?)))
                .collect::<Result<Attributes>>()?;
            Ok(Coordinate {
                name: name.to_string(),
                values: var.get_values::<f64, _>(..)?,
                attributes,
            })
        }
        None => Ok(Coordinate {
            name: name.to_string(),
            values: (0..dim.len()).map(|i| i as f64).collect(),
            attributes: Vec::new(),
        }),
    }
}

fn read_variable(
    file: &File,
    name: &str,
    path: &Path,
    ntime: usize,
    nlat: usize,
    nlon: usize,
) -> Result<DataVariable> {
    let var = file
        .variable(name)
        .ok_or_else(|| ClimdexError::VariableNotFound {
            var: name.to_string(),
            path: path.to_path_buf(),
        })?;

    let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
    if dim_names != [TIME_DIM, LAT_DIM, LON_DIM] {
        return Err(ClimdexError::DimensionMismatch {
            var: name.to_string(),
            path: path.to_path_buf(),
            expected: [TIME_DIM, LAT_DIM, LON_DIM].join(", "),
            found: dim_names.join(", "),
        });
    }

    let mut attributes = var
        .attributes()
        .map(|attr| Ok((attr.name().to_string(), attr.value()?)))
        .collect::<Result<Attributes>>()?;

    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|key| find_attribute(&attributes, key))
        .flat_map(numeric_values)
        .collect();
    let scale = find_attribute(&attributes, "scale_factor")
        .and_then(|v| numeric_values(v).into_iter().next())
        .unwrap_or(1.0);
    let offset = find_attribute(&attributes, "add_offset")
        .and_then(|v| numeric_values(v).into_iter().next())
        .unwrap_or(0.0);

    let quantity = if name == PR {
        Quantity::PrecipitationRate
    } else {
        Quantity::Temperature
    };
    let raw_units = match find_attribute(&attributes, "units") {
        Some(AttributeValue::Str(units)) => units.clone(),
        _ => {
            tracing::warn!(
                var = name,
                path = %path.display(),
                assumed = quantity.default_units(),
                "variable has no units attribute"
            );
            quantity.default_units().to_string()
        }
    };
    let conversion = units::conversion(name, &raw_units, quantity)?;

    let raw = var.get_values::<f32, _>(..)?;
    let mut data = Array3::from_shape_vec((ntime, nlat, nlon), raw)?;
    data.mapv_inplace(|value| {
        if fill_values.iter().any(|&fill| value == fill as f32) {
            f32::NAN
        } else {
            let unpacked = (f64::from(value) * scale + offset) as f32;
            conversion.apply(unpacked)
        }
    });

    attributes.retain(|(key, _)| !PACKING_ATTRIBUTES.contains(&key.as_str()));
    set_attribute(
        &mut attributes,
        "units",
        AttributeValue::Str(quantity.canonical_units().to_string()),
    );

    Ok(DataVariable {
        name: name.to_string(),
        data,
        attributes,
    })
}

fn string_attribute(var: &Variable, name: &str) -> Result<Option<String>> {
    match var.attribute_value(name) {
        Some(value) => match value? {
            AttributeValue::Str(s) => Ok(Some(s)),
            AttributeValue::Strs(mut s) if !s.is_empty() => Ok(Some(s.swap_remove(0))),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}

/// Numeric attribute values widened to f64; strings yield nothing.
pub(crate) fn numeric_values(value: &AttributeValue) -> Vec<f64> {
    match value {
        AttributeValue::Uchar(v) => vec![f64::from(*v)],
        AttributeValue::Uchars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Schar(v) => vec![f64::from(*v)],
        AttributeValue::Schars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ushort(v) => vec![f64::from(*v)],
        AttributeValue::Ushorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Short(v) => vec![f64::from(*v)],
        AttributeValue::Shorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Uint(v) => vec![f64::from(*v)],
        AttributeValue::Uints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Int(v) => vec![f64::from(*v)],
        AttributeValue::Ints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ulonglong(v) => vec![*v as f64],
        AttributeValue::Ulonglongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Longlong(v) => vec![*v as f64],
        AttributeValue::Longlongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Float(v) => vec![f64::from(*v)],
        AttributeValue::Floats(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Double(v) => vec![*v],
        AttributeValue::Doubles(v) => v.clone(),
        _ => Vec::new(),
    }
}
