//! Console descriptions of the loaded dataset and the indicator set

use crate::config::IndicesConfig;
use crate::dataset::{find_attribute, Attributes, Dataset};
use crate::errors::Result;
use crate::indices::catalog;
use crate::progress::progress;
use netcdf::AttributeValue;

/// Prints global attributes, coordinates and variables of a loaded dataset.
pub fn print_dataset_summary(dataset: &Dataset) {
    progress!("\n===== Global Attributes =====");
    if dataset.attributes.is_empty() {
        progress!("   (none)");
    }
    for (name, value) in &dataset.attributes {
        progress!("- {name}: {}", format_attribute_value(value));
    }

    progress!("\n===== Coordinates =====");
    match (dataset.dates.first(), dataset.dates.last()) {
        (Some(first), Some(last)) => progress!(
            "    time = {} ({first} to {last}, calendar {})",
            dataset.ntime(),
            dataset.calendar_name
        ),
        _ => progress!("    time = 0"),
    }
    for coordinate in [&dataset.lat, &dataset.lon] {
        let range = coordinate
            .values
            .iter()
            .copied()
            .fold(None, |acc: Option<(f64, f64)>, v| {
                Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
            });
        match range {
            Some((lo, hi)) => progress!(
                "    {} = {} ({lo} to {hi})",
                coordinate.name,
                coordinate.len()
            ),
            None => progress!("    {} = 0", coordinate.name),
        }
    }

    progress!("\n===== Variables =====");
    let (nlat, nlon) = dataset.grid_shape();
    for variable in dataset.variables.values() {
        progress!(
            "- {} (time[{}], lat[{nlat}], lon[{nlon}])",
            variable.name,
            dataset.ntime()
        );
        let key_attrs = key_attributes(&variable.attributes);
        if !key_attrs.is_empty() {
            progress!("      └─ {}", key_attrs.join(", "));
        }
    }
}

fn key_attributes(attributes: &Attributes) -> Vec<String> {
    ["units", "long_name", "standard_name"]
        .iter()
        .filter_map(|key| {
            find_attribute(attributes, key).map(|v| format!("{key}: {}", format_attribute_value(v)))
        })
        .collect()
}

/// Render an attribute value for display
#[must_use]
pub fn format_attribute_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Str(s) => s.clone(),
        AttributeValue::Strs(ss) => ss.join(", "),
        AttributeValue::Float(f) => f.to_string(),
        AttributeValue::Double(d) => d.to_string(),
        AttributeValue::Int(i) => i.to_string(),
        AttributeValue::Short(s) => s.to_string(),
        other => format!("{other:?}"),
    }
}

/// Prints every indicator with its units and long name.
pub fn print_indicator_list(config: &IndicesConfig) {
    let entries = catalog(config);
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

    println!("\n Indicators");
    println!("==============");
    for entry in &entries {
        println!(
            "    {:<width$}  [{}]  {}",
            entry.name, entry.units, entry.long_name
        );
    }
}

/// The indicator catalog as pretty-printed JSON.
pub fn indicator_list_json(config: &IndicesConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(&catalog(config))?)
}
