//! Unit normalisation for the input variables
//!
//! Indicator thresholds are expressed in mm/day and degrees Celsius, while
//! model output usually arrives as a flux (`kg m-2 s-1`) and in Kelvin. Input
//! series are converted once on load: precipitation to mm/day, temperature to
//! Kelvin.

use crate::errors::{ClimdexError, Result};

/// Offset between Celsius and Kelvin
pub const KELVIN_OFFSET: f64 = 273.15;

/// Canonical units of the loaded precipitation series
pub const PRECIP_UNITS: &str = "mm d-1";

/// Canonical units of the loaded temperature series
pub const TEMPERATURE_UNITS: &str = "K";

/// Kind of physical quantity a variable holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    PrecipitationRate,
    Temperature,
}

impl Quantity {
    /// Unit assumed when a variable carries no `units` attribute
    #[must_use]
    pub const fn default_units(self) -> &'static str {
        match self {
            Self::PrecipitationRate => "kg m-2 s-1",
            Self::Temperature => "K",
        }
    }

    #[must_use]
    pub const fn canonical_units(self) -> &'static str {
        match self {
            Self::PrecipitationRate => PRECIP_UNITS,
            Self::Temperature => TEMPERATURE_UNITS,
        }
    }
}

/// Linear conversion `canonical = raw * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub scale: f64,
    pub offset: f64,
}

impl Conversion {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    #[must_use]
    pub fn apply(self, value: f32) -> f32 {
        (f64::from(value) * self.scale + self.offset) as f32
    }
}

/// Squash spelling variants: `kg m**-2 s**-1`, `kg/m^2/s` and `kg m-2 s-1`
/// all normalise to the same key.
fn normalise(units: &str) -> String {
    let lowered = units.trim().to_ascii_lowercase().replace('°', "deg");
    let mut key = String::with_capacity(lowered.len());
    let mut tokens = lowered
        .replace("**", "")
        .replace('^', "")
        .replace('.', " ")
        .replace('*', " ");
    // `kg/m2/s` style: every `/x` becomes `x-1`
    if tokens.contains('/') {
        let mut parts = tokens.split('/');
        let mut rebuilt = parts.next().unwrap_or_default().trim().to_string();
        for part in parts {
            let part = part.trim();
            let (base, power) = match part.find(|c: char| c.is_ascii_digit()) {
                Some(idx) => (&part[..idx], &part[idx..]),
                None => (part, "1"),
            };
            rebuilt.push_str(&format!(" {base}-{power}"));
        }
        tokens = rebuilt;
    }
    for (i, token) in tokens.split_whitespace().enumerate() {
        if i > 0 {
            key.push(' ');
        }
        key.push_str(token);
    }
    key
}

/// Conversion from `units` to the canonical units of `quantity`.
pub fn conversion(var: &str, units: &str, quantity: Quantity) -> Result<Conversion> {
    let key = normalise(units);
    let conv = match quantity {
        Quantity::PrecipitationRate => match key.as_str() {
            "kg m-2 s-1" | "mm s-1" | "kg m-2 sec-1" => Some(86_400.0),
            "mm d-1" | "mm day-1" | "mm" | "kg m-2 d-1" | "kg m-2 day-1" => {
                Some(1.0)
            }
            "m s-1" => Some(86_400_000.0),
            "m d-1" | "m day-1" => Some(1_000.0),
            "mm h-1" | "mm hr-1" => Some(24.0),
            _ => None,
        }
        .map(|scale| Conversion { scale, offset: 0.0 }),
        Quantity::Temperature => match key.as_str() {
            "k" | "kelvin" | "degk" | "deg_k" => Some(Conversion::IDENTITY),
            "degc" | "deg_c" | "c" | "celsius" | "degree_c" | "degrees_c" | "degree_celsius"
            | "degrees_celsius" => {
                Some(Conversion {
                    scale: 1.0,
                    offset: KELVIN_OFFSET,
                })
            }
            "degf" | "deg_f" | "f" | "fahrenheit" => Some(Conversion {
                scale: 5.0 / 9.0,
                offset: KELVIN_OFFSET - 32.0 * 5.0 / 9.0,
            }),
            _ => None,
        },
    };

    conv.ok_or_else(|| ClimdexError::UnsupportedUnits {
        var: var.to_string(),
        units: units.to_string(),
    })
}

/// Convert a Celsius threshold to Kelvin.
#[must_use]
pub fn celsius_to_kelvin(celsius: f64) -> f32 {
    (celsius + KELVIN_OFFSET) as f32
}
