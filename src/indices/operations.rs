//! The indicator set and its metadata
//!
//! Each [`Indicator`] knows its canonical output name, the input variables it
//! reads, and the CF attributes written alongside its result.

use crate::config::IndicesConfig;
use crate::dataset::{PR, TASMAX, TASMIN};
use serde::Serialize;

/// Supported annual indicators, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// R1mm: days with precipitation at or above the wet-day threshold
    WetDays,
    /// CDD: longest dry spell
    MaxConsecutiveDryDays,
    /// CWD: longest wet spell
    MaxConsecutiveWetDays,
    /// PRCPTOT: total precipitation
    PrecipAccumulation,
    /// SDII: mean precipitation on wet days
    DailyPrIntensity,
    /// RX1day
    Max1DayPrecipitation,
    /// RXnday, n = `rx_window`
    MaxNDayPrecipitation,
    /// TXx
    TxMax,
    /// TNx
    TnMax,
    /// TXn
    TxMin,
    /// TNn
    TnMin,
    /// FD
    FrostDays,
    /// ID
    IceDays,
    /// SU
    TxDaysAbove,
    /// TR
    TropicalNights,
    /// TX10p
    Tx10p,
    /// TX90p
    Tx90p,
    /// TN10p
    Tn10p,
    /// TN90p
    Tn90p,
    /// CSDI
    ColdSpellDurationIndex,
}

/// Descriptive metadata for one indicator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorMetadata {
    pub name: String,
    pub long_name: String,
    pub description: String,
    pub units: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_name: Option<&'static str>,
    pub cell_methods: &'static str,
    pub inputs: Vec<&'static str>,
}

impl Indicator {
    /// Every indicator in evaluation order
    pub const ALL: [Self; 20] = [
        Self::WetDays,
        Self::MaxConsecutiveDryDays,
        Self::MaxConsecutiveWetDays,
        Self::PrecipAccumulation,
        Self::DailyPrIntensity,
        Self::Max1DayPrecipitation,
        Self::MaxNDayPrecipitation,
        Self::TxMax,
        Self::TnMax,
        Self::TxMin,
        Self::TnMin,
        Self::FrostDays,
        Self::IceDays,
        Self::TxDaysAbove,
        Self::TropicalNights,
        Self::Tx10p,
        Self::Tx90p,
        Self::Tn10p,
        Self::Tn90p,
        Self::ColdSpellDurationIndex,
    ];

    /// Output variable name
    #[must_use]
    pub fn name(self, config: &IndicesConfig) -> String {
        match self {
            Self::WetDays => "wetdays".to_string(),
            Self::MaxConsecutiveDryDays => "cdd".to_string(),
            Self::MaxConsecutiveWetDays => "cwd".to_string(),
            Self::PrecipAccumulation => "prcptot".to_string(),
            Self::DailyPrIntensity => "sdii".to_string(),
            Self::Max1DayPrecipitation => "rx1day".to_string(),
            Self::MaxNDayPrecipitation => format!("rx{}day", config.rx_window),
            Self::TxMax => "tx_max".to_string(),
            Self::TnMax => "tn_max".to_string(),
            Self::TxMin => "tx_min".to_string(),
            Self::TnMin => "tn_min".to_string(),
            Self::FrostDays => "frost_days".to_string(),
            Self::IceDays => "ice_days".to_string(),
            Self::TxDaysAbove => "tx_days_above".to_string(),
            Self::TropicalNights => "tropical_nights".to_string(),
            Self::Tx10p => "tx10p".to_string(),
            Self::Tx90p => "tx90p".to_string(),
            Self::Tn10p => "tn10p".to_string(),
            Self::Tn90p => "tn90p".to_string(),
            Self::ColdSpellDurationIndex => format!("csdi_{}", config.csdi_window),
        }
    }

    /// Input variables the indicator reads, the masked ones first
    #[must_use]
    pub const fn inputs(self) -> &'static [&'static str] {
        match self {
            Self::WetDays
            | Self::MaxConsecutiveDryDays
            | Self::MaxConsecutiveWetDays
            | Self::PrecipAccumulation
            | Self::DailyPrIntensity
            | Self::Max1DayPrecipitation
            | Self::MaxNDayPrecipitation => &[PR],
            Self::TxMax | Self::TxMin | Self::IceDays | Self::TxDaysAbove => &[TASMAX],
            Self::TnMax | Self::TnMin | Self::FrostDays | Self::TropicalNights => &[TASMIN],
            Self::Tx10p | Self::Tx90p => &[TASMAX, TASMIN],
            Self::Tn10p | Self::Tn90p | Self::ColdSpellDurationIndex => &[TASMIN, TASMAX],
        }
    }

    /// Whether the indicator compares against day-of-year percentiles
    #[must_use]
    pub const fn uses_percentiles(self) -> bool {
        matches!(
            self,
            Self::Tx10p | Self::Tx90p | Self::Tn10p | Self::Tn90p | Self::ColdSpellDurationIndex
        )
    }

    #[must_use]
    pub const fn units(self) -> &'static str {
        match self {
            Self::PrecipAccumulation | Self::Max1DayPrecipitation | Self::MaxNDayPrecipitation => {
                "mm"
            }
            Self::DailyPrIntensity => "mm d-1",
            Self::TxMax | Self::TnMax | Self::TxMin | Self::TnMin => "K",
            _ => "days",
        }
    }

    #[must_use]
    pub const fn standard_name(self) -> Option<&'static str> {
        match self {
            Self::WetDays | Self::MaxConsecutiveWetDays => Some(
                "number_of_days_with_lwe_thickness_of_precipitation_amount_at_or_above_threshold",
            ),
            Self::MaxConsecutiveDryDays => {
                Some("number_of_days_with_lwe_thickness_of_precipitation_amount_below_threshold")
            }
            Self::PrecipAccumulation
            | Self::DailyPrIntensity
            | Self::Max1DayPrecipitation
            | Self::MaxNDayPrecipitation => Some("lwe_thickness_of_precipitation_amount"),
            Self::TxMax | Self::TnMax | Self::TxMin | Self::TnMin => Some("air_temperature"),
            Self::FrostDays | Self::IceDays => Some("days_with_air_temperature_below_threshold"),
            Self::TxDaysAbove | Self::TropicalNights => {
                Some("number_of_days_with_air_temperature_above_threshold")
            }
            Self::ColdSpellDurationIndex => Some("cold_spell_duration_index"),
            Self::Tx10p | Self::Tx90p | Self::Tn10p | Self::Tn90p => None,
        }
    }

    #[must_use]
    pub const fn cell_methods(self) -> &'static str {
        match self {
            Self::DailyPrIntensity => "time: mean",
            Self::Max1DayPrecipitation
            | Self::MaxNDayPrecipitation
            | Self::TxMax
            | Self::TnMax => "time: maximum",
            Self::TxMin | Self::TnMin => "time: minimum",
            _ => "time: sum",
        }
    }

    /// Human-readable name including the configured thresholds
    #[must_use]
    pub fn long_name(self, config: &IndicesConfig) -> String {
        let wet = config.wet_day_threshold;
        let low = config.low_percentile;
        let high = config.high_percentile;
        match self {
            Self::WetDays => format!("Number of days with daily precipitation at or above {wet} mm/day"),
            Self::MaxConsecutiveDryDays => {
                format!("Maximum consecutive days with daily precipitation below {wet} mm/day")
            }
            Self::MaxConsecutiveWetDays => {
                format!("Maximum consecutive days with daily precipitation at or above {wet} mm/day")
            }
            Self::PrecipAccumulation => "Total accumulated precipitation".to_string(),
            Self::DailyPrIntensity => {
                format!("Average precipitation during days with daily precipitation at or above {wet} mm/day")
            }
            Self::Max1DayPrecipitation => "Maximum 1-day total precipitation".to_string(),
            Self::MaxNDayPrecipitation => {
                format!("Maximum {}-day total precipitation", config.rx_window)
            }
            Self::TxMax => "Maximum daily maximum temperature".to_string(),
            Self::TnMax => "Maximum daily minimum temperature".to_string(),
            Self::TxMin => "Minimum daily maximum temperature".to_string(),
            Self::TnMin => "Minimum daily minimum temperature".to_string(),
            Self::FrostDays => format!(
                "Number of frost days (daily minimum temperature below {} degC)",
                config.freezing_threshold
            ),
            Self::IceDays => format!(
                "Number of ice days (daily maximum temperature below {} degC)",
                config.freezing_threshold
            ),
            Self::TxDaysAbove => format!(
                "Number of days with daily maximum temperature above {} degC",
                config.summer_day_threshold
            ),
            Self::TropicalNights => format!(
                "Number of tropical nights (daily minimum temperature above {} degC)",
                config.tropical_night_threshold
            ),
            Self::Tx10p => format!(
                "Number of days with daily maximum temperature below the {low}th percentile"
            ),
            Self::Tx90p => format!(
                "Number of days with daily maximum temperature above the {high}th percentile"
            ),
            Self::Tn10p => format!(
                "Number of days with daily minimum temperature below the {low}th percentile"
            ),
            Self::Tn90p => format!(
                "Number of days with daily minimum temperature above the {high}th percentile"
            ),
            Self::ColdSpellDurationIndex => format!(
                "Number of days part of a spell of at least {} days with daily minimum temperature below the {low}th percentile",
                config.csdi_window
            ),
        }
    }

    /// Longer description of how the value is computed
    #[must_use]
    pub fn description(self, config: &IndicesConfig) -> String {
        let window = config.percentile_window;
        match self {
            Self::PrecipAccumulation => {
                "Annual total precipitation, summed over all days.".to_string()
            }
            Self::DailyPrIntensity => format!(
                "Annual total precipitation on days with at least {} mm/day divided by the number of such days.",
                config.wet_day_threshold
            ),
            Self::MaxNDayPrecipitation => format!(
                "Annual maximum of the {}-day trailing precipitation sum.",
                config.rx_window
            ),
            Self::Tx10p | Self::Tn10p => format!(
                "Annual count of days below the {}th percentile of daily mean temperature, computed per day of year over a {window}-day window.",
                config.low_percentile
            ),
            Self::Tx90p | Self::Tn90p => format!(
                "Annual count of days above the {}th percentile of daily mean temperature, computed per day of year over a {window}-day window.",
                config.high_percentile
            ),
            Self::ColdSpellDurationIndex => format!(
                "Annual count of days in runs of at least {} consecutive days with daily minimum temperature below the {}th percentile of daily minimum temperature, computed per day of year over a {window}-day window.",
                config.csdi_window, config.low_percentile
            ),
            _ => format!("Annual {}.", lowercase_first(&self.long_name(config))),
        }
    }

    /// Full metadata record
    #[must_use]
    pub fn metadata(self, config: &IndicesConfig) -> IndicatorMetadata {
        IndicatorMetadata {
            name: self.name(config),
            long_name: self.long_name(config),
            description: self.description(config),
            units: self.units(),
            standard_name: self.standard_name(),
            cell_methods: self.cell_methods(),
            inputs: self.inputs().to_vec(),
        }
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Metadata for the whole indicator set
#[must_use]
pub fn catalog(config: &IndicesConfig) -> Vec<IndicatorMetadata> {
    Indicator::ALL
        .iter()
        .map(|indicator| indicator.metadata(config))
        .collect()
}
