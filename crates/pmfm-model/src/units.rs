//! Measurement units and unit conversions.
//!
//! Weight units pivot through kilograms and length units through meters.
//! The label groups and patterns below are the deployed heuristics used to
//! recognize unit-bearing measurements; keep them stable, existing
//! referential data depends on them.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PmfmError;

/// Unit label of decimal-hours durations.
pub const UNIT_DECIMAL_HOURS: &str = "h dec.";
/// Unit label of combined date & time measurements.
pub const UNIT_DATE_TIME: &str = "Date & Time";

/// Matches date & time unit labels, with spacing/ampersand variants.
pub static DATE_TIME_UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Date[ &]+Time$").expect("invalid date-time unit regex"));

/// Matches decimal-hours unit labels (`h dec.`, `hours`).
pub static DECIMAL_HOURS_UNIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(h[. ]+dec[.]?|hours)$").expect("invalid decimal-hours regex"));

/// Weight units, ordered from heaviest to lightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    T,
    Kg,
    G,
    Mg,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 4] = [WeightUnit::T, WeightUnit::Kg, WeightUnit::G, WeightUnit::Mg];

    /// Kilograms per one unit (kg is the pivot).
    pub fn kg_factor(self) -> f64 {
        match self {
            WeightUnit::T => 1000.0,
            WeightUnit::Kg => 1.0,
            WeightUnit::G => 1e-3,
            WeightUnit::Mg => 1e-6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightUnit::T => "t",
            WeightUnit::Kg => "kg",
            WeightUnit::G => "g",
            WeightUnit::Mg => "mg",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = PmfmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "t" => Ok(WeightUnit::T),
            "kg" => Ok(WeightUnit::Kg),
            "g" => Ok(WeightUnit::G),
            "mg" => Ok(WeightUnit::Mg),
            other => Err(PmfmError::UnknownWeightUnit(other.to_string())),
        }
    }
}

/// Length units, ordered from longest to shortest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Km,
    M,
    Dm,
    Cm,
    Mm,
}

impl LengthUnit {
    pub const ALL: [LengthUnit; 5] = [
        LengthUnit::Km,
        LengthUnit::M,
        LengthUnit::Dm,
        LengthUnit::Cm,
        LengthUnit::Mm,
    ];

    /// Meters per one unit (meter is the pivot).
    pub fn meter_factor(self) -> f64 {
        match self {
            LengthUnit::Km => 1000.0,
            LengthUnit::M => 1.0,
            LengthUnit::Dm => 0.1,
            LengthUnit::Cm => 0.01,
            LengthUnit::Mm => 1e-3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LengthUnit::Km => "km",
            LengthUnit::M => "m",
            LengthUnit::Dm => "dm",
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LengthUnit {
    type Err = PmfmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" => Ok(LengthUnit::Km),
            "m" => Ok(LengthUnit::M),
            "dm" => Ok(LengthUnit::Dm),
            "cm" => Ok(LengthUnit::Cm),
            "mm" => Ok(LengthUnit::Mm),
            other => Err(PmfmError::UnknownLengthUnit(other.to_string())),
        }
    }
}

/// True when the label belongs to the weight unit group.
pub fn is_weight_unit_label(label: &str) -> bool {
    WeightUnit::from_str(label).is_ok()
}

/// True when the label belongs to the length unit group.
pub fn is_length_unit_label(label: &str) -> bool {
    LengthUnit::from_str(label).is_ok()
}

/// A reversible multiplicative rescaling between two units.
///
/// Attached to a PMFM as its display conversion: the in-memory value is
/// `wire value * conversion_coefficient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_unit: Option<String>,
    pub conversion_coefficient: f64,
}

impl UnitConversion {
    pub fn new(conversion_coefficient: f64) -> Self {
        Self {
            from_unit: None,
            to_unit: None,
            conversion_coefficient,
        }
    }

    pub fn between(
        from_unit: impl Into<String>,
        to_unit: impl Into<String>,
        conversion_coefficient: f64,
    ) -> Self {
        Self {
            from_unit: Some(from_unit.into()),
            to_unit: Some(to_unit.into()),
            conversion_coefficient,
        }
    }

    /// The inverse conversion: units swapped, coefficient inverted.
    pub fn reversed(&self) -> Self {
        Self {
            from_unit: self.to_unit.clone(),
            to_unit: self.from_unit.clone(),
            conversion_coefficient: 1.0 / self.conversion_coefficient,
        }
    }
}
