//! Rule violations reported by a [`crate::PmfmValidator`].

use serde::{Deserialize, Serialize};

/// One failed validation rule for one input.
///
/// Carries the facts needed to render a message; rendering itself is left
/// to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule")]
pub enum RuleViolation {
    /// A required measurement is absent or blank.
    #[serde(rename = "required")]
    Required,
    /// A text exceeds the maximum length.
    #[serde(rename = "maxLength")]
    MaxLength { max: usize },
    /// A numeric value is below the minimum.
    #[serde(rename = "min")]
    Min { min: f64, actual: f64 },
    /// A numeric value is above the maximum.
    #[serde(rename = "max")]
    Max { max: f64, actual: f64 },
    /// The input is not a well-formed integer.
    #[serde(rename = "integer")]
    Integer,
    /// The input is not a well-formed decimal.
    #[serde(rename = "decimal")]
    Decimal,
    /// The input carries more decimals than allowed.
    #[serde(rename = "maxDecimals")]
    MaxDecimals { max: u32 },
    /// The input carries more significant figures than allowed.
    #[serde(rename = "signifFiguresNumber")]
    SignifFigures { max: u32, actual: u32 },
    /// The value is not a multiple of the precision step.
    #[serde(rename = "precision")]
    PrecisionStep { precision: f64 },
    /// The id does not name an allowed qualitative value.
    #[serde(rename = "qualitativeValue")]
    InvalidQualitativeValue,
}

impl RuleViolation {
    /// Stable rule name, for tabular/log output.
    pub fn rule_name(&self) -> &'static str {
        match self {
            RuleViolation::Required => "required",
            RuleViolation::MaxLength { .. } => "maxLength",
            RuleViolation::Min { .. } => "min",
            RuleViolation::Max { .. } => "max",
            RuleViolation::Integer => "integer",
            RuleViolation::Decimal => "decimal",
            RuleViolation::MaxDecimals { .. } => "maxDecimals",
            RuleViolation::SignifFigures { .. } => "signifFiguresNumber",
            RuleViolation::PrecisionStep { .. } => "precision",
            RuleViolation::InvalidQualitativeValue => "qualitativeValue",
        }
    }
}

impl std::fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleViolation::Required => write!(f, "value is required"),
            RuleViolation::MaxLength { max } => write!(f, "exceeds maximum length {max}"),
            RuleViolation::Min { min, actual } => write!(f, "{actual} is below minimum {min}"),
            RuleViolation::Max { max, actual } => write!(f, "{actual} is above maximum {max}"),
            RuleViolation::Integer => write!(f, "not a valid integer"),
            RuleViolation::Decimal => write!(f, "not a valid decimal"),
            RuleViolation::MaxDecimals { max } => {
                write!(f, "more than {max} decimals")
            }
            RuleViolation::SignifFigures { max, actual } => {
                write!(f, "{actual} significant figures, at most {max} allowed")
            }
            RuleViolation::PrecisionStep { precision } => {
                write!(f, "not a multiple of the {precision} precision step")
            }
            RuleViolation::InvalidQualitativeValue => {
                write!(f, "not an allowed qualitative value")
            }
        }
    }
}
