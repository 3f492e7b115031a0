//! PMFM descriptors.
//!
//! A PMFM (Parameter-Matrix-Fraction-Method) fully qualifies a measurable
//! quantity: what is measured, on what substrate, by what method. Descriptors
//! arrive from the referential service as JSON in one of three shapes,
//! modeled here as an explicit sum type instead of runtime shape probing:
//!
//! - minimal: bare numeric facets plus a unit label;
//! - denormalized: precomputed display fields (`name`, `completeName`);
//! - full: nested parameter/matrix/fraction/method/unit objects.
//!
//! Classification predicates (`is_weight`, `is_length`, ...) combine unit
//! group membership with label-pattern heuristics. The same logical
//! measurement appears under different labels across deployments, so the
//! patterns stand in for a stable taxonomy; keep them, and their precedence
//! (unit group before label pattern), exactly as deployed.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PmfmError;
use crate::referential::{Parameter, ReferentialRef};
use crate::units::{
    DATE_TIME_UNIT_REGEX, DECIMAL_HOURS_UNIT_REGEX, UNIT_DATE_TIME, UNIT_DECIMAL_HOURS,
    UnitConversion, is_length_unit_label, is_weight_unit_label,
};

/// Well-known PMFM ids, stable across deployments.
pub mod pmfm_ids {
    pub const TAG_ID: i32 = 82;
    pub const DRESSING: i32 = 151;
}

/// Method ids whose measurements are calculated rather than observed.
pub const CALCULATED_METHOD_IDS: &[i32] = &[4, 47, 283];

pub static WEIGHT_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)WEIGHT$").expect("invalid weight label regex"));

pub static LENGTH_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)LENGTH").expect("invalid length label regex"));

pub static LATITUDE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^LATITUDE$").expect("invalid latitude label regex"));

pub static LONGITUDE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^LONGITUDE$").expect("invalid longitude label regex"));

pub static DRESSING_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^DRESSING").expect("invalid dressing label regex"));

pub static SELECTIVITY_DEVICE_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^SELECTIVITY_DEVICE").expect("invalid selectivity device label regex")
});

/// Value type of a PMFM, as declared by the referential service.
///
/// An unrecognized type string is a metadata/schema mismatch and fails
/// hard at parse time; no safe default exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PmfmType {
    Integer,
    Double,
    String,
    Boolean,
    Date,
    QualitativeValue,
}

impl PmfmType {
    pub fn as_str(self) -> &'static str {
        match self {
            PmfmType::Integer => "integer",
            PmfmType::Double => "double",
            PmfmType::String => "string",
            PmfmType::Boolean => "boolean",
            PmfmType::Date => "date",
            PmfmType::QualitativeValue => "qualitative_value",
        }
    }
}

impl fmt::Display for PmfmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PmfmType {
    type Err = PmfmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integer" => Ok(PmfmType::Integer),
            "double" => Ok(PmfmType::Double),
            "string" => Ok(PmfmType::String),
            "boolean" => Ok(PmfmType::Boolean),
            "date" => Ok(PmfmType::Date),
            "qualitative_value" => Ok(PmfmType::QualitativeValue),
            other => Err(PmfmError::UnknownType(other.to_string())),
        }
    }
}

/// [`PmfmType`] refined by label/unit heuristics for widget selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedPmfmType {
    Integer,
    Double,
    String,
    Boolean,
    Date,
    QualitativeValue,
    Latitude,
    Longitude,
    Duration,
    DateTime,
}

impl From<PmfmType> for ExtendedPmfmType {
    fn from(value: PmfmType) -> Self {
        match value {
            PmfmType::Integer => ExtendedPmfmType::Integer,
            PmfmType::Double => ExtendedPmfmType::Double,
            PmfmType::String => ExtendedPmfmType::String,
            PmfmType::Boolean => ExtendedPmfmType::Boolean,
            PmfmType::Date => ExtendedPmfmType::Date,
            PmfmType::QualitativeValue => ExtendedPmfmType::QualitativeValue,
        }
    }
}

/// Shape-specific payload of a descriptor.
///
/// Untagged: a `parameter` object marks the full shape, a `name` field the
/// denormalized one, anything else is minimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PmfmDetail {
    Full(FullDetail),
    Denormalized(DenormalizedDetail),
    Minimal(MinimalDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullDetail {
    pub parameter: Parameter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<ReferentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction: Option<ReferentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ReferentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<ReferentialRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenormalizedDetail {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimalDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_label: Option<String>,
}

impl PmfmDetail {
    pub fn is_full(&self) -> bool {
        matches!(self, PmfmDetail::Full(_))
    }

    pub fn is_denormalized(&self) -> bool {
        matches!(self, PmfmDetail::Denormalized(_))
    }
}

/// A measurable-quantity descriptor.
///
/// `default_value` is kept in wire form (a string) and is decoded through
/// the owning descriptor's type, like any other wire value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pmfm {
    pub id: i32,
    pub label: String,
    #[serde(rename = "type")]
    pub pmfm_type: PmfmType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_number_decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signif_figures_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualitative_values: Vec<ReferentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_id: Option<i32>,
    #[serde(default)]
    pub is_multiple: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_conversion: Option<UnitConversion>,
    #[serde(flatten)]
    pub detail: PmfmDetail,
}

impl Pmfm {
    /// A minimal descriptor with everything else unset.
    pub fn minimal(id: i32, label: impl Into<String>, pmfm_type: PmfmType) -> Self {
        Self {
            id,
            label: label.into(),
            pmfm_type,
            min_value: None,
            max_value: None,
            default_value: None,
            maximum_number_decimals: None,
            signif_figures_number: None,
            detection_threshold: None,
            precision: None,
            qualitative_values: Vec::new(),
            method_id: None,
            is_multiple: false,
            required: false,
            hidden: false,
            rank_order: None,
            display_conversion: None,
            detail: PmfmDetail::Minimal(MinimalDetail { unit_label: None }),
        }
    }

    #[must_use]
    pub fn with_unit_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        match &mut self.detail {
            PmfmDetail::Minimal(detail) => detail.unit_label = Some(label),
            PmfmDetail::Denormalized(detail) => detail.unit_label = Some(label),
            PmfmDetail::Full(detail) => match &mut detail.unit {
                Some(unit) => unit.label = Some(label),
                None => detail.unit = Some(ReferentialRef::labeled(0, label)),
            },
        }
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: PmfmDetail) -> Self {
        self.detail = detail;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    #[must_use]
    pub fn with_max_decimals(mut self, decimals: u32) -> Self {
        self.maximum_number_decimals = Some(decimals);
        self
    }

    #[must_use]
    pub fn with_signif_figures(mut self, count: u32) -> Self {
        self.signif_figures_number = Some(count);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_qualitative_values(mut self, values: Vec<ReferentialRef>) -> Self {
        self.qualitative_values = values;
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_multiple(mut self, is_multiple: bool) -> Self {
        self.is_multiple = is_multiple;
        self
    }

    /// Unit label, wherever the shape stores it.
    pub fn unit_label(&self) -> Option<&str> {
        match &self.detail {
            PmfmDetail::Minimal(detail) => detail.unit_label.as_deref(),
            PmfmDetail::Denormalized(detail) => detail.unit_label.as_deref(),
            PmfmDetail::Full(detail) => detail.unit.as_ref().and_then(|unit| unit.label.as_deref()),
        }
    }

    /// Primary display name: denormalized name, or the parameter's name.
    pub fn name(&self) -> Option<&str> {
        match &self.detail {
            PmfmDetail::Denormalized(detail) => Some(detail.name.as_str()),
            PmfmDetail::Full(detail) => detail
                .parameter
                .name
                .as_deref()
                .or(detail.name.as_deref()),
            PmfmDetail::Minimal(_) => None,
        }
    }

    pub fn complete_name(&self) -> Option<&str> {
        match &self.detail {
            PmfmDetail::Denormalized(detail) => detail.complete_name.as_deref(),
            _ => None,
        }
    }

    pub fn parameter(&self) -> Option<&Parameter> {
        match &self.detail {
            PmfmDetail::Full(detail) => Some(&detail.parameter),
            _ => None,
        }
    }

    pub fn parameter_label(&self) -> Option<&str> {
        self.parameter().and_then(|parameter| parameter.label.as_deref())
    }

    /// Allowed qualitative values: the descriptor's own list, falling back
    /// to the parent parameter's list on the full shape.
    pub fn qualitative_values(&self) -> &[ReferentialRef] {
        if !self.qualitative_values.is_empty() {
            return &self.qualitative_values;
        }
        match &self.detail {
            PmfmDetail::Full(detail) => &detail.parameter.qualitative_values,
            _ => &[],
        }
    }

    pub fn resolve_qualitative_value(&self, id: i32) -> Option<&ReferentialRef> {
        self.qualitative_values().iter().find(|qv| qv.id == id)
    }

    /// Method id: the denormalized field, or the full shape's method entry.
    pub fn method_id(&self) -> Option<i32> {
        self.method_id.or(match &self.detail {
            PmfmDetail::Full(detail) => detail.method.as_ref().map(|method| method.id),
            _ => None,
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.pmfm_type, PmfmType::Integer | PmfmType::Double)
    }

    pub fn is_alphanumeric(&self) -> bool {
        self.pmfm_type == PmfmType::String
    }

    pub fn is_date(&self) -> bool {
        self.pmfm_type == PmfmType::Date
    }

    pub fn is_qualitative(&self) -> bool {
        self.pmfm_type == PmfmType::QualitativeValue
    }

    /// Individual weight measurement (batches, products).
    pub fn is_weight(&self) -> bool {
        self.unit_label().is_some_and(is_weight_unit_label)
            || WEIGHT_LABEL_REGEX.is_match(&self.label)
            || self
                .parameter_label()
                .is_some_and(|label| WEIGHT_LABEL_REGEX.is_match(label))
    }

    /// Individual length measurement (batches, products).
    pub fn is_length(&self) -> bool {
        (self.unit_label().is_some_and(is_length_unit_label)
            && LENGTH_LABEL_REGEX.is_match(&self.label))
            || (self.unit_label().is_some_and(is_length_unit_label)
                && self
                    .parameter_label()
                    .is_some_and(|label| LENGTH_LABEL_REGEX.is_match(label)))
    }

    /// Dressing (presentation) measurement, by id or label.
    pub fn is_dressing(&self) -> bool {
        self.id == pmfm_ids::DRESSING
            || DRESSING_LABEL_REGEX.is_match(&self.label)
            || self
                .parameter_label()
                .is_some_and(|label| DRESSING_LABEL_REGEX.is_match(label))
    }

    pub fn is_selectivity_device(&self) -> bool {
        SELECTIVITY_DEVICE_LABEL_REGEX.is_match(&self.label)
            || self
                .parameter_label()
                .is_some_and(|label| SELECTIVITY_DEVICE_LABEL_REGEX.is_match(label))
    }

    pub fn is_tag_id(&self) -> bool {
        self.id == pmfm_ids::TAG_ID
    }

    /// Calculated (not directly observed) measurement.
    pub fn is_computed(&self) -> bool {
        self.method_id()
            .is_some_and(|id| CALCULATED_METHOD_IDS.contains(&id))
    }

    /// Refine the declared type with label/unit heuristics.
    pub fn extended_type(&self) -> ExtendedPmfmType {
        match self.pmfm_type {
            PmfmType::Double => {
                if LATITUDE_LABEL_REGEX.is_match(&self.label) {
                    ExtendedPmfmType::Latitude
                } else if LONGITUDE_LABEL_REGEX.is_match(&self.label) {
                    ExtendedPmfmType::Longitude
                } else if self.unit_label().is_some_and(|label| {
                    label == UNIT_DECIMAL_HOURS || DECIMAL_HOURS_UNIT_REGEX.is_match(label)
                }) {
                    ExtendedPmfmType::Duration
                } else {
                    ExtendedPmfmType::Double
                }
            }
            PmfmType::Date => {
                if self.unit_label().is_some_and(|label| {
                    label == UNIT_DATE_TIME || DATE_TIME_UNIT_REGEX.is_match(label)
                }) {
                    ExtendedPmfmType::DateTime
                } else {
                    ExtendedPmfmType::Date
                }
            }
            other => other.into(),
        }
    }
}

/// Selection options for [`filter_pmfms`] and [`first_qualitative_pmfm`].
#[derive(Debug, Clone, Default)]
pub struct PmfmFilter {
    pub exclude_hidden: bool,
    pub exclude_pmfm_ids: Vec<i32>,
}

pub fn filter_pmfms<'a>(pmfms: &'a [Pmfm], filter: &PmfmFilter) -> Vec<&'a Pmfm> {
    pmfms
        .iter()
        .filter(|pmfm| !filter.exclude_hidden || !pmfm.hidden)
        .filter(|pmfm| !filter.exclude_pmfm_ids.contains(&pmfm.id))
        .collect()
}

/// First qualitative descriptor with a qualitative-value count within bounds.
pub fn first_qualitative_pmfm<'a>(
    pmfms: &'a [Pmfm],
    filter: &PmfmFilter,
    min_qv_count: usize,
    max_qv_count: Option<usize>,
) -> Option<&'a Pmfm> {
    filter_pmfms(pmfms, filter).into_iter().find(|pmfm| {
        pmfm.is_qualitative()
            && pmfm.qualitative_values().len() >= min_qv_count
            && max_qv_count.is_none_or(|max| pmfm.qualitative_values().len() <= max)
    })
}
