//! Typed measurement values and their wire codec.
//!
//! Measurement values travel as strings on the wire. Decoding goes through
//! the owning [`Pmfm`] descriptor's type; encoding reverses it. Absent,
//! blank, non-finite or unresolvable inputs decode to `None`, never to an
//! error: a measurement row with a bad cell must not sink the whole record.
//!
//! Numbers carry their display-conversion state explicitly in
//! [`ConvertedNumber`], so applying a coefficient twice is impossible by
//! construction.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::math_utils;
use crate::pmfm::{Pmfm, PmfmType};
use crate::referential::{DisplayProperty, ReferentialRef};
use crate::units::LengthUnit;

/// Separator between encodings of a multi-valued measurement.
pub const PMFM_VALUE_SEPARATOR: char = '|';

/// HTML entities rendered for boolean values.
const HTML_CHECK_MARK: &str = "&#x2714;";
const HTML_CROSS_MARK: &str = "&#x2718;";

/// A numeric value together with the display coefficient already applied
/// to it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedNumber {
    pub value: f64,
    pub applied_coefficient: Option<f64>,
}

impl ConvertedNumber {
    /// A number in wire (storage) units.
    pub fn plain(value: f64) -> Self {
        Self {
            value,
            applied_coefficient: None,
        }
    }

    /// A number already rescaled by `coefficient`.
    pub fn converted(value: f64, coefficient: f64) -> Self {
        Self {
            value,
            applied_coefficient: Some(coefficient),
        }
    }

    pub fn is_converted(&self) -> bool {
        self.applied_coefficient.is_some()
    }
}

impl From<f64> for ConvertedNumber {
    fn from(value: f64) -> Self {
        Self::plain(value)
    }
}

/// A single decoded measurement value.
#[derive(Debug, Clone, PartialEq)]
pub enum PmfmValue {
    Number(ConvertedNumber),
    Text(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    Qualitative(ReferentialRef),
}

impl PmfmValue {
    pub fn number(value: f64) -> Self {
        PmfmValue::Number(ConvertedNumber::plain(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        PmfmValue::Text(value.into())
    }

    pub fn qualitative(id: i32) -> Self {
        PmfmValue::Qualitative(ReferentialRef::new(id))
    }
}

/// A decoded form value: one slot, or a list of slots for multi-valued
/// measurements. Each slot may be empty.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Scalar(Option<PmfmValue>),
    List(Vec<Option<PmfmValue>>),
}

impl FormValue {
    pub fn empty() -> Self {
        FormValue::Scalar(None)
    }

    pub fn scalar(value: PmfmValue) -> Self {
        FormValue::Scalar(Some(value))
    }

    /// True when no slot holds a value.
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Scalar(slot) => slot.is_none(),
            FormValue::List(slots) => slots.iter().all(Option::is_none),
        }
    }
}

/// Options for [`from_model_value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FromModelOptions {
    /// Decode the raw string as a single value even when the descriptor is
    /// multi-valued or the input contains separators.
    pub do_not_split_value: bool,
}

/// Options for [`to_model_value`].
#[derive(Debug, Clone, Copy)]
pub struct ToModelOptions {
    /// Undo the descriptor's display conversion before encoding.
    pub apply_conversion: bool,
}

impl Default for ToModelOptions {
    fn default() -> Self {
        Self {
            apply_conversion: true,
        }
    }
}

/// Options for [`value_to_string`].
#[derive(Debug, Clone, Default)]
pub struct ValueToStringOptions {
    /// Properties rendered for qualitative values, joined with `" - "`.
    pub property_names: Option<Vec<DisplayProperty>>,
    /// Join multi-value renderings with an HTML line break.
    pub html: bool,
    /// Render nothing when the value equals the descriptor's default.
    pub hide_if_default_value: bool,
    /// Prefix the rendered value with the descriptor name for these ids.
    pub show_name_for_pmfm_ids: Vec<i32>,
}

/// Rescale a number by `coefficient`, exactly once.
///
/// A number already carrying this coefficient is returned unchanged. With
/// `mark_as_converted` false the result is produced in wire state, usable
/// as an intermediate without tagging.
pub fn apply_conversion(
    number: ConvertedNumber,
    coefficient: f64,
    mark_as_converted: bool,
) -> ConvertedNumber {
    if number.applied_coefficient == Some(coefficient) {
        return number;
    }
    let value = math_utils::multiply(number.value, coefficient);
    debug!(
        from = number.value,
        to = value,
        coefficient,
        "applied unit conversion"
    );
    if mark_as_converted {
        ConvertedNumber::converted(value, coefficient)
    } else {
        ConvertedNumber::plain(value)
    }
}

/// Convert a length between units, rounding to `precision`
/// (default `1e-6`) with round-half-up semantics.
pub fn convert_length_value(
    value: f64,
    from_unit: LengthUnit,
    to_unit: LengthUnit,
    precision: Option<f64>,
) -> f64 {
    let coefficient = if from_unit == to_unit {
        1.0
    } else {
        from_unit.meter_factor() / to_unit.meter_factor()
    };
    let precision = precision.unwrap_or(1e-6);
    math_utils::round_to_precision(value * coefficient, precision)
}

/// Decode a wire string into a form value through the descriptor's type.
///
/// Substitutes the descriptor's default when the input is absent. Splits
/// on [`PMFM_VALUE_SEPARATOR`] when the descriptor is multi-valued or the
/// input contains a separator, unless `do_not_split_value` is set.
pub fn from_model_value(value: Option<&str>, pmfm: &Pmfm, opts: &FromModelOptions) -> FormValue {
    let value = match value {
        Some(v) => Some(v),
        None => pmfm.default_value.as_deref(),
    };
    let Some(value) = value else {
        return FormValue::empty();
    };

    if !opts.do_not_split_value
        && (pmfm.is_multiple || value.contains(PMFM_VALUE_SEPARATOR))
    {
        let slots = value
            .split(PMFM_VALUE_SEPARATOR)
            .map(|part| decode_scalar(part, pmfm))
            .collect();
        return FormValue::List(slots);
    }
    FormValue::Scalar(decode_scalar(value, pmfm))
}

fn decode_scalar(value: &str, pmfm: &Pmfm) -> Option<PmfmValue> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    match pmfm.pmfm_type {
        PmfmType::Double => {
            let parsed = f64::from_str(trimmed).ok().filter(|v| v.is_finite())?;
            let number = match &pmfm.display_conversion {
                Some(conversion) => apply_conversion(
                    ConvertedNumber::plain(parsed),
                    conversion.conversion_coefficient,
                    true,
                ),
                None => ConvertedNumber::plain(parsed),
            };
            Some(PmfmValue::Number(number))
        }
        PmfmType::Integer => {
            // Under a display conversion a stored decimal may scale to an
            // integer, so parse as float first; otherwise integer parsing
            // truncates at the first non-digit.
            match &pmfm.display_conversion {
                Some(conversion) => {
                    let parsed = f64::from_str(trimmed).ok().filter(|v| v.is_finite())?;
                    Some(PmfmValue::Number(apply_conversion(
                        ConvertedNumber::plain(parsed),
                        conversion.conversion_coefficient,
                        true,
                    )))
                }
                None => parse_leading_integer(trimmed)
                    .map(|v| PmfmValue::Number(ConvertedNumber::plain(v as f64))),
            }
        }
        PmfmType::String => Some(PmfmValue::Text(trimmed.to_string())),
        PmfmType::Boolean => match trimmed {
            "true" | "1" => Some(PmfmValue::Boolean(true)),
            "false" | "0" => Some(PmfmValue::Boolean(false)),
            _ => None,
        },
        PmfmType::Date => DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|date| PmfmValue::Date(date.with_timezone(&Utc))),
        PmfmType::QualitativeValue => {
            let id = i32::from_str(trimmed).ok()?;
            pmfm.resolve_qualitative_value(id)
                .cloned()
                .map(PmfmValue::Qualitative)
        }
    }
}

/// Leading-digits integer parse: `"12abc"` parses to `12`, `"abc"` to none.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let rest = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = rest.split(|c: char| !c.is_ascii_digit()).next()?;
    if digits.is_empty() {
        return None;
    }
    let signed = if text.starts_with('-') {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    i64::from_str(&signed).ok()
}

/// Encode a form value back to its wire string.
///
/// Multi-valued forms join slot encodings with [`PMFM_VALUE_SEPARATOR`];
/// an all-empty form encodes to `None`.
pub fn to_model_value(value: &FormValue, pmfm: &Pmfm, opts: &ToModelOptions) -> Option<String> {
    match value {
        FormValue::Scalar(slot) => scalar_to_model_value(slot.as_ref(), pmfm, opts),
        FormValue::List(slots) => {
            if value.is_empty() {
                return None;
            }
            let encoded: Vec<String> = slots
                .iter()
                .map(|slot| scalar_to_model_value(slot.as_ref(), pmfm, opts).unwrap_or_default())
                .collect();
            Some(encoded.join(&PMFM_VALUE_SEPARATOR.to_string()))
        }
    }
}

/// Encode one slot. Numbers carrying a display coefficient are scaled back
/// to wire units first (unless `apply_conversion` is off).
pub fn scalar_to_model_value(
    value: Option<&PmfmValue>,
    pmfm: &Pmfm,
    opts: &ToModelOptions,
) -> Option<String> {
    let value = value?;
    match value {
        PmfmValue::Number(number) => {
            if !number.value.is_finite() {
                return None;
            }
            let wire = match (&pmfm.display_conversion, number.applied_coefficient) {
                (Some(conversion), Some(_)) if opts.apply_conversion => apply_conversion(
                    *number,
                    1.0 / conversion.conversion_coefficient,
                    false,
                ),
                _ => *number,
            };
            Some(math_utils::format_decimal(wire.value))
        }
        PmfmValue::Text(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(text.clone())
            }
        }
        PmfmValue::Boolean(flag) => Some(flag.to_string()),
        PmfmValue::Date(date) => Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        PmfmValue::Qualitative(entry) => Some(entry.id.to_string()),
    }
}

/// Encode a scalar slot to a number, for numeric comparison.
///
/// Only descriptors of numeric, boolean or qualitative type have a
/// numeric encoding: booleans map to `1.0`/`0.0`, qualitative values to
/// their id. String and date descriptors map to `None`.
pub fn to_model_value_as_number(
    value: Option<&PmfmValue>,
    pmfm: &Pmfm,
    opts: &ToModelOptions,
) -> Option<f64> {
    match pmfm.pmfm_type {
        PmfmType::Boolean => match value? {
            PmfmValue::Boolean(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            _ => None,
        },
        PmfmType::Integer | PmfmType::Double | PmfmType::QualitativeValue => {
            scalar_to_model_value(value, pmfm, opts).and_then(|text| f64::from_str(&text).ok())
        }
        PmfmType::String | PmfmType::Date => None,
    }
}

/// Render a form value for display.
pub fn value_to_string(
    value: &FormValue,
    pmfm: &Pmfm,
    opts: &ValueToStringOptions,
) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    if opts.hide_if_default_value {
        if let (FormValue::Scalar(Some(slot)), Some(default)) = (value, pmfm.default_value.as_deref())
        {
            let decoded_default = decode_scalar(default, pmfm);
            if equals(Some(slot), decoded_default.as_ref()) {
                return None;
            }
        }
    }
    let separator = if opts.html { "<br/>" } else { ", " };
    let rendered = match value {
        FormValue::Scalar(slot) => scalar_to_string(slot.as_ref(), pmfm, opts)?,
        FormValue::List(slots) => {
            let parts: Vec<String> = slots
                .iter()
                .filter_map(|slot| scalar_to_string(slot.as_ref(), pmfm, opts))
                .collect();
            if parts.is_empty() {
                return None;
            }
            parts.join(separator)
        }
    };
    if opts.show_name_for_pmfm_ids.contains(&pmfm.id) {
        let mut prefixed = String::new();
        if let Some(name) = pmfm.name() {
            let _ = write!(prefixed, "{name}: ");
        }
        prefixed.push_str(&rendered);
        Some(prefixed)
    } else {
        Some(rendered)
    }
}

fn scalar_to_string(
    value: Option<&PmfmValue>,
    _pmfm: &Pmfm,
    opts: &ValueToStringOptions,
) -> Option<String> {
    match value? {
        PmfmValue::Number(number) => Some(math_utils::format_decimal(number.value)),
        PmfmValue::Text(text) => Some(text.clone()),
        PmfmValue::Boolean(flag) => {
            // Booleans always render as the check/cross entities
            Some(if *flag { HTML_CHECK_MARK } else { HTML_CROSS_MARK }.to_string())
        }
        PmfmValue::Date(date) => Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        PmfmValue::Qualitative(entry) => {
            let properties = opts
                .property_names
                .clone()
                .unwrap_or_else(|| vec![DisplayProperty::Name]);
            entry
                .join_properties(&properties)
                .or_else(|| entry.display_text().map(str::to_string))
        }
    }
}

/// Loose value equality, tolerant of representation differences.
///
/// Two empty slots are equal. Numbers compare by value (ignoring the
/// conversion tag), qualitative values by id, dates by instant, a
/// numeric text compares equal to the number it parses to, and booleans
/// compare equal to `1`/`0`.
pub fn equals(a: Option<&PmfmValue>, b: Option<&PmfmValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a, b) {
            (PmfmValue::Number(x), PmfmValue::Number(y)) => x.value == y.value,
            (PmfmValue::Text(x), PmfmValue::Text(y)) => x == y,
            (PmfmValue::Boolean(x), PmfmValue::Boolean(y)) => x == y,
            (PmfmValue::Date(x), PmfmValue::Date(y)) => x == y,
            (PmfmValue::Qualitative(x), PmfmValue::Qualitative(y)) => x.id == y.id,
            (PmfmValue::Number(x), PmfmValue::Text(y))
            | (PmfmValue::Text(y), PmfmValue::Number(x)) => {
                f64::from_str(y.trim()).is_ok_and(|parsed| parsed == x.value)
            }
            (PmfmValue::Qualitative(x), PmfmValue::Number(y))
            | (PmfmValue::Number(y), PmfmValue::Qualitative(x)) => {
                y.value == f64::from(x.id)
            }
            (PmfmValue::Qualitative(x), PmfmValue::Text(y))
            | (PmfmValue::Text(y), PmfmValue::Qualitative(x)) => {
                i32::from_str(y.trim()).is_ok_and(|parsed| parsed == x.id)
            }
            (PmfmValue::Boolean(x), PmfmValue::Number(y))
            | (PmfmValue::Number(y), PmfmValue::Boolean(x)) => {
                y.value == if *x { 1.0 } else { 0.0 }
            }
            _ => false,
        },
        _ => false,
    }
}

/// True when the slot is absent or holds a blank text.
pub fn is_empty(value: Option<&PmfmValue>) -> bool {
    match value {
        None => true,
        Some(PmfmValue::Text(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

pub fn is_not_empty(value: Option<&PmfmValue>) -> bool {
    !is_empty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmfm::PmfmType;
    use crate::units::UnitConversion;

    fn double_pmfm() -> Pmfm {
        Pmfm::minimal(1, "BATCH_TOTAL_WEIGHT", PmfmType::Double).with_unit_label("kg")
    }

    #[test]
    fn decode_substitutes_default_then_none() {
        let pmfm = double_pmfm().with_default_value("12.5");
        let decoded = from_model_value(None, &pmfm, &FromModelOptions::default());
        assert_eq!(decoded, FormValue::scalar(PmfmValue::number(12.5)));

        let bare = double_pmfm();
        assert!(from_model_value(None, &bare, &FromModelOptions::default()).is_empty());
    }

    #[test]
    fn decode_degrades_bad_cells_to_empty() {
        let pmfm = double_pmfm();
        for raw in ["", "   ", "null", "NULL", "NaN", "abc"] {
            let decoded = from_model_value(Some(raw), &pmfm, &FromModelOptions::default());
            assert!(decoded.is_empty(), "{raw:?} must decode to empty");
        }
    }

    #[test]
    fn integer_decode_truncates_without_conversion() {
        let pmfm = Pmfm::minimal(2, "INDIVIDUAL_COUNT", PmfmType::Integer);
        let decoded = from_model_value(Some("12.9"), &pmfm, &FromModelOptions::default());
        assert_eq!(decoded, FormValue::scalar(PmfmValue::number(12.0)));
        let text = from_model_value(Some("7fish"), &pmfm, &FromModelOptions::default());
        assert_eq!(text, FormValue::scalar(PmfmValue::number(7.0)));
    }

    #[test]
    fn integer_decode_scales_through_conversion() {
        let mut pmfm = Pmfm::minimal(3, "SAMPLE_WEIGHT", PmfmType::Integer).with_unit_label("g");
        pmfm.display_conversion = Some(UnitConversion::between("kg", "g", 1000.0));
        let decoded = from_model_value(Some("0.25"), &pmfm, &FromModelOptions::default());
        assert_eq!(
            decoded,
            FormValue::scalar(PmfmValue::Number(ConvertedNumber::converted(250.0, 1000.0)))
        );
    }

    #[test]
    fn boolean_decode_accepts_numeric_forms() {
        let pmfm = Pmfm::minimal(4, "IS_DEAD", PmfmType::Boolean);
        for (raw, expected) in [("true", true), ("1", true), ("false", false), ("0", false)] {
            let decoded = from_model_value(Some(raw), &pmfm, &FromModelOptions::default());
            assert_eq!(decoded, FormValue::scalar(PmfmValue::Boolean(expected)));
        }
        assert!(from_model_value(Some("yes"), &pmfm, &FromModelOptions::default()).is_empty());
    }

    #[test]
    fn qualitative_decode_resolves_known_ids_only() {
        let pmfm = Pmfm::minimal(5, "SEX", PmfmType::QualitativeValue).with_qualitative_values(
            vec![ReferentialRef::labeled(1, "M"), ReferentialRef::labeled(2, "F")],
        );
        let decoded = from_model_value(Some("2"), &pmfm, &FromModelOptions::default());
        match decoded {
            FormValue::Scalar(Some(PmfmValue::Qualitative(entry))) => {
                assert_eq!(entry.label.as_deref(), Some("F"));
            }
            other => panic!("unexpected decode: {other:?}"),
        }
        assert!(from_model_value(Some("99"), &pmfm, &FromModelOptions::default()).is_empty());
    }

    #[test]
    fn multi_value_round_trip() {
        let pmfm = Pmfm::minimal(6, "GEAR_FEATURE", PmfmType::QualitativeValue)
            .with_multiple(true)
            .with_qualitative_values(
                (1..=5).map(|id| ReferentialRef::labeled(id, id.to_string())).collect(),
            );
        let decoded = from_model_value(Some("1|3|5"), &pmfm, &FromModelOptions::default());
        let FormValue::List(slots) = &decoded else {
            panic!("expected list");
        };
        assert_eq!(slots.len(), 3);
        let encoded = to_model_value(&decoded, &pmfm, &ToModelOptions::default());
        assert_eq!(encoded.as_deref(), Some("1|3|5"));
    }

    #[test]
    fn do_not_split_keeps_raw_scalar() {
        let pmfm = Pmfm::minimal(7, "COMMENT", PmfmType::String);
        let opts = FromModelOptions {
            do_not_split_value: true,
        };
        let decoded = from_model_value(Some("a|b"), &pmfm, &opts);
        assert_eq!(decoded, FormValue::scalar(PmfmValue::text("a|b")));
    }

    #[test]
    fn conversion_is_idempotent() {
        let once = apply_conversion(ConvertedNumber::plain(2.3), 100.0, true);
        assert_eq!(once.value, 230.0);
        let twice = apply_conversion(once, 100.0, true);
        assert_eq!(twice, once);
    }

    #[test]
    fn encode_undoes_display_conversion() {
        let mut pmfm = double_pmfm();
        pmfm.display_conversion = Some(UnitConversion::between("kg", "g", 1000.0));
        let decoded = from_model_value(Some("0.25"), &pmfm, &FromModelOptions::default());
        let encoded = to_model_value(&decoded, &pmfm, &ToModelOptions::default());
        assert_eq!(encoded.as_deref(), Some("0.25"));
    }

    #[test]
    fn length_conversion_uses_meter_pivot() {
        assert_eq!(
            convert_length_value(150.0, LengthUnit::Mm, LengthUnit::Cm, None),
            15.0
        );
        assert_eq!(
            convert_length_value(1.0, LengthUnit::M, LengthUnit::M, None),
            1.0
        );
        assert_eq!(
            convert_length_value(12.345, LengthUnit::Cm, LengthUnit::Mm, Some(0.1)),
            123.5
        );
    }

    #[test]
    fn loose_equality() {
        assert!(equals(None, None));
        assert!(equals(
            Some(&PmfmValue::number(1.0)),
            Some(&PmfmValue::text("1.0"))
        ));
        assert!(equals(
            Some(&PmfmValue::qualitative(5)),
            Some(&PmfmValue::number(5.0))
        ));
        assert!(!equals(Some(&PmfmValue::number(1.0)), None));
    }

    #[test]
    fn loose_equality_coerces_booleans_to_numbers() {
        assert!(equals(
            Some(&PmfmValue::Boolean(true)),
            Some(&PmfmValue::number(1.0))
        ));
        assert!(equals(
            Some(&PmfmValue::number(0.0)),
            Some(&PmfmValue::Boolean(false))
        ));
        assert!(!equals(
            Some(&PmfmValue::Boolean(true)),
            Some(&PmfmValue::number(0.0))
        ));
    }

    #[test]
    fn boolean_renders_check_and_cross_entities() {
        let pmfm = Pmfm::minimal(8, "IS_DEAD", PmfmType::Boolean);
        // Entities render regardless of the html flag
        let rendered = value_to_string(
            &FormValue::scalar(PmfmValue::Boolean(true)),
            &pmfm,
            &ValueToStringOptions::default(),
        );
        assert_eq!(rendered.as_deref(), Some("&#x2714;"));
        let rendered = value_to_string(
            &FormValue::scalar(PmfmValue::Boolean(false)),
            &pmfm,
            &ValueToStringOptions {
                html: true,
                ..Default::default()
            },
        );
        assert_eq!(rendered.as_deref(), Some("&#x2718;"));
    }

    #[test]
    fn to_number_maps_booleans() {
        let pmfm = Pmfm::minimal(9, "IS_DEAD", PmfmType::Boolean);
        let opts = ToModelOptions::default();
        assert_eq!(
            to_model_value_as_number(Some(&PmfmValue::Boolean(true)), &pmfm, &opts),
            Some(1.0)
        );
        assert_eq!(
            to_model_value_as_number(Some(&PmfmValue::Boolean(false)), &pmfm, &opts),
            Some(0.0)
        );
    }

    #[test]
    fn to_number_is_none_for_string_and_date_types() {
        let opts = ToModelOptions::default();
        let text_pmfm = Pmfm::minimal(10, "TAG_ID", PmfmType::String);
        assert_eq!(
            to_model_value_as_number(Some(&PmfmValue::text("12")), &text_pmfm, &opts),
            None
        );
        let date_pmfm = Pmfm::minimal(11, "CAPTURE_AT", PmfmType::Date);
        let date = DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z")
            .expect("date")
            .with_timezone(&Utc);
        assert_eq!(
            to_model_value_as_number(Some(&PmfmValue::Date(date)), &date_pmfm, &opts),
            None
        );
    }
}
