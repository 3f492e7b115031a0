//! Display-unit conversion of descriptors.
//!
//! A deployment can display weights in a unit other than the stored one.
//! [`set_weight_unit_conversion`] attaches the matching coefficient to a
//! weight descriptor, and [`apply_conversion`] rescales the descriptor's
//! numeric facets and rewrites its display name accordingly. All functions
//! return new descriptors; inputs are never mutated.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::math_utils;
use crate::pmfm::{Pmfm, PmfmDetail, PmfmType};
use crate::units::{UnitConversion, WeightUnit};
use crate::value::{ConvertedNumber, apply_conversion as apply_value_conversion};

/// Matches a name ending with a weight unit suffix, e.g.
/// `Total weight (kg)` or `Total weight (g) - other details`.
static NAME_WITH_WEIGHT_UNIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.* )\((t|kg|g|mg)\)( - .*)?$").expect("invalid weight unit name regex")
});

/// Attach a display conversion so a weight descriptor renders in
/// `expected_unit`.
///
/// Non-weight descriptors and descriptors already in the expected unit are
/// returned unchanged. The coefficient maps stored values to displayed
/// ones: stored unit's kg factor over the expected unit's.
pub fn set_weight_unit_conversion(pmfm: &Pmfm, expected_unit: WeightUnit) -> Pmfm {
    if !pmfm.is_weight() {
        return pmfm.clone();
    }
    let Some(actual_unit) = pmfm
        .unit_label()
        .and_then(|label| WeightUnit::from_str(label).ok())
    else {
        return pmfm.clone();
    };
    if actual_unit == expected_unit {
        return pmfm.clone();
    }
    let coefficient = actual_unit.kg_factor() / expected_unit.kg_factor();
    let conversion =
        UnitConversion::between(actual_unit.as_str(), expected_unit.as_str(), coefficient);
    debug!(
        pmfm_id = pmfm.id,
        from = %actual_unit,
        to = %expected_unit,
        coefficient,
        "attaching weight unit conversion"
    );
    apply_conversion(pmfm, &conversion)
}

/// Apply [`set_weight_unit_conversion`] across a descriptor slice.
pub fn set_weight_unit_conversions(pmfms: &[Pmfm], expected_unit: WeightUnit) -> Vec<Pmfm> {
    pmfms
        .iter()
        .map(|pmfm| set_weight_unit_conversion(pmfm, expected_unit))
        .collect()
}

/// Rescale a descriptor's numeric facets by the given conversion and
/// rewrite its display name/unit.
///
/// The maximum decimal count shrinks by `log10(coefficient)` (clamped at
/// zero), and a double whose decimal count reaches zero demotes to an
/// integer.
pub fn apply_conversion(pmfm: &Pmfm, conversion: &UnitConversion) -> Pmfm {
    let coefficient = conversion.conversion_coefficient;
    let mut converted = pmfm.clone();
    converted.display_conversion = Some(conversion.clone());

    if let Some(to_unit) = conversion.to_unit.as_deref() {
        rewrite_unit(&mut converted, to_unit);
    }

    if let Some(decimals) = pmfm.maximum_number_decimals {
        let shift = coefficient.log10().round() as i64;
        let rescaled = (i64::from(decimals) - shift).max(0) as u32;
        converted.maximum_number_decimals = Some(rescaled);
        if rescaled == 0 && converted.pmfm_type == PmfmType::Double {
            converted.pmfm_type = PmfmType::Integer;
        }
    }

    // Only a declared precision rescales; none is ever synthesized here.
    converted.precision = pmfm.precision.map(|p| math_utils::multiply(p, coefficient));
    converted.min_value = pmfm.min_value.map(|v| math_utils::multiply(v, coefficient));
    converted.max_value = pmfm.max_value.map(|v| math_utils::multiply(v, coefficient));
    converted.default_value = pmfm.default_value.as_deref().map(|raw| {
        match f64::from_str(raw) {
            Ok(parsed) if parsed.is_finite() => {
                let scaled =
                    apply_value_conversion(ConvertedNumber::plain(parsed), coefficient, false);
                math_utils::format_decimal(scaled.value)
            }
            _ => raw.to_string(),
        }
    });
    converted
}

/// Rewrite the unit label and any `(unit)` suffix in display names.
fn rewrite_unit(pmfm: &mut Pmfm, to_unit: &str) {
    match &mut pmfm.detail {
        PmfmDetail::Minimal(detail) => detail.unit_label = Some(to_unit.to_string()),
        PmfmDetail::Denormalized(detail) => {
            detail.unit_label = Some(to_unit.to_string());
            detail.name = rewrite_name_unit(&detail.name, to_unit);
            detail.complete_name = detail
                .complete_name
                .as_deref()
                .map(|name| rewrite_name_unit(name, to_unit));
        }
        PmfmDetail::Full(detail) => {
            if let Some(unit) = &mut detail.unit {
                unit.label = Some(to_unit.to_string());
            }
            if let Some(name) = &detail.name {
                detail.name = Some(rewrite_name_unit(name, to_unit));
            }
        }
    }
}

fn rewrite_name_unit(name: &str, to_unit: &str) -> String {
    match NAME_WITH_WEIGHT_UNIT_REGEX.captures(name) {
        Some(captures) => {
            let prefix = captures.get(1).map_or("", |m| m.as_str());
            let details = captures.get(3).map_or("", |m| m.as_str());
            format!("{prefix}({to_unit}){details}")
        }
        None => name.to_string(),
    }
}

/// Effective precision step of a descriptor.
///
/// A positive declared precision wins; otherwise `10^-decimals` from the
/// maximum decimal count; otherwise the supplied default.
pub fn get_or_compute_precision(pmfm: &Pmfm, default_precision: Option<f64>) -> Option<f64> {
    if let Some(precision) = pmfm.precision {
        if precision > 0.0 {
            return Some(precision);
        }
    }
    if let Some(decimals) = pmfm.maximum_number_decimals {
        return Some(10f64.powi(-(decimals as i32)));
    }
    default_precision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmfm::{DenormalizedDetail, PmfmType};

    fn weight_pmfm() -> Pmfm {
        Pmfm::minimal(1, "BATCH_TOTAL_WEIGHT", PmfmType::Double)
            .with_detail(PmfmDetail::Denormalized(DenormalizedDetail {
                name: "Total weight (kg)".to_string(),
                complete_name: Some("Total weight (kg) - Whole - Weighing".to_string()),
                unit_label: Some("kg".to_string()),
            }))
            .with_bounds(Some(0.001), Some(100.0))
            .with_max_decimals(3)
    }

    #[test]
    fn kg_to_g_rescales_facets_and_name() {
        let converted = set_weight_unit_conversion(&weight_pmfm(), WeightUnit::G);
        let conversion = converted.display_conversion.clone().expect("conversion set");
        assert_eq!(conversion.conversion_coefficient, 1000.0);
        assert_eq!(converted.unit_label(), Some("g"));
        assert_eq!(converted.name(), Some("Total weight (g)"));
        assert_eq!(
            converted.complete_name(),
            Some("Total weight (g) - Whole - Weighing")
        );
        assert_eq!(converted.min_value, Some(1.0));
        assert_eq!(converted.max_value, Some(100_000.0));
        assert_eq!(converted.maximum_number_decimals, Some(0));
    }

    #[test]
    fn precision_rescales_only_when_declared() {
        let undeclared = set_weight_unit_conversion(&weight_pmfm(), WeightUnit::G);
        assert_eq!(undeclared.precision, None);

        // A declared 0.001 kg step becomes a 1 g step
        let declared =
            set_weight_unit_conversion(&weight_pmfm().with_precision(0.001), WeightUnit::G);
        assert_eq!(declared.precision, Some(1.0));
    }

    #[test]
    fn zero_decimals_demotes_double_to_integer() {
        let converted = set_weight_unit_conversion(&weight_pmfm(), WeightUnit::G);
        assert_eq!(converted.pmfm_type, PmfmType::Integer);
    }

    #[test]
    fn same_unit_and_non_weight_are_untouched() {
        let pmfm = weight_pmfm();
        let same = set_weight_unit_conversion(&pmfm, WeightUnit::Kg);
        assert_eq!(same, pmfm);

        let length = Pmfm::minimal(2, "LENGTH_TOTAL", PmfmType::Double).with_unit_label("cm");
        assert_eq!(set_weight_unit_conversion(&length, WeightUnit::G), length);
    }

    #[test]
    fn default_value_rescales_in_wire_form() {
        let pmfm = weight_pmfm().with_default_value("0.5");
        let converted = set_weight_unit_conversion(&pmfm, WeightUnit::G);
        assert_eq!(converted.default_value.as_deref(), Some("500"));
    }

    #[test]
    fn downscale_grows_decimal_count() {
        let pmfm = weight_pmfm().with_unit_label("g").with_max_decimals(1);
        let converted = set_weight_unit_conversion(&pmfm, WeightUnit::Kg);
        // g to kg divides by 1000, so one decimal becomes four
        assert_eq!(converted.maximum_number_decimals, Some(4));
        assert_eq!(converted.pmfm_type, PmfmType::Double);
    }

    #[test]
    fn reversed_conversion_restores_facets() {
        let pmfm = weight_pmfm();
        let converted = set_weight_unit_conversion(&pmfm, WeightUnit::G);
        let conversion = converted.display_conversion.clone().expect("conversion");
        let restored = apply_conversion(&converted, &conversion.reversed());
        assert_eq!(restored.unit_label(), Some("kg"));
        assert_eq!(restored.maximum_number_decimals, pmfm.maximum_number_decimals);
        let min = restored.min_value.expect("min");
        assert!((min - 0.001).abs() < 1e-9);
        assert_eq!(restored.max_value, Some(100.0));
        assert_eq!(restored.precision, pmfm.precision);
    }

    #[test]
    fn precision_prefers_declared_step() {
        let pmfm = weight_pmfm().with_precision(0.5);
        assert_eq!(get_or_compute_precision(&pmfm, None), Some(0.5));
        assert_eq!(get_or_compute_precision(&weight_pmfm(), None), Some(0.001));
        let bare = Pmfm::minimal(3, "X", PmfmType::Double);
        assert_eq!(get_or_compute_precision(&bare, Some(0.1)), Some(0.1));
    }
}
