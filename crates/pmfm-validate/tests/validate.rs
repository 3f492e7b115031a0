//! Validator behavior against realistic descriptors.

use pmfm_model::ReferentialRef;
use pmfm_model::conversion::set_weight_unit_conversion;
use pmfm_model::pmfm::{Pmfm, PmfmType};
use pmfm_model::units::WeightUnit;
use pmfm_validate::{CreateOptions, PmfmValidator, RuleViolation};

fn validator(pmfm: &Pmfm) -> PmfmValidator {
    PmfmValidator::create(pmfm, &CreateOptions::default()).expect("rules derived")
}

#[test]
fn weight_descriptor_end_to_end() {
    let pmfm = Pmfm::minimal(60, "SAMPLE_WEIGHT", PmfmType::Double)
        .with_unit_label("kg")
        .with_required(true)
        .with_bounds(Some(0.0), Some(500.0))
        .with_max_decimals(3);
    let validator = validator(&pmfm);

    assert!(validator.is_valid("12.345"));
    assert!(validator.is_valid("0"));
    assert_eq!(validator.validate(""), vec![RuleViolation::Required]);
    assert_eq!(
        validator.validate("12.3456"),
        vec![RuleViolation::MaxDecimals { max: 3 }]
    );
    assert_eq!(
        validator.validate("501"),
        vec![RuleViolation::Max {
            max: 500.0,
            actual: 501.0
        }]
    );
}

#[test]
fn rules_follow_the_converted_descriptor() {
    let pmfm = Pmfm::minimal(61, "BATCH_TOTAL_WEIGHT", PmfmType::Double)
        .with_unit_label("kg")
        .with_bounds(Some(0.001), Some(100.0))
        .with_max_decimals(3);
    let displayed_in_g = set_weight_unit_conversion(&pmfm, WeightUnit::G);
    let validator = validator(&displayed_in_g);

    // In grams the descriptor demoted to integer with bounds [1, 100000]
    assert!(validator.is_valid("1"));
    assert_eq!(validator.validate("0.5"), vec![
        RuleViolation::Min {
            min: 1.0,
            actual: 0.5
        },
        RuleViolation::Integer,
    ]);
}

#[test]
fn multiple_violations_report_in_rule_order() {
    let pmfm = Pmfm::minimal(62, "COUNT", PmfmType::Integer)
        .with_required(true)
        .with_bounds(Some(0.0), Some(10.0));
    let validator = validator(&pmfm);
    assert_eq!(validator.validate("12.5"), vec![
        RuleViolation::Max {
            max: 10.0,
            actual: 12.5
        },
        RuleViolation::Integer,
    ]);
}

#[test]
fn qualitative_uses_parameter_fallback_list() {
    let pmfm: Pmfm = serde_json::from_str(
        r#"{
            "id": 63,
            "label": "SEX",
            "type": "qualitative_value",
            "parameter": {
                "id": 7,
                "label": "SEX",
                "qualitativeValues": [{"id": 1, "label": "M"}, {"id": 2, "label": "F"}]
            }
        }"#,
    )
    .expect("parse pmfm");
    let validator = validator(&pmfm);
    assert!(validator.is_valid("1"));
    assert_eq!(
        validator.validate("3"),
        vec![RuleViolation::InvalidQualitativeValue]
    );
}

#[test]
fn violations_serialize_for_reports() {
    let pmfm = Pmfm::minimal(64, "SEX", PmfmType::QualitativeValue)
        .with_qualitative_values(vec![ReferentialRef::labeled(1, "M")]);
    let violations = validator(&pmfm).validate("5");
    let json = serde_json::to_value(&violations).expect("serialize violations");
    assert_eq!(json[0]["rule"], "qualitativeValue");
}
