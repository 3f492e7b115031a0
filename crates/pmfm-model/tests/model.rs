//! Tests for pmfm-model descriptor shapes and serde.

use pmfm_model::pmfm::{Pmfm, PmfmDetail, PmfmType};
use pmfm_model::{DisplayProperty, ReferentialRef};

#[test]
fn minimal_shape_deserializes() {
    let pmfm: Pmfm = serde_json::from_str(
        r#"{
            "id": 60,
            "label": "SAMPLE_WEIGHT",
            "type": "double",
            "unitLabel": "kg",
            "maximumNumberDecimals": 3
        }"#,
    )
    .expect("parse minimal pmfm");
    assert!(matches!(pmfm.detail, PmfmDetail::Minimal(_)));
    assert_eq!(pmfm.unit_label(), Some("kg"));
    assert_eq!(pmfm.maximum_number_decimals, Some(3));
    assert!(!pmfm.required);
}

#[test]
fn denormalized_shape_deserializes() {
    let pmfm: Pmfm = serde_json::from_str(
        r#"{
            "id": 61,
            "label": "LENGTH_TOTAL",
            "type": "double",
            "name": "Total length",
            "completeName": "Total length - Individual - Measurement",
            "unitLabel": "cm",
            "rankOrder": 2,
            "required": true
        }"#,
    )
    .expect("parse denormalized pmfm");
    assert!(matches!(pmfm.detail, PmfmDetail::Denormalized(_)));
    assert_eq!(pmfm.name(), Some("Total length"));
    assert_eq!(
        pmfm.complete_name(),
        Some("Total length - Individual - Measurement")
    );
    assert!(pmfm.required);
}

#[test]
fn full_shape_deserializes_and_exposes_parameter_facets() {
    let pmfm: Pmfm = serde_json::from_str(
        r#"{
            "id": 62,
            "label": "SEX",
            "type": "qualitative_value",
            "parameter": {
                "id": 7,
                "label": "SEX",
                "name": "Sex",
                "qualitativeValues": [
                    {"id": 1, "label": "M", "name": "Male"},
                    {"id": 2, "label": "F", "name": "Female"}
                ]
            },
            "matrix": {"id": 3, "label": "INDIV"},
            "method": {"id": 5, "label": "OBS"}
        }"#,
    )
    .expect("parse full pmfm");
    assert!(matches!(pmfm.detail, PmfmDetail::Full(_)));
    assert_eq!(pmfm.parameter_label(), Some("SEX"));
    // Own list is empty, the parameter's list applies
    assert_eq!(pmfm.qualitative_values().len(), 2);
    assert_eq!(pmfm.method_id(), Some(5));
    let resolved = pmfm.resolve_qualitative_value(2).expect("known id");
    assert_eq!(
        resolved.join_properties(&[DisplayProperty::Label, DisplayProperty::Name]),
        Some("F - Female".to_string())
    );
}

#[test]
fn unknown_type_fails_deserialization() {
    let result: Result<Pmfm, _> = serde_json::from_str(
        r#"{"id": 63, "label": "X", "type": "latitude"}"#,
    );
    assert!(result.is_err());
}

#[test]
fn serde_round_trip_keeps_shape() {
    let pmfm = Pmfm::minimal(64, "GEAR_FEATURE", PmfmType::QualitativeValue)
        .with_multiple(true)
        .with_qualitative_values(vec![
            ReferentialRef::labeled(1, "A"),
            ReferentialRef::labeled(2, "B"),
        ]);
    let json = serde_json::to_string(&pmfm).expect("serialize");
    let round: Pmfm = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, pmfm);
    assert!(round.is_multiple);
}
