//! End-to-end value codec and conversion tests.

use chrono::{TimeZone, Utc};
use pmfm_model::conversion::set_weight_unit_conversion;
use pmfm_model::pmfm::{Pmfm, PmfmType};
use pmfm_model::value::{
    FromModelOptions, PmfmValue, ToModelOptions, ValueToStringOptions, equals, from_model_value,
    to_model_value, value_to_string,
};
use pmfm_model::{DisplayProperty, FormValue, ReferentialRef, WeightUnit};

fn decode(raw: &str, pmfm: &Pmfm) -> FormValue {
    from_model_value(Some(raw), pmfm, &FromModelOptions::default())
}

fn encode(value: &FormValue, pmfm: &Pmfm) -> Option<String> {
    to_model_value(value, pmfm, &ToModelOptions::default())
}

#[test]
fn round_trip_per_type() {
    let cases: Vec<(Pmfm, &str)> = vec![
        (Pmfm::minimal(1, "WEIGHT", PmfmType::Double), "12.5"),
        (Pmfm::minimal(2, "COUNT", PmfmType::Integer), "42"),
        (Pmfm::minimal(3, "COMMENT", PmfmType::String), "left dorsal"),
        (Pmfm::minimal(4, "IS_DEAD", PmfmType::Boolean), "true"),
        (
            Pmfm::minimal(5, "SEX", PmfmType::QualitativeValue)
                .with_qualitative_values(vec![ReferentialRef::labeled(2, "F")]),
            "2",
        ),
    ];
    for (pmfm, raw) in cases {
        let decoded = decode(raw, &pmfm);
        let encoded = encode(&decoded, &pmfm);
        assert_eq!(encoded.as_deref(), Some(raw), "round trip of {raw:?}");
    }
}

#[test]
fn date_round_trip_compares_by_instant() {
    let pmfm = Pmfm::minimal(6, "CAPTURE_AT", PmfmType::Date);
    let decoded = decode("2024-03-01T10:30:00+01:00", &pmfm);
    let FormValue::Scalar(Some(PmfmValue::Date(date))) = &decoded else {
        panic!("expected date, got {decoded:?}");
    };
    let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    assert_eq!(*date, expected);
    // Encodes normalized to UTC, same instant
    let encoded = encode(&decoded, &pmfm).expect("encoded date");
    let again = decode(&encoded, &pmfm);
    assert!(equals_slot(&decoded, &again));
}

fn equals_slot(a: &FormValue, b: &FormValue) -> bool {
    match (a, b) {
        (FormValue::Scalar(x), FormValue::Scalar(y)) => equals(x.as_ref(), y.as_ref()),
        _ => false,
    }
}

#[test]
fn converted_weight_survives_round_trip() {
    let pmfm = Pmfm::minimal(7, "BATCH_TOTAL_WEIGHT", PmfmType::Double)
        .with_unit_label("kg")
        .with_max_decimals(6);
    let displayed_in_g = set_weight_unit_conversion(&pmfm, WeightUnit::G);

    let decoded = decode("0.123", &displayed_in_g);
    let FormValue::Scalar(Some(PmfmValue::Number(number))) = &decoded else {
        panic!("expected number, got {decoded:?}");
    };
    assert_eq!(number.value, 123.0);
    assert!(number.is_converted());

    // Back to wire units on encode
    assert_eq!(encode(&decoded, &displayed_in_g).as_deref(), Some("0.123"));
}

#[test]
fn multi_value_with_empty_slot() {
    let pmfm = Pmfm::minimal(8, "GEAR_FEATURE", PmfmType::QualitativeValue)
        .with_multiple(true)
        .with_qualitative_values(vec![
            ReferentialRef::labeled(1, "A"),
            ReferentialRef::labeled(3, "C"),
        ]);
    let decoded = decode("1|99|3", &pmfm);
    let FormValue::List(slots) = &decoded else {
        panic!("expected list");
    };
    // The unknown id degrades to an empty slot, not an error
    assert!(slots[1].is_none());
    assert_eq!(encode(&decoded, &pmfm).as_deref(), Some("1||3"));
}

#[test]
fn qualitative_renders_selected_properties() {
    let pmfm = Pmfm::minimal(9, "SEX", PmfmType::QualitativeValue).with_qualitative_values(vec![
        ReferentialRef::named(2, "F", "Female"),
    ]);
    let decoded = decode("2", &pmfm);
    let opts = ValueToStringOptions {
        property_names: Some(vec![DisplayProperty::Label, DisplayProperty::Name]),
        ..Default::default()
    };
    assert_eq!(
        value_to_string(&decoded, &pmfm, &opts).as_deref(),
        Some("F - Female")
    );
}

#[test]
fn hide_if_default_hides_matching_value() {
    let pmfm = Pmfm::minimal(10, "LANDING_CATEGORY", PmfmType::QualitativeValue)
        .with_qualitative_values(vec![ReferentialRef::labeled(4, "LAN")])
        .with_default_value("4");
    let decoded = decode("4", &pmfm);
    let opts = ValueToStringOptions {
        hide_if_default_value: true,
        ..Default::default()
    };
    assert_eq!(value_to_string(&decoded, &pmfm, &opts), None);
}
