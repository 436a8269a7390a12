//! Property-based tests for the validator
//!
//! - Validation is idempotent: validating a normalized value returns it unchanged
//! - Values already matching the shape exactly come back equal
//! - Out-of-range numbers are always rejected, never clamped

use super::validate::ValidationReason;
use super::{validate, Field, Shape};
use proptest::prelude::*;
use serde_json::{json, Value};

fn entry_shape() -> Shape {
    Shape::object(vec![
        Field::required("date", Shape::string()),
        Field::required("maxTemp", Shape::number()),
        Field::required("minTemp", Shape::number()),
        Field::required("precipitationChance", Shape::number_in(0.0, 100.0)),
        Field::required("condition", Shape::string()),
        Field::required("location", Shape::string()),
    ])
}

fn arb_entry() -> impl Strategy<Value = Value> {
    (
        "20[0-9]{2}-[01][0-9]-[0-3][0-9]",
        -50.0f64..50.0,
        -50.0f64..50.0,
        0u8..=100,
        "[A-Za-z ]{1,20}",
        "[A-Za-z ]{1,20}",
    )
        .prop_map(|(date, max, min, chance, condition, location)| {
            json!({
                "date": date,
                "maxTemp": max,
                "minTemp": min,
                "precipitationChance": chance,
                "condition": condition,
                "location": location,
            })
        })
}

/// Entry with extra undeclared keys sprinkled in
fn arb_noisy_entry() -> impl Strategy<Value = Value> {
    (arb_entry(), prop::collection::btree_map("[a-z]{3,8}", any::<i32>(), 0..4)).prop_map(
        |(mut entry, extras)| {
            if let Value::Object(map) = &mut entry {
                for (k, v) in extras {
                    map.entry(format!("x_{k}")).or_insert(json!(v));
                }
            }
            entry
        },
    )
}

proptest! {
    #[test]
    fn prop_valid_value_round_trips(entries in prop::collection::vec(arb_entry(), 0..8)) {
        let value = Value::Array(entries);
        let shape = Shape::array(entry_shape());
        let normalized = validate(&shape, &value).unwrap();
        prop_assert_eq!(normalized, value);
    }

    #[test]
    fn prop_validation_is_idempotent(entries in prop::collection::vec(arb_noisy_entry(), 0..8)) {
        let shape = Shape::array(entry_shape());
        let once = validate(&shape, &Value::Array(entries)).unwrap();
        let twice = validate(&shape, &once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_out_of_range_rejected(
        entry in arb_entry(),
        chance in prop_oneof![-1000.0f64..-0.001, 100.001f64..1000.0],
    ) {
        let mut entry = entry;
        entry["precipitationChance"] = json!(chance);
        let err = validate(&entry_shape(), &entry).unwrap_err();
        prop_assert_eq!(err.path.as_str(), "$.precipitationChance");
        let is_out_of_range = matches!(err.reason, ValidationReason::OutOfRange { .. });
        prop_assert!(is_out_of_range);
    }
}
