//! Shape validation

use super::Shape;
use serde_json::{Map, Value};
use thiserror::Error;

/// First point at which a value diverged from its shape
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {}", describe(.reason, .expected, .actual))]
pub struct ValidationError {
    /// Path to the failing field, e.g. `$[2].precipitationChance`
    pub path: String,
    /// What the shape expected at `path`
    pub expected: String,
    /// Kind actually found (`missing` for absent fields)
    pub actual: &'static str,
    pub reason: ValidationReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidationReason {
    /// Required object field absent
    Missing,
    /// Value of the wrong primitive/container kind
    KindMismatch,
    /// Number outside its declared bounds
    OutOfRange { value: f64 },
}

impl ValidationError {
    fn new(
        path: impl Into<String>,
        shape: &Shape,
        actual: &'static str,
        reason: ValidationReason,
    ) -> Self {
        Self {
            path: path.into(),
            expected: shape.expectation(),
            actual,
            reason,
        }
    }
}

fn describe(reason: &ValidationReason, expected: &str, actual: &str) -> String {
    match reason {
        ValidationReason::Missing => format!("required field missing (expected {expected})"),
        ValidationReason::KindMismatch => format!("expected {expected}, found {actual}"),
        ValidationReason::OutOfRange { value } => format!("expected {expected}, found {value}"),
    }
}

/// Validate `value` against `shape`.
///
/// Returns a normalized copy on success: object fields not declared by the
/// shape are dropped. Validating the returned value again yields an equal
/// value.
pub fn validate(shape: &Shape, value: &Value) -> Result<Value, ValidationError> {
    check(shape, value, "$")
}

fn check(shape: &Shape, value: &Value, path: &str) -> Result<Value, ValidationError> {
    match (shape, value) {
        (Shape::Any, _) | (Shape::String, Value::String(_)) | (Shape::Boolean, Value::Bool(_)) => {
            Ok(value.clone())
        }
        (Shape::Number { min, max }, Value::Number(n)) => {
            let Some(x) = n.as_f64() else {
                return Err(mismatch(shape, value, path));
            };
            let below = min.is_some_and(|min| x < min);
            let above = max.is_some_and(|max| x > max);
            if below || above {
                return Err(ValidationError::new(
                    path,
                    shape,
                    "number",
                    ValidationReason::OutOfRange { value: x },
                ));
            }
            Ok(value.clone())
        }
        (Shape::Object { fields }, Value::Object(map)) => {
            let mut normalized = Map::new();
            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match map.get(&field.name) {
                    Some(v) => {
                        normalized.insert(field.name.clone(), check(&field.shape, v, &field_path)?);
                    }
                    None if field.required => {
                        return Err(ValidationError::new(
                            field_path,
                            &field.shape,
                            "missing",
                            ValidationReason::Missing,
                        ));
                    }
                    None => {}
                }
            }
            Ok(Value::Object(normalized))
        }
        (Shape::Array { items }, Value::Array(values)) => values
            .iter()
            .enumerate()
            .map(|(i, v)| check(items, v, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => Err(mismatch(shape, value, path)),
    }
}

fn mismatch(shape: &Shape, value: &Value, path: &str) -> ValidationError {
    ValidationError::new(path, shape, value_kind(value), ValidationReason::KindMismatch)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn city_shape() -> Shape {
        Shape::object(vec![Field::required("city", Shape::string())])
    }

    fn forecast_shape() -> Shape {
        Shape::array(Shape::object(vec![
            Field::required("date", Shape::string()),
            Field::required("precipitationChance", Shape::number_in(0.0, 100.0)),
        ]))
    }

    #[test]
    fn test_accepts_matching_object() {
        let value = json!({ "city": "Shibuya" });
        assert_eq!(validate(&city_shape(), &value).unwrap(), value);
    }

    #[test]
    fn test_strips_undeclared_fields() {
        let value = json!({ "city": "Shibuya", "extra": true });
        assert_eq!(
            validate(&city_shape(), &value).unwrap(),
            json!({ "city": "Shibuya" })
        );
    }

    #[test]
    fn test_missing_required_field() {
        let err = validate(&city_shape(), &json!({})).unwrap_err();
        assert_eq!(err.path, "$.city");
        assert_eq!(err.actual, "missing");
        assert_eq!(err.reason, ValidationReason::Missing);
        assert_eq!(err.to_string(), "$.city: required field missing (expected string)");
    }

    #[test]
    fn test_kind_mismatch_reports_expected_and_actual() {
        let err = validate(&city_shape(), &json!({ "city": 42 })).unwrap_err();
        assert_eq!(err.path, "$.city");
        assert_eq!(err.expected, "string");
        assert_eq!(err.actual, "number");
        assert_eq!(err.to_string(), "$.city: expected string, found number");
    }

    #[test]
    fn test_null_is_not_a_string() {
        let err = validate(&city_shape(), &json!({ "city": null })).unwrap_err();
        assert_eq!(err.actual, "null");
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let shape = Shape::object(vec![Field::optional("note", Shape::string())]);
        assert_eq!(validate(&shape, &json!({})).unwrap(), json!({}));
        assert!(validate(&shape, &json!({ "note": 1 })).is_err());
    }

    #[test]
    fn test_precipitation_bounds_inclusive() {
        for chance in [0, 100] {
            let value = json!([{ "date": "2025-01-01", "precipitationChance": chance }]);
            assert!(validate(&forecast_shape(), &value).is_ok(), "{chance} rejected");
        }
    }

    #[test]
    fn test_precipitation_out_of_range_rejected() {
        for chance in [-1, 101] {
            let value = json!([
                { "date": "2025-01-01", "precipitationChance": 50 },
                { "date": "2025-01-02", "precipitationChance": chance },
            ]);
            let err = validate(&forecast_shape(), &value).unwrap_err();
            assert_eq!(err.path, "$[1].precipitationChance");
            assert_eq!(err.expected, "number in [0, 100]");
            assert!(matches!(err.reason, ValidationReason::OutOfRange { .. }));
            assert_eq!(
                err.to_string(),
                format!("$[1].precipitationChance: expected number in [0, 100], found {chance}")
            );
        }
    }

    #[test]
    fn test_reports_first_failing_path() {
        let value = json!([
            { "date": 1, "precipitationChance": 500 },
        ]);
        let err = validate(&forecast_shape(), &value).unwrap_err();
        assert_eq!(err.path, "$[0].date");
    }

    #[test]
    fn test_any_passes_through() {
        let value = json!({ "anything": [1, 2, 3] });
        assert_eq!(validate(&Shape::Any, &value).unwrap(), value);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let value = json!({ "city": "Tokyo", "extra": 1 });
        let before = value.clone();
        let _ = validate(&city_shape(), &value);
        assert_eq!(value, before);
    }
}
