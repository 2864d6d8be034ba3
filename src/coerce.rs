//! Type-directed coercion of raw values.
//!
//! Environment strings go through [`from_env_str`], which dispatches on the
//! field's [`CoercionKind`]; already-typed values (explicit arguments and
//! defaults) go through the shallow [`check_value`] pass, with final typing
//! left to serde deserialization of the assembled object.

use serde::de::Error as DeError;
use serde_json::Value;

use crate::metadata::{CoercionKind, FieldMetadata, SettingsMetadata};

/// Strings treated as `true` by the boolean coercion; everything else is `false`.
const TRUTHY: [&str; 5] = ["true", "1", "t", "y", "yes"];

/// Coerces a raw environment string into the field's declared type.
pub(crate) fn from_env_str(
    raw: &str,
    field: &FieldMetadata,
) -> Result<Value, serde_json::Error> {
    match field.kind {
        CoercionKind::Bool => Ok(Value::Bool(
            TRUTHY.iter().any(|repr| raw.eq_ignore_ascii_case(repr)),
        )),
        CoercionKind::Integer => parse_int(raw),
        CoercionKind::Float => parse_float(raw),
        CoercionKind::Sequence => {
            let trimmed = raw.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                serde_json::from_str(trimmed)
            } else {
                Ok(Value::Array(
                    raw.split(',')
                        .map(|part| Value::String(part.to_owned()))
                        .collect(),
                ))
            }
        }
        CoercionKind::Mapping => serde_json::from_str(raw.trim()),
        CoercionKind::Nested(meta) => {
            let value: Value = serde_json::from_str(raw.trim())?;
            check_nested(&value, meta())?;
            Ok(value)
        }
        CoercionKind::Raw => Ok(Value::String(raw.to_owned())),
    }
}

fn parse_int(raw: &str) -> Result<Value, serde_json::Error> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(int.into());
    }
    match raw.parse::<u64>() {
        Ok(int) => Ok(int.into()),
        Err(err) => Err(DeError::custom(format_args!(
            "{err} while parsing integer value {raw:?}"
        ))),
    }
}

fn parse_float(raw: &str) -> Result<Value, serde_json::Error> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(float) => serde_json::Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| {
                DeError::custom(format_args!(
                    "non-finite float value {raw:?} is not representable"
                ))
            }),
        Err(err) => Err(DeError::custom(format_args!(
            "{err} while parsing float value {raw:?}"
        ))),
    }
}

/// Checks an already-typed value against the field's declared kind.
///
/// This is a shallow shape check; strings destined for opaque validated types
/// pass here and convert during final deserialization. `Null` is accepted only
/// for optional fields.
pub(crate) fn check_value(
    value: &Value,
    field: &FieldMetadata,
) -> Result<(), serde_json::Error> {
    if value.is_null() {
        if field.is_optional {
            return Ok(());
        }
        return Err(DeError::custom(format_args!(
            "null is not a valid value for non-optional field `{}`",
            field.name
        )));
    }
    let matches = match field.kind {
        CoercionKind::Bool => value.is_boolean(),
        CoercionKind::Integer => value.is_i64() || value.is_u64(),
        CoercionKind::Float => value.is_number(),
        CoercionKind::Sequence => value.is_array(),
        CoercionKind::Mapping => value.is_object(),
        CoercionKind::Nested(meta) => return check_nested(value, meta()),
        // Strings and opaque types; final deserialization has the last word.
        CoercionKind::Raw => true,
    };
    if matches {
        Ok(())
    } else {
        Err(DeError::custom(format_args!(
            "invalid type for field `{}`: expected {}, got {}",
            field.name,
            expected_shape(field.kind),
            actual_shape(value)
        )))
    }
}

/// Shallow field-by-field check of a parsed literal against a nested catalog.
fn check_nested(value: &Value, meta: &SettingsMetadata) -> Result<(), serde_json::Error> {
    let Value::Object(object) = value else {
        return Err(DeError::custom(format_args!(
            "expected an object for nested settings `{}`, got {}",
            meta.ty,
            actual_shape(value)
        )));
    };
    for field in &meta.fields {
        match object.get(field.name) {
            Some(field_value) => check_value(field_value, field)?,
            None if field.is_required() => {
                return Err(DeError::custom(format_args!(
                    "missing required field `{}` in nested settings `{}`",
                    field.name, meta.ty
                )));
            }
            None => {}
        }
    }
    Ok(())
}

fn expected_shape(kind: CoercionKind) -> &'static str {
    match kind {
        CoercionKind::Bool => "a boolean",
        CoercionKind::Integer => "an integer",
        CoercionKind::Float => "a number",
        CoercionKind::Sequence => "an array",
        CoercionKind::Mapping => "an object",
        CoercionKind::Nested(_) => "an object",
        CoercionKind::Raw => "a string",
    }
}

fn actual_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(kind: CoercionKind) -> FieldMetadata {
        FieldMetadata::new("test", kind)
    }

    #[test]
    fn bool_coercion_is_permissive() {
        for truthy in ["true", "TRUE", "1", "t", "Y", "yes", "Yes"] {
            let value = from_env_str(truthy, &field(CoercionKind::Bool)).unwrap();
            assert_eq!(value, Value::Bool(true), "{truthy}");
        }
        for falsy in ["false", "0", "no", "off", "anything", ""] {
            let value = from_env_str(falsy, &field(CoercionKind::Bool)).unwrap();
            assert_eq!(value, Value::Bool(false), "{falsy}");
        }
    }

    #[test]
    fn integer_coercion() {
        let value = from_env_str("42", &field(CoercionKind::Integer)).unwrap();
        assert_eq!(value, json!(42));
        let value = from_env_str("-7", &field(CoercionKind::Integer)).unwrap();
        assert_eq!(value, json!(-7));
        let value = from_env_str(" 10 ", &field(CoercionKind::Integer)).unwrap();
        assert_eq!(value, json!(10));
        // Out of `i64` range, still a valid `u64`.
        let value = from_env_str("18446744073709551615", &field(CoercionKind::Integer)).unwrap();
        assert_eq!(value, json!(u64::MAX));

        let err = from_env_str("abc", &field(CoercionKind::Integer)).unwrap_err();
        assert!(err.to_string().contains("abc"), "{err}");
        from_env_str("4.5", &field(CoercionKind::Integer)).unwrap_err();
    }

    #[test]
    fn float_coercion() {
        let value = from_env_str("2.5", &field(CoercionKind::Float)).unwrap();
        assert_eq!(value, json!(2.5));
        let value = from_env_str("-1e3", &field(CoercionKind::Float)).unwrap();
        assert_eq!(value, json!(-1000.0));

        from_env_str("not-a-float", &field(CoercionKind::Float)).unwrap_err();
        let err = from_env_str("NaN", &field(CoercionKind::Float)).unwrap_err();
        assert!(err.to_string().contains("non-finite"), "{err}");
    }

    #[test]
    fn sequence_coercion_splits_on_commas() {
        let value = from_env_str("1,2,3", &field(CoercionKind::Sequence)).unwrap();
        assert_eq!(value, json!(["1", "2", "3"]));
        // No trimming of elements, as with a plain comma split.
        let value = from_env_str("a, b", &field(CoercionKind::Sequence)).unwrap();
        assert_eq!(value, json!(["a", " b"]));
    }

    #[test]
    fn sequence_coercion_parses_bracketed_literals() {
        let value = from_env_str("[1,2,3]", &field(CoercionKind::Sequence)).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
        let value = from_env_str(r#"["a", "b"]"#, &field(CoercionKind::Sequence)).unwrap();
        assert_eq!(value, json!(["a", "b"]));

        from_env_str("[1, 2", &field(CoercionKind::Sequence)).unwrap_err();
    }

    #[test]
    fn mapping_coercion() {
        let value = from_env_str(r#"{"a": 1}"#, &field(CoercionKind::Mapping)).unwrap();
        assert_eq!(value, json!({ "a": 1 }));
        from_env_str("not json", &field(CoercionKind::Mapping)).unwrap_err();
    }

    #[test]
    fn raw_coercion_passes_strings_through() {
        let value = from_env_str("hello, world", &field(CoercionKind::Raw)).unwrap();
        assert_eq!(value, json!("hello, world"));
    }

    #[test]
    fn nested_coercion_checks_sub_fields() {
        fn nested_meta() -> &'static SettingsMetadata {
            use std::sync::LazyLock;
            static META: LazyLock<SettingsMetadata> = LazyLock::new(|| {
                SettingsMetadata::builder("Nested")
                    .field(FieldMetadata::new("host", CoercionKind::Raw))
                    .field(FieldMetadata::new("port", CoercionKind::Integer).with_default(5432))
                    .build()
            });
            &META
        }
        let field = field(CoercionKind::Nested(nested_meta));

        let value = from_env_str(r#"{"host": "db", "port": 1}"#, &field).unwrap();
        assert_eq!(value, json!({ "host": "db", "port": 1 }));

        let err = from_env_str(r#"{"port": 1}"#, &field).unwrap_err();
        assert!(err.to_string().contains("host"), "{err}");
        let err = from_env_str(r#"{"host": "db", "port": "x"}"#, &field).unwrap_err();
        assert!(err.to_string().contains("port"), "{err}");
        from_env_str("[]", &field).unwrap_err();
    }

    #[test]
    fn shallow_check_of_typed_values() {
        check_value(&json!(true), &field(CoercionKind::Bool)).unwrap();
        check_value(&json!(1), &field(CoercionKind::Bool)).unwrap_err();
        check_value(&json!(3), &field(CoercionKind::Integer)).unwrap();
        check_value(&json!(3.5), &field(CoercionKind::Integer)).unwrap_err();
        check_value(&json!(3.5), &field(CoercionKind::Float)).unwrap();
        check_value(&json!(3), &field(CoercionKind::Float)).unwrap();
        check_value(&json!([1]), &field(CoercionKind::Sequence)).unwrap();
        check_value(&json!({}), &field(CoercionKind::Mapping)).unwrap();
        check_value(&json!("anything"), &field(CoercionKind::Raw)).unwrap();
    }

    #[test]
    fn null_is_only_valid_for_optional_fields() {
        let required = field(CoercionKind::Integer);
        check_value(&Value::Null, &required).unwrap_err();
        let optional = field(CoercionKind::Integer).optional();
        check_value(&Value::Null, &optional).unwrap();
    }
}
