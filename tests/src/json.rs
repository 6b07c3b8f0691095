use prost_dynamic::{
    bytes::Bytes, DeserializeOptions, DynamicMessage, JsonError, MapKey, SerializeOptions, Value,
};
use serde_json::json;

use crate::{message_desc, new_message, point};

fn to_json(message: &DynamicMessage) -> serde_json::Value {
    message.to_json_value(&SerializeOptions::new()).unwrap()
}

fn from_json(name: &str, json: serde_json::Value) -> DynamicMessage {
    DynamicMessage::from_json_value(message_desc(name), &json, &DeserializeOptions::new()).unwrap()
}

#[test]
fn serialize_scalars_uses_camel_case_and_stringifies_64_bit() {
    let mut dynamic = new_message("test.JsonTypes");
    dynamic
        .try_set_field_by_name("int64_field", Value::I64(-9223372036854775000))
        .unwrap();
    dynamic
        .try_set_field_by_name("bool_field", Value::Bool(true))
        .unwrap();
    dynamic
        .try_set_field_by_name(
            "bytes_field",
            Value::Bytes(Bytes::from_static(&[0x01, 0x02, 0x03, 0xFF])),
        )
        .unwrap();

    assert_eq!(
        to_json(&dynamic),
        json!({
            "int64Field": "-9223372036854775000",
            "boolField": true,
            "bytesField": "AQID/w==",
        })
    );

    // Parsing the produced JSON restores the original message.
    let text = dynamic.to_json_string(&SerializeOptions::new()).unwrap();
    let parsed = DynamicMessage::from_json_str(
        dynamic.descriptor().clone(),
        &text,
        &DeserializeOptions::new(),
    )
    .unwrap();
    assert_eq!(parsed, dynamic);
}

#[test]
fn serialize_float_extrema_as_strings() {
    let mut dynamic = new_message("test.Scalars");
    dynamic
        .try_set_field_by_name("double", Value::F64(f64::INFINITY))
        .unwrap();
    dynamic
        .try_set_field_by_name("float", Value::F32(f32::NEG_INFINITY))
        .unwrap();

    assert_eq!(
        to_json(&dynamic),
        json!({"double": "Infinity", "float": "-Infinity"})
    );

    dynamic
        .try_set_field_by_name("double", Value::F64(f64::NAN))
        .unwrap();
    assert_eq!(to_json(&dynamic)["double"], json!("NaN"));
}

#[test]
fn deserialize_float_literals() {
    let dynamic = from_json(
        "test.Scalars",
        json!({"double": "Infinity", "float": "NaN"}),
    );
    assert_eq!(
        dynamic.get_field_by_name("double").unwrap().as_f64(),
        Some(f64::INFINITY)
    );
    assert!(dynamic
        .get_field_by_name("float")
        .unwrap()
        .as_f32()
        .unwrap()
        .is_nan());
}

#[test]
fn integers_accept_numbers_and_decimal_strings() {
    let dynamic = from_json(
        "test.Scalars",
        json!({"int32": -3, "int64": "-9000000000", "uint32": "42", "uint64": 7}),
    );
    assert_eq!(dynamic.get_field_by_name("int32").unwrap().as_i32(), Some(-3));
    assert_eq!(
        dynamic.get_field_by_name("int64").unwrap().as_i64(),
        Some(-9_000_000_000)
    );
    assert_eq!(dynamic.get_field_by_name("uint32").unwrap().as_u32(), Some(42));
    assert_eq!(dynamic.get_field_by_name("uint64").unwrap().as_u64(), Some(7));
}

#[test]
fn out_of_range_numbers_are_rejected() {
    let err = DynamicMessage::from_json_value(
        message_desc("test.Scalars"),
        &json!({"int32": 3000000000i64}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::NumberOutOfRange {
            field: "int32".to_owned(),
            value: "3000000000".to_owned(),
        }
    );

    let err = DynamicMessage::from_json_value(
        message_desc("test.Scalars"),
        &json!({"uint32": -1}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::NumberOutOfRange { .. }));
}

#[test]
fn malformed_numbers_are_rejected() {
    let err = DynamicMessage::from_json_value(
        message_desc("test.Scalars"),
        &json!({"int32": "abc"}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::InvalidNumberFormat {
            field: "int32".to_owned(),
            value: "abc".to_owned(),
        }
    );

    let err = DynamicMessage::from_json_value(
        message_desc("test.Scalars"),
        &json!({"int32": 1.5}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::InvalidNumberFormat { .. }));
}

#[test]
fn bytes_accept_standard_and_url_safe_base64() {
    let dynamic = from_json("test.JsonTypes", json!({"bytesField": "AQID/w=="}));
    assert_eq!(
        dynamic.get_field_by_name("bytes_field").unwrap().as_bytes(),
        Some(&Bytes::from_static(&[0x01, 0x02, 0x03, 0xFF]))
    );

    let dynamic = from_json("test.JsonTypes", json!({"bytesField": "AQID_w=="}));
    assert_eq!(
        dynamic.get_field_by_name("bytes_field").unwrap().as_bytes(),
        Some(&Bytes::from_static(&[0x01, 0x02, 0x03, 0xFF]))
    );

    let err = DynamicMessage::from_json_value(
        message_desc("test.JsonTypes"),
        &json!({"bytesField": "not base64!"}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::InvalidBase64 { .. }));
}

#[test]
fn enums_serialize_in_their_stored_form() {
    let mut by_number = new_message("test.ComplexType");
    by_number
        .try_set_field_by_name("color", Value::EnumNumber(1))
        .unwrap();
    assert_eq!(to_json(&by_number), json!({"color": 1}));

    let mut by_name = new_message("test.ComplexType");
    by_name
        .try_set_field_by_name("color", Value::EnumName("COLOR_RED".to_owned()))
        .unwrap();
    assert_eq!(to_json(&by_name), json!({"color": "COLOR_RED"}));

    // Round-trips preserve the form, so the two remain distinguishable.
    let number_again = from_json("test.ComplexType", to_json(&by_number));
    let name_again = from_json("test.ComplexType", to_json(&by_name));
    assert_eq!(number_again, by_number);
    assert_eq!(name_again, by_name);
    assert_ne!(number_again, name_again);
}

#[test]
fn unknown_enum_names_are_rejected() {
    let err = DynamicMessage::from_json_value(
        message_desc("test.ComplexType"),
        &json!({"color": "MAGENTA"}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::ValueTypeMismatch { .. }));
}

#[test]
fn maps_use_stringified_keys() {
    let mut dynamic = new_message("test.ComplexType");
    dynamic
        .try_set_map_entry_by_name("int_map", MapKey::I32(1), Value::String("one".to_owned()))
        .unwrap();
    dynamic
        .try_set_map_entry_by_name("int_map", MapKey::I32(42), Value::String("answer".to_owned()))
        .unwrap();

    assert_eq!(
        to_json(&dynamic),
        json!({"intMap": {"1": "one", "42": "answer"}})
    );
}

#[test]
fn map_keys_parse_by_declared_type() {
    let dynamic = from_json(
        "test.ComplexType",
        json!({"intMap": {"1": "one", "42": "answer"}}),
    );
    let map = dynamic.get_field_by_name("int_map").unwrap();
    let map = map.as_map().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&MapKey::I32(1)).unwrap().as_str(), Some("one"));
    assert_eq!(map.get(&MapKey::I32(42)).unwrap().as_str(), Some("answer"));

    let err = DynamicMessage::from_json_value(
        message_desc("test.ComplexType"),
        &json!({"intMap": {"abc": "nope"}}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::InvalidNumberFormat {
            field: "int_map".to_owned(),
            value: "abc".to_owned(),
        }
    );
}

#[test]
fn nested_messages_and_lists_roundtrip() {
    let mut dynamic = new_message("test.ComplexType");
    dynamic
        .try_set_field_by_name("nested", Value::Message(point(3, -4)))
        .unwrap();
    dynamic
        .try_add_repeated_by_name("points", Value::Message(point(1, 1)))
        .unwrap();
    dynamic
        .try_add_repeated_by_name("points", Value::Message(point(2, 2)))
        .unwrap();
    dynamic
        .try_set_field_by_name(
            "colors",
            Value::List(vec![
                Value::EnumNumber(3),
                Value::EnumName("COLOR_GREEN".to_owned()),
            ]),
        )
        .unwrap();
    dynamic
        .try_set_map_entry_by_name(
            "point_map",
            MapKey::String("origin".to_owned()),
            Value::Message(point(0, 0)),
        )
        .unwrap();

    let value = to_json(&dynamic);
    assert_eq!(
        value,
        json!({
            "nested": {"x": 3, "y": -4},
            "points": [{"x": 1, "y": 1}, {"x": 2, "y": 2}],
            "colors": [3, "COLOR_GREEN"],
            "pointMap": {"origin": {"x": 0, "y": 0}},
        })
    );
    assert_eq!(from_json("test.ComplexType", value), dynamic);
}

#[test]
fn unknown_fields_are_skipped_by_default() {
    let dynamic = from_json(
        "test.JsonTypes",
        json!({"boolField": true, "unknown_field": 1}),
    );
    assert!(dynamic.has_field_by_name("bool_field"));
}

#[test]
fn unknown_fields_fail_under_strict_mode() {
    let options = DeserializeOptions::new().deny_unknown_fields(true);
    let err = DynamicMessage::from_json_value(
        message_desc("test.JsonTypes"),
        &json!({"unknown_field": 1}),
        &options,
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::UnknownField {
            field: "unknown_field".to_owned(),
            message: "test.JsonTypes".to_owned(),
        }
    );
}

#[test]
fn null_leaves_a_field_unset() {
    let dynamic = from_json("test.JsonTypes", json!({"boolField": null}));
    assert!(!dynamic.has_field_by_name("bool_field"));
}

#[test]
fn field_names_match_proto_json_and_camel_case_forms() {
    // proto name, declared JSON name, and the generated camelCase all match.
    let a = from_json("test.JsonTypes", json!({"int64_field": "1"}));
    let b = from_json("test.JsonTypes", json!({"int64Field": "1"}));
    assert_eq!(a, b);
}

#[test]
fn proto_field_names_option_emits_snake_case() {
    let mut dynamic = new_message("test.JsonTypes");
    dynamic
        .try_set_field_by_name("int64_field", Value::I64(1))
        .unwrap();

    let options = SerializeOptions::new().use_proto_field_name(true);
    assert_eq!(
        dynamic.to_json_value(&options).unwrap(),
        json!({"int64_field": "1"})
    );
}

#[test]
fn unpopulated_fields_are_emitted_on_request() {
    let options = SerializeOptions::new().emit_unpopulated_fields(true);
    let value = new_message("test.ComplexType").to_json_value(&options).unwrap();

    assert_eq!(
        value,
        json!({
            "stringMap": {},
            "intMap": {},
            "colors": [],
            "points": [],
            "pointMap": {},
            "color": 0,
        })
    );

    let value = new_message("test.JsonTypes").to_json_value(&options).unwrap();
    assert_eq!(
        value,
        json!({"int64Field": "0", "boolField": false, "bytesField": ""})
    );
}

#[test]
fn empty_containers_still_emit_with_defaults_enabled() {
    let mut dynamic = new_message("test.ComplexType");
    dynamic
        .try_set_field_by_name("colors", Value::List(Vec::new()))
        .unwrap();

    let options = SerializeOptions::new().emit_unpopulated_fields(true);
    assert_eq!(
        dynamic.to_json_value(&options).unwrap()["colors"],
        json!([])
    );
}

#[test]
fn pretty_printing_is_honored() {
    let mut dynamic = new_message("test.JsonTypes");
    dynamic
        .try_set_field_by_name("bool_field", Value::Bool(true))
        .unwrap();

    let compact = dynamic.to_json_string(&SerializeOptions::new()).unwrap();
    assert_eq!(compact, r#"{"boolField":true}"#);

    let pretty = dynamic
        .to_json_string(&SerializeOptions::new().pretty(true))
        .unwrap();
    assert!(pretty.contains('\n'));
    assert!(pretty.contains("\"boolField\": true"));
}

#[test]
fn top_level_value_must_be_an_object() {
    let err = DynamicMessage::from_json_value(
        message_desc("test.JsonTypes"),
        &json!([1, 2, 3]),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::InvalidJsonStructure {
            expected: "Object".to_owned(),
            actual: "Array".to_owned(),
        }
    );
}

#[test]
fn malformed_json_is_rejected() {
    let err = DynamicMessage::from_json_str(
        message_desc("test.JsonTypes"),
        "{not json",
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert!(matches!(err, JsonError::InvalidJson { .. }));
}

#[test]
fn value_type_mismatches_are_reported() {
    let err = DynamicMessage::from_json_value(
        message_desc("test.JsonTypes"),
        &json!({"boolField": "true"}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::ValueTypeMismatch {
            field: "bool_field".to_owned(),
            expected: "a boolean".to_owned(),
            actual: "String".to_owned(),
        }
    );

    let err = DynamicMessage::from_json_value(
        message_desc("test.ComplexType"),
        &json!({"points": {"x": 1}}),
        &DeserializeOptions::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        JsonError::ValueTypeMismatch {
            field: "points".to_owned(),
            expected: "an array".to_owned(),
            actual: "Object".to_owned(),
        }
    );
}

#[test]
fn serde_serialize_uses_default_options() {
    let mut dynamic = new_message("test.JsonTypes");
    dynamic
        .try_set_field_by_name("int64_field", Value::I64(5))
        .unwrap();

    assert_eq!(
        serde_json::to_value(&dynamic).unwrap(),
        json!({"int64Field": "5"})
    );
}
