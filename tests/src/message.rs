use std::collections::HashMap;

use prost_dynamic::{bytes::Bytes, DynamicMessage, MapKey, SetFieldError, Value};

use crate::{message_desc, new_message, point};

#[test]
fn set_and_get_scalars() {
    let mut dynamic = new_message("test.Scalars");
    dynamic
        .try_set_field_by_name("double", Value::F64(1.1))
        .unwrap();
    dynamic
        .try_set_field_by_name("float", Value::F32(2.2))
        .unwrap();
    dynamic
        .try_set_field_by_name("int32", Value::I32(3))
        .unwrap();
    dynamic
        .try_set_field_by_name("int64", Value::I64(4))
        .unwrap();
    dynamic
        .try_set_field_by_name("uint32", Value::U32(5))
        .unwrap();
    dynamic
        .try_set_field_by_name("uint64", Value::U64(6))
        .unwrap();
    dynamic
        .try_set_field_by_name("sint32", Value::I32(7))
        .unwrap();
    dynamic
        .try_set_field_by_name("sint64", Value::I64(8))
        .unwrap();
    dynamic
        .try_set_field_by_name("fixed32", Value::U32(9))
        .unwrap();
    dynamic
        .try_set_field_by_name("fixed64", Value::U64(10))
        .unwrap();
    dynamic
        .try_set_field_by_name("sfixed32", Value::I32(11))
        .unwrap();
    dynamic
        .try_set_field_by_name("sfixed64", Value::I64(12))
        .unwrap();
    dynamic
        .try_set_field_by_name("bool", Value::Bool(true))
        .unwrap();
    dynamic
        .try_set_field_by_name("string", Value::String("5".to_owned()))
        .unwrap();
    dynamic
        .try_set_field_by_name("bytes", Value::Bytes(Bytes::from_static(b"6")))
        .unwrap();

    assert_eq!(dynamic.get_field_by_name("double").unwrap().as_f64(), Some(1.1));
    assert_eq!(dynamic.get_field_by_name("float").unwrap().as_f32(), Some(2.2));
    assert_eq!(dynamic.get_field_by_name("int32").unwrap().as_i32(), Some(3));
    assert_eq!(dynamic.get_field_by_name("int64").unwrap().as_i64(), Some(4));
    assert_eq!(dynamic.get_field_by_name("uint32").unwrap().as_u32(), Some(5));
    assert_eq!(dynamic.get_field_by_name("uint64").unwrap().as_u64(), Some(6));
    assert_eq!(dynamic.get_field_by_name("sint32").unwrap().as_i32(), Some(7));
    assert_eq!(dynamic.get_field_by_name("sint64").unwrap().as_i64(), Some(8));
    assert_eq!(dynamic.get_field_by_name("fixed32").unwrap().as_u32(), Some(9));
    assert_eq!(dynamic.get_field_by_name("fixed64").unwrap().as_u64(), Some(10));
    assert_eq!(dynamic.get_field_by_name("sfixed32").unwrap().as_i32(), Some(11));
    assert_eq!(dynamic.get_field_by_name("sfixed64").unwrap().as_i64(), Some(12));
    assert_eq!(dynamic.get_field_by_name("bool").unwrap().as_bool(), Some(true));
    assert_eq!(dynamic.get_field_by_name("string").unwrap().as_str(), Some("5"));
    assert_eq!(
        dynamic.get_field_by_name("bytes").unwrap().as_bytes(),
        Some(&Bytes::from_static(b"6"))
    );
}

#[test]
fn unset_fields_read_defaults() {
    let dynamic = new_message("test.Scalars");

    assert!(!dynamic.has_field_by_name("int32"));
    assert_eq!(dynamic.get_field_by_name("int32").unwrap().as_i32(), Some(0));
    assert_eq!(dynamic.get_field_by_name("string").unwrap().as_str(), Some(""));
    assert_eq!(dynamic.get_field_by_name("bool").unwrap().as_bool(), Some(false));

    let arrays = new_message("test.ScalarArrays");
    assert_eq!(arrays.get_field_by_name("int32").unwrap().as_list(), Some(&[][..]));
}

#[test]
fn explicitly_set_zero_counts_as_present() {
    let mut dynamic = new_message("test.Scalars");
    dynamic.try_set_field_by_name("int32", Value::I32(0)).unwrap();

    assert!(dynamic.has_field_by_name("int32"));
    dynamic.clear_field_by_name("int32");
    assert!(!dynamic.has_field_by_name("int32"));
}

#[test]
fn custom_defaults_are_returned_for_unset_fields() {
    let dynamic = new_message("test.Defaulted");

    assert_eq!(
        dynamic.get_field_by_name("greeting").unwrap().as_str(),
        Some("hello")
    );
    assert_eq!(
        dynamic.get_field_by_name("color").unwrap().as_enum_number(),
        Some(2)
    );
}

#[test]
fn set_field_validates_type() {
    let mut dynamic = new_message("test.Scalars");

    let err = dynamic
        .try_set_field_by_name("double", Value::U32(5))
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::TypeMismatch {
            field: "double".to_owned(),
            expected: "double".to_owned(),
            actual: "uint32".to_owned(),
        }
    );
    assert_eq!(
        err.to_string(),
        "field 'double' expects a value of type 'double', but found 'uint32'"
    );
}

#[test]
fn every_scalar_type_rejects_wrong_kind() {
    let mut dynamic = new_message("test.Scalars");

    // A bool is wrong for every field except `bool`; a string for all but
    // `string`.
    for field in [
        "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32",
        "fixed64", "sfixed32", "sfixed64", "string", "bytes",
    ] {
        let err = dynamic
            .try_set_field_by_name(field, Value::Bool(true))
            .unwrap_err();
        match err {
            SetFieldError::TypeMismatch {
                field: name,
                actual,
                ..
            } => {
                assert_eq!(name, field);
                assert_eq!(actual, "bool");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!dynamic.has_field_by_name(field));
    }

    let err = dynamic
        .try_set_field_by_name("bool", Value::String("true".to_owned()))
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::TypeMismatch {
            field: "bool".to_owned(),
            expected: "bool".to_owned(),
            actual: "string".to_owned(),
        }
    );
}

#[test]
fn unknown_field_is_not_found() {
    let mut dynamic = new_message("test.Scalars");

    assert_eq!(
        dynamic.try_set_field_by_name("missing", Value::I32(1)),
        Err(SetFieldError::NotFound {
            field: "missing".to_owned()
        })
    );
    assert_eq!(
        dynamic.try_set_field_by_number(99, Value::I32(1)),
        Err(SetFieldError::NotFound {
            field: "#99".to_owned()
        })
    );
    assert!(dynamic.get_field_by_name("missing").is_none());
}

#[test]
fn message_field_requires_matching_descriptor() {
    let mut dynamic = new_message("test.ComplexType");

    dynamic
        .try_set_field_by_name("nested", Value::Message(point(1, 2)))
        .unwrap();

    let err = dynamic
        .try_set_field_by_name("nested", Value::Message(new_message("test.Scalars")))
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::MessageTypeMismatch {
            field: "nested".to_owned(),
            expected: "test.Point".to_owned(),
            actual: "test.Scalars".to_owned(),
        }
    );
}

#[test]
fn oneof_members_are_exclusive() {
    let mut dynamic = new_message("test.MessageWithOneof");

    dynamic
        .try_set_field_by_name("foo", Value::String("hi".to_owned()))
        .unwrap();
    assert!(dynamic.has_field_by_name("foo"));

    dynamic.try_set_field_by_name("bar", Value::I32(5)).unwrap();
    assert!(!dynamic.has_field_by_name("foo"));
    assert!(dynamic.has_field_by_name("bar"));

    // Clearing one member does not resurrect another.
    dynamic.clear_field_by_name("bar");
    assert!(!dynamic.has_field_by_name("foo"));
    assert!(!dynamic.has_field_by_name("bar"));
}

#[test]
fn distinct_oneofs_are_independent() {
    let mut dynamic = new_message("test.MessageWithOneof");

    dynamic
        .try_set_field_by_name("foo", Value::String("hi".to_owned()))
        .unwrap();
    dynamic.try_set_field_by_name("on", Value::Bool(true)).unwrap();
    dynamic.try_set_field_by_name("qux", Value::I32(1)).unwrap();

    assert!(dynamic.has_field_by_name("foo"));
    assert!(dynamic.has_field_by_name("on"));

    dynamic
        .try_set_field_by_name("label", Value::String("x".to_owned()))
        .unwrap();
    assert!(dynamic.has_field_by_name("foo"));
    assert!(!dynamic.has_field_by_name("on"));
    assert!(dynamic.has_field_by_name("qux"));
}

#[test]
fn repeated_field_appends_and_validates() {
    let mut dynamic = new_message("test.ScalarArrays");

    dynamic
        .try_add_repeated_by_name("int32", Value::I32(1))
        .unwrap();
    dynamic
        .try_add_repeated_by_name("int32", Value::I32(2))
        .unwrap();
    assert_eq!(
        dynamic.get_field_by_name("int32").unwrap().as_list(),
        Some(&[Value::I32(1), Value::I32(2)][..])
    );

    let err = dynamic
        .try_add_repeated_by_name("int32", Value::String("3".to_owned()))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::TypeMismatch { .. }));

    let err = new_message("test.Scalars")
        .try_add_repeated_by_name("int32", Value::I32(1))
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::NotRepeated {
            field: "int32".to_owned()
        }
    );
}

#[test]
fn set_whole_list_rejects_mixed_kinds() {
    let mut dynamic = new_message("test.ScalarArrays");

    dynamic
        .try_set_field_by_name("int32", Value::List(vec![Value::I32(1), Value::I32(2)]))
        .unwrap();

    let err = dynamic
        .try_set_field_by_name(
            "int32",
            Value::List(vec![Value::I32(1), Value::String("2".to_owned())]),
        )
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::TypeMismatch {
            field: "int32".to_owned(),
            expected: "int32".to_owned(),
            actual: "string".to_owned(),
        }
    );
    // The failed set did not disturb the previous value.
    assert_eq!(
        dynamic.get_field_by_name("int32").unwrap().as_list(),
        Some(&[Value::I32(1), Value::I32(2)][..])
    );
}

#[test]
fn map_entries_are_unique_by_key() {
    let mut dynamic = new_message("test.ComplexType");

    dynamic
        .try_set_map_entry_by_name(
            "string_map",
            MapKey::String("k".to_owned()),
            Value::String("v1".to_owned()),
        )
        .unwrap();
    dynamic
        .try_set_map_entry_by_name(
            "string_map",
            MapKey::String("k".to_owned()),
            Value::String("v2".to_owned()),
        )
        .unwrap();

    let map = dynamic.get_field_by_name("string_map").unwrap();
    let map = map.as_map().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(
        map.get(&MapKey::String("k".to_owned())).unwrap().as_str(),
        Some("v2")
    );
}

#[test]
fn map_operations_validate_kinds() {
    let mut dynamic = new_message("test.ComplexType");

    let err = dynamic
        .try_set_map_entry_by_name(
            "int_map",
            MapKey::String("1".to_owned()),
            Value::String("one".to_owned()),
        )
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::InvalidMapKeyType {
            field: "int_map".to_owned(),
            expected: "int32".to_owned(),
            actual: "string".to_owned(),
        }
    );

    let err = dynamic
        .try_set_map_entry_by_name("int_map", MapKey::I32(1), Value::I32(1))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::TypeMismatch { .. }));

    let err = dynamic
        .try_set_map_entry_by_name(
            "nested",
            MapKey::String("k".to_owned()),
            Value::String("v".to_owned()),
        )
        .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::NotMap {
            field: "nested".to_owned()
        }
    );
}

#[test]
fn enum_fields_accept_numbers_and_known_names() {
    let mut dynamic = new_message("test.ComplexType");

    dynamic
        .try_set_field_by_name("color", Value::EnumNumber(1))
        .unwrap();
    assert_eq!(
        dynamic.get_field_by_name("color").unwrap().as_enum_number(),
        Some(1)
    );

    dynamic
        .try_set_field_by_name("color", Value::EnumName("COLOR_BLUE".to_owned()))
        .unwrap();
    assert_eq!(
        dynamic.get_field_by_name("color").unwrap().as_enum_name(),
        Some("COLOR_BLUE")
    );

    // Unknown numeric values are preserved per proto3 open enums.
    dynamic
        .try_set_field_by_name("color", Value::EnumNumber(42))
        .unwrap();

    let err = dynamic
        .try_set_field_by_name("color", Value::EnumName("MAGENTA".to_owned()))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::TypeMismatch { .. }));
}

#[test]
fn enum_forms_are_distinct_in_equality() {
    let mut by_number = new_message("test.ComplexType");
    by_number
        .try_set_field_by_name("color", Value::EnumNumber(1))
        .unwrap();

    let mut by_name = new_message("test.ComplexType");
    by_name
        .try_set_field_by_name("color", Value::EnumName("COLOR_RED".to_owned()))
        .unwrap();

    assert_ne!(by_number, by_name);
}

#[test]
fn equality_ignores_map_ordering() {
    let mut a = new_message("test.ComplexType");
    let mut b = new_message("test.ComplexType");

    for (key, value) in [("one", 1), ("two", 2), ("three", 3)] {
        a.try_set_map_entry_by_name(
            "string_map",
            MapKey::String(key.to_owned()),
            Value::String(value.to_string()),
        )
        .unwrap();
    }
    for (key, value) in [("three", 3), ("one", 1), ("two", 2)] {
        b.try_set_map_entry_by_name(
            "string_map",
            MapKey::String(key.to_owned()),
            Value::String(value.to_string()),
        )
        .unwrap();
    }

    assert_eq!(a, b);
}

#[test]
fn repeated_fields_compare_in_order() {
    let mut a = new_message("test.ScalarArrays");
    let mut b = new_message("test.ScalarArrays");

    a.try_set_field_by_name("int32", Value::List(vec![Value::I32(1), Value::I32(2)]))
        .unwrap();
    b.try_set_field_by_name("int32", Value::List(vec![Value::I32(2), Value::I32(1)]))
        .unwrap();

    assert_ne!(a, b);
}

#[test]
fn clone_is_deep() {
    let mut original = new_message("test.ComplexType");
    original
        .try_set_field_by_name("nested", Value::Message(point(1, 2)))
        .unwrap();
    original
        .try_add_repeated_by_name("points", Value::Message(point(3, 4)))
        .unwrap();
    original
        .try_set_map_entry_by_name(
            "point_map",
            MapKey::String("origin".to_owned()),
            Value::Message(point(0, 0)),
        )
        .unwrap();

    let mut clone = original.clone();
    assert_eq!(original, clone);

    clone
        .get_field_mut_by_name("nested")
        .unwrap()
        .as_message_mut()
        .unwrap()
        .try_set_field_by_name("x", Value::I32(99))
        .unwrap();
    clone
        .try_add_repeated_by_name("points", Value::Message(point(5, 6)))
        .unwrap();
    clone
        .try_set_map_entry_by_name(
            "point_map",
            MapKey::String("origin".to_owned()),
            Value::Message(point(7, 7)),
        )
        .unwrap();

    assert_ne!(original, clone);
    assert_eq!(
        original
            .get_field_by_name("nested")
            .unwrap()
            .as_message()
            .unwrap()
            .get_field_by_name("x")
            .unwrap()
            .as_i32(),
        Some(1)
    );
    assert_eq!(
        original.get_field_by_name("points").unwrap().as_list().unwrap().len(),
        1
    );
    assert_eq!(
        original
            .get_field_by_name("point_map")
            .unwrap()
            .as_map()
            .unwrap()
            .get(&MapKey::String("origin".to_owned()))
            .unwrap()
            .as_message()
            .unwrap()
            .get_field_by_name("x")
            .unwrap()
            .as_i32(),
        Some(0)
    );
}

#[test]
fn with_fields_seeds_by_name_and_number() {
    let dynamic = DynamicMessage::with_fields(
        message_desc("test.Point"),
        [("x", Value::I32(3)), ("y", Value::I32(4))],
    )
    .unwrap();
    assert_eq!(dynamic.get_field_by_name("x").unwrap().as_i32(), Some(3));

    let dynamic = DynamicMessage::with_fields(
        message_desc("test.Point"),
        [(1u32, Value::I32(5)), (2u32, Value::I32(6))],
    )
    .unwrap();
    assert_eq!(dynamic.get_field_by_name("y").unwrap().as_i32(), Some(6));
}

#[test]
fn with_fields_aborts_on_first_failure() {
    let err = DynamicMessage::with_fields(
        message_desc("test.Point"),
        [
            ("x", Value::I32(3)),
            ("y", Value::String("4".to_owned())),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, SetFieldError::TypeMismatch { .. }));

    let err = DynamicMessage::with_fields(
        message_desc("test.Point"),
        [("missing", Value::I32(3))],
    )
    .unwrap_err();
    assert_eq!(
        err,
        SetFieldError::NotFound {
            field: "missing".to_owned()
        }
    );
}

#[test]
fn take_field_clears_and_returns() {
    let mut dynamic = new_message("test.Scalars");
    dynamic.try_set_field_by_name("int32", Value::I32(7)).unwrap();

    assert_eq!(dynamic.take_field_by_name("int32"), Some(Value::I32(7)));
    assert!(!dynamic.has_field_by_name("int32"));
    assert_eq!(dynamic.take_field_by_name("int32"), None);
}

#[test]
fn fields_iterates_in_number_order() {
    let mut dynamic = new_message("test.Scalars");
    dynamic.try_set_field_by_name("string", Value::String("s".to_owned())).unwrap();
    dynamic.try_set_field_by_name("int32", Value::I32(1)).unwrap();
    dynamic.try_set_field_by_name("double", Value::F64(0.5)).unwrap();

    let numbers: Vec<u32> = dynamic.fields().map(|(field, _)| field.number()).collect();
    assert_eq!(numbers, vec![1, 3, 14]);
}

#[test]
fn clear_resets_everything() {
    let mut dynamic = new_message("test.ComplexType");
    dynamic
        .try_set_field_by_name("nested", Value::Message(point(1, 2)))
        .unwrap();
    dynamic
        .try_set_map_entry_by_name(
            "string_map",
            MapKey::String("k".to_owned()),
            Value::String("v".to_owned()),
        )
        .unwrap();

    dynamic.clear();
    assert!(!dynamic.has_field_by_name("nested"));
    assert!(!dynamic.has_field_by_name("string_map"));
    assert_eq!(dynamic, new_message("test.ComplexType"));
}

#[test]
fn whole_map_set_validates_entries() {
    let mut dynamic = new_message("test.ComplexType");

    let mut entries = HashMap::new();
    entries.insert(MapKey::I32(1), Value::String("one".to_owned()));
    dynamic
        .try_set_field_by_name("int_map", Value::Map(entries))
        .unwrap();

    let mut bad = HashMap::new();
    bad.insert(MapKey::String("1".to_owned()), Value::String("one".to_owned()));
    let err = dynamic
        .try_set_field_by_name("int_map", Value::Map(bad))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidMapKeyType { .. }));
}
