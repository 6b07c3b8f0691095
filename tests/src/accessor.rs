use prost_dynamic::{bytes::Bytes, MapKey, SetFieldError, Value};

use crate::{new_message, point};

#[test]
fn view_returns_typed_values() {
    let mut dynamic = new_message("test.Scalars");
    {
        let mut view = dynamic.view_mut();
        view.set_f64("double", 1.5).unwrap();
        view.set_i32("int32", -3).unwrap();
        view.set_u64("uint64", 9).unwrap();
        view.set_bool("bool", true).unwrap();
        view.set_string("string", "hi").unwrap();
        view.set_bytes("bytes", Bytes::from_static(b"b")).unwrap();
    }

    let view = dynamic.view();
    assert_eq!(view.get_f64("double"), Some(1.5));
    assert_eq!(view.get_i32("int32"), Some(-3));
    assert_eq!(view.get_u64("uint64"), Some(9));
    assert_eq!(view.get_bool("bool"), Some(true));
    assert_eq!(view.get_string("string"), Some("hi"));
    assert_eq!(view.get_bytes("bytes"), Some(&Bytes::from_static(b"b")));

    // Fields are addressable by number as well.
    assert_eq!(view.get_i32(3u32), Some(-3));
    assert_eq!(view.get_string(14u32), Some("hi"));
}

#[test]
fn view_is_absent_for_unset_fields_and_kind_mismatches() {
    let mut dynamic = new_message("test.Scalars");
    dynamic.view_mut().set_i32("int32", 5).unwrap();

    let view = dynamic.view();
    // Unset fields are absent, even though a default exists.
    assert_eq!(view.get_i64("int64"), None);
    // Kind mismatches are absent rather than an error.
    assert_eq!(view.get_string("int32"), None);
    assert_eq!(view.get_i64("int32"), None);
    // So are unknown fields.
    assert_eq!(view.get_i32("missing"), None);
}

#[test]
fn view_reads_messages_lists_and_maps() {
    let mut dynamic = new_message("test.ComplexType");
    {
        let mut view = dynamic.view_mut();
        view.set_message("nested", point(1, 2)).unwrap();
        view.add("points", Value::Message(point(3, 4))).unwrap();
        view.insert(
            "string_map",
            MapKey::String("a".to_owned()),
            Value::String("1".to_owned()),
        )
        .unwrap();
        view.insert(
            "point_map",
            MapKey::String("origin".to_owned()),
            Value::Message(point(0, 0)),
        )
        .unwrap();
        view.set_enum_name("color", "COLOR_BLUE").unwrap();
    }

    let view = dynamic.view();
    assert_eq!(view.get_message("nested").unwrap().view().get_i32("x"), Some(1));
    assert_eq!(view.get_list("points").unwrap().len(), 1);
    assert_eq!(view.get_map("string_map").unwrap().len(), 1);
    assert_eq!(view.get_enum_name("color"), Some("COLOR_BLUE"));
    assert_eq!(view.get_enum_number("color"), None);

    let string_map = view.get_string_map("string_map").unwrap();
    assert_eq!(string_map.get("a").copied(), Some("1"));

    let point_map = view.get_message_map("point_map").unwrap();
    assert_eq!(
        point_map[&MapKey::String("origin".to_owned())]
            .view()
            .get_i32("y"),
        Some(0)
    );

    // A map of messages is not a map of strings.
    assert_eq!(view.get_string_map("point_map"), None);
}

#[test]
fn string_list_getter_requires_uniform_elements() {
    let mut dynamic = new_message("test.ScalarArrays");
    {
        let mut view = dynamic.view_mut();
        view.add("string", Value::String("a".to_owned())).unwrap();
        view.add("string", Value::String("b".to_owned())).unwrap();
    }

    assert_eq!(
        dynamic.view().get_string_list("string"),
        Some(vec!["a", "b"])
    );
    assert_eq!(dynamic.view().get_string_list("int32"), None);
}

#[test]
fn mutable_view_reports_failures() {
    let mut dynamic = new_message("test.Scalars");
    let mut view = dynamic.view_mut();

    assert_eq!(
        view.set_i32("missing", 1),
        Err(SetFieldError::NotFound {
            field: "missing".to_owned()
        })
    );
    assert!(matches!(
        view.set_string("int32", "5"),
        Err(SetFieldError::TypeMismatch { .. })
    ));
    assert!(matches!(
        view.add("int32", Value::I32(1)),
        Err(SetFieldError::NotRepeated { .. })
    ));
}

#[test]
fn mutable_view_clears_fields() {
    let mut dynamic = new_message("test.Scalars");
    dynamic.view_mut().set_i32("int32", 5).unwrap();
    assert!(dynamic.has_field_by_name("int32"));

    dynamic.view_mut().clear("int32").unwrap();
    assert!(!dynamic.has_field_by_name("int32"));

    assert_eq!(
        dynamic.view_mut().clear("missing"),
        Err(SetFieldError::NotFound {
            field: "missing".to_owned()
        })
    );
}
