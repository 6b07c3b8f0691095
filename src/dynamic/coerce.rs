//! The single validation path for every mutation of a [`DynamicMessage`].
//!
//! All set operations (`try_set_field`, `try_add_repeated`,
//! `try_set_map_entry`, seeding, and the JSON decoder) funnel through these
//! functions, so the invariants of the value store are enforced in one place.

use crate::descriptor::{FieldDescriptor, FieldType};

use super::{MapKey, SetFieldError, Value};

/// Validates a whole-field value: a list for repeated fields, a map for map
/// fields, and a single value otherwise.
pub(super) fn coerce_field_value(
    field: &FieldDescriptor,
    value: Value,
) -> Result<Value, SetFieldError> {
    if field.is_map() {
        match value {
            Value::Map(entries) => {
                let mut coerced = std::collections::HashMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = coerce_map_key(field, key)?;
                    let value = coerce_map_value(field, value)?;
                    coerced.insert(key, value);
                }
                Ok(Value::Map(coerced))
            }
            other => Err(type_mismatch(field, &other)),
        }
    } else if field.is_list() {
        match value {
            Value::List(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|element| coerce_single(field, field.field_type(), field.type_name(), element))
                    .collect::<Result<_, _>>()?;
                Ok(Value::List(elements))
            }
            other => Err(type_mismatch(field, &other)),
        }
    } else {
        coerce_single(field, field.field_type(), field.type_name(), value)
    }
}

/// Validates one element of a repeated field.
pub(super) fn coerce_repeated_element(
    field: &FieldDescriptor,
    value: Value,
) -> Result<Value, SetFieldError> {
    if !field.is_list() {
        return Err(SetFieldError::NotRepeated {
            field: field.name().to_owned(),
        });
    }
    coerce_single(field, field.field_type(), field.type_name(), value)
}

/// Validates a map key against the field's declared key type.
pub(super) fn coerce_map_key(
    field: &FieldDescriptor,
    key: MapKey,
) -> Result<MapKey, SetFieldError> {
    let entry = field.map_entry().ok_or_else(|| SetFieldError::NotMap {
        field: field.name().to_owned(),
    })?;

    let matches = matches!(
        (entry.key_type(), &key),
        (FieldType::Bool, MapKey::Bool(_))
            | (
                FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32,
                MapKey::I32(_)
            )
            | (
                FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64,
                MapKey::I64(_)
            )
            | (FieldType::Uint32 | FieldType::Fixed32, MapKey::U32(_))
            | (FieldType::Uint64 | FieldType::Fixed64, MapKey::U64(_))
            | (FieldType::String, MapKey::String(_))
    );
    if matches {
        Ok(key)
    } else {
        Err(SetFieldError::InvalidMapKeyType {
            field: field.name().to_owned(),
            expected: entry.key_type().as_str().to_owned(),
            actual: key.type_name().to_owned(),
        })
    }
}

/// Validates a map value against the field's declared value type.
pub(super) fn coerce_map_value(
    field: &FieldDescriptor,
    value: Value,
) -> Result<Value, SetFieldError> {
    let entry = field.map_entry().ok_or_else(|| SetFieldError::NotMap {
        field: field.name().to_owned(),
    })?;
    coerce_single(field, entry.value_type(), entry.value_type_name(), value)
}

fn coerce_single(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    value: Value,
) -> Result<Value, SetFieldError> {
    let ok = match (ty, &value) {
        (FieldType::Double, Value::F64(_)) => true,
        (FieldType::Float, Value::F32(_)) => true,
        (
            FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32,
            Value::I32(_),
        ) => true,
        (
            FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64,
            Value::I64(_),
        ) => true,
        (FieldType::Uint32 | FieldType::Fixed32, Value::U32(_)) => true,
        (FieldType::Uint64 | FieldType::Fixed64, Value::U64(_)) => true,
        (FieldType::Bool, Value::Bool(_)) => true,
        (FieldType::String, Value::String(_)) => true,
        (FieldType::Bytes, Value::Bytes(_)) => true,
        // Unknown numbers are preserved, consistent with proto3 open enums.
        (FieldType::Enum, Value::EnumNumber(_)) => true,
        (FieldType::Enum, Value::EnumName(name)) => {
            let known = type_name
                .and_then(|type_name| {
                    field
                        .parent_message()
                        .parent_pool()
                        .get_enum_by_name(type_name)
                })
                .and_then(|enum_ty| enum_ty.get_value_by_name(name))
                .is_some();
            if !known {
                return Err(SetFieldError::TypeMismatch {
                    field: field.name().to_owned(),
                    expected: type_description(ty, type_name),
                    actual: format!("enum name '{}'", name),
                });
            }
            true
        }
        (FieldType::Message | FieldType::Group, Value::Message(message)) => {
            let expected = type_name.unwrap_or_default();
            if message.descriptor().full_name() != expected {
                return Err(SetFieldError::MessageTypeMismatch {
                    field: field.name().to_owned(),
                    expected: expected.to_owned(),
                    actual: message.descriptor().full_name().to_owned(),
                });
            }
            true
        }
        _ => false,
    };

    if ok {
        Ok(value)
    } else {
        Err(SetFieldError::TypeMismatch {
            field: field.name().to_owned(),
            expected: type_description(ty, type_name),
            actual: value.type_name().to_owned(),
        })
    }
}

fn type_mismatch(field: &FieldDescriptor, value: &Value) -> SetFieldError {
    SetFieldError::TypeMismatch {
        field: field.name().to_owned(),
        expected: expected_description(field),
        actual: value.type_name().to_owned(),
    }
}

/// Describes the declared type of a field, e.g. `repeated int32` or
/// `map<string, example.Inner>`.
pub(super) fn expected_description(field: &FieldDescriptor) -> String {
    if let Some(entry) = field.map_entry() {
        format!(
            "map<{}, {}>",
            entry.key_type().as_str(),
            type_description(entry.value_type(), entry.value_type_name()),
        )
    } else {
        let element = type_description(field.field_type(), field.type_name());
        if field.is_list() {
            format!("repeated {}", element)
        } else {
            element
        }
    }
}

fn type_description(ty: FieldType, type_name: Option<&str>) -> String {
    match type_name {
        Some(name) if ty.is_composite() => name.to_owned(),
        _ => ty.as_str().to_owned(),
    }
}
