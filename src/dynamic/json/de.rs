use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use serde_json::Value as JsonValue;

use crate::{
    descriptor::{FieldDescriptor, FieldType, MessageDescriptor},
    dynamic::{DynamicMessage, MapKey, Value},
};

use super::{case::to_json_name, json_type_name, DeserializeOptions, JsonError};

pub(super) fn deserialize_message(
    desc: MessageDescriptor,
    json: &JsonValue,
    options: &DeserializeOptions,
) -> Result<DynamicMessage, JsonError> {
    let object = match json {
        JsonValue::Object(object) => object,
        other => {
            return Err(JsonError::InvalidJsonStructure {
                expected: "Object".to_owned(),
                actual: json_type_name(other).to_owned(),
            })
        }
    };

    let mut message = DynamicMessage::new(desc);
    for (key, value) in object {
        let field = find_field(message.descriptor(), key);
        match field {
            Some(field) => {
                if let Some(value) = parse_field(&field, value, options)? {
                    // Values built here are already typed for the field, so
                    // they go straight into storage; this keeps oneof
                    // clearing in one place.
                    message.fields.set(&field, value);
                }
            }
            None if options.denies_unknown_fields() => {
                return Err(JsonError::UnknownField {
                    field: key.clone(),
                    message: message.descriptor().full_name().to_owned(),
                });
            }
            None => continue,
        }
    }

    Ok(message)
}

/// Matches an object key against the field's proto name, declared JSON name,
/// and generated lowerCamelCase name, in that order.
fn find_field(desc: &MessageDescriptor, key: &str) -> Option<FieldDescriptor> {
    desc.get_field_by_name(key)
        .or_else(|| desc.get_field_by_json_name(key))
        .or_else(|| desc.get_field_by_json_name(&to_json_name(key)))
}

fn parse_field(
    field: &FieldDescriptor,
    json: &JsonValue,
    options: &DeserializeOptions,
) -> Result<Option<Value>, JsonError> {
    // null means "use the default", i.e. leave the field unset.
    if json.is_null() {
        return Ok(None);
    }

    if field.is_map() {
        let object = match json {
            JsonValue::Object(object) => object,
            other => return Err(mismatch(field, "a map object", other)),
        };
        let entry_info = field.map_entry().expect("map field has entry info");
        let mut entries = std::collections::HashMap::with_capacity(object.len());
        for (key, value) in object {
            let key = parse_map_key(field, entry_info.key_type(), key)?;
            let value = parse_single(
                field,
                entry_info.value_type(),
                entry_info.value_type_name(),
                value,
                options,
            )?;
            entries.insert(key, value);
        }
        Ok(Some(Value::Map(entries)))
    } else if field.is_list() {
        let array = match json {
            JsonValue::Array(array) => array,
            other => return Err(mismatch(field, "an array", other)),
        };
        let mut elements = Vec::with_capacity(array.len());
        for element in array {
            elements.push(parse_single(
                field,
                field.field_type(),
                field.type_name(),
                element,
                options,
            )?);
        }
        Ok(Some(Value::List(elements)))
    } else {
        parse_single(field, field.field_type(), field.type_name(), json, options).map(Some)
    }
}

fn parse_single(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    json: &JsonValue,
    options: &DeserializeOptions,
) -> Result<Value, JsonError> {
    match ty {
        FieldType::Double => parse_f64(field, json).map(Value::F64),
        FieldType::Float => {
            let value = parse_f64(field, json)?;
            if value.is_finite() && (value < f64::from(f32::MIN) || value > f64::from(f32::MAX)) {
                return Err(JsonError::NumberOutOfRange {
                    field: field.name().to_owned(),
                    value: value.to_string(),
                });
            }
            Ok(Value::F32(value as f32))
        }
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => {
            parse_int(field, json, i64::from(i32::MIN)..=i64::from(i32::MAX))
                .map(|value| Value::I32(value as i32))
        }
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => {
            parse_int(field, json, i64::MIN..=i64::MAX).map(Value::I64)
        }
        FieldType::Uint32 | FieldType::Fixed32 => {
            parse_uint(field, json, u64::from(u32::MAX)).map(|value| Value::U32(value as u32))
        }
        FieldType::Uint64 | FieldType::Fixed64 => {
            parse_uint(field, json, u64::MAX).map(Value::U64)
        }
        FieldType::Bool => match json {
            JsonValue::Bool(value) => Ok(Value::Bool(*value)),
            other => Err(mismatch(field, "a boolean", other)),
        },
        FieldType::String => match json {
            JsonValue::String(value) => Ok(Value::String(value.clone())),
            other => Err(mismatch(field, "a string", other)),
        },
        FieldType::Bytes => match json {
            JsonValue::String(value) => parse_base64(field, value).map(Value::Bytes),
            other => Err(mismatch(field, "a base64 string", other)),
        },
        FieldType::Enum => parse_enum(field, type_name, json),
        FieldType::Message => {
            let desc = field
                .parent_message()
                .parent_pool()
                .get_message_by_name(type_name.unwrap_or_default())
                .ok_or_else(|| JsonError::InvalidFieldType {
                    field: field.name().to_owned(),
                    type_name: type_name.unwrap_or_default().to_owned(),
                })?;
            deserialize_message(desc, json, options).map(Value::Message)
        }
        FieldType::Group => Err(JsonError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        }),
    }
}

/// Enum fields accept the numeric tag or the value name; whichever form
/// arrived is stored verbatim so re-serialization reproduces it.
fn parse_enum(
    field: &FieldDescriptor,
    type_name: Option<&str>,
    json: &JsonValue,
) -> Result<Value, JsonError> {
    match json {
        JsonValue::Number(_) => {
            let number = parse_int(field, json, i64::from(i32::MIN)..=i64::from(i32::MAX))?;
            Ok(Value::EnumNumber(number as i32))
        }
        JsonValue::String(name) => {
            let enum_ty = field
                .parent_message()
                .parent_pool()
                .get_enum_by_name(type_name.unwrap_or_default())
                .ok_or_else(|| JsonError::InvalidFieldType {
                    field: field.name().to_owned(),
                    type_name: type_name.unwrap_or_default().to_owned(),
                })?;
            if enum_ty.get_value_by_name(name).is_none() {
                return Err(JsonError::ValueTypeMismatch {
                    field: field.name().to_owned(),
                    expected: format!("a value of enum '{}'", enum_ty.full_name()),
                    actual: format!("'{}'", name),
                });
            }
            Ok(Value::EnumName(name.clone()))
        }
        other => Err(mismatch(field, "an enum number or name", other)),
    }
}

fn parse_int(
    field: &FieldDescriptor,
    json: &JsonValue,
    range: std::ops::RangeInclusive<i64>,
) -> Result<i64, JsonError> {
    let value = match json {
        JsonValue::Number(number) => {
            if let Some(value) = number.as_i64() {
                value
            } else if let Some(value) = number.as_u64() {
                return Err(out_of_range(field, value));
            } else {
                let float = number.as_f64().expect("number is i64, u64 or f64");
                integral_float(field, float)?;
                if float < *range.start() as f64 || float > *range.end() as f64 {
                    return Err(out_of_range(field, float));
                }
                float as i64
            }
        }
        JsonValue::String(text) => {
            let wide: i128 = text.parse().map_err(|_| JsonError::InvalidNumberFormat {
                field: field.name().to_owned(),
                value: text.clone(),
            })?;
            match i64::try_from(wide) {
                Ok(value) => value,
                Err(_) => return Err(out_of_range(field, wide)),
            }
        }
        other => return Err(mismatch(field, "an integer or decimal string", other)),
    };

    if range.contains(&value) {
        Ok(value)
    } else {
        Err(out_of_range(field, value))
    }
}

fn parse_uint(field: &FieldDescriptor, json: &JsonValue, max: u64) -> Result<u64, JsonError> {
    let value = match json {
        JsonValue::Number(number) => {
            if let Some(value) = number.as_u64() {
                value
            } else if let Some(value) = number.as_i64() {
                return Err(out_of_range(field, value));
            } else {
                let float = number.as_f64().expect("number is i64, u64 or f64");
                integral_float(field, float)?;
                if float < 0.0 || float > max as f64 {
                    return Err(out_of_range(field, float));
                }
                float as u64
            }
        }
        JsonValue::String(text) => {
            let wide: i128 = text.parse().map_err(|_| JsonError::InvalidNumberFormat {
                field: field.name().to_owned(),
                value: text.clone(),
            })?;
            match u64::try_from(wide) {
                Ok(value) => value,
                Err(_) => return Err(out_of_range(field, wide)),
            }
        }
        other => return Err(mismatch(field, "an unsigned integer or decimal string", other)),
    };

    if value <= max {
        Ok(value)
    } else {
        Err(out_of_range(field, value))
    }
}

fn parse_f64(field: &FieldDescriptor, json: &JsonValue) -> Result<f64, JsonError> {
    match json {
        JsonValue::Number(number) => {
            Ok(number.as_f64().expect("number is representable as f64"))
        }
        JsonValue::String(text) => match text.as_str() {
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            "NaN" => Ok(f64::NAN),
            _ => text.parse().map_err(|_| JsonError::InvalidNumberFormat {
                field: field.name().to_owned(),
                value: text.clone(),
            }),
        },
        other => Err(mismatch(field, "a number or numeric string", other)),
    }
}

fn integral_float(field: &FieldDescriptor, value: f64) -> Result<(), JsonError> {
    if value.fract() != 0.0 {
        return Err(JsonError::InvalidNumberFormat {
            field: field.name().to_owned(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn parse_base64(field: &FieldDescriptor, text: &str) -> Result<prost::bytes::Bytes, JsonError> {
    match STANDARD.decode(text) {
        Ok(bytes) => Ok(bytes.into()),
        // Tolerate the URL-safe alphabet, which some emitters produce.
        Err(_) => match URL_SAFE.decode(text) {
            Ok(bytes) => Ok(bytes.into()),
            Err(err) => Err(JsonError::InvalidBase64 {
                field: field.name().to_owned(),
                cause: err.to_string(),
            }),
        },
    }
}

/// Map keys arrive as JSON strings and parse by the declared key type.
fn parse_map_key(
    field: &FieldDescriptor,
    key_type: FieldType,
    text: &str,
) -> Result<MapKey, JsonError> {
    fn int_key<T: TryFrom<i128>>(
        field: &FieldDescriptor,
        text: &str,
    ) -> Result<T, JsonError> {
        let wide: i128 = text.parse().map_err(|_| JsonError::InvalidNumberFormat {
            field: field.name().to_owned(),
            value: text.to_owned(),
        })?;
        T::try_from(wide).map_err(|_| JsonError::NumberOutOfRange {
            field: field.name().to_owned(),
            value: text.to_owned(),
        })
    }

    match key_type {
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => {
            int_key(field, text).map(MapKey::I32)
        }
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => {
            int_key(field, text).map(MapKey::I64)
        }
        FieldType::Uint32 | FieldType::Fixed32 => int_key(field, text).map(MapKey::U32),
        FieldType::Uint64 | FieldType::Fixed64 => int_key(field, text).map(MapKey::U64),
        FieldType::Bool => match text {
            "true" => Ok(MapKey::Bool(true)),
            "false" => Ok(MapKey::Bool(false)),
            _ => Err(JsonError::ValueTypeMismatch {
                field: field.name().to_owned(),
                expected: "a 'true' or 'false' key".to_owned(),
                actual: format!("'{}'", text),
            }),
        },
        FieldType::String => Ok(MapKey::String(text.to_owned())),
        _ => unreachable!("invalid type for map key"),
    }
}

fn mismatch(field: &FieldDescriptor, expected: &str, actual: &JsonValue) -> JsonError {
    JsonError::ValueTypeMismatch {
        field: field.name().to_owned(),
        expected: expected.to_owned(),
        actual: json_type_name(actual).to_owned(),
    }
}

fn out_of_range(field: &FieldDescriptor, value: impl std::fmt::Display) -> JsonError {
    JsonError::NumberOutOfRange {
        field: field.name().to_owned(),
        value: value.to_string(),
    }
}
