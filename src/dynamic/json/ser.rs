use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    descriptor::{FieldDescriptor, FieldType},
    dynamic::{DynamicMessage, MapKey, Value},
};

use super::{JsonError, SerializeOptions};

pub(super) fn serialize_message(
    message: &DynamicMessage,
    options: &SerializeOptions,
) -> Result<Map<String, JsonValue>, JsonError> {
    let desc = message.descriptor();
    let mut object = Map::new();

    for field in desc.fields() {
        let populated = message.has_field(&field);
        if !populated && !options.unpopulated() {
            continue;
        }

        let json = if populated {
            let value = message.get_field(&field);
            field_to_json(&field, &value, options)?
        } else {
            match unpopulated_to_json(&field) {
                Some(json) => json,
                None => continue,
            }
        };

        let name = if options.proto_field_names() {
            field.name()
        } else {
            field.json_name()
        };
        object.insert(name.to_owned(), json);
    }

    Ok(object)
}

fn field_to_json(
    field: &FieldDescriptor,
    value: &Value,
    options: &SerializeOptions,
) -> Result<JsonValue, JsonError> {
    if field.is_group() {
        return Err(JsonError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        });
    }
    value_to_json(value, options)
}

fn value_to_json(value: &Value, options: &SerializeOptions) -> Result<JsonValue, JsonError> {
    match value {
        Value::Bool(value) => Ok(JsonValue::Bool(*value)),
        Value::I32(value) => Ok(JsonValue::Number(Number::from(*value))),
        Value::U32(value) => Ok(JsonValue::Number(Number::from(*value))),
        // 64-bit integers carry their decimal representation as a string, to
        // survive JSON implementations that read all numbers as doubles.
        Value::I64(value) => Ok(JsonValue::String(value.to_string())),
        Value::U64(value) => Ok(JsonValue::String(value.to_string())),
        Value::F32(value) => Ok(float_to_json(f64::from(*value))),
        Value::F64(value) => Ok(float_to_json(*value)),
        Value::String(value) => Ok(JsonValue::String(value.clone())),
        Value::Bytes(value) => Ok(JsonValue::String(STANDARD.encode(value))),
        Value::EnumNumber(number) => Ok(JsonValue::Number(Number::from(*number))),
        Value::EnumName(name) => Ok(JsonValue::String(name.clone())),
        Value::Message(message) => {
            serialize_message(message, options).map(JsonValue::Object)
        }
        Value::List(values) => {
            let mut array = Vec::with_capacity(values.len());
            for value in values {
                array.push(value_to_json(value, options)?);
            }
            Ok(JsonValue::Array(array))
        }
        Value::Map(entries) => {
            // Entries are sorted by key so that output is deterministic.
            let mut entries: Vec<_> = entries.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            let mut object = Map::new();
            for (key, value) in entries {
                object.insert(map_key_to_string(key), value_to_json(value, options)?);
            }
            Ok(JsonValue::Object(object))
        }
    }
}

fn unpopulated_to_json(field: &FieldDescriptor) -> Option<JsonValue> {
    if field.is_map() {
        return Some(JsonValue::Object(Map::new()));
    }
    if field.is_repeated() {
        return Some(JsonValue::Array(Vec::new()));
    }

    if let Some(default) = field.default_value() {
        return value_to_json(default, &SerializeOptions::new()).ok();
    }
    match field.field_type() {
        FieldType::Double | FieldType::Float => Some(float_to_json(0.0)),
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 | FieldType::Uint32
        | FieldType::Fixed32 | FieldType::Enum => Some(JsonValue::Number(Number::from(0))),
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 | FieldType::Uint64
        | FieldType::Fixed64 => Some(JsonValue::String("0".to_owned())),
        FieldType::Bool => Some(JsonValue::Bool(false)),
        FieldType::String => Some(JsonValue::String(String::new())),
        FieldType::Bytes => Some(JsonValue::String(String::new())),
        // An unset message field has no JSON default form; groups have no
        // JSON mapping at all.
        FieldType::Message | FieldType::Group => None,
    }
}

fn float_to_json(value: f64) -> JsonValue {
    if value == f64::INFINITY {
        JsonValue::String("Infinity".to_owned())
    } else if value == f64::NEG_INFINITY {
        JsonValue::String("-Infinity".to_owned())
    } else if value.is_nan() {
        JsonValue::String("NaN".to_owned())
    } else {
        JsonValue::Number(Number::from_f64(value).expect("value is finite"))
    }
}

fn map_key_to_string(key: &MapKey) -> String {
    match key {
        MapKey::Bool(value) => value.to_string(),
        MapKey::I32(value) => value.to_string(),
        MapKey::I64(value) => value.to_string(),
        MapKey::U32(value) => value.to_string(),
        MapKey::U64(value) => value.to_string(),
        MapKey::String(value) => value.clone(),
    }
}
