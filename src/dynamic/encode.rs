use prost::{
    bytes::BufMut,
    encoding::{encode_varint, encoded_len_varint},
};

use crate::{
    descriptor::{FieldDescriptor, FieldType, MAP_ENTRY_KEY_NUMBER, MAP_ENTRY_VALUE_NUMBER},
    wire::{self, WireError, WireType},
};

use super::{DynamicMessage, Value};

/// Options to control binary encoding of messages.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    use_packed_repeated: bool,
    recursion_limit: u32,
    size_limit: usize,
}

impl EncodeOptions {
    /// Creates an instance of [`EncodeOptions`] with the default options.
    pub const fn new() -> Self {
        EncodeOptions {
            use_packed_repeated: true,
            recursion_limit: 100,
            size_limit: usize::MAX,
        }
    }

    /// Whether to use the packed encoding for repeated scalar fields.
    ///
    /// Length-delimited types (string, bytes, message) are never packed.
    /// The default value is `true`.
    pub const fn use_packed_repeated(mut self, yes: bool) -> Self {
        self.use_packed_repeated = yes;
        self
    }

    /// How deeply messages may nest before encoding fails with
    /// [`WireError::NestingTooDeep`]. The default value is `100`.
    pub const fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// The maximum encoded size before encoding fails with
    /// [`WireError::MessageTooLarge`]. Unlimited by default.
    pub const fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMessage {
    /// Encodes this message to the proto3 binary wire format with the
    /// default options.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, WireError> {
        self.encode_with_options(&EncodeOptions::new())
    }

    /// Encodes this message to the proto3 binary wire format.
    ///
    /// Fields are emitted in ascending field-number order, followed by any
    /// preserved unknown fields verbatim.
    pub fn encode_with_options(&self, options: &EncodeOptions) -> Result<Vec<u8>, WireError> {
        let len = message_len(self, options, options.recursion_limit)?;
        if len > options.size_limit {
            return Err(WireError::MessageTooLarge);
        }
        let mut buf = Vec::with_capacity(len);
        encode_message(self, &mut buf, options, options.recursion_limit)?;
        Ok(buf)
    }
}

fn enter_message(limit: u32) -> Result<u32, WireError> {
    limit.checked_sub(1).ok_or(WireError::NestingTooDeep)
}

fn message_len(
    message: &DynamicMessage,
    options: &EncodeOptions,
    limit: u32,
) -> Result<usize, WireError> {
    let limit = enter_message(limit)?;
    let mut len = 0;
    for (field, value) in message.fields() {
        len += field_len(&field, value, options, limit)?;
    }
    Ok(len + message.unknown_fields().len())
}

fn encode_message(
    message: &DynamicMessage,
    buf: &mut impl BufMut,
    options: &EncodeOptions,
    limit: u32,
) -> Result<(), WireError> {
    let limit = enter_message(limit)?;
    for (field, value) in message.fields() {
        encode_field(&field, value, buf, options, limit)?;
    }
    buf.put_slice(message.unknown_fields());
    Ok(())
}

fn key_len(number: u32, wire_type: WireType) -> usize {
    encoded_len_varint(wire::make_tag(number, wire_type))
}

fn encode_key(number: u32, wire_type: WireType, buf: &mut impl BufMut) {
    encode_varint(wire::make_tag(number, wire_type), buf);
}

fn field_len(
    field: &FieldDescriptor,
    value: &Value,
    options: &EncodeOptions,
    limit: u32,
) -> Result<usize, WireError> {
    if field.is_group() {
        return Err(WireError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        });
    }

    match value {
        Value::Map(entries) if field.is_map() => {
            let entry_info = field.map_entry().expect("map field has entry info");
            let mut len = 0;
            for (key, value) in entries {
                let key_value = Value::from(key.clone());
                let inner = single_len(
                    field,
                    MAP_ENTRY_KEY_NUMBER,
                    entry_info.key_type(),
                    None,
                    &key_value,
                    options,
                    limit,
                )? + single_len(
                    field,
                    MAP_ENTRY_VALUE_NUMBER,
                    entry_info.value_type(),
                    entry_info.value_type_name(),
                    value,
                    options,
                    limit,
                )?;
                len += key_len(field.number(), WireType::LengthDelimited)
                    + encoded_len_varint(inner as u64)
                    + inner;
            }
            Ok(len)
        }
        Value::List(values) if field.is_list() => {
            if values.is_empty() {
                return Ok(0);
            }
            if options.use_packed_repeated && field.is_packable() {
                let mut payload = 0;
                for value in values {
                    payload += scalar_payload_len(
                        field,
                        field.field_type(),
                        field.type_name(),
                        value,
                        options,
                        limit,
                    )?;
                }
                Ok(key_len(field.number(), WireType::LengthDelimited)
                    + encoded_len_varint(payload as u64)
                    + payload)
            } else {
                let mut len = 0;
                for value in values {
                    len += single_len(
                        field,
                        field.number(),
                        field.field_type(),
                        field.type_name(),
                        value,
                        options,
                        limit,
                    )?;
                }
                Ok(len)
            }
        }
        _ => single_len(
            field,
            field.number(),
            field.field_type(),
            field.type_name(),
            value,
            options,
            limit,
        ),
    }
}

fn encode_field(
    field: &FieldDescriptor,
    value: &Value,
    buf: &mut impl BufMut,
    options: &EncodeOptions,
    limit: u32,
) -> Result<(), WireError> {
    if field.is_group() {
        return Err(WireError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        });
    }

    match value {
        Value::Map(entries) if field.is_map() => {
            let entry_info = field.map_entry().expect("map field has entry info");

            // Entries are sorted by key so that output is deterministic.
            let mut entries: Vec<_> = entries.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            for (key, value) in entries {
                let key_value = Value::from(key.clone());
                let inner = single_len(
                    field,
                    MAP_ENTRY_KEY_NUMBER,
                    entry_info.key_type(),
                    None,
                    &key_value,
                    options,
                    limit,
                )? + single_len(
                    field,
                    MAP_ENTRY_VALUE_NUMBER,
                    entry_info.value_type(),
                    entry_info.value_type_name(),
                    value,
                    options,
                    limit,
                )?;

                encode_key(field.number(), WireType::LengthDelimited, buf);
                encode_varint(inner as u64, buf);
                encode_single(
                    field,
                    MAP_ENTRY_KEY_NUMBER,
                    entry_info.key_type(),
                    None,
                    &key_value,
                    buf,
                    options,
                    limit,
                )?;
                encode_single(
                    field,
                    MAP_ENTRY_VALUE_NUMBER,
                    entry_info.value_type(),
                    entry_info.value_type_name(),
                    value,
                    buf,
                    options,
                    limit,
                )?;
            }
            Ok(())
        }
        Value::List(values) if field.is_list() => {
            if values.is_empty() {
                return Ok(());
            }
            if options.use_packed_repeated && field.is_packable() {
                let mut payload = 0;
                for value in values {
                    payload += scalar_payload_len(
                        field,
                        field.field_type(),
                        field.type_name(),
                        value,
                        options,
                        limit,
                    )?;
                }
                encode_key(field.number(), WireType::LengthDelimited, buf);
                encode_varint(payload as u64, buf);
                for value in values {
                    encode_scalar_payload(
                        field,
                        field.field_type(),
                        field.type_name(),
                        value,
                        buf,
                        options,
                        limit,
                    )?;
                }
            } else {
                for value in values {
                    encode_single(
                        field,
                        field.number(),
                        field.field_type(),
                        field.type_name(),
                        value,
                        buf,
                        options,
                        limit,
                    )?;
                }
            }
            Ok(())
        }
        _ => encode_single(
            field,
            field.number(),
            field.field_type(),
            field.type_name(),
            value,
            buf,
            options,
            limit,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_single(
    field: &FieldDescriptor,
    number: u32,
    ty: FieldType,
    type_name: Option<&str>,
    value: &Value,
    buf: &mut impl BufMut,
    options: &EncodeOptions,
    limit: u32,
) -> Result<(), WireError> {
    encode_key(number, ty.wire_type(), buf);
    encode_scalar_payload(field, ty, type_name, value, buf, options, limit)
}

fn single_len(
    field: &FieldDescriptor,
    number: u32,
    ty: FieldType,
    type_name: Option<&str>,
    value: &Value,
    options: &EncodeOptions,
    limit: u32,
) -> Result<usize, WireError> {
    Ok(key_len(number, ty.wire_type())
        + scalar_payload_len(field, ty, type_name, value, options, limit)?)
}

/// Length of a single value's payload, excluding the field key but including
/// the length prefix of length-delimited types.
fn scalar_payload_len(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    value: &Value,
    options: &EncodeOptions,
    limit: u32,
) -> Result<usize, WireError> {
    match (ty, value) {
        (FieldType::Double, Value::F64(_)) | (FieldType::Fixed64, Value::U64(_)) => Ok(8),
        (FieldType::Sfixed64, Value::I64(_)) => Ok(8),
        (FieldType::Float, Value::F32(_)) | (FieldType::Fixed32, Value::U32(_)) => Ok(4),
        (FieldType::Sfixed32, Value::I32(_)) => Ok(4),
        (FieldType::String, Value::String(value)) => {
            Ok(encoded_len_varint(value.len() as u64) + value.len())
        }
        (FieldType::Bytes, Value::Bytes(value)) => {
            Ok(encoded_len_varint(value.len() as u64) + value.len())
        }
        (FieldType::Message, Value::Message(message)) => {
            let inner = message_len(message, options, limit)?;
            Ok(encoded_len_varint(inner as u64) + inner)
        }
        _ => Ok(encoded_len_varint(varint_repr(field, ty, type_name, value)?)),
    }
}

#[allow(clippy::too_many_arguments)]
fn encode_scalar_payload(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    value: &Value,
    buf: &mut impl BufMut,
    options: &EncodeOptions,
    limit: u32,
) -> Result<(), WireError> {
    match (ty, value) {
        (FieldType::Double, Value::F64(value)) => buf.put_f64_le(*value),
        (FieldType::Float, Value::F32(value)) => buf.put_f32_le(*value),
        (FieldType::Fixed64, Value::U64(value)) => buf.put_u64_le(*value),
        (FieldType::Sfixed64, Value::I64(value)) => buf.put_i64_le(*value),
        (FieldType::Fixed32, Value::U32(value)) => buf.put_u32_le(*value),
        (FieldType::Sfixed32, Value::I32(value)) => buf.put_i32_le(*value),
        (FieldType::String, Value::String(value)) => {
            encode_varint(value.len() as u64, buf);
            buf.put_slice(value.as_bytes());
        }
        (FieldType::Bytes, Value::Bytes(value)) => {
            encode_varint(value.len() as u64, buf);
            buf.put_slice(value);
        }
        (FieldType::Message, Value::Message(message)) => {
            let inner = message_len(message, options, limit)?;
            encode_varint(inner as u64, buf);
            encode_message(message, buf, options, limit)?;
        }
        _ => encode_varint(varint_repr(field, ty, type_name, value)?, buf),
    }
    Ok(())
}

/// The varint bit pattern for a value of a varint-group field type.
///
/// Negative `int32`, `int64` and enum values are sign-extended to 64 bits;
/// `sint32`/`sint64` use the ZigZag mapping.
fn varint_repr(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    value: &Value,
) -> Result<u64, WireError> {
    match (ty, value) {
        (FieldType::Int32, Value::I32(value)) => Ok(*value as i64 as u64),
        (FieldType::Int64, Value::I64(value)) => Ok(*value as u64),
        (FieldType::Uint32, Value::U32(value)) => Ok(u64::from(*value)),
        (FieldType::Uint64, Value::U64(value)) => Ok(*value),
        (FieldType::Sint32, Value::I32(value)) => Ok(u64::from(wire::from_sint32(*value))),
        (FieldType::Sint64, Value::I64(value)) => Ok(wire::from_sint64(*value)),
        (FieldType::Bool, Value::Bool(value)) => Ok(u64::from(*value)),
        (FieldType::Enum, Value::EnumNumber(value)) => Ok(*value as i64 as u64),
        (FieldType::Enum, Value::EnumName(name)) => {
            let number = resolve_enum_name(field, type_name, name)?;
            Ok(number as i64 as u64)
        }
        (ty, value) => panic!(
            "mismatch between DynamicMessage value {:?} and type {:?}",
            value, ty
        ),
    }
}

fn resolve_enum_name(
    field: &FieldDescriptor,
    type_name: Option<&str>,
    name: &str,
) -> Result<i32, WireError> {
    let type_name = type_name.unwrap_or_default();
    field
        .parent_message()
        .parent_pool()
        .get_enum_by_name(type_name)
        .and_then(|enum_ty| enum_ty.get_value_by_name(name))
        .map(|value| value.number())
        .ok_or_else(|| WireError::UnsupportedNestedMessage {
            type_name: type_name.to_owned(),
        })
}
