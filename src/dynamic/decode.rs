use prost::bytes::Bytes;

use crate::{
    descriptor::{
        FieldDescriptor, FieldType, Kind, MessageDescriptor, MAP_ENTRY_KEY_NUMBER,
        MAP_ENTRY_VALUE_NUMBER,
    },
    wire::{self, WireError, WireType},
};

use super::{DynamicMessage, MapKey, Value};

/// Options to control binary decoding of messages.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    preserve_unknown_fields: bool,
    recursion_limit: u32,
    size_limit: usize,
}

impl DecodeOptions {
    /// Creates an instance of [`DecodeOptions`] with the default options.
    pub const fn new() -> Self {
        DecodeOptions {
            preserve_unknown_fields: true,
            recursion_limit: 100,
            size_limit: usize::MAX,
        }
    }

    /// Whether to retain the bytes of fields not present in the descriptor,
    /// for re-emission when the message is encoded again. When disabled,
    /// unknown fields are skipped and discarded.
    ///
    /// The default value is `true`.
    pub const fn preserve_unknown_fields(mut self, yes: bool) -> Self {
        self.preserve_unknown_fields = yes;
        self
    }

    /// How deeply messages may nest before decoding fails with
    /// [`WireError::NestingTooDeep`]. The default value is `100`.
    pub const fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// The maximum input size before decoding fails with
    /// [`WireError::MessageTooLarge`]. Unlimited by default.
    pub const fn size_limit(mut self, limit: usize) -> Self {
        self.size_limit = limit;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMessage {
    /// Decodes an instance of the message type specified by `desc` from the
    /// proto3 binary wire format, with the default options.
    ///
    /// Empty input yields an empty but valid message.
    pub fn decode(desc: MessageDescriptor, buf: &[u8]) -> Result<Self, WireError> {
        Self::decode_with_options(desc, buf, &DecodeOptions::new())
    }

    /// Decodes an instance of the message type specified by `desc` from the
    /// proto3 binary wire format.
    pub fn decode_with_options(
        desc: MessageDescriptor,
        buf: &[u8],
        options: &DecodeOptions,
    ) -> Result<Self, WireError> {
        if buf.len() > options.size_limit {
            return Err(WireError::MessageTooLarge);
        }
        let mut reader = Reader::new(buf);
        decode_message(desc, &mut reader, options, options.recursion_limit)
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.buf.len()
    }

    fn slice_from(&self, start: usize) -> &'a [u8] {
        &self.buf[start..self.pos]
    }

    fn read_varint(&mut self) -> Result<u64, WireError> {
        let mut value = 0u64;
        for count in 0..10 {
            let byte = match self.buf.get(self.pos) {
                Some(&byte) => byte,
                None => return Err(WireError::TruncatedVarint),
            };
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (count * 7);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::TruncatedVarint)
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if len > self.buf.len() - self.pos {
            return Err(WireError::TruncatedMessage);
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| WireError::TruncatedMessage)?;
        self.read_slice(len)
    }

    fn read_fixed32(&mut self) -> Result<[u8; 4], WireError> {
        let slice = self.read_slice(4)?;
        Ok(slice.try_into().expect("slice has length 4"))
    }

    fn read_fixed64(&mut self) -> Result<[u8; 8], WireError> {
        let slice = self.read_slice(8)?;
        Ok(slice.try_into().expect("slice has length 8"))
    }

    fn skip(&mut self, wire_type: WireType) -> Result<(), WireError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::SixtyFourBit => {
                self.read_slice(8)?;
            }
            WireType::LengthDelimited => {
                self.read_len_prefixed()?;
            }
            WireType::ThirtyTwoBit => {
                self.read_slice(4)?;
            }
            WireType::StartGroup | WireType::EndGroup => {
                unreachable!("group tags are rejected before skipping")
            }
        }
        Ok(())
    }
}

fn decode_message(
    desc: MessageDescriptor,
    reader: &mut Reader<'_>,
    options: &DecodeOptions,
    limit: u32,
) -> Result<DynamicMessage, WireError> {
    let limit = limit.checked_sub(1).ok_or(WireError::NestingTooDeep)?;
    let mut message = DynamicMessage::new(desc);

    while reader.has_remaining() {
        let field_start = reader.pos();
        let tag = reader.read_varint()?;
        let (number, wire_type) = wire::split_tag(tag)?;
        if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
            return Err(WireError::InvalidWireType { tag });
        }

        let field = message.descriptor().get_field(number);
        match field {
            Some(field) => merge_field(&mut message, &field, wire_type, reader, options, limit)?,
            None => {
                reader.skip(wire_type)?;
                if options.preserve_unknown_fields {
                    let bytes = reader.slice_from(field_start);
                    message.append_unknown(bytes);
                }
            }
        }
    }

    Ok(message)
}

fn merge_field(
    message: &mut DynamicMessage,
    field: &FieldDescriptor,
    wire_type: WireType,
    reader: &mut Reader<'_>,
    options: &DecodeOptions,
    limit: u32,
) -> Result<(), WireError> {
    if field.is_map() {
        if wire_type != WireType::LengthDelimited {
            return Err(wire_type_mismatch(field, WireType::LengthDelimited, wire_type));
        }
        let slice = reader.read_len_prefixed()?;
        let (key, value) = decode_map_entry(field, &mut Reader::new(slice), options, limit)?;
        match message.get_field_mut(field) {
            Value::Map(entries) => {
                entries.insert(key, value);
            }
            _ => unreachable!("map field does not hold a map"),
        }
        Ok(())
    } else if field.is_list() {
        let element_wire_type = field.field_type().wire_type();
        if wire_type == element_wire_type {
            let value = decode_scalar(field, field.field_type(), field.type_name(), reader, options, limit)?;
            match message.get_field_mut(field) {
                Value::List(values) => values.push(value),
                _ => unreachable!("repeated field does not hold a list"),
            }
            Ok(())
        } else if wire_type == WireType::LengthDelimited && field.is_packable() {
            // Scalar repeated fields accept a packed frame regardless of how
            // they would be encoded.
            let slice = reader.read_len_prefixed()?;
            let mut packed = Reader::new(slice);
            let mut elements = Vec::new();
            while packed.has_remaining() {
                let element = decode_scalar(
                    field,
                    field.field_type(),
                    field.type_name(),
                    &mut packed,
                    options,
                    limit,
                )
                .map_err(|_| WireError::MalformedPackedField {
                    field: field.name().to_owned(),
                })?;
                elements.push(element);
            }
            match message.get_field_mut(field) {
                Value::List(values) => values.extend(elements),
                _ => unreachable!("repeated field does not hold a list"),
            }
            Ok(())
        } else {
            Err(wire_type_mismatch(field, element_wire_type, wire_type))
        }
    } else {
        let expected = field.field_type().wire_type();
        if wire_type != expected {
            return Err(wire_type_mismatch(field, expected, wire_type));
        }
        let value = decode_scalar(field, field.field_type(), field.type_name(), reader, options, limit)?;
        // A singular field repeated in the wire overwrites: last one wins.
        // Routing through the storage path keeps oneof exclusivity for wire
        // data too.
        *message.get_field_mut(field) = value;
        Ok(())
    }
}

fn decode_scalar(
    field: &FieldDescriptor,
    ty: FieldType,
    type_name: Option<&str>,
    reader: &mut Reader<'_>,
    options: &DecodeOptions,
    limit: u32,
) -> Result<Value, WireError> {
    match ty {
        FieldType::Double => Ok(Value::F64(f64::from_le_bytes(reader.read_fixed64()?))),
        FieldType::Float => Ok(Value::F32(f32::from_le_bytes(reader.read_fixed32()?))),
        FieldType::Int32 => Ok(Value::I32(reader.read_varint()? as i32)),
        FieldType::Int64 => Ok(Value::I64(reader.read_varint()? as i64)),
        FieldType::Uint32 => Ok(Value::U32(reader.read_varint()? as u32)),
        FieldType::Uint64 => Ok(Value::U64(reader.read_varint()?)),
        FieldType::Sint32 => Ok(Value::I32(wire::to_sint32(reader.read_varint()? as u32))),
        FieldType::Sint64 => Ok(Value::I64(wire::to_sint64(reader.read_varint()?))),
        FieldType::Fixed32 => Ok(Value::U32(u32::from_le_bytes(reader.read_fixed32()?))),
        FieldType::Fixed64 => Ok(Value::U64(u64::from_le_bytes(reader.read_fixed64()?))),
        FieldType::Sfixed32 => Ok(Value::I32(i32::from_le_bytes(reader.read_fixed32()?))),
        FieldType::Sfixed64 => Ok(Value::I64(i64::from_le_bytes(reader.read_fixed64()?))),
        FieldType::Bool => Ok(Value::Bool(reader.read_varint()? != 0)),
        FieldType::String => {
            let slice = reader.read_len_prefixed()?;
            match std::str::from_utf8(slice) {
                Ok(string) => Ok(Value::String(string.to_owned())),
                Err(_) => Err(WireError::InvalidUtf8String {
                    field: field.name().to_owned(),
                }),
            }
        }
        FieldType::Bytes => {
            let slice = reader.read_len_prefixed()?;
            Ok(Value::Bytes(Bytes::copy_from_slice(slice)))
        }
        FieldType::Enum => Ok(Value::EnumNumber(reader.read_varint()? as i32)),
        FieldType::Message => {
            let desc = resolve_message(field, type_name)?;
            let slice = reader.read_len_prefixed()?;
            let inner = decode_message(desc, &mut Reader::new(slice), options, limit)?;
            Ok(Value::Message(inner))
        }
        FieldType::Group => Err(WireError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        }),
    }
}

fn decode_map_entry(
    field: &FieldDescriptor,
    reader: &mut Reader<'_>,
    options: &DecodeOptions,
    limit: u32,
) -> Result<(MapKey, Value), WireError> {
    let entry_info = field.map_entry().expect("map field has entry info");
    let mut key = default_map_key(entry_info.key_type());
    let mut value = None;

    while reader.has_remaining() {
        let tag = reader.read_varint()?;
        let (number, wire_type) = wire::split_tag(tag)?;
        if matches!(wire_type, WireType::StartGroup | WireType::EndGroup) {
            return Err(WireError::InvalidWireType { tag });
        }
        match number {
            MAP_ENTRY_KEY_NUMBER => {
                let expected = entry_info.key_type().wire_type();
                if wire_type != expected {
                    return Err(wire_type_mismatch(field, expected, wire_type));
                }
                let decoded =
                    decode_scalar(field, entry_info.key_type(), None, reader, options, limit)?;
                key = decoded.into_map_key().expect("map key kind");
            }
            MAP_ENTRY_VALUE_NUMBER => {
                let expected = entry_info.value_type().wire_type();
                if wire_type != expected {
                    return Err(wire_type_mismatch(field, expected, wire_type));
                }
                value = Some(decode_scalar(
                    field,
                    entry_info.value_type(),
                    entry_info.value_type_name(),
                    reader,
                    options,
                    limit,
                )?);
            }
            _ => reader.skip(wire_type)?,
        }
    }

    let value = match value {
        Some(value) => value,
        None => default_map_value(field)?,
    };
    Ok((key, value))
}

fn default_map_key(key_type: FieldType) -> MapKey {
    match key_type {
        FieldType::Bool => MapKey::Bool(false),
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => MapKey::I32(0),
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => MapKey::I64(0),
        FieldType::Uint32 | FieldType::Fixed32 => MapKey::U32(0),
        FieldType::Uint64 | FieldType::Fixed64 => MapKey::U64(0),
        FieldType::String => MapKey::String(String::default()),
        _ => unreachable!("invalid type for map key"),
    }
}

fn default_map_value(field: &FieldDescriptor) -> Result<Value, WireError> {
    let entry_info = field.map_entry().expect("map field has entry info");
    match entry_info.value_type() {
        FieldType::Message => match field.map_value_kind() {
            Some(Kind::Message(desc)) => Ok(Value::Message(DynamicMessage::new(desc))),
            _ => Err(WireError::UnsupportedNestedMessage {
                type_name: entry_info.value_type_name().unwrap_or_default().to_owned(),
            }),
        },
        FieldType::Enum => Ok(Value::EnumNumber(0)),
        FieldType::Double => Ok(Value::F64(0.0)),
        FieldType::Float => Ok(Value::F32(0.0)),
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => Ok(Value::I32(0)),
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => Ok(Value::I64(0)),
        FieldType::Uint32 | FieldType::Fixed32 => Ok(Value::U32(0)),
        FieldType::Uint64 | FieldType::Fixed64 => Ok(Value::U64(0)),
        FieldType::Bool => Ok(Value::Bool(false)),
        FieldType::String => Ok(Value::String(String::default())),
        FieldType::Bytes => Ok(Value::Bytes(Bytes::default())),
        FieldType::Group => Err(WireError::UnsupportedFieldType {
            type_name: FieldType::Group.as_str().to_owned(),
        }),
    }
}

fn resolve_message(
    field: &FieldDescriptor,
    type_name: Option<&str>,
) -> Result<MessageDescriptor, WireError> {
    let type_name = type_name.unwrap_or_default();
    field
        .parent_message()
        .parent_pool()
        .get_message_by_name(type_name)
        .ok_or_else(|| WireError::UnsupportedNestedMessage {
            type_name: type_name.to_owned(),
        })
}

fn wire_type_mismatch(field: &FieldDescriptor, expected: WireType, actual: WireType) -> WireError {
    WireError::WireTypeMismatch {
        field: field.name().to_owned(),
        expected,
        actual,
    }
}
