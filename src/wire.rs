//! Low-level proto3 wire-format primitives: wire types, tags and ZigZag.
//!
//! Encoding of varints and keys delegates to [`prost::encoding`]; the decode
//! direction is implemented here so that failures surface as [`WireError`]
//! values instead of opaque strings.

use std::{error::Error, fmt};

/// The 3-bit wire-type discriminator carried in a field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint.
    Varint = 0,
    /// Fixed 8-byte little-endian value.
    SixtyFourBit = 1,
    /// Length-prefixed byte payload.
    LengthDelimited = 2,
    /// Legacy group start marker. Never produced, rejected on read.
    StartGroup = 3,
    /// Legacy group end marker. Never produced, rejected on read.
    EndGroup = 4,
    /// Fixed 4-byte little-endian value.
    ThirtyTwoBit = 5,
}

impl WireType {
    pub(crate) fn from_tag(tag: u64) -> Option<WireType> {
        match tag & 0x7 {
            0 => Some(WireType::Varint),
            1 => Some(WireType::SixtyFourBit),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::ThirtyTwoBit),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Varint => write!(f, "varint"),
            WireType::SixtyFourBit => write!(f, "fixed64"),
            WireType::LengthDelimited => write!(f, "length-delimited"),
            WireType::StartGroup => write!(f, "start-group"),
            WireType::EndGroup => write!(f, "end-group"),
            WireType::ThirtyTwoBit => write!(f, "fixed32"),
        }
    }
}

/// Combines a field number and wire type into a tag value.
pub(crate) fn make_tag(number: u32, wire_type: WireType) -> u64 {
    u64::from(number) << 3 | wire_type as u64
}

/// Splits a decoded tag varint into `(field_number, wire_type)`.
///
/// A tag with field number zero or an undefined wire type is invalid.
pub(crate) fn split_tag(tag: u64) -> Result<(u32, WireType), WireError> {
    let number = tag >> 3;
    let wire_type = WireType::from_tag(tag).ok_or(WireError::InvalidWireType { tag })?;
    if number == 0 || number > u64::from(crate::descriptor::MAX_FIELD_NUMBER) {
        return Err(WireError::InvalidWireType { tag });
    }
    Ok((number as u32, wire_type))
}

/// ZigZag-encodes a 32-bit signed value for varint encoding.
pub(crate) fn from_sint32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`from_sint32`].
pub(crate) fn to_sint32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
}

/// ZigZag-encodes a 64-bit signed value for varint encoding.
pub(crate) fn from_sint64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`from_sint64`].
pub(crate) fn to_sint64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
}

/// An error raised while encoding or decoding the binary wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// The input ended inside a varint, or the varint ran past ten bytes.
    TruncatedVarint,
    /// The input ended before a declared length or fixed-width payload.
    TruncatedMessage,
    /// A tag carried an undefined wire type, a zero field number, or a legacy
    /// group marker.
    InvalidWireType {
        /// The offending tag value.
        tag: u64,
    },
    /// A known field arrived with a wire type other than its declared one.
    WireTypeMismatch {
        /// Name of the field being decoded.
        field: String,
        /// The wire type implied by the field's declared type.
        expected: WireType,
        /// The wire type found on the wire.
        actual: WireType,
    },
    /// A packed repeated payload did not divide into whole elements.
    MalformedPackedField {
        /// Name of the packed field.
        field: String,
    },
    /// A string field's payload was not valid UTF-8.
    InvalidUtf8String {
        /// Name of the string field.
        field: String,
    },
    /// The field's declared type cannot be carried by this codec.
    UnsupportedFieldType {
        /// Protobuf name of the unsupported type (e.g. `group`).
        type_name: String,
    },
    /// A message or enum field's type name did not resolve in the pool.
    UnsupportedNestedMessage {
        /// The unresolved fully-qualified type name.
        type_name: String,
    },
    /// Message nesting exceeded the configured recursion limit.
    NestingTooDeep,
    /// The message exceeded the configured size limit.
    MessageTooLarge,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::TruncatedVarint => write!(f, "buffer ended inside a varint"),
            WireError::TruncatedMessage => write!(f, "buffer ended inside a message"),
            WireError::InvalidWireType { tag } => {
                write!(f, "tag {} has an invalid wire type", tag)
            }
            WireError::WireTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' expects wire type {}, but found {}",
                field, expected, actual
            ),
            WireError::MalformedPackedField { field } => {
                write!(f, "packed field '{}' has a malformed payload", field)
            }
            WireError::InvalidUtf8String { field } => {
                write!(f, "string field '{}' contains invalid UTF-8", field)
            }
            WireError::UnsupportedFieldType { type_name } => {
                write!(f, "fields of type '{}' cannot be encoded", type_name)
            }
            WireError::UnsupportedNestedMessage { type_name } => {
                write!(
                    f,
                    "the type '{}' was not found in the descriptor pool",
                    type_name
                )
            }
            WireError::NestingTooDeep => write!(f, "message nesting exceeds the recursion limit"),
            WireError::MessageTooLarge => write!(f, "message exceeds the size limit"),
        }
    }
}

impl Error for WireError {}
