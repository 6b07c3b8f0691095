//! `prost-dynamic` is a runtime library for protobuf messages whose schemas
//! are only known at runtime, without any code generation.
//!
//! Descriptors are assembled programmatically through
//! [`FileDescriptorBuilder`] and frozen into a shared [`DescriptorPool`].
//! [`DynamicMessage`] instances bound to those descriptors support typed
//! field access with proto3 semantics, and round-trip through the binary
//! wire format and the canonical JSON mapping.
//!
//! # Example
//!
//! ```
//! use prost_dynamic::{
//!     DynamicMessage, FieldBuilder, FieldType, FileDescriptorBuilder, MessageBuilder, Value,
//! };
//!
//! let file = FileDescriptorBuilder::new("example.proto")
//!     .package("example.v1")
//!     .message(
//!         MessageBuilder::new("Sensor")
//!             .field(FieldBuilder::new("name", 1, FieldType::String))
//!             .field(FieldBuilder::new("reading", 2, FieldType::Double)),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let desc = file.get_message_by_name("Sensor").unwrap();
//! let mut message = DynamicMessage::new(desc.clone());
//! message.try_set_field_by_name("name", Value::String("kitchen".to_owned())).unwrap();
//! message.try_set_field_by_name("reading", Value::F64(21.5)).unwrap();
//!
//! let bytes = message.encode_to_vec().unwrap();
//! let decoded = DynamicMessage::decode(desc, &bytes).unwrap();
//! assert_eq!(message, decoded);
//! ```
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]

mod descriptor;
mod dynamic;
mod wire;

pub use prost::bytes;

pub use self::descriptor::{
    Cardinality, DescriptorError, DescriptorPool, EnumBuilder, EnumDescriptor,
    EnumValueDescriptor, FieldBuilder, FieldDescriptor, FieldType, FileDescriptor,
    FileDescriptorBuilder, Kind, MapEntryInfo, MessageBuilder, MessageDescriptor, OneofBuilder,
    OneofDescriptor,
};
pub use self::dynamic::{
    DecodeOptions, DeserializeOptions, DynamicMessage, EncodeOptions, FieldId, JsonError, MapKey,
    MessageView, MessageViewMut, SerializeOptions, SetFieldError, ValidationError,
    ValidationResult, Value,
};
pub use self::wire::{WireError, WireType};
