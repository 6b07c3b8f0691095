mod accessor;
mod coerce;
mod decode;
mod encode;
mod fields;
pub(crate) mod json;
mod validate;

pub use self::accessor::{MessageView, MessageViewMut};
pub use self::decode::DecodeOptions;
pub use self::encode::EncodeOptions;
pub use self::json::{DeserializeOptions, JsonError, SerializeOptions};
pub use self::validate::{ValidationError, ValidationResult};

use std::{borrow::Cow, collections::HashMap, error::Error, fmt};

use prost::bytes::Bytes;

use crate::descriptor::{FieldDescriptor, Kind, MessageDescriptor};

use self::fields::DynamicMessageFieldSet;

/// [`DynamicMessage`] is a value container for a protobuf message whose
/// schema is only known at runtime.
///
/// It wraps a [`MessageDescriptor`] and a sparse set of field values, and
/// enforces the descriptor's type, cardinality, oneof and map invariants on
/// every mutation. A field is *set* exactly when a value is stored for it;
/// reads of unset fields observe the field's default value.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    fields: DynamicMessageFieldSet,
    unknown: Vec<u8>,
}

/// A dynamically-typed protobuf value.
///
/// Note this type may map to multiple possible protobuf wire formats, so it
/// must be serialized as part of a [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value, for the `bool` protobuf type.
    Bool(bool),
    /// A 32-bit signed integer, for the `int32`, `sint32` and `sfixed32` protobuf types.
    I32(i32),
    /// A 64-bit signed integer, for the `int64`, `sint64` and `sfixed64` protobuf types.
    I64(i64),
    /// A 32-bit unsigned integer, for the `uint32` and `fixed32` protobuf types.
    U32(u32),
    /// A 64-bit unsigned integer, for the `uint64` and `fixed64` protobuf types.
    U64(u64),
    /// A 32-bit floating point number, for the `float` protobuf type.
    F32(f32),
    /// A 64-bit floating point number, for the `double` protobuf type.
    F64(f64),
    /// A string, for the `string` protobuf type.
    String(String),
    /// A byte string, for the `bytes` protobuf type.
    Bytes(Bytes),
    /// An enum value identified by number. Unknown numbers are preserved.
    EnumNumber(i32),
    /// An enum value identified by name.
    ///
    /// Which form was set is remembered: `EnumNumber(1)` and the name of the
    /// value numbered 1 compare unequal and serialize to JSON differently.
    EnumName(String),
    /// A nested message.
    Message(DynamicMessage),
    /// The elements of a repeated field, in order.
    List(Vec<Value>),
    /// The entries of a map field.
    Map(HashMap<MapKey, Value>),
}

/// A dynamically-typed key for a protobuf map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// A boolean key.
    Bool(bool),
    /// A 32-bit signed integer key, for the `int32`, `sint32` and `sfixed32` key types.
    I32(i32),
    /// A 64-bit signed integer key, for the `int64`, `sint64` and `sfixed64` key types.
    I64(i64),
    /// A 32-bit unsigned integer key, for the `uint32` and `fixed32` key types.
    U32(u32),
    /// A 64-bit unsigned integer key, for the `uint64` and `fixed64` key types.
    U64(u64),
    /// A string key.
    String(String),
}

/// Identifies a field of a message by name or by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId<'a> {
    /// The field's declared name.
    Name(&'a str),
    /// The field's number.
    Number(u32),
}

impl<'a> From<&'a str> for FieldId<'a> {
    fn from(name: &'a str) -> Self {
        FieldId::Name(name)
    }
}

impl From<u32> for FieldId<'_> {
    fn from(number: u32) -> Self {
        FieldId::Number(number)
    }
}

impl fmt::Display for FieldId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Name(name) => f.write_str(name),
            FieldId::Number(number) => write!(f, "#{}", number),
        }
    }
}

/// Error type returned by the fallible mutation methods of [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetFieldError {
    /// The message has no field with the given name or number.
    NotFound {
        /// The name or `#number` of the missing field.
        field: String,
    },
    /// The supplied value's kind does not match the field's declared type.
    TypeMismatch {
        /// Name of the field.
        field: String,
        /// Description of the declared type, e.g. `repeated int32`.
        expected: String,
        /// Description of the supplied value's kind.
        actual: String,
    },
    /// A message value was supplied whose descriptor differs from the field's
    /// declared message type.
    MessageTypeMismatch {
        /// Name of the field.
        field: String,
        /// The fully-qualified name the field requires.
        expected: String,
        /// The fully-qualified name of the supplied message.
        actual: String,
    },
    /// A repeated-field operation was applied to a non-repeated field.
    NotRepeated {
        /// Name of the field.
        field: String,
    },
    /// A map operation was applied to a non-map field.
    NotMap {
        /// Name of the field.
        field: String,
    },
    /// A map key of the wrong kind was supplied.
    InvalidMapKeyType {
        /// Name of the field.
        field: String,
        /// The declared key type.
        expected: String,
        /// Description of the supplied key's kind.
        actual: String,
    },
}

impl SetFieldError {
    pub(crate) fn not_found(field: impl fmt::Display) -> Self {
        SetFieldError::NotFound {
            field: field.to_string(),
        }
    }
}

impl fmt::Display for SetFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetFieldError::NotFound { field } => write!(f, "field '{}' not found", field),
            SetFieldError::TypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' expects a value of type '{}', but found '{}'",
                field, expected, actual
            ),
            SetFieldError::MessageTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' expects a message of type '{}', but found '{}'",
                field, expected, actual
            ),
            SetFieldError::NotRepeated { field } => {
                write!(f, "field '{}' is not repeated", field)
            }
            SetFieldError::NotMap { field } => write!(f, "field '{}' is not a map", field),
            SetFieldError::InvalidMapKeyType {
                field,
                expected,
                actual,
            } => write!(
                f,
                "map field '{}' expects keys of type '{}', but found '{}'",
                field, expected, actual
            ),
        }
    }
}

impl Error for SetFieldError {}

impl DynamicMessage {
    /// Creates a new, empty instance of the message type specified by `desc`.
    pub fn new(desc: MessageDescriptor) -> Self {
        DynamicMessage {
            desc,
            fields: DynamicMessageFieldSet::default(),
            unknown: Vec::new(),
        }
    }

    /// Creates a message seeded with the given field values.
    ///
    /// Fields may be identified by name or number. Values run through the
    /// same typing rules as [`try_set_field`][Self::try_set_field]; the first
    /// failure aborts construction.
    ///
    /// # Examples
    ///
    /// ```
    /// # use prost_dynamic::{DynamicMessage, FieldBuilder, FieldType, FileDescriptorBuilder, MessageBuilder, Value};
    /// # let file = FileDescriptorBuilder::new("example.proto")
    /// #     .message(MessageBuilder::new("Thing")
    /// #         .field(FieldBuilder::new("name", 1, FieldType::String)))
    /// #     .build()
    /// #     .unwrap();
    /// # let desc = file.get_message_by_name("Thing").unwrap();
    /// let message = DynamicMessage::with_fields(
    ///     desc,
    ///     [("name", Value::String("widget".to_owned()))],
    /// )
    /// .unwrap();
    /// assert!(message.has_field_by_name("name"));
    /// ```
    pub fn with_fields<'a, F, I>(desc: MessageDescriptor, seed: I) -> Result<Self, SetFieldError>
    where
        F: Into<FieldId<'a>>,
        I: IntoIterator<Item = (F, Value)>,
    {
        let mut message = DynamicMessage::new(desc);
        for (id, value) in seed {
            let id = id.into();
            let field = message.find_field(id)?;
            message.try_set_field(&field, value)?;
        }
        Ok(message)
    }

    /// Gets the descriptor this message is an instance of.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    pub(crate) fn find_field(&self, id: FieldId) -> Result<FieldDescriptor, SetFieldError> {
        match id {
            FieldId::Name(name) => self.desc.get_field_by_name(name),
            FieldId::Number(number) => self.desc.get_field(number),
        }
        .ok_or_else(|| SetFieldError::not_found(id))
    }

    /// Returns `true` if this message has the given field set.
    pub fn has_field(&self, field_desc: &FieldDescriptor) -> bool {
        self.fields.has(field_desc)
    }

    /// Gets the value of the given field, or its default value if it is unset.
    ///
    /// # Panics
    ///
    /// Panics if the field is an unset message-typed field whose type name
    /// does not resolve in the pool, as no default can be produced for it.
    pub fn get_field(&self, field_desc: &FieldDescriptor) -> Cow<'_, Value> {
        self.fields.get(field_desc)
    }

    /// Gets a mutable reference to the value of the given field. If the field
    /// is not set, it is inserted with its default value.
    ///
    /// For oneof members this behaves like a set: the other members of the
    /// oneof are cleared.
    pub fn get_field_mut(&mut self, field_desc: &FieldDescriptor) -> &mut Value {
        self.fields.get_mut(field_desc)
    }

    /// Sets the value of the given field.
    ///
    /// # Panics
    ///
    /// Panics if the value's kind is not compatible with the field's type.
    /// Consider [`try_set_field`][Self::try_set_field] for a non-panicking
    /// version.
    pub fn set_field(&mut self, field_desc: &FieldDescriptor, value: Value) {
        if let Err(err) = self.try_set_field(field_desc, value) {
            panic!("failed to set field: {}", err);
        }
    }

    /// Sets the value of the given field after validating it against the
    /// field's declared type.
    ///
    /// Setting a oneof member atomically clears every other member of the
    /// same oneof. On error the message is left unchanged.
    pub fn try_set_field(
        &mut self,
        field_desc: &FieldDescriptor,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let value = coerce::coerce_field_value(field_desc, value)?;
        self.fields.set(field_desc, value);
        Ok(())
    }

    /// Clears the given field.
    pub fn clear_field(&mut self, field_desc: &FieldDescriptor) {
        self.fields.clear(field_desc);
    }

    /// Clears the given field and returns its value, if it was set.
    pub fn take_field(&mut self, field_desc: &FieldDescriptor) -> Option<Value> {
        self.fields.take(field_desc)
    }

    /// Appends an element to the given repeated field.
    ///
    /// The field must be repeated and not a map, and the element must match
    /// the field's element type.
    pub fn try_add_repeated(
        &mut self,
        field_desc: &FieldDescriptor,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let value = coerce::coerce_repeated_element(field_desc, value)?;
        match self.fields.get_mut(field_desc) {
            Value::List(values) => values.push(value),
            _ => unreachable!("repeated field does not hold a list"),
        }
        Ok(())
    }

    /// Inserts or replaces an entry of the given map field.
    pub fn try_set_map_entry(
        &mut self,
        field_desc: &FieldDescriptor,
        key: MapKey,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let key = coerce::coerce_map_key(field_desc, key)?;
        let value = coerce::coerce_map_value(field_desc, value)?;
        match self.fields.get_mut(field_desc) {
            Value::Map(entries) => {
                entries.insert(key, value);
            }
            _ => unreachable!("map field does not hold a map"),
        }
        Ok(())
    }

    /// Returns `true` if this message has a field set with the given name.
    pub fn has_field_by_name(&self, name: &str) -> bool {
        self.desc
            .get_field_by_name(name)
            .map_or(false, |field_desc| self.has_field(&field_desc))
    }

    /// Returns `true` if this message has a field set with the given number.
    pub fn has_field_by_number(&self, number: u32) -> bool {
        self.desc
            .get_field(number)
            .map_or(false, |field_desc| self.has_field(&field_desc))
    }

    /// Gets the value of the field with the given name, or its default value
    /// if it is unset.
    ///
    /// If the message has no field with the given name, `None` is returned.
    pub fn get_field_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.desc
            .get_field_by_name(name)
            .map(|field_desc| self.get_field(&field_desc))
    }

    /// Gets the value of the field with the given number, or its default
    /// value if it is unset.
    ///
    /// If the message has no field with the given number, `None` is returned.
    pub fn get_field_by_number(&self, number: u32) -> Option<Cow<'_, Value>> {
        self.desc
            .get_field(number)
            .map(|field_desc| self.get_field(&field_desc))
    }

    /// Gets a mutable reference to the value of the field with the given
    /// name. If the field is not set, it is inserted with its default value.
    pub fn get_field_mut_by_name(&mut self, name: &str) -> Option<&mut Value> {
        self.desc
            .get_field_by_name(name)
            .map(move |field_desc| self.fields.get_mut(&field_desc))
    }

    /// Gets a mutable reference to the value of the field with the given
    /// number. If the field is not set, it is inserted with its default value.
    pub fn get_field_mut_by_number(&mut self, number: u32) -> Option<&mut Value> {
        self.desc
            .get_field(number)
            .map(move |field_desc| self.fields.get_mut(&field_desc))
    }

    /// Tries to set the value of the field with the given name, returning an
    /// error if the field does not exist or the value has an invalid type.
    pub fn try_set_field_by_name(&mut self, name: &str, value: Value) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Name(name))?;
        self.try_set_field(&field_desc, value)
    }

    /// Tries to set the value of the field with the given number, returning
    /// an error if the field does not exist or the value has an invalid type.
    pub fn try_set_field_by_number(
        &mut self,
        number: u32,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Number(number))?;
        self.try_set_field(&field_desc, value)
    }

    /// Clears the field with the given name, if it exists.
    pub fn clear_field_by_name(&mut self, name: &str) {
        if let Some(field_desc) = self.desc.get_field_by_name(name) {
            self.clear_field(&field_desc);
        }
    }

    /// Clears the field with the given number, if it exists.
    pub fn clear_field_by_number(&mut self, number: u32) {
        if let Some(field_desc) = self.desc.get_field(number) {
            self.clear_field(&field_desc);
        }
    }

    /// Clears the field with the given name and returns its value, if it was set.
    pub fn take_field_by_name(&mut self, name: &str) -> Option<Value> {
        let field_desc = self.desc.get_field_by_name(name)?;
        self.fields.take(&field_desc)
    }

    /// Clears the field with the given number and returns its value, if it was set.
    pub fn take_field_by_number(&mut self, number: u32) -> Option<Value> {
        let field_desc = self.desc.get_field(number)?;
        self.fields.take(&field_desc)
    }

    /// Appends an element to the repeated field with the given name.
    pub fn try_add_repeated_by_name(
        &mut self,
        name: &str,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Name(name))?;
        self.try_add_repeated(&field_desc, value)
    }

    /// Appends an element to the repeated field with the given number.
    pub fn try_add_repeated_by_number(
        &mut self,
        number: u32,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Number(number))?;
        self.try_add_repeated(&field_desc, value)
    }

    /// Inserts or replaces an entry of the map field with the given name.
    pub fn try_set_map_entry_by_name(
        &mut self,
        name: &str,
        key: MapKey,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Name(name))?;
        self.try_set_map_entry(&field_desc, key, value)
    }

    /// Inserts or replaces an entry of the map field with the given number.
    pub fn try_set_map_entry_by_number(
        &mut self,
        number: u32,
        key: MapKey,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field_desc = self.find_field(FieldId::Number(number))?;
        self.try_set_map_entry(&field_desc, key, value)
    }

    /// Gets an iterator over the set fields of this message, in ascending
    /// field-number order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldDescriptor, &'_ Value)> {
        self.fields.iter(&self.desc)
    }

    /// The unknown fields preserved on this message, as raw wire-format bytes.
    ///
    /// Unknown fields are collected when decoding with
    /// [`DecodeOptions::preserve_unknown_fields`] enabled and are re-emitted
    /// verbatim after the known fields when the message is encoded again.
    /// They take no part in equality comparisons.
    pub fn unknown_fields(&self) -> &[u8] {
        &self.unknown
    }

    pub(crate) fn append_unknown(&mut self, bytes: &[u8]) {
        self.unknown.extend_from_slice(bytes);
    }

    /// Gets a read-only typed view over this message's fields.
    pub fn view(&self) -> MessageView<'_> {
        MessageView::new(self)
    }

    /// Gets a mutable typed view over this message's fields.
    pub fn view_mut(&mut self) -> MessageViewMut<'_> {
        MessageViewMut::new(self)
    }

    /// Clears every field of this message, including preserved unknown fields.
    pub fn clear(&mut self) {
        self.fields.clear_all();
        self.unknown.clear();
    }
}

/// Two messages are equal when they are instances of the same message type
/// (compared by fully-qualified name) and their sets of populated fields and
/// the values thereof are equal. Preserved unknown fields are ignored.
impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.desc.full_name() == other.desc.full_name() && self.fields == other.fields
    }
}

impl Value {
    /// Returns the default value for the given protobuf field.
    ///
    /// This is the empty list for repeated fields, the empty map for map
    /// fields, the field's custom default if one was declared, and otherwise
    /// the canonical zero of the field's type.
    ///
    /// # Panics
    ///
    /// Panics for message-typed fields whose type name does not resolve.
    pub fn default_value_for_field(field_desc: &FieldDescriptor) -> Self {
        if field_desc.is_map() {
            Value::Map(HashMap::default())
        } else if field_desc.is_repeated() {
            Value::List(Vec::default())
        } else if let Some(default_value) = field_desc.default_value() {
            default_value.clone()
        } else if field_desc.field_type() == crate::FieldType::Enum {
            // The zero-valued member is the proto3 default, whether or not
            // the enum type resolves.
            Value::EnumNumber(0)
        } else {
            match field_desc.kind() {
                Some(kind) => Self::default_value(&kind),
                None => panic!(
                    "cannot produce a default value for field '{}': the type '{}' was not found",
                    field_desc.name(),
                    field_desc.type_name().unwrap_or(""),
                ),
            }
        }
    }

    /// Returns the default value for the given resolved type.
    ///
    /// Unlike [`default_value_for_field`](Value::default_value_for_field),
    /// this method does not look at field cardinality, so it never returns a
    /// list or map.
    pub fn default_value(kind: &Kind) -> Self {
        match kind {
            Kind::Message(desc) => Value::Message(DynamicMessage::new(desc.clone())),
            Kind::Enum(enum_ty) => Value::EnumNumber(enum_ty.default_value().number()),
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::default()),
            Kind::Bytes => Value::Bytes(Bytes::default()),
        }
    }

    /// A short description of this value's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) | Value::EnumName(_) => "enum",
            Value::Message(_) => "message",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns the value if it is a `Value::Bool`, or `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::I32`, or `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::I64`, or `None` otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::U32`, or `None` otherwise.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::U64`, or `None` otherwise.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::F32`, or `None` otherwise.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::F64`, or `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the enum number if it is a `Value::EnumNumber`, or `None` otherwise.
    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the enum value name if it is a `Value::EnumName`, or `None` otherwise.
    pub fn as_enum_name(&self) -> Option<&str> {
        match self {
            Value::EnumName(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::String`, or `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::Bytes`, or `None` otherwise.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a reference to the message if it is a `Value::Message`, or `None` otherwise.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the message if it is a `Value::Message`, or `None` otherwise.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the elements if it is a `Value::List`, or `None` otherwise.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the elements if it is a `Value::List`, or `None` otherwise.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the entries if it is a `Value::Map`, or `None` otherwise.
    pub fn as_map(&self) -> Option<&HashMap<MapKey, Value>> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the entries if it is a `Value::Map`, or `None` otherwise.
    pub fn as_map_mut(&mut self) -> Option<&mut HashMap<MapKey, Value>> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Converts this value into a [`MapKey`], or `None` if it is not a valid
    /// map key kind.
    pub fn into_map_key(self) -> Option<MapKey> {
        match self {
            Value::Bool(value) => Some(MapKey::Bool(value)),
            Value::I32(value) => Some(MapKey::I32(value)),
            Value::I64(value) => Some(MapKey::I64(value)),
            Value::U32(value) => Some(MapKey::U32(value)),
            Value::U64(value) => Some(MapKey::U64(value)),
            Value::String(value) => Some(MapKey::String(value)),
            _ => None,
        }
    }
}

impl MapKey {
    /// A short description of this key's kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            MapKey::Bool(_) => "bool",
            MapKey::I32(_) => "int32",
            MapKey::I64(_) => "int64",
            MapKey::U32(_) => "uint32",
            MapKey::U64(_) => "uint64",
            MapKey::String(_) => "string",
        }
    }

    /// Returns the key if it is a `MapKey::Bool`, or `None` otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            MapKey::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the key if it is a `MapKey::I32`, or `None` otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            MapKey::I32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the key if it is a `MapKey::I64`, or `None` otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MapKey::I64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the key if it is a `MapKey::U32`, or `None` otherwise.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            MapKey::U32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the key if it is a `MapKey::U64`, or `None` otherwise.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            MapKey::U64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the key if it is a `MapKey::String`, or `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MapKey::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<MapKey> for Value {
    fn from(value: MapKey) -> Self {
        match value {
            MapKey::Bool(value) => Value::Bool(value),
            MapKey::I32(value) => Value::I32(value),
            MapKey::I64(value) => Value::I64(value),
            MapKey::U32(value) => Value::U32(value),
            MapKey::U64(value) => Value::U64(value),
            MapKey::String(value) => Value::String(value),
        }
    }
}
