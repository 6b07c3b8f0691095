mod build;
mod error;

pub use self::build::{
    EnumBuilder, FieldBuilder, FileDescriptorBuilder, MessageBuilder, OneofBuilder,
};
pub use self::error::DescriptorError;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    ops::Range,
    sync::Arc,
};

use crate::{dynamic::Value, wire::WireType};

pub(crate) const MAP_ENTRY_KEY_NUMBER: u32 = 1;
pub(crate) const MAP_ENTRY_VALUE_NUMBER: u32 = 2;

pub(crate) const MAX_FIELD_NUMBER: u32 = 536_870_911;
pub(crate) const RESERVED_FIELD_NUMBERS: Range<u32> = 19_000..20_000;

type DescriptorIndex = u32;
type FileIndex = DescriptorIndex;
type MessageIndex = DescriptorIndex;
type FieldIndex = DescriptorIndex;
type OneofIndex = DescriptorIndex;
type EnumIndex = DescriptorIndex;
type EnumValueIndex = DescriptorIndex;

/// Cardinality determines whether a field is optional, required, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    /// The field appears zero or one times.
    Optional,
    /// The field appears exactly one time. Legacy proto2 semantics, surfaced
    /// only through the validator.
    Required,
    /// The field appears zero or more times.
    Repeated,
}

/// The declared protobuf type of a message field.
///
/// For `Message`, `Enum` and `Group` fields the referenced type is named by
/// [`FieldDescriptor::type_name`] and resolved lazily through the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    /// The protobuf `double` type.
    Double,
    /// The protobuf `float` type.
    Float,
    /// The protobuf `int32` type.
    Int32,
    /// The protobuf `int64` type.
    Int64,
    /// The protobuf `uint32` type.
    Uint32,
    /// The protobuf `uint64` type.
    Uint64,
    /// The protobuf `sint32` type.
    Sint32,
    /// The protobuf `sint64` type.
    Sint64,
    /// The protobuf `fixed32` type.
    Fixed32,
    /// The protobuf `fixed64` type.
    Fixed64,
    /// The protobuf `sfixed32` type.
    Sfixed32,
    /// The protobuf `sfixed64` type.
    Sfixed64,
    /// The protobuf `bool` type.
    Bool,
    /// The protobuf `string` type.
    String,
    /// The protobuf `bytes` type.
    Bytes,
    /// A protobuf message type.
    Message,
    /// A protobuf enum type.
    Enum,
    /// A legacy proto2 group. Accepted in descriptors, rejected by the codecs.
    Group,
}

impl FieldType {
    /// Gets the wire type used to encode values of this type.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Double | FieldType::Fixed64 | FieldType::Sfixed64 => WireType::SixtyFourBit,
            FieldType::Float | FieldType::Fixed32 | FieldType::Sfixed32 => WireType::ThirtyTwoBit,
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum => WireType::Varint,
            FieldType::String | FieldType::Bytes | FieldType::Message => WireType::LengthDelimited,
            FieldType::Group => WireType::StartGroup,
        }
    }

    /// Returns `true` if repeated fields of this type may use the packed encoding.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldType::String | FieldType::Bytes | FieldType::Message | FieldType::Group
        )
    }

    /// Returns `true` if fields of this type reference another named type.
    pub fn is_composite(&self) -> bool {
        matches!(self, FieldType::Message | FieldType::Enum | FieldType::Group)
    }

    /// Returns `true` if this type may be used as a map key.
    pub fn is_valid_map_key(&self) -> bool {
        matches!(
            self,
            FieldType::Int32
                | FieldType::Int64
                | FieldType::Uint32
                | FieldType::Uint64
                | FieldType::Sint32
                | FieldType::Sint64
                | FieldType::Fixed32
                | FieldType::Fixed64
                | FieldType::Sfixed32
                | FieldType::Sfixed64
                | FieldType::Bool
                | FieldType::String
        )
    }

    /// The protobuf name of this type, e.g. `"sfixed32"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int32 => "int32",
            FieldType::Int64 => "int64",
            FieldType::Uint32 => "uint32",
            FieldType::Uint64 => "uint64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
            FieldType::Fixed32 => "fixed32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Message => "message",
            FieldType::Enum => "enum",
            FieldType::Group => "group",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved type of a message field: a scalar, or a handle to the message
/// or enum definition the field references.
#[derive(Clone, PartialEq, Eq)]
pub enum Kind {
    /// The protobuf `double` type.
    Double,
    /// The protobuf `float` type.
    Float,
    /// The protobuf `int32` type.
    Int32,
    /// The protobuf `int64` type.
    Int64,
    /// The protobuf `uint32` type.
    Uint32,
    /// The protobuf `uint64` type.
    Uint64,
    /// The protobuf `sint32` type.
    Sint32,
    /// The protobuf `sint64` type.
    Sint64,
    /// The protobuf `fixed32` type.
    Fixed32,
    /// The protobuf `fixed64` type.
    Fixed64,
    /// The protobuf `sfixed32` type.
    Sfixed32,
    /// The protobuf `sfixed64` type.
    Sfixed64,
    /// The protobuf `bool` type.
    Bool,
    /// The protobuf `string` type.
    String,
    /// The protobuf `bytes` type.
    Bytes,
    /// A protobuf message type.
    Message(MessageDescriptor),
    /// A protobuf enum type.
    Enum(EnumDescriptor),
}

impl Kind {
    /// Returns the message descriptor if this is a message type.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) => Some(desc),
            _ => None,
        }
    }

    /// Returns the enum descriptor if this is an enum type.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Double => write!(f, "double"),
            Kind::Float => write!(f, "float"),
            Kind::Int32 => write!(f, "int32"),
            Kind::Int64 => write!(f, "int64"),
            Kind::Uint32 => write!(f, "uint32"),
            Kind::Uint64 => write!(f, "uint64"),
            Kind::Sint32 => write!(f, "sint32"),
            Kind::Sint64 => write!(f, "sint64"),
            Kind::Fixed32 => write!(f, "fixed32"),
            Kind::Fixed64 => write!(f, "fixed64"),
            Kind::Sfixed32 => write!(f, "sfixed32"),
            Kind::Sfixed64 => write!(f, "sfixed64"),
            Kind::Bool => write!(f, "bool"),
            Kind::String => write!(f, "string"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::Message(desc) => write!(f, "{}", desc.full_name()),
            Kind::Enum(desc) => write!(f, "{}", desc.full_name()),
        }
    }
}

/// The key and value types of a map field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntryInfo {
    key_type: FieldType,
    value_type: FieldType,
    value_type_name: Option<Box<str>>,
}

impl MapEntryInfo {
    pub(crate) fn new(
        key_type: FieldType,
        value_type: FieldType,
        value_type_name: Option<Box<str>>,
    ) -> Self {
        MapEntryInfo {
            key_type,
            value_type,
            value_type_name,
        }
    }

    /// The declared key type. Restricted to integral, bool, and string types.
    pub fn key_type(&self) -> FieldType {
        self.key_type
    }

    /// The declared value type. Any type except map and group.
    pub fn value_type(&self) -> FieldType {
        self.value_type
    }

    /// The fully-qualified name of the value type, for message and enum values.
    pub fn value_type_name(&self) -> Option<&str> {
        self.value_type_name.as_deref()
    }
}

/// A `DescriptorPool` is a frozen collection of related descriptors, built
/// once through [`DescriptorPool::build`] and then shared by reference among
/// any number of messages and codecs.
///
/// This type uses reference counting internally so it is cheap to clone.
/// Two pools compare equal only if they are the same underlying allocation.
#[derive(Clone, Default)]
pub struct DescriptorPool {
    inner: Arc<DescriptorPoolInner>,
}

#[derive(Default)]
struct DescriptorPoolInner {
    names: HashMap<Box<str>, Definition>,
    file_names: HashMap<Box<str>, FileIndex>,
    files: Vec<FileDescriptorInner>,
    messages: Vec<MessageDescriptorInner>,
    enums: Vec<EnumDescriptorInner>,
}

#[derive(Debug, Clone, Copy)]
enum Definition {
    Message(MessageIndex),
    Enum(EnumIndex),
}

struct Identity {
    file: FileIndex,
    full_name: Box<str>,
    name_index: usize,
}

struct FileDescriptorInner {
    name: Box<str>,
    package: Box<str>,
    messages: Vec<MessageIndex>,
    enums: Vec<EnumIndex>,
}

struct MessageDescriptorInner {
    id: Identity,
    parent: Option<MessageIndex>,
    fields: Vec<FieldDescriptorInner>,
    field_numbers: BTreeMap<u32, FieldIndex>,
    field_names: HashMap<Box<str>, FieldIndex>,
    field_json_names: HashMap<Box<str>, FieldIndex>,
    oneofs: Vec<OneofDescriptorInner>,
    child_messages: Vec<MessageIndex>,
    child_enums: Vec<EnumIndex>,
}

struct FieldDescriptorInner {
    name: Box<str>,
    json_name: Box<str>,
    number: u32,
    field_type: FieldType,
    type_name: Option<Box<str>>,
    cardinality: Cardinality,
    oneof: Option<OneofIndex>,
    default: Option<Value>,
    map_entry: Option<MapEntryInfo>,
}

struct OneofDescriptorInner {
    name: Box<str>,
    fields: Vec<FieldIndex>,
}

struct EnumDescriptorInner {
    id: Identity,
    values: Vec<EnumValueDescriptorInner>,
    value_names: HashMap<Box<str>, EnumValueIndex>,
    value_numbers: Vec<(i32, EnumValueIndex)>,
}

struct EnumValueDescriptorInner {
    name: Box<str>,
    number: i32,
}

/// A single descriptor file containing protobuf messages and enums.
#[derive(Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pool: DescriptorPool,
    index: FileIndex,
}

/// A protobuf message definition.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: MessageIndex,
}

/// A field of a protobuf message.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: FieldIndex,
}

/// A oneof group in a protobuf message.
#[derive(Clone, PartialEq, Eq)]
pub struct OneofDescriptor {
    message: MessageDescriptor,
    index: OneofIndex,
}

/// A protobuf enum definition.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: EnumIndex,
}

/// A value of a protobuf enum definition.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    parent: EnumDescriptor,
    index: EnumValueIndex,
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field(
                "files",
                &self.inner.files.iter().map(|f| &f.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl DescriptorPool {
    /// Gets an iterator over the files in this pool, in the order they were added.
    pub fn files(&self) -> impl ExactSizeIterator<Item = FileDescriptor> + '_ {
        (0..self.inner.files.len()).map(|index| FileDescriptor {
            pool: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets the file with the given name, if it exists.
    pub fn get_file_by_name(&self, name: &str) -> Option<FileDescriptor> {
        self.inner
            .file_names
            .get(name)
            .map(|&index| FileDescriptor {
                pool: self.clone(),
                index,
            })
    }

    /// Gets an iterator over every message in this pool, including nested ones.
    pub fn all_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(|index| MessageDescriptor {
            pool: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets an iterator over every enum in this pool, including nested ones.
    pub fn all_enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        (0..self.inner.enums.len()).map(|index| EnumDescriptor {
            pool: self.clone(),
            index: to_index(index),
        })
    }

    /// Resolves a fully-qualified name to a message descriptor.
    ///
    /// Unknown names return `None`; resolution failure is never an error at
    /// this layer. A leading `.` is permitted.
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        match self.inner.get_by_name(name) {
            Some(Definition::Message(index)) => Some(MessageDescriptor {
                pool: self.clone(),
                index,
            }),
            _ => None,
        }
    }

    /// Resolves a fully-qualified name to an enum descriptor.
    ///
    /// Unknown names return `None`. A leading `.` is permitted.
    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        match self.inner.get_by_name(name) {
            Some(Definition::Enum(index)) => Some(EnumDescriptor {
                pool: self.clone(),
                index,
            }),
            _ => None,
        }
    }
}

impl DescriptorPoolInner {
    fn get_by_name(&self, name: &str) -> Option<Definition> {
        let name = name.strip_prefix('.').unwrap_or(name);
        self.names.get(name).copied()
    }
}

impl FileDescriptor {
    fn inner(&self) -> &FileDescriptorInner {
        &self.pool.inner.files[self.index as usize]
    }

    /// Gets a reference to the pool this file is part of.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// The name of this file.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// The package name of this file, or the empty string if it has none.
    pub fn package_name(&self) -> &str {
        &self.inner().package
    }

    /// Gets an iterator over the top-level messages of this file.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .messages
            .iter()
            .map(|&index| MessageDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets an iterator over the top-level enums of this file.
    pub fn enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner().enums.iter().map(|&index| EnumDescriptor {
            pool: self.pool.clone(),
            index,
        })
    }

    /// Looks up a top-level message by its simple or fully-qualified name.
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        let message = self
            .pool
            .get_message_by_name(name)
            .or_else(|| self.pool.get_message_by_name(&self.qualify(name)))?;
        if message.parent_file().index == self.index && message.parent_message().is_none() {
            Some(message)
        } else {
            None
        }
    }

    /// Looks up a top-level enum by its simple or fully-qualified name.
    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        let enum_ = self
            .pool
            .get_enum_by_name(name)
            .or_else(|| self.pool.get_enum_by_name(&self.qualify(name)))?;
        if enum_.parent_file().index == self.index {
            Some(enum_)
        } else {
            None
        }
    }

    fn qualify(&self, name: &str) -> String {
        let package = self.package_name();
        if package.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{}", package, name)
        }
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("name", &self.name())
            .field("package", &self.package_name())
            .finish()
    }
}

impl MessageDescriptor {
    fn inner(&self) -> &MessageDescriptorInner {
        &self.pool.inner.messages[self.index as usize]
    }

    /// Gets a reference to the pool this message is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the file this message is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor {
            pool: self.pool.clone(),
            index: self.inner().id.file,
        }
    }

    /// Gets the message this message is nested inside, if any.
    pub fn parent_message(&self) -> Option<MessageDescriptor> {
        self.inner().parent.map(|index| MessageDescriptor {
            pool: self.pool.clone(),
            index,
        })
    }

    /// The short name of this message, e.g. `MyMessage`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// The fully-qualified name of this message, e.g. `my.package.MyMessage`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets an iterator over the fields of this message, in definition order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.inner().fields.len()).map(|index| FieldDescriptor {
            message: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets an iterator over the oneofs of this message.
    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        (0..self.inner().oneofs.len()).map(|index| OneofDescriptor {
            message: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets an iterator over the messages nested inside this message.
    pub fn child_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .child_messages
            .iter()
            .map(|&index| MessageDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets an iterator over the enums nested inside this message.
    pub fn child_enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner()
            .child_enums
            .iter()
            .map(|&index| EnumDescriptor {
                pool: self.pool.clone(),
                index,
            })
    }

    /// Gets the field with the given number, or `None` if no such field exists.
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .field_numbers
            .get(&number)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Gets the field with the given name, or `None` if no such field exists.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_names
            .get(name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Gets the field with the given JSON name, or `None` if no such field exists.
    pub fn get_field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_json_names
            .get(json_name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl FieldDescriptor {
    fn inner(&self) -> &FieldDescriptorInner {
        &self.message.inner().fields[self.index as usize]
    }

    /// Gets the message this field belongs to.
    pub fn parent_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// The name of this field.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// The JSON name of this field, the lowerCamelCase form of
    /// [`name`][Self::name] unless overridden when the descriptor was built.
    pub fn json_name(&self) -> &str {
        &self.inner().json_name
    }

    /// The number of this field.
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// The declared type of this field.
    pub fn field_type(&self) -> FieldType {
        self.inner().field_type
    }

    /// The fully-qualified name of the referenced type, for message, enum and
    /// group fields.
    pub fn type_name(&self) -> Option<&str> {
        self.inner().type_name.as_deref()
    }

    /// The cardinality of this field.
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    /// Whether this field is repeated. Map fields are repeated internally.
    pub fn is_repeated(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    /// Whether this field carries legacy proto2 `required` cardinality.
    pub fn is_required(&self) -> bool {
        self.cardinality() == Cardinality::Required
    }

    /// Whether this field holds a list of values. Map fields are not lists.
    pub fn is_list(&self) -> bool {
        self.is_repeated() && !self.is_map()
    }

    /// Whether this field is a map.
    pub fn is_map(&self) -> bool {
        self.inner().map_entry.is_some()
    }

    /// Whether this field is a legacy proto2 group.
    pub fn is_group(&self) -> bool {
        self.field_type() == FieldType::Group
    }

    /// Whether repeated values of this field may use the packed encoding.
    pub fn is_packable(&self) -> bool {
        self.is_list() && self.field_type().is_packable()
    }

    /// The key and value types of this field, if it is a map.
    pub fn map_entry(&self) -> Option<&MapEntryInfo> {
        self.inner().map_entry.as_ref()
    }

    /// The custom default value for this field, if one was declared.
    pub fn default_value(&self) -> Option<&Value> {
        self.inner().default.as_ref()
    }

    /// Gets the oneof containing this field, if any.
    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.inner().oneof.map(|index| OneofDescriptor {
            message: self.message.clone(),
            index,
        })
    }

    /// Resolves the type of this field against the pool.
    ///
    /// Scalar types always resolve. Message, group and enum types resolve by
    /// looking up [`type_name`][Self::type_name]; `None` is returned when the
    /// name is missing, unknown, or names the wrong kind of definition.
    pub fn kind(&self) -> Option<Kind> {
        resolve_kind(
            self.message.parent_pool(),
            self.field_type(),
            self.type_name(),
        )
    }

    /// Resolves the value type of this map field against the pool.
    ///
    /// Returns `None` for non-map fields and for unresolved value type names.
    pub fn map_value_kind(&self) -> Option<Kind> {
        let entry = self.map_entry()?;
        resolve_kind(
            self.message.parent_pool(),
            entry.value_type(),
            entry.value_type_name(),
        )
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name())
            .field("number", &self.number())
            .field("field_type", &self.field_type())
            .finish()
    }
}

fn resolve_kind(pool: &DescriptorPool, ty: FieldType, type_name: Option<&str>) -> Option<Kind> {
    match ty {
        FieldType::Double => Some(Kind::Double),
        FieldType::Float => Some(Kind::Float),
        FieldType::Int32 => Some(Kind::Int32),
        FieldType::Int64 => Some(Kind::Int64),
        FieldType::Uint32 => Some(Kind::Uint32),
        FieldType::Uint64 => Some(Kind::Uint64),
        FieldType::Sint32 => Some(Kind::Sint32),
        FieldType::Sint64 => Some(Kind::Sint64),
        FieldType::Fixed32 => Some(Kind::Fixed32),
        FieldType::Fixed64 => Some(Kind::Fixed64),
        FieldType::Sfixed32 => Some(Kind::Sfixed32),
        FieldType::Sfixed64 => Some(Kind::Sfixed64),
        FieldType::Bool => Some(Kind::Bool),
        FieldType::String => Some(Kind::String),
        FieldType::Bytes => Some(Kind::Bytes),
        FieldType::Message | FieldType::Group => {
            pool.get_message_by_name(type_name?).map(Kind::Message)
        }
        FieldType::Enum => pool.get_enum_by_name(type_name?).map(Kind::Enum),
    }
}

impl OneofDescriptor {
    fn inner(&self) -> &OneofDescriptorInner {
        &self.message.inner().oneofs[self.index as usize]
    }

    /// Gets the message this oneof belongs to.
    pub fn parent_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// The name of this oneof.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets an iterator over the fields that are members of this oneof.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner().fields.iter().map(|&index| FieldDescriptor {
            message: self.message.clone(),
            index,
        })
    }
}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneofDescriptor")
            .field("name", &self.name())
            .finish()
    }
}

impl EnumDescriptor {
    fn inner(&self) -> &EnumDescriptorInner {
        &self.pool.inner.enums[self.index as usize]
    }

    /// Gets a reference to the pool this enum is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the file this enum is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor {
            pool: self.pool.clone(),
            index: self.inner().id.file,
        }
    }

    /// The short name of this enum.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// The fully-qualified name of this enum.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets an iterator over the values of this enum, in definition order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = EnumValueDescriptor> + '_ {
        (0..self.inner().values.len()).map(|index| EnumValueDescriptor {
            parent: self.clone(),
            index: to_index(index),
        })
    }

    /// Gets the default value of this enum: the zero-numbered value if one
    /// exists, otherwise the first declared value.
    pub fn default_value(&self) -> EnumValueDescriptor {
        self.get_value(0).unwrap_or(EnumValueDescriptor {
            parent: self.clone(),
            index: 0,
        })
    }

    /// Gets the value with the given number, or `None` if no such value exists.
    ///
    /// If multiple values share a number, the first declared one is returned.
    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        let inner = self.inner();
        inner
            .value_numbers
            .binary_search_by_key(&number, |&(n, _)| n)
            .ok()
            .map(|found| EnumValueDescriptor {
                parent: self.clone(),
                index: inner.value_numbers[found].1,
            })
    }

    /// Gets the value with the given name, or `None` if no such value exists.
    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        self.inner()
            .value_names
            .get(name)
            .map(|&index| EnumValueDescriptor {
                parent: self.clone(),
                index,
            })
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl EnumValueDescriptor {
    fn inner(&self) -> &EnumValueDescriptorInner {
        &self.parent.inner().values[self.index as usize]
    }

    /// Gets the enum this value belongs to.
    pub fn parent_enum(&self) -> &EnumDescriptor {
        &self.parent
    }

    /// The name of this enum value.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// The number of this enum value.
    pub fn number(&self) -> i32 {
        self.inner().number
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValueDescriptor")
            .field("name", &self.name())
            .field("number", &self.number())
            .finish()
    }
}

impl Identity {
    fn new(file: FileIndex, full_name: &str, name: &str) -> Identity {
        debug_assert!(full_name.ends_with(name));
        let name_index = full_name.len() - name.len();
        debug_assert!(name_index == 0 || full_name.as_bytes()[name_index - 1] == b'.');
        Identity {
            file,
            full_name: full_name.into(),
            name_index,
        }
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn name(&self) -> &str {
        &self.full_name[self.name_index..]
    }
}

fn to_index(i: usize) -> DescriptorIndex {
    i.try_into().expect("index too large")
}

#[test]
fn assert_descriptor_send_sync() {
    fn test_send_sync<T: Send + Sync>() {}

    test_send_sync::<DescriptorPool>();
    test_send_sync::<Kind>();
    test_send_sync::<DescriptorError>();
}
