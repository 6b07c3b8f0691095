use std::collections::{BTreeMap, HashMap};

use crate::{
    descriptor::{
        Cardinality, Definition, DescriptorError, DescriptorPool, DescriptorPoolInner,
        EnumDescriptorInner, EnumValueDescriptorInner, FieldDescriptorInner, FieldType,
        FileDescriptor, FileDescriptorInner, Identity, MapEntryInfo, MessageDescriptorInner,
        MessageIndex, OneofDescriptorInner, to_index, MAX_FIELD_NUMBER, RESERVED_FIELD_NUMBERS,
    },
    dynamic::{json::to_json_name, Value},
};

/// Describes a descriptor file to be added to a [`DescriptorPool`].
///
/// # Examples
///
/// ```
/// # use prost_dynamic::{FieldBuilder, FieldType, FileDescriptorBuilder, MessageBuilder};
/// let file = FileDescriptorBuilder::new("example.proto")
///     .package("example.v1")
///     .message(
///         MessageBuilder::new("Thing")
///             .field(FieldBuilder::new("name", 1, FieldType::String))
///             .field(FieldBuilder::new("size", 2, FieldType::Uint32)),
///     )
///     .build()
///     .unwrap();
/// assert!(file.get_message_by_name("Thing").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct FileDescriptorBuilder {
    name: String,
    package: String,
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
}

/// Describes a message to be added to a file or parent message.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    name: String,
    fields: Vec<FieldBuilder>,
    oneofs: Vec<OneofBuilder>,
    messages: Vec<MessageBuilder>,
    enums: Vec<EnumBuilder>,
}

/// Describes a oneof group inside a message. Fields join it through
/// [`FieldBuilder::oneof_index`].
#[derive(Debug, Clone)]
pub struct OneofBuilder {
    name: String,
}

/// Describes a single field of a message.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    number: u32,
    field_type: FieldType,
    type_name: Option<String>,
    json_name: Option<String>,
    cardinality: Cardinality,
    oneof: Option<usize>,
    default: Option<Value>,
    map_entry: Option<(FieldType, FieldType, Option<String>)>,
}

/// Describes an enum to be added to a file or parent message.
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    name: String,
    values: Vec<(String, i32)>,
}

impl FileDescriptorBuilder {
    /// Creates a builder for a file with the given name and no package.
    pub fn new(name: impl ToString) -> Self {
        FileDescriptorBuilder {
            name: name.to_string(),
            package: String::new(),
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Sets the package name of the file.
    pub fn package(mut self, package: impl ToString) -> Self {
        self.package = package.to_string();
        self
    }

    /// Adds a top-level message to the file.
    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds a top-level enum to the file.
    pub fn enum_type(mut self, enum_: EnumBuilder) -> Self {
        self.enums.push(enum_);
        self
    }

    /// Builds a pool containing just this file and returns the file handle.
    pub fn build(self) -> Result<FileDescriptor, DescriptorError> {
        let pool = DescriptorPool::build([self])?;
        let file = pool.files().next().expect("pool has one file");
        Ok(file)
    }
}

impl MessageBuilder {
    /// Creates a builder for a message with the given name.
    pub fn new(name: impl ToString) -> Self {
        MessageBuilder {
            name: name.to_string(),
            fields: Vec::new(),
            oneofs: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Adds a field to the message.
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a oneof group to the message. Fields reference it by index, in
    /// the order oneofs were added.
    pub fn oneof(mut self, oneof: OneofBuilder) -> Self {
        self.oneofs.push(oneof);
        self
    }

    /// Adds a nested message.
    pub fn message(mut self, message: MessageBuilder) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds a nested enum.
    pub fn enum_type(mut self, enum_: EnumBuilder) -> Self {
        self.enums.push(enum_);
        self
    }
}

impl OneofBuilder {
    /// Creates a builder for a oneof group with the given name.
    pub fn new(name: impl ToString) -> Self {
        OneofBuilder {
            name: name.to_string(),
        }
    }
}

impl FieldBuilder {
    /// Creates a builder for an optional field of the given type.
    pub fn new(name: impl ToString, number: u32, field_type: FieldType) -> Self {
        FieldBuilder {
            name: name.to_string(),
            number,
            field_type,
            type_name: None,
            json_name: None,
            cardinality: Cardinality::Optional,
            oneof: None,
            default: None,
            map_entry: None,
        }
    }

    /// Creates a builder for a map field with the given key and value types.
    ///
    /// Map fields are repeated messages of synthetic `{key, value}` entries on
    /// the wire; the builder takes care of that representation. Message or
    /// enum value types additionally need
    /// [`map_value_type_name`][Self::map_value_type_name].
    pub fn map(
        name: impl ToString,
        number: u32,
        key_type: FieldType,
        value_type: FieldType,
    ) -> Self {
        let mut builder = FieldBuilder::new(name, number, FieldType::Message);
        builder.cardinality = Cardinality::Repeated;
        builder.map_entry = Some((key_type, value_type, None));
        builder
    }

    /// Sets the fully-qualified name of the map value type.
    pub fn map_value_type_name(mut self, name: impl ToString) -> Self {
        if let Some((_, _, value_type_name)) = &mut self.map_entry {
            *value_type_name = Some(name.to_string());
        }
        self
    }

    /// Marks the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.cardinality = Cardinality::Repeated;
        self
    }

    /// Marks the field with legacy proto2 `required` cardinality.
    pub fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    /// Sets the fully-qualified name of the referenced type. Required for
    /// message, enum and group fields.
    pub fn type_name(mut self, name: impl ToString) -> Self {
        self.type_name = Some(name.to_string());
        self
    }

    /// Overrides the JSON name of the field. Defaults to the lowerCamelCase
    /// form of the field name.
    pub fn json_name(mut self, name: impl ToString) -> Self {
        self.json_name = Some(name.to_string());
        self
    }

    /// Places the field in the containing message's `index`-th oneof.
    pub fn oneof_index(mut self, index: usize) -> Self {
        self.oneof = Some(index);
        self
    }

    /// Sets a custom default value, returned by reads of the unset field.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

impl EnumBuilder {
    /// Creates a builder for an enum with the given name.
    pub fn new(name: impl ToString) -> Self {
        EnumBuilder {
            name: name.to_string(),
            values: Vec::new(),
        }
    }

    /// Adds a value to the enum.
    pub fn value(mut self, name: impl ToString, number: i32) -> Self {
        self.values.push((name.to_string(), number));
        self
    }
}

impl DescriptorPool {
    /// Validates the given files and freezes them into a pool.
    ///
    /// Names of messages and enums are registered under their fully-qualified
    /// names and may be referenced by fields of any file in the same build,
    /// in any order. References that never resolve are not an error here;
    /// they surface when a codec touches the field.
    pub fn build(
        files: impl IntoIterator<Item = FileDescriptorBuilder>,
    ) -> Result<DescriptorPool, DescriptorError> {
        let mut inner = DescriptorPoolInner::default();

        for file in files {
            if inner.file_names.contains_key(file.name.as_str()) {
                return Err(DescriptorError::duplicate_name(&file.name));
            }

            let file_index = to_index(inner.files.len());
            inner.files.push(FileDescriptorInner {
                name: file.name.as_str().into(),
                package: file.package.as_str().into(),
                messages: Vec::new(),
                enums: Vec::new(),
            });
            inner.file_names.insert(file.name.as_str().into(), file_index);

            for enum_ in file.enums {
                let index = add_enum(&mut inner, file_index, &file.package, enum_)?;
                inner.files[file_index as usize].enums.push(index);
            }
            for message in file.messages {
                let index = add_message(&mut inner, file_index, None, &file.package, message)?;
                inner.files[file_index as usize].messages.push(index);
            }
        }

        Ok(DescriptorPool {
            inner: std::sync::Arc::new(inner),
        })
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn register_name(
    inner: &mut DescriptorPoolInner,
    full_name: &str,
    definition: Definition,
) -> Result<(), DescriptorError> {
    if inner.names.insert(full_name.into(), definition).is_some() {
        return Err(DescriptorError::duplicate_name(full_name));
    }
    Ok(())
}

fn add_enum(
    inner: &mut DescriptorPoolInner,
    file: u32,
    prefix: &str,
    enum_: EnumBuilder,
) -> Result<u32, DescriptorError> {
    let full_name = join_name(prefix, &enum_.name);
    if enum_.values.is_empty() {
        return Err(DescriptorError::empty_enum(&full_name));
    }

    let index = to_index(inner.enums.len());
    register_name(inner, &full_name, Definition::Enum(index))?;

    let mut values = Vec::with_capacity(enum_.values.len());
    let mut value_names = HashMap::with_capacity(enum_.values.len());
    let mut value_numbers = Vec::with_capacity(enum_.values.len());
    for (name, number) in enum_.values {
        let value_index = to_index(values.len());
        if value_names.insert(name.as_str().into(), value_index).is_some() {
            return Err(DescriptorError::duplicate_name(join_name(
                &full_name, &name,
            )));
        }
        value_numbers.push((number, value_index));
        values.push(EnumValueDescriptorInner {
            name: name.into_boxed_str(),
            number,
        });
    }
    // Aliased numbers are allowed; lookup by number returns the first
    // declared value.
    value_numbers.sort();
    value_numbers.dedup_by_key(|&mut (number, _)| number);

    inner.enums.push(EnumDescriptorInner {
        id: Identity::new(file, &full_name, full_name.rsplit('.').next().unwrap()),
        values,
        value_names,
        value_numbers,
    });
    Ok(index)
}

fn add_message(
    inner: &mut DescriptorPoolInner,
    file: u32,
    parent: Option<MessageIndex>,
    prefix: &str,
    message: MessageBuilder,
) -> Result<u32, DescriptorError> {
    let full_name = join_name(prefix, &message.name);
    let index = to_index(inner.messages.len());
    register_name(inner, &full_name, Definition::Message(index))?;

    let mut oneofs: Vec<OneofDescriptorInner> = message
        .oneofs
        .into_iter()
        .map(|oneof| OneofDescriptorInner {
            name: oneof.name.into_boxed_str(),
            fields: Vec::new(),
        })
        .collect();

    let mut fields = Vec::with_capacity(message.fields.len());
    let mut field_numbers = BTreeMap::new();
    let mut field_names = HashMap::with_capacity(message.fields.len());
    let mut field_json_names = HashMap::with_capacity(message.fields.len());

    for field in message.fields {
        let field_index = to_index(fields.len());
        let built = build_field(&full_name, field, &mut oneofs, field_index)?;

        if field_numbers.insert(built.number, field_index).is_some() {
            return Err(DescriptorError::duplicate_field_number(
                &full_name,
                built.number,
            ));
        }
        if field_names
            .insert(built.name.clone(), field_index)
            .is_some()
        {
            return Err(DescriptorError::duplicate_name(join_name(
                &full_name,
                &built.name,
            )));
        }
        if field_json_names
            .insert(built.json_name.clone(), field_index)
            .is_some()
        {
            return Err(DescriptorError::duplicate_name(join_name(
                &full_name,
                &built.json_name,
            )));
        }
        fields.push(built);
    }

    inner.messages.push(MessageDescriptorInner {
        id: Identity::new(file, &full_name, full_name.rsplit('.').next().unwrap()),
        parent,
        fields,
        field_numbers,
        field_names,
        field_json_names,
        oneofs,
        child_messages: Vec::new(),
        child_enums: Vec::new(),
    });

    let mut child_enums = Vec::with_capacity(message.enums.len());
    for enum_ in message.enums {
        child_enums.push(add_enum(inner, file, &full_name, enum_)?);
    }
    let mut child_messages = Vec::with_capacity(message.messages.len());
    for nested in message.messages {
        child_messages.push(add_message(inner, file, Some(index), &full_name, nested)?);
    }
    let message_inner = &mut inner.messages[index as usize];
    message_inner.child_enums = child_enums;
    message_inner.child_messages = child_messages;

    Ok(index)
}

fn build_field(
    message: &str,
    field: FieldBuilder,
    oneofs: &mut [OneofDescriptorInner],
    field_index: u32,
) -> Result<FieldDescriptorInner, DescriptorError> {
    if field.number == 0
        || field.number > MAX_FIELD_NUMBER
        || RESERVED_FIELD_NUMBERS.contains(&field.number)
    {
        return Err(DescriptorError::invalid_field_number(
            message,
            &field.name,
            field.number,
        ));
    }

    let map_entry = match field.map_entry {
        Some((key_type, value_type, value_type_name)) => {
            if !key_type.is_valid_map_key() {
                return Err(DescriptorError::invalid_map_key_type(
                    message,
                    &field.name,
                    key_type,
                ));
            }
            if value_type == FieldType::Group {
                return Err(DescriptorError::invalid_map_value_type(
                    message,
                    &field.name,
                    value_type,
                ));
            }
            if value_type.is_composite() && value_type_name.is_none() {
                return Err(DescriptorError::missing_type_name(message, &field.name));
            }
            Some(MapEntryInfo::new(
                key_type,
                value_type,
                value_type_name.map(String::into_boxed_str),
            ))
        }
        None => None,
    };

    // Map fields synthesize their own entry type; only plain composite
    // fields need an explicit type name.
    if map_entry.is_none() && field.field_type.is_composite() && field.type_name.is_none() {
        return Err(DescriptorError::missing_type_name(message, &field.name));
    }

    let oneof = match field.oneof {
        Some(oneof_index) => {
            if oneof_index >= oneofs.len() || field.cardinality == Cardinality::Repeated {
                return Err(DescriptorError::invalid_oneof_index(message, &field.name));
            }
            oneofs[oneof_index].fields.push(field_index);
            Some(to_index(oneof_index))
        }
        None => None,
    };

    if let Some(default) = &field.default {
        if field.cardinality == Cardinality::Repeated
            || !default_matches_type(field.field_type, default)
        {
            return Err(DescriptorError::invalid_default_value(
                message,
                &field.name,
                format!("{:?}", default),
            ));
        }
    }

    let json_name = field
        .json_name
        .unwrap_or_else(|| to_json_name(&field.name));

    Ok(FieldDescriptorInner {
        name: field.name.into_boxed_str(),
        json_name: json_name.into_boxed_str(),
        number: field.number,
        field_type: field.field_type,
        type_name: field.type_name.map(String::into_boxed_str),
        cardinality: field.cardinality,
        oneof,
        default: field.default,
        map_entry,
    })
}

fn default_matches_type(field_type: FieldType, default: &Value) -> bool {
    matches!(
        (field_type, default),
        (FieldType::Double, Value::F64(_))
            | (FieldType::Float, Value::F32(_))
            | (
                FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32,
                Value::I32(_)
            )
            | (
                FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64,
                Value::I64(_)
            )
            | (FieldType::Uint32 | FieldType::Fixed32, Value::U32(_))
            | (FieldType::Uint64 | FieldType::Fixed64, Value::U64(_))
            | (FieldType::Bool, Value::Bool(_))
            | (FieldType::String, Value::String(_))
            | (FieldType::Bytes, Value::Bytes(_))
            | (FieldType::Enum, Value::EnumNumber(_) | Value::EnumName(_))
    )
}
