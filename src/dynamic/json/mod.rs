mod case;
mod de;
mod ser;

pub(crate) use self::case::to_json_name;

use std::{error::Error, fmt};

use crate::descriptor::MessageDescriptor;

use super::DynamicMessage;

/// Options to control serialization of messages to the
/// [canonical JSON mapping](https://developers.google.com/protocol-buffers/docs/proto3#json).
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    pretty: bool,
    use_proto_field_name: bool,
    emit_unpopulated_fields: bool,
}

/// Options to control deserialization of messages from the canonical JSON
/// mapping.
#[derive(Debug, Clone)]
pub struct DeserializeOptions {
    deny_unknown_fields: bool,
}

impl SerializeOptions {
    /// Creates an instance of [`SerializeOptions`], with the default options
    /// chosen to conform to the standard JSON mapping.
    pub const fn new() -> Self {
        SerializeOptions {
            pretty: false,
            use_proto_field_name: false,
            emit_unpopulated_fields: false,
        }
    }

    /// Whether [`to_json_string`][DynamicMessage::to_json_string] produces
    /// indented multi-line output.
    ///
    /// The default value is `false`.
    pub const fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Whether to use the proto field name instead of the lowerCamelCase JSON
    /// name in JSON object keys.
    ///
    /// The default value is `false`.
    pub const fn use_proto_field_name(mut self, yes: bool) -> Self {
        self.use_proto_field_name = yes;
        self
    }

    /// Whether to emit unset fields with their default values.
    ///
    /// Unset repeated and map fields emit `[]` and `{}`. Unset singular
    /// message fields are always omitted, as they have no default form.
    ///
    /// The default value is `false`.
    pub const fn emit_unpopulated_fields(mut self, yes: bool) -> Self {
        self.emit_unpopulated_fields = yes;
        self
    }

    pub(super) fn is_pretty(&self) -> bool {
        self.pretty
    }

    pub(super) fn proto_field_names(&self) -> bool {
        self.use_proto_field_name
    }

    pub(super) fn unpopulated(&self) -> bool {
        self.emit_unpopulated_fields
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DeserializeOptions {
    /// Creates an instance of [`DeserializeOptions`], with the default
    /// options chosen to conform to the standard JSON mapping.
    pub const fn new() -> Self {
        DeserializeOptions {
            deny_unknown_fields: false,
        }
    }

    /// Whether to fail with [`JsonError::UnknownField`] when the input
    /// contains an object key that matches no field of the message. When
    /// disabled, unknown keys are skipped.
    ///
    /// The default value is `false`.
    pub const fn deny_unknown_fields(mut self, yes: bool) -> Self {
        self.deny_unknown_fields = yes;
        self
    }

    pub(super) fn denies_unknown_fields(&self) -> bool {
        self.deny_unknown_fields
    }
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An error raised while converting a message to or from the canonical JSON
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum JsonError {
    /// The input was not syntactically valid JSON.
    InvalidJson {
        /// Description of the underlying parse failure.
        cause: String,
    },
    /// The JSON value had the wrong overall shape, e.g. an array where a
    /// message object was required.
    InvalidJsonStructure {
        /// The required JSON type.
        expected: String,
        /// The JSON type found.
        actual: String,
    },
    /// An object key matched no field of the message and
    /// [`DeserializeOptions::deny_unknown_fields`] is enabled.
    UnknownField {
        /// The unrecognized key.
        field: String,
        /// Fully-qualified name of the message being parsed.
        message: String,
    },
    /// A JSON value of the wrong type was supplied for a field.
    ValueTypeMismatch {
        /// Name of the field.
        field: String,
        /// Description of what the field accepts.
        expected: String,
        /// Description of the JSON value found.
        actual: String,
    },
    /// A string could not be parsed as a number of the field's type.
    InvalidNumberFormat {
        /// Name of the field.
        field: String,
        /// The offending text.
        value: String,
    },
    /// A number does not fit the field's declared integer or float width.
    NumberOutOfRange {
        /// Name of the field.
        field: String,
        /// The offending number, as text.
        value: String,
    },
    /// A bytes field's payload was not valid base64.
    InvalidBase64 {
        /// Name of the field.
        field: String,
        /// Description of the underlying decode failure.
        cause: String,
    },
    /// A message or enum field's type name did not resolve in the pool.
    InvalidFieldType {
        /// Name of the field.
        field: String,
        /// The unresolved fully-qualified type name.
        type_name: String,
    },
    /// The field's declared type cannot be carried by the JSON mapping.
    UnsupportedFieldType {
        /// Protobuf name of the unsupported type (e.g. `group`).
        type_name: String,
    },
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonError::InvalidJson { cause } => write!(f, "invalid JSON: {}", cause),
            JsonError::InvalidJsonStructure { expected, actual } => {
                write!(f, "expected JSON {}, but found {}", expected, actual)
            }
            JsonError::UnknownField { field, message } => {
                write!(
                    f,
                    "message '{}' has no field named '{}'",
                    message, field
                )
            }
            JsonError::ValueTypeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{}' expects {}, but found {}",
                field, expected, actual
            ),
            JsonError::InvalidNumberFormat { field, value } => {
                write!(f, "field '{}': '{}' is not a valid number", field, value)
            }
            JsonError::NumberOutOfRange { field, value } => {
                write!(f, "field '{}': the number {} is out of range", field, value)
            }
            JsonError::InvalidBase64 { field, cause } => {
                write!(f, "field '{}': invalid base64: {}", field, cause)
            }
            JsonError::InvalidFieldType { field, type_name } => {
                write!(
                    f,
                    "field '{}': the type '{}' was not found in the descriptor pool",
                    field, type_name
                )
            }
            JsonError::UnsupportedFieldType { type_name } => {
                write!(f, "fields of type '{}' cannot be mapped to JSON", type_name)
            }
        }
    }
}

impl Error for JsonError {}

impl DynamicMessage {
    /// Converts this message to a [`serde_json::Value`] tree using the
    /// canonical JSON mapping.
    pub fn to_json_value(&self, options: &SerializeOptions) -> Result<serde_json::Value, JsonError> {
        ser::serialize_message(self, options).map(serde_json::Value::Object)
    }

    /// Serializes this message to a JSON string using the canonical JSON
    /// mapping. Output is indented when [`SerializeOptions::pretty`] is set.
    pub fn to_json_string(&self, options: &SerializeOptions) -> Result<String, JsonError> {
        let value = self.to_json_value(options)?;
        let result = if options.is_pretty() {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        result.map_err(|err| JsonError::InvalidJson {
            cause: err.to_string(),
        })
    }

    /// Parses an instance of the message type specified by `desc` from a
    /// JSON string using the canonical JSON mapping.
    ///
    /// The top-level JSON value must be an object.
    pub fn from_json_str(
        desc: MessageDescriptor,
        json: &str,
        options: &DeserializeOptions,
    ) -> Result<Self, JsonError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|err| JsonError::InvalidJson {
                cause: err.to_string(),
            })?;
        Self::from_json_value(desc, &value, options)
    }

    /// Parses an instance of the message type specified by `desc` from a
    /// [`serde_json::Value`] tree.
    pub fn from_json_value(
        desc: MessageDescriptor,
        json: &serde_json::Value,
        options: &DeserializeOptions,
    ) -> Result<Self, JsonError> {
        de::deserialize_message(desc, json, options)
    }
}

impl serde::Serialize for DynamicMessage {
    /// Serializes this message into `serializer` using the canonical JSON
    /// mapping with default options.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let value = self
            .to_json_value(&SerializeOptions::new())
            .map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

pub(super) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Boolean",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Object",
    }
}
