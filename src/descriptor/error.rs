use std::fmt;

/// An error that may occur while building a [`DescriptorPool`][crate::DescriptorPool].
#[derive(Debug)]
pub struct DescriptorError {
    kind: DescriptorErrorKind,
}

#[derive(Debug)]
enum DescriptorErrorKind {
    DuplicateName {
        name: String,
    },
    DuplicateFieldNumber {
        message: String,
        number: u32,
    },
    MissingTypeName {
        message: String,
        field: String,
    },
    InvalidFieldNumber {
        message: String,
        field: String,
        number: u32,
    },
    InvalidMapKeyType {
        message: String,
        field: String,
        key_type: String,
    },
    InvalidMapValueType {
        message: String,
        field: String,
        value_type: String,
    },
    InvalidOneofIndex {
        message: String,
        field: String,
    },
    InvalidDefaultValue {
        message: String,
        field: String,
        value: String,
    },
    EmptyEnum {
        name: String,
    },
}

impl DescriptorError {
    pub(super) fn duplicate_name(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateName {
                name: name.to_string(),
            },
        }
    }

    pub(super) fn duplicate_field_number(message: impl ToString, number: u32) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateFieldNumber {
                message: message.to_string(),
                number,
            },
        }
    }

    pub(super) fn missing_type_name(message: impl ToString, field: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::MissingTypeName {
                message: message.to_string(),
                field: field.to_string(),
            },
        }
    }

    pub(super) fn invalid_field_number(
        message: impl ToString,
        field: impl ToString,
        number: u32,
    ) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidFieldNumber {
                message: message.to_string(),
                field: field.to_string(),
                number,
            },
        }
    }

    pub(super) fn invalid_map_key_type(
        message: impl ToString,
        field: impl ToString,
        key_type: impl ToString,
    ) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidMapKeyType {
                message: message.to_string(),
                field: field.to_string(),
                key_type: key_type.to_string(),
            },
        }
    }

    pub(super) fn invalid_map_value_type(
        message: impl ToString,
        field: impl ToString,
        value_type: impl ToString,
    ) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidMapValueType {
                message: message.to_string(),
                field: field.to_string(),
                value_type: value_type.to_string(),
            },
        }
    }

    pub(super) fn invalid_oneof_index(message: impl ToString, field: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidOneofIndex {
                message: message.to_string(),
                field: field.to_string(),
            },
        }
    }

    pub(super) fn invalid_default_value(
        message: impl ToString,
        field: impl ToString,
        value: impl ToString,
    ) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidDefaultValue {
                message: message.to_string(),
                field: field.to_string(),
                value: value.to_string(),
            },
        }
    }

    pub(super) fn empty_enum(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::EmptyEnum {
                name: name.to_string(),
            },
        }
    }
}

impl std::error::Error for DescriptorError {}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorErrorKind::DuplicateName { name } => {
                write!(f, "the name '{}' is defined multiple times", name)
            }
            DescriptorErrorKind::DuplicateFieldNumber { message, number } => {
                write!(
                    f,
                    "the field number {} is used multiple times in message '{}'",
                    number, message
                )
            }
            DescriptorErrorKind::MissingTypeName { message, field } => {
                write!(
                    f,
                    "field '{}' of message '{}' requires a type name",
                    field, message
                )
            }
            DescriptorErrorKind::InvalidFieldNumber {
                message,
                field,
                number,
            } => {
                write!(
                    f,
                    "the number {} for field '{}' of message '{}' is outside the valid range",
                    number, field, message
                )
            }
            DescriptorErrorKind::InvalidMapKeyType {
                message,
                field,
                key_type,
            } => {
                write!(
                    f,
                    "'{}' is not a valid map key type for field '{}' of message '{}'",
                    key_type, field, message
                )
            }
            DescriptorErrorKind::InvalidMapValueType {
                message,
                field,
                value_type,
            } => {
                write!(
                    f,
                    "'{}' is not a valid map value type for field '{}' of message '{}'",
                    value_type, field, message
                )
            }
            DescriptorErrorKind::InvalidOneofIndex { message, field } => {
                write!(
                    f,
                    "the oneof index for field '{}' of message '{}' is invalid",
                    field, message
                )
            }
            DescriptorErrorKind::InvalidDefaultValue {
                message,
                field,
                value,
            } => {
                write!(
                    f,
                    "the default value '{}' for field '{}' of message '{}' is invalid",
                    value, field, message
                )
            }
            DescriptorErrorKind::EmptyEnum { name } => {
                write!(f, "enum '{}' must have at least one value", name)
            }
        }
    }
}
