use std::{error::Error, fmt};

use super::{DynamicMessage, MapKey, Value};

/// The outcome of a [`DynamicMessage::validate`] pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Returns `true` if no errors were found.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The errors found, in field order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// A single failure found by [`DynamicMessage::validate`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A field with `required` cardinality has no value.
    MissingRequiredField {
        /// Name of the missing field.
        field: String,
    },
    /// A nested message value failed validation.
    NestedMessageValidationFailed {
        /// Name of the message-typed field.
        field: String,
        /// The failures found inside the nested message.
        errors: Vec<ValidationError>,
    },
    /// An element of a repeated message field failed validation.
    RepeatedFieldValidationFailed {
        /// Name of the repeated field.
        field: String,
        /// Index of the failing element.
        index: usize,
        /// The failures found inside the element.
        errors: Vec<ValidationError>,
    },
    /// A value of a message-valued map field failed validation.
    MapFieldValidationFailed {
        /// Name of the map field.
        field: String,
        /// Key of the failing entry.
        key: MapKey,
        /// The failures found inside the entry's value.
        errors: Vec<ValidationError>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingRequiredField { field } => {
                write!(f, "required field '{}' is not set", field)
            }
            ValidationError::NestedMessageValidationFailed { field, errors } => {
                write!(f, "message field '{}' is invalid: ", field)?;
                fmt_errors(f, errors)
            }
            ValidationError::RepeatedFieldValidationFailed {
                field,
                index,
                errors,
            } => {
                write!(f, "element {} of field '{}' is invalid: ", index, field)?;
                fmt_errors(f, errors)
            }
            ValidationError::MapFieldValidationFailed { field, key, errors } => {
                write!(f, "entry {:?} of field '{}' is invalid: ", key, field)?;
                fmt_errors(f, errors)
            }
        }
    }
}

fn fmt_errors(f: &mut fmt::Formatter<'_>, errors: &[ValidationError]) -> fmt::Result {
    let mut first = true;
    for error in errors {
        if !first {
            write!(f, "; ")?;
        }
        write!(f, "{}", error)?;
        first = false;
    }
    Ok(())
}

impl Error for ValidationError {}

impl DynamicMessage {
    /// Performs a recursive required-field audit in the style of proto2.
    ///
    /// Every field with `required` cardinality must have a value; present
    /// message fields are checked recursively, as are the elements of
    /// repeated message fields and the values of message-valued maps.
    /// Messages without required fields (all of proto3) always validate.
    pub fn validate(&self) -> ValidationResult {
        ValidationResult {
            errors: validate_message(self),
        }
    }
}

fn validate_message(message: &DynamicMessage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for field in message.descriptor().fields() {
        if field.is_required() && !message.has_field(&field) {
            errors.push(ValidationError::MissingRequiredField {
                field: field.name().to_owned(),
            });
        }
    }

    for (field, value) in message.fields() {
        match value {
            Value::Message(inner) => {
                let inner_errors = validate_message(inner);
                if !inner_errors.is_empty() {
                    errors.push(ValidationError::NestedMessageValidationFailed {
                        field: field.name().to_owned(),
                        errors: inner_errors,
                    });
                }
            }
            Value::List(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    if let Value::Message(inner) = element {
                        let inner_errors = validate_message(inner);
                        if !inner_errors.is_empty() {
                            errors.push(ValidationError::RepeatedFieldValidationFailed {
                                field: field.name().to_owned(),
                                index,
                                errors: inner_errors,
                            });
                        }
                    }
                }
            }
            Value::Map(entries) => {
                // Sorted so that the error order is deterministic.
                let mut entries: Vec<_> = entries.iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                for (key, entry_value) in entries {
                    if let Value::Message(inner) = entry_value {
                        let inner_errors = validate_message(inner);
                        if !inner_errors.is_empty() {
                            errors.push(ValidationError::MapFieldValidationFailed {
                                field: field.name().to_owned(),
                                key: key.clone(),
                                errors: inner_errors,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    errors
}
