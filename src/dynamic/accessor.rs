use std::{borrow::Cow, collections::HashMap};

use prost::bytes::Bytes;

use super::{DynamicMessage, FieldId, MapKey, SetFieldError, Value};

/// A read-only typed view over the fields of a [`DynamicMessage`].
///
/// Every getter identifies its field by name or number and returns `None`
/// both when the field is unset and when the stored value's kind disagrees
/// with the requested kind; no getter ever fails.
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    message: &'a DynamicMessage,
}

/// A mutable typed view over the fields of a [`DynamicMessage`].
///
/// Setters run the same validation as
/// [`try_set_field`][DynamicMessage::try_set_field] and report failures as
/// [`SetFieldError`] values.
#[derive(Debug)]
pub struct MessageViewMut<'a> {
    message: &'a mut DynamicMessage,
}

impl<'a> MessageView<'a> {
    pub(super) fn new(message: &'a DynamicMessage) -> Self {
        MessageView { message }
    }

    /// Gets the stored value of a field, or `None` if it is unset.
    pub fn get_value<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a Value> {
        let field = self.message.find_field(field.into()).ok()?;
        if !self.message.has_field(&field) {
            return None;
        }
        match self.message.get_field(&field) {
            Cow::Borrowed(value) => Some(value),
            Cow::Owned(_) => None,
        }
    }

    /// Gets a bool field, or `None` if it is unset or holds another kind.
    pub fn get_bool<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<bool> {
        self.get_value(field)?.as_bool()
    }

    /// Gets a 32-bit signed integer field.
    pub fn get_i32<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<i32> {
        self.get_value(field)?.as_i32()
    }

    /// Gets a 64-bit signed integer field.
    pub fn get_i64<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<i64> {
        self.get_value(field)?.as_i64()
    }

    /// Gets a 32-bit unsigned integer field.
    pub fn get_u32<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<u32> {
        self.get_value(field)?.as_u32()
    }

    /// Gets a 64-bit unsigned integer field.
    pub fn get_u64<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<u64> {
        self.get_value(field)?.as_u64()
    }

    /// Gets a 32-bit floating point field.
    pub fn get_f32<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<f32> {
        self.get_value(field)?.as_f32()
    }

    /// Gets a 64-bit floating point field.
    pub fn get_f64<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<f64> {
        self.get_value(field)?.as_f64()
    }

    /// Gets a string field.
    pub fn get_string<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a str> {
        self.get_value(field)?.as_str()
    }

    /// Gets a bytes field.
    pub fn get_bytes<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a Bytes> {
        self.get_value(field)?.as_bytes()
    }

    /// Gets an enum field that was set by number.
    pub fn get_enum_number<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<i32> {
        self.get_value(field)?.as_enum_number()
    }

    /// Gets an enum field that was set by name.
    pub fn get_enum_name<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a str> {
        self.get_value(field)?.as_enum_name()
    }

    /// Gets a message field.
    pub fn get_message<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a DynamicMessage> {
        self.get_value(field)?.as_message()
    }

    /// Gets the elements of a repeated field.
    pub fn get_list<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<&'a [Value]> {
        self.get_value(field)?.as_list()
    }

    /// Gets the entries of a map field.
    pub fn get_map<'i>(
        &self,
        field: impl Into<FieldId<'i>>,
    ) -> Option<&'a HashMap<MapKey, Value>> {
        self.get_value(field)?.as_map()
    }

    /// Gets a repeated string field as a vector of string slices.
    ///
    /// Returns `None` if any element holds another kind.
    pub fn get_string_list<'i>(&self, field: impl Into<FieldId<'i>>) -> Option<Vec<&'a str>> {
        self.get_list(field)?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Gets a string-keyed, string-valued map field.
    ///
    /// Returns `None` if any key or value holds another kind.
    pub fn get_string_map<'i>(
        &self,
        field: impl Into<FieldId<'i>>,
    ) -> Option<HashMap<&'a str, &'a str>> {
        self.get_map(field)?
            .iter()
            .map(|(key, value)| Some((key.as_str()?, value.as_str()?)))
            .collect()
    }

    /// Gets a message-valued map field.
    ///
    /// Returns `None` if any value holds another kind.
    pub fn get_message_map<'i>(
        &self,
        field: impl Into<FieldId<'i>>,
    ) -> Option<HashMap<MapKey, &'a DynamicMessage>> {
        self.get_map(field)?
            .iter()
            .map(|(key, value)| Some((key.clone(), value.as_message()?)))
            .collect()
    }
}

impl<'a> MessageViewMut<'a> {
    pub(super) fn new(message: &'a mut DynamicMessage) -> Self {
        MessageViewMut { message }
    }

    /// Sets a field to the given value, validating it against the field's
    /// declared type.
    pub fn set<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field = self.message.find_field(field.into())?;
        self.message.try_set_field(&field, value)
    }

    /// Sets a bool field.
    pub fn set_bool<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: bool,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::Bool(value))
    }

    /// Sets a 32-bit signed integer field.
    pub fn set_i32<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: i32,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::I32(value))
    }

    /// Sets a 64-bit signed integer field.
    pub fn set_i64<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: i64,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::I64(value))
    }

    /// Sets a 32-bit unsigned integer field.
    pub fn set_u32<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: u32,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::U32(value))
    }

    /// Sets a 64-bit unsigned integer field.
    pub fn set_u64<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: u64,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::U64(value))
    }

    /// Sets a 32-bit floating point field.
    pub fn set_f32<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: f32,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::F32(value))
    }

    /// Sets a 64-bit floating point field.
    pub fn set_f64<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: f64,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::F64(value))
    }

    /// Sets a string field.
    pub fn set_string<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: impl Into<String>,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::String(value.into()))
    }

    /// Sets a bytes field.
    pub fn set_bytes<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: impl Into<Bytes>,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::Bytes(value.into()))
    }

    /// Sets an enum field by numeric tag.
    pub fn set_enum_number<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        number: i32,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::EnumNumber(number))
    }

    /// Sets an enum field by value name.
    pub fn set_enum_name<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        name: impl Into<String>,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::EnumName(name.into()))
    }

    /// Sets a message field.
    pub fn set_message<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: DynamicMessage,
    ) -> Result<(), SetFieldError> {
        self.set(field, Value::Message(value))
    }

    /// Appends an element to a repeated field.
    pub fn add<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field = self.message.find_field(field.into())?;
        self.message.try_add_repeated(&field, value)
    }

    /// Inserts or replaces an entry of a map field.
    pub fn insert<'i>(
        &mut self,
        field: impl Into<FieldId<'i>>,
        key: MapKey,
        value: Value,
    ) -> Result<(), SetFieldError> {
        let field = self.message.find_field(field.into())?;
        self.message.try_set_map_entry(&field, key, value)
    }

    /// Clears a field.
    pub fn clear<'i>(&mut self, field: impl Into<FieldId<'i>>) -> Result<(), SetFieldError> {
        let field = self.message.find_field(field.into())?;
        self.message.clear_field(&field);
        Ok(())
    }
}
