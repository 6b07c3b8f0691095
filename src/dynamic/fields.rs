use std::{borrow::Cow, collections::BTreeMap};

use crate::descriptor::{FieldDescriptor, MessageDescriptor};

use super::Value;

/// Sparse storage for the fields of a dynamic message, keyed by field number.
///
/// A field is semantically set exactly when its number is present here, so
/// iteration order doubles as wire-encoding order.
#[derive(Default, Debug, Clone, PartialEq)]
pub(super) struct DynamicMessageFieldSet {
    fields: BTreeMap<u32, Value>,
}

impl DynamicMessageFieldSet {
    pub(super) fn has(&self, desc: &FieldDescriptor) -> bool {
        self.fields.contains_key(&desc.number())
    }

    pub(super) fn get(&self, desc: &FieldDescriptor) -> Cow<'_, Value> {
        match self.fields.get(&desc.number()) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::default_value_for_field(desc)),
        }
    }

    pub(super) fn get_mut(&mut self, desc: &FieldDescriptor) -> &mut Value {
        self.clear_oneof_siblings(desc);
        self.fields
            .entry(desc.number())
            .or_insert_with(|| Value::default_value_for_field(desc))
    }

    pub(super) fn set(&mut self, desc: &FieldDescriptor, value: Value) {
        self.clear_oneof_siblings(desc);
        self.fields.insert(desc.number(), value);
    }

    fn clear_oneof_siblings(&mut self, desc: &FieldDescriptor) {
        if let Some(oneof) = desc.containing_oneof() {
            for member in oneof.fields() {
                if member.number() != desc.number() {
                    self.fields.remove(&member.number());
                }
            }
        }
    }

    pub(super) fn clear(&mut self, desc: &FieldDescriptor) {
        self.fields.remove(&desc.number());
    }

    pub(super) fn take(&mut self, desc: &FieldDescriptor) -> Option<Value> {
        self.fields.remove(&desc.number())
    }

    /// Iterates set fields in ascending field-number order.
    ///
    /// Numbers without a descriptor entry are skipped; they can only appear
    /// if storage was populated against a different descriptor, which the
    /// mutation paths prevent.
    pub(super) fn iter<'a>(
        &'a self,
        message: &'a MessageDescriptor,
    ) -> impl Iterator<Item = (FieldDescriptor, &'a Value)> + 'a {
        self.fields.iter().filter_map(move |(&number, value)| {
            message.get_field(number).map(|field| (field, value))
        })
    }

    pub(super) fn clear_all(&mut self) {
        self.fields.clear();
    }
}
