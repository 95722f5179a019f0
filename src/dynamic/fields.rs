use std::{
    borrow::Cow,
    collections::btree_map::{self, BTreeMap},
};

use crate::{ExtensionRegistry, FieldDescriptor, Kind, Value};

use super::unknown::UnknownFieldSet;

/// Storage for the fields of a [`DynamicMessage`](super::DynamicMessage).
///
/// Only explicitly set fields are stored. Regular fields and extensions are kept apart so an
/// extension number can never alias a field declared later in the message.
#[derive(Debug, Default, Clone)]
pub(super) struct FieldSet {
    fields: BTreeMap<u32, Value>,
    oneofs: BTreeMap<usize, u32>,
    extensions: BTreeMap<u32, ExtensionField>,
    pub(super) unknown: UnknownFieldSet,
}

#[derive(Debug, Clone)]
pub(super) struct ExtensionField {
    pub(super) desc: FieldDescriptor,
    pub(super) value: Value,
}

/// A field with its stored value, yielded in encoding order.
pub(super) enum FieldEntry<'a> {
    Field(&'a Value, FieldDescriptor),
    Extension(&'a Value, &'a FieldDescriptor),
}

impl FieldSet {
    fn get_value(&self, desc: &FieldDescriptor) -> Option<&Value> {
        if desc.is_extension() {
            self.extensions
                .get(&desc.number())
                .filter(|ext| ext.desc == *desc)
                .map(|ext| &ext.value)
        } else {
            self.fields.get(&desc.number())
        }
    }

    pub(super) fn has(&self, desc: &FieldDescriptor) -> bool {
        self.get_value(desc)
            .map_or(false, |value| has_value(desc, value))
    }

    /// Gets the stored value, or the default value for unset fields. Unset singular message
    /// fields have no value.
    pub(super) fn get(&self, desc: &FieldDescriptor) -> Option<Cow<'_, Value>> {
        match self.get_value(desc) {
            Some(value) => Some(Cow::Borrowed(value)),
            None if is_singular_message(desc) => None,
            None => Some(Cow::Owned(Value::default_value_for_field(desc))),
        }
    }

    pub(super) fn get_mut(
        &mut self,
        desc: &FieldDescriptor,
        registry: &ExtensionRegistry,
    ) -> &mut Value {
        self.select_oneof_member(desc);
        if desc.is_extension() {
            let slot = match self.extensions.entry(desc.number()) {
                btree_map::Entry::Occupied(entry) => {
                    let slot = entry.into_mut();
                    if slot.desc != *desc {
                        *slot = ExtensionField::new(desc, registry);
                    }
                    slot
                }
                btree_map::Entry::Vacant(entry) => entry.insert(ExtensionField::new(desc, registry)),
            };
            &mut slot.value
        } else {
            self.fields
                .entry(desc.number())
                .or_insert_with(|| default_in_registry(desc, registry))
        }
    }

    /// Stores a value which already has the representation of `desc`.
    pub(super) fn set(&mut self, desc: &FieldDescriptor, value: Value) {
        debug_assert!(
            value.is_valid_for_field(desc),
            "invalid value {:?} for field {:?}",
            value,
            desc,
        );

        self.select_oneof_member(desc);
        if desc.is_extension() {
            self.extensions.insert(
                desc.number(),
                ExtensionField {
                    desc: desc.clone(),
                    value,
                },
            );
        } else {
            self.fields.insert(desc.number(), value);
        }
    }

    pub(super) fn clear(&mut self, desc: &FieldDescriptor) {
        if desc.is_extension() {
            if let btree_map::Entry::Occupied(entry) = self.extensions.entry(desc.number()) {
                if entry.get().desc == *desc {
                    entry.remove();
                }
            }
        } else {
            self.fields.remove(&desc.number());
            if let Some(oneof) = desc.containing_oneof() {
                if self.oneofs.get(&oneof.index()) == Some(&desc.number()) {
                    self.oneofs.remove(&oneof.index());
                }
            }
        }
    }

    pub(super) fn clear_all(&mut self) {
        self.fields.clear();
        self.oneofs.clear();
        self.extensions.clear();
        self.unknown.clear();
    }

    /// Gets the number of the member of the oneof with the given index that is currently set.
    pub(super) fn oneof_member(&self, index: usize) -> Option<u32> {
        self.oneofs.get(&index).copied()
    }

    fn select_oneof_member(&mut self, desc: &FieldDescriptor) {
        if let Some(oneof) = desc.containing_oneof() {
            if let Some(previous) = self.oneofs.insert(oneof.index(), desc.number()) {
                if previous != desc.number() {
                    self.fields.remove(&previous);
                }
            }
        }
    }

    /// Iterates over the populated fields then the populated extensions, each in number order.
    pub(super) fn iter<'a>(
        &'a self,
        message: &'a crate::MessageDescriptor,
    ) -> impl Iterator<Item = FieldEntry<'a>> + 'a {
        let fields = self.fields.iter().filter_map(move |(&number, value)| {
            let desc = message.get_field(number)?;
            if has_value(&desc, value) {
                Some(FieldEntry::Field(value, desc))
            } else {
                None
            }
        });
        let extensions = self.extensions.values().filter_map(|ext| {
            if has_value(&ext.desc, &ext.value) {
                Some(FieldEntry::Extension(&ext.value, &ext.desc))
            } else {
                None
            }
        });
        fields.chain(extensions)
    }

    pub(super) fn extensions(&self) -> impl Iterator<Item = &ExtensionField> + '_ {
        self.extensions
            .values()
            .filter(|ext| has_value(&ext.desc, &ext.value))
    }
}

impl ExtensionField {
    fn new(desc: &FieldDescriptor, registry: &ExtensionRegistry) -> Self {
        ExtensionField {
            desc: desc.clone(),
            value: default_in_registry(desc, registry),
        }
    }
}

pub(super) fn has_value(desc: &FieldDescriptor, value: &Value) -> bool {
    desc.supports_presence() || !value.is_default_for_field(desc)
}

fn is_singular_message(desc: &FieldDescriptor) -> bool {
    !desc.is_list() && !desc.is_map() && matches!(desc.kind(), Kind::Message(_))
}

/// The default value for a field, with nested messages bound to `registry`.
pub(super) fn default_in_registry(desc: &FieldDescriptor, registry: &ExtensionRegistry) -> Value {
    let mut value = Value::default_value_for_field(desc);
    if let Value::Message(message) = &mut value {
        message.registry = registry.clone();
    }
    value
}
