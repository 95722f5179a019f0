mod fields;
mod json;
mod message;
mod unknown;
mod value;

pub use self::{
    json::{DecodeOptions, EncodeOptions},
    value::{MapKey, Value},
};

use std::{borrow::Cow, collections::BTreeMap, fmt::Write};

use prost::Message;

use self::fields::{FieldEntry, FieldSet};
use crate::{
    Cardinality, Error, ExtensionRegistry, FieldDescriptor, MessageDescriptor, OneofDescriptor,
};

/// [`DynamicMessage`] provides encoding, decoding and reflection of a protobuf message whose
/// type is only known at runtime.
///
/// It wraps a [`MessageDescriptor`] and the [`Value`] of each field that has been set, and
/// implements [`Message`][`prost::Message`]. Fields which are not known to the descriptor are
/// kept as raw wire data and written back unchanged.
///
/// A message may be bound to an [`ExtensionRegistry`], which is used to recognize extension
/// fields while decoding. Nested messages created while decoding share the same registry.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    fields: FieldSet,
    registry: ExtensionRegistry,
}

impl DynamicMessage {
    /// Creates a new, empty instance of [`DynamicMessage`] for the message type specified by the [`MessageDescriptor`].
    pub fn new(desc: MessageDescriptor) -> Self {
        DynamicMessage::new_with_registry(desc, ExtensionRegistry::default())
    }

    /// Creates a new, empty message which resolves extension fields using `registry`.
    pub fn new_with_registry(desc: MessageDescriptor, registry: ExtensionRegistry) -> Self {
        DynamicMessage {
            desc,
            fields: FieldSet::default(),
            registry,
        }
    }

    /// Gets a [`MessageDescriptor`] describing the type of this message.
    pub fn descriptor(&self) -> MessageDescriptor {
        self.desc.clone()
    }

    /// Gets the extension registry bound to this message.
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Returns `true` if this message has the given field set.
    ///
    /// If the field type supports distinguishing whether a value has been set (see [`supports_presence`][FieldDescriptor::supports_presence]),
    /// such as for messages, then this method returns `true` only if a value has been set. For
    /// other types, such as integers, it returns `true` if the value is set to a non-default value.
    ///
    /// If this method returns `false`, then the field will not be included in the encoded bytes
    /// of this message.
    pub fn has_field(&self, field_desc: &FieldDescriptor) -> bool {
        self.fields.has(field_desc)
    }

    /// Gets the value of the given field.
    ///
    /// If the field is unset, its default value is returned: the declared or zero value for
    /// singular fields, and an empty list or map for repeated fields. An unset singular
    /// message field has no value, and `None` is returned.
    pub fn get_field(&self, field_desc: &FieldDescriptor) -> Option<Cow<'_, Value>> {
        self.fields.get(field_desc)
    }

    /// Gets a mutable reference to the value of the given field. If the field is not set,
    /// it is inserted with its default value.
    ///
    /// If the field is a member of a oneof, any other member of the oneof is cleared.
    pub fn get_field_mut(&mut self, field_desc: &FieldDescriptor) -> &mut Value {
        self.fields.get_mut(field_desc, &self.registry)
    }

    /// Sets the value of the given field, converting it to the representation of the field's
    /// type. Passing `None` clears the field.
    ///
    /// If the field is a member of a oneof, any other member of the oneof is cleared.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::TypeMismatch`](crate::ErrorKind::TypeMismatch) if the field
    /// belongs to another message type or the value does not have the shape of the field, and
    /// with [`ErrorKind::NumericOverflow`](crate::ErrorKind::NumericOverflow) if an integer
    /// does not fit the field's type. The message is unchanged on error.
    pub fn try_set_field(
        &mut self,
        field_desc: &FieldDescriptor,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        self.check_owner(field_desc)?;
        match value.into() {
            Some(value) => {
                let value = value.coerce_for_field(field_desc)?;
                self.fields.set(field_desc, value);
            }
            None => self.fields.clear(field_desc),
        }
        Ok(())
    }

    /// Sets the value of the given field.
    ///
    /// # Panics
    ///
    /// Panics if [`try_set_field`][Self::try_set_field] would fail.
    pub fn set_field(&mut self, field_desc: &FieldDescriptor, value: Value) {
        if let Err(err) = self.try_set_field(field_desc, value) {
            panic!("{}", err)
        }
    }

    /// Clears the given field.
    ///
    /// After calling this method, `has_field` will return false for the field,
    /// and it will not be included in the encoded bytes of this message.
    pub fn clear_field(&mut self, field_desc: &FieldDescriptor) {
        self.fields.clear(field_desc);
    }

    /// Returns `true` if this message has a field set with the given number.
    ///
    /// See [`has_field`][Self::has_field] for more details.
    pub fn has_field_by_number(&self, number: u32) -> bool {
        self.desc
            .get_field(number)
            .map_or(false, |field_desc| self.has_field(&field_desc))
    }

    /// Gets the value of the field with the given number.
    ///
    /// If the message has no field with the given number, `None` is returned.
    ///
    /// See [`get_field`][Self::get_field] for more details.
    pub fn get_field_by_number(&self, number: u32) -> Option<Cow<'_, Value>> {
        self.desc
            .get_field(number)
            .and_then(|field_desc| self.get_field(&field_desc))
    }

    /// Gets a mutable reference to the value of the field with the given number. If the field
    /// is not set, it is inserted with its default value.
    ///
    /// If the message has no field with the given number, `None` is returned.
    pub fn get_field_by_number_mut(&mut self, number: u32) -> Option<&mut Value> {
        self.desc
            .get_field(number)
            .map(move |field_desc| self.get_field_mut(&field_desc))
    }

    /// Sets the value of the field with the given number.
    ///
    /// See [`try_set_field`][Self::try_set_field] for more details.
    pub fn try_set_field_by_number(
        &mut self,
        number: u32,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        match self.desc.get_field(number) {
            Some(field_desc) => self.try_set_field(&field_desc, value),
            None => Err(self.no_such_field(number)),
        }
    }

    /// Clears the field with the given number.
    ///
    /// If no field with the given number exists, this method does nothing.
    pub fn clear_field_by_number(&mut self, number: u32) {
        if let Some(field_desc) = self.desc.get_field(number) {
            self.clear_field(&field_desc);
        }
    }

    /// Returns `true` if this message has a field set with the given name.
    ///
    /// See [`has_field`][Self::has_field] for more details.
    pub fn has_field_by_name(&self, name: &str) -> bool {
        self.desc
            .get_field_by_name(name)
            .map_or(false, |field_desc| self.has_field(&field_desc))
    }

    /// Gets the value of the field with the given name.
    ///
    /// If the message has no field with the given name, `None` is returned.
    ///
    /// See [`get_field`][Self::get_field] for more details.
    pub fn get_field_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        self.desc
            .get_field_by_name(name)
            .and_then(|field_desc| self.get_field(&field_desc))
    }

    /// Gets a mutable reference to the value of the field with the given name. If the field
    /// is not set, it is inserted with its default value.
    ///
    /// If the message has no field with the given name, `None` is returned.
    pub fn get_field_by_name_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.desc
            .get_field_by_name(name)
            .map(move |field_desc| self.get_field_mut(&field_desc))
    }

    /// Sets the value of the field with the given name.
    ///
    /// See [`try_set_field`][Self::try_set_field] for more details.
    pub fn try_set_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        match self.desc.get_field_by_name(name) {
            Some(field_desc) => self.try_set_field(&field_desc, value),
            None => Err(self.no_such_field(name)),
        }
    }

    /// Clears the field with the given name.
    ///
    /// If no field with the given name exists, this method does nothing.
    pub fn clear_field_by_name(&mut self, name: &str) {
        if let Some(field_desc) = self.desc.get_field_by_name(name) {
            self.clear_field(&field_desc);
        }
    }

    /// Gets the member of the given oneof which is currently set, if any.
    pub fn which_oneof(&self, oneof_desc: &OneofDescriptor) -> Option<FieldDescriptor> {
        let number = self.fields.oneof_member(oneof_desc.index())?;
        self.desc.get_field(number)
    }

    /// Returns `true` if this message has the given extension field set.
    ///
    /// See [`has_field`][Self::has_field] for more details.
    pub fn has_extension(&self, extension_desc: &FieldDescriptor) -> bool {
        extension_desc.is_extension() && self.fields.has(extension_desc)
    }

    /// Gets the value of the given extension field.
    ///
    /// See [`get_field`][Self::get_field] for more details.
    pub fn get_extension(&self, extension_desc: &FieldDescriptor) -> Option<Cow<'_, Value>> {
        self.fields.get(extension_desc)
    }

    /// Gets a mutable reference to the value of the given extension field. If the
    /// field is not set, it is inserted with its default value.
    pub fn get_extension_mut(&mut self, extension_desc: &FieldDescriptor) -> &mut Value {
        debug_assert!(extension_desc.is_extension());
        self.fields.get_mut(extension_desc, &self.registry)
    }

    /// Sets the value of the given extension field. The extension must extend this message's
    /// type.
    ///
    /// See [`try_set_field`][Self::try_set_field] for more details.
    pub fn try_set_extension(
        &mut self,
        extension_desc: &FieldDescriptor,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        if !extension_desc.is_extension() {
            return Err(Error::type_mismatch(
                extension_desc.full_name(),
                "an extension field",
                "a regular field",
            ));
        }
        self.try_set_field(extension_desc, value)
    }

    /// Clears the given extension field.
    pub fn clear_extension(&mut self, extension_desc: &FieldDescriptor) {
        self.fields.clear(extension_desc)
    }

    /// Gets an iterator over the extension fields set in this message, in field number order.
    pub fn extensions(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> + '_ {
        self.fields.extensions().map(|ext| (&ext.desc, &ext.value))
    }

    /// Gets the raw wire data of fields which were not recognized while decoding.
    pub fn unknown_fields(&self) -> &[u8] {
        self.fields.unknown.as_bytes()
    }

    /// Discards the fields which were not recognized while decoding.
    pub fn clear_unknown_fields(&mut self) {
        self.fields.unknown.clear();
    }

    /// Merges the fields of `other` into this message.
    ///
    /// Singular fields set in `other` overwrite this message's value, except singular messages,
    /// which are merged recursively. Repeated fields are appended to, and map entries in `other`
    /// replace entries with the same key. Unknown fields are appended.
    pub fn merge_from(&mut self, other: &DynamicMessage) -> Result<(), Error> {
        if self.desc != other.desc {
            return Err(Error::type_mismatch(
                self.desc.full_name(),
                format!("message {}", self.desc.full_name()),
                format!("message {}", other.desc.full_name()),
            ));
        }

        for entry in other.fields.iter(&other.desc) {
            match entry {
                FieldEntry::Field(value, field_desc) => self.merge_value(&field_desc, value)?,
                FieldEntry::Extension(value, extension_desc) => {
                    self.merge_value(extension_desc, value)?
                }
            }
        }
        self.fields.unknown.extend_from(&other.fields.unknown);
        Ok(())
    }

    fn merge_value(&mut self, field_desc: &FieldDescriptor, value: &Value) -> Result<(), Error> {
        match (self.fields.get_mut(field_desc, &self.registry), value) {
            (Value::List(dst), Value::List(src)) => dst.extend(src.iter().cloned()),
            (Value::Map(dst), Value::Map(src)) => {
                dst.extend(src.iter().map(|(key, value)| (key.clone(), value.clone())))
            }
            (Value::Message(dst), Value::Message(src)) => dst.merge_from(src)?,
            (dst, src) => *dst = src.clone(),
        }
        Ok(())
    }

    /// Checks that all required fields are set in this message and in every message nested
    /// within it.
    ///
    /// Fields are visited depth first in field number order, and the first missing field is
    /// reported with its path relative to this message, e.g. `inner.items[2].id`.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_at(&mut String::new())
    }

    fn validate_at(&self, path: &mut String) -> Result<(), Error> {
        let prefix_len = path.len();
        for field_desc in self.desc.fields() {
            push_segment(path, field_desc.name());
            if field_desc.cardinality() == Cardinality::Required && !self.has_field(&field_desc) {
                return Err(Error::missing_required_field(path));
            }
            if self.has_field(&field_desc) {
                if let Some(value) = self.get_field(&field_desc) {
                    validate_value(&value, path)?;
                }
            }
            path.truncate(prefix_len);
        }

        for (extension_desc, value) in self.extensions() {
            push_segment(path, &format!("[{}]", extension_desc.full_name()));
            validate_value(value, path)?;
            path.truncate(prefix_len);
        }
        Ok(())
    }

    /// Merges the encoded form of a strongly-typed message into this one.
    ///
    /// The message should be compatible with the type specified by
    /// [`descriptor`][Self::descriptor], or the merge will likely fail with
    /// [`ErrorKind::MalformedWireData`](crate::ErrorKind::MalformedWireData).
    pub fn transcode_from<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Message,
    {
        let buf = value.encode_to_vec();
        self.merge(buf.as_slice())?;
        Ok(())
    }

    /// Converts this dynamic message into a strongly-typed message through its encoded form.
    pub fn transcode_to<T>(&self) -> Result<T, Error>
    where
        T: Message + Default,
    {
        let buf = self.encode_to_vec();
        Ok(T::decode(buf.as_slice())?)
    }

    fn check_owner(&self, field_desc: &FieldDescriptor) -> Result<(), Error> {
        let owner = field_desc.containing_message();
        if owner == self.desc {
            Ok(())
        } else {
            Err(Error::type_mismatch(
                field_desc.full_name(),
                format!("a field of {}", self.desc.full_name()),
                format!("a field of {}", owner.full_name()),
            ))
        }
    }

    fn no_such_field(&self, field: impl std::fmt::Display) -> Error {
        Error::type_mismatch(
            format!("{}.{}", self.desc.full_name(), field),
            format!("a field of {}", self.desc.full_name()),
            "no such field",
        )
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.desc == other.desc
            && self.desc.fields().all(|field_desc| {
                match (self.has_field(&field_desc), other.has_field(&field_desc)) {
                    (true, true) => self.get_field(&field_desc) == other.get_field(&field_desc),
                    (false, false) => true,
                    _ => false,
                }
            })
            && self
                .extensions()
                .eq(other.extensions())
            && self.fields.unknown == other.fields.unknown
    }
}

fn validate_value(value: &Value, path: &mut String) -> Result<(), Error> {
    match value {
        Value::Message(message) => {
            path.push('.');
            message.validate_at(path)
        }
        Value::List(values) => {
            let prefix_len = path.len();
            for (index, value) in values.iter().enumerate() {
                if let Value::Message(message) = value {
                    let _ = write!(path, "[{}].", index);
                    message.validate_at(path)?;
                    path.truncate(prefix_len);
                }
            }
            Ok(())
        }
        Value::Map(values) => {
            let prefix_len = path.len();
            let sorted: BTreeMap<_, _> = values.iter().collect();
            for (key, value) in sorted {
                if let Value::Message(message) = value {
                    let _ = match key {
                        MapKey::String(key) => write!(path, "[{:?}].", key),
                        key => write!(path, "[{}].", key),
                    };
                    message.validate_at(path)?;
                    path.truncate(prefix_len);
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn push_segment(path: &mut String, name: &str) {
    if !path.is_empty() && !path.ends_with('.') {
        path.push('.');
    }
    path.push_str(name);
}
