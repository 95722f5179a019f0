use std::borrow::Cow;

use base64::{display::Base64Display, prelude::BASE64_STANDARD};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{
    dynamic::{fields::FieldEntry, DynamicMessage, MapKey, Value},
    FieldDescriptor, Kind,
};

use super::EncodeOptions;

pub(super) struct SerializeWrapper<'a, T> {
    pub(super) value: &'a T,
    pub(super) options: &'a EncodeOptions,
}

pub(super) fn serialize_message<S>(
    message: &DynamicMessage,
    serializer: S,
    options: &EncodeOptions,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    SerializeWrapper {
        value: message,
        options,
    }
    .serialize(serializer)
}

impl<'a> Serialize for SerializeWrapper<'a, DynamicMessage> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        serialize_fields(&mut map, self.value, self.options)?;
        map.end()
    }
}

fn serialize_fields<S>(
    map: &mut S,
    message: &DynamicMessage,
    options: &EncodeOptions,
) -> Result<(), S::Error>
where
    S: SerializeMap,
{
    if options.emit_unpopulated_fields {
        for field_desc in message.desc.fields() {
            if field_desc.supports_presence() && !message.has_field(&field_desc) {
                continue;
            }
            if let Some(value) = message.get_field(&field_desc) {
                serialize_field(map, &field_desc, &value, options)?;
            }
        }
        for (extension_desc, value) in message.extensions() {
            serialize_field(map, extension_desc, value, options)?;
        }
    } else {
        for entry in message.fields.iter(&message.desc) {
            match entry {
                FieldEntry::Field(value, field_desc) => {
                    serialize_field(map, &field_desc, value, options)?
                }
                FieldEntry::Extension(value, extension_desc) => {
                    serialize_field(map, extension_desc, value, options)?
                }
            }
        }
    }
    Ok(())
}

fn serialize_field<S>(
    map: &mut S,
    field_desc: &FieldDescriptor,
    value: &Value,
    options: &EncodeOptions,
) -> Result<(), S::Error>
where
    S: SerializeMap,
{
    let name = if field_desc.is_extension() {
        Cow::Owned(format!("[{}]", field_desc.full_name()))
    } else if options.use_proto_field_name {
        Cow::Borrowed(field_desc.name())
    } else {
        Cow::Borrowed(field_desc.json_name())
    };

    map.serialize_entry(
        name.as_ref(),
        &SerializeWrapper {
            value: &ValueAndKind {
                value,
                kind: &field_desc.kind(),
            },
            options,
        },
    )
}

struct ValueAndKind<'a> {
    value: &'a Value,
    kind: &'a Kind,
}

impl<'a> Serialize for SerializeWrapper<'a, ValueAndKind<'a>> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value.value {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::I32(value) => serializer.serialize_i32(*value),
            Value::I64(value) => {
                if self.options.stringify_64_bit_integers {
                    serializer.collect_str(value)
                } else {
                    serializer.serialize_i64(*value)
                }
            }
            Value::U32(value) => serializer.serialize_u32(*value),
            Value::U64(value) => {
                if self.options.stringify_64_bit_integers {
                    serializer.collect_str(value)
                } else {
                    serializer.serialize_u64(*value)
                }
            }
            Value::F32(value) => match non_finite_name(f64::from(*value)) {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_f32(*value),
            },
            Value::F64(value) => match non_finite_name(*value) {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_f64(*value),
            },
            Value::String(value) => serializer.serialize_str(value),
            Value::Bytes(value) => {
                serializer.collect_str(&Base64Display::new(value, &BASE64_STANDARD))
            }
            Value::EnumNumber(number) => {
                let enum_value = match self.value.kind {
                    Kind::Enum(enum_desc) if !self.options.use_enum_numbers => {
                        enum_desc.get_value(*number)
                    }
                    _ => None,
                };
                match enum_value {
                    Some(enum_value) => serializer.serialize_str(enum_value.name()),
                    None => serializer.serialize_i32(*number),
                }
            }
            Value::Message(message) => SerializeWrapper {
                value: message,
                options: self.options,
            }
            .serialize(serializer),
            Value::List(values) => {
                let mut list = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    list.serialize_element(&SerializeWrapper {
                        value: &ValueAndKind {
                            value,
                            kind: self.value.kind,
                        },
                        options: self.options,
                    })?;
                }
                list.end()
            }
            Value::Map(values) => {
                let value_kind = match self.value.kind {
                    Kind::Message(entry_desc) => entry_desc.map_entry_value_field().kind(),
                    kind => panic!("map field should have a message type, found {:?}", kind),
                };

                let mut entries: Vec<(&MapKey, &Value)> = values.iter().collect();
                if self.options.sort_map_keys {
                    entries.sort_unstable_by(|(l, _), (r, _)| l.cmp(r));
                }

                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(
                        &MapKeyAsString(key),
                        &SerializeWrapper {
                            value: &ValueAndKind {
                                value,
                                kind: &value_kind,
                            },
                            options: self.options,
                        },
                    )?;
                }
                map.end()
            }
        }
    }
}

/// JSON object keys are always strings, so map keys of every type are written as text.
struct MapKeyAsString<'a>(&'a MapKey);

impl<'a> Serialize for MapKeyAsString<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self.0)
    }
}

fn non_finite_name(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}
