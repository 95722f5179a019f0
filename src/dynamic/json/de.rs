use std::{collections::HashMap, ops::Range};

use base64::{
    prelude::{BASE64_STANDARD, BASE64_STANDARD_NO_PAD, BASE64_URL_SAFE, BASE64_URL_SAFE_NO_PAD},
    Engine as _,
};
use prost::bytes::Bytes;

use crate::{
    dynamic::{fields::default_in_registry, DynamicMessage, MapKey, Value},
    EnumDescriptor, Error, ExtensionRegistry, FieldDescriptor, Kind, Symbol,
};

use super::{lex::Token, reader::JsonReader, DecodeOptions};

pub(super) fn merge_top_level(
    reader: &mut JsonReader<'_>,
    message: &mut DynamicMessage,
    options: &DecodeOptions,
) -> Result<(), Error> {
    if reader.peek_null()? {
        reader.poll("null")?;
        return Ok(());
    }
    merge_message(reader, message, options)
}

fn merge_message(
    reader: &mut JsonReader<'_>,
    message: &mut DynamicMessage,
    options: &DecodeOptions,
) -> Result<(), Error> {
    reader.begin_object()?;
    while let Some((key, span)) = reader.next_key()? {
        match find_field(message, &key) {
            Some(field_desc) => merge_field(reader, message, &field_desc, options)?,
            None if options.deny_unknown_fields => {
                return Err(Error::malformed_json(
                    format!("a field of message '{}'", message.desc.full_name()),
                    format!("unknown field {:?}", key),
                    span,
                ))
            }
            None => {
                tracing::trace!(
                    message_type = message.desc.full_name(),
                    field = %key,
                    "skipping unknown JSON field"
                );
                reader.skip_value()?;
            }
        }
    }
    reader.end_object()
}

fn find_field(message: &DynamicMessage, key: &str) -> Option<FieldDescriptor> {
    match key.strip_prefix('[').and_then(|key| key.strip_suffix(']')) {
        Some(extension_name) => message
            .registry
            .find_extension_by_name(&message.desc, extension_name),
        None => message
            .desc
            .get_field_by_json_name(key)
            .or_else(|| message.desc.get_field_by_name(key)),
    }
}

fn merge_field(
    reader: &mut JsonReader<'_>,
    message: &mut DynamicMessage,
    field_desc: &FieldDescriptor,
    options: &DecodeOptions,
) -> Result<(), Error> {
    if reader.peek_null()? {
        reader.poll("null")?;
        message.fields.clear(field_desc);
        return Ok(());
    }

    let registry = &message.registry;
    let value = if field_desc.is_map() {
        Some(read_map(reader, field_desc, registry, options)?)
    } else if field_desc.is_list() {
        Some(read_list(reader, &field_desc.kind(), registry, options)?)
    } else {
        read_singular(reader, &field_desc.kind(), registry, options)?
    };

    match value {
        Some(value) => message.fields.set(field_desc, value),
        None => message.fields.clear(field_desc),
    }
    Ok(())
}

/// Reads the value of a singular field. An array is accepted in place of a single value, in
/// which case its last element is used and `null` elements unset the field.
fn read_singular(
    reader: &mut JsonReader<'_>,
    kind: &Kind,
    registry: &ExtensionRegistry,
    options: &DecodeOptions,
) -> Result<Option<Value>, Error> {
    if !reader.peek_array()? {
        return read_value(reader, kind, registry, options).map(Some);
    }

    let mut last = None;
    reader.begin_array()?;
    while reader.has_next()? {
        last = if reader.peek_null()? {
            reader.poll("null")?;
            None
        } else {
            Some(read_value(reader, kind, registry, options)?)
        };
    }
    reader.end_array()?;
    Ok(last)
}

/// Reads the elements of a repeated field. A single value is read as a list of one element.
fn read_list(
    reader: &mut JsonReader<'_>,
    kind: &Kind,
    registry: &ExtensionRegistry,
    options: &DecodeOptions,
) -> Result<Value, Error> {
    if !reader.peek_array()? {
        let value = read_value(reader, kind, registry, options)?;
        return Ok(Value::List(vec![value]));
    }

    let mut values = Vec::new();
    reader.begin_array()?;
    while reader.has_next()? {
        if reader.peek_null()? {
            reader.poll("null")?;
            continue;
        }
        values.push(read_value(reader, kind, registry, options)?);
    }
    reader.end_array()?;
    Ok(Value::List(values))
}

/// Reads a map field, written either as an object keyed by the string form of each key or as
/// an array of `{"key": ..., "value": ...}` objects.
fn read_map(
    reader: &mut JsonReader<'_>,
    field_desc: &FieldDescriptor,
    registry: &ExtensionRegistry,
    options: &DecodeOptions,
) -> Result<Value, Error> {
    let entry_desc = match field_desc.kind() {
        Kind::Message(entry_desc) => entry_desc,
        kind => panic!("map field should have a message type, found {:?}", kind),
    };
    let key_desc = entry_desc.map_entry_key_field();
    let value_desc = entry_desc.map_entry_value_field();
    let key_kind = key_desc.kind();
    let value_kind = value_desc.kind();

    let mut map = HashMap::new();
    if reader.peek_array()? {
        reader.begin_array()?;
        while reader.has_next()? {
            if reader.peek_null()? {
                reader.poll("null")?;
                continue;
            }

            let mut key = None;
            let mut value = None;

            reader.begin_object()?;
            while let Some((name, span)) = reader.next_key()? {
                match name.as_ref() {
                    "key" => {
                        let (token, span) = reader.poll("map key")?;
                        key = Some(map_key_from_token(token, span, &key_kind)?);
                    }
                    "value" => value = Some(read_value(reader, &value_kind, registry, options)?),
                    _ if options.deny_unknown_fields => {
                        return Err(Error::malformed_json(
                            "'key' or 'value'",
                            format!("{:?}", name),
                            span,
                        ))
                    }
                    _ => reader.skip_value()?,
                }
            }
            reader.end_object()?;

            map.insert(
                key.unwrap_or_else(|| MapKey::default_value(&key_kind)),
                value.unwrap_or_else(|| default_in_registry(&value_desc, registry)),
            );
        }
        reader.end_array()?;
    } else {
        reader.begin_object()?;
        while let Some((key, span)) = reader.next_key()? {
            let key = parse_map_key(&key, &key_kind, span)?;
            let value = read_value(reader, &value_kind, registry, options)?;
            map.insert(key, value);
        }
        reader.end_object()?;
    }

    Ok(Value::Map(map))
}

fn read_value(
    reader: &mut JsonReader<'_>,
    kind: &Kind,
    registry: &ExtensionRegistry,
    options: &DecodeOptions,
) -> Result<Value, Error> {
    match kind {
        Kind::Message(desc) => {
            let mut message = DynamicMessage::new_with_registry(desc.clone(), registry.clone());
            merge_message(reader, &mut message, options)?;
            Ok(Value::Message(message))
        }
        _ => {
            let (token, span) = reader.poll("value")?;
            read_scalar(token, span, kind)
        }
    }
}

fn read_scalar(token: Token<'_>, span: Range<usize>, kind: &Kind) -> Result<Value, Error> {
    let value = match (kind, &token) {
        (Kind::Bool, Token::True) => Some(Value::Bool(true)),
        (Kind::Bool, Token::False) => Some(Value::Bool(false)),
        (Kind::String, Token::String(value)) => Some(Value::String(value.as_ref().to_owned())),
        (Kind::Bytes, Token::String(value)) => decode_bytes(value).map(Value::Bytes),
        (Kind::Float | Kind::Double, Token::Number(text)) => parse_float(text, kind),
        (Kind::Float | Kind::Double, Token::String(text)) => parse_float_string(text, kind),
        (Kind::Enum(enum_desc), Token::String(name)) => Some(resolve_enum_value(name, enum_desc)?),
        (kind, Token::Number(text)) if kind.is_integral() => parse_integer(text, kind)?,
        (kind, Token::String(text)) if kind.is_integral() => parse_integer(text, kind)?,
        _ => None,
    };

    value.ok_or_else(|| Error::malformed_json(format!("a value of type {}", kind), token, span))
}

/// Parses a JSON number or numeric string as an integer of type `kind`.
///
/// Numbers written with a fraction or exponent are accepted if their value is integral.
/// Returns `Ok(None)` if the text is not an integer.
fn parse_integer(text: &str, kind: &Kind) -> Result<Option<Value>, Error> {
    if text.starts_with('+') {
        return Ok(None);
    }
    if let Ok(value) = text.parse::<i128>() {
        return Value::from_integer(value, kind).map(Some);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => {
            if value.abs() >= i128::MAX as f64 {
                Err(Error::numeric_overflow(text, kind))
            } else {
                Value::from_integer(value as i128, kind).map(Some)
            }
        }
        _ => Ok(None),
    }
}

fn parse_float(text: &str, kind: &Kind) -> Option<Value> {
    let value = text.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some(float_value(value, kind))
}

fn parse_float_string(text: &str, kind: &Kind) -> Option<Value> {
    let value = match text {
        "NaN" => f64::NAN,
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        text => return parse_float(text, kind),
    };
    Some(float_value(value, kind))
}

fn float_value(value: f64, kind: &Kind) -> Value {
    match kind {
        Kind::Float => Value::F32(value as f32),
        _ => Value::F64(value),
    }
}

fn decode_bytes(text: &str) -> Option<Bytes> {
    BASE64_STANDARD
        .decode(text)
        .or_else(|_| BASE64_STANDARD_NO_PAD.decode(text))
        .or_else(|_| BASE64_URL_SAFE.decode(text))
        .or_else(|_| BASE64_URL_SAFE_NO_PAD.decode(text))
        .ok()
        .map(Bytes::from)
}

/// Resolves an enum value from its name, looked up as `<enum type>.<name>` in the pool, or
/// from a number written as a string.
fn resolve_enum_value(name: &str, enum_desc: &EnumDescriptor) -> Result<Value, Error> {
    let full_name = format!("{}.{}", enum_desc.full_name(), name);
    match enum_desc.parent_pool().find_symbol(&full_name) {
        Some(Symbol::EnumValue(value)) => Ok(Value::EnumNumber(value.number())),
        _ => match name.parse::<i128>() {
            Ok(number) if !name.starts_with('+') => {
                Value::from_integer(number, &Kind::Enum(enum_desc.clone()))
            }
            _ => Err(Error::unresolved_enum_value(name, enum_desc.full_name())),
        },
    }
}

fn parse_map_key(text: &str, kind: &Kind, span: Range<usize>) -> Result<MapKey, Error> {
    let key = match kind {
        Kind::String => Some(MapKey::String(text.to_owned())),
        Kind::Bool => match text {
            "true" => Some(MapKey::Bool(true)),
            "false" => Some(MapKey::Bool(false)),
            _ => None,
        },
        kind if kind.is_integral() => parse_integer(text, kind)?.and_then(map_key_from_value),
        _ => None,
    };

    key.ok_or_else(|| {
        Error::malformed_json(
            format!("a map key of type {}", kind),
            format!("{:?}", text),
            span,
        )
    })
}

/// Reads the `key` member of a map entry object, which may be written as a JSON value of the
/// key type or as its string form.
fn map_key_from_token(token: Token<'_>, span: Range<usize>, kind: &Kind) -> Result<MapKey, Error> {
    match &token {
        Token::String(text) => parse_map_key(text, kind, span),
        _ => {
            let value = read_scalar(token, span.clone(), kind)?;
            map_key_from_value(value).ok_or_else(|| {
                Error::malformed_json(format!("a map key of type {}", kind), "a non-key value", span)
            })
        }
    }
}

fn map_key_from_value(value: Value) -> Option<MapKey> {
    match value {
        Value::Bool(value) => Some(MapKey::Bool(value)),
        Value::I32(value) => Some(MapKey::I32(value)),
        Value::I64(value) => Some(MapKey::I64(value)),
        Value::U32(value) => Some(MapKey::U32(value)),
        Value::U64(value) => Some(MapKey::U64(value)),
        Value::String(value) => Some(MapKey::String(value)),
        _ => None,
    }
}
