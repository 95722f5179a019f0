use prost::{
    bytes::{Buf, BufMut},
    encoding::{
        check_wire_type, decode_key, encode_key, encode_varint, encoded_len_varint, key_len,
        merge_loop, skip_field, DecodeContext, WireType,
    },
    DecodeError, Message,
};

use crate::{
    descriptor::{MAP_ENTRY_KEY_NUMBER, MAP_ENTRY_VALUE_NUMBER},
    DynamicMessage, ExtensionRegistry, FieldDescriptor, Kind, MapKey, Value,
};

use super::{fields::FieldEntry, unknown::RawKey};

const RECURSION_LIMIT: u32 = 100;

impl Message for DynamicMessage {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        for entry in self.fields.iter(&self.desc) {
            match entry {
                FieldEntry::Field(value, field_desc) => value.encode_field(&field_desc, buf),
                FieldEntry::Extension(value, extension_desc) => {
                    value.encode_field(extension_desc, buf)
                }
            }
        }
        self.fields.unknown.encode_raw(buf);
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        self.merge_raw_field(RawKey::new(number, wire_type), buf, ctx, 0)
    }

    fn merge(&mut self, mut buf: impl Buf) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        let ctx = DecodeContext::default();
        while buf.has_remaining() {
            let key = RawKey::read(&mut buf)?;
            self.merge_raw_field(key, &mut buf, ctx.clone(), 0)?;
        }
        Ok(())
    }

    fn merge_length_delimited(&mut self, mut buf: impl Buf) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        self.merge_delimited(
            WireType::LengthDelimited,
            &mut buf,
            DecodeContext::default(),
            0,
        )
    }

    fn encoded_len(&self) -> usize {
        self.fields
            .iter(&self.desc)
            .map(|entry| match entry {
                FieldEntry::Field(value, field_desc) => value.encoded_len(&field_desc),
                FieldEntry::Extension(value, extension_desc) => {
                    value.encoded_len(extension_desc)
                }
            })
            .sum::<usize>()
            + self.fields.unknown.encoded_len()
    }

    fn clear(&mut self) {
        self.fields.clear_all();
    }
}

/// Applies a `prost::encoding` scalar function to a value, picking the module from the
/// declared kind. Evaluates to `None` if the value does not have the representation of the
/// kind.
macro_rules! scalar {
    ($value:expr, $kind:expr, $op:ident($first:expr $(, $rest:expr)*)) => {
        match ($value, $kind) {
            (Value::Bool(v), Kind::Bool) => Some(prost::encoding::bool::$op($first, v $(, $rest)*)),
            (Value::I32(v), Kind::Int32) => Some(prost::encoding::int32::$op($first, v $(, $rest)*)),
            (Value::I32(v), Kind::Sint32) => Some(prost::encoding::sint32::$op($first, v $(, $rest)*)),
            (Value::I32(v), Kind::Sfixed32) => {
                Some(prost::encoding::sfixed32::$op($first, v $(, $rest)*))
            }
            (Value::I64(v), Kind::Int64) => Some(prost::encoding::int64::$op($first, v $(, $rest)*)),
            (Value::I64(v), Kind::Sint64) => Some(prost::encoding::sint64::$op($first, v $(, $rest)*)),
            (Value::I64(v), Kind::Sfixed64) => {
                Some(prost::encoding::sfixed64::$op($first, v $(, $rest)*))
            }
            (Value::U32(v), Kind::Uint32) => Some(prost::encoding::uint32::$op($first, v $(, $rest)*)),
            (Value::U32(v), Kind::Fixed32) => {
                Some(prost::encoding::fixed32::$op($first, v $(, $rest)*))
            }
            (Value::U64(v), Kind::Uint64) => Some(prost::encoding::uint64::$op($first, v $(, $rest)*)),
            (Value::U64(v), Kind::Fixed64) => {
                Some(prost::encoding::fixed64::$op($first, v $(, $rest)*))
            }
            (Value::F32(v), Kind::Float) => Some(prost::encoding::float::$op($first, v $(, $rest)*)),
            (Value::F64(v), Kind::Double) => Some(prost::encoding::double::$op($first, v $(, $rest)*)),
            (Value::String(v), Kind::String) => {
                Some(prost::encoding::string::$op($first, v $(, $rest)*))
            }
            (Value::Bytes(v), Kind::Bytes) => Some(prost::encoding::bytes::$op($first, v $(, $rest)*)),
            (Value::EnumNumber(v), Kind::Enum(_)) => {
                Some(prost::encoding::int32::$op($first, v $(, $rest)*))
            }
            _ => None,
        }
    };
}

impl Value {
    pub(super) fn encode_field<B>(&self, field_desc: &FieldDescriptor, buf: &mut B)
    where
        B: BufMut,
    {
        if !field_desc.supports_presence() && self.is_default_for_field(field_desc) {
            return;
        }

        let number = field_desc.number();
        let kind = field_desc.kind();
        match self {
            Value::List(values) if field_desc.is_list() => {
                if field_desc.is_packed() {
                    encode_key(number, WireType::LengthDelimited, buf);
                    encode_varint(packed_payload_len(values, &kind) as u64, buf);
                    for value in values {
                        value.encode_packed(&kind, buf);
                    }
                } else {
                    for value in values {
                        value.encode_single(number, &kind, field_desc.is_group(), buf);
                    }
                }
            }
            Value::Map(values) if field_desc.is_map() => {
                let (key_desc, value_desc) = map_entry_fields(&kind);
                for (key, value) in values {
                    let len = key.encoded_len(&key_desc) + value.map_value_len(&value_desc);
                    encode_key(number, WireType::LengthDelimited, buf);
                    encode_varint(len as u64, buf);
                    key.encode_field(&key_desc, buf);
                    if !value.is_default_for_field(&value_desc) {
                        value.encode_single(MAP_ENTRY_VALUE_NUMBER, &value_desc.kind(), false, buf);
                    }
                }
            }
            value => value.encode_single(number, &kind, field_desc.is_group(), buf),
        }
    }

    /// Map entries omit keys and values equal to their defaults, whatever their presence.
    fn map_value_len(&self, value_desc: &FieldDescriptor) -> usize {
        if self.is_default_for_field(value_desc) {
            0
        } else {
            self.single_encoded_len(MAP_ENTRY_VALUE_NUMBER, &value_desc.kind(), false)
        }
    }

    fn encode_single<B>(&self, number: u32, kind: &Kind, is_group: bool, buf: &mut B)
    where
        B: BufMut,
    {
        match (self, kind) {
            (Value::Message(message), Kind::Message(_)) if is_group => {
                prost::encoding::group::encode(number, message, buf)
            }
            (Value::Message(message), Kind::Message(_)) => {
                prost::encoding::message::encode(number, message, buf)
            }
            (value, kind) => scalar!(value, kind, encode(number, buf)).unwrap_or_else(|| {
                panic!(
                    "mismatch between DynamicMessage value {:?} and type {:?}",
                    value, kind
                )
            }),
        }
    }

    /// Writes the payload of a single element of a packed list, without a key.
    fn encode_packed<B>(&self, kind: &Kind, buf: &mut B)
    where
        B: BufMut,
    {
        match (self, kind) {
            (&Value::Bool(v), Kind::Bool) => encode_varint(v as u64, buf),
            (&Value::I32(v), Kind::Int32) | (&Value::EnumNumber(v), Kind::Enum(_)) => {
                encode_varint(v as u64, buf)
            }
            (&Value::I32(v), Kind::Sint32) => encode_varint(zigzag32(v), buf),
            (&Value::I32(v), Kind::Sfixed32) => buf.put_i32_le(v),
            (&Value::I64(v), Kind::Int64) => encode_varint(v as u64, buf),
            (&Value::I64(v), Kind::Sint64) => encode_varint(zigzag64(v), buf),
            (&Value::I64(v), Kind::Sfixed64) => buf.put_i64_le(v),
            (&Value::U32(v), Kind::Uint32) => encode_varint(v.into(), buf),
            (&Value::U32(v), Kind::Fixed32) => buf.put_u32_le(v),
            (&Value::U64(v), Kind::Uint64) => encode_varint(v, buf),
            (&Value::U64(v), Kind::Fixed64) => buf.put_u64_le(v),
            (&Value::F32(v), Kind::Float) => buf.put_f32_le(v),
            (&Value::F64(v), Kind::Double) => buf.put_f64_le(v),
            (value, kind) => panic!("invalid value {:?} for packed field of type {:?}", value, kind),
        }
    }

    fn packed_len(&self) -> usize {
        match *self {
            Value::Bool(_) => 1,
            Value::I32(v) | Value::EnumNumber(v) => encoded_len_varint(v as u64),
            Value::I64(v) => encoded_len_varint(v as u64),
            Value::U32(v) => encoded_len_varint(v.into()),
            Value::U64(v) => encoded_len_varint(v),
            Value::F32(_) => 4,
            Value::F64(_) => 8,
            _ => 0,
        }
    }

    pub(super) fn merge_field<B>(
        &mut self,
        field_desc: &FieldDescriptor,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
        registry: &ExtensionRegistry,
        depth: u32,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        let kind = field_desc.kind();
        match self {
            Value::List(values) if field_desc.is_list() => {
                if wire_type == WireType::LengthDelimited && field_desc.is_packable() {
                    merge_loop(values, buf, ctx, |values, buf, ctx| {
                        let mut value = Value::default_value(&kind);
                        let wire_type = kind.wire_type();
                        value.merge_single(field_desc, wire_type, buf, ctx, registry, depth)?;
                        values.push(value);
                        Ok(())
                    })
                } else {
                    let mut value = match &kind {
                        Kind::Message(desc) => Value::Message(DynamicMessage::new_with_registry(
                            desc.clone(),
                            registry.clone(),
                        )),
                        kind => Value::default_value(kind),
                    };
                    value.merge_single(field_desc, wire_type, buf, ctx, registry, depth)?;
                    values.push(value);
                    Ok(())
                }
            }
            Value::Map(values) if field_desc.is_map() => {
                let (key_desc, value_desc) = map_entry_fields(&kind);
                let mut key = MapKey::default_value(&key_desc.kind());
                let mut value = super::fields::default_in_registry(&value_desc, registry);
                merge_loop(
                    &mut (&mut key, &mut value),
                    buf,
                    ctx,
                    |(key, value), buf, ctx| {
                        let (number, wire_type) = decode_key(buf)?;
                        match number {
                            MAP_ENTRY_KEY_NUMBER => key.merge_field(&key_desc, wire_type, buf, ctx),
                            MAP_ENTRY_VALUE_NUMBER => value
                                .merge_single(&value_desc, wire_type, buf, ctx, registry, depth),
                            _ => skip_field(wire_type, number, buf, ctx),
                        }
                    },
                )?;
                values.insert(key, value);
                Ok(())
            }
            value => value.merge_single(field_desc, wire_type, buf, ctx, registry, depth),
        }
    }

    fn merge_single<B>(
        &mut self,
        field_desc: &FieldDescriptor,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
        registry: &ExtensionRegistry,
        depth: u32,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        match (self, field_desc.kind()) {
            (Value::Message(message), Kind::Message(_)) => {
                if message.registry.is_empty() {
                    message.registry = registry.clone();
                }
                if field_desc.is_group() {
                    message.merge_group(field_desc.number(), wire_type, buf, ctx, depth + 1)
                } else {
                    message.merge_delimited(wire_type, buf, ctx, depth + 1)
                }
            }
            (value, kind) => {
                let result = scalar!(&mut *value, &kind, merge(wire_type, buf, ctx));
                result.unwrap_or_else(|| {
                    panic!(
                        "mismatch between DynamicMessage value {:?} and type {:?}",
                        value, kind
                    )
                })
            }
        }
    }

    pub(super) fn encoded_len(&self, field_desc: &FieldDescriptor) -> usize {
        if !field_desc.supports_presence() && self.is_default_for_field(field_desc) {
            return 0;
        }

        let number = field_desc.number();
        let kind = field_desc.kind();
        match self {
            Value::List(values) if field_desc.is_list() => {
                if field_desc.is_packed() {
                    let len = packed_payload_len(values, &kind);
                    key_len(number) + encoded_len_varint(len as u64) + len
                } else {
                    values
                        .iter()
                        .map(|value| value.single_encoded_len(number, &kind, field_desc.is_group()))
                        .sum()
                }
            }
            Value::Map(values) if field_desc.is_map() => {
                let (key_desc, value_desc) = map_entry_fields(&kind);
                values
                    .iter()
                    .map(|(key, value)| {
                        let len = key.encoded_len(&key_desc) + value.map_value_len(&value_desc);
                        key_len(number) + encoded_len_varint(len as u64) + len
                    })
                    .sum()
            }
            value => value.single_encoded_len(number, &kind, field_desc.is_group()),
        }
    }

    fn single_encoded_len(&self, number: u32, kind: &Kind, is_group: bool) -> usize {
        match (self, kind) {
            (Value::Message(message), Kind::Message(_)) if is_group => {
                prost::encoding::group::encoded_len(number, message)
            }
            (Value::Message(message), Kind::Message(_)) => {
                prost::encoding::message::encoded_len(number, message)
            }
            (value, kind) => scalar!(value, kind, encoded_len(number)).unwrap_or_else(|| {
                panic!(
                    "mismatch between DynamicMessage value {:?} and type {:?}",
                    value, kind
                )
            }),
        }
    }
}

impl MapKey {
    fn encode_field<B>(&self, field_desc: &FieldDescriptor, buf: &mut B)
    where
        B: BufMut,
    {
        if self.is_default(&field_desc.kind()) {
            return;
        }
        match self {
            MapKey::String(value) => {
                prost::encoding::string::encode(field_desc.number(), value, buf)
            }
            key => Value::from(key.clone()).encode_single(
                field_desc.number(),
                &field_desc.kind(),
                false,
                buf,
            ),
        }
    }

    fn merge_field<B>(
        &mut self,
        field_desc: &FieldDescriptor,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        match (self, field_desc.kind()) {
            (MapKey::Bool(v), Kind::Bool) => prost::encoding::bool::merge(wire_type, v, buf, ctx),
            (MapKey::I32(v), Kind::Int32) => prost::encoding::int32::merge(wire_type, v, buf, ctx),
            (MapKey::I32(v), Kind::Sint32) => prost::encoding::sint32::merge(wire_type, v, buf, ctx),
            (MapKey::I32(v), Kind::Sfixed32) => {
                prost::encoding::sfixed32::merge(wire_type, v, buf, ctx)
            }
            (MapKey::I64(v), Kind::Int64) => prost::encoding::int64::merge(wire_type, v, buf, ctx),
            (MapKey::I64(v), Kind::Sint64) => prost::encoding::sint64::merge(wire_type, v, buf, ctx),
            (MapKey::I64(v), Kind::Sfixed64) => {
                prost::encoding::sfixed64::merge(wire_type, v, buf, ctx)
            }
            (MapKey::U32(v), Kind::Uint32) => prost::encoding::uint32::merge(wire_type, v, buf, ctx),
            (MapKey::U32(v), Kind::Fixed32) => {
                prost::encoding::fixed32::merge(wire_type, v, buf, ctx)
            }
            (MapKey::U64(v), Kind::Uint64) => prost::encoding::uint64::merge(wire_type, v, buf, ctx),
            (MapKey::U64(v), Kind::Fixed64) => {
                prost::encoding::fixed64::merge(wire_type, v, buf, ctx)
            }
            (MapKey::String(v), Kind::String) => {
                prost::encoding::string::merge(wire_type, v, buf, ctx)
            }
            (key, kind) => panic!("invalid map key {:?} for type {:?}", key, kind),
        }
    }

    fn encoded_len(&self, field_desc: &FieldDescriptor) -> usize {
        if self.is_default(&field_desc.kind()) {
            return 0;
        }
        match self {
            MapKey::String(value) => prost::encoding::string::encoded_len(field_desc.number(), value),
            key => Value::from(key.clone()).single_encoded_len(
                field_desc.number(),
                &field_desc.kind(),
                false,
            ),
        }
    }
}

impl DynamicMessage {
    /// Decodes a field whose key has been read. Unknown fields are recorded with the key bytes
    /// as they appeared in the input.
    fn merge_raw_field<B>(
        &mut self,
        key: RawKey,
        buf: &mut B,
        ctx: DecodeContext,
        depth: u32,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        let field_desc = match self.desc.get_field(key.number()) {
            Some(field_desc) => Some(field_desc),
            None => self.registry.find_extension(&self.desc, key.number()),
        };

        match field_desc {
            Some(field_desc) => {
                let registry = self.registry.clone();
                self.fields.get_mut(&field_desc, &registry).merge_field(
                    &field_desc,
                    key.wire_type(),
                    buf,
                    ctx,
                    &registry,
                    depth,
                )
            }
            None => self.fields.unknown.capture(&key, buf),
        }
    }

    fn merge_delimited<B>(
        &mut self,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
        depth: u32,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        check_depth(depth)?;
        merge_loop(self, buf, ctx, |message, buf, ctx| {
            let key = RawKey::read(buf)?;
            message.merge_raw_field(key, buf, ctx, depth)
        })
    }

    fn merge_group<B>(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
        depth: u32,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        check_wire_type(WireType::StartGroup, wire_type)?;
        check_depth(depth)?;
        loop {
            let key = RawKey::read(buf)?;
            if key.wire_type() == WireType::EndGroup {
                if key.number() != number {
                    return Err(DecodeError::new("unexpected end group tag"));
                }
                return Ok(());
            }
            self.merge_raw_field(key, buf, ctx.clone(), depth)?;
        }
    }

    /// Decodes a message of type `desc` from a protobuf binary buffer.
    ///
    /// Fields not declared in `desc` are kept as unknown fields and re-emitted when the
    /// message is encoded. Required fields are not checked; see [`validate`](Self::validate).
    pub fn decode<B>(desc: crate::MessageDescriptor, buf: B) -> Result<Self, crate::Error>
    where
        B: Buf,
    {
        DynamicMessage::decode_with_registry(desc, ExtensionRegistry::default(), buf)
    }

    /// Decodes a message of type `desc`, resolving extension fields through `registry`.
    pub fn decode_with_registry<B>(
        desc: crate::MessageDescriptor,
        registry: ExtensionRegistry,
        buf: B,
    ) -> Result<Self, crate::Error>
    where
        B: Buf,
    {
        let mut message = DynamicMessage::new_with_registry(desc, registry);
        message.merge(buf)?;
        Ok(message)
    }
}

fn check_depth(depth: u32) -> Result<(), DecodeError> {
    if depth > RECURSION_LIMIT {
        return Err(DecodeError::new("recursion limit reached"));
    }
    Ok(())
}

fn map_entry_fields(kind: &Kind) -> (FieldDescriptor, FieldDescriptor) {
    match kind {
        Kind::Message(entry_desc) => (
            entry_desc.map_entry_key_field(),
            entry_desc.map_entry_value_field(),
        ),
        _ => panic!("map field should have a message type, found {:?}", kind),
    }
}

fn packed_payload_len(values: &[Value], kind: &Kind) -> usize {
    values
        .iter()
        .map(|value| match (value, kind) {
            (&Value::I32(v), Kind::Sint32) => encoded_len_varint(zigzag32(v)),
            (&Value::I64(v), Kind::Sint64) => encoded_len_varint(zigzag64(v)),
            (_, Kind::Fixed32 | Kind::Sfixed32) => 4,
            (_, Kind::Fixed64 | Kind::Sfixed64) => 8,
            (value, _) => value.packed_len(),
        })
        .sum()
}

fn zigzag32(value: i32) -> u64 {
    ((value << 1) ^ (value >> 31)) as u32 as u64
}

fn zigzag64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}
