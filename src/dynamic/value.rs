use std::{collections::HashMap, fmt};

use prost::bytes::Bytes;

use crate::{DynamicMessage, Error, FieldDescriptor, Kind};

/// A dynamically-typed protobuf value.
///
/// Note this type may map to multiple possible protobuf wire formats, so it must be
/// serialized as part of a [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value, encoded as the `bool` protobuf type.
    Bool(bool),
    /// A 32-bit signed integer, encoded as one of the `int32`, `sint32` or `sfixed32` protobuf types.
    I32(i32),
    /// A 64-bit signed integer, encoded as one of the `int64`, `sint64` or `sfixed64` protobuf types.
    I64(i64),
    /// A 32-bit unsigned integer, encoded as one of the `uint32` or `fixed32` protobuf types.
    U32(u32),
    /// A 64-bit unsigned integer, encoded as one of the `uint64` or `fixed64` protobuf types.
    U64(u64),
    /// A 32-bit floating point number, encoded as the `float` protobuf type.
    F32(f32),
    /// A 64-bit floating point number, encoded as the `double` protobuf type.
    F64(f64),
    /// A string, encoded as the `string` protobuf type.
    String(String),
    /// A byte string, encoded as the `bytes` protobuf type.
    Bytes(Bytes),
    /// An enumeration value, encoded as a protobuf enum. The number need not be declared in the
    /// enum type.
    EnumNumber(i32),
    /// A protobuf message.
    Message(DynamicMessage),
    /// A list of values, encoded as a protobuf repeated field.
    List(Vec<Value>),
    /// A map of values, encoded as a protobuf map field.
    Map(HashMap<MapKey, Value>),
}

/// A dynamically-typed key for a protobuf map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    /// A boolean value, encoded as the `bool` protobuf type.
    Bool(bool),
    /// A 32-bit signed integer, encoded as one of the `int32`, `sint32` or `sfixed32` protobuf types.
    I32(i32),
    /// A 64-bit signed integer, encoded as one of the `int64`, `sint64` or `sfixed64` protobuf types.
    I64(i64),
    /// A 32-bit unsigned integer, encoded as one of the `uint32` or `fixed32` protobuf types.
    U32(u32),
    /// A 64-bit unsigned integer, encoded as one of the `uint64` or `fixed64` protobuf types.
    U64(u64),
    /// A string, encoded as the `string` protobuf type.
    String(String),
}

impl Value {
    /// Returns the value a field reads as when it is not set.
    ///
    /// This is equivalent to [`default_value`][Value::default_value] except for the following cases:
    ///
    /// * If the field is a map, an empty map is returned.
    /// * If the field is `repeated`, an empty list is returned.
    /// * If the field has a custom default value specified, that is returned (proto2 only).
    pub fn default_value_for_field(field_desc: &FieldDescriptor) -> Self {
        if field_desc.is_list() {
            Value::List(Vec::default())
        } else if field_desc.is_map() {
            Value::Map(HashMap::default())
        } else if let Some(default_value) = field_desc.default_value() {
            default_value.clone()
        } else {
            Self::default_value(&field_desc.kind())
        }
    }

    /// Returns the zero value of the given protobuf type `kind`.
    ///
    /// For enums this is the first declared value, and for messages an empty message.
    pub fn default_value(kind: &Kind) -> Self {
        match kind {
            Kind::Message(desc) => Value::Message(DynamicMessage::new(desc.clone())),
            Kind::Enum(enum_ty) => Value::EnumNumber(enum_ty.default_value().number()),
            Kind::Double => Value::F64(0.0),
            Kind::Float => Value::F32(0.0),
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => Value::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => Value::I64(0),
            Kind::Uint32 | Kind::Fixed32 => Value::U32(0),
            Kind::Uint64 | Kind::Fixed64 => Value::U64(0),
            Kind::Bool => Value::Bool(false),
            Kind::String => Value::String(String::default()),
            Kind::Bytes => Value::Bytes(Bytes::default()),
        }
    }

    /// Returns `true` if this is the default value for the given protobuf field.
    pub fn is_default_for_field(&self, field_desc: &FieldDescriptor) -> bool {
        match self {
            Value::List(list) => list.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => *self == Value::default_value_for_field(field_desc),
        }
    }

    /// Returns `true` if this value has exactly the representation stored for `field_desc`.
    pub fn is_valid_for_field(&self, field_desc: &FieldDescriptor) -> bool {
        match (self, field_desc.kind()) {
            (Value::List(list), kind) if field_desc.is_list() => {
                list.iter().all(|value| value.is_valid(&kind))
            }
            (Value::Map(map), Kind::Message(entry_desc)) if field_desc.is_map() => {
                let key_kind = entry_desc.map_entry_key_field().kind();
                let value_kind = entry_desc.map_entry_value_field().kind();
                map.iter()
                    .all(|(key, value)| key.is_valid(&key_kind) && value.is_valid(&value_kind))
            }
            (Value::List(_) | Value::Map(_), _) => false,
            (value, kind) => !field_desc.is_list() && !field_desc.is_map() && value.is_valid(&kind),
        }
    }

    /// Returns `true` if this value has exactly the representation stored for the given
    /// [`Kind`]. Lists and maps are never valid for a bare kind.
    pub fn is_valid(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Message(message), Kind::Message(desc)) => message.descriptor() == *desc,
            (value, kind) => matches!(
                (value, kind),
                (Value::Bool(_), Kind::Bool)
                    | (Value::I32(_), Kind::Int32 | Kind::Sint32 | Kind::Sfixed32)
                    | (Value::I64(_), Kind::Int64 | Kind::Sint64 | Kind::Sfixed64)
                    | (Value::U32(_), Kind::Uint32 | Kind::Fixed32)
                    | (Value::U64(_), Kind::Uint64 | Kind::Fixed64)
                    | (Value::F32(_), Kind::Float)
                    | (Value::F64(_), Kind::Double)
                    | (Value::String(_), Kind::String)
                    | (Value::Bytes(_), Kind::Bytes)
                    | (Value::EnumNumber(_), Kind::Enum(_))
            ),
        }
    }

    /// Converts this value into the representation stored for `field_desc`.
    ///
    /// Integers (including enum numbers) are range-checked against the declared type and fail
    /// with [`ErrorKind::NumericOverflow`](crate::ErrorKind::NumericOverflow). A double is
    /// truncated to fit a `float` field. Any other mismatch in shape, cardinality or type fails
    /// with [`ErrorKind::TypeMismatch`](crate::ErrorKind::TypeMismatch).
    pub fn coerce_for_field(self, field_desc: &FieldDescriptor) -> Result<Value, Error> {
        if field_desc.is_map() {
            let entry_desc = match field_desc.kind() {
                Kind::Message(entry_desc) => entry_desc,
                _ => unreachable!("map field should have a message kind"),
            };
            let key_kind = entry_desc.map_entry_key_field().kind();
            let value_kind = entry_desc.map_entry_value_field().kind();

            match self {
                Value::Map(map) => map
                    .into_iter()
                    .map(|(key, value)| {
                        Ok((
                            key.coerce(&key_kind, field_desc)?,
                            value.coerce(&value_kind, field_desc)?,
                        ))
                    })
                    .collect::<Result<_, Error>>()
                    .map(Value::Map),
                value => Err(Error::type_mismatch(
                    field_desc.full_name(),
                    "a map",
                    value.describe(),
                )),
            }
        } else if field_desc.is_list() {
            let kind = field_desc.kind();
            match self {
                Value::List(list) => list
                    .into_iter()
                    .map(|value| value.coerce(&kind, field_desc))
                    .collect::<Result<_, Error>>()
                    .map(Value::List),
                value => Err(Error::type_mismatch(
                    field_desc.full_name(),
                    "a list",
                    value.describe(),
                )),
            }
        } else {
            self.coerce(&field_desc.kind(), field_desc)
        }
    }

    fn coerce(self, kind: &Kind, field_desc: &FieldDescriptor) -> Result<Value, Error> {
        if let Some(integer) = self.as_integer() {
            if kind.is_integral() {
                return Value::from_integer(integer, kind);
            }
        }

        match (self, kind) {
            (Value::Bool(value), Kind::Bool) => Ok(Value::Bool(value)),
            (Value::F32(value), Kind::Float) => Ok(Value::F32(value)),
            (Value::F64(value), Kind::Float) => Ok(Value::F32(value as f32)),
            (Value::F32(value), Kind::Double) => Ok(Value::F64(value.into())),
            (Value::F64(value), Kind::Double) => Ok(Value::F64(value)),
            (Value::String(value), Kind::String) => Ok(Value::String(value)),
            (Value::Bytes(value), Kind::Bytes) => Ok(Value::Bytes(value)),
            (Value::Message(message), Kind::Message(desc)) if message.descriptor() == *desc => {
                Ok(Value::Message(message))
            }
            (value, kind) => Err(Error::type_mismatch(
                field_desc.full_name(),
                kind,
                value.describe(),
            )),
        }
    }

    /// Converts an integer into the representation of `kind`, failing if it is out of range.
    pub(crate) fn from_integer(value: i128, kind: &Kind) -> Result<Value, Error> {
        let overflow = |_| Error::numeric_overflow(value, kind);
        match kind {
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => {
                i32::try_from(value).map(Value::I32).map_err(overflow)
            }
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => {
                i64::try_from(value).map(Value::I64).map_err(overflow)
            }
            Kind::Uint32 | Kind::Fixed32 => u32::try_from(value).map(Value::U32).map_err(overflow),
            Kind::Uint64 | Kind::Fixed64 => u64::try_from(value).map(Value::U64).map_err(overflow),
            Kind::Enum(_) => i32::try_from(value)
                .map(Value::EnumNumber)
                .map_err(overflow),
            _ => Err(Error::numeric_overflow(value, kind)),
        }
    }

    fn as_integer(&self) -> Option<i128> {
        match *self {
            Value::I32(value) | Value::EnumNumber(value) => Some(value.into()),
            Value::I64(value) => Some(value.into()),
            Value::U32(value) => Some(value.into()),
            Value::U64(value) => Some(value.into()),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Bool(value) => format!("bool {}", value),
            Value::I32(value) => format!("i32 {}", value),
            Value::I64(value) => format!("i64 {}", value),
            Value::U32(value) => format!("u32 {}", value),
            Value::U64(value) => format!("u64 {}", value),
            Value::F32(value) => format!("f32 {}", value),
            Value::F64(value) => format!("f64 {}", value),
            Value::String(_) => "a string".to_owned(),
            Value::Bytes(_) => "bytes".to_owned(),
            Value::EnumNumber(value) => format!("enum number {}", value),
            Value::Message(message) => format!("message {}", message.descriptor().full_name()),
            Value::List(_) => "a list".to_owned(),
            Value::Map(_) => "a map".to_owned(),
        }
    }

    /// Returns the value if it is a `Value::Bool`, or `None` if it is any other type.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::I32`, or `None` if it is any other type.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::I64`, or `None` if it is any other type.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::U32`, or `None` if it is any other type.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::U64`, or `None` if it is any other type.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::F32`, or `None` if it is any other type.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::F64`, or `None` if it is any other type.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::EnumNumber`, or `None` if it is any other type.
    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::String`, or `None` if it is any other type.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::Bytes`, or `None` if it is any other type.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::Message`, or `None` if it is any other type.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value if it is a `Value::Message`, or `None` if it is any other type.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::List`, or `None` if it is any other type.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value if it is a `Value::List`, or `None` if it is any other type.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `Value::Map`, or `None` if it is any other type.
    pub fn as_map(&self) -> Option<&HashMap<MapKey, Value>> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value if it is a `Value::Map`, or `None` if it is any other type.
    pub fn as_map_mut(&mut self) -> Option<&mut HashMap<MapKey, Value>> {
        match self {
            Value::Map(value) => Some(value),
            _ => None,
        }
    }
}

impl MapKey {
    /// Returns the default value for the given protobuf type `kind`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is not a valid map key type (an integral type or string).
    pub fn default_value(kind: &Kind) -> Self {
        match *kind {
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => MapKey::I32(0),
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => MapKey::I64(0),
            Kind::Uint32 | Kind::Fixed32 => MapKey::U32(0),
            Kind::Uint64 | Kind::Fixed64 => MapKey::U64(0),
            Kind::Bool => MapKey::Bool(false),
            Kind::String => MapKey::String(String::default()),
            _ => panic!("invalid type for map key"),
        }
    }

    /// Returns `true` if this is the default value for the given protobuf type `kind`.
    pub fn is_default(&self, kind: &Kind) -> bool {
        *self == MapKey::default_value(kind)
    }

    /// Returns `true` if this map key can be encoded as the given [`Kind`].
    pub fn is_valid(&self, kind: &Kind) -> bool {
        matches!(
            (self, kind),
            (MapKey::Bool(_), Kind::Bool)
                | (MapKey::I32(_), Kind::Int32 | Kind::Sint32 | Kind::Sfixed32)
                | (MapKey::I64(_), Kind::Int64 | Kind::Sint64 | Kind::Sfixed64)
                | (MapKey::U32(_), Kind::Uint32 | Kind::Fixed32)
                | (MapKey::U64(_), Kind::Uint64 | Kind::Fixed64)
                | (MapKey::String(_), Kind::String)
        )
    }

    fn coerce(self, kind: &Kind, field_desc: &FieldDescriptor) -> Result<MapKey, Error> {
        match Value::from(self).coerce(kind, field_desc)? {
            Value::Bool(value) => Ok(MapKey::Bool(value)),
            Value::I32(value) => Ok(MapKey::I32(value)),
            Value::I64(value) => Ok(MapKey::I64(value)),
            Value::U32(value) => Ok(MapKey::U32(value)),
            Value::U64(value) => Ok(MapKey::U64(value)),
            Value::String(value) => Ok(MapKey::String(value)),
            value => Err(Error::type_mismatch(
                field_desc.full_name(),
                "a map key",
                value.describe(),
            )),
        }
    }

    /// Returns the value if it is a `MapKey::Bool`, or `None` if it is any other type.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            MapKey::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `MapKey::I32`, or `None` if it is any other type.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            MapKey::I32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `MapKey::I64`, or `None` if it is any other type.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            MapKey::I64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `MapKey::U32`, or `None` if it is any other type.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            MapKey::U32(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `MapKey::U64`, or `None` if it is any other type.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            MapKey::U64(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value if it is a `MapKey::String`, or `None` if it is any other type.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MapKey::String(value) => Some(value),
            _ => None,
        }
    }
}

impl Kind {
    pub(crate) fn is_integral(&self) -> bool {
        matches!(
            self,
            Kind::Int32
                | Kind::Int64
                | Kind::Uint32
                | Kind::Uint64
                | Kind::Sint32
                | Kind::Sint64
                | Kind::Fixed32
                | Kind::Fixed64
                | Kind::Sfixed32
                | Kind::Sfixed64
                | Kind::Enum(_)
        )
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(value) => write!(f, "{}", value),
            MapKey::I32(value) => write!(f, "{}", value),
            MapKey::I64(value) => write!(f, "{}", value),
            MapKey::U32(value) => write!(f, "{}", value),
            MapKey::U64(value) => write!(f, "{}", value),
            MapKey::String(value) => f.write_str(value),
        }
    }
}

impl From<MapKey> for Value {
    fn from(value: MapKey) -> Self {
        match value {
            MapKey::Bool(value) => Value::Bool(value),
            MapKey::I32(value) => Value::I32(value),
            MapKey::I64(value) => Value::I64(value),
            MapKey::U32(value) => Value::U32(value),
            MapKey::U64(value) => Value::U64(value),
            MapKey::String(value) => Value::String(value),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    &str => String,
    Bytes => Bytes,
    Vec<u8> => Bytes,
    DynamicMessage => Message,
    Vec<Value> => List,
    HashMap<MapKey, Value> => Map,
}

impl From<&str> for MapKey {
    fn from(value: &str) -> Self {
        MapKey::String(value.to_owned())
    }
}

impl From<String> for MapKey {
    fn from(value: String) -> Self {
        MapKey::String(value)
    }
}

impl From<i32> for MapKey {
    fn from(value: i32) -> Self {
        MapKey::I32(value)
    }
}

impl From<i64> for MapKey {
    fn from(value: i64) -> Self {
        MapKey::I64(value)
    }
}

impl From<u32> for MapKey {
    fn from(value: u32) -> Self {
        MapKey::U32(value)
    }
}

impl From<u64> for MapKey {
    fn from(value: u64) -> Self {
        MapKey::U64(value)
    }
}

impl From<bool> for MapKey {
    fn from(value: bool) -> Self {
        MapKey::Bool(value)
    }
}
