use std::{
    collections::{hash_map, BTreeMap, HashMap},
    mem,
};

use prost::bytes::Bytes;
use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorSet,
};

use crate::{
    descriptor::{
        case::to_json_name, make_full_name, Cardinality, Definition, DescriptorError,
        DescriptorPoolInner, EnumDescriptorInner, EnumValueDescriptorInner, FieldDescriptorInner,
        KindIndex, MessageDescriptorInner, OneofDescriptorInner, Syntax, MAP_ENTRY_KEY_NUMBER,
        MAP_ENTRY_VALUE_NUMBER,
    },
    Value,
};

pub(super) fn build(raw: &FileDescriptorSet) -> Result<DescriptorPoolInner, DescriptorError> {
    let mut builder = PoolBuilder::default();

    for file in &raw.file {
        let syntax = match file.syntax.as_deref() {
            None | Some("") | Some("proto2") => Syntax::Proto2,
            Some("proto3") => Syntax::Proto3,
            Some(s) => return Err(DescriptorError::unknown_syntax(s)),
        };

        let namespace = file.package();
        for message_proto in &file.message_type {
            builder.add_message(namespace, message_proto, syntax)?;
        }
        for enum_proto in &file.enum_type {
            builder.add_enum(namespace, enum_proto)?;
        }
        for extension_proto in &file.extension {
            builder.pending_extensions.push(PendingExtension {
                scope: namespace.to_owned(),
                proto: extension_proto,
                syntax,
            });
        }
    }

    for pending in mem::take(&mut builder.pending_messages) {
        builder.add_fields(pending)?;
    }
    for pending in mem::take(&mut builder.pending_extensions) {
        builder.add_extension(pending)?;
    }

    Ok(builder.pool)
}

#[derive(Default)]
struct PoolBuilder<'a> {
    pool: DescriptorPoolInner,
    pending_messages: Vec<PendingMessage<'a>>,
    pending_extensions: Vec<PendingExtension<'a>>,
}

struct PendingMessage<'a> {
    index: usize,
    proto: &'a DescriptorProto,
}

struct PendingExtension<'a> {
    scope: String,
    proto: &'a FieldDescriptorProto,
    syntax: Syntax,
}

impl<'a> PoolBuilder<'a> {
    fn add_name(&mut self, name: &str, definition: Definition) -> Result<(), DescriptorError> {
        match self.pool.names.entry(name.into()) {
            hash_map::Entry::Occupied(_) => Err(DescriptorError::duplicate_name(name)),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(definition);
                Ok(())
            }
        }
    }

    fn add_message(
        &mut self,
        namespace: &str,
        proto: &'a DescriptorProto,
        syntax: Syntax,
    ) -> Result<(), DescriptorError> {
        let full_name = make_full_name(namespace, proto.name());
        let index = self.pool.messages.len();
        self.add_name(&full_name, Definition::Message(index))?;

        let oneofs = proto
            .oneof_decl
            .iter()
            .map(|oneof_proto| OneofDescriptorInner {
                name: oneof_proto.name().to_owned(),
                full_name: make_full_name(&full_name, oneof_proto.name()),
                fields: Vec::new(),
            })
            .collect::<Vec<_>>();
        for (oneof_index, oneof) in oneofs.iter().enumerate() {
            self.add_name(
                &oneof.full_name,
                Definition::Oneof {
                    message: index,
                    index: oneof_index,
                },
            )?;
        }

        self.pool.messages.push(MessageDescriptorInner {
            full_name: full_name.clone(),
            syntax,
            is_map_entry: proto
                .options
                .as_ref()
                .map_or(false, |options| options.map_entry()),
            fields: BTreeMap::new(),
            field_names: HashMap::new(),
            field_json_names: HashMap::new(),
            oneofs,
            extensions: Vec::new(),
        });
        self.pending_messages.push(PendingMessage { index, proto });

        for nested_proto in &proto.nested_type {
            self.add_message(&full_name, nested_proto, syntax)?;
        }
        for enum_proto in &proto.enum_type {
            self.add_enum(&full_name, enum_proto)?;
        }
        for extension_proto in &proto.extension {
            self.pending_extensions.push(PendingExtension {
                scope: full_name.clone(),
                proto: extension_proto,
                syntax,
            });
        }

        Ok(())
    }

    fn add_enum(
        &mut self,
        namespace: &str,
        proto: &EnumDescriptorProto,
    ) -> Result<(), DescriptorError> {
        let full_name = make_full_name(namespace, proto.name());
        if proto.value.is_empty() {
            return Err(DescriptorError::empty_enum(full_name));
        }

        let index = self.pool.enums.len();
        self.add_name(&full_name, Definition::Enum(index))?;

        let mut inner = EnumDescriptorInner {
            full_name: full_name.clone(),
            values: Vec::with_capacity(proto.value.len()),
            value_numbers: BTreeMap::new(),
            value_names: HashMap::new(),
        };
        for (value_index, value_proto) in proto.value.iter().enumerate() {
            let value_full_name = make_full_name(&full_name, value_proto.name());
            self.add_name(
                &value_full_name,
                Definition::EnumValue {
                    parent: index,
                    index: value_index,
                },
            )?;

            inner
                .value_numbers
                .entry(value_proto.number())
                .or_insert(value_index);
            inner
                .value_names
                .insert(value_proto.name().to_owned(), value_index);
            inner.values.push(EnumValueDescriptorInner {
                name: value_proto.name().to_owned(),
                full_name: value_full_name,
                number: value_proto.number(),
            });
        }

        self.pool.enums.push(inner);
        Ok(())
    }

    fn add_fields(&mut self, pending: PendingMessage<'a>) -> Result<(), DescriptorError> {
        let message_name = self.pool.messages[pending.index].full_name.clone();
        let syntax = self.pool.messages[pending.index].syntax;

        for field_proto in &pending.proto.field {
            let full_name = make_full_name(&message_name, field_proto.name());
            let field = self.build_field(field_proto, pending.index, full_name, syntax, false)?;

            let field_index = self.pool.fields.len();
            self.add_name(&field.full_name, Definition::Field(field_index))?;

            let message = &mut self.pool.messages[pending.index];
            if let Some(oneof_index) = field.oneof {
                match message.oneofs.get_mut(oneof_index) {
                    Some(oneof) => oneof.fields.push(field_index),
                    None => return Err(DescriptorError::invalid_oneof_index(&field.full_name)),
                }
            }
            if message.fields.insert(field.number, field_index).is_some() {
                return Err(DescriptorError::duplicate_field_number(
                    &message_name,
                    field.number,
                ));
            }
            message.field_names.insert(field.name.clone(), field_index);
            message
                .field_json_names
                .insert(field.json_name.clone(), field_index);

            self.pool.fields.push(field);
        }

        let message = &self.pool.messages[pending.index];
        if message.is_map_entry
            && (!message.fields.contains_key(&MAP_ENTRY_KEY_NUMBER)
                || !message.fields.contains_key(&MAP_ENTRY_VALUE_NUMBER))
        {
            return Err(DescriptorError::invalid_map_entry(message_name));
        }

        Ok(())
    }

    fn add_extension(&mut self, pending: PendingExtension<'a>) -> Result<(), DescriptorError> {
        let full_name = make_full_name(&pending.scope, pending.proto.name());
        let extendee = match self.resolve(pending.proto.extendee(), &full_name)? {
            Definition::Message(index) => index,
            _ => {
                return Err(DescriptorError::type_not_found(
                    pending.proto.extendee(),
                    &full_name,
                ))
            }
        };

        let field = self.build_field(pending.proto, extendee, full_name, pending.syntax, true)?;
        let field_index = self.pool.fields.len();
        self.add_name(&field.full_name, Definition::Extension(field_index))?;
        self.pool.fields.push(field);
        self.pool.extensions.push(field_index);
        self.pool.messages[extendee].extensions.push(field_index);
        Ok(())
    }

    fn build_field(
        &self,
        proto: &FieldDescriptorProto,
        parent: usize,
        full_name: String,
        syntax: Syntax,
        is_extension: bool,
    ) -> Result<FieldDescriptorInner, DescriptorError> {
        let kind = self.resolve_kind(proto, &full_name)?;

        let cardinality = match proto.label() {
            Label::Optional => Cardinality::Optional,
            Label::Required => Cardinality::Required,
            Label::Repeated => Cardinality::Repeated,
        };

        let is_packed = cardinality == Cardinality::Repeated
            && kind.is_packable()
            && proto
                .options
                .as_ref()
                .and_then(|options| options.packed)
                .unwrap_or(syntax == Syntax::Proto3);

        let supports_presence = cardinality != Cardinality::Repeated
            && (proto.proto3_optional()
                || proto.oneof_index.is_some()
                || is_extension
                || syntax == Syntax::Proto2
                || matches!(kind, KindIndex::Message(_)));

        let default_value = match &proto.default_value {
            Some(value) => Some(
                self.parse_default_value(kind, value)
                    .ok_or_else(|| DescriptorError::invalid_default_value(&full_name, value))?,
            ),
            None => None,
        };

        let oneof = match (is_extension, proto.oneof_index) {
            (false, Some(index)) => Some(
                usize::try_from(index)
                    .map_err(|_| DescriptorError::invalid_oneof_index(&full_name))?,
            ),
            _ => None,
        };

        Ok(FieldDescriptorInner {
            name: proto.name().to_owned(),
            json_name: proto
                .json_name
                .clone()
                .unwrap_or_else(|| to_json_name(proto.name())),
            full_name,
            number: proto.number() as u32,
            parent,
            is_extension,
            kind,
            cardinality,
            is_group: proto.r#type == Some(Type::Group as i32),
            is_packed,
            supports_presence,
            oneof,
            default_value,
        })
    }

    fn resolve_kind(
        &self,
        proto: &FieldDescriptorProto,
        referenced_by: &str,
    ) -> Result<KindIndex, DescriptorError> {
        let ty = match proto.r#type {
            Some(_) => proto.r#type(),
            // The type may be omitted when only the type name is known.
            None => match self.resolve(proto.type_name(), referenced_by)? {
                Definition::Enum(_) => Type::Enum,
                _ => Type::Message,
            },
        };

        Ok(match ty {
            Type::Double => KindIndex::Double,
            Type::Float => KindIndex::Float,
            Type::Int64 => KindIndex::Int64,
            Type::Uint64 => KindIndex::Uint64,
            Type::Int32 => KindIndex::Int32,
            Type::Fixed64 => KindIndex::Fixed64,
            Type::Fixed32 => KindIndex::Fixed32,
            Type::Bool => KindIndex::Bool,
            Type::String => KindIndex::String,
            Type::Bytes => KindIndex::Bytes,
            Type::Uint32 => KindIndex::Uint32,
            Type::Sfixed32 => KindIndex::Sfixed32,
            Type::Sfixed64 => KindIndex::Sfixed64,
            Type::Sint32 => KindIndex::Sint32,
            Type::Sint64 => KindIndex::Sint64,
            Type::Message | Type::Group => {
                match self.resolve(proto.type_name(), referenced_by)? {
                    Definition::Message(index) => KindIndex::Message(index),
                    _ => {
                        return Err(DescriptorError::type_not_found(
                            proto.type_name(),
                            referenced_by,
                        ))
                    }
                }
            }
            Type::Enum => match self.resolve(proto.type_name(), referenced_by)? {
                Definition::Enum(index) => KindIndex::Enum(index),
                _ => {
                    return Err(DescriptorError::type_not_found(
                        proto.type_name(),
                        referenced_by,
                    ))
                }
            },
        })
    }

    fn resolve(&self, name: &str, referenced_by: &str) -> Result<Definition, DescriptorError> {
        self.pool
            .names
            .get(name.trim_start_matches('.'))
            .copied()
            .ok_or_else(|| DescriptorError::type_not_found(name, referenced_by))
    }

    fn parse_default_value(&self, kind: KindIndex, value: &str) -> Option<Value> {
        match kind {
            KindIndex::Double => parse_float(value).map(Value::F64),
            KindIndex::Float => parse_float(value).map(|v| Value::F32(v as f32)),
            KindIndex::Int32 | KindIndex::Sint32 | KindIndex::Sfixed32 => {
                value.parse().ok().map(Value::I32)
            }
            KindIndex::Int64 | KindIndex::Sint64 | KindIndex::Sfixed64 => {
                value.parse().ok().map(Value::I64)
            }
            KindIndex::Uint32 | KindIndex::Fixed32 => value.parse().ok().map(Value::U32),
            KindIndex::Uint64 | KindIndex::Fixed64 => value.parse().ok().map(Value::U64),
            KindIndex::Bool => value.parse().ok().map(Value::Bool),
            KindIndex::String => Some(Value::String(value.to_owned())),
            KindIndex::Bytes => unescape_c_string(value).map(Value::Bytes),
            KindIndex::Enum(index) => {
                let enum_ty = &self.pool.enums[index];
                enum_ty
                    .value_names
                    .get(value)
                    .map(|&value_index| Value::EnumNumber(enum_ty.values[value_index].number))
            }
            KindIndex::Message(_) => None,
        }
    }
}

fn parse_float(value: &str) -> Option<f64> {
    match value {
        "inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        "nan" => Some(f64::NAN),
        _ => value.parse().ok(),
    }
}

/// Reverses the C-style escaping the protobuf compiler applies to `bytes` defaults.
fn unescape_c_string(s: &str) -> Option<Bytes> {
    let mut dst = Vec::with_capacity(s.len());
    let mut bytes = s.bytes().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            dst.push(byte);
            continue;
        }

        match bytes.next()? {
            b'a' => dst.push(0x07),
            b'b' => dst.push(0x08),
            b'f' => dst.push(0x0c),
            b'n' => dst.push(b'\n'),
            b'r' => dst.push(b'\r'),
            b't' => dst.push(b'\t'),
            b'v' => dst.push(0x0b),
            b'\\' => dst.push(b'\\'),
            b'?' => dst.push(b'?'),
            b'\'' => dst.push(b'\''),
            b'"' => dst.push(b'"'),
            first @ b'0'..=b'7' => {
                let mut octal = u32::from(first - b'0');
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(&digit @ b'0'..=b'7') => {
                            octal = octal * 8 + u32::from(digit - b'0');
                            bytes.next();
                        }
                        _ => break,
                    }
                }
                dst.push(u8::try_from(octal).ok()?);
            }
            b'x' | b'X' => {
                let mut hex = 0u8;
                let mut digits = 0;
                while digits < 2 {
                    match bytes.peek().and_then(|&digit| (digit as char).to_digit(16)) {
                        Some(digit) => {
                            hex = hex * 16 + digit as u8;
                            digits += 1;
                            bytes.next();
                        }
                        None => break,
                    }
                }
                if digits == 0 {
                    return None;
                }
                dst.push(hex);
            }
            _ => return None,
        }
    }

    Some(dst.into())
}
