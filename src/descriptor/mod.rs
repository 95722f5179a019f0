mod build;
mod case;
mod error;
mod registry;

pub use self::{error::DescriptorError, registry::ExtensionRegistry};

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use prost::{bytes::Buf, encoding::WireType, Message};
use prost_types::FileDescriptorSet;

use crate::Value;

pub(crate) const MAP_ENTRY_KEY_NUMBER: u32 = 1;
pub(crate) const MAP_ENTRY_VALUE_NUMBER: u32 = 2;

/// A set of resolved protobuf type definitions, built from a [`FileDescriptorSet`].
///
/// This type is immutable once constructed, and uses reference counting internally so it is
/// cheap to clone.
#[derive(Clone)]
pub struct DescriptorPool {
    inner: Arc<DescriptorPoolInner>,
}

#[derive(Default)]
struct DescriptorPoolInner {
    names: HashMap<Box<str>, Definition>,
    messages: Vec<MessageDescriptorInner>,
    enums: Vec<EnumDescriptorInner>,
    fields: Vec<FieldDescriptorInner>,
    extensions: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Definition {
    Message(usize),
    Enum(usize),
    EnumValue { parent: usize, index: usize },
    Field(usize),
    Extension(usize),
    Oneof { message: usize, index: usize },
}

struct MessageDescriptorInner {
    full_name: String,
    syntax: Syntax,
    is_map_entry: bool,
    fields: BTreeMap<u32, usize>,
    field_names: HashMap<String, usize>,
    field_json_names: HashMap<String, usize>,
    oneofs: Vec<OneofDescriptorInner>,
    extensions: Vec<usize>,
}

struct OneofDescriptorInner {
    name: String,
    full_name: String,
    fields: Vec<usize>,
}

struct FieldDescriptorInner {
    name: String,
    full_name: String,
    json_name: String,
    number: u32,
    parent: usize,
    is_extension: bool,
    kind: KindIndex,
    cardinality: Cardinality,
    is_group: bool,
    is_packed: bool,
    supports_presence: bool,
    oneof: Option<usize>,
    default_value: Option<Value>,
}

struct EnumDescriptorInner {
    full_name: String,
    values: Vec<EnumValueDescriptorInner>,
    value_numbers: BTreeMap<i32, usize>,
    value_names: HashMap<String, usize>,
}

struct EnumValueDescriptorInner {
    name: String,
    full_name: String,
    number: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindIndex {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Message(usize),
    Enum(usize),
}

/// A protobuf message definition.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

/// A field of a protobuf message, or an extension field declared in a file or message scope.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    index: usize,
}

/// A oneof declaration in a protobuf message.
#[derive(Clone, PartialEq, Eq)]
pub struct OneofDescriptor {
    message: MessageDescriptor,
    index: usize,
}

/// A protobuf enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: usize,
}

/// A value of a protobuf enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    parent: EnumDescriptor,
    index: usize,
}

/// The declared type of a protobuf message field.
#[derive(Clone, PartialEq, Eq)]
pub enum Kind {
    /// The protobuf `double` type.
    Double,
    /// The protobuf `float` type.
    Float,
    /// The protobuf `int32` type.
    Int32,
    /// The protobuf `int64` type.
    Int64,
    /// The protobuf `uint32` type.
    Uint32,
    /// The protobuf `uint64` type.
    Uint64,
    /// The protobuf `sint32` type.
    Sint32,
    /// The protobuf `sint64` type.
    Sint64,
    /// The protobuf `fixed32` type.
    Fixed32,
    /// The protobuf `fixed64` type.
    Fixed64,
    /// The protobuf `sfixed32` type.
    Sfixed32,
    /// The protobuf `sfixed64` type.
    Sfixed64,
    /// The protobuf `bool` type.
    Bool,
    /// The protobuf `string` type.
    String,
    /// The protobuf `bytes` type.
    Bytes,
    /// A protobuf message type. Groups are message types whose field reports
    /// [`FieldDescriptor::is_group`].
    Message(MessageDescriptor),
    /// A protobuf enum type.
    Enum(EnumDescriptor),
}

/// Cardinality determines whether a field is optional, required, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    /// The field appears zero or one times.
    Optional,
    /// The field appears exactly one time. This cardinality is invalid with Proto3.
    Required,
    /// The field appears zero or more times.
    Repeated,
}

/// The syntax of the file a message was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// The `proto2` syntax.
    Proto2,
    /// The `proto3` syntax.
    Proto3,
}

/// A named definition found by [`DescriptorPool::find_symbol`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A message type.
    Message(MessageDescriptor),
    /// An enum type.
    Enum(EnumDescriptor),
    /// An enum value, named `<enum type>.<value name>`.
    EnumValue(EnumValueDescriptor),
    /// A message field.
    Field(FieldDescriptor),
    /// An extension field.
    Extension(FieldDescriptor),
    /// A oneof declaration.
    Oneof(OneofDescriptor),
}

impl DescriptorPool {
    /// Creates a [`DescriptorPool`] from a [`FileDescriptorSet`].
    ///
    /// This method may return an error if `file_descriptor_set` is invalid, for example
    /// it contains references to types not in the set. If `file_descriptor_set` was created by
    /// the protobuf compiler, these error cases should never occur.
    ///
    /// Type names referenced by fields must be fully qualified, as the protobuf compiler emits them.
    pub fn new(file_descriptor_set: FileDescriptorSet) -> Result<Self, DescriptorError> {
        let inner = build::build(&file_descriptor_set)?;
        tracing::debug!(
            files = file_descriptor_set.file.len(),
            messages = inner.messages.len(),
            enums = inner.enums.len(),
            extensions = inner.extensions.len(),
            "built descriptor pool"
        );
        Ok(DescriptorPool {
            inner: Arc::new(inner),
        })
    }

    /// Decodes a serialized [`FileDescriptorSet`] and creates a [`DescriptorPool`] from it.
    pub fn decode<B>(bytes: B) -> Result<Self, DescriptorError>
    where
        B: Buf,
    {
        let file_descriptor_set =
            FileDescriptorSet::decode(bytes).map_err(DescriptorError::decode)?;
        DescriptorPool::new(file_descriptor_set)
    }

    /// Gets a [`MessageDescriptor`] by its fully qualified name, for example `my.package.MyMessage`.
    pub fn get_message_by_name(&self, name: &str) -> Option<MessageDescriptor> {
        match self.find_symbol(name)? {
            Symbol::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Gets an [`EnumDescriptor`] by its fully qualified name, for example `my.package.MyEnum`.
    pub fn get_enum_by_name(&self, name: &str) -> Option<EnumDescriptor> {
        match self.find_symbol(name)? {
            Symbol::Enum(enum_ty) => Some(enum_ty),
            _ => None,
        }
    }

    /// Gets an extension field by its fully qualified name, for example `my.package.my_extension`.
    pub fn get_extension_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        match self.find_symbol(name)? {
            Symbol::Extension(extension) => Some(extension),
            _ => None,
        }
    }

    /// Resolves a fully qualified name to the definition it names. A leading `.` is ignored.
    pub fn find_symbol(&self, name: &str) -> Option<Symbol> {
        let definition = *self.inner.names.get(name.trim_start_matches('.'))?;
        Some(match definition {
            Definition::Message(index) => Symbol::Message(self.message(index)),
            Definition::Enum(index) => Symbol::Enum(self.enum_ty(index)),
            Definition::EnumValue { parent, index } => Symbol::EnumValue(EnumValueDescriptor {
                parent: self.enum_ty(parent),
                index,
            }),
            Definition::Field(index) => Symbol::Field(self.field(index)),
            Definition::Extension(index) => Symbol::Extension(self.field(index)),
            Definition::Oneof { message, index } => Symbol::Oneof(OneofDescriptor {
                message: self.message(message),
                index,
            }),
        })
    }

    /// Gets an iterator over all message types in this pool, including map entry messages.
    pub fn all_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| self.message(index))
    }

    /// Gets an iterator over all enum types in this pool.
    pub fn all_enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        (0..self.inner.enums.len()).map(move |index| self.enum_ty(index))
    }

    /// Gets an iterator over all extension fields declared in this pool.
    pub fn all_extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner
            .extensions
            .iter()
            .map(move |&index| self.field(index))
    }

    fn message(&self, index: usize) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.clone(),
            index,
        }
    }

    fn enum_ty(&self, index: usize) -> EnumDescriptor {
        EnumDescriptor {
            pool: self.clone(),
            index,
        }
    }

    fn field(&self, index: usize) -> FieldDescriptor {
        FieldDescriptor {
            pool: self.clone(),
            index,
        }
    }
}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .field("extensions", &self.inner.extensions.len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl MessageDescriptor {
    /// Gets a reference to the [`DescriptorPool`] this message is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the short name of the message type, e.g. `MyMessage`.
    pub fn name(&self) -> &str {
        parse_name(self.full_name())
    }

    /// Gets the full name of the message type, e.g. `my.package.MyMessage`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the syntax of the file this message is declared in.
    pub fn syntax(&self) -> Syntax {
        self.inner().syntax
    }

    /// Gets an iterator over the fields of this message, in field number order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .fields
            .values()
            .map(move |&index| self.pool.field(index))
    }

    /// Gets an iterator over the oneof declarations of this message.
    pub fn oneofs(&self) -> impl ExactSizeIterator<Item = OneofDescriptor> + '_ {
        (0..self.inner().oneofs.len()).map(move |index| OneofDescriptor {
            message: self.clone(),
            index,
        })
    }

    /// Gets an iterator over the extensions of this message declared in its pool.
    pub fn extensions(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(move |&index| self.pool.field(index))
    }

    /// Gets a field by its number.
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .fields
            .get(&number)
            .map(|&index| self.pool.field(index))
    }

    /// Gets a field by its proto name, e.g. `my_field`.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_names
            .get(name)
            .map(|&index| self.pool.field(index))
    }

    /// Gets a field by its JSON name, e.g. `myField`.
    pub fn get_field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_json_names
            .get(json_name)
            .map(|&index| self.pool.field(index))
    }

    /// Returns `true` if this is the synthetic entry message of a map field.
    pub fn is_map_entry(&self) -> bool {
        self.inner().is_map_entry
    }

    /// Gets the key field of a map entry message.
    ///
    /// # Panics
    ///
    /// Panics if this message is not a map entry.
    pub fn map_entry_key_field(&self) -> FieldDescriptor {
        debug_assert!(self.is_map_entry());
        self.get_field(MAP_ENTRY_KEY_NUMBER)
            .expect("map entry should have key field")
    }

    /// Gets the value field of a map entry message.
    ///
    /// # Panics
    ///
    /// Panics if this message is not a map entry.
    pub fn map_entry_value_field(&self) -> FieldDescriptor {
        debug_assert!(self.is_map_entry());
        self.get_field(MAP_ENTRY_VALUE_NUMBER)
            .expect("map entry should have value field")
    }

    fn inner(&self) -> &MessageDescriptorInner {
        &self.pool.inner.messages[self.index]
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("full_name", &self.full_name())
            .field("is_map_entry", &self.is_map_entry())
            .finish()
    }
}

impl FieldDescriptor {
    /// Gets a reference to the [`DescriptorPool`] this field is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the message this field belongs to. For an extension, this is the extended message.
    pub fn containing_message(&self) -> MessageDescriptor {
        self.pool.message(self.inner().parent)
    }

    /// Gets the short name of the field, e.g. `my_field`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets the full name of the field, e.g. `my.package.MyMessage.my_field`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the name used for this field in JSON, e.g. `myField`.
    pub fn json_name(&self) -> &str {
        &self.inner().json_name
    }

    /// Gets the unique number of this field within its message.
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// Gets the declared type of this field. For map fields this is the map entry message.
    pub fn kind(&self) -> Kind {
        match self.inner().kind {
            KindIndex::Double => Kind::Double,
            KindIndex::Float => Kind::Float,
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::Uint32 => Kind::Uint32,
            KindIndex::Uint64 => Kind::Uint64,
            KindIndex::Sint32 => Kind::Sint32,
            KindIndex::Sint64 => Kind::Sint64,
            KindIndex::Fixed32 => Kind::Fixed32,
            KindIndex::Fixed64 => Kind::Fixed64,
            KindIndex::Sfixed32 => Kind::Sfixed32,
            KindIndex::Sfixed64 => Kind::Sfixed64,
            KindIndex::Bool => Kind::Bool,
            KindIndex::String => Kind::String,
            KindIndex::Bytes => Kind::Bytes,
            KindIndex::Message(index) => Kind::Message(self.pool.message(index)),
            KindIndex::Enum(index) => Kind::Enum(self.pool.enum_ty(index)),
        }
    }

    /// Gets the cardinality of this field.
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    /// Returns `true` if this is a repeated field which is not a map.
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated && !self.is_map()
    }

    /// Returns `true` if this is a map field.
    pub fn is_map(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
            && match self.inner().kind {
                KindIndex::Message(index) => self.pool.inner.messages[index].is_map_entry,
                _ => false,
            }
    }

    /// Returns `true` if this field uses the legacy group encoding.
    pub fn is_group(&self) -> bool {
        self.inner().is_group
    }

    /// Returns `true` if this field is encoded in the packed format.
    pub fn is_packed(&self) -> bool {
        self.inner().is_packed
    }

    /// Returns `true` if this is a repeated field whose elements may use the packed format.
    pub fn is_packable(&self) -> bool {
        self.cardinality() == Cardinality::Repeated && self.inner().kind.is_packable()
    }

    /// Returns `true` if this is an extension field.
    pub fn is_extension(&self) -> bool {
        self.inner().is_extension
    }

    /// Returns `true` if this field tracks whether it was explicitly set, so that a default value
    /// is distinguishable from an unset field.
    pub fn supports_presence(&self) -> bool {
        self.inner().supports_presence
    }

    /// Gets the oneof this field is a member of, if any.
    pub fn containing_oneof(&self) -> Option<OneofDescriptor> {
        self.inner().oneof.map(|index| OneofDescriptor {
            message: self.containing_message(),
            index,
        })
    }

    /// Gets the default value declared for this field with the proto2 `default` option.
    pub fn default_value(&self) -> Option<&Value> {
        self.inner().default_value.as_ref()
    }

    fn inner(&self) -> &FieldDescriptorInner {
        &self.pool.inner.fields[self.index]
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("full_name", &self.full_name())
            .field("number", &self.number())
            .field("kind", &self.kind())
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

impl OneofDescriptor {
    /// Gets the message this oneof is declared in.
    pub fn parent_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Gets the short name of the oneof, e.g. `my_oneof`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets the full name of the oneof, e.g. `my.package.MyMessage.my_oneof`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the index of this oneof within its message.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets an iterator over the member fields of this oneof.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .fields
            .iter()
            .map(move |&index| self.message.pool.field(index))
    }

    fn inner(&self) -> &OneofDescriptorInner {
        &self.message.inner().oneofs[self.index]
    }
}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneofDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl EnumDescriptor {
    /// Gets a reference to the [`DescriptorPool`] this enum type is defined in.
    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Gets the short name of the enum type, e.g. `MyEnum`.
    pub fn name(&self) -> &str {
        parse_name(self.full_name())
    }

    /// Gets the full name of the enum, e.g. `my.package.MyEnum`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the first value declared in the enum, which is its default.
    pub fn default_value(&self) -> EnumValueDescriptor {
        EnumValueDescriptor {
            parent: self.clone(),
            index: 0,
        }
    }

    /// Gets a value by its number. If several values share a number, the first declared wins.
    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        self.inner()
            .value_numbers
            .get(&number)
            .map(|&index| EnumValueDescriptor {
                parent: self.clone(),
                index,
            })
    }

    /// Gets a value by its short name, e.g. `MY_VALUE`.
    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        self.inner()
            .value_names
            .get(name)
            .map(|&index| EnumValueDescriptor {
                parent: self.clone(),
                index,
            })
    }

    /// Gets an iterator over the values of this enum, in declaration order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = EnumValueDescriptor> + '_ {
        (0..self.inner().values.len()).map(move |index| EnumValueDescriptor {
            parent: self.clone(),
            index,
        })
    }

    fn inner(&self) -> &EnumDescriptorInner {
        &self.pool.inner.enums[self.index]
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl EnumValueDescriptor {
    /// Gets the enum type this value belongs to.
    pub fn parent_enum(&self) -> &EnumDescriptor {
        &self.parent
    }

    /// Gets the short name of the enum value, e.g. `MY_VALUE`.
    pub fn name(&self) -> &str {
        &self.inner().name
    }

    /// Gets the full name of the enum value, e.g. `my.package.MyEnum.MY_VALUE`.
    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Gets the number of this value.
    pub fn number(&self) -> i32 {
        self.inner().number
    }

    fn inner(&self) -> &EnumValueDescriptorInner {
        &self.parent.inner().values[self.index]
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValueDescriptor")
            .field("full_name", &self.full_name())
            .field("number", &self.number())
            .finish()
    }
}

impl Kind {
    /// Gets the message type, if this is a message or group kind.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) => Some(desc),
            _ => None,
        }
    }

    /// Gets the enum type, if this is an enum kind.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }

    /// Gets the wire type used to encode a single non-group value of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Double | Kind::Fixed64 | Kind::Sfixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::Sfixed32 => WireType::ThirtyTwoBit,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
            Kind::Int32
            | Kind::Int64
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Bool
            | Kind::Enum(_) => WireType::Varint,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Message(desc) => f.debug_tuple("Message").field(&desc.full_name()).finish(),
            Kind::Enum(desc) => f.debug_tuple("Enum").field(&desc.full_name()).finish(),
            scalar => write!(f, "{}", scalar),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Double => write!(f, "double"),
            Kind::Float => write!(f, "float"),
            Kind::Int32 => write!(f, "int32"),
            Kind::Int64 => write!(f, "int64"),
            Kind::Uint32 => write!(f, "uint32"),
            Kind::Uint64 => write!(f, "uint64"),
            Kind::Sint32 => write!(f, "sint32"),
            Kind::Sint64 => write!(f, "sint64"),
            Kind::Fixed32 => write!(f, "fixed32"),
            Kind::Fixed64 => write!(f, "fixed64"),
            Kind::Sfixed32 => write!(f, "sfixed32"),
            Kind::Sfixed64 => write!(f, "sfixed64"),
            Kind::Bool => write!(f, "bool"),
            Kind::String => write!(f, "string"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::Message(desc) => write!(f, "{}", desc.full_name()),
            Kind::Enum(desc) => write!(f, "{}", desc.full_name()),
        }
    }
}

impl KindIndex {
    fn is_packable(&self) -> bool {
        !matches!(
            self,
            KindIndex::String | KindIndex::Bytes | KindIndex::Message(_)
        )
    }
}

fn make_full_name(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_start_matches('.');
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn parse_name(full_name: &str) -> &str {
    match full_name.rsplit_once('.') {
        Some((_, name)) => name,
        None => full_name,
    }
}
