//! This crate provides protobuf messages whose type is only known at runtime.
//!
//! A [`DescriptorPool`] is built from a [`FileDescriptorSet`](prost_types::FileDescriptorSet),
//! such as one produced by `protoc --descriptor_set_out`. Its [`MessageDescriptor`]s are then
//! used to create [`DynamicMessage`]s, which can be read and written field by field, encoded
//! to and decoded from the protobuf binary format through [`prost::Message`], and converted
//! to and from the [protobuf JSON mapping](https://protobuf.dev/programming-guides/proto3/#json).
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use prost::Message;
//! use prost_dynamic::{DescriptorPool, DynamicMessage, Value};
//! use prost_types::{
//!     field_descriptor_proto::{Label, Type},
//!     DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
//! };
//!
//! let file = FileDescriptorProto {
//!     name: Some("point.proto".to_owned()),
//!     package: Some("example".to_owned()),
//!     syntax: Some("proto3".to_owned()),
//!     message_type: vec![DescriptorProto {
//!         name: Some("Point".to_owned()),
//!         field: vec![FieldDescriptorProto {
//!             name: Some("x".to_owned()),
//!             number: Some(1),
//!             label: Some(Label::Optional as i32),
//!             r#type: Some(Type::Int32 as i32),
//!             json_name: Some("x".to_owned()),
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! };
//! let pool = DescriptorPool::new(FileDescriptorSet { file: vec![file] })?;
//! let desc = pool.get_message_by_name("example.Point").unwrap();
//!
//! let mut message = DynamicMessage::new(desc.clone());
//! message.try_set_field_by_name("x", Value::I64(5))?;
//! assert_eq!(message.encode_to_vec(), b"\x08\x05");
//! assert_eq!(message.to_json()?, r#"{"x":5}"#);
//!
//! let decoded = DynamicMessage::from_json(desc, r#"{"x": "5"}"#)?;
//! assert_eq!(decoded, message);
//! # Ok(())
//! # }
//! ```
#![warn(missing_debug_implementations, missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod descriptor;
mod dynamic;
mod error;

pub use prost;
pub use prost_types;

pub use self::{
    descriptor::{
        Cardinality, DescriptorError, DescriptorPool, EnumDescriptor, EnumValueDescriptor,
        ExtensionRegistry, FieldDescriptor, Kind, MessageDescriptor, OneofDescriptor, Symbol,
        Syntax,
    },
    dynamic::{DecodeOptions, DynamicMessage, EncodeOptions, MapKey, Value},
    error::{Error, ErrorKind},
};
