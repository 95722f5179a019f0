//! The descriptors of the test schema, written out by hand so the tests do not need `protoc`.
//!
//! `test.proto` (proto3):
//!
//! ```proto
//! message Scalars { double double = 1; float float = 2; ... bytes bytes = 15; }
//! message ScalarArrays { repeated double double = 1; ... repeated bytes bytes = 15; }
//! message Point { int32 x = 1; int32 y = 2; string display_name = 3; }
//! enum Color { COLOR_UNSPECIFIED = 0; RED = 1; GREEN = 2; BLUE = 3; }
//! message ComplexType {
//!   map<string, Scalars> string_map = 1;
//!   map<int32, Point> int_map = 2;
//!   Scalars nested = 3;
//!   repeated Point points = 4;
//!   Color color = 5;
//!   repeated Color colors = 6;
//!   map<uint64, Color> enum_map = 7;
//!   oneof choice { string text = 8; int64 number = 9; Point point = 10; }
//!   optional int32 explicit = 11;
//! }
//! ```
//!
//! `test2.proto` (proto2):
//!
//! ```proto
//! message ContainsGroup {
//!   optional group Inner = 1 { optional int32 value = 2; optional string label = 3; }
//!   repeated int32 unpacked = 4;
//!   repeated sint64 packed = 5 [packed = true];
//! }
//! message Required {
//!   required int32 id = 1;
//!   optional Required child = 2;
//!   repeated Required items = 3;
//!   map<string, Required> named = 4;
//! }
//! enum Level { LOW = 1; HIGH = 2; }
//! message Defaults {
//!   optional int32 int = 1 [default = 7];
//!   optional string text = 2 [default = "hi"];
//!   optional Level level = 3 [default = HIGH];
//!   optional Level plain_level = 4;
//!   optional bytes data = 5 [default = "\001x"];
//! }
//! message Extendable { optional int32 base = 1; extensions 100 to 199; }
//! extend Extendable {
//!   optional string tag = 100;
//!   repeated int32 scores = 101;
//!   optional Defaults defaults = 102;
//! }
//! ```

use once_cell::sync::Lazy;
use prost_dynamic::DescriptorPool;
use prost_types::{
    descriptor_proto::ExtensionRange,
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldOptions, FileDescriptorProto, FileDescriptorSet, MessageOptions, OneofDescriptorProto,
};

pub static TEST_POOL: Lazy<DescriptorPool> =
    Lazy::new(|| DescriptorPool::new(file_descriptor_set()).unwrap());

pub fn file_descriptor_set() -> FileDescriptorSet {
    FileDescriptorSet {
        file: vec![test_file(), test2_file()],
    }
}

const SCALAR_FIELDS: [(&str, Type); 15] = [
    ("double", Type::Double),
    ("float", Type::Float),
    ("int32", Type::Int32),
    ("int64", Type::Int64),
    ("uint32", Type::Uint32),
    ("uint64", Type::Uint64),
    ("sint32", Type::Sint32),
    ("sint64", Type::Sint64),
    ("fixed32", Type::Fixed32),
    ("fixed64", Type::Fixed64),
    ("sfixed32", Type::Sfixed32),
    ("sfixed64", Type::Sfixed64),
    ("bool", Type::Bool),
    ("string", Type::String),
    ("bytes", Type::Bytes),
];

fn test_file() -> FileDescriptorProto {
    let scalars = message(
        "Scalars",
        SCALAR_FIELDS
            .iter()
            .zip(1..)
            .map(|(&(name, ty), number)| field(name, number, Label::Optional, ty, None))
            .collect(),
    );
    let scalar_arrays = message(
        "ScalarArrays",
        SCALAR_FIELDS
            .iter()
            .zip(1..)
            .map(|(&(name, ty), number)| field(name, number, Label::Repeated, ty, None))
            .collect(),
    );
    let point = message(
        "Point",
        vec![
            field("x", 1, Label::Optional, Type::Int32, None),
            field("y", 2, Label::Optional, Type::Int32, None),
            field("display_name", 3, Label::Optional, Type::String, None),
        ],
    );

    let mut complex_type = message(
        "ComplexType",
        vec![
            map_field("string_map", 1, ".test.ComplexType.StringMapEntry"),
            map_field("int_map", 2, ".test.ComplexType.IntMapEntry"),
            field("nested", 3, Label::Optional, Type::Message, Some(".test.Scalars")),
            field("points", 4, Label::Repeated, Type::Message, Some(".test.Point")),
            field("color", 5, Label::Optional, Type::Enum, Some(".test.Color")),
            field("colors", 6, Label::Repeated, Type::Enum, Some(".test.Color")),
            map_field("enum_map", 7, ".test.ComplexType.EnumMapEntry"),
            oneof_member(field("text", 8, Label::Optional, Type::String, None), 0),
            oneof_member(field("number", 9, Label::Optional, Type::Int64, None), 0),
            oneof_member(
                field("point", 10, Label::Optional, Type::Message, Some(".test.Point")),
                0,
            ),
            FieldDescriptorProto {
                proto3_optional: Some(true),
                ..oneof_member(field("explicit", 11, Label::Optional, Type::Int32, None), 1)
            },
        ],
    );
    complex_type.nested_type = vec![
        map_entry(
            "StringMapEntry",
            Type::String,
            Type::Message,
            Some(".test.Scalars"),
        ),
        map_entry("IntMapEntry", Type::Int32, Type::Message, Some(".test.Point")),
        map_entry("EnumMapEntry", Type::Uint64, Type::Enum, Some(".test.Color")),
    ];
    complex_type.oneof_decl = vec![oneof("choice"), oneof("_explicit")];

    FileDescriptorProto {
        name: Some("test.proto".to_owned()),
        package: Some("test".to_owned()),
        syntax: Some("proto3".to_owned()),
        message_type: vec![scalars, scalar_arrays, point, complex_type],
        enum_type: vec![enumeration(
            "Color",
            &[("COLOR_UNSPECIFIED", 0), ("RED", 1), ("GREEN", 2), ("BLUE", 3)],
        )],
        ..Default::default()
    }
}

fn test2_file() -> FileDescriptorProto {
    let mut contains_group = message(
        "ContainsGroup",
        vec![
            field(
                "inner",
                1,
                Label::Optional,
                Type::Group,
                Some(".test2.ContainsGroup.Inner"),
            ),
            field("unpacked", 4, Label::Repeated, Type::Int32, None),
            FieldDescriptorProto {
                options: Some(FieldOptions {
                    packed: Some(true),
                    ..Default::default()
                }),
                ..field("packed", 5, Label::Repeated, Type::Sint64, None)
            },
        ],
    );
    contains_group.nested_type = vec![message(
        "Inner",
        vec![
            field("value", 2, Label::Optional, Type::Int32, None),
            field("label", 3, Label::Optional, Type::String, None),
        ],
    )];

    let mut required = message(
        "Required",
        vec![
            field("id", 1, Label::Required, Type::Int32, None),
            field("child", 2, Label::Optional, Type::Message, Some(".test2.Required")),
            field("items", 3, Label::Repeated, Type::Message, Some(".test2.Required")),
            map_field("named", 4, ".test2.Required.NamedEntry"),
        ],
    );
    required.nested_type = vec![map_entry(
        "NamedEntry",
        Type::String,
        Type::Message,
        Some(".test2.Required"),
    )];

    let defaults = message(
        "Defaults",
        vec![
            with_default(field("int", 1, Label::Optional, Type::Int32, None), "7"),
            with_default(field("text", 2, Label::Optional, Type::String, None), "hi"),
            with_default(
                field("level", 3, Label::Optional, Type::Enum, Some(".test2.Level")),
                "HIGH",
            ),
            field("plain_level", 4, Label::Optional, Type::Enum, Some(".test2.Level")),
            with_default(field("data", 5, Label::Optional, Type::Bytes, None), "\\001x"),
        ],
    );

    let mut extendable = message(
        "Extendable",
        vec![field("base", 1, Label::Optional, Type::Int32, None)],
    );
    extendable.extension_range = vec![ExtensionRange {
        start: Some(100),
        end: Some(200),
        options: None,
    }];

    FileDescriptorProto {
        name: Some("test2.proto".to_owned()),
        package: Some("test2".to_owned()),
        syntax: Some("proto2".to_owned()),
        message_type: vec![contains_group, required, defaults, extendable],
        enum_type: vec![enumeration("Level", &[("LOW", 1), ("HIGH", 2)])],
        extension: vec![
            extension(field("tag", 100, Label::Optional, Type::String, None)),
            extension(field("scores", 101, Label::Repeated, Type::Int32, None)),
            extension(field(
                "defaults",
                102,
                Label::Optional,
                Type::Message,
                Some(".test2.Defaults"),
            )),
        ],
        ..Default::default()
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field,
        ..Default::default()
    }
}

fn field(
    name: &str,
    number: i32,
    label: Label,
    ty: Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(ToOwned::to_owned),
        ..Default::default()
    }
}

fn map_field(name: &str, number: i32, entry_name: &str) -> FieldDescriptorProto {
    field(name, number, Label::Repeated, Type::Message, Some(entry_name))
}

fn map_entry(
    name: &str,
    key_type: Type,
    value_type: Type,
    value_type_name: Option<&str>,
) -> DescriptorProto {
    DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message(
            name,
            vec![
                field("key", 1, Label::Optional, key_type, None),
                field("value", 2, Label::Optional, value_type, value_type_name),
            ],
        )
    }
}

fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.to_owned()),
        options: None,
    }
}

fn oneof_member(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(index),
        ..field
    }
}

fn with_default(field: FieldDescriptorProto, default_value: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        default_value: Some(default_value.to_owned()),
        ..field
    }
}

fn extension(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        extendee: Some(".test2.Extendable".to_owned()),
        ..field
    }
}

fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .map(|&(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_owned()),
                number: Some(number),
                options: None,
            })
            .collect(),
        ..Default::default()
    }
}
