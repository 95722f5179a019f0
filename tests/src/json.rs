use std::{collections::HashMap, fmt::Debug};

use proptest::{prelude::*, test_runner::TestCaseError};
use prost::Message;
use prost_dynamic::{
    DecodeOptions, DynamicMessage, EncodeOptions, Error, ErrorKind, ExtensionRegistry, Value,
};
use serde_json::json;

use crate::{
    complex_type, message_desc, to_dynamic, Color, ComplexType, Point, ScalarArrays, Scalars,
    TEST_POOL,
};

#[test]
fn serialize_scalars() {
    let value = to_json(
        &Scalars {
            double: 1.1,
            float: 2.2,
            int32: 3,
            int64: 4,
            uint32: 5,
            uint64: 6,
            sint32: 7,
            sint64: 8,
            fixed32: 9,
            fixed64: 10,
            sfixed32: 11,
            sfixed64: 12,
            r#bool: true,
            string: "5".to_owned(),
            bytes: b"i\xa6\xbem\xb6\xffX".to_vec(),
        },
        "test.Scalars",
    );

    assert_eq!(
        value,
        json!({
            "double": 1.1,
            "float": 2.2f32,
            "int32": 3,
            "int64": "4",
            "uint32": 5,
            "uint64": "6",
            "sint32": 7,
            "sint64": "8",
            "fixed32": 9,
            "fixed64": "10",
            "sfixed32": 11,
            "sfixed64": "12",
            "bool": true,
            "string": "5",
            "bytes": "aaa+bbb/WA==",
        })
    );
}

#[test]
fn serialize_scalars_float_extrema() {
    let inf = to_json(
        &Scalars {
            float: f32::INFINITY,
            double: f64::INFINITY,
            ..Default::default()
        },
        "test.Scalars",
    );
    let neg_inf = to_json(
        &Scalars {
            float: f32::NEG_INFINITY,
            double: f64::NEG_INFINITY,
            ..Default::default()
        },
        "test.Scalars",
    );
    let nan = to_json(
        &Scalars {
            float: f32::NAN,
            double: f64::NAN,
            ..Default::default()
        },
        "test.Scalars",
    );

    assert_eq!(inf, json!({ "double": "Infinity", "float": "Infinity" }));
    assert_eq!(neg_inf, json!({ "double": "-Infinity", "float": "-Infinity" }));
    assert_eq!(nan, json!({ "double": "NaN", "float": "NaN" }));
}

#[test]
fn serialize_scalars_integer_extrema() {
    let min = to_json(
        &Scalars {
            int32: i32::MIN,
            int64: i64::MIN,
            sint64: i64::MIN,
            ..Default::default()
        },
        "test.Scalars",
    );
    let max = to_json(
        &Scalars {
            uint32: u32::MAX,
            uint64: u64::MAX,
            fixed64: u64::MAX,
            ..Default::default()
        },
        "test.Scalars",
    );

    assert_eq!(
        min,
        json!({
            "int32": i32::MIN,
            "int64": "-9223372036854775808",
            "sint64": "-9223372036854775808",
        })
    );
    assert_eq!(
        max,
        json!({
            "uint32": u32::MAX,
            "uint64": "18446744073709551615",
            "fixed64": "18446744073709551615",
        })
    );
}

#[test]
fn serialize_default_scalars_are_omitted() {
    assert_eq!(to_json(&Scalars::default(), "test.Scalars"), json!({}));
}

#[test]
fn serialize_scalar_arrays() {
    let value = to_json(
        &ScalarArrays {
            double: vec![1.1, 2.2],
            int64: vec![-1, 2],
            r#bool: vec![true, false],
            bytes: vec![b"a".to_vec(), vec![]],
            ..Default::default()
        },
        "test.ScalarArrays",
    );

    assert_eq!(
        value,
        json!({
            "double": [1.1, 2.2],
            "int64": ["-1", "2"],
            "bool": [true, false],
            "bytes": ["YQ==", ""],
        })
    );
}

#[test]
fn serialize_complex_type() {
    let value = to_json(
        &ComplexType {
            string_map: HashMap::from([(
                "k".to_owned(),
                Scalars {
                    int32: 1,
                    ..Default::default()
                },
            )]),
            int_map: HashMap::from([(
                -3,
                Point {
                    x: 1,
                    y: 0,
                    display_name: "p".to_owned(),
                },
            )]),
            nested: Some(Scalars::default()),
            points: vec![Point::default()],
            color: Color::Red as i32,
            colors: vec![Color::Blue as i32, 42],
            enum_map: HashMap::from([(7, Color::Green as i32)]),
            explicit: Some(0),
            choice: Some(complex_type::Choice::Number(5)),
        },
        "test.ComplexType",
    );

    assert_eq!(
        value,
        json!({
            "stringMap": { "k": { "int32": 1 } },
            "intMap": { "-3": { "x": 1, "displayName": "p" } },
            "nested": {},
            "points": [{}],
            "color": "RED",
            "colors": ["BLUE", 42],
            "enumMap": { "7": "GREEN" },
            "number": "5",
            "explicit": 0,
        })
    );
}

#[test]
fn serialize_undeclared_enum_number() {
    let value = to_json(
        &ComplexType {
            color: 42,
            ..Default::default()
        },
        "test.ComplexType",
    );
    assert_eq!(value, json!({ "color": 42 }));
}

#[test]
fn serialize_options() {
    let message = ComplexType {
        int_map: HashMap::from([(
            1,
            Point {
                x: 1,
                y: 2,
                display_name: "p".to_owned(),
            },
        )]),
        color: Color::Blue as i32,
        choice: Some(complex_type::Choice::Number(-5)),
        ..Default::default()
    };
    let options = EncodeOptions::new()
        .stringify_64_bit_integers(false)
        .use_enum_numbers(true)
        .use_proto_field_name(true);

    assert_eq!(
        to_json_with_options(&message, "test.ComplexType", &options),
        json!({
            "int_map": { "1": { "x": 1, "y": 2, "display_name": "p" } },
            "color": 3,
            "number": -5,
        })
    );
}

#[test]
fn serialize_emit_unpopulated_fields() {
    let options = EncodeOptions::new().emit_unpopulated_fields(true);

    assert_eq!(
        to_json_with_options(&Scalars::default(), "test.Scalars", &options),
        json!({
            "double": 0.0,
            "float": 0.0,
            "int32": 0,
            "int64": "0",
            "uint32": 0,
            "uint64": "0",
            "sint32": 0,
            "sint64": "0",
            "fixed32": 0,
            "fixed64": "0",
            "sfixed32": 0,
            "sfixed64": "0",
            "bool": false,
            "string": "",
            "bytes": "",
        })
    );
    assert_eq!(
        to_json_with_options(&ComplexType::default(), "test.ComplexType", &options),
        json!({
            "stringMap": {},
            "intMap": {},
            "points": [],
            "color": "COLOR_UNSPECIFIED",
            "colors": [],
            "enumMap": {},
        })
    );
}

#[test]
fn serialize_sorted_map_keys_pretty() {
    let dynamic = to_dynamic(
        &ComplexType {
            enum_map: HashMap::from([
                (10, Color::Red as i32),
                (1, Color::Green as i32),
                (2, Color::Blue as i32),
            ]),
            ..Default::default()
        },
        "test.ComplexType",
    );

    let json = dynamic
        .to_json_with_options(&EncodeOptions::new().sort_map_keys(true).pretty(true))
        .unwrap();
    similar_asserts::assert_eq!(
        json,
        r#"{
  "enumMap": {
    "1": "GREEN",
    "2": "BLUE",
    "10": "RED"
  }
}"#
    );
}

#[test]
fn serialize_compact_string() {
    let dynamic = to_dynamic(
        &Point {
            x: 1,
            y: -2,
            display_name: "a\"b".to_owned(),
        },
        "test.Point",
    );
    assert_eq!(
        dynamic.to_json().unwrap(),
        r#"{"x":1,"y":-2,"displayName":"a\"b"}"#
    );
}

#[test]
fn deserialize_scalars() {
    let value: Scalars = from_json_to(
        r#"{
            "double": 1.1,
            "float": 2.2,
            "int32": 3,
            "int64": "4",
            "uint32": "5",
            "uint64": 6,
            "sint32": 7,
            "sint64": "-8",
            "fixed32": 9.0,
            "fixed64": "1e1",
            "sfixed32": 1.1e1,
            "sfixed64": "-12",
            "bool": true,
            "string": "5é\n",
            "bytes": "aaa+bbb/WA=="
        }"#,
        "test.Scalars",
    );

    assert_eq!(
        value,
        Scalars {
            double: 1.1,
            float: 2.2,
            int32: 3,
            int64: 4,
            uint32: 5,
            uint64: 6,
            sint32: 7,
            sint64: -8,
            fixed32: 9,
            fixed64: 10,
            sfixed32: 11,
            sfixed64: -12,
            r#bool: true,
            string: "5\u{e9}\n".to_owned(),
            bytes: b"i\xa6\xbem\xb6\xffX".to_vec(),
        }
    );
}

#[test]
fn deserialize_field_names() {
    let json_name: Point = from_json_to(r#"{"displayName": "a"}"#, "test.Point");
    let proto_name: Point = from_json_to(r#"{"display_name": "b"}"#, "test.Point");
    assert_eq!(json_name.display_name, "a");
    assert_eq!(proto_name.display_name, "b");
}

#[test]
fn deserialize_64_bit_extrema() {
    let value: Scalars = from_json_to(
        r#"{
            "int64": "-9223372036854775808",
            "uint64": "18446744073709551615",
            "sfixed64": 9223372036854775807
        }"#,
        "test.Scalars",
    );
    assert_eq!(value.int64, i64::MIN);
    assert_eq!(value.uint64, u64::MAX);
    assert_eq!(value.sfixed64, i64::MAX);
}

#[test]
fn deserialize_fractional_integer() {
    let err = from_json(r#"{"int32": 1.5}"#, "test.Scalars").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedJson { .. }));

    let err = from_json(r#"{"uint64": "1.5"}"#, "test.Scalars").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedJson { .. }));
}

#[test]
fn deserialize_integer_overflow() {
    let ok: Scalars = from_json_to(r#"{"int32": 2147483647}"#, "test.Scalars");
    assert_eq!(ok.int32, i32::MAX);

    for json in [
        r#"{"int32": 2147483648}"#,
        r#"{"uint32": -1}"#,
        r#"{"uint64": "18446744073709551616"}"#,
        r#"{"sint64": 1e30}"#,
    ] {
        let err = from_json(json, "test.Scalars").unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::NumericOverflow { .. }),
            "{}: {:?}",
            json,
            err
        );
    }
}

#[test]
fn deserialize_wrong_type() {
    for json in [
        r#"{"int32": true}"#,
        r#"{"bool": "true"}"#,
        r#"{"string": 5}"#,
        r#"{"bytes": "not base64!"}"#,
        r#"{"double": "one"}"#,
        r#"{"int32": "+5"}"#,
        r#"{"uint64": "+5"}"#,
    ] {
        let err = from_json(json, "test.Scalars").unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::MalformedJson { .. }),
            "{}: {:?}",
            json,
            err
        );
    }
}

#[test]
fn deserialize_non_finite_floats() {
    let dynamic = from_json(
        r#"{"double": "NaN", "float": "-Infinity"}"#,
        "test.Scalars",
    )
    .unwrap();
    assert!(dynamic
        .get_field_by_name("double")
        .unwrap()
        .as_f64()
        .unwrap()
        .is_nan());
    assert_eq!(
        dynamic.get_field_by_name("float").unwrap().as_ref(),
        &Value::F32(f32::NEG_INFINITY)
    );

    let value: Scalars = from_json_to(r#"{"double": "Infinity", "float": "1.5"}"#, "test.Scalars");
    assert_eq!(value.double, f64::INFINITY);
    assert_eq!(value.float, 1.5);
}

#[test]
fn deserialize_bytes_alphabets() {
    let standard: Scalars = from_json_to(r#"{"bytes": "aaa+bbb/WA=="}"#, "test.Scalars");
    let url_safe: Scalars = from_json_to(r#"{"bytes": "aaa-bbb_WA"}"#, "test.Scalars");
    assert_eq!(standard.bytes, b"i\xa6\xbem\xb6\xffX");
    assert_eq!(url_safe.bytes, b"i\xa6\xbem\xb6\xffX");
}

#[test]
fn deserialize_enums() {
    let value: ComplexType = from_json_to(
        r#"{"color": "BLUE", "colors": ["RED", 2, "3", 42]}"#,
        "test.ComplexType",
    );
    assert_eq!(value.color, Color::Blue as i32);
    assert_eq!(value.colors, vec![1, 2, 3, 42]);

    let err = from_json(r#"{"color": "PURPLE"}"#, "test.ComplexType").unwrap_err();
    match err.kind() {
        ErrorKind::UnresolvedEnumValue { name, enum_name } => {
            assert_eq!(name, "PURPLE");
            assert_eq!(enum_name, "test.Color");
        }
        kind => panic!("unexpected error {:?}", kind),
    }

    for json in [r#"{"color": "2147483648"}"#, r#"{"colors": ["-2147483649"]}"#] {
        let err = from_json(json, "test.ComplexType").unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::NumericOverflow { .. }),
            "{}: {:?}",
            json,
            err
        );
    }

    let err = from_json(r#"{"color": "+1"}"#, "test.ComplexType").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnresolvedEnumValue { .. }));
}

#[test]
fn deserialize_null_clears_field() {
    let mut dynamic = to_dynamic(
        &ComplexType {
            color: Color::Red as i32,
            nested: Some(Scalars::default()),
            points: vec![Point::default()],
            choice: Some(complex_type::Choice::Text("t".to_owned())),
            ..Default::default()
        },
        "test.ComplexType",
    );

    dynamic
        .merge_json(r#"{"color": null, "nested": null, "points": null, "text": null}"#)
        .unwrap();
    assert_eq!(dynamic.transcode_to::<ComplexType>().unwrap(), ComplexType::default());
}

#[test]
fn deserialize_replaces_fields() {
    let mut dynamic = to_dynamic(
        &ComplexType {
            nested: Some(Scalars {
                int32: 1,
                string: "a".to_owned(),
                ..Default::default()
            }),
            points: vec![Point::default()],
            ..Default::default()
        },
        "test.ComplexType",
    );

    dynamic
        .merge_json(r#"{"nested": {"int32": 2}, "points": [{"x": 1}]}"#)
        .unwrap();
    let value: ComplexType = dynamic.transcode_to().unwrap();
    assert_eq!(
        value.nested,
        Some(Scalars {
            int32: 2,
            ..Default::default()
        })
    );
    assert_eq!(
        value.points,
        vec![Point {
            x: 1,
            ..Default::default()
        }]
    );
}

#[test]
fn deserialize_top_level_null() {
    let dynamic = from_json("null", "test.Point").unwrap();
    assert_eq!(dynamic, DynamicMessage::new(message_desc("test.Point")));

    let mut dynamic = to_dynamic(
        &Point {
            x: 1,
            ..Default::default()
        },
        "test.Point",
    );
    dynamic.merge_json(" null ").unwrap();
    assert!(dynamic.has_field_by_name("x"));
    dynamic.parse_json("null").unwrap();
    assert!(!dynamic.has_field_by_name("x"));
}

#[test]
fn deserialize_trailing_data() {
    let err = from_json(r#"{"x": 1} garbage"#, "test.Point").unwrap_err();
    match err.kind() {
        ErrorKind::TrailingData { remainder, span } => {
            assert_eq!(remainder, "garbage");
            assert_eq!(*span, 9..16);
        }
        kind => panic!("unexpected error {:?}", kind),
    }

    let err = from_json(r#"{"x": 1}{"x": 2}"#, "test.Point").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::TrailingData { .. }));

    from_json("{\"x\": 1}\n\t ", "test.Point").unwrap();
}

#[test]
fn deserialize_malformed_json() {
    for json in [
        "",
        "[]",
        "5",
        r#"{"x": 1,}"#,
        r#"{"x" 1}"#,
        r#"{"x": 1"#,
        r#"{"x": tru}"#,
        r#"{x: 1}"#,
        r#"{"displayName": "\q"}"#,
    ] {
        let err = from_json(json, "test.Point").unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::MalformedJson { .. }),
            "{:?}: {:?}",
            json,
            err
        );
    }
}

#[test]
fn deserialize_error_keeps_earlier_fields() {
    let mut dynamic = DynamicMessage::new(message_desc("test.Point"));
    dynamic.merge_json(r#"{"x": 1, "y": true}"#).unwrap_err();
    assert_eq!(
        dynamic.get_field_by_name("x").unwrap().as_ref(),
        &Value::I32(1)
    );
}

#[test]
fn deserialize_cardinality_leniency() {
    let value: Point = from_json_to(r#"{"x": [1, 2], "displayName": ["a"]}"#, "test.Point");
    assert_eq!(
        value,
        Point {
            x: 2,
            y: 0,
            display_name: "a".to_owned(),
        }
    );

    let value: Point = from_json_to(r#"{"x": [1, null]}"#, "test.Point");
    assert_eq!(value, Point::default());

    let value: ComplexType = from_json_to(
        r#"{"colors": "RED", "points": {"x": 1}}"#,
        "test.ComplexType",
    );
    assert_eq!(value.colors, vec![Color::Red as i32]);
    assert_eq!(
        value.points,
        vec![Point {
            x: 1,
            ..Default::default()
        }]
    );
}

#[test]
fn deserialize_maps() {
    let value: ComplexType = from_json_to(
        r#"{
            "intMap": {"-1": {"x": 1}, "2": {}},
            "enumMap": {"18446744073709551615": "RED", "3": 2}
        }"#,
        "test.ComplexType",
    );
    assert_eq!(
        value.int_map,
        HashMap::from([
            (
                -1,
                Point {
                    x: 1,
                    ..Default::default()
                }
            ),
            (2, Point::default()),
        ])
    );
    assert_eq!(
        value.enum_map,
        HashMap::from([(u64::MAX, Color::Red as i32), (3, Color::Green as i32)])
    );

    let err = from_json(r#"{"intMap": {"a": {}}}"#, "test.ComplexType").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedJson { .. }));
}

#[test]
fn deserialize_map_entry_array() {
    let value: ComplexType = from_json_to(
        r#"{
            "intMap": [{"key": 1, "value": {"y": 2}}, {"key": "-4"}],
            "stringMap": [{"value": {"bool": true}}]
        }"#,
        "test.ComplexType",
    );
    assert_eq!(
        value.int_map,
        HashMap::from([
            (
                1,
                Point {
                    y: 2,
                    ..Default::default()
                }
            ),
            (-4, Point::default()),
        ])
    );
    assert_eq!(
        value.string_map,
        HashMap::from([(
            String::new(),
            Scalars {
                r#bool: true,
                ..Default::default()
            }
        )])
    );
}

#[test]
fn deserialize_null_array_elements() {
    let value: ScalarArrays = from_json_to(
        r#"{"int32": [1, null, 2], "string": [null], "bytes": [null, "AQ=="]}"#,
        "test.ScalarArrays",
    );
    assert_eq!(
        value,
        ScalarArrays {
            int32: vec![1, 2],
            bytes: vec![vec![1]],
            ..Default::default()
        }
    );

    let value: ComplexType = from_json_to(
        r#"{"points": [null, {"x": 1}], "intMap": [null, {"key": 3}, null]}"#,
        "test.ComplexType",
    );
    assert_eq!(
        value.points,
        vec![Point {
            x: 1,
            ..Default::default()
        }]
    );
    assert_eq!(value.int_map, HashMap::from([(3, Point::default())]));
}

#[test]
fn deserialize_null_map_value() {
    for json in [
        r#"{"intMap": {"1": null}}"#,
        r#"{"enumMap": {"1": null}}"#,
    ] {
        let err = from_json(json, "test.ComplexType").unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::MalformedJson { .. }),
            "{}: {:?}",
            json,
            err
        );
    }
}

#[test]
fn deserialize_oneof() {
    let value: ComplexType = from_json_to(r#"{"point": {"x": 1}}"#, "test.ComplexType");
    assert_eq!(
        value.choice,
        Some(complex_type::Choice::Point(Point {
            x: 1,
            ..Default::default()
        }))
    );

    let value: ComplexType =
        from_json_to(r#"{"text": "a", "number": "7"}"#, "test.ComplexType");
    assert_eq!(value.choice, Some(complex_type::Choice::Number(7)));

    let value: ComplexType = from_json_to(r#"{"explicit": 0}"#, "test.ComplexType");
    assert_eq!(value.explicit, Some(0));
}

#[test]
fn deserialize_unknown_fields() {
    let json = r#"{"x": 1, "unknown": {"a": [1, {"b": null}], "c": "d"}, "y": 2}"#;

    let value: Point = from_json_to(json, "test.Point");
    assert_eq!(
        value,
        Point {
            x: 1,
            y: 2,
            display_name: String::new(),
        }
    );

    let mut dynamic = DynamicMessage::new(message_desc("test.Point"));
    let err = dynamic
        .merge_json_with_options(json, &DecodeOptions::new().deny_unknown_fields(true))
        .unwrap_err();
    match err.kind() {
        ErrorKind::MalformedJson { span, .. } => assert_eq!(*span, 9..18),
        kind => panic!("unexpected error {:?}", kind),
    }
}

#[test]
fn extensions() {
    let desc = message_desc("test2.Extendable");
    let registry = ExtensionRegistry::from_pool(&TEST_POOL);
    let json = r#"{
        "base": 1,
        "[test2.tag]": "t",
        "[test2.scores]": [1, 2],
        "[test2.defaults]": {"int": 3}
    }"#;

    let mut dynamic = DynamicMessage::new_with_registry(desc.clone(), registry);
    dynamic.parse_json(json).unwrap();

    let tag = TEST_POOL.get_extension_by_name("test2.tag").unwrap();
    assert_eq!(
        dynamic.get_extension(&tag).unwrap().as_ref(),
        &Value::String("t".to_owned())
    );
    assert_eq!(
        dynamic
            .serialize_with_options(serde_json::value::Serializer, &EncodeOptions::new())
            .unwrap(),
        json!({
            "base": 1,
            "[test2.tag]": "t",
            "[test2.scores]": [1, 2],
            "[test2.defaults]": { "int": 3 },
        })
    );

    // without a registry, extension keys are unknown fields
    let dynamic = DynamicMessage::from_json(desc.clone(), json).unwrap();
    assert_eq!(dynamic.extensions().count(), 0);
    assert_eq!(
        dynamic.get_field_by_name("base").unwrap().as_ref(),
        &Value::I32(1)
    );

    let err = DynamicMessage::new(desc)
        .merge_json_with_options(json, &DecodeOptions::new().deny_unknown_fields(true))
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MalformedJson { .. }));
}

#[test]
fn required_fields() {
    let desc = message_desc("test2.Required");

    let err = DynamicMessage::from_json(desc.clone(), "{}").unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::MissingRequiredField {
            path: "id".to_owned()
        }
    );

    let err = DynamicMessage::from_json(desc.clone(), r#"{"id": 1, "child": {}}"#).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::MissingRequiredField {
            path: "child.id".to_owned()
        }
    );

    let mut dynamic = DynamicMessage::new(desc.clone());
    dynamic.merge_json(r#"{"child": {}}"#).unwrap();
    assert!(dynamic.validate().is_err());

    DynamicMessage::from_json(desc, r#"{"id": 1, "child": {"id": 2}}"#).unwrap();
}

#[test]
fn proto2_groups_use_field_name() {
    let dynamic = DynamicMessage::from_json(
        message_desc("test2.ContainsGroup"),
        r#"{"inner": {"value": 1}, "packed": ["-5", 6]}"#,
    )
    .unwrap();
    assert_eq!(
        dynamic
            .serialize_with_options(serde_json::value::Serializer, &EncodeOptions::new())
            .unwrap(),
        json!({ "inner": { "value": 1 }, "packed": ["-5", "6"] })
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    #[test]
    fn roundtrip_arb_scalars(message: Scalars) {
        roundtrip_json(&message, "test.Scalars")?;
    }

    #[test]
    fn roundtrip_arb_scalar_arrays(message: ScalarArrays) {
        roundtrip_json(&message, "test.ScalarArrays")?;
    }

    #[test]
    fn roundtrip_arb_complex_type(message: ComplexType) {
        roundtrip_json(&message, "test.ComplexType")?;
    }

    #[test]
    fn roundtrip_arb_complex_type_with_options(message: ComplexType) {
        let options = EncodeOptions::new()
            .stringify_64_bit_integers(false)
            .use_enum_numbers(true)
            .use_proto_field_name(true)
            .emit_unpopulated_fields(true)
            .sort_map_keys(true)
            .pretty(true);
        roundtrip_json_with_options(&message, "test.ComplexType", &options)?;
    }
}

fn to_json<T>(message: &T, message_name: &str) -> serde_json::Value
where
    T: Message,
{
    to_json_with_options(message, message_name, &EncodeOptions::new())
}

fn to_json_with_options<T>(
    message: &T,
    message_name: &str,
    options: &EncodeOptions,
) -> serde_json::Value
where
    T: Message,
{
    to_dynamic(message, message_name)
        .serialize_with_options(serde_json::value::Serializer, options)
        .unwrap()
}

fn from_json(json: &str, message_name: &str) -> Result<DynamicMessage, Error> {
    DynamicMessage::from_json(message_desc(message_name), json)
}

fn from_json_to<T>(json: &str, message_name: &str) -> T
where
    T: Message + Default,
{
    from_json(json, message_name)
        .unwrap()
        .transcode_to()
        .unwrap()
}

fn roundtrip_json<T>(message: &T, message_name: &str) -> Result<(), TestCaseError>
where
    T: PartialEq + Debug + Message + Default,
{
    roundtrip_json_with_options(message, message_name, &EncodeOptions::new())
}

fn roundtrip_json_with_options<T>(
    message: &T,
    message_name: &str,
    options: &EncodeOptions,
) -> Result<(), TestCaseError>
where
    T: PartialEq + Debug + Message + Default,
{
    let json = to_dynamic(message, message_name)
        .to_json_with_options(options)
        .unwrap();
    let roundtripped: T = from_json_to(&json, message_name);
    prop_assert_eq!(message, &roundtripped, "json: {}", json);
    Ok(())
}
