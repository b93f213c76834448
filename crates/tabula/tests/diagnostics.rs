// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Build-time and conversion-time diagnostics: unsupported types with their
// breadcrumb trail, recursive records, reserved field names, constructor
// resolution failures and null violations.

use tabula::path::Breadcrumb;
use tabula::types::{register_class, ClassBuilder, Introspect, Param, PrimitiveKind, TypeDescriptor};
use tabula::{
    build_deserializer, build_serializer, schema_for, Error, Record, Row, RowEncoder,
    TypedEncoder, Value,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Class with no usable constructor layout: never structurally decomposable.
fn socket() -> tabula::TypeRef {
    ClassBuilder::new("diagnostics::Socket")
        .primitive_field("fd", PrimitiveKind::I32)
        .without_default_constructor()
        .build_ref()
}

#[test]
fn test_unsupported_type_reports_full_path() {
    init_logging();
    let pool = ClassBuilder::new("diagnostics::Pool")
        .seq_field("sockets", socket())
        .build_ref();
    let server = ClassBuilder::new("diagnostics::Server")
        .string_field("host")
        .field("pool", pool)
        .build_ref();

    match schema_for(&server) {
        Err(Error::UnsupportedType { type_name, path }) => {
            assert_eq!(type_name, "diagnostics::Socket");
            assert_eq!(
                path.breadcrumbs(),
                &[
                    Breadcrumb::Root {
                        class: "diagnostics::Server".into()
                    },
                    Breadcrumb::Field {
                        class: "diagnostics::Pool".into(),
                        name: "pool".into()
                    },
                    Breadcrumb::Field {
                        class: "Vec<diagnostics::Socket>".into(),
                        name: "sockets".into()
                    },
                    Breadcrumb::ArrayElement {
                        class: "diagnostics::Socket".into()
                    },
                ]
            );
        }
        other => panic!("Expected UnsupportedType, got {other:?}"),
    }

    // serializer and deserializer report the same type
    for result in [build_serializer(&server), build_deserializer(&server)] {
        match result {
            Err(Error::UnsupportedType { type_name, path }) => {
                assert_eq!(type_name, "diagnostics::Socket");
                assert_eq!(path.len(), 4);
            }
            other => panic!("Expected UnsupportedType, got {other:?}"),
        }
    }
}

#[test]
fn test_unsupported_message_is_newest_first() {
    let holder = ClassBuilder::new("diagnostics::Holder")
        .field("any", TypeDescriptor::any())
        .build_ref();
    let err = schema_for(&holder).expect_err("Any is unsupported");
    let msg = err.to_string();
    let field_at = msg.find("name: \"any\"").expect("field crumb");
    let root_at = msg.find("root class").expect("root crumb");
    assert!(field_at < root_at);
}

#[test]
fn test_self_referencing_class_is_rejected() {
    init_logging();
    let node = ClassBuilder::new("diagnostics::Node")
        .primitive_field("value", PrimitiveKind::I32)
        .field("next", TypeDescriptor::class_ref("diagnostics::Node"))
        .build_ref();
    register_class(node.clone());

    let expected = Error::CircularReference {
        type_name: "diagnostics::Node".into(),
    };
    assert_eq!(schema_for(&node).map(|_| ()), Err(expected.clone()));
    assert_eq!(build_serializer(&node).map(|_| ()), Err(expected.clone()));
    assert_eq!(build_deserializer(&node).map(|_| ()), Err(expected));
}

#[derive(Debug, Record)]
struct Chain {
    label: String,
    next: Option<Box<Chain>>,
}

#[test]
fn test_recursive_record_through_option_is_rejected() {
    let ty = Chain::type_descriptor();
    match schema_for(&ty) {
        Err(Error::CircularReference { type_name }) => assert!(type_name.ends_with("::Chain")),
        other => panic!("Expected CircularReference, got {other:?}"),
    }
    assert!(TypedEncoder::<Chain>::new().is_err());
}

#[test]
fn test_repeated_sibling_types_are_not_cycles() {
    let point = ClassBuilder::new("diagnostics::Point")
        .primitive_field("x", PrimitiveKind::F64)
        .primitive_field("y", PrimitiveKind::F64)
        .build_ref();
    let segment = ClassBuilder::new("diagnostics::Segment")
        .field("from", point.clone())
        .field("to", point)
        .build_ref();
    assert!(schema_for(&segment).is_ok());
    assert!(build_serializer(&segment).is_ok());
}

#[derive(Debug, Record)]
struct Token {
    r#type: String,
    text: String,
}

#[test]
fn test_reserved_field_name_is_rejected() {
    match TypedEncoder::<Token>::new() {
        Err(Error::ReservedFieldName { name, path }) => {
            assert_eq!(name, "type");
            assert!(path.to_string().contains("name: \"type\""));
        }
        other => panic!("Expected ReservedFieldName, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_declared_layout_without_constructor() {
    let ty = ClassBuilder::new("diagnostics::Handle")
        .primitive_field("id", PrimitiveKind::I64)
        .declared_layout(vec![Param::new(
            "id",
            TypeDescriptor::primitive(PrimitiveKind::I64),
        )])
        .without_default_constructor()
        .build_ref();

    // the layout is enough to write, not to read back
    assert!(build_serializer(&ty).is_ok());
    match build_deserializer(&ty) {
        Err(Error::NoMatchingConstructor {
            type_name,
            argument_shapes,
        }) => {
            assert_eq!(type_name, "diagnostics::Handle");
            assert_eq!(argument_shapes, vec!["i64".to_string()]);
        }
        other => panic!("Expected NoMatchingConstructor, got {other:?}"),
    }
}

#[derive(Debug, PartialEq, Record)]
struct Order {
    id: i32,
    customer: Customer,
}

#[derive(Debug, PartialEq, Record)]
struct Customer {
    age: i32,
}

#[test]
fn test_null_in_non_nullable_column_names_the_field() {
    let encoder = TypedEncoder::<Order>::new().expect("encoder");
    let row = Row::new(vec![Value::I32(1), Value::Row(Row::single(Value::Null))]);
    match encoder.decode(&row) {
        Err(Error::NullValue { path }) => {
            let lines: Vec<&str> = path.lines().collect();
            assert_eq!(lines.len(), 3);
            assert!(lines[0].contains("name: \"age\""));
            assert!(lines[1].contains("name: \"customer\""));
            assert!(lines[2].contains("root class"));
        }
        other => panic!("Expected NullValue, got {other:?}"),
    }
}

#[test]
fn test_wrong_physical_type_is_a_mismatch() {
    let encoder = RowEncoder::for_type(&i32::type_descriptor()).expect("encoder");
    assert!(matches!(
        encoder.from_row(&Row::single(Value::from("seven"))),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_null_map_key_is_rejected() {
    let ty = <std::collections::HashMap<Option<String>, i32>>::type_descriptor();
    let serializer = build_serializer(&ty).expect("serializer");
    let native = Value::Map(vec![(Value::none(), Value::I32(1))]);
    assert_eq!(
        serializer.eval(&Row::single(native)),
        Err(Error::NullMapKey)
    );
}

#[test]
fn test_nested_option_is_unsupported() {
    match TypedEncoder::<Option<Option<i32>>>::new() {
        Err(Error::UnsupportedType { type_name, path }) => {
            assert_eq!(type_name, "Option<Option<i32>>");
            assert_eq!(path.len(), 1);
        }
        other => panic!("Expected UnsupportedType, got {:?}", other.map(|_| ())),
    }

    let reading = ClassBuilder::new("diagnostics::Reading")
        .field(
            "value",
            TypeDescriptor::option(TypeDescriptor::option(i64::type_descriptor())),
        )
        .build_ref();
    match RowEncoder::for_type(&reading) {
        Err(Error::UnsupportedType { type_name, path }) => {
            assert_eq!(type_name, "Option<Option<i64>>");
            assert!(path.to_string().contains("name: \"value\""));
        }
        other => panic!("Expected UnsupportedType, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_duplicate_field_names_are_rejected() {
    let ledger = ClassBuilder::new("diagnostics::Ledger")
        .primitive_field("total", PrimitiveKind::I64)
        .string_field("total")
        .build_ref();
    match RowEncoder::for_type(&ledger) {
        Err(Error::DuplicateFieldName { name, path }) => {
            assert_eq!(name, "total");
            assert!(path.to_string().contains("diagnostics::Ledger"));
        }
        other => panic!("Expected DuplicateFieldName, got {:?}", other.map(|_| ())),
    }
    for result in [build_serializer(&ledger), build_deserializer(&ledger)] {
        assert!(matches!(result, Err(Error::DuplicateFieldName { .. })));
    }
}

#[test]
fn test_null_value_in_primitive_map_is_rejected() {
    let ty = <std::collections::BTreeMap<String, i32>>::type_descriptor();
    let serializer = build_serializer(&ty).expect("serializer");
    let native = Value::Map(vec![(Value::from("k"), Value::Null)]);
    assert!(matches!(
        serializer.eval(&Row::single(native)),
        Err(Error::NullValue { .. })
    ));
}

#[test]
fn test_build_errors_are_classified() {
    let err = schema_for(&socket()).expect_err("unsupported");
    assert!(err.is_build_error());
    assert!(!Error::NullMapKey.is_build_error());
    let dup = Error::DuplicateFieldName {
        name: "a".into(),
        path: tabula::path::TypePath::root("diagnostics::Dup"),
    };
    assert!(dup.is_build_error());
}
