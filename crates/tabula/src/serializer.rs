// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer builder: native value to structured value.

use crate::config::{self, CodecConfig};
use crate::error::{Error, Result};
use crate::expr::{fresh_lambda_id, DeclaredType, Expr, Function, UdtOp};
use crate::path::{SeenTypes, TypePath};
use crate::schema::{check_unique_fields, OpaqueType};
use crate::shape::{classify, is_unboxed_primitive, CollectionKind, Shape};
use crate::types::{dealias, DecimalKind, Param, TypeRef};

/// Identifiers that cannot name a record field.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn",
];

/// Build the serializer of `ty` with the process-wide configuration.
///
/// The returned step reads the native value from column 0 of its input row.
pub fn build_serializer(ty: &TypeRef) -> Result<Expr> {
    build_serializer_with_config(ty, &config::current())
}

/// Build the serializer of `ty`.
pub fn build_serializer_with_config(ty: &TypeRef, config: &CodecConfig) -> Result<Expr> {
    let input = Expr::input(0, DeclaredType::Object(ty.clone()));
    let path = TypePath::root(dealias(ty).name());
    let expr = serializer_for(input, ty, &path, &SeenTypes::new(), config)?;
    log::debug!(
        "[serializer] built serializer for {} ({} nodes)",
        ty.name(),
        expr.node_count()
    );
    Ok(expr)
}

fn is_reserved(name: &str, config: &CodecConfig) -> bool {
    config.check_reserved_names
        && (RESERVED_KEYWORDS.contains(&name) || config.is_extra_reserved(name))
}

/// Serializer of the value produced by `input`, of type `ty`.
pub(crate) fn serializer_for(
    input: Expr,
    ty: &TypeRef,
    path: &TypePath,
    seen: &SeenTypes,
    config: &CodecConfig,
) -> Result<Expr> {
    if let Some(DeclaredType::Physical(_)) = input.declared_type() {
        return Ok(input);
    }
    let shape = classify(ty);
    log::trace!("[serializer] {} as {}", ty.name(), shape.label());
    match shape {
        Shape::Null => Ok(Expr::null()),
        Shape::Opaque(udt) => Ok(input.opaque(OpaqueType::new(udt), UdtOp::Serialize)),
        Shape::Option(inner) => {
            let inner_path = path.option_value(inner.name());
            serializer_for(input.unwrap_option(), &inner, &inner_path, seen, config)
        }
        Shape::Binary | Shape::Primitive(_) => Ok(input),
        Shape::Collection { kind, element } => {
            to_catalyst_array(input, kind, &element, path, seen, config)
        }
        Shape::Map { key, value, .. } => {
            let key_var = fresh_lambda_id();
            let value_var = fresh_lambda_id();
            let key_expr = serializer_for(
                Expr::lambda_var(key_var, DeclaredType::Object(key.clone())),
                &key,
                &path.map_key(key.name()),
                seen,
                config,
            )?;
            let value_expr = serializer_for(
                Expr::lambda_var(value_var, DeclaredType::Object(value.clone())),
                &value,
                &path.map_value(value.name()),
                seen,
                config,
            )?;
            Ok(Expr::ExternalMapToCatalyst {
                map: Box::new(input),
                key_var,
                key: Box::new(key_expr),
                key_nullable: !is_unboxed_primitive(&key),
                value_var,
                value: Box::new(value_expr),
                value_nullable: !is_unboxed_primitive(&value),
            })
        }
        Shape::String => Ok(input.invoke(Function::StringToUtf8)),
        Shape::Date => Ok(input.invoke(Function::DateToDays)),
        Shape::Timestamp => Ok(input.invoke(Function::TimestampToMicros)),
        Shape::Decimal(DecimalKind::BigDecimal) => Ok(input.invoke(Function::DecimalFromBig {
            precision: config.decimal.precision,
            scale: config.decimal.scale,
        })),
        Shape::Decimal(DecimalKind::BigInteger) => Ok(input.invoke(Function::DecimalFromBigInt)),
        Shape::Boxed(kind) => Ok(input.invoke(Function::Unbox(kind))),
        Shape::Record { class, params } => {
            if seen.contains(class.name()) {
                return Err(Error::CircularReference {
                    type_name: class.name().to_string(),
                });
            }
            serialize_record(input, class.name(), &params, path, &seen.with(class.name()), config)
        }
        Shape::Unsupported => Err(Error::UnsupportedType {
            type_name: ty.name().to_string(),
            path: path.clone(),
        }),
    }
}

fn serialize_record(
    input: Expr,
    class: &str,
    params: &[Param],
    path: &TypePath,
    seen: &SeenTypes,
    config: &CodecConfig,
) -> Result<Expr> {
    check_unique_fields(params, path)?;
    let present = input.clone().assert_not_null(path.to_string());
    let mut fields = Vec::with_capacity(params.len());
    for param in params {
        let field_path = path.field(param.ty.name(), &param.name);
        if is_reserved(&param.name, config) {
            return Err(Error::ReservedFieldName {
                name: param.name.clone(),
                path: field_path,
            });
        }
        let accessor = present.clone().get_field(&param.name, param.ty.clone());
        let field = serializer_for(accessor, &param.ty, &field_path, seen, config)?;
        fields.push((param.name.clone(), field));
    }
    log::trace!("[serializer] record {} with {} fields", class, fields.len());
    Ok(Expr::if_else(
        input.is_null(),
        Expr::null(),
        Expr::create_struct(fields),
    ))
}

/// Collection to structured array. Primitive elements are copied in bulk;
/// everything else maps the element serializer. Sets are first turned into
/// sequences.
fn to_catalyst_array(
    input: Expr,
    kind: CollectionKind,
    element: &TypeRef,
    path: &TypePath,
    seen: &SeenTypes,
    config: &CodecConfig,
) -> Result<Expr> {
    let source = match kind {
        CollectionKind::Set => input.invoke(Function::SetToSeq),
        CollectionKind::Array | CollectionKind::Seq => input,
    };
    if is_unboxed_primitive(element) {
        return Ok(source.invoke(Function::PrimitiveArrayToArrayData));
    }
    let var = fresh_lambda_id();
    let body = serializer_for(
        Expr::lambda_var(var, DeclaredType::Object(element.clone())),
        element,
        &path.array_element(element.name()),
        seen,
        config,
    )?;
    Ok(Expr::map_objects(var, body, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::ToNative;
    use crate::row::Row;
    use crate::schema::DataType;
    use crate::types::{ClassBuilder, Introspect, PrimitiveKind, TypeDescriptor};
    use crate::value::Value;

    fn serialize(ty: &TypeRef, native: Value) -> Result<Value> {
        build_serializer(ty)?.eval(&Row::single(native))
    }

    #[test]
    fn test_leaves() {
        assert_eq!(serialize(&i32::type_descriptor(), Value::I32(3)), Ok(Value::I32(3)));
        assert_eq!(
            serialize(&TypeDescriptor::boxed(PrimitiveKind::I64), Value::Null),
            Ok(Value::Null)
        );
        assert_eq!(
            serialize(&<Option<String>>::type_descriptor(), Value::none()),
            Ok(Value::Null)
        );
        assert_eq!(
            serialize(
                &<Option<String>>::type_descriptor(),
                Some("x".to_string()).to_native()
            ),
            Ok(Value::from("x"))
        );
    }

    #[test]
    fn test_primitive_collection_bulk_copy() {
        let expr = build_serializer(&<Vec<i32>>::type_descriptor()).expect("serializer");
        assert!(matches!(
            expr,
            Expr::Invoke {
                function: Function::PrimitiveArrayToArrayData,
                ..
            }
        ));
        let out = expr.eval(&Row::single(vec![1i32, 2].to_native()));
        assert_eq!(out, Ok(Value::Array(vec![Value::I32(1), Value::I32(2)])));
    }

    #[test]
    fn test_set_serializes_as_array() {
        let set: std::collections::BTreeSet<String> =
            ["b".to_string(), "a".to_string()].into_iter().collect();
        let out = serialize(
            &<std::collections::BTreeSet<String>>::type_descriptor(),
            set.to_native(),
        );
        assert_eq!(
            out,
            Ok(Value::Array(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn test_map_value_nullability_follows_value_type() {
        let strict = <std::collections::HashMap<String, i32>>::type_descriptor();
        let expr = build_serializer(&strict).expect("serializer");
        match &expr {
            Expr::ExternalMapToCatalyst {
                key_nullable,
                value_nullable,
                ..
            } => {
                assert!(*key_nullable);
                assert!(!*value_nullable);
            }
            other => panic!("Expected ExternalMapToCatalyst, got {:?}", other),
        }
        let native = Value::Map(vec![(Value::from("a"), Value::Null)]);
        match expr.eval(&Row::single(native)) {
            Err(Error::NullValue { path }) => assert_eq!(path, "map value"),
            other => panic!("Expected NullValue, got {:?}", other),
        }

        let lenient = <std::collections::HashMap<String, Option<i32>>>::type_descriptor();
        let native = Value::Map(vec![(Value::from("a"), Value::none())]);
        assert!(serialize(&lenient, native).is_ok());
    }

    #[test]
    fn test_record_struct() {
        let point = ClassBuilder::new("ser_tests::Point")
            .primitive_field("x", PrimitiveKind::I32)
            .string_field("label")
            .build_ref();
        let native = Value::object(
            "ser_tests::Point",
            vec![("x".into(), Value::I32(1)), ("label".into(), Value::from("p"))],
        );
        assert_eq!(
            serialize(&point, native),
            Ok(Value::Row(Row::new(vec![Value::I32(1), Value::from("p")])))
        );
        assert_eq!(serialize(&point, Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_reserved_field_name() {
        let ty = ClassBuilder::new("ser_tests::Token")
            .string_field("type")
            .build_ref();
        match build_serializer(&ty) {
            Err(Error::ReservedFieldName { name, path }) => {
                assert_eq!(name, "type");
                assert_eq!(path.len(), 2);
            }
            other => panic!("Expected ReservedFieldName, got {:?}", other),
        }

        let relaxed = CodecConfig {
            check_reserved_names: false,
            ..CodecConfig::default()
        };
        assert!(build_serializer_with_config(&ty, &relaxed).is_ok());

        let strict = CodecConfig {
            reserved_field_names: vec!["offset".into()],
            ..CodecConfig::default()
        };
        let paged = ClassBuilder::new("ser_tests::Page")
            .primitive_field("offset", PrimitiveKind::I64)
            .build_ref();
        assert!(build_serializer_with_config(&paged, &strict).is_err());
        assert!(build_serializer(&paged).is_ok());
    }

    #[test]
    fn test_duplicate_field_names_rejected() {
        let ty = ClassBuilder::new("ser_tests::Clash")
            .primitive_field("id", PrimitiveKind::I64)
            .primitive_field("id", PrimitiveKind::I32)
            .build_ref();
        match build_serializer(&ty) {
            Err(Error::DuplicateFieldName { name, path }) => {
                assert_eq!(name, "id");
                assert!(path.to_string().contains("class: \"i32\""));
            }
            other => panic!("Expected DuplicateFieldName, got {:?}", other),
        }
    }

    #[test]
    fn test_physical_input_passes_through() {
        let input = Expr::input(0, DeclaredType::Physical(DataType::Integer));
        let expr = serializer_for(
            input,
            &String::type_descriptor(),
            &TypePath::root("String"),
            &SeenTypes::new(),
            &CodecConfig::default(),
        )
        .expect("serializer");
        assert!(matches!(expr, Expr::Input { .. }));
    }
}
