// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deserializer builder: structured value to native value.
//!
//! Every position (root, record field, collection element, map key and
//! value) goes through [`guarded`]: the source is upcast to the column
//! type, then nullable positions short-circuit to null and non-nullable
//! ones assert that the value is present. Options are the exception: a
//! null becomes an absent optional instead.

use crate::config::{self, CodecConfig};
use crate::constructor::{self, outer_scope_for};
use crate::error::{Error, Result};
use crate::expr::{fresh_lambda_id, ArrayElement, DeclaredType, Expr, Function, UdtOp};
use crate::path::{SeenTypes, TypePath};
use crate::schema::{self, OpaqueType};
use crate::shape::{classify, CollectionKind, Shape};
use crate::types::{dealias, DecimalKind, TypeRef};

/// Build the deserializer of `ty` with the process-wide configuration.
///
/// The returned step reads the structured value from column 0 of its
/// input row.
pub fn build_deserializer(ty: &TypeRef) -> Result<Expr> {
    build_deserializer_with_config(ty, &config::current())
}

/// Build the deserializer of `ty`.
pub fn build_deserializer_with_config(ty: &TypeRef, config: &CodecConfig) -> Result<Expr> {
    let path = TypePath::root(dealias(ty).name());
    let root = schema::resolve(ty, &path, &SeenTypes::new(), config)?;
    let input = Expr::input(0, DeclaredType::Physical(root.data_type));
    let expr = guarded(ty, input, &path, config)?;
    log::debug!(
        "[deserializer] built deserializer for {} ({} nodes)",
        ty.name(),
        expr.node_count()
    );
    Ok(expr)
}

/// Upcast `source` to the column type of `ty` and apply its null handling.
fn guarded(ty: &TypeRef, source: Expr, path: &TypePath, config: &CodecConfig) -> Result<Expr> {
    let schema = schema::resolve(ty, path, &SeenTypes::new(), config)?;
    let upcast = source.clone().upcast(schema.data_type);
    let inner = deserializer_for(ty, upcast, path, config)?;
    if matches!(classify(ty), Shape::Option(_)) {
        Ok(inner)
    } else if schema.nullable {
        Ok(Expr::if_else(source.is_null(), Expr::null(), inner))
    } else {
        Ok(inner.assert_not_null(path.to_string()))
    }
}

fn lambda_for(ty: &TypeRef, path: &TypePath, config: &CodecConfig) -> Result<(usize, Expr)> {
    let schema = schema::resolve(ty, path, &SeenTypes::new(), config)?;
    let id = fresh_lambda_id();
    Ok((id, Expr::lambda_var(id, DeclaredType::Physical(schema.data_type))))
}

/// Deserializer of the structured value produced by `source`.
pub(crate) fn deserializer_for(
    ty: &TypeRef,
    source: Expr,
    path: &TypePath,
    config: &CodecConfig,
) -> Result<Expr> {
    let shape = classify(ty);
    log::trace!("[deserializer] {} as {}", ty.name(), shape.label());
    match shape {
        Shape::Null => Ok(Expr::null()),
        Shape::Opaque(udt) => Ok(source.opaque(OpaqueType::new(udt), UdtOp::Deserialize)),
        Shape::Option(inner) => {
            let inner_path = path.option_value(inner.name());
            Ok(deserializer_for(&inner, source, &inner_path, config)?.wrap_option())
        }
        Shape::Binary | Shape::Primitive(_) => Ok(source),
        Shape::Boxed(kind) => Ok(source.invoke(Function::ValueOf(kind))),
        Shape::String => Ok(source.invoke(Function::Utf8ToString)),
        Shape::Date => Ok(source.invoke(Function::DaysToDate)),
        Shape::Timestamp => Ok(source.invoke(Function::MicrosToTimestamp)),
        Shape::Decimal(DecimalKind::BigDecimal) => Ok(source.invoke(Function::DecimalToBig)),
        Shape::Decimal(DecimalKind::BigInteger) => Ok(source.invoke(Function::DecimalToBigInt)),
        Shape::Collection { kind, element } => {
            let element_path = path.array_element(element.name());
            let (var, element_var) = lambda_for(&element, &element_path, config)?;
            let body = guarded(&element, element_var, &element_path, config)?;
            let entries = Expr::map_objects(var, body, source);
            let projection = match kind {
                CollectionKind::Array => {
                    let primitive = match classify(&element) {
                        Shape::Primitive(k) => Some(k),
                        _ => None,
                    };
                    Function::ToTypedArray(ArrayElement::for_primitive(primitive))
                }
                CollectionKind::Seq => Function::ToSeq,
                CollectionKind::Set => Function::ToSet,
            };
            Ok(entries.invoke(projection))
        }
        Shape::Map { key, value, kind } => {
            let key_path = path.map_key(key.name());
            let value_path = path.map_value(value.name());
            let (key_var, key_in) = lambda_for(&key, &key_path, config)?;
            let (value_var, value_in) = lambda_for(&value, &value_path, config)?;
            Ok(Expr::CatalystToExternalMap {
                map: Box::new(source),
                key_var,
                key: Box::new(guarded(&key, key_in, &key_path, config)?),
                value_var,
                value: Box::new(guarded(&value, value_in, &value_path, config)?),
                kind,
            })
        }
        Shape::Record { class, params } => {
            let mut args = Vec::with_capacity(params.len() + 1);
            let mut shapes = Vec::with_capacity(params.len() + 1);
            if let Some(outer) = class.outer() {
                let instance =
                    outer_scope_for(outer.name()).ok_or_else(|| Error::MissingOuterScope {
                        type_name: class.name().to_string(),
                    })?;
                args.push(Expr::literal(instance));
                shapes.push(outer.clone());
            }
            for (ordinal, param) in params.iter().enumerate() {
                let field_path = path.field(param.ty.name(), &param.name);
                let field = source.clone().get_struct_field(ordinal, &param.name);
                args.push(guarded(&param.ty, field, &field_path, config)?);
                shapes.push(param.ty.clone());
            }
            let ctor = constructor::resolve(ty, &shapes)?;
            log::trace!("[deserializer] {} built with {}", class.name(), ctor);
            Ok(Expr::if_else(
                source.clone().is_null(),
                Expr::null(),
                Expr::new_instance(ctor, args),
            ))
        }
        Shape::Unsupported => Err(Error::UnsupportedType {
            type_name: ty.name().to_string(),
            path: path.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{MapData, Row};
    use crate::types::{ClassBuilder, Introspect, PrimitiveKind, TypeDescriptor};
    use crate::value::{NativeArray, Value};
    use std::collections::BTreeMap;

    fn deserialize(ty: &TypeRef, structured: Value) -> Result<Value> {
        build_deserializer(ty)?.eval(&Row::single(structured))
    }

    #[test]
    fn test_primitive_rejects_null() {
        assert_eq!(deserialize(&i32::type_descriptor(), Value::I32(1)), Ok(Value::I32(1)));
        match deserialize(&i32::type_descriptor(), Value::Null) {
            Err(Error::NullValue { path }) => assert!(path.contains("root class: \"i32\"")),
            other => panic!("Expected NullValue, got {:?}", other),
        }
    }

    #[test]
    fn test_upcast_on_read() {
        // a smallint column feeding an i64 field
        assert_eq!(deserialize(&i64::type_descriptor(), Value::I16(9)), Ok(Value::I64(9)));
    }

    #[test]
    fn test_option_null_is_none() {
        let ty = <Option<i32>>::type_descriptor();
        assert_eq!(deserialize(&ty, Value::Null), Ok(Value::none()));
        assert_eq!(deserialize(&ty, Value::I32(2)), Ok(Value::some(Value::I32(2))));
    }

    #[test]
    fn test_typed_array_projection() {
        let ty = <Box<[f64]>>::type_descriptor();
        assert_eq!(
            deserialize(&ty, Value::Array(vec![Value::F64(0.5)])),
            Ok(Value::NativeArray(NativeArray::F64(vec![0.5])))
        );
        let ty = <Box<[String]>>::type_descriptor();
        assert_eq!(
            deserialize(&ty, Value::Array(vec![Value::from("a")])),
            Ok(Value::NativeArray(NativeArray::Object(vec![Value::from("a")])))
        );
    }

    #[test]
    fn test_set_deduplicates() {
        let ty = <std::collections::HashSet<i32>>::type_descriptor();
        assert_eq!(
            deserialize(&ty, Value::Array(vec![Value::I32(1), Value::I32(1)])),
            Ok(Value::Set(vec![Value::I32(1)]))
        );
    }

    #[test]
    fn test_sorted_map() {
        let ty = <BTreeMap<String, Option<i32>>>::type_descriptor();
        let data = MapData::new(
            vec![Value::from("z"), Value::from("a")],
            vec![Value::Null, Value::I32(1)],
        )
        .expect("map data");
        assert_eq!(
            deserialize(&ty, Value::MapData(data)),
            Ok(Value::Map(vec![
                (Value::from("a"), Value::some(Value::I32(1))),
                (Value::from("z"), Value::none()),
            ]))
        );
    }

    #[test]
    fn test_record_uses_resolved_constructor() {
        let point = ClassBuilder::new("de_tests::Point")
            .primitive_field("x", PrimitiveKind::I32)
            .field("y", TypeDescriptor::boxed(PrimitiveKind::I32))
            .build_ref();
        let row = Value::Row(Row::new(vec![Value::I32(1), Value::Null]));
        assert_eq!(
            deserialize(&point, row),
            Ok(Value::object(
                "de_tests::Point",
                vec![("x".into(), Value::I32(1)), ("y".into(), Value::Null)]
            ))
        );
        assert_eq!(deserialize(&point, Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_missing_outer_scope() {
        let outer = ClassBuilder::new("de_tests::Registry").build_ref();
        let nested = ClassBuilder::new("de_tests::Registry.Entry")
            .outer(outer)
            .string_field("key")
            .build_ref();
        assert_eq!(
            build_deserializer(&nested).map(|_| ()),
            Err(Error::MissingOuterScope {
                type_name: "de_tests::Registry.Entry".into()
            })
        );
    }
}
