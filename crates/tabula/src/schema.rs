// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural schemas and the schema resolver.

use crate::config::{self, CodecConfig};
use crate::error::{Error, Result};
use crate::path::{SeenTypes, TypePath};
use crate::shape::{classify, Shape};
use crate::types::{dealias, DecimalKind, Param, PrimitiveKind, TypeRef};
use crate::udt::UserDefinedType;
use std::fmt;
use std::sync::Arc;

/// Precision and scale used for big integers.
pub const BIG_INTEGER_PRECISION: u8 = 38;

/// Opaque column type carrying its codec.
#[derive(Clone)]
pub struct OpaqueType(Arc<dyn UserDefinedType>);

impl OpaqueType {
    /// Wrap a codec.
    pub fn new(udt: Arc<dyn UserDefinedType>) -> Self {
        Self(udt)
    }

    /// The codec.
    pub fn udt(&self) -> &Arc<dyn UserDefinedType> {
        &self.0
    }

    /// Class name of the native type.
    pub fn user_class(&self) -> &str {
        self.0.user_class()
    }
}

impl fmt::Debug for OpaqueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueType({})", self.user_class())
    }
}

impl PartialEq for OpaqueType {
    fn eq(&self, other: &Self) -> bool {
        self.user_class() == other.user_class()
    }
}

/// Structured column type.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Null,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Binary,
    Date,
    Timestamp,
    Decimal {
        precision: u8,
        scale: u8,
    },
    Array {
        element_type: Box<DataType>,
        contains_null: bool,
    },
    Map {
        key_type: Box<DataType>,
        value_type: Box<DataType>,
        value_contains_null: bool,
    },
    Struct(Vec<StructField>),
    Opaque(OpaqueType),
}

impl DataType {
    /// Column type of an unboxed or boxed primitive.
    pub fn of_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Boolean,
            PrimitiveKind::I8 => Self::Byte,
            PrimitiveKind::I16 | PrimitiveKind::U8 => Self::Short,
            PrimitiveKind::I32 => Self::Integer,
            PrimitiveKind::I64 => Self::Long,
            PrimitiveKind::F32 => Self::Float,
            PrimitiveKind::F64 => Self::Double,
        }
    }

    /// Struct fields, if this is a struct.
    pub fn fields(&self) -> Option<&[StructField]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean => f.write_str("boolean"),
            Self::Byte => f.write_str("tinyint"),
            Self::Short => f.write_str("smallint"),
            Self::Integer => f.write_str("int"),
            Self::Long => f.write_str("bigint"),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::String => f.write_str("string"),
            Self::Binary => f.write_str("binary"),
            Self::Date => f.write_str("date"),
            Self::Timestamp => f.write_str("timestamp"),
            Self::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            Self::Array { element_type, .. } => write!(f, "array<{}>", element_type),
            Self::Map {
                key_type,
                value_type,
                ..
            } => write!(f, "map<{},{}>", key_type, value_type),
            Self::Struct(fields) => {
                f.write_str("struct<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", field.name, field.data_type)?;
                }
                f.write_str(">")
            }
            Self::Opaque(udt) => write!(f, "udt<{}>", udt.user_class()),
        }
    }
}

/// Named column of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl StructField {
    /// Create a field.
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Column type plus nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub data_type: DataType,
    pub nullable: bool,
}

impl Schema {
    /// Create a schema.
    pub fn new(data_type: DataType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }
}

/// Resolve the schema of a type with the process-wide configuration.
pub fn schema_for(ty: &TypeRef) -> Result<Schema> {
    schema_for_with_config(ty, &config::current())
}

/// Resolve the schema of a type.
pub fn schema_for_with_config(ty: &TypeRef, config: &CodecConfig) -> Result<Schema> {
    let path = TypePath::root(dealias(ty).name());
    let schema = resolve(ty, &path, &SeenTypes::new(), config)?;
    log::debug!(
        "[schema] {} -> {} (nullable: {})",
        ty.name(),
        schema.data_type,
        schema.nullable
    );
    Ok(schema)
}

/// Schema of a type at a nested position.
pub(crate) fn resolve(
    ty: &TypeRef,
    path: &TypePath,
    seen: &SeenTypes,
    config: &CodecConfig,
) -> Result<Schema> {
    let shape = classify(ty);
    log::trace!("[schema] {} is {}", ty.name(), shape.label());
    let schema = match shape {
        Shape::Null => Schema::new(DataType::Null, true),
        Shape::Opaque(udt) => Schema::new(DataType::Opaque(OpaqueType::new(udt)), true),
        Shape::Option(inner) => {
            let inner_path = path.option_value(inner.name());
            Schema {
                nullable: true,
                ..resolve(&inner, &inner_path, seen, config)?
            }
        }
        Shape::Binary => Schema::new(DataType::Binary, true),
        Shape::Collection { element, .. } => {
            let element_schema = resolve(&element, &path.array_element(element.name()), seen, config)?;
            Schema::new(
                DataType::Array {
                    element_type: Box::new(element_schema.data_type),
                    contains_null: element_schema.nullable,
                },
                true,
            )
        }
        Shape::Map { key, value, .. } => {
            let key_schema = resolve(&key, &path.map_key(key.name()), seen, config)?;
            let value_schema = resolve(&value, &path.map_value(value.name()), seen, config)?;
            Schema::new(
                DataType::Map {
                    key_type: Box::new(key_schema.data_type),
                    value_type: Box::new(value_schema.data_type),
                    value_contains_null: value_schema.nullable,
                },
                true,
            )
        }
        Shape::String => Schema::new(DataType::String, true),
        Shape::Date => Schema::new(DataType::Date, true),
        Shape::Timestamp => Schema::new(DataType::Timestamp, true),
        Shape::Decimal(DecimalKind::BigDecimal) => Schema::new(
            DataType::Decimal {
                precision: config.decimal.precision,
                scale: config.decimal.scale,
            },
            true,
        ),
        Shape::Decimal(DecimalKind::BigInteger) => Schema::new(
            DataType::Decimal {
                precision: BIG_INTEGER_PRECISION,
                scale: 0,
            },
            true,
        ),
        Shape::Boxed(kind) => Schema::new(DataType::of_primitive(kind), true),
        Shape::Primitive(kind) => Schema::new(DataType::of_primitive(kind), false),
        Shape::Record { class, params } => {
            if seen.contains(class.name()) {
                return Err(Error::CircularReference {
                    type_name: class.name().to_string(),
                });
            }
            check_unique_fields(&params, path)?;
            let seen = seen.with(class.name());
            let mut fields = Vec::with_capacity(params.len());
            for param in &params {
                let field_path = path.field(param.ty.name(), &param.name);
                let field_schema = resolve(&param.ty, &field_path, &seen, config)?;
                fields.push(StructField::new(
                    param.name.clone(),
                    field_schema.data_type,
                    field_schema.nullable,
                ));
            }
            Schema::new(DataType::Struct(fields), true)
        }
        Shape::Unsupported => {
            return Err(Error::UnsupportedType {
                type_name: ty.name().to_string(),
                path: path.clone(),
            })
        }
    };
    Ok(schema)
}

/// Reject a record layout in which two fields share a name; the path
/// points at the second occurrence.
pub(crate) fn check_unique_fields(params: &[Param], path: &TypePath) -> Result<()> {
    for (i, param) in params.iter().enumerate() {
        if params[..i].iter().any(|earlier| earlier.name == param.name) {
            return Err(Error::DuplicateFieldName {
                name: param.name.clone(),
                path: path.field(param.ty.name(), &param.name),
            });
        }
    }
    Ok(())
}

/// True if the type, after unwrapping options, is a record.
pub fn is_record_like_type(ty: &TypeRef) -> bool {
    match classify(ty) {
        Shape::Option(inner) => is_record_like_type(&inner),
        Shape::Record { .. } => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, Introspect, TypeDescriptor};
    use std::collections::HashMap;

    #[test]
    fn test_duplicate_field_names_rejected() {
        let ty = ClassBuilder::new("schema_tests::Twice")
            .primitive_field("a", PrimitiveKind::I32)
            .string_field("a")
            .build_ref();
        match schema_for(&ty) {
            Err(Error::DuplicateFieldName { name, path }) => {
                assert_eq!(name, "a");
                assert_eq!(path.len(), 2);
                assert!(path.to_string().contains("class: \"String\", name: \"a\""));
            }
            other => panic!("Expected DuplicateFieldName, got {:?}", other),
        }
    }

    #[test]
    fn test_leaf_nullability() {
        assert_eq!(
            schema_for(&i32::type_descriptor()),
            Ok(Schema::new(DataType::Integer, false))
        );
        assert_eq!(
            schema_for(&TypeDescriptor::boxed(PrimitiveKind::I32)),
            Ok(Schema::new(DataType::Integer, true))
        );
        assert_eq!(
            schema_for(&<Option<i64>>::type_descriptor()),
            Ok(Schema::new(DataType::Long, true))
        );
        assert_eq!(
            schema_for(&u8::type_descriptor()),
            Ok(Schema::new(DataType::Short, false))
        );
        assert_eq!(
            schema_for(&TypeDescriptor::null()),
            Ok(Schema::new(DataType::Null, true))
        );
    }

    #[test]
    fn test_collections() {
        let schema = schema_for(&<Vec<Option<String>>>::type_descriptor()).expect("schema");
        assert_eq!(
            schema.data_type,
            DataType::Array {
                element_type: Box::new(DataType::String),
                contains_null: true,
            }
        );

        let schema = schema_for(&<HashMap<String, f64>>::type_descriptor()).expect("schema");
        assert_eq!(
            schema.data_type,
            DataType::Map {
                key_type: Box::new(DataType::String),
                value_type: Box::new(DataType::Double),
                value_contains_null: false,
            }
        );
        assert_eq!(
            schema_for(&<Vec<u8>>::type_descriptor()).map(|s| s.data_type),
            Ok(DataType::Binary)
        );
    }

    #[test]
    fn test_decimal_layout_follows_config() {
        let config = CodecConfig {
            decimal: config::DecimalConfig {
                precision: 20,
                scale: 4,
            },
            ..CodecConfig::default()
        };
        let schema =
            schema_for_with_config(&TypeDescriptor::decimal(), &config).expect("schema");
        assert_eq!(
            schema.data_type,
            DataType::Decimal {
                precision: 20,
                scale: 4
            }
        );
        let schema =
            schema_for_with_config(&TypeDescriptor::big_integer(), &config).expect("schema");
        assert_eq!(
            schema.data_type,
            DataType::Decimal {
                precision: 38,
                scale: 0
            }
        );
    }

    #[test]
    fn test_struct_in_declaration_order() {
        let person = ClassBuilder::new("schema_tests::Person")
            .string_field("name")
            .primitive_field("age", PrimitiveKind::I32)
            .optional_field("email", TypeDescriptor::string())
            .build_ref();
        let schema = schema_for(&person).expect("schema");
        assert!(schema.nullable);
        assert_eq!(
            schema.data_type,
            DataType::Struct(vec![
                StructField::new("name", DataType::String, true),
                StructField::new("age", DataType::Integer, false),
                StructField::new("email", DataType::String, true),
            ])
        );
        assert_eq!(
            schema.data_type.to_string(),
            "struct<name:string,age:int,email:string>"
        );
    }

    #[test]
    fn test_unsupported_reports_path() {
        let holder = ClassBuilder::new("schema_tests::Holder")
            .seq_field("items", TypeDescriptor::any())
            .build_ref();
        match schema_for(&holder) {
            Err(Error::UnsupportedType { type_name, path }) => {
                assert_eq!(type_name, "Any");
                assert_eq!(path.len(), 3);
            }
            other => panic!("Expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn test_is_record_like_type() {
        let point = ClassBuilder::new("schema_tests::Point")
            .primitive_field("x", PrimitiveKind::I32)
            .build_ref();
        assert!(is_record_like_type(&point));
        assert!(is_record_like_type(&TypeDescriptor::option(point.clone())));
        assert!(!is_record_like_type(&TypeDescriptor::seq(point)));
        assert!(!is_record_like_type(&i32::type_descriptor()));
    }
}
