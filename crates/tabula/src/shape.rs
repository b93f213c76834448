// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shape classification.
//!
//! Every type is classified once into a closed [`Shape`]; the schema
//! resolver and both codec builders dispatch on it. The match order below
//! is the single source of precedence (an annotated class is opaque before
//! it is a record, a byte sequence is binary before it is a collection).
//! An optional of an optional is unsupported: both absent levels would
//! collapse into the same null.

use crate::types::{
    dealias, Annotation, ClassDef, DecimalKind, MapKind, Param, PrimitiveKind, TypeKind, TypeRef,
};
use crate::udt::{self, UserDefinedType};
use std::fmt;
use std::sync::Arc;

/// Native collection flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Native fixed-size array.
    Array,
    /// Ordered sequence.
    Seq,
    /// Set; structured form is an array.
    Set,
}

/// Closed classification of a type.
#[derive(Clone)]
pub enum Shape {
    Null,
    Opaque(Arc<dyn UserDefinedType>),
    Option(TypeRef),
    Binary,
    Collection {
        kind: CollectionKind,
        element: TypeRef,
    },
    Map {
        key: TypeRef,
        value: TypeRef,
        kind: MapKind,
    },
    String,
    Date,
    Timestamp,
    Decimal(DecimalKind),
    Boxed(PrimitiveKind),
    Primitive(PrimitiveKind),
    Record {
        class: Arc<ClassDef>,
        params: Vec<Param>,
    },
    Unsupported,
}

impl Shape {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Opaque(_) => "opaque",
            Self::Option(_) => "option",
            Self::Binary => "binary",
            Self::Collection { .. } => "collection",
            Self::Map { .. } => "map",
            Self::String => "string",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Decimal(_) => "decimal",
            Self::Boxed(_) => "boxed",
            Self::Primitive(_) => "primitive",
            Self::Record { .. } => "record",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque(udt) => write!(f, "Opaque({})", udt.user_class()),
            Self::Record { class, .. } => write!(f, "Record({})", class.name()),
            other => f.write_str(other.label()),
        }
    }
}

/// Opaque codec of a type: annotation first, then the name-keyed registry.
pub fn opaque_codec(ty: &TypeRef) -> Option<Arc<dyn UserDefinedType>> {
    let annotated = ty.annotations().iter().find_map(|annotation| match annotation {
        Annotation::UserDefinedType(udt) => Some(Arc::clone(udt)),
        Annotation::Marker(_) => None,
    });
    annotated.or_else(|| udt::lookup(ty.name()))
}

fn is_option(ty: &TypeRef) -> bool {
    matches!(dealias(ty).kind(), TypeKind::Option(_))
}

fn is_byte(ty: &TypeRef) -> bool {
    matches!(dealias(ty).kind(), TypeKind::Primitive(PrimitiveKind::U8))
}

/// Classify a type.
pub fn classify(ty: &TypeRef) -> Shape {
    let ty = dealias(ty);
    if matches!(ty.kind(), TypeKind::Null) {
        return Shape::Null;
    }
    if let Some(udt) = opaque_codec(&ty) {
        return Shape::Opaque(udt);
    }
    match ty.kind() {
        TypeKind::Option(inner) if is_option(inner) => Shape::Unsupported,
        TypeKind::Option(inner) => Shape::Option(inner.clone()),
        TypeKind::Binary => Shape::Binary,
        TypeKind::Array(element) | TypeKind::Seq(element) if is_byte(element) => Shape::Binary,
        TypeKind::Array(element) => Shape::Collection {
            kind: CollectionKind::Array,
            element: element.clone(),
        },
        TypeKind::Seq(element) => Shape::Collection {
            kind: CollectionKind::Seq,
            element: element.clone(),
        },
        TypeKind::Set(element) => Shape::Collection {
            kind: CollectionKind::Set,
            element: element.clone(),
        },
        TypeKind::Map { key, value, kind } => Shape::Map {
            key: key.clone(),
            value: value.clone(),
            kind: *kind,
        },
        TypeKind::String => Shape::String,
        TypeKind::Date => Shape::Date,
        TypeKind::Timestamp => Shape::Timestamp,
        TypeKind::Decimal(kind) => Shape::Decimal(*kind),
        TypeKind::Boxed(kind) => Shape::Boxed(*kind),
        TypeKind::Primitive(kind) => Shape::Primitive(*kind),
        TypeKind::Class(def) if def.is_record() => match def.constructor_parameters() {
            Some(params) => Shape::Record {
                class: Arc::clone(def),
                params: params.to_vec(),
            },
            None => Shape::Unsupported,
        },
        _ => Shape::Unsupported,
    }
}

/// True for unboxed primitives.
pub fn is_unboxed_primitive(ty: &TypeRef) -> bool {
    matches!(classify(ty), Shape::Primitive(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, Introspect, TypeDescriptor};

    #[test]
    fn test_byte_sequences_are_binary() {
        assert!(matches!(classify(&<Vec<u8>>::type_descriptor()), Shape::Binary));
        assert!(matches!(classify(&<Box<[u8]>>::type_descriptor()), Shape::Binary));
        assert!(matches!(
            classify(&<Vec<i8>>::type_descriptor()),
            Shape::Collection {
                kind: CollectionKind::Seq,
                ..
            }
        ));
    }

    #[test]
    fn test_nested_option_is_unsupported() {
        assert!(matches!(
            classify(&<Option<Option<i32>>>::type_descriptor()),
            Shape::Unsupported
        ));
        let alias = TypeDescriptor::alias("MaybeName", <Option<String>>::type_descriptor());
        assert!(matches!(
            classify(&TypeDescriptor::option(alias)),
            Shape::Unsupported
        ));
        assert!(matches!(
            classify(&<Option<Vec<Option<i32>>>>::type_descriptor()),
            Shape::Option(_)
        ));
    }

    #[test]
    fn test_alias_is_transparent() {
        let alias = TypeDescriptor::alias("Score", TypeDescriptor::boxed(PrimitiveKind::I32));
        assert!(matches!(classify(&alias), Shape::Boxed(PrimitiveKind::I32)));
    }

    #[test]
    fn test_non_record_class_is_unsupported() {
        let socket = ClassBuilder::new("shape_tests::Socket")
            .primitive_field("fd", PrimitiveKind::I32)
            .without_default_constructor()
            .build_ref();
        assert!(matches!(classify(&socket), Shape::Unsupported));
        assert!(matches!(classify(&TypeDescriptor::any()), Shape::Unsupported));
    }

    #[test]
    fn test_record_params_follow_layout() {
        let point = ClassBuilder::new("shape_tests::Point")
            .primitive_field("x", PrimitiveKind::I32)
            .primitive_field("y", PrimitiveKind::I32)
            .build_ref();
        match classify(&point) {
            Shape::Record { params, .. } => assert_eq!(params.len(), 2),
            other => panic!("Expected record, got {:?}", other),
        }
        assert!(is_unboxed_primitive(&i32::type_descriptor()));
        assert!(!is_unboxed_primitive(&point));
    }
}
