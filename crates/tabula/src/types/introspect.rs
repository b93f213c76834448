// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compile-time entry point into the type universe.

use crate::decimal::Decimal;
use crate::types::builder::ClassBuilder;
use crate::types::descriptor::{PrimitiveKind, TypeDescriptor, TypeKind, TypeRef};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Types that can describe themselves.
///
/// Implemented for std and chrono types here and for user structs by
/// `#[derive(Record)]`.
pub trait Introspect {
    /// Descriptor of `Self`.
    fn type_descriptor() -> TypeRef;
}

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Introspect for $ty {
                fn type_descriptor() -> TypeRef {
                    TypeDescriptor::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    u8 => U8,
}

impl Introspect for String {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::string()
    }
}

impl Introspect for i128 {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::big_integer()
    }
}

impl Introspect for Decimal {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::decimal()
    }
}

impl Introspect for NaiveDate {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::date()
    }
}

impl Introspect for NaiveDateTime {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::timestamp()
    }
}

impl<T: Introspect> Introspect for Option<T> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::option(T::type_descriptor())
    }
}

// Boxing is transparent.
impl<T: Introspect> Introspect for Box<T> {
    fn type_descriptor() -> TypeRef {
        T::type_descriptor()
    }
}

impl<T: Introspect> Introspect for Box<[T]> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::array(T::type_descriptor())
    }
}

impl<T: Introspect> Introspect for Vec<T> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::seq(T::type_descriptor())
    }
}

impl<T: Introspect> Introspect for HashSet<T> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::set(T::type_descriptor())
    }
}

impl<T: Introspect> Introspect for BTreeSet<T> {
    fn type_descriptor() -> TypeRef {
        let element = T::type_descriptor();
        Arc::new(TypeDescriptor::new(
            format!("BTreeSet<{}>", element.name()),
            TypeKind::Set(element),
        ))
    }
}

impl<K: Introspect, V: Introspect> Introspect for HashMap<K, V> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::map(K::type_descriptor(), V::type_descriptor())
    }
}

impl<K: Introspect, V: Introspect> Introspect for BTreeMap<K, V> {
    fn type_descriptor() -> TypeRef {
        TypeDescriptor::sorted_map(K::type_descriptor(), V::type_descriptor())
    }
}

/// Class name of a tuple type, e.g. `(i32, String)`.
pub(crate) fn tuple_name(elements: &[&TypeRef]) -> String {
    let names: Vec<&str> = elements.iter().map(|t| t.name()).collect();
    format!("({})", names.join(", "))
}

impl<A: Introspect, B: Introspect> Introspect for (A, B) {
    fn type_descriptor() -> TypeRef {
        let a = A::type_descriptor();
        let b = B::type_descriptor();
        ClassBuilder::new(tuple_name(&[&a, &b]))
            .field("_1", a)
            .field("_2", b)
            .build_ref()
    }
}

impl<A: Introspect, B: Introspect, C: Introspect> Introspect for (A, B, C) {
    fn type_descriptor() -> TypeRef {
        let a = A::type_descriptor();
        let b = B::type_descriptor();
        let c = C::type_descriptor();
        ClassBuilder::new(tuple_name(&[&a, &b, &c]))
            .field("_1", a)
            .field("_2", b)
            .field("_3", c)
            .build_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_descriptors() {
        assert_eq!(<Vec<Option<i64>>>::type_descriptor().name(), "Vec<Option<i64>>");
        assert_eq!(<Box<[f32]>>::type_descriptor().name(), "Box<[f32]>");
        assert_eq!(
            <BTreeMap<String, bool>>::type_descriptor().name(),
            "BTreeMap<String, bool>"
        );
        assert_eq!(<Box<String>>::type_descriptor().name(), "String");
    }

    #[test]
    fn test_tuple_is_record() {
        let pair = <(i32, String)>::type_descriptor();
        assert_eq!(pair.name(), "(i32, String)");
        let def = pair.class_def().expect("class");
        assert!(def.is_record());
        assert_eq!(def.fields()[1].name, "_2");
    }
}
