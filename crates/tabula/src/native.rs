// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversions between Rust values and native [`Value`]s.
//!
//! `Vec<u8>` and `Box<[u8]>` map to [`Value::Binary`] and primitive boxed
//! slices map to typed [`NativeArray`]s; the hidden `seq_*`/`array_*`
//! methods let the element type pick the collection representation.

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::types::Introspect;
use crate::value::{Instance, NativeArray, Value};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// Rust value to native value.
pub trait ToNative {
    fn to_native(&self) -> Value;

    #[doc(hidden)]
    fn seq_to_native(items: &[Self]) -> Value
    where
        Self: Sized,
    {
        Value::Seq(items.iter().map(ToNative::to_native).collect())
    }

    #[doc(hidden)]
    fn array_to_native(items: &[Self]) -> Value
    where
        Self: Sized,
    {
        Value::NativeArray(NativeArray::Object(
            items.iter().map(ToNative::to_native).collect(),
        ))
    }
}

/// Native value to Rust value.
pub trait FromNative: Sized {
    fn from_native(value: Value) -> Result<Self>;

    #[doc(hidden)]
    fn seq_from_native(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Seq(items) | Value::Array(items) => {
                items.into_iter().map(Self::from_native).collect()
            }
            other => Err(Error::mismatch("seq", &other)),
        }
    }

    #[doc(hidden)]
    fn array_from_native(value: Value) -> Result<Box<[Self]>> {
        generic_array_from_native(value)
    }
}

fn generic_array_from_native<T: FromNative>(value: Value) -> Result<Box<[T]>> {
    match value {
        Value::NativeArray(array) => array
            .to_values()
            .into_iter()
            .map(T::from_native)
            .collect::<Result<Vec<_>>>()
            .map(Vec::into_boxed_slice),
        other => Err(Error::mismatch("native array", &other)),
    }
}

macro_rules! primitive_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToNative for $ty {
                fn to_native(&self) -> Value {
                    Value::$variant(*self)
                }

                fn array_to_native(items: &[Self]) -> Value {
                    Value::NativeArray(NativeArray::$variant(items.to_vec()))
                }
            }

            impl FromNative for $ty {
                fn from_native(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::mismatch(stringify!($ty), &other)),
                    }
                }

                fn array_from_native(value: Value) -> Result<Box<[Self]>> {
                    match value {
                        Value::NativeArray(NativeArray::$variant(v)) => Ok(v.into_boxed_slice()),
                        other => generic_array_from_native(other),
                    }
                }
            }
        )*
    };
}

primitive_native! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

// Bytes widen to i16 on their own and form binary blobs in collections.
impl ToNative for u8 {
    fn to_native(&self) -> Value {
        Value::I16(i16::from(*self))
    }

    fn seq_to_native(items: &[Self]) -> Value {
        Value::Binary(items.to_vec())
    }

    fn array_to_native(items: &[Self]) -> Value {
        Value::Binary(items.to_vec())
    }
}

impl FromNative for u8 {
    fn from_native(value: Value) -> Result<Self> {
        match value {
            Value::I16(v) => u8::try_from(v).map_err(|_| Error::mismatch("u8", &v)),
            other => Err(Error::mismatch("u8", &other)),
        }
    }

    fn seq_from_native(value: Value) -> Result<Vec<Self>> {
        match value {
            Value::Binary(bytes) => Ok(bytes),
            other => Err(Error::mismatch("binary", &other)),
        }
    }

    fn array_from_native(value: Value) -> Result<Box<[Self]>> {
        Self::seq_from_native(value).map(Vec::into_boxed_slice)
    }
}

macro_rules! scalar_native {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToNative for $ty {
                fn to_native(&self) -> Value {
                    Value::$variant(self.clone())
                }
            }

            impl FromNative for $ty {
                fn from_native(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

scalar_native! {
    String => String,
    i128 => BigInt,
    Decimal => Decimal,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
}

impl<T: ToNative> ToNative for Option<T> {
    fn to_native(&self) -> Value {
        Value::Option(self.as_ref().map(|v| Box::new(v.to_native())))
    }
}

impl<T: FromNative> FromNative for Option<T> {
    fn from_native(value: Value) -> Result<Self> {
        match value {
            Value::Null | Value::Option(None) => Ok(None),
            Value::Option(Some(inner)) => T::from_native(*inner).map(Some),
            other => Err(Error::mismatch("option", &other)),
        }
    }
}

impl<T: ToNative> ToNative for Box<T> {
    fn to_native(&self) -> Value {
        (**self).to_native()
    }
}

impl<T: FromNative> FromNative for Box<T> {
    fn from_native(value: Value) -> Result<Self> {
        T::from_native(value).map(Box::new)
    }
}

impl<T: ToNative> ToNative for Vec<T> {
    fn to_native(&self) -> Value {
        T::seq_to_native(self)
    }
}

impl<T: FromNative> FromNative for Vec<T> {
    fn from_native(value: Value) -> Result<Self> {
        T::seq_from_native(value)
    }
}

impl<T: ToNative> ToNative for Box<[T]> {
    fn to_native(&self) -> Value {
        T::array_to_native(self)
    }
}

impl<T: FromNative> FromNative for Box<[T]> {
    fn from_native(value: Value) -> Result<Self> {
        T::array_from_native(value)
    }
}

fn set_items(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Set(items) | Value::Seq(items) => Ok(items),
        other => Err(Error::mismatch("set", &other)),
    }
}

impl<T: ToNative> ToNative for HashSet<T> {
    fn to_native(&self) -> Value {
        Value::set(self.iter().map(ToNative::to_native))
    }
}

impl<T: FromNative + Eq + Hash> FromNative for HashSet<T> {
    fn from_native(value: Value) -> Result<Self> {
        set_items(value)?.into_iter().map(T::from_native).collect()
    }
}

impl<T: ToNative> ToNative for BTreeSet<T> {
    fn to_native(&self) -> Value {
        Value::set(self.iter().map(ToNative::to_native))
    }
}

impl<T: FromNative + Ord> FromNative for BTreeSet<T> {
    fn from_native(value: Value) -> Result<Self> {
        set_items(value)?.into_iter().map(T::from_native).collect()
    }
}

fn map_pairs(value: Value) -> Result<Vec<(Value, Value)>> {
    match value {
        Value::Map(pairs) => Ok(pairs),
        other => Err(Error::mismatch("map", &other)),
    }
}

impl<K: ToNative, V: ToNative> ToNative for HashMap<K, V> {
    fn to_native(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_native(), v.to_native()))
                .collect(),
        )
    }
}

impl<K: FromNative + Eq + Hash, V: FromNative> FromNative for HashMap<K, V> {
    fn from_native(value: Value) -> Result<Self> {
        map_pairs(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_native(k)?, V::from_native(v)?)))
            .collect()
    }
}

impl<K: ToNative, V: ToNative> ToNative for BTreeMap<K, V> {
    fn to_native(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_native(), v.to_native()))
                .collect(),
        )
    }
}

impl<K: FromNative + Ord, V: FromNative> FromNative for BTreeMap<K, V> {
    fn from_native(value: Value) -> Result<Self> {
        map_pairs(value)?
            .into_iter()
            .map(|(k, v)| Ok((K::from_native(k)?, V::from_native(v)?)))
            .collect()
    }
}

impl<A, B> ToNative for (A, B)
where
    A: ToNative + Introspect,
    B: ToNative + Introspect,
{
    fn to_native(&self) -> Value {
        let class = <(A, B)>::type_descriptor().name().to_string();
        Value::object(
            class,
            vec![("_1".into(), self.0.to_native()), ("_2".into(), self.1.to_native())],
        )
    }
}

impl<A: FromNative, B: FromNative> FromNative for (A, B) {
    fn from_native(value: Value) -> Result<Self> {
        let reader = ObjectReader::new(value, "tuple")?;
        Ok((reader.field("_1")?, reader.field("_2")?))
    }
}

impl<A, B, C> ToNative for (A, B, C)
where
    A: ToNative + Introspect,
    B: ToNative + Introspect,
    C: ToNative + Introspect,
{
    fn to_native(&self) -> Value {
        let class = <(A, B, C)>::type_descriptor().name().to_string();
        Value::object(
            class,
            vec![
                ("_1".into(), self.0.to_native()),
                ("_2".into(), self.1.to_native()),
                ("_3".into(), self.2.to_native()),
            ],
        )
    }
}

impl<A: FromNative, B: FromNative, C: FromNative> FromNative for (A, B, C) {
    fn from_native(value: Value) -> Result<Self> {
        let reader = ObjectReader::new(value, "tuple")?;
        Ok((reader.field("_1")?, reader.field("_2")?, reader.field("_3")?))
    }
}

/// Field-by-field reader over a native instance, used by derived
/// `FromNative` impls.
pub struct ObjectReader {
    instance: Arc<Instance>,
}

impl ObjectReader {
    /// Wrap an instance; `class` is only used in error messages.
    pub fn new(value: Value, class: &str) -> Result<Self> {
        match value {
            Value::Object(instance) => Ok(Self { instance }),
            other => Err(Error::mismatch(format!("instance of {}", class), &other)),
        }
    }

    /// Convert the named field.
    pub fn field<T: FromNative>(&self, name: &str) -> Result<T> {
        let value = self.instance.field(name).cloned().ok_or_else(|| {
            Error::Codec(format!("{} has no field {}", self.instance.class(), name))
        })?;
        T::from_native(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: ToNative + FromNative>(value: &T) -> T {
        T::from_native(value.to_native()).expect("from_native")
    }

    #[test]
    fn test_bytes_are_binary() {
        let bytes: Vec<u8> = vec![0, 255, 7];
        assert_eq!(bytes.to_native(), Value::Binary(vec![0, 255, 7]));
        assert_eq!(roundtrip(&bytes), bytes);
        assert_eq!(7u8.to_native(), Value::I16(7));
        assert!(u8::from_native(Value::I16(300)).is_err());
    }

    #[test]
    fn test_primitive_arrays_are_typed() {
        let arr: Box<[i64]> = vec![1, 2, 3].into_boxed_slice();
        assert_eq!(
            arr.to_native(),
            Value::NativeArray(NativeArray::I64(vec![1, 2, 3]))
        );
        assert_eq!(roundtrip(&arr), arr);

        let names: Box<[String]> = vec!["a".to_string()].into_boxed_slice();
        assert!(matches!(
            names.to_native(),
            Value::NativeArray(NativeArray::Object(_))
        ));
    }

    #[test]
    fn test_option_and_nested_collections() {
        let value: Vec<Option<String>> = vec![Some("x".into()), None];
        assert_eq!(roundtrip(&value), value);

        let mut map = BTreeMap::new();
        map.insert("k".to_string(), vec![1i32, 2]);
        assert_eq!(roundtrip(&map), map);
    }

    #[test]
    fn test_tuple_instance() {
        let pair = (1i32, "one".to_string());
        let native = pair.to_native();
        assert_eq!(
            native.as_object().map(|o| o.class().to_string()),
            Some("(i32, String)".to_string())
        );
        assert_eq!(roundtrip(&pair), pair);
    }

    #[test]
    fn test_object_reader_missing_field() {
        let value = Value::object("Point", vec![("x".into(), Value::I32(1))]);
        let reader = ObjectReader::new(value, "Point").expect("object");
        assert_eq!(reader.field::<i32>("x"), Ok(1));
        assert!(matches!(reader.field::<i32>("y"), Err(Error::Codec(_))));
        assert!(ObjectReader::new(Value::I32(1), "Point").is_err());
    }
}
