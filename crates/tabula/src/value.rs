// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime values flowing through conversion steps.
//!
//! A single enum carries both sides of a codec: the *native* form (options,
//! sequences, sets, maps, typed arrays, class instances, chrono temporals)
//! and the *structured* form stored in rows (`Row`, `Array`, `MapData`,
//! days/micros since epoch for temporals).

use crate::decimal::Decimal;
use crate::row::{MapData, Row};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::sync::Arc;

/// A value of any native or structured shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Scalars (shared by both forms)
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Binary(Vec<u8>),
    Decimal(Decimal),

    // Native scalars
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    BigInt(i128),

    // Native composites
    Option(Option<Box<Value>>),
    Seq(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    NativeArray(NativeArray),
    Object(Arc<Instance>),

    // Structured composites
    Row(Row),
    Array(Vec<Value>),
    MapData(MapData),
}

/// Typed native array, one variant per primitive element plus a generic one.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeArray {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Object(Vec<Value>),
}

impl NativeArray {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Object(v) => v.len(),
        }
    }

    /// Box every element into a [`Value`].
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Self::Bool(v) => v.iter().map(|x| Value::Bool(*x)).collect(),
            Self::I8(v) => v.iter().map(|x| Value::I8(*x)).collect(),
            Self::I16(v) => v.iter().map(|x| Value::I16(*x)).collect(),
            Self::I32(v) => v.iter().map(|x| Value::I32(*x)).collect(),
            Self::I64(v) => v.iter().map(|x| Value::I64(*x)).collect(),
            Self::F32(v) => v.iter().map(|x| Value::F32(*x)).collect(),
            Self::F64(v) => v.iter().map(|x| Value::F64(*x)).collect(),
            Self::Object(v) => v.clone(),
        }
    }
}

/// Instance of a native class: its class name and named field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    fields: Vec<(String, Value)>,
}

impl Instance {
    /// Create an instance.
    pub fn new(class: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            class: class.into(),
            fields,
        }
    }

    /// Class name.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// All fields in construction order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl Value {
    /// Native instance of `class`.
    pub fn object(class: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self::Object(Arc::new(Instance::new(class, fields)))
    }

    /// Present native optional.
    pub fn some(value: Value) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    /// Absent native optional.
    pub fn none() -> Self {
        Self::Option(None)
    }

    /// Native set; duplicates (by equality) are dropped, first occurrence wins.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short variant label used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::BigInt(_) => "bigint",
            Self::Option(_) => "option",
            Self::Seq(_) => "seq",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::NativeArray(_) => "native array",
            Self::Object(_) => "object",
            Self::Row(_) => "row",
            Self::Array(_) => "array",
            Self::MapData(_) => "map data",
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as structured row.
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            Self::Row(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get as native instance.
    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Elements of any sequence-like value (native or structured).
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Self::Seq(v) | Self::Set(v) | Self::Array(v) => Some(v.clone()),
            Self::NativeArray(a) => Some(a.to_values()),
            _ => None,
        }
    }
}

/// Ordering used to sort keys of sorted maps. Values of different kinds
/// order by kind label; incomparable floats compare equal.
pub(crate) fn sort_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::I8(x), Value::I8(y)) => x.cmp(y),
        (Value::I16(x), Value::I16(y)) => x.cmp(y),
        (Value::I32(x), Value::I32(y)) => x.cmp(y),
        (Value::I64(x), Value::I64(y)) => x.cmp(y),
        (Value::F32(x), Value::F32(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::F64(x), Value::F64(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Binary(x), Value::Binary(y)) => x.cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::BigInt(x), Value::BigInt(y)) => x.cmp(y),
        _ => a.kind_name().cmp(b.kind_name()),
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Self::Row(v)
    }
}
