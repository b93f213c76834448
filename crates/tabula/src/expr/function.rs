// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in unary conversions invoked by conversion steps.
//!
//! All functions propagate null: a null argument yields null without
//! calling the conversion.

use crate::decimal::{Decimal, MAX_PRECISION};
use crate::error::{Error, Result};
use crate::types::PrimitiveKind;
use crate::value::{NativeArray, Value};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i32 = 719_163;

/// Element kind of a typed native array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayElement {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl ArrayElement {
    /// Typed array kind for a primitive element, `Object` otherwise.
    pub fn for_primitive(kind: Option<PrimitiveKind>) -> Self {
        match kind {
            Some(PrimitiveKind::Bool) => Self::Boolean,
            Some(PrimitiveKind::I8) => Self::Byte,
            Some(PrimitiveKind::I16) | Some(PrimitiveKind::U8) => Self::Short,
            Some(PrimitiveKind::I32) => Self::Int,
            Some(PrimitiveKind::I64) => Self::Long,
            Some(PrimitiveKind::F32) => Self::Float,
            Some(PrimitiveKind::F64) => Self::Double,
            None => Self::Object,
        }
    }
}

/// Built-in conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    /// Structured primitive to boxed native.
    ValueOf(PrimitiveKind),
    /// Boxed native to structured primitive.
    Unbox(PrimitiveKind),
    StringToUtf8,
    Utf8ToString,
    DateToDays,
    DaysToDate,
    TimestampToMicros,
    MicrosToTimestamp,
    DecimalFromBig { precision: u8, scale: u8 },
    DecimalToBig,
    DecimalFromBigInt,
    DecimalToBigInt,
    /// Bulk copy of a primitive collection into a structured array.
    PrimitiveArrayToArrayData,
    /// Structured array to typed native array.
    ToTypedArray(ArrayElement),
    ToSeq,
    ToSet,
    /// Set to ordered sequence; de-duplication is not re-checked.
    SetToSeq,
}

impl Function {
    /// Conversion name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ValueOf(_) => "valueOf",
            Self::Unbox(_) => "unbox",
            Self::StringToUtf8 => "fromString",
            Self::Utf8ToString => "toString",
            Self::DateToDays => "dateToDays",
            Self::DaysToDate => "daysToDate",
            Self::TimestampToMicros => "timestampToMicros",
            Self::MicrosToTimestamp => "microsToTimestamp",
            Self::DecimalFromBig { .. } => "fromBigDecimal",
            Self::DecimalToBig => "toBigDecimal",
            Self::DecimalFromBigInt => "fromBigInteger",
            Self::DecimalToBigInt => "toBigInteger",
            Self::PrimitiveArrayToArrayData => "fromPrimitiveArray",
            Self::ToTypedArray(element) => match element {
                ArrayElement::Boolean => "toBooleanArray",
                ArrayElement::Byte => "toByteArray",
                ArrayElement::Short => "toShortArray",
                ArrayElement::Int => "toIntArray",
                ArrayElement::Long => "toLongArray",
                ArrayElement::Float => "toFloatArray",
                ArrayElement::Double => "toDoubleArray",
                ArrayElement::Object => "array",
            },
            Self::ToSeq => "toSeq",
            Self::ToSet => "toSet",
            Self::SetToSeq => "setToSeq",
        }
    }

    /// Apply to an evaluated argument.
    pub fn apply(&self, arg: Value) -> Result<Value> {
        if arg.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Self::ValueOf(kind) | Self::Unbox(kind) => check_primitive(*kind, arg),
            Self::StringToUtf8 | Self::Utf8ToString => match arg {
                Value::String(_) => Ok(arg),
                other => Err(Error::mismatch("string", &other)),
            },
            Self::DateToDays => match arg {
                Value::Date(date) => Ok(Value::I32(
                    date.num_days_from_ce() - UNIX_EPOCH_DAY_FROM_CE,
                )),
                other => Err(Error::mismatch("date", &other)),
            },
            Self::DaysToDate => match arg {
                Value::I32(days) => days
                    .checked_add(UNIX_EPOCH_DAY_FROM_CE)
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .map(Value::Date)
                    .ok_or_else(|| Error::Codec(format!("day {} out of range", days))),
                other => Err(Error::mismatch("days since epoch (i32)", &other)),
            },
            Self::TimestampToMicros => match arg {
                Value::Timestamp(ts) => Ok(Value::I64(ts.and_utc().timestamp_micros())),
                other => Err(Error::mismatch("timestamp", &other)),
            },
            Self::MicrosToTimestamp => match arg {
                Value::I64(micros) => DateTime::<Utc>::from_timestamp_micros(micros)
                    .map(|dt| Value::Timestamp(dt.naive_utc()))
                    .ok_or_else(|| Error::Codec(format!("timestamp {}us out of range", micros))),
                other => Err(Error::mismatch("micros since epoch (i64)", &other)),
            },
            Self::DecimalFromBig { precision, scale } => match arg {
                Value::Decimal(d) => fit_decimal(d, *precision, *scale),
                other => Err(Error::mismatch("decimal", &other)),
            },
            Self::DecimalToBig => match arg {
                Value::Decimal(_) => Ok(arg),
                other => Err(Error::mismatch("decimal", &other)),
            },
            Self::DecimalFromBigInt => match arg {
                Value::BigInt(i) => fit_decimal(Decimal::from_i128(i), MAX_PRECISION, 0),
                other => Err(Error::mismatch("bigint", &other)),
            },
            Self::DecimalToBigInt => match arg {
                Value::Decimal(d) => d
                    .rescale(0)
                    .map(|d| Value::BigInt(d.unscaled()))
                    .ok_or_else(|| Error::Codec(format!("decimal {} out of range", d))),
                other => Err(Error::mismatch("decimal", &other)),
            },
            Self::PrimitiveArrayToArrayData => arg
                .elements()
                .map(Value::Array)
                .ok_or_else(|| Error::mismatch("primitive collection", &arg)),
            Self::ToTypedArray(element) => match arg {
                Value::Array(items) => to_typed_array(*element, items),
                other => Err(Error::mismatch("array", &other)),
            },
            Self::ToSeq => match arg {
                Value::Array(items) => Ok(Value::Seq(items)),
                other => Err(Error::mismatch("array", &other)),
            },
            Self::ToSet => match arg {
                Value::Array(items) => Ok(Value::set(items)),
                other => Err(Error::mismatch("array", &other)),
            },
            Self::SetToSeq => match arg {
                Value::Set(items) => Ok(Value::Seq(items)),
                other => Err(Error::mismatch("set", &other)),
            },
        }
    }
}

fn check_primitive(kind: PrimitiveKind, value: Value) -> Result<Value> {
    let ok = matches!(
        (kind, &value),
        (PrimitiveKind::Bool, Value::Bool(_))
            | (PrimitiveKind::I8, Value::I8(_))
            | (PrimitiveKind::I16, Value::I16(_))
            | (PrimitiveKind::U8, Value::I16(_))
            | (PrimitiveKind::I32, Value::I32(_))
            | (PrimitiveKind::I64, Value::I64(_))
            | (PrimitiveKind::F32, Value::F32(_))
            | (PrimitiveKind::F64, Value::F64(_))
    );
    if ok {
        Ok(value)
    } else {
        Err(Error::mismatch(kind.rust_name(), &value))
    }
}

pub(super) fn fit_decimal(d: Decimal, precision: u8, scale: u8) -> Result<Value> {
    d.to_precision(precision, scale)
        .map(Value::Decimal)
        .ok_or_else(|| Error::DecimalOverflow {
            value: d.to_string(),
            precision,
            scale,
        })
}

macro_rules! collect_typed {
    ($items:expr, $variant:ident, $label:expr) => {
        $items
            .into_iter()
            .map(|item| match item {
                Value::$variant(v) => Ok(v),
                other => Err(Error::mismatch($label, &other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(|v| Value::NativeArray(NativeArray::$variant(v)))
    };
}

fn to_typed_array(element: ArrayElement, items: Vec<Value>) -> Result<Value> {
    match element {
        ArrayElement::Boolean => collect_typed!(items, Bool, "bool element"),
        ArrayElement::Byte => collect_typed!(items, I8, "i8 element"),
        ArrayElement::Short => collect_typed!(items, I16, "i16 element"),
        ArrayElement::Int => collect_typed!(items, I32, "i32 element"),
        ArrayElement::Long => collect_typed!(items, I64, "i64 element"),
        ArrayElement::Float => collect_typed!(items, F32, "f32 element"),
        ArrayElement::Double => collect_typed!(items, F64, "f64 element"),
        ArrayElement::Object => Ok(Value::NativeArray(NativeArray::Object(items))),
    }
}
