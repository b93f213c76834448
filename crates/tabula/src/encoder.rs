// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoders bundling a schema with its serializer and deserializer.
//!
//! Record types are flattened: each field becomes a top-level column.
//! Any other type is stored in a single column named `value`.

use crate::config::{self, CodecConfig};
use crate::deserializer::build_deserializer_with_config;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::native::{FromNative, ToNative};
use crate::row::Row;
use crate::schema::{schema_for_with_config, DataType, StructField};
use crate::serializer::build_serializer_with_config;
use crate::shape::{classify, Shape};
use crate::types::{Introspect, TypeRef};
use crate::value::Value;
use std::marker::PhantomData;

/// Column name used for non-record types.
pub const VALUE_COLUMN: &str = "value";

/// Encoder between native values of one type and rows.
#[derive(Debug, Clone)]
pub struct RowEncoder {
    ty: TypeRef,
    fields: Vec<StructField>,
    flat: bool,
    serializer: Expr,
    deserializer: Expr,
}

impl RowEncoder {
    /// Build with the process-wide configuration.
    pub fn for_type(ty: &TypeRef) -> Result<Self> {
        Self::with_config(ty, &config::current())
    }

    /// Build with an explicit configuration.
    pub fn with_config(ty: &TypeRef, config: &CodecConfig) -> Result<Self> {
        config.validate()?;
        let schema = schema_for_with_config(ty, config)?;
        let serializer = build_serializer_with_config(ty, config)?;
        let deserializer = build_deserializer_with_config(ty, config)?;

        let flat = matches!(classify(ty), Shape::Record { .. });
        let fields = match schema.data_type {
            DataType::Struct(fields) if flat => fields,
            data_type => vec![StructField::new(VALUE_COLUMN, data_type, schema.nullable)],
        };
        log::debug!(
            "[encoder] {} -> {} column(s){}",
            ty.name(),
            fields.len(),
            if flat { " (flattened)" } else { "" }
        );
        Ok(Self {
            ty: ty.clone(),
            fields,
            flat,
            serializer,
            deserializer,
        })
    }

    /// Native type.
    pub fn native_type(&self) -> &TypeRef {
        &self.ty
    }

    /// Top-level columns.
    pub fn schema(&self) -> &[StructField] {
        &self.fields
    }

    /// Serializer step.
    pub fn serializer(&self) -> &Expr {
        &self.serializer
    }

    /// Deserializer step.
    pub fn deserializer(&self) -> &Expr {
        &self.deserializer
    }

    /// Native value to row.
    pub fn to_row(&self, value: &Value) -> Result<Row> {
        let out = self.serializer.eval(&Row::single(value.clone()))?;
        if !self.flat {
            return Ok(Row::single(out));
        }
        match out {
            Value::Row(row) => Ok(row),
            Value::Null => Err(Error::NullValue {
                path: "top level row object".into(),
            }),
            other => Err(Error::mismatch("struct", &other)),
        }
    }

    /// Row to native value.
    pub fn from_row(&self, row: &Row) -> Result<Value> {
        if row.len() != self.fields.len() {
            return Err(Error::InvalidRow(format!(
                "expected {} columns for {}, got {}",
                self.fields.len(),
                self.ty.name(),
                row.len()
            )));
        }
        if self.flat {
            self.deserializer.eval(&Row::single(Value::Row(row.clone())))
        } else {
            self.deserializer.eval(row)
        }
    }
}

/// Encoder between a Rust type and rows.
#[derive(Debug, Clone)]
pub struct TypedEncoder<T> {
    inner: RowEncoder,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Introspect + ToNative + FromNative> TypedEncoder<T> {
    /// Build with the process-wide configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&config::current())
    }

    /// Build with an explicit configuration.
    pub fn with_config(config: &CodecConfig) -> Result<Self> {
        Ok(Self {
            inner: RowEncoder::with_config(&T::type_descriptor(), config)?,
            _marker: PhantomData,
        })
    }

    /// Top-level columns.
    pub fn schema(&self) -> &[StructField] {
        self.inner.schema()
    }

    /// Untyped encoder.
    pub fn row_encoder(&self) -> &RowEncoder {
        &self.inner
    }

    pub fn encode(&self, value: &T) -> Result<Row> {
        self.inner.to_row(&value.to_native())
    }

    pub fn decode(&self, row: &Row) -> Result<T> {
        T::from_native(self.inner.from_row(row)?)
    }
}
