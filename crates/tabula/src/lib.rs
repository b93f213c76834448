// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Tabula - type-directed row codecs
//!
//! Derives a structural schema from a native type description and builds
//! the pair of conversion steps that move values between their native form
//! (records, optionals, collections, maps, temporals, opaque types) and a
//! tabular row representation.
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula::{Record, Result, TypedEncoder};
//!
//! #[derive(Debug, PartialEq, Record)]
//! struct Reading {
//!     sensor: String,
//!     celsius: f64,
//!     tags: Vec<String>,
//!     note: Option<String>,
//! }
//!
//! fn main() -> Result<()> {
//!     let encoder = TypedEncoder::<Reading>::new()?;
//!     let reading = Reading {
//!         sensor: "t-01".into(),
//!         celsius: 21.5,
//!         tags: vec!["lab".into()],
//!         note: None,
//!     };
//!     let row = encoder.encode(&reading)?;
//!     assert_eq!(row.len(), 4);
//!     assert_eq!(encoder.decode(&row)?, reading);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   RowEncoder / TypedEncoder        (schema + serializer + deserializer)
//! +---------------------------------------------------------------------+
//! |   schema_for | build_serializer | build_deserializer                 |
//! |        shape classification, constructor resolution, type paths      |
//! +---------------------------------------------------------------------+
//! |   types: descriptors, reflect facade, Introspect, #[derive(Record)]  |
//! +---------------------------------------------------------------------+
//! |   expr: conversion steps + evaluator   |   value / row / decimal     |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - type descriptors and the reflection facade
//! - [`schema`] - structural schemas and the schema resolver
//! - [`serializer`] / [`deserializer`] - codec builders
//! - [`expr`] - conversion steps and their evaluator
//! - [`encoder`] - row-level encoders
//! - [`udt`] - opaque user-defined types

// Allow the derive macro to work inside this crate's tests
extern crate self as tabula;

/// Codec configuration (decimal layout, reserved names).
pub mod config;
/// Constructor and factory resolution for record types.
pub mod constructor;
/// Fixed-point decimal.
pub mod decimal;
/// Deserializer builder.
pub mod deserializer;
/// Row encoders.
pub mod encoder;
/// Error type.
pub mod error;
/// Conversion steps.
pub mod expr;
/// Rust value bridging.
pub mod native;
/// Type-path breadcrumbs for diagnostics.
pub mod path;
/// Row storage.
pub mod row;
/// Structural schemas.
pub mod schema;
/// Serializer builder.
pub mod serializer;
/// Shape classification.
pub mod shape;
/// Runtime type information.
pub mod types;
/// Opaque user-defined types.
pub mod udt;
/// Runtime values.
pub mod value;

pub use decimal::Decimal;
pub use deserializer::build_deserializer;
pub use encoder::{RowEncoder, TypedEncoder};
pub use error::{Error, Result};
pub use native::{FromNative, ToNative};
pub use row::{MapData, Row, RowAccess};
pub use schema::{is_record_like_type, schema_for, DataType, Schema, StructField};
pub use serializer::build_serializer;
pub use types::{Introspect, TypeDescriptor, TypeRef};
pub use value::Value;

// Derive macro (for #[derive(tabula::Record)])
pub use tabula_codegen::Record;

#[cfg(test)]
mod tests {
    use crate::{Record, TypedEncoder};

    #[derive(Debug, PartialEq, Record)]
    struct Sample {
        id: i32,
        label: Option<String>,
    }

    #[test]
    fn test_derive_inside_crate() {
        let encoder = TypedEncoder::<Sample>::new().expect("encoder");
        let sample = Sample {
            id: 7,
            label: Some("seven".into()),
        };
        let row = encoder.encode(&sample).expect("encode");
        assert_eq!(encoder.decode(&row), Ok(sample));
    }
}
