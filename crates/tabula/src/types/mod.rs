// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! - **TypeDescriptor**: name, kind and annotations of a native type
//! - **ClassBuilder**: fluent interface for class descriptors
//! - **Introspect**: descriptors for Rust types, derived for structs
//! - **reflect**: subtyping, dealiasing and layout queries over the
//!   process-wide type universe
//!
//! # Example
//!
//! ```rust
//! use tabula::types::{ClassBuilder, PrimitiveKind, TypeDescriptor};
//!
//! let reading = ClassBuilder::new("SensorReading")
//!     .primitive_field("sensor_id", PrimitiveKind::I32)
//!     .field("temperature", TypeDescriptor::option(TypeDescriptor::primitive(PrimitiveKind::F64)))
//!     .build_ref();
//!
//! let params = tabula::types::constructor_parameters(&reading).unwrap();
//! assert_eq!(params[0].name, "sensor_id");
//! ```

mod builder;
mod descriptor;
mod introspect;
mod reflect;

pub use builder::{instance_invoker, ClassBuilder};
pub use descriptor::{
    Annotation, ClassDef, Constructor, DecimalKind, Factory, Invoker, MapKind, Param,
    PrimitiveKind, TypeDescriptor, TypeKind, TypeRef, FACTORY_NAMES, OUTER_PARAM,
    USER_DEFINED_TYPE_MARKER,
};
pub use introspect::Introspect;
pub(crate) use introspect::tuple_name;
pub use reflect::{
    class_name, constructor_parameters, dealias, describe_class, has_annotation, is_subtype,
    lookup_class, register_class, type_arguments,
};
