// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! User-defined (opaque) types.
//!
//! An opaque type is serialized by its own codec instead of structural
//! decomposition. A type opts in either by carrying an
//! [`Annotation::UserDefinedType`](crate::types::Annotation) or by being
//! registered here under its class name.

use crate::error::Result;
use crate::schema::DataType;
use crate::value::Value;
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Codec for an opaque type.
pub trait UserDefinedType: Send + Sync {
    /// Structured type the codec produces.
    fn sql_type(&self) -> DataType;

    /// Class name of the native type.
    fn user_class(&self) -> &str;

    /// Native value to structured value.
    fn serialize(&self, value: &Value) -> Result<Value>;

    /// Structured value to native value.
    fn deserialize(&self, datum: &Value) -> Result<Value>;
}

type Registry = DashMap<String, Arc<dyn UserDefinedType>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(DashMap::new)
}

/// Register the codec for `class`, replacing any previous one.
pub fn register(class: impl Into<String>, udt: Arc<dyn UserDefinedType>) {
    let class = class.into();
    log::debug!("[udt] registered codec for {}", class);
    registry().insert(class, udt);
}

/// Codec registered for `class`.
pub fn lookup(class: &str) -> Option<Arc<dyn UserDefinedType>> {
    registry().get(class).map(|entry| Arc::clone(entry.value()))
}

/// True if a codec is registered for `class`.
pub fn exists(class: &str) -> bool {
    registry().contains_key(class)
}

/// Remove the codec registered for `class`.
pub fn unregister(class: &str) -> Option<Arc<dyn UserDefinedType>> {
    registry().remove(class).map(|(_, udt)| udt)
}
