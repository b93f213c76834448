// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Constructor resolution.
//!
//! Given a class and the types of the values that will be supplied, pick
//! the callable that builds an instance:
//!
//! 1. the first declared constructor whose parameters each accept the
//!    corresponding argument (subtype or boxing-compatible);
//! 2. else the first `apply`/`create` companion factory whose parameter
//!    types match the arguments by erased class name, either exactly or
//!    after skipping the first argument (the outer instance);
//! 3. at call time a factory handed one argument too many drops the first.
//!
//! Nested classes need their enclosing instance; those are looked up in the
//! outer-scope registry.

use crate::error::{Error, Result};
use crate::types::{
    class_name, dealias, is_subtype, Invoker, TypeKind, TypeRef, FACTORY_NAMES,
};
use crate::value::Value;
use dashmap::DashMap;
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone)]
enum Target {
    Constructor,
    Factory(String),
}

/// Callable chosen by [`resolve`].
#[derive(Clone)]
pub struct ResolvedConstructor {
    class: String,
    target: Target,
    arity: usize,
    invoker: Invoker,
}

impl ResolvedConstructor {
    /// Class being built.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Name of the factory, if the factory tier was used.
    pub fn factory_name(&self) -> Option<&str> {
        match &self.target {
            Target::Constructor => None,
            Target::Factory(name) => Some(name),
        }
    }

    /// Number of formal parameters.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Call with positional arguments.
    pub fn invoke(&self, mut args: Vec<Value>) -> Result<Value> {
        if matches!(self.target, Target::Factory(_)) && args.len() == self.arity + 1 {
            log::trace!(
                "[ctor] {} factory drops leading outer argument",
                self.class
            );
            args.remove(0);
        }
        if args.len() != self.arity {
            return Err(Error::Codec(format!(
                "{} expects {} arguments, got {}",
                self, self.arity, args.len()
            )));
        }
        (self.invoker)(args)
    }
}

impl fmt::Display for ResolvedConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Constructor => write!(f, "new {}", self.class),
            Target::Factory(name) => write!(f, "{}::{}", self.class, name),
        }
    }
}

impl fmt::Debug for ResolvedConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolvedConstructor({}/{})", self, self.arity)
    }
}

fn boxing_compatible(param: &TypeRef, arg: &TypeRef) -> bool {
    match (dealias(param).kind(), dealias(arg).kind()) {
        (TypeKind::Primitive(a), TypeKind::Boxed(b)) | (TypeKind::Boxed(a), TypeKind::Primitive(b)) => {
            a == b
        }
        _ => false,
    }
}

fn assignable(param: &TypeRef, arg: &TypeRef) -> bool {
    is_subtype(arg, param) || boxing_compatible(param, arg)
}

/// Pick the constructor or factory of `class_ty` accepting `argument_shapes`.
pub fn resolve(class_ty: &TypeRef, argument_shapes: &[TypeRef]) -> Result<ResolvedConstructor> {
    let ty = dealias(class_ty);
    let def = ty.class_def().ok_or_else(|| Error::ShapeMismatch {
        type_name: ty.name().to_string(),
        expected: "a class",
    })?;

    for ctor in def.constructors() {
        let params = ctor.params();
        if params.len() == argument_shapes.len()
            && params
                .iter()
                .zip(argument_shapes)
                .all(|(param, arg)| assignable(&param.ty, arg))
        {
            log::trace!("[ctor] {} resolved to constructor/{}", def.name(), params.len());
            return Ok(ResolvedConstructor {
                class: def.name().to_string(),
                target: Target::Constructor,
                arity: params.len(),
                invoker: ctor.invoker().clone(),
            });
        }
    }

    let symbols: Vec<String> = argument_shapes.iter().map(class_name).collect();
    for factory in def
        .factories()
        .iter()
        .filter(|f| FACTORY_NAMES.contains(&f.name()))
    {
        let params: Vec<String> = factory.params().iter().map(|p| class_name(&p.ty)).collect();
        let exact = params == symbols;
        let skipping_outer = symbols.len() == params.len() + 1 && params[..] == symbols[1..];
        if exact || skipping_outer {
            log::warn!(
                "[ctor] no constructor of {} accepts ({}); using factory {}",
                def.name(),
                symbols.join(", "),
                factory.name()
            );
            return Ok(ResolvedConstructor {
                class: def.name().to_string(),
                target: Target::Factory(factory.name().to_string()),
                arity: params.len(),
                invoker: factory.invoker().clone(),
            });
        }
    }

    Err(Error::NoMatchingConstructor {
        type_name: def.name().to_string(),
        argument_shapes: argument_shapes.iter().map(|t| t.name().to_string()).collect(),
    })
}

static OUTER_SCOPES: OnceLock<DashMap<String, Value>> = OnceLock::new();

fn outer_scopes() -> &'static DashMap<String, Value> {
    OUTER_SCOPES.get_or_init(DashMap::new)
}

/// Register the enclosing instance used to build classes nested in `outer_class`.
pub fn register_outer_scope(outer_class: impl Into<String>, instance: Value) {
    let outer_class = outer_class.into();
    log::debug!("[ctor] registered outer scope {}", outer_class);
    outer_scopes().insert(outer_class, instance);
}

/// Enclosing instance registered for `outer_class`.
pub fn outer_scope_for(outer_class: &str) -> Option<Value> {
    outer_scopes().get(outer_class).map(|entry| entry.value().clone())
}

/// Forget the enclosing instance registered for `outer_class`.
pub fn remove_outer_scope(outer_class: &str) -> Option<Value> {
    outer_scopes().remove(outer_class).map(|(_, v)| v)
}
