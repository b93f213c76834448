// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor facade.
//!
//! Queries over type descriptors: subtyping, dealiasing, type arguments,
//! annotations and constructor layout. Class descriptors live in a
//! process-wide *type universe* keyed by class name; late-bound
//! [`TypeKind::Ref`] descriptors resolve through it.
//!
//! The universe and the subtype memo table are guarded by one re-entrant
//! lock. Every public query takes the lock for its whole duration, so a
//! query that recurses into other queries observes a consistent universe.
//! The inner `RefCell` is only ever borrowed for a single table access and
//! never across a nested query.

use crate::error::{Error, Result};
use crate::types::descriptor::{Param, TypeDescriptor, TypeKind, TypeRef};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

#[derive(Default)]
struct Session {
    universe: HashMap<String, TypeRef>,
    in_progress: HashSet<String>,
    subtype_memo: HashMap<(String, String), bool>,
}

static SESSION: OnceLock<ReentrantMutex<RefCell<Session>>> = OnceLock::new();

fn session() -> &'static ReentrantMutex<RefCell<Session>> {
    SESSION.get_or_init(|| ReentrantMutex::new(RefCell::new(Session::default())))
}

/// Register a class (or alias) in the type universe, replacing any previous
/// descriptor with the same name.
pub fn register_class(ty: TypeRef) {
    let guard = session().lock();
    log::trace!("[reflect] register {}", ty.name());
    let mut state = guard.borrow_mut();
    state.universe.insert(ty.name().to_string(), ty);
    state.subtype_memo.clear();
}

/// Look up a class of the type universe by name.
pub fn lookup_class(name: &str) -> Option<TypeRef> {
    let guard = session().lock();
    let found = guard.borrow().universe.get(name).cloned();
    found
}

/// Describe a class exactly once.
///
/// Returns the registered descriptor if `name` is already known. While
/// `build` runs, nested requests for the same name return a
/// [`TypeKind::Ref`] placeholder, which lets self-referential types be
/// described.
pub fn describe_class(name: &str, build: impl FnOnce() -> TypeRef) -> TypeRef {
    let guard = session().lock();
    {
        let state = guard.borrow();
        if let Some(existing) = state.universe.get(name) {
            return existing.clone();
        }
        if state.in_progress.contains(name) {
            return TypeDescriptor::class_ref(name);
        }
    }
    guard.borrow_mut().in_progress.insert(name.to_string());

    let ty = build();

    let mut state = guard.borrow_mut();
    state.in_progress.remove(name);
    state.universe.insert(name.to_string(), ty.clone());
    state.subtype_memo.clear();
    log::debug!("[reflect] described class {}", name);
    ty
}

/// Strip aliases and resolve late-bound references.
///
/// A reference to a class that was never registered is returned unchanged.
pub fn dealias(ty: &TypeRef) -> TypeRef {
    let _guard = session().lock();
    let mut current = ty.clone();
    loop {
        let next = match current.kind() {
            TypeKind::Alias(target) => target.clone(),
            TypeKind::Ref(name) => match lookup_class(name) {
                Some(resolved) if !is_ref(&resolved) => resolved,
                _ => return current,
            },
            _ => return current,
        };
        current = next;
    }
}

fn is_ref(ty: &TypeRef) -> bool {
    matches!(ty.kind(), TypeKind::Ref(_))
}

/// True if a value of type `a` can be used where `b` is expected.
pub fn is_subtype(a: &TypeRef, b: &TypeRef) -> bool {
    let guard = session().lock();
    let a = dealias(a);
    let b = dealias(b);
    let key = (a.name().to_string(), b.name().to_string());

    let cached = guard.borrow().subtype_memo.get(&key).copied();
    if let Some(answer) = cached {
        return answer;
    }

    let answer = compute_subtype(&a, &b);
    guard.borrow_mut().subtype_memo.insert(key, answer);
    answer
}

fn compute_subtype(a: &TypeRef, b: &TypeRef) -> bool {
    if a.name() == b.name() {
        return true;
    }
    match (a.kind(), b.kind()) {
        (_, TypeKind::Any) => true,
        (TypeKind::Null, _) => !b.is_primitive(),
        (TypeKind::Option(x), TypeKind::Option(y)) | (TypeKind::Seq(x), TypeKind::Seq(y)) => {
            is_subtype(x, y)
        }
        (
            TypeKind::Map {
                key: k1,
                value: v1,
                kind: m1,
            },
            TypeKind::Map {
                key: k2,
                value: v2,
                kind: m2,
            },
        ) => m1 == m2 && dealias(k1).name() == dealias(k2).name() && is_subtype(v1, v2),
        (TypeKind::Class(def), _) => def.supertypes().iter().any(|parent| {
            parent == b.name()
                || lookup_class(parent).map_or(false, |parent_ty| is_subtype(&parent_ty, b))
        }),
        _ => false,
    }
}

/// Type arguments of a parametric type.
pub fn type_arguments(ty: &TypeRef) -> Result<Vec<TypeRef>> {
    let ty = dealias(ty);
    match ty.kind() {
        TypeKind::Option(t) | TypeKind::Array(t) | TypeKind::Seq(t) | TypeKind::Set(t) => {
            Ok(vec![t.clone()])
        }
        TypeKind::Map { key, value, .. } => Ok(vec![key.clone(), value.clone()]),
        _ => Err(Error::ShapeMismatch {
            type_name: ty.name().to_string(),
            expected: "a parametric type",
        }),
    }
}

/// Erased class name: the type name without type arguments.
pub fn class_name(ty: &TypeRef) -> String {
    let ty = dealias(ty);
    let name = ty.name();
    match name.find('<') {
        Some(pos) if pos > 0 => name[..pos].to_string(),
        _ => name.to_string(),
    }
}

/// True if the (dealiased) type carries an annotation with this marker.
pub fn has_annotation(ty: &TypeRef, marker: &str) -> bool {
    dealias(ty)
        .annotations()
        .iter()
        .any(|annotation| annotation.marker() == marker)
}

/// Construction layout of a class: primary constructor parameters in
/// declaration order, else the best `apply`/`create` factory, else the
/// externally declared layout. A declared layout wins when present.
pub fn constructor_parameters(ty: &TypeRef) -> Result<Vec<Param>> {
    let ty = dealias(ty);
    let def = ty.class_def().ok_or_else(|| Error::ShapeMismatch {
        type_name: ty.name().to_string(),
        expected: "a class",
    })?;
    def.constructor_parameters()
        .map(<[Param]>::to_vec)
        .ok_or_else(|| Error::ShapeMismatch {
            type_name: ty.name().to_string(),
            expected: "a constructible class",
        })
}
