// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for class descriptors.

use crate::types::descriptor::{
    Annotation, ClassDef, Constructor, Factory, Invoker, Param, PrimitiveKind, TypeDescriptor,
    TypeKind, TypeRef, OUTER_PARAM,
};
use crate::udt::UserDefinedType;
use crate::value::Value;
use std::sync::Arc;

/// Builder for class descriptors.
///
/// Unless [`without_default_constructor`](Self::without_default_constructor)
/// is called, `build` adds a primary constructor taking every field in
/// declaration order (preceded by the outer instance for nested classes).
pub struct ClassBuilder {
    name: String,
    fields: Vec<Param>,
    constructors: Vec<Constructor>,
    factories: Vec<Factory>,
    supertypes: Vec<String>,
    outer: Option<TypeRef>,
    declared_layout: Option<Vec<Param>>,
    annotations: Vec<Annotation>,
    default_constructor: bool,
}

impl ClassBuilder {
    /// Create a new builder for a class type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructors: Vec::new(),
            factories: Vec::new(),
            supertypes: Vec::new(),
            outer: None,
            declared_layout: None,
            annotations: Vec::new(),
            default_constructor: true,
        }
    }

    /// Add a field with a type descriptor.
    pub fn field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(Param::new(name, ty));
        self
    }

    /// Add an unboxed primitive field.
    pub fn primitive_field(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        self.field(name, TypeDescriptor::primitive(kind))
    }

    /// Add a string field.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, TypeDescriptor::string())
    }

    /// Add an `Option<ty>` field.
    pub fn optional_field(self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.field(name, TypeDescriptor::option(ty))
    }

    /// Add a `Vec<ty>` field.
    pub fn seq_field(self, name: impl Into<String>, element: TypeRef) -> Self {
        self.field(name, TypeDescriptor::seq(element))
    }

    /// Declare a direct supertype.
    pub fn supertype(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    /// Declare the enclosing type of a nested class.
    pub fn outer(mut self, outer: TypeRef) -> Self {
        self.outer = Some(outer);
        self
    }

    /// Attach an annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Mark the class as serialized by an opaque codec.
    pub fn user_defined(self, udt: Arc<dyn UserDefinedType>) -> Self {
        self.annotate(Annotation::UserDefinedType(udt))
    }

    /// Declare an explicit struct layout, overriding constructor inference.
    pub fn declared_layout(mut self, layout: Vec<Param>) -> Self {
        self.declared_layout = Some(layout);
        self
    }

    /// Add an explicit constructor.
    pub fn constructor(mut self, params: Vec<Param>, invoker: Invoker) -> Self {
        self.constructors.push(Constructor::new(params, invoker));
        self
    }

    /// Add a companion factory.
    pub fn factory(mut self, name: impl Into<String>, params: Vec<Param>, invoker: Invoker) -> Self {
        self.factories.push(Factory::new(name, params, invoker));
        self
    }

    /// Add a companion factory taking every field and building an instance.
    pub fn instance_factory(self, name: impl Into<String>) -> Self {
        let params = self.fields.clone();
        let invoker = instance_invoker(&self.name, &params, false);
        self.factory(name, params, invoker)
    }

    /// Do not generate the primary constructor.
    pub fn without_default_constructor(mut self) -> Self {
        self.default_constructor = false;
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> TypeDescriptor {
        let mut constructors = Vec::with_capacity(self.constructors.len() + 1);
        if self.default_constructor {
            let nested = self.outer.is_some();
            let mut params = Vec::with_capacity(self.fields.len() + 1);
            if let Some(outer) = &self.outer {
                params.push(Param::new(OUTER_PARAM, outer.clone()));
            }
            params.extend(self.fields.iter().cloned());
            let invoker = instance_invoker(&self.name, &self.fields, nested);
            constructors.push(Constructor::new(params, invoker));
        }
        constructors.extend(self.constructors);

        let def = ClassDef {
            name: self.name.clone(),
            fields: self.fields,
            constructors,
            factories: self.factories,
            supertypes: self.supertypes,
            outer: self.outer,
            declared_layout: self.declared_layout,
        };
        let mut desc = TypeDescriptor::new(self.name, TypeKind::Class(Arc::new(def)));
        for annotation in self.annotations {
            desc = desc.with_annotation(annotation);
        }
        desc
    }

    /// Build into a shared handle.
    pub fn build_ref(self) -> TypeRef {
        Arc::new(self.build())
    }
}

/// Invoker assembling a [`Value::Object`] from positional arguments.
/// With `skip_outer`, the first argument (the outer instance) is ignored.
pub fn instance_invoker(class: &str, fields: &[Param], skip_outer: bool) -> Invoker {
    let class = class.to_string();
    let names: Vec<String> = fields.iter().map(|p| p.name.clone()).collect();
    Arc::new(move |args: Vec<Value>| {
        let mut args = args.into_iter();
        if skip_outer {
            args.next();
        }
        let fields = names.iter().cloned().zip(args).collect();
        Ok(Value::object(class.clone(), fields))
    })
}
