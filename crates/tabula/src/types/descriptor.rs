// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use crate::error::Result;
use crate::udt::UserDefinedType;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a type descriptor.
pub type TypeRef = Arc<TypeDescriptor>;

/// Name of the synthetic leading constructor parameter of nested classes.
pub const OUTER_PARAM: &str = "$outer";

/// Marker reported by [`Annotation::UserDefinedType`].
pub const USER_DEFINED_TYPE_MARKER: &str = "UserDefinedType";

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Unsigned byte; the element type of byte sequences.
    U8,
}

impl PrimitiveKind {
    /// Rust spelling of the primitive.
    pub fn rust_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::U8 => "u8",
        }
    }
}

/// Arbitrary-precision numeric flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecimalKind {
    /// Fractional decimal, stored with the configured precision/scale.
    BigDecimal,
    /// Integral value, stored as `DECIMAL(38, 0)`.
    BigInteger,
}

/// Concrete native map flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// Unordered (`HashMap`).
    Hash,
    /// Key-ordered (`BTreeMap`).
    Sorted,
}

/// Type kind enumeration.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// The type of the null literal.
    Null,
    /// Top type; every type is a subtype of it.
    Any,
    /// Unboxed primitive, cannot be absent.
    Primitive(PrimitiveKind),
    /// Nullable wrapper around a primitive.
    Boxed(PrimitiveKind),
    String,
    Binary,
    Date,
    Timestamp,
    Decimal(DecimalKind),
    Option(TypeRef),
    /// Native fixed-size array.
    Array(TypeRef),
    Seq(TypeRef),
    Set(TypeRef),
    Map {
        key: TypeRef,
        value: TypeRef,
        kind: MapKind,
    },
    Class(Arc<ClassDef>),
    /// Alternative name for another type.
    Alias(TypeRef),
    /// Late-bound reference to a class registered in the type universe.
    Ref(String),
}

/// Annotation attached to a type.
#[derive(Clone)]
pub enum Annotation {
    /// The type is serialized by the carried opaque codec.
    UserDefinedType(Arc<dyn UserDefinedType>),
    /// Free-form marker.
    Marker(String),
}

impl Annotation {
    /// Marker name used by `has_annotation`.
    pub fn marker(&self) -> &str {
        match self {
            Self::UserDefinedType(_) => USER_DEFINED_TYPE_MARKER,
            Self::Marker(name) => name,
        }
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserDefinedType(udt) => write!(f, "UserDefinedType({})", udt.user_class()),
            Self::Marker(name) => write!(f, "Marker({})", name),
        }
    }
}

/// A complete type descriptor.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    annotations: Vec<Annotation>,
}

impl PartialEq for TypeDescriptor {
    /// Descriptors are identified by name.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
        }
    }

    /// Attach an annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Type name (identity).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type kind.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Attached annotations.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Class definition, if this is a class.
    pub fn class_def(&self) -> Option<&Arc<ClassDef>> {
        match &self.kind {
            TypeKind::Class(def) => Some(def),
            _ => None,
        }
    }

    /// Check if this is an unboxed primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    /// The null type.
    pub fn null() -> TypeRef {
        Arc::new(Self::new("Null", TypeKind::Null))
    }

    /// The top type.
    pub fn any() -> TypeRef {
        Arc::new(Self::new("Any", TypeKind::Any))
    }

    /// Unboxed primitive.
    pub fn primitive(kind: PrimitiveKind) -> TypeRef {
        Arc::new(Self::new(kind.rust_name(), TypeKind::Primitive(kind)))
    }

    /// Nullable boxed primitive.
    pub fn boxed(kind: PrimitiveKind) -> TypeRef {
        Arc::new(Self::new(
            format!("Boxed<{}>", kind.rust_name()),
            TypeKind::Boxed(kind),
        ))
    }

    /// UTF-8 string.
    pub fn string() -> TypeRef {
        Arc::new(Self::new("String", TypeKind::String))
    }

    /// Raw bytes.
    pub fn binary() -> TypeRef {
        Arc::new(Self::new("Bytes", TypeKind::Binary))
    }

    /// Calendar date.
    pub fn date() -> TypeRef {
        Arc::new(Self::new("NaiveDate", TypeKind::Date))
    }

    /// Date and time without zone.
    pub fn timestamp() -> TypeRef {
        Arc::new(Self::new("NaiveDateTime", TypeKind::Timestamp))
    }

    /// Fractional decimal.
    pub fn decimal() -> TypeRef {
        Arc::new(Self::new(
            "Decimal",
            TypeKind::Decimal(DecimalKind::BigDecimal),
        ))
    }

    /// Integral big number.
    pub fn big_integer() -> TypeRef {
        Arc::new(Self::new(
            "i128",
            TypeKind::Decimal(DecimalKind::BigInteger),
        ))
    }

    /// Optional wrapper.
    pub fn option(inner: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("Option<{}>", inner.name),
            TypeKind::Option(inner),
        ))
    }

    /// Native fixed-size array.
    pub fn array(element: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("Box<[{}]>", element.name),
            TypeKind::Array(element),
        ))
    }

    /// Growable sequence.
    pub fn seq(element: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("Vec<{}>", element.name),
            TypeKind::Seq(element),
        ))
    }

    /// Set.
    pub fn set(element: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("HashSet<{}>", element.name),
            TypeKind::Set(element),
        ))
    }

    /// Unordered map.
    pub fn map(key: TypeRef, value: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("HashMap<{}, {}>", key.name, value.name),
            TypeKind::Map {
                key,
                value,
                kind: MapKind::Hash,
            },
        ))
    }

    /// Key-ordered map.
    pub fn sorted_map(key: TypeRef, value: TypeRef) -> TypeRef {
        Arc::new(Self::new(
            format!("BTreeMap<{}, {}>", key.name, value.name),
            TypeKind::Map {
                key,
                value,
                kind: MapKind::Sorted,
            },
        ))
    }

    /// Named alias for `target`.
    pub fn alias(name: impl Into<String>, target: TypeRef) -> TypeRef {
        Arc::new(Self::new(name, TypeKind::Alias(target)))
    }

    /// Late-bound reference to a class of the type universe.
    pub fn class_ref(name: impl Into<String>) -> TypeRef {
        let name = name.into();
        Arc::new(Self::new(name.clone(), TypeKind::Ref(name)))
    }
}

/// Named, typed parameter or field.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeRef,
}

impl Param {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Callable building a native value from positional arguments.
pub type Invoker = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Directly declared constructor.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<Param>,
    invoker: Invoker,
}

impl Constructor {
    /// Create a constructor.
    pub fn new(params: Vec<Param>, invoker: Invoker) -> Self {
        Self { params, invoker }
    }

    /// Formal parameters.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Underlying callable.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &param_names(&self.params))
            .finish()
    }
}

/// Companion factory function (`apply`, `create`, ...).
#[derive(Clone)]
pub struct Factory {
    name: String,
    params: Vec<Param>,
    invoker: Invoker,
}

impl Factory {
    /// Create a factory.
    pub fn new(name: impl Into<String>, params: Vec<Param>, invoker: Invoker) -> Self {
        Self {
            name: name.into(),
            params,
            invoker,
        }
    }

    /// Factory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal parameters (without receiver).
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Underlying callable.
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("params", &param_names(&self.params))
            .finish()
    }
}

fn param_names(params: &[Param]) -> Vec<String> {
    params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty.name()))
        .collect()
}

/// Names of companion factories the constructor resolver considers.
pub const FACTORY_NAMES: [&str; 2] = ["apply", "create"];

/// Class definition: fields, construction paths and hierarchy.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub(crate) name: String,
    pub(crate) fields: Vec<Param>,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) factories: Vec<Factory>,
    pub(crate) supertypes: Vec<String>,
    pub(crate) outer: Option<TypeRef>,
    pub(crate) declared_layout: Option<Vec<Param>>,
}

impl ClassDef {
    /// Class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields (accessors) in declaration order.
    pub fn fields(&self) -> &[Param] {
        &self.fields
    }

    /// Directly declared constructors, primary first.
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// Companion factories in declaration order.
    pub fn factories(&self) -> &[Factory] {
        &self.factories
    }

    /// Names of direct supertypes.
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    /// Enclosing type for nested classes.
    pub fn outer(&self) -> Option<&TypeRef> {
        self.outer.as_ref()
    }

    /// Externally declared struct layout, if any.
    pub fn declared_layout(&self) -> Option<&[Param]> {
        self.declared_layout.as_deref()
    }

    /// Primary constructor parameters, without the synthetic outer parameter.
    pub fn primary_params(&self) -> Option<&[Param]> {
        let params = self.constructors.first()?.params();
        match params.first() {
            Some(first) if first.name == OUTER_PARAM => Some(&params[1..]),
            _ => Some(params),
        }
    }

    /// Parameters of the first `apply`/`create` companion factory.
    pub fn factory_params(&self) -> Option<&[Param]> {
        self.factories
            .iter()
            .find(|f| FACTORY_NAMES.contains(&f.name()))
            .map(Factory::params)
    }

    /// Layout used to decompose the class into fields: the externally
    /// declared layout, else the primary constructor, else the best factory.
    pub fn constructor_parameters(&self) -> Option<&[Param]> {
        self.declared_layout()
            .or_else(|| self.primary_params())
            .or_else(|| self.factory_params())
    }

    /// True when the class is fully described by its construction layout.
    pub fn is_record(&self) -> bool {
        if self.declared_layout.is_some() {
            return true;
        }
        let Some(params) = self.constructor_parameters() else {
            return false;
        };
        params.len() == self.fields.len()
            && params
                .iter()
                .zip(&self.fields)
                .all(|(p, f)| p.name == f.name && p.ty.name() == f.ty.name())
    }
}
