// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion steps.
//!
//! A codec is a tree of [`Expr`] nodes built once per root type and
//! evaluated against an input [`Row`](crate::row::Row) with
//! [`Expr::eval`]. Trees are immutable and can be shared across threads.

mod eval;
mod function;

pub use function::{ArrayElement, Function};

use crate::constructor::ResolvedConstructor;
use crate::schema::{DataType, OpaqueType};
use crate::types::{MapKind, TypeRef};
use crate::value::Value;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Static type of the value a step produces.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// Native value of the given type.
    Object(TypeRef),
    /// Structured value of the given column type.
    Physical(DataType),
}

/// Direction of an opaque codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdtOp {
    Serialize,
    Deserialize,
}

/// Conversion step.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Constant.
    Literal(Value),
    /// Column `ordinal` of the input row.
    Input {
        ordinal: usize,
        declared: DeclaredType,
    },
    /// Variable bound by an enclosing `MapObjects` or map conversion.
    LambdaVar { id: usize, declared: DeclaredType },
    /// Field of a structured row, by ordinal.
    GetStructField {
        child: Box<Expr>,
        ordinal: usize,
        name: String,
    },
    /// Named accessor of a native instance.
    GetField {
        child: Box<Expr>,
        name: String,
        declared: TypeRef,
    },
    /// Built-in conversion.
    Invoke {
        function: Function,
        child: Box<Expr>,
    },
    /// Construct a native instance.
    NewInstance {
        constructor: ResolvedConstructor,
        args: Vec<Expr>,
    },
    /// Build a structured row from named fields.
    CreateStruct { fields: Vec<(String, Expr)> },
    If {
        predicate: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    IsNull(Box<Expr>),
    /// Fail with the recorded path if the child is null.
    AssertNotNull { child: Box<Expr>, path: String },
    /// Apply `body` to every element of `collection`, binding `var`.
    /// Produces a structured array.
    MapObjects {
        var: usize,
        body: Box<Expr>,
        collection: Box<Expr>,
    },
    /// Native map to structured map data. A null converted key always
    /// fails; a null converted value fails unless `value_nullable`.
    ExternalMapToCatalyst {
        map: Box<Expr>,
        key_var: usize,
        key: Box<Expr>,
        key_nullable: bool,
        value_var: usize,
        value: Box<Expr>,
        value_nullable: bool,
    },
    /// Structured map data to native map.
    CatalystToExternalMap {
        map: Box<Expr>,
        key_var: usize,
        key: Box<Expr>,
        value_var: usize,
        value: Box<Expr>,
        kind: MapKind,
    },
    /// Native optional to its payload or null.
    UnwrapOption(Box<Expr>),
    /// Nullable value to native optional.
    WrapOption(Box<Expr>),
    /// Lossless numeric widening to the column type.
    Upcast { child: Box<Expr>, to: DataType },
    /// Opaque codec call.
    Opaque {
        udt: OpaqueType,
        op: UdtOp,
        child: Box<Expr>,
    },
}

static NEXT_LAMBDA_ID: AtomicUsize = AtomicUsize::new(0);

/// Fresh lambda variable id.
pub fn fresh_lambda_id() -> usize {
    NEXT_LAMBDA_ID.fetch_add(1, Ordering::Relaxed)
}

impl Expr {
    pub fn literal(value: Value) -> Self {
        Self::Literal(value)
    }

    pub fn null() -> Self {
        Self::Literal(Value::Null)
    }

    pub fn input(ordinal: usize, declared: DeclaredType) -> Self {
        Self::Input { ordinal, declared }
    }

    /// Lambda variable; ids come from [`fresh_lambda_id`].
    pub fn lambda_var(id: usize, declared: DeclaredType) -> Self {
        Self::LambdaVar { id, declared }
    }

    pub fn get_struct_field(self, ordinal: usize, name: impl Into<String>) -> Self {
        Self::GetStructField {
            child: Box::new(self),
            ordinal,
            name: name.into(),
        }
    }

    pub fn get_field(self, name: impl Into<String>, declared: TypeRef) -> Self {
        Self::GetField {
            child: Box::new(self),
            name: name.into(),
            declared,
        }
    }

    pub fn invoke(self, function: Function) -> Self {
        Self::Invoke {
            function,
            child: Box::new(self),
        }
    }

    pub fn new_instance(constructor: ResolvedConstructor, args: Vec<Expr>) -> Self {
        Self::NewInstance { constructor, args }
    }

    pub fn create_struct(fields: Vec<(String, Expr)>) -> Self {
        Self::CreateStruct { fields }
    }

    pub fn if_else(predicate: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::If {
            predicate: Box::new(predicate),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn is_null(self) -> Self {
        Self::IsNull(Box::new(self))
    }

    pub fn assert_not_null(self, path: impl Into<String>) -> Self {
        Self::AssertNotNull {
            child: Box::new(self),
            path: path.into(),
        }
    }

    /// Map `body` over `collection`, binding lambda variable `var`.
    pub fn map_objects(var: usize, body: Expr, collection: Expr) -> Self {
        Self::MapObjects {
            var,
            body: Box::new(body),
            collection: Box::new(collection),
        }
    }

    pub fn unwrap_option(self) -> Self {
        Self::UnwrapOption(Box::new(self))
    }

    pub fn wrap_option(self) -> Self {
        Self::WrapOption(Box::new(self))
    }

    pub fn upcast(self, to: DataType) -> Self {
        Self::Upcast {
            child: Box::new(self),
            to,
        }
    }

    pub fn opaque(self, udt: OpaqueType, op: UdtOp) -> Self {
        Self::Opaque {
            udt,
            op,
            child: Box::new(self),
        }
    }

    /// Id of a lambda variable.
    pub fn lambda_id(&self) -> Option<usize> {
        match self {
            Self::LambdaVar { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Declared type of leaf and accessor steps.
    pub fn declared_type(&self) -> Option<DeclaredType> {
        match self {
            Self::Input { declared, .. } | Self::LambdaVar { declared, .. } => {
                Some(declared.clone())
            }
            Self::GetField { declared, .. } => Some(DeclaredType::Object(declared.clone())),
            Self::AssertNotNull { child, .. } => child.declared_type(),
            _ => None,
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Direct children.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Literal(_) | Self::Input { .. } | Self::LambdaVar { .. } => Vec::new(),
            Self::GetStructField { child, .. }
            | Self::GetField { child, .. }
            | Self::Invoke { child, .. }
            | Self::AssertNotNull { child, .. }
            | Self::Upcast { child, .. }
            | Self::Opaque { child, .. }
            | Self::IsNull(child)
            | Self::UnwrapOption(child)
            | Self::WrapOption(child) => vec![&**child],
            Self::NewInstance { args, .. } => args.iter().collect(),
            Self::CreateStruct { fields } => fields.iter().map(|(_, e)| e).collect(),
            Self::If {
                predicate,
                then,
                otherwise,
            } => vec![&**predicate, &**then, &**otherwise],
            Self::MapObjects {
                body, collection, ..
            } => vec![&**collection, &**body],
            Self::ExternalMapToCatalyst {
                map, key, value, ..
            }
            | Self::CatalystToExternalMap {
                map, key, value, ..
            } => vec![&**map, &**key, &**value],
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[&Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(Value::Null) => f.write_str("null"),
            Self::Literal(v) => write!(f, "lit({:?})", v),
            Self::Input { ordinal, .. } => write!(f, "input[{}]", ordinal),
            Self::LambdaVar { id, .. } => write!(f, "lambda#{}", id),
            Self::GetStructField { child, name, .. } => write!(f, "{}.{}", child, name),
            Self::GetField { child, name, .. } => write!(f, "{}.{}()", child, name),
            Self::Invoke { function, child } => write!(f, "{}({})", function.name(), child),
            Self::NewInstance { constructor, args } => {
                write!(f, "{}(", constructor)?;
                write_list(f, &args.iter().collect::<Vec<_>>())?;
                f.write_str(")")
            }
            Self::CreateStruct { fields } => {
                f.write_str("struct(")?;
                for (i, (name, expr)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, expr)?;
                }
                f.write_str(")")
            }
            Self::If {
                predicate,
                then,
                otherwise,
            } => write!(f, "if ({}) {} else {}", predicate, then, otherwise),
            Self::IsNull(child) => write!(f, "isnull({})", child),
            Self::AssertNotNull { child, .. } => write!(f, "assertnotnull({})", child),
            Self::MapObjects {
                var,
                body,
                collection,
            } => write!(f, "mapobjects(lambda#{} => {}, {})", var, body, collection),
            Self::ExternalMapToCatalyst {
                map,
                key,
                key_nullable,
                value,
                value_nullable,
                ..
            } => write!(
                f,
                "externalmaptocatalyst({}, {}{}, {}{})",
                map,
                key,
                if *key_nullable { "?" } else { "" },
                value,
                if *value_nullable { "?" } else { "" }
            ),
            Self::CatalystToExternalMap { map, key, value, .. } => {
                write!(f, "catalysttoexternalmap({}, {}, {})", map, key, value)
            }
            Self::UnwrapOption(child) => write!(f, "unwrapoption({})", child),
            Self::WrapOption(child) => write!(f, "wrapoption({})", child),
            Self::Upcast { child, to } => write!(f, "upcast({}, {})", child, to),
            Self::Opaque { udt, op, child } => {
                let verb = match op {
                    UdtOp::Serialize => "serialize",
                    UdtOp::Deserialize => "deserialize",
                };
                write!(f, "{}.{}({})", udt.user_class(), verb, child)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Introspect;

    #[test]
    fn test_lambda_ids_are_unique() {
        let a = Expr::lambda_var(fresh_lambda_id(), DeclaredType::Physical(DataType::Integer));
        let b = Expr::lambda_var(fresh_lambda_id(), DeclaredType::Physical(DataType::Integer));
        assert_ne!(a.lambda_id(), b.lambda_id());
    }

    #[test]
    fn test_display_and_node_count() {
        let input = Expr::input(0, DeclaredType::Physical(DataType::Integer));
        let expr = Expr::if_else(
            input.clone().is_null(),
            Expr::null(),
            input.invoke(Function::ValueOf(crate::types::PrimitiveKind::I32)),
        );
        assert_eq!(expr.to_string(), "if (isnull(input[0])) null else valueOf(input[0])");
        assert_eq!(expr.node_count(), 6);
    }

    #[test]
    fn test_declared_type_through_assert() {
        let field = Expr::input(0, DeclaredType::Object(String::type_descriptor()))
            .assert_not_null("- root class: \"String\"");
        assert_eq!(
            field.declared_type(),
            Some(DeclaredType::Object(String::type_descriptor()))
        );
    }
}
