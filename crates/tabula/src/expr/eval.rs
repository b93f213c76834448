// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Evaluator for conversion steps.

use super::function::fit_decimal;
use super::{Expr, UdtOp};
use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::row::{MapData, Row, RowAccess};
use crate::schema::DataType;
use crate::types::MapKind;
use crate::value::{sort_cmp, Value};

/// Evaluation scope: the input row and the lambda variables in scope.
struct Scope<'a> {
    input: &'a Row,
    bindings: Vec<(usize, Value)>,
}

impl Scope<'_> {
    fn lookup(&self, id: usize) -> Result<Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == id)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::Codec(format!("unbound lambda variable #{}", id)))
    }

    fn with_bindings(
        &mut self,
        bound: &[(usize, Value)],
        body: impl FnOnce(&mut Self) -> Result<Value>,
    ) -> Result<Value> {
        let depth = self.bindings.len();
        self.bindings.extend(bound.iter().cloned());
        let result = body(self);
        self.bindings.truncate(depth);
        result
    }
}

impl Expr {
    /// Evaluate against an input row.
    pub fn eval(&self, input: &Row) -> Result<Value> {
        let mut scope = Scope {
            input,
            bindings: Vec::new(),
        };
        self.eval_in(&mut scope)
    }

    fn eval_in(&self, scope: &mut Scope<'_>) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Input { ordinal, .. } => scope.input.read_ordinal(*ordinal),
            Expr::LambdaVar { id, .. } => scope.lookup(*id),
            Expr::GetStructField { child, ordinal, .. } => match child.eval_in(scope)? {
                Value::Null => Ok(Value::Null),
                Value::Row(row) => row.read_ordinal(*ordinal),
                other => Err(Error::mismatch("struct", &other)),
            },
            Expr::GetField { child, name, .. } => match child.eval_in(scope)? {
                Value::Null => Ok(Value::Null),
                Value::Object(instance) => instance.field(name).cloned().ok_or_else(|| {
                    Error::Codec(format!("{} has no field {}", instance.class(), name))
                }),
                other => Err(Error::mismatch(format!("object with field {}", name), &other)),
            },
            Expr::Invoke { function, child } => function.apply(child.eval_in(scope)?),
            Expr::NewInstance { constructor, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval_in(scope))
                    .collect::<Result<Vec<_>>>()?;
                constructor.invoke(values)
            }
            Expr::CreateStruct { fields } => {
                let values = fields
                    .iter()
                    .map(|(_, expr)| expr.eval_in(scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Row(Row::new(values)))
            }
            Expr::If {
                predicate,
                then,
                otherwise,
            } => match predicate.eval_in(scope)? {
                Value::Bool(true) => then.eval_in(scope),
                Value::Bool(false) => otherwise.eval_in(scope),
                other => Err(Error::mismatch("bool predicate", &other)),
            },
            Expr::IsNull(child) => Ok(Value::Bool(child.eval_in(scope)?.is_null())),
            Expr::AssertNotNull { child, path } => match child.eval_in(scope)? {
                Value::Null => Err(Error::NullValue { path: path.clone() }),
                value => Ok(value),
            },
            Expr::MapObjects {
                var,
                body,
                collection,
            } => {
                let source = collection.eval_in(scope)?;
                if source.is_null() {
                    return Ok(Value::Null);
                }
                let items = source
                    .elements()
                    .ok_or_else(|| Error::mismatch("collection", &source))?;
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(scope.with_bindings(&[(*var, item)], |s| body.eval_in(s))?);
                }
                Ok(Value::Array(out))
            }
            Expr::ExternalMapToCatalyst {
                map,
                key_var,
                key,
                value_var,
                value,
                value_nullable,
                ..
            } => {
                let pairs = match map.eval_in(scope)? {
                    Value::Null => return Ok(Value::Null),
                    Value::Map(pairs) => pairs,
                    other => return Err(Error::mismatch("map", &other)),
                };
                let mut keys = Vec::with_capacity(pairs.len());
                let mut values = Vec::with_capacity(pairs.len());
                for (k, v) in pairs {
                    let bound = [(*key_var, k), (*value_var, v)];
                    let key_out = scope.with_bindings(&bound, |s| key.eval_in(s))?;
                    if key_out.is_null() {
                        return Err(Error::NullMapKey);
                    }
                    let value_out = scope.with_bindings(&bound, |s| value.eval_in(s))?;
                    if value_out.is_null() && !*value_nullable {
                        return Err(Error::NullValue {
                            path: "map value".into(),
                        });
                    }
                    values.push(value_out);
                    keys.push(key_out);
                }
                Ok(Value::MapData(MapData::new(keys, values)?))
            }
            Expr::CatalystToExternalMap {
                map,
                key_var,
                key,
                value_var,
                value,
                kind,
            } => {
                let data = match map.eval_in(scope)? {
                    Value::Null => return Ok(Value::Null),
                    Value::MapData(data) => data,
                    other => return Err(Error::mismatch("map data", &other)),
                };
                let mut pairs: Vec<(Value, Value)> = Vec::with_capacity(data.len());
                for (k, v) in data.keys().iter().zip(data.values()) {
                    let bound = [(*key_var, k.clone()), (*value_var, v.clone())];
                    let key_out = scope.with_bindings(&bound, |s| key.eval_in(s))?;
                    let value_out = scope.with_bindings(&bound, |s| value.eval_in(s))?;
                    // last occurrence of a key wins
                    match pairs.iter_mut().find(|(existing, _)| *existing == key_out) {
                        Some(slot) => slot.1 = value_out,
                        None => pairs.push((key_out, value_out)),
                    }
                }
                if *kind == MapKind::Sorted {
                    pairs.sort_by(|a, b| sort_cmp(&a.0, &b.0));
                }
                Ok(Value::Map(pairs))
            }
            Expr::UnwrapOption(child) => match child.eval_in(scope)? {
                Value::Null | Value::Option(None) => Ok(Value::Null),
                Value::Option(Some(inner)) => Ok(*inner),
                other => Err(Error::mismatch("option", &other)),
            },
            Expr::WrapOption(child) => match child.eval_in(scope)? {
                Value::Null => Ok(Value::none()),
                value => Ok(Value::some(value)),
            },
            Expr::Upcast { child, to } => upcast(child.eval_in(scope)?, to),
            Expr::Opaque { udt, op, child } => {
                let value = child.eval_in(scope)?;
                if value.is_null() {
                    return Ok(Value::Null);
                }
                match op {
                    UdtOp::Serialize => udt.udt().serialize(&value),
                    UdtOp::Deserialize => udt.udt().deserialize(&value),
                }
            }
        }
    }
}

/// Widen a structured value to `to`; values already of that type pass.
fn upcast(value: Value, to: &DataType) -> Result<Value> {
    let widened = match (to, value) {
        (_, Value::Null) => Value::Null,
        (DataType::Short, Value::I8(v)) => Value::I16(v.into()),
        (DataType::Integer, Value::I8(v)) => Value::I32(v.into()),
        (DataType::Integer, Value::I16(v)) => Value::I32(v.into()),
        (DataType::Long, Value::I8(v)) => Value::I64(v.into()),
        (DataType::Long, Value::I16(v)) => Value::I64(v.into()),
        (DataType::Long, Value::I32(v)) => Value::I64(v.into()),
        (DataType::Float, Value::I8(v)) => Value::F32(v.into()),
        (DataType::Float, Value::I16(v)) => Value::F32(v.into()),
        (DataType::Float, Value::I32(v)) => Value::F32(v as f32),
        (DataType::Float, Value::I64(v)) => Value::F32(v as f32),
        (DataType::Double, Value::I8(v)) => Value::F64(v.into()),
        (DataType::Double, Value::I16(v)) => Value::F64(v.into()),
        (DataType::Double, Value::I32(v)) => Value::F64(v.into()),
        (DataType::Double, Value::I64(v)) => Value::F64(v as f64),
        (DataType::Double, Value::F32(v)) => Value::F64(v.into()),
        (DataType::Decimal { precision, scale }, Value::Decimal(d)) => {
            fit_decimal(d, *precision, *scale)?
        }
        (DataType::Decimal { precision, scale }, Value::I8(v)) => {
            fit_decimal(Decimal::from_i128(v.into()), *precision, *scale)?
        }
        (DataType::Decimal { precision, scale }, Value::I16(v)) => {
            fit_decimal(Decimal::from_i128(v.into()), *precision, *scale)?
        }
        (DataType::Decimal { precision, scale }, Value::I32(v)) => {
            fit_decimal(Decimal::from_i128(v.into()), *precision, *scale)?
        }
        (DataType::Decimal { precision, scale }, Value::I64(v)) => {
            fit_decimal(Decimal::from_i128(v.into()), *precision, *scale)?
        }
        (to, value) => {
            if conforms(to, &value) {
                value
            } else {
                return Err(Error::TypeMismatch {
                    expected: to.to_string(),
                    found: format!("{:?}", value),
                });
            }
        }
    };
    Ok(widened)
}

fn conforms(to: &DataType, value: &Value) -> bool {
    match to {
        DataType::Null => true,
        DataType::Boolean => matches!(value, Value::Bool(_)),
        DataType::Byte => matches!(value, Value::I8(_)),
        DataType::Short => matches!(value, Value::I16(_)),
        DataType::Integer | DataType::Date => matches!(value, Value::I32(_)),
        DataType::Long | DataType::Timestamp => matches!(value, Value::I64(_)),
        DataType::Float => matches!(value, Value::F32(_)),
        DataType::Double => matches!(value, Value::F64(_)),
        DataType::String => matches!(value, Value::String(_)),
        DataType::Binary => matches!(value, Value::Binary(_)),
        DataType::Decimal { .. } => matches!(value, Value::Decimal(_)),
        DataType::Array { .. } => matches!(value, Value::Array(_)),
        DataType::Map { .. } => matches!(value, Value::MapData(_)),
        DataType::Struct(_) => matches!(value, Value::Row(_)),
        DataType::Opaque(_) => true,
    }
}
