// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured row storage.
//!
//! Rows are addressed by ordinal; the column order of a row is the field
//! order of the struct schema it was produced for.

use crate::error::{Error, Result};
use crate::value::Value;

/// Ordinal access to a row of structured values.
pub trait RowAccess {
    /// Number of columns.
    fn num_fields(&self) -> usize;

    /// True if the column at `ordinal` holds null.
    fn is_null_at(&self, ordinal: usize) -> Result<bool>;

    /// Read the column at `ordinal`.
    fn read_ordinal(&self, ordinal: usize) -> Result<Value>;
}

/// Row of structured values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row from its columns.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Single-column row.
    pub fn single(value: Value) -> Self {
        Self::new(vec![value])
    }

    /// Columns in ordinal order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume into columns.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Column by ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&Value> {
        self.values.get(ordinal)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-column row.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl RowAccess for Row {
    fn num_fields(&self) -> usize {
        self.values.len()
    }

    fn is_null_at(&self, ordinal: usize) -> Result<bool> {
        self.values
            .get(ordinal)
            .map(Value::is_null)
            .ok_or_else(|| out_of_bounds(ordinal, self.values.len()))
    }

    fn read_ordinal(&self, ordinal: usize) -> Result<Value> {
        self.values
            .get(ordinal)
            .cloned()
            .ok_or_else(|| out_of_bounds(ordinal, self.values.len()))
    }
}

fn out_of_bounds(ordinal: usize, len: usize) -> Error {
    Error::InvalidRow(format!("ordinal {} >= {}", ordinal, len))
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Structured map: parallel key and value arrays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    keys: Vec<Value>,
    values: Vec<Value>,
}

impl MapData {
    /// Build from parallel arrays.
    pub fn new(keys: Vec<Value>, values: Vec<Value>) -> Result<Self> {
        if keys.len() != values.len() {
            return Err(Error::InvalidRow(format!(
                "map keys/values length mismatch: {} != {}",
                keys.len(),
                values.len()
            )));
        }
        Ok(Self { keys, values })
    }

    /// Key array.
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    /// Value array.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access() {
        let row = Row::new(vec![Value::I32(1), Value::Null]);
        assert_eq!(row.num_fields(), 2);
        assert_eq!(row.is_null_at(1), Ok(true));
        assert_eq!(row.read_ordinal(0), Ok(Value::I32(1)));
        assert!(matches!(row.read_ordinal(2), Err(Error::InvalidRow(_))));
    }

    #[test]
    fn test_map_data_length_check() {
        assert!(MapData::new(vec![Value::I32(1)], vec![]).is_err());
        let map = MapData::new(vec![Value::I32(1)], vec![Value::Null]).expect("map");
        assert_eq!(map.len(), 1);
    }
}
