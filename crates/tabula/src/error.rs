// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the schema resolver, the codec builders and the
//! expression evaluator.
//!
//! Build-time errors (`UnsupportedType`, `CircularReference`,
//! `NoMatchingConstructor`, `ReservedFieldName`, ...) are raised while a codec
//! is being constructed. Once a codec is built, only conversion-time errors
//! (`NullValue`, `TypeMismatch`, `Codec`, ...) can surface.

use crate::path::TypePath;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tabula.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    // ========================================================================
    // Build-time errors
    // ========================================================================
    /// The type shape is not part of the supported universe.
    UnsupportedType { type_name: String, path: TypePath },
    /// A record type refers to itself along one descent path.
    CircularReference { type_name: String },
    /// Neither a constructor nor a companion factory accepts the arguments.
    NoMatchingConstructor {
        type_name: String,
        argument_shapes: Vec<String>,
    },
    /// A record field collides with a reserved identifier.
    ReservedFieldName { name: String, path: TypePath },
    /// Two fields of one record share a name.
    DuplicateFieldName { name: String, path: TypePath },
    /// A facade query was applied to a type of the wrong shape.
    ShapeMismatch {
        type_name: String,
        expected: &'static str,
    },
    /// A nested record needs an enclosing instance that was never registered.
    MissingOuterScope { type_name: String },

    // ========================================================================
    // Conversion-time errors
    // ========================================================================
    /// A null reached a position declared non-nullable.
    NullValue { path: String },
    /// A value did not have the physical shape the codec expected.
    TypeMismatch { expected: String, found: String },
    /// A map produced a null key.
    NullMapKey,
    /// A decimal does not fit the declared precision/scale.
    DecimalOverflow {
        value: String,
        precision: u8,
        scale: u8,
    },
    /// Row access out of bounds or on a non-row value.
    InvalidRow(String),
    /// An opaque codec or a constructor failed.
    Codec(String),

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Invalid or unreadable configuration.
    Config(String),
}

impl Error {
    /// Shortcut for a [`Error::TypeMismatch`] built from a debug-printed value.
    pub(crate) fn mismatch(expected: impl Into<String>, found: &impl std::fmt::Debug) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: format!("{:?}", found),
        }
    }

    /// True for errors raised while building a codec.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType { .. }
                | Self::CircularReference { .. }
                | Self::NoMatchingConstructor { .. }
                | Self::ReservedFieldName { .. }
                | Self::DuplicateFieldName { .. }
                | Self::ShapeMismatch { .. }
                | Self::MissingOuterScope { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsupportedType { type_name, path } => {
                write!(f, "No codec found for {}\n{}", type_name, path)
            }
            Error::CircularReference { type_name } => write!(
                f,
                "Cannot have circular references in record type, got nested type {}",
                type_name
            ),
            Error::NoMatchingConstructor {
                type_name,
                argument_shapes,
            } => write!(
                f,
                "No constructor or factory of {} accepts ({})",
                type_name,
                argument_shapes.join(", ")
            ),
            Error::ReservedFieldName { name, path } => write!(
                f,
                "`{}` is a reserved keyword and cannot be used as field name\n{}",
                name, path
            ),
            Error::DuplicateFieldName { name, path } => write!(
                f,
                "Field name `{}` appears more than once in a record\n{}",
                name, path
            ),
            Error::ShapeMismatch {
                type_name,
                expected,
            } => write!(f, "Type {} is not {}", type_name, expected),
            Error::MissingOuterScope { type_name } => write!(
                f,
                "Unable to construct nested type {}: no outer scope registered",
                type_name
            ),
            Error::NullValue { path } => {
                write!(f, "Null value appeared in non-nullable field:\n{}", path)
            }
            Error::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            Error::NullMapKey => write!(f, "Cannot use null as map key"),
            Error::DecimalOverflow {
                value,
                precision,
                scale,
            } => write!(
                f,
                "Decimal {} does not fit DECIMAL({}, {})",
                value, precision, scale
            ),
            Error::InvalidRow(msg) => write!(f, "Invalid row access: {}", msg),
            Error::Codec(msg) => write!(f, "Codec failure: {}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_classification() {
        let err = Error::CircularReference {
            type_name: "Node".into(),
        };
        assert!(err.is_build_error());
        assert!(!Error::NullMapKey.is_build_error());
    }

    #[test]
    fn test_display_includes_path() {
        let path = TypePath::root("Outer").field("Inner", "value");
        let err = Error::UnsupportedType {
            type_name: "u64".into(),
            path,
        };
        let msg = err.to_string();
        assert!(msg.contains("No codec found for u64"));
        assert!(msg.contains("root class: \"Outer\""));
        assert!(msg.contains("name: \"value\""));
    }
}
