// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Diagnostic breadcrumbs for recursive type traversal.
//!
//! A [`TypePath`] is immutable: every descent forks a new path with one more
//! breadcrumb, so sibling branches never observe each other's steps and a
//! path can be shared freely between threads. [`SeenTypes`] follows the
//! same discipline for the classes entered along one descent.

use std::fmt;
use std::sync::Arc;

/// One step of a type traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Breadcrumb {
    /// Root type requested by the caller.
    Root { class: String },
    /// Named field of a record; `class` is the field's type.
    Field { class: String, name: String },
    /// Element of an array, sequence or set.
    ArrayElement { class: String },
    /// Key of a map.
    MapKey { class: String },
    /// Value of a map.
    MapValue { class: String },
    /// Payload of an optional.
    OptionValue { class: String },
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { class } => write!(f, "- root class: \"{}\"", class),
            Self::Field { class, name } => {
                write!(f, "- field (class: \"{}\", name: \"{}\")", class, name)
            }
            Self::ArrayElement { class } => write!(f, "- array element class: \"{}\"", class),
            Self::MapKey { class } => write!(f, "- map key class: \"{}\"", class),
            Self::MapValue { class } => write!(f, "- map value class: \"{}\"", class),
            Self::OptionValue { class } => write!(f, "- option value class: \"{}\"", class),
        }
    }
}

/// Immutable breadcrumb trail, oldest step first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePath {
    crumbs: Arc<Vec<Breadcrumb>>,
}

impl TypePath {
    /// Path starting at the given root class.
    pub fn root(class: impl Into<String>) -> Self {
        Self {
            crumbs: Arc::new(vec![Breadcrumb::Root {
                class: class.into(),
            }]),
        }
    }

    fn fork(&self, crumb: Breadcrumb) -> Self {
        let mut crumbs = Vec::with_capacity(self.crumbs.len() + 1);
        crumbs.extend(self.crumbs.iter().cloned());
        crumbs.push(crumb);
        Self {
            crumbs: Arc::new(crumbs),
        }
    }

    /// Fork with a record field step.
    #[must_use]
    pub fn field(&self, class: impl Into<String>, name: impl Into<String>) -> Self {
        self.fork(Breadcrumb::Field {
            class: class.into(),
            name: name.into(),
        })
    }

    /// Fork with an array element step.
    #[must_use]
    pub fn array_element(&self, class: impl Into<String>) -> Self {
        self.fork(Breadcrumb::ArrayElement {
            class: class.into(),
        })
    }

    /// Fork with a map key step.
    #[must_use]
    pub fn map_key(&self, class: impl Into<String>) -> Self {
        self.fork(Breadcrumb::MapKey {
            class: class.into(),
        })
    }

    /// Fork with a map value step.
    #[must_use]
    pub fn map_value(&self, class: impl Into<String>) -> Self {
        self.fork(Breadcrumb::MapValue {
            class: class.into(),
        })
    }

    /// Fork with an optional payload step.
    #[must_use]
    pub fn option_value(&self, class: impl Into<String>) -> Self {
        self.fork(Breadcrumb::OptionValue {
            class: class.into(),
        })
    }

    /// Breadcrumbs, oldest first.
    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.crumbs
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    /// True when no step was recorded.
    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }
}

impl fmt::Display for TypePath {
    /// Newest step first, one per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for crumb in self.crumbs.iter().rev() {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}", crumb)?;
            first = false;
        }
        Ok(())
    }
}

/// Class identities already entered along one descent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenTypes {
    names: Arc<Vec<String>>,
}

impl SeenTypes {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `name` was entered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|seen| seen == name)
    }

    /// Fork with `name` added.
    #[must_use]
    pub fn with(&self, name: impl Into<String>) -> Self {
        let mut names = Vec::with_capacity(self.names.len() + 1);
        names.extend(self.names.iter().cloned());
        names.push(name.into());
        Self {
            names: Arc::new(names),
        }
    }

    /// Number of entered classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when nothing was entered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fork_does_not_touch_parent() {
        let root = TypePath::root("Person");
        let left = root.field("String", "name");
        let right = root.field("i32", "age");

        assert_eq!(root.len(), 1);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert_ne!(left, right);
    }

    #[test]
    fn test_display_newest_first() {
        let path = TypePath::root("Outer")
            .field("Vec<i32>", "items")
            .array_element("i32");
        let rendered = path.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "- array element class: \"i32\"");
        assert_eq!(lines[1], "- field (class: \"Vec<i32>\", name: \"items\")");
        assert_eq!(lines[2], "- root class: \"Outer\"");
    }

    #[test]
    fn test_seen_types_fork() {
        let root = SeenTypes::new().with("Outer");
        let branch = root.with("Inner");
        assert!(branch.contains("Outer"));
        assert!(branch.contains("Inner"));
        assert!(!root.contains("Inner"));
        assert_eq!(root.len(), 1);
    }
}
