//! Path-type index
//!
//! Maps every configured leaf path to its target kind, and records every
//! strict prefix of those paths so a visitor can tell in O(1) whether a
//! subtree may still contain a leaf.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use super::ast::CompiledPath;
use crate::value::Kind;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct PathTypeIndex {
    leaf_types: HashMap<CompiledPath, Kind>,
    visit_prefixes: HashSet<CompiledPath>,
}

impl PathTypeIndex {
    /// Build from `(path, kind)` rules. A later rule for the same path wins;
    /// configuration rejects duplicates before this point.
    pub fn build<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = (CompiledPath, Kind)>,
    {
        let mut index = Self::default();
        for (path, kind) in rules {
            index.visit_prefixes.extend(path.prefixes());
            index.leaf_types.insert(path, kind);
        }
        index
    }

    pub fn is_leaf(&self, path: &CompiledPath) -> Option<Kind> {
        self.leaf_types.get(path).copied()
    }

    /// The stored key and kind for a leaf
    pub fn leaf_entry(&self, path: &CompiledPath) -> Option<(&CompiledPath, Kind)> {
        self.leaf_types.get_key_value(path).map(|(k, v)| (k, *v))
    }

    pub fn should_descend(&self, path: &CompiledPath) -> bool {
        self.visit_prefixes.contains(path)
    }

    /// Whether a visit at `path` can still reach a leaf
    pub fn is_live(&self, path: &CompiledPath) -> bool {
        self.leaf_types.contains_key(path) || self.visit_prefixes.contains(path)
    }

    pub fn leaves(&self) -> impl Iterator<Item = (&CompiledPath, Kind)> {
        self.leaf_types.iter().map(|(k, v)| (k, *v))
    }

    /// Leaves rooted at a column
    pub fn leaves_under<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CompiledPath> + 'a {
        self.leaf_types
            .keys()
            .filter(move |path| path.column_name() == Some(column))
    }

    pub fn len(&self) -> usize {
        self.leaf_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_types.is_empty()
    }
}
