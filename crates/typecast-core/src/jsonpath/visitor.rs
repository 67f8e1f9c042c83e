//! Recursive JSON visitor
//!
//! Walks a document top-down against a [`PathTypeIndex`], casting exactly the
//! nodes at configured leaf paths and rebuilding the tree bottom-up. Subtrees
//! that cannot contain a leaf are moved into the result untouched.
//!
//! A node can be addressed by more than one path: element `i` of an array of
//! length `n` is `[i]`, `[i - n]` and `[*]`. The visitor carries every such
//! alias that is still live in the index, so index-specific and wildcard rules
//! coexist. When several aliases are leaves, the concrete index wins over the
//! negative one, which wins over the wildcard.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use super::ast::{CompiledPath, PathToken};
use super::index::PathTypeIndex;
use crate::cast::{self, json, CastError, TimestampCodec};
use crate::value::{JsonNode, Kind};
use serde_json::Map;
use std::collections::HashSet;

/// Result of a visit: the rebuilt document and the leaves that matched a node
#[derive(Debug)]
pub struct Visited<'a> {
    pub value: JsonNode,
    pub matched: HashSet<&'a CompiledPath>,
}

pub struct JsonVisitor<'a> {
    index: &'a PathTypeIndex,
    codec: &'a TimestampCodec,
}

impl<'a> JsonVisitor<'a> {
    pub fn new(index: &'a PathTypeIndex, codec: &'a TimestampCodec) -> Self {
        Self { index, codec }
    }

    /// Visit `value` located at `root` and return the rebuilt document
    pub fn visit(&self, root: &CompiledPath, value: JsonNode) -> Result<JsonNode, CastError> {
        self.visit_with_report(root, value).map(|visited| visited.value)
    }

    pub fn visit_with_report(
        &self,
        root: &CompiledPath,
        value: JsonNode,
    ) -> Result<Visited<'a>, CastError> {
        let mut matched = HashSet::new();
        let aliases = if self.index.is_live(root) {
            vec![root.clone()]
        } else {
            Vec::new()
        };
        let value = self.walk(&aliases, value, &mut matched)?;
        Ok(Visited { value, matched })
    }

    fn walk(
        &self,
        aliases: &[CompiledPath],
        value: JsonNode,
        matched: &mut HashSet<&'a CompiledPath>,
    ) -> Result<JsonNode, CastError> {
        if aliases.is_empty() {
            return Ok(value);
        }

        let index: &'a PathTypeIndex = self.index;
        let mut leaves = aliases.iter().filter_map(|alias| index.leaf_entry(alias));
        if let Some((leaf, kind)) = leaves.next() {
            // every alias addressing this node counts as matched
            matched.insert(leaf);
            matched.extend(leaves.map(|(other, _)| other));
            return self.cast_leaf(leaf, value, kind);
        }

        match value {
            JsonNode::Array(items) => {
                let len = items.len() as i64;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let children = self.element_aliases(aliases, i as i64, len);
                    out.push(self.walk(&children, item, matched)?);
                }
                Ok(JsonNode::Array(out))
            }
            JsonNode::Object(members) => {
                let mut out = Map::with_capacity(members.len());
                for (key, item) in members {
                    let children = self.live_children(aliases, || PathToken::Property(key.clone()));
                    let item = self.walk(&children, item, matched)?;
                    out.insert(key, item);
                }
                Ok(JsonNode::Object(out))
            }
            scalar => Ok(scalar),
        }
    }

    /// Aliases of element `i`, concrete first, then negative, then wildcard
    fn element_aliases(&self, aliases: &[CompiledPath], i: i64, len: i64) -> Vec<CompiledPath> {
        let mut children = self.live_children(aliases, || PathToken::Index(i));
        children.extend(self.live_children(aliases, || PathToken::Index(i - len)));
        children.extend(self.live_children(aliases, || PathToken::Wildcard));
        children
    }

    fn live_children(
        &self,
        aliases: &[CompiledPath],
        token: impl Fn() -> PathToken,
    ) -> Vec<CompiledPath> {
        aliases
            .iter()
            .map(|alias| alias.child(token()))
            .filter(|child| self.index.is_live(child))
            .collect()
    }

    fn cast_leaf(&self, leaf: &CompiledPath, node: JsonNode, kind: Kind) -> Result<JsonNode, CastError> {
        tracing::trace!(path = %leaf, target = %kind, "casting json leaf");
        let value = match json::into_scalar(node) {
            Ok(value) => value,
            Err(JsonNode::Null) => return Ok(JsonNode::Null),
            Err(doc) => doc.into(),
        };
        cast::cast(value, kind, self.codec)
            .and_then(json::into_node)
            .map_err(|e| e.at(leaf))
    }
}
