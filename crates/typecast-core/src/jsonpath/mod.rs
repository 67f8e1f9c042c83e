//! Restricted JSON path support
//!
//! A path addresses nodes inside a JSON column: `$.column.key[0][*]`. Paths
//! are compiled once into [`CompiledPath`] tokens, collected into a
//! [`PathTypeIndex`], and applied to documents by the [`JsonVisitor`].
//!
//! # Example
//!
//! ```
//! use typecast_core::jsonpath::{column_name, compile};
//!
//! let path = compile("$.payload.items[0].price").unwrap();
//! assert_eq!(path.len(), 4);
//! assert_eq!(column_name("$.payload.items[0].price").unwrap(), "payload");
//! ```
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

pub mod ast;
pub mod error;
pub mod index;
pub mod parser;
pub mod visitor;


pub use ast::{CompiledPath, PathToken};
pub use error::JSONPathError;
pub use index::PathTypeIndex;
pub use parser::compile;
pub use visitor::{JsonVisitor, Visited};

use crate::value::JsonNode;

/// Name of the column a path is rooted at
pub fn column_name(path: &str) -> Result<String, JSONPathError> {
    let compiled = compile(path)?;
    compiled.column_name().map(str::to_string).ok_or_else(|| {
        JSONPathError::invalid_path(
            "path must start with a column name",
            path,
            Some("write the column as the first property, e.g. $.column.key".to_string()),
        )
    })
}

/// Whether a configured name should be read as a path rather than a column
pub fn is_probably_json_path(name: &str) -> bool {
    name.trim_start().starts_with('$')
}

/// Follow concrete tokens from `node`. Wildcards never select a single node.
pub fn select<'a>(node: &'a JsonNode, tokens: &[PathToken]) -> Option<&'a JsonNode> {
    tokens.iter().try_fold(node, |current, token| match (token, current) {
        (PathToken::Property(name), JsonNode::Object(members)) => members.get(name),
        (PathToken::Index(i), JsonNode::Array(items)) => {
            let len = items.len() as i64;
            let at = if *i < 0 { len + i } else { *i };
            usize::try_from(at).ok().and_then(|at| items.get(at))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_name() {
        assert_eq!(column_name("$.foo.bar[0].name").unwrap(), "foo");
        assert_eq!(column_name("$['odd col'].x").unwrap(), "odd col");
        assert!(matches!(column_name("$"), Err(JSONPathError::InvalidPath { .. })));
        assert!(matches!(column_name("$[0].a"), Err(JSONPathError::InvalidPath { .. })));
        assert!(column_name("$..foo").is_err());
    }

    #[test]
    fn test_is_probably_json_path() {
        assert!(is_probably_json_path("$.a"));
        assert!(is_probably_json_path("$['a']"));
        assert!(!is_probably_json_path("a"));
        assert!(!is_probably_json_path("price$"));
    }

    #[test]
    fn test_select() {
        let doc = json!({"a": [{"b": 1}, {"b": 2}], "c": "x"});
        let path = compile("$.a[1].b").unwrap();
        assert_eq!(select(&doc, path.tokens()), Some(&json!(2)));

        let last = compile("$.a[-1]").unwrap();
        assert_eq!(select(&doc, last.tokens()), Some(&json!({"b": 2})));

        assert_eq!(select(&doc, compile("$").unwrap().tokens()), Some(&doc));
        assert_eq!(select(&doc, compile("$.a[5]").unwrap().tokens()), None);
        assert_eq!(select(&doc, compile("$.a[-3]").unwrap().tokens()), None);
        assert_eq!(select(&doc, compile("$.c.d").unwrap().tokens()), None);
        assert_eq!(select(&doc, compile("$.a[*]").unwrap().tokens()), None);
    }
}
