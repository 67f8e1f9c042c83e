//! Compiled path representation
//!
//! A path such as `$.payload.items[0].price` compiles to the token list
//! `[Property("payload"), Property("items"), Index(0), Property("price")]`.
//! The root `$` is implicit; for column rules the first property names the
//! column.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// Object member (`.name` or `['name']`)
    Property(String),
    /// Array element; negative values count from the end
    Index(i64),
    /// Every array element (`[*]`)
    Wildcard,
}

/// A compiled path, hashable so it can key the path-type index
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompiledPath {
    tokens: Vec<PathToken>,
}

impl CompiledPath {
    pub fn new(tokens: Vec<PathToken>) -> Self {
        Self { tokens }
    }

    /// The path `$.name` addressing a whole column
    pub fn for_column(name: impl Into<String>) -> Self {
        Self {
            tokens: vec![PathToken::Property(name.into())],
        }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// A new path one step below this one
    pub fn child(&self, token: PathToken) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend_from_slice(&self.tokens);
        tokens.push(token);
        Self { tokens }
    }

    /// Strict prefixes, shortest first, excluding the empty path
    pub fn prefixes(&self) -> impl Iterator<Item = CompiledPath> + '_ {
        (1..self.tokens.len()).map(move |n| Self::new(self.tokens[..n].to_vec()))
    }

    pub fn starts_with(&self, other: &CompiledPath) -> bool {
        self.tokens.starts_with(&other.tokens)
    }

    /// The column a column-rooted path belongs to
    pub fn column_name(&self) -> Option<&str> {
        match self.tokens.first() {
            Some(PathToken::Property(name)) => Some(name),
            _ => None,
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.tokens.iter().any(|t| matches!(t, PathToken::Wildcard))
    }
}

impl From<Vec<PathToken>> for CompiledPath {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self::new(tokens)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Property(name) if is_plain_name(name) => write!(f, ".{}", name),
            PathToken::Property(name) => {
                f.write_str("['")?;
                for ch in name.chars() {
                    match ch {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("']")
            }
            PathToken::Index(i) => write!(f, "[{}]", i),
            PathToken::Wildcard => f.write_str("[*]"),
        }
    }
}

impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// Names that survive dot notation unchanged
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "*"
        && !name.starts_with(['.', '*'])
        && name
            .chars()
            .all(|c| !matches!(c, '.' | '[' | ']' | '(' | ')' | '\'' | '"') && !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str) -> PathToken {
        PathToken::Property(name.to_string())
    }

    #[test]
    fn test_display_canonical_form() {
        let path = CompiledPath::new(vec![
            prop("a"),
            PathToken::Index(0),
            PathToken::Wildcard,
            prop("odd key"),
            PathToken::Index(-1),
        ]);
        assert_eq!(path.to_string(), "$.a[0][*]['odd key'][-1]");
    }

    #[test]
    fn test_display_escapes_quotes() {
        let path = CompiledPath::new(vec![prop("it's")]);
        assert_eq!(path.to_string(), r"$['it\'s']");
    }

    #[test]
    fn test_prefixes() {
        let path = CompiledPath::new(vec![prop("a"), prop("b"), PathToken::Index(0)]);
        let prefixes: Vec<String> = path.prefixes().map(|p| p.to_string()).collect();
        assert_eq!(prefixes, vec!["$.a", "$.a.b"]);
    }

    #[test]
    fn test_child_and_starts_with() {
        let root = CompiledPath::for_column("j");
        let child = root.child(prop("k"));
        assert!(child.starts_with(&root));
        assert!(!root.starts_with(&child));
        assert_eq!(child.column_name(), Some("j"));
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(CompiledPath::new(vec![prop("a"), PathToken::Wildcard]).has_wildcard());
        assert!(!CompiledPath::for_column("a").has_wildcard());
    }
}
