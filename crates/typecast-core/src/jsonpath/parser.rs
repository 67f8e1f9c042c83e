//! Path parser for the restricted dialect
//!
//! Accepted: `$`, `.name`, `['name']` / `["name"]`, `[n]` (negative allowed)
//! and `[*]`. Recursive descent, property wildcards, slices, unions, filters
//! and function calls are rejected with an `Unsupported` error.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use super::error::*;
use std::iter::Peekable;
use std::str::Chars;

type Result<T> = std::result::Result<T, JSONPathError>;

/// Compile a path expression into tokens
pub fn compile(input: &str) -> Result<CompiledPath> {
    Parser::new(input)?.parse()
}

/// Path expression parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self> {
        if input.trim().is_empty() {
            return Err(JSONPathError::parse("Empty path expression", 0, input));
        }

        Ok(Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        })
    }

    /// Parse the expression into a compiled path
    pub fn parse(mut self) -> Result<CompiledPath> {
        self.parse_root()?;
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.parse_segment()?);
        }

        Ok(CompiledPath::new(tokens))
    }

    /// Parse the root selector ($)
    fn parse_root(&mut self) -> Result<()> {
        self.skip_whitespace();

        if self.current_char() != Some('$') {
            if self.input.contains('(') {
                return Err(JSONPathError::unsupported(
                    "function call",
                    self.input,
                    Some("a plain property path".to_string()),
                ));
            }
            return Err(JSONPathError::syntax(
                "Path must start with $",
                self.position,
                self.input,
                vec!["$".to_string()],
                self.found(),
            ));
        }

        self.advance();
        Ok(())
    }

    fn parse_segment(&mut self) -> Result<PathToken> {
        match self.current_char() {
            Some('.') => self.parse_dot_segment(),
            Some('[') => self.parse_bracket_segment(),
            _ => Err(JSONPathError::syntax(
                "Unexpected character after path segment",
                self.position,
                self.input,
                vec![".".to_string(), "[".to_string()],
                self.found(),
            )),
        }
    }

    /// Parse dot notation (.name)
    fn parse_dot_segment(&mut self) -> Result<PathToken> {
        self.advance(); // consume '.'

        match self.current_char() {
            Some('.') => {
                return Err(JSONPathError::unsupported(
                    "recursive descent (..)",
                    self.input,
                    Some("the full path to each property".to_string()),
                ))
            }
            Some('*') => {
                return Err(JSONPathError::unsupported(
                    "property wildcard (.*)",
                    self.input,
                    Some("[*] for array elements, or one rule per property".to_string()),
                ))
            }
            _ => {}
        }

        let start = self.position;
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if matches!(ch, '.' | '[' | ']' | '(' | ')') || ch.is_whitespace() {
                break;
            }
            name.push(ch);
            self.advance();
        }

        if name.is_empty() {
            return Err(JSONPathError::syntax(
                "Expected property name",
                start,
                self.input,
                vec!["property name".to_string()],
                self.found(),
            ));
        }

        if self.current_char() == Some('(') {
            return Err(JSONPathError::unsupported(
                format!("function call {}()", name),
                self.input,
                None,
            ));
        }

        Ok(PathToken::Property(name))
    }

    /// Parse bracket notation ([n], [*], ['name'])
    fn parse_bracket_segment(&mut self) -> Result<PathToken> {
        let start = self.position;
        self.advance(); // consume '['
        self.skip_whitespace();

        let token = match self.current_char() {
            Some('*') => {
                self.advance();
                PathToken::Wildcard
            }
            Some('\'') | Some('"') => PathToken::Property(self.parse_quoted_string()?),
            Some('?') => {
                return Err(JSONPathError::unsupported(
                    "filter expression [?(...)]",
                    self.input,
                    None,
                ))
            }
            Some('(') => {
                return Err(JSONPathError::unsupported(
                    "script expression [(...)]",
                    self.input,
                    None,
                ))
            }
            Some(':') => return Err(self.slice_error()),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => PathToken::Index(self.parse_index()?),
            Some(_) => {
                return Err(JSONPathError::syntax(
                    "Invalid character in bracket selector",
                    self.position,
                    self.input,
                    vec!["digit".to_string(), "*".to_string(), "quote".to_string()],
                    self.found(),
                ))
            }
            None => {
                return Err(JSONPathError::parse(
                    "Unterminated bracket selector",
                    start,
                    self.input,
                ))
            }
        };

        self.skip_whitespace();
        match self.current_char() {
            Some(']') => {
                self.advance();
                Ok(token)
            }
            Some(':') => Err(self.slice_error()),
            Some(',') => Err(JSONPathError::unsupported(
                "union [a,b]",
                self.input,
                Some("one rule per element".to_string()),
            )),
            Some(_) => Err(JSONPathError::syntax(
                "Expected ']'",
                self.position,
                self.input,
                vec!["]".to_string()],
                self.found(),
            )),
            None => Err(JSONPathError::parse(
                "Unterminated bracket selector",
                start,
                self.input,
            )),
        }
    }

    fn parse_index(&mut self) -> Result<i64> {
        let start = self.position;
        let mut digits = String::new();

        if self.current_char() == Some('-') {
            digits.push('-');
            self.advance();
        }
        while let Some(ch) = self.current_char().filter(char::is_ascii_digit) {
            digits.push(ch);
            self.advance();
        }

        if digits == "-" {
            return Err(JSONPathError::syntax(
                "Expected digits after '-'",
                self.position,
                self.input,
                vec!["digit".to_string()],
                self.found(),
            ));
        }

        digits
            .parse::<i64>()
            .map_err(|_| JSONPathError::parse(format!("Index out of range: {}", digits), start, self.input))
    }

    fn parse_quoted_string(&mut self) -> Result<String> {
        let start = self.position;
        let quote_char = match self.advance() {
            Some(q) => q,
            None => return Err(JSONPathError::parse("Expected quote", start, self.input)),
        };

        let mut string = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current_char() {
            self.advance();
            if escaped {
                match ch {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    _ => string.push(ch),
                }
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote_char {
                return Ok(string);
            } else {
                string.push(ch);
            }
        }

        Err(JSONPathError::parse(
            "Unterminated string literal",
            start,
            self.input,
        ))
    }

    fn slice_error(&self) -> JSONPathError {
        JSONPathError::unsupported(
            "slice [a:b]",
            self.input,
            Some("[*] or one rule per index".to_string()),
        )
    }

    fn found(&mut self) -> String {
        self.current_char()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "EOF".to_string())
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().map(char::is_whitespace).unwrap_or(false) {
            self.advance();
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}
