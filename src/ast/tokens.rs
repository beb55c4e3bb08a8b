use std::fmt;

use crate::ast::{Infix, Keyword};
use crate::value::Value;

/// What a token is, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer, float or string literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0x15
    /// 234.7
    /// 'init'
    /// ```
    Literal(Value),

    /// Infix operator, including the word operators
    ///
    /// # Examples
    /// ```text
    /// ==
    /// is not
    /// matches
    /// ->
    /// ```
    Infix(Infix),

    /// Left parenthesis for grouping or list literals
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma separating list elements
    Comma,

    /// Field path, words joined by `/` or `.`
    ///
    /// # Examples
    /// ```text
    /// pid
    /// Process/pid
    /// Process.parent.name
    /// ```
    Identifier(String),

    /// Keyword such as `any`, `each` or `has`
    Keyword(Keyword),

    /// Template placeholder, positional (`{}`) or named (`{pid}`)
    Param(Option<String>),
}

impl TokenKind {
    /// Short category name of the token.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Literal(_) => "literal",
            TokenKind::Infix(_) => "infix",
            TokenKind::LParen => "lparen",
            TokenKind::RParen => "rparen",
            TokenKind::Comma => "comma",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Keyword(_) => "keyword",
            TokenKind::Param(_) => "param",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(value) => write!(f, "{value}"),
            TokenKind::Infix(op) => write!(f, "{op}"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Identifier(path) => write!(f, "{path}"),
            TokenKind::Keyword(keyword) => write!(f, "{keyword}"),
            TokenKind::Param(None) => write!(f, "{{}}"),
            TokenKind::Param(Some(name)) => write!(f, "{{{name}}}"),
        }
    }
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Token { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` at position {}", self.kind, self.position)
    }
}
