use thiserror::Error;

use crate::ast::{Expr, Path, Token};

/// Malformed input found while tokenizing.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at position {position}")]
pub struct LexError {
    pub message: String,
    /// Character offset of the offending input
    pub position: usize,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        LexError { message: message.into(), position }
    }
}

/// Errors that abort parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    /// Grammar violation. `token` is `None` when input ended too early.
    #[error("{message} ({})", describe(.token))]
    Syntax { token: Option<Token>, message: String },
}

impl ParseError {
    pub fn syntax(token: Option<Token>, message: impl Into<String>) -> Self {
        ParseError::Syntax { token, message: message.into() }
    }

    /// The token the parser stopped at, if any.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Syntax { token, .. } => token.as_ref(),
            ParseError::Lex(_) => None,
        }
    }
}

fn describe(token: &Option<Token>) -> String {
    match token {
        Some(token) => token.to_string(),
        None => "at end of input".to_string(),
    }
}

/// Errors that abort a solve.
///
/// Fields that fail to resolve are not errors; they evaluate to no value.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Operator applied to operands of the wrong types
    #[error("Type error in `{node}`: {message}")]
    Type { node: Expr, message: String },

    #[error("Division by zero in `{node}`")]
    DivisionByZero { node: Expr },

    #[error("Integer overflow in `{node}`")]
    Overflow { node: Expr },

    #[error("Invalid regular expression in `{node}`: {source}")]
    Regex {
        node: Expr,
        #[source]
        source: regex::Error,
    },

    /// Only raised when the application asks for strict bindings
    #[error("Unresolved field: {path}")]
    Unresolved { path: Path },
}

impl EvalError {
    pub fn type_error(node: &Expr, message: impl Into<String>) -> Self {
        EvalError::Type { node: node.clone(), message: message.into() }
    }

    /// The node being evaluated when the error was raised.
    pub fn node(&self) -> Option<&Expr> {
        match self {
            EvalError::Type { node, .. }
            | EvalError::DivisionByZero { node }
            | EvalError::Overflow { node }
            | EvalError::Regex { node, .. } => Some(node),
            EvalError::Unresolved { .. } => None,
        }
    }
}

/// Any failure of [`run`](crate::run).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
}
