//! EFILTER: a query language for filtering forensic objects.
//!
//! Queries are tokenized by [`lexer::Tokenizer`], parsed by
//! [`parser::Parser`] into an immutable [`Query`], then solved against a data
//! context by [`Solver`]. Fields may be missing or hold several candidate
//! values at once ([`Value::Superposition`]); the solver handles both without
//! the query having to care.
//!
//! ```
//! use efilter::{Value, run};
//! use std::collections::HashMap;
//!
//! let mut process = HashMap::new();
//! process.insert("name".to_string(), Value::from("init"));
//! process.insert("pid".to_string(), Value::Integer(1));
//!
//! let result = run("pid is 1 and name =~ 'ini.*'", &Value::Object(process)).unwrap();
//! assert_eq!(result, Value::Boolean(true));
//! ```
pub mod ast;
pub mod cli;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod protocols;
pub mod solver;
pub mod value;

pub use ast::{Expr, Infix, Keyword, Params, Path, Query, Token, TokenKind};
pub use error::{Error, EvalError, LexError, ParseError};
pub use lexer::{Tokenizer, tokenize};
pub use parser::Parser;
pub use protocols::{Application, Associative, Candidates, DefaultApplication, Superposition};
pub use solver::{Solution, Solver};
pub use value::Value;

/// Parses `source`, substituting template `params` when given.
pub fn parse(source: &str, params: Option<Params>) -> Result<Query, ParseError> {
    match params {
        Some(params) => Parser::with_params(source, params).parse(),
        None => Parser::new(source).parse(),
    }
}

/// Solves a parsed query against `data` with the given application.
pub fn solve<'q>(
    query: &'q Query,
    data: &Value,
    app: &dyn Application,
) -> Result<Solution<'q>, EvalError> {
    Solver::new(app).solve(query, data)
}

/// Parses and solves `source` against `data` with default capabilities,
/// returning only the value.
pub fn run(source: &str, data: &Value) -> Result<Value, Error> {
    let query = parse(source, None)?;
    let solution = Solver::default().solve(&query, data)?;
    Ok(solution.value)
}
