use std::{collections::HashMap, fmt, str::FromStr};

use crate::ast::Expr;
use crate::error::ParseError;
use crate::parser::Parser;
use crate::value::Value;

/// A parsed query: one AST root.
///
/// Queries compare by the structure of their trees, so a query built by hand
/// equals the same query parsed from text.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    root: Expr,
}

impl Query {
    pub fn new(root: Expr) -> Self {
        Query { root }
    }

    /// Parses `source` with no template parameters.
    pub fn parse(source: &str) -> Result<Query, ParseError> {
        Parser::new(source).parse()
    }

    /// Parses `source`, substituting `{}` / `{name}` placeholders from `params`.
    pub fn parse_with_params(source: &str, params: Params) -> Result<Query, ParseError> {
        Parser::with_params(source, params).parse()
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    pub fn into_root(self) -> Expr {
        self.root
    }
}

impl From<Expr> for Query {
    fn from(root: Expr) -> Self {
        Query::new(root)
    }
}

impl FromStr for Query {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Query::parse(source)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Template parameters substituted at parse time.
///
/// Positional params feed `{}` placeholders left to right; named params feed
/// `{name}` placeholders. Either way a param only ever becomes a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(HashMap<String, Value>),
}

impl Params {
    pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn named<K: Into<String>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Params::Named(
            pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
