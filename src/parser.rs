use std::collections::HashSet;

use log::debug;

use crate::{
    ast::{Expr, Infix, Keyword, Params, Path, Query, Token, TokenKind},
    error::ParseError,
    lexer::Tokenizer,
    value::Value,
};

/// Recursive-descent parser, one method per precedence level.
///
/// Levels from loosest to tightest: `or`, `and`, prefix `not`, comparisons,
/// `+`/`-`, prefix `-`, `*`/`/`, primaries.
pub struct Parser {
    tokenizer: Tokenizer,
    current_token: Option<Token>,
    params: Option<Params>,
    next_positional: usize,
    used_names: HashSet<String>,
}

enum Quantifier {
    Any,
    Each,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            tokenizer: Tokenizer::new(source),
            current_token: None,
            params: None,
            next_positional: 0,
            used_names: HashSet::new(),
        }
    }

    pub fn with_params(source: &str, params: Params) -> Self {
        Parser {
            params: Some(params),
            ..Parser::new(source)
        }
    }

    /// Parses the whole input into a query.
    pub fn parse(mut self) -> Result<Query, ParseError> {
        self.advance()?;
        let root = self.parse_expression()?;

        if self.current_token.is_some() {
            return Err(self.unexpected("Expected an operator or end of query"));
        }
        self.check_params_consumed()?;

        debug!("parsed query `{root}`");
        Ok(Query::new(root))
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.tokenizer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(self.current_token.clone(), message)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_token.as_ref().is_some_and(|token| &token.kind == kind)
    }

    fn check_infix(&self, op: Infix) -> bool {
        self.current_infix() == Some(op)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(&TokenKind::Keyword(keyword))
    }

    fn current_infix(&self) -> Option<Infix> {
        match &self.current_token {
            Some(Token { kind: TokenKind::Infix(op), .. }) => Some(*op),
            _ => None,
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), ParseError> {
        if !self.check(&kind) {
            return Err(self.unexpected(message));
        }
        self.advance()
    }

    /// Consumes a field path, or a type/component name.
    fn expect_identifier(&mut self, what: &str) -> Result<String, ParseError> {
        match &self.current_token {
            Some(Token { kind: TokenKind::Identifier(text), .. }) => {
                let text = text.clone();
                self.advance()?;
                Ok(text)
            }
            Some(Token { kind: TokenKind::Param(_), .. }) => Err(self.unexpected(format!(
                "Template parameters substitute literals and cannot stand in for {what}"
            ))),
            _ => Err(self.unexpected(format!("Expected {what}"))),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check_infix(Infix::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::union(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check_infix(Infix::And) {
            self.advance()?;
            let right = self.parse_not()?;
            left = Expr::intersection(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check_keyword(Keyword::Not) {
            self.advance()?;
            return Ok(Expr::complement(self.parse_not()?));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_additive()?;

        if self.check_keyword(Keyword::Isa) {
            self.advance()?;
            let type_name = self.expect_identifier("a type name after `isa`")?;
            return Ok(Expr::is_instance(left, &type_name));
        }

        let Some(op) = self.current_infix() else {
            return Ok(left);
        };
        if op.is_navigation() {
            return Err(self.unexpected(format!(
                "The left side of `{op}` must be a field path"
            )));
        }
        if !op.is_comparison() {
            return Ok(left);
        }

        self.advance()?;
        let right = self.parse_additive()?;

        let expr = match op {
            Infix::Is | Infix::Equal => Expr::equivalence(left, right),
            Infix::IsNot | Infix::NotEqual => Expr::complement(Expr::equivalence(left, right)),
            Infix::In => Expr::membership(left, right),
            Infix::NotIn => Expr::complement(Expr::membership(left, right)),
            Infix::GreaterThan => Expr::strict_order(left, right),
            Infix::GreaterEqual => Expr::partial_order(left, right),
            Infix::LessThan => Expr::strict_order(right, left),
            Infix::LessEqual => Expr::partial_order(right, left),
            Infix::RegexMatch => Expr::regex_filter(left, right),
            _ => unreachable!("`{op}` is not a comparison"),
        };

        if self.current_infix().is_some_and(|op| op.is_comparison()) {
            return Err(self.unexpected("Comparison operators cannot be chained"));
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_infix() {
                Some(Infix::Add) => Expr::sum,
                Some(Infix::Subtract) => Expr::difference,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;
            left = op(left, right);
        }
        Ok(left)
    }

    /// Prefix `-` binds looser than `*` and `/`: `-5 * 5` is `-(5 * 5)`.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.check_infix(Infix::Subtract) {
            self.advance()?;
            return Ok(Expr::negation(self.parse_unary()?));
        }
        self.parse_multiplicative()
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        loop {
            let op = match self.current_infix() {
                Some(Infix::Multiply) => Expr::product,
                Some(Infix::Divide) => Expr::quotient,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_primary()?;
            left = op(left, right);
        }
        Ok(left)
    }

    /// Parse primary expressions: literals, params, field paths, parentheses,
    /// quantifiers and the `has component` / `isa` tests.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.current_token.clone() else {
            return Err(self.unexpected("Unexpected end of query, expected an expression"));
        };

        match token.kind {
            TokenKind::Literal(value) => {
                self.advance()?;
                Ok(Expr::Literal(value))
            }
            TokenKind::Param(name) => {
                let value = self.substitute(name.as_deref())?;
                self.advance()?;
                Ok(Expr::Literal(value))
            }
            TokenKind::Identifier(text) => {
                self.advance()?;
                self.parse_navigation(Expr::Binding(Path::parse(&text)))
            }
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::Keyword(Keyword::Any) => self.parse_quantifier(Quantifier::Any),
            TokenKind::Keyword(Keyword::Each) => self.parse_quantifier(Quantifier::Each),
            TokenKind::Keyword(Keyword::Has) => {
                self.advance()?;
                self.expect(
                    TokenKind::Keyword(Keyword::Component),
                    "Expected `component` after `has`",
                )?;
                let name = self.expect_identifier("a component name")?;
                Ok(Expr::ComponentLiteral(name))
            }
            TokenKind::Keyword(Keyword::Isa) => {
                self.advance()?;
                let type_name = self.expect_identifier("a type name after `isa`")?;
                Ok(Expr::is_instance(Expr::Binding(Path::current()), &type_name))
            }
            // Negated operand of `*` or `/`, as in `2 * -3`
            TokenKind::Infix(Infix::Subtract) => {
                self.advance()?;
                Ok(Expr::negation(self.parse_primary()?))
            }
            _ => Err(self.unexpected("Expected an expression")),
        }
    }

    /// `A -> B`, `A matches B` and `A where B` after a field path.
    fn parse_navigation(&mut self, binding: Expr) -> Result<Expr, ParseError> {
        if !self.current_infix().is_some_and(|op| op.is_navigation()) {
            return Ok(binding);
        }
        self.advance()?;
        let body = self.parse_not()?;
        Ok(Expr::let_in(binding, body))
    }

    fn parse_quantifier(&mut self, quantifier: Quantifier) -> Result<Expr, ParseError> {
        self.advance()?; // consume any/each

        let keyword = match quantifier {
            Quantifier::Any => "any",
            Quantifier::Each => "each",
        };
        let path = self.expect_identifier(&format!("a field path after `{keyword}`"))?;

        if !self.current_infix().is_some_and(|op| op.is_navigation()) {
            return Err(self.unexpected(format!(
                "`{keyword}` must be followed by a field path and a `matches` clause"
            )));
        }
        self.advance()?;

        let context = Expr::Binding(Path::parse(&path));
        let body = self.parse_not()?;
        Ok(match quantifier {
            Quantifier::Any => Expr::let_any(context, body),
            Quantifier::Each => Expr::let_each(context, body),
        })
    }

    /// Grouping `(expr)`, or a list literal `()` / `(a, b, ...)`.
    fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // consume '('

        if self.check(&TokenKind::RParen) {
            self.advance()?;
            return Ok(Expr::Literal(Value::Array(Vec::new())));
        }
        if let Some(value) = self.negative_number()? {
            return Ok(Expr::Literal(value));
        }

        let start = self.current_token.clone();
        let first = self.parse_expression()?;

        if !self.check(&TokenKind::Comma) {
            self.expect(TokenKind::RParen, "Expected `)`")?;
            return Ok(first);
        }

        let mut items = vec![constant(first, start)?];
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            let start = self.current_token.clone();
            let item = self.parse_expression()?;
            items.push(constant(item, start)?);
        }

        self.expect(TokenKind::RParen, "Expected `,` or `)` in list")?;
        Ok(Expr::Literal(Value::Array(items)))
    }

    /// `(-5)`, exactly, is the literal `-5` rather than `-1 * 5`. Called just
    /// past the `(`.
    fn negative_number(&mut self) -> Result<Option<Value>, ParseError> {
        if !self.check_infix(Infix::Subtract) {
            return Ok(None);
        }
        let value = match self.tokenizer.peek(1)? {
            Some(Token { kind: TokenKind::Literal(Value::Integer(n)), .. }) => Value::Integer(-n),
            Some(Token { kind: TokenKind::Literal(Value::Float(n)), .. }) => Value::Float(-n),
            _ => return Ok(None),
        };
        if !matches!(self.tokenizer.peek(2)?, Some(Token { kind: TokenKind::RParen, .. })) {
            return Ok(None);
        }

        for _ in 0..3 {
            self.advance()?; // `-`, the number, `)`
        }
        Ok(Some(value))
    }

    fn substitute(&mut self, name: Option<&str>) -> Result<Value, ParseError> {
        match (&self.params, name) {
            (None, _) => Err(self.unexpected("Query has a template placeholder but no params")),
            (Some(Params::Positional(values)), None) => {
                let value = values.get(self.next_positional).cloned();
                match value {
                    Some(value) => {
                        self.next_positional += 1;
                        Ok(value)
                    }
                    None => Err(self.unexpected(format!(
                        "Not enough params: only {} supplied",
                        values.len()
                    ))),
                }
            }
            (Some(Params::Named(values)), Some(name)) => match values.get(name).cloned() {
                Some(value) => {
                    self.used_names.insert(name.to_string());
                    Ok(value)
                }
                None => Err(self.unexpected(format!("No param named `{name}`"))),
            },
            (Some(Params::Positional(_)), Some(name)) => Err(self.unexpected(format!(
                "Named placeholder `{{{name}}}` needs named params"
            ))),
            (Some(Params::Named(_)), None) => {
                Err(self.unexpected("Positional placeholder `{}` needs positional params"))
            }
        }
    }

    fn check_params_consumed(&self) -> Result<(), ParseError> {
        match &self.params {
            Some(Params::Positional(values)) if self.next_positional < values.len() => {
                Err(ParseError::syntax(
                    None,
                    format!(
                        "{} params supplied but only {} used",
                        values.len(),
                        self.next_positional
                    ),
                ))
            }
            Some(Params::Named(values)) => {
                let mut unused: Vec<&str> = values
                    .keys()
                    .filter(|name| !self.used_names.contains(*name))
                    .map(String::as_str)
                    .collect();
                if unused.is_empty() {
                    return Ok(());
                }
                unused.sort_unstable();
                Err(ParseError::syntax(
                    None,
                    format!("Unused params: {}", unused.join(", ")),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// List elements must be constants: literals, params, negated numbers or
/// nested lists.
fn constant(expr: Expr, start: Option<Token>) -> Result<Value, ParseError> {
    match expr {
        Expr::Literal(value) => Ok(value),
        Expr::Product(left, right) if *left == Expr::Literal(Value::Integer(-1)) => match *right {
            Expr::Literal(Value::Integer(n)) => Ok(Value::Integer(-n)),
            Expr::Literal(Value::Float(n)) => Ok(Value::Float(-n)),
            _ => Err(ParseError::syntax(start, "List elements must be literal values")),
        },
        _ => Err(ParseError::syntax(start, "List elements must be literal values")),
    }
}
