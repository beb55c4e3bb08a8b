use std::{cmp::Ordering, iter};

use log::{debug, trace};
use regex::Regex;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{Expr, Path, Query},
    error::EvalError,
    protocols::{Application, DefaultApplication},
    value::Value,
};

/// Outcome of solving a query or subexpression.
///
/// `branch` points at the part of the query that decided a disjunction
/// (`or`, `any`) or falsified an `each`, so callers can explain a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<'q> {
    pub value: Value,
    pub branch: Option<&'q Expr>,
}

impl<'q> Solution<'q> {
    fn new(value: Value) -> Self {
        Solution { value, branch: None }
    }

    fn with_branch(value: Value, branch: &'q Expr) -> Self {
        Solution { value, branch: Some(branch) }
    }

    pub fn is_truthy(&self) -> bool {
        self.value.is_truthy()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Arith {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Arith {
    fn verb(self) -> &'static str {
        match self {
            Arith::Add => "add",
            Arith::Subtract => "subtract",
            Arith::Multiply => "multiply",
            Arith::Divide => "divide",
        }
    }

    fn apply_f64(self, a: f64, b: f64) -> f64 {
        match self {
            Arith::Add => a + b,
            Arith::Subtract => a - b,
            Arith::Multiply => a * b,
            Arith::Divide => a / b,
        }
    }

    fn apply_decimal(self, a: Decimal, b: Decimal) -> Option<Decimal> {
        match self {
            Arith::Add => a.checked_add(b),
            Arith::Subtract => a.checked_sub(b),
            Arith::Multiply => a.checked_mul(b),
            Arith::Divide => a.checked_div(b),
        }
    }
}

/// The query evaluator.
///
/// Walks the tree depth-first against a data context. It holds nothing but
/// the application capabilities, so one solver (and one query) can serve any
/// number of contexts.
pub struct Solver<'a> {
    app: &'a dyn Application,
}

impl Default for Solver<'static> {
    fn default() -> Self {
        Solver { app: &DefaultApplication }
    }
}

impl<'a> Solver<'a> {
    pub fn new(app: &'a dyn Application) -> Self {
        Solver { app }
    }

    /// Solves `query` against `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// use efilter::{Query, Solver, Value};
    /// use std::collections::HashMap;
    ///
    /// let mut process = HashMap::new();
    /// process.insert("pid".to_string(), Value::Integer(2));
    ///
    /// let query = Query::parse("pid == 1 or pid == 2").unwrap();
    /// let solution = Solver::default().solve(&query, &Value::Object(process)).unwrap();
    ///
    /// assert_eq!(solution.value, Value::Boolean(true));
    /// assert_eq!(solution.branch.unwrap().to_string(), "pid == 2");
    /// ```
    pub fn solve<'q>(&self, query: &'q Query, data: &Value) -> Result<Solution<'q>, EvalError> {
        debug!("solving `{query}`");
        self.solve_expr(query.root(), data)
    }

    /// Solves a single expression against `scope`.
    pub fn solve_expr<'q>(&self, expr: &'q Expr, scope: &Value) -> Result<Solution<'q>, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(Solution::new(value.clone())),
            Expr::Binding(path) => {
                let value = self.resolve(path, scope)?;
                Ok(Solution::new(settle(value)))
            }
            Expr::ComponentLiteral(name) => {
                let present = self.app.has_component(scope, name);
                Ok(Solution::new(Value::Boolean(present)))
            }
            Expr::Let { context, body } => {
                let context = self.solve_expr(context, scope)?.value;
                self.solve_expr(body, &context)
            }
            Expr::LetAny { context, body } => {
                let context = self.quantified(context, scope)?;
                for (index, candidate) in candidates(&context).enumerate() {
                    let solution = self.solve_expr(body, &candidate)?;
                    trace!("any: candidate {index} -> {}", solution.value);
                    if solution.is_truthy() {
                        let branch = solution.branch.unwrap_or(body);
                        return Ok(Solution::with_branch(Value::Boolean(true), branch));
                    }
                }
                Ok(Solution::new(Value::Boolean(false)))
            }
            Expr::LetEach { context, body } => {
                let context = self.quantified(context, scope)?;
                for (index, candidate) in candidates(&context).enumerate() {
                    let solution = self.solve_expr(body, &candidate)?;
                    trace!("each: candidate {index} -> {}", solution.value);
                    if !solution.is_truthy() {
                        let branch = solution.branch.unwrap_or(body);
                        return Ok(Solution::with_branch(Value::Boolean(false), branch));
                    }
                }
                Ok(Solution::new(Value::Boolean(true)))
            }
            Expr::Complement(inner) => {
                let solution = self.solve_expr(inner, scope)?;
                Ok(Solution::new(Value::Boolean(!solution.is_truthy())))
            }
            Expr::Intersection(left, right) => {
                if !self.solve_expr(left, scope)?.is_truthy() {
                    return Ok(Solution::new(Value::Boolean(false)));
                }
                let right = self.solve_expr(right, scope)?;
                Ok(Solution::new(Value::Boolean(right.is_truthy())))
            }
            Expr::Union(left, right) => {
                let solution = self.solve_expr(left, scope)?;
                if solution.is_truthy() {
                    let branch = solution.branch.unwrap_or(left);
                    return Ok(Solution::with_branch(solution.value, branch));
                }
                let solution = self.solve_expr(right, scope)?;
                let branch = solution.branch.unwrap_or(right);
                Ok(Solution::with_branch(solution.value, branch))
            }
            Expr::Equivalence(left, right) => {
                let (left, right) = self.operands(left, right, scope)?;
                Ok(Solution::new(Value::Boolean(equivalent(&left, &right))))
            }
            Expr::Membership { needle, haystack } => {
                let (needle, haystack) = self.operands(needle, haystack, scope)?;
                membership(expr, &needle, &haystack).map(boolean)
            }
            Expr::ContainmentOrder { subset, superset } => {
                let (subset, superset) = self.operands(subset, superset, scope)?;
                containment(expr, &subset, &superset).map(boolean)
            }
            Expr::StrictOrder(left, right) => {
                let (left, right) = self.operands(left, right, scope)?;
                exists(&left, &right, &mut |left: &Value, right: &Value| {
                    Ok(ordering(expr, left, right)? == Some(Ordering::Greater))
                })
                .map(boolean)
            }
            Expr::PartialOrder(left, right) => {
                let (left, right) = self.operands(left, right, scope)?;
                exists(&left, &right, &mut |left: &Value, right: &Value| {
                    let ordering = ordering(expr, left, right)?;
                    Ok(matches!(ordering, Some(Ordering::Greater | Ordering::Equal)))
                })
                .map(boolean)
            }
            Expr::RegexFilter { subject, pattern } => {
                let (subject, pattern) = self.operands(subject, pattern, scope)?;
                regex_filter(expr, &subject, &pattern).map(boolean)
            }
            Expr::IsInstance { subject, type_name } => {
                let subject = self.solve_expr(subject, scope)?.value;
                Ok(boolean(self.app.is_instance(&subject, type_name)))
            }
            Expr::Sum(left, right) => self.arithmetic(expr, Arith::Add, left, right, scope),
            Expr::Difference(left, right) => {
                self.arithmetic(expr, Arith::Subtract, left, right, scope)
            }
            Expr::Product(left, right) => {
                self.arithmetic(expr, Arith::Multiply, left, right, scope)
            }
            Expr::Quotient(left, right) => self.arithmetic(expr, Arith::Divide, left, right, scope),
        }
    }

    fn operands(
        &self,
        left: &Expr,
        right: &Expr,
        scope: &Value,
    ) -> Result<(Value, Value), EvalError> {
        let left = self.solve_expr(left, scope)?.value;
        let right = self.solve_expr(right, scope)?.value;
        Ok((left, right))
    }

    /// A quantifier over a field walks that field's superposition directly,
    /// so it can stop at the first deciding candidate.
    fn quantified(&self, context: &Expr, scope: &Value) -> Result<Value, EvalError> {
        match context {
            Expr::Binding(path) => self.resolve(path, scope),
            other => Ok(self.solve_expr(other, scope)?.value),
        }
    }

    fn resolve(&self, path: &Path, scope: &Value) -> Result<Value, EvalError> {
        let value = resolve_path(scope, path.segments());
        if value.is_null() && !path.is_current() {
            if self.app.strict_bindings() {
                return Err(EvalError::Unresolved { path: path.clone() });
            }
            trace!("field `{path}` has no value");
        }
        Ok(value)
    }

    fn arithmetic<'q>(
        &self,
        node: &Expr,
        op: Arith,
        left: &Expr,
        right: &Expr,
        scope: &Value,
    ) -> Result<Solution<'q>, EvalError> {
        let (left, right) = self.operands(left, right, scope)?;
        apply_arith(node, op, &left, &right).map(Solution::new)
    }
}

fn boolean<'q>(b: bool) -> Solution<'q> {
    Solution::new(Value::Boolean(b))
}

/// Walks `segments` from `value`.
///
/// A superposition resolves the rest of the path on each candidate and keeps
/// the hits. A record skips a segment naming its own type when that segment is
/// not also a field.
fn resolve_path(value: &Value, segments: &[String]) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return value.clone();
    };

    match value {
        Value::Superposition(superposition) => {
            let mut hits = Vec::new();
            for candidate in superposition.candidates() {
                match resolve_path(&candidate, segments) {
                    Value::Null => {}
                    Value::Superposition(nested) => hits.extend(nested.candidates()),
                    hit => hits.push(hit),
                }
            }
            Value::superposition(hits)
        }
        Value::Record(record) => match record.resolve(first) {
            Some(next) => resolve_path(&next, rest),
            None if record.type_name() == first.as_str() => resolve_path(value, rest),
            None => Value::Null,
        },
        _ => match value.get(first) {
            Some(next) => resolve_path(&next, rest),
            None => Value::Null,
        },
    }
}

/// Copies a superposition's candidates into an owned [`Candidates`] list.
///
/// Application superpositions may be single-pass. Anything the solver hands
/// on, or walks more than once, goes through here first.
///
/// [`Candidates`]: crate::protocols::Candidates
fn settle(value: Value) -> Value {
    match value {
        Value::Superposition(superposition) => Value::superposition(superposition.candidates()),
        other => other,
    }
}

/// True when `test` holds for some pairing of candidates from both sides.
fn exists<F>(left: &Value, right: &Value, test: &mut F) -> Result<bool, EvalError>
where
    F: FnMut(&Value, &Value) -> Result<bool, EvalError>,
{
    match (left, right) {
        (Value::Superposition(superposition), other) => {
            let other = settle(other.clone());
            for candidate in superposition.candidates() {
                if exists(&candidate, &other, test)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (other, Value::Superposition(superposition)) => {
            for candidate in superposition.candidates() {
                if exists(other, &candidate, test)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => test(left, right),
    }
}

/// Candidates a quantifier ranges over. Arrays range over their elements and
/// a plain value is its own single candidate.
fn candidates(value: &Value) -> Box<dyn Iterator<Item = Value> + '_> {
    match value {
        Value::Null => Box::new(iter::empty()),
        Value::Superposition(superposition) => superposition.candidates(),
        Value::Array(items) => Box::new(items.iter().cloned()),
        other => Box::new(iter::once(other.clone())),
    }
}

/// Equality with "no value" absorbing: nothing equals a missing field. A
/// superposition equals a value when any of its candidates does.
fn equivalent(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Superposition(superposition), other) => {
            let other = settle(other.clone());
            superposition.candidates().any(|candidate| equivalent(&candidate, &other))
        }
        (other, Value::Superposition(superposition)) => superposition
            .candidates()
            .any(|candidate| equivalent(other, &candidate)),
        _ => same_value(left, right),
    }
}

/// Structural equality where integers and floats compare by numeric value.
fn same_value(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            *a as f64 == *b
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_value(x, y))
        }
        _ => left == right,
    }
}

fn membership(node: &Expr, needle: &Value, haystack: &Value) -> Result<bool, EvalError> {
    match (needle, haystack) {
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        // Any candidate of the needle will do; the haystack is read once
        (Value::Superposition(superposition), _) => {
            let haystack = settle(haystack.clone());
            for candidate in superposition.candidates() {
                if membership(node, &candidate, &haystack)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (_, Value::Array(items)) => Ok(items.iter().any(|item| equivalent(needle, item))),
        (_, Value::Superposition(superposition)) => Ok(superposition
            .candidates()
            .any(|candidate| equivalent(needle, &candidate))),
        (Value::String(needle), Value::String(haystack)) => Ok(haystack.contains(needle.as_str())),
        (Value::String(key), Value::Object(map)) => Ok(map.contains_key(key)),
        (needle, haystack) => Err(EvalError::type_error(
            node,
            format!(
                "cannot look for {} in {}",
                needle.type_name(),
                haystack.type_name()
            ),
        )),
    }
}

fn containment(node: &Expr, subset: &Value, superset: &Value) -> Result<bool, EvalError> {
    let collection = |value: &Value| match value {
        Value::Array(_) | Value::Superposition(_) | Value::Null => Ok(()),
        other => Err(EvalError::type_error(
            node,
            format!("containment needs collections, got {}", other.type_name()),
        )),
    };
    collection(subset)?;
    collection(superset)?;

    let superset: Vec<Value> = candidates(superset).collect();
    Ok(candidates(subset).all(|element| superset.iter().any(|other| equivalent(&element, other))))
}

/// Orders two scalar operands; `None` when either is missing or they are
/// unordered floats. Superpositions are split by the caller through
/// [`exists`].
fn ordering(node: &Expr, left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(None),
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            Ok(left.as_float().zip(right.as_float()).and_then(|(a, b)| a.partial_cmp(&b)))
        }
        (a, b) => Err(EvalError::type_error(
            node,
            format!("cannot order {} against {}", a.type_name(), b.type_name()),
        )),
    }
}

fn regex_filter(node: &Expr, subject: &Value, pattern: &Value) -> Result<bool, EvalError> {
    let pattern = match pattern {
        Value::Null => return Ok(false),
        Value::String(pattern) => pattern,
        other => {
            return Err(EvalError::type_error(
                node,
                format!("pattern must be a string, got {}", other.type_name()),
            ));
        }
    };
    let re = Regex::new(pattern).map_err(|source| EvalError::Regex {
        node: node.clone(),
        source,
    })?;

    pattern_match(node, &re, subject)
}

fn pattern_match(node: &Expr, re: &Regex, subject: &Value) -> Result<bool, EvalError> {
    match subject {
        Value::Null => Ok(false),
        Value::String(s) => Ok(re.is_match(s)),
        Value::Superposition(superposition) => {
            for candidate in superposition.candidates() {
                if pattern_match(node, re, &candidate)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
            Ok(re.is_match(&subject.as_string()))
        }
        other => Err(EvalError::type_error(
            node,
            format!("cannot match a pattern against {}", other.type_name()),
        )),
    }
}

fn apply_arith(node: &Expr, op: Arith, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arith(node, op, *a, *b),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(op.apply_f64(*a, *b))),
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            Ok(mixed_arith(op, left, right))
        }
        (Value::String(a), Value::String(b)) if op == Arith::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        (a, b) => Err(EvalError::type_error(
            node,
            format!("cannot {} {} and {}", op.verb(), a.type_name(), b.type_name()),
        )),
    }
}

fn integer_arith(node: &Expr, op: Arith, a: i64, b: i64) -> Result<Value, EvalError> {
    let overflow = || EvalError::Overflow { node: node.clone() };
    match op {
        Arith::Add => a.checked_add(b).map(Value::Integer).ok_or_else(overflow),
        Arith::Subtract => a.checked_sub(b).map(Value::Integer).ok_or_else(overflow),
        Arith::Multiply => a.checked_mul(b).map(Value::Integer).ok_or_else(overflow),
        Arith::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero { node: node.clone() });
            }
            // Exact quotients stay integers, anything else promotes to float
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b).map(Value::Integer).ok_or_else(overflow),
                Some(_) => Ok(Value::Float(a as f64 / b as f64)),
                None => Err(overflow()),
            }
        }
    }
}

/// Integer/float arithmetic through `Decimal`, so `0.1 * 10` is exactly `1`
/// and whole results come back as integers.
fn mixed_arith(op: Arith, left: &Value, right: &Value) -> Value {
    if let Some(ld) = to_decimal(left)
        && let Some(rd) = to_decimal(right)
        && let Some(result) = op.apply_decimal(ld, rd)
    {
        if result.is_integer()
            && let Some(r) = result.to_i64()
        {
            return Value::Integer(r);
        } else if let Some(r) = result.to_f64() {
            return Value::Float(r);
        }
    }

    let a = left.as_float().unwrap_or(f64::NAN);
    let b = right.as_float().unwrap_or(f64::NAN);
    Value::Float(op.apply_f64(a, b))
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Expr {
        Expr::literal(0)
    }

    #[test]
    fn test_integer_division_promotes_when_inexact() {
        assert_eq!(integer_arith(&node(), Arith::Divide, 10, 5).unwrap(), Value::Integer(2));
        assert_eq!(integer_arith(&node(), Arith::Divide, 10, 4).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert!(matches!(
            integer_arith(&node(), Arith::Divide, 1, 0),
            Err(EvalError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            integer_arith(&node(), Arith::Add, i64::MAX, 1),
            Err(EvalError::Overflow { .. })
        ));
        assert!(matches!(
            integer_arith(&node(), Arith::Divide, i64::MIN, -1),
            Err(EvalError::Overflow { .. })
        ));
    }

    #[test]
    fn test_mixed_arithmetic_preserves_whole_results() {
        let tenth = Value::Float(0.1);
        assert_eq!(mixed_arith(Arith::Multiply, &tenth, &Value::Integer(10)), Value::Integer(1));
        let ten = Value::Float(10.0);
        assert_eq!(mixed_arith(Arith::Divide, &ten, &Value::Integer(4)), Value::Float(2.5));
    }

    #[test]
    fn test_equivalence_is_numeric_and_absorbs_null() {
        assert!(equivalent(&Value::Integer(1), &Value::Float(1.0)));
        assert!(!equivalent(&Value::Null, &Value::Null));
        assert!(equivalent(&Value::from(vec![1, 2]), &Value::from(vec![1.0, 2.0])));
    }

    #[test]
    fn test_resolve_path_through_superposition() {
        let child = |pid: i64| {
            let mut map = std::collections::HashMap::new();
            map.insert("pid".to_string(), Value::Integer(pid));
            Value::Object(map)
        };
        let children = Value::superposition(vec![child(2), child(3), Value::Integer(7)]);
        let pids = resolve_path(&children, &["pid".to_string()]);
        assert_eq!(candidates(&pids).collect::<Vec<_>>(), vec![Value::Integer(2), Value::Integer(3)]);
    }
}
