use std::fmt;

use crate::value::Value;

/// Field path of a binding, stored as its segments.
///
/// `Process/pid` and `Process.pid` parse to the same path. The empty path
/// stands for the current context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<String>);

impl Path {
    /// Splits `text` on `/` and `.`.
    pub fn parse(text: &str) -> Self {
        Path(
            text.split(['/', '.'])
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The path of the current context.
    pub fn current() -> Self {
        Path(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_current(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Path {
    fn from(text: &str) -> Self {
        Path::parse(text)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_current() {
            return f.write_str(".");
        }
        f.write_str(&self.0.join("/"))
    }
}

/// Abstract Syntax Tree node.
///
/// Every node owns its children. Two trees are equal when they have the same
/// shape and the same literals, which is how parsed queries are compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Values
    /// Literal value, including list literals and substituted params
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 'init'
    /// ('foo', 'bar')
    /// ```
    Literal(Value),

    /// Field path resolved against the current context
    ///
    /// # Examples
    /// ```text
    /// pid
    /// Process/command
    /// ```
    Binding(Path),

    /// Component test, answered by the application
    ///
    /// # Example
    /// ```text
    /// has component Process
    /// ```
    ComponentLiteral(String),

    // Navigation
    /// Evaluate `body` against the object bound by `context`
    ///
    /// # Examples
    /// ```text
    /// Process/parent -> Process/command is 'init'
    /// Process/parent matches (Process/pid is 1)
    /// ```
    Let { context: Box<Expr>, body: Box<Expr> },

    /// True when `body` holds for at least one candidate of `context`
    ///
    /// # Example
    /// ```text
    /// any Process/children matches Process/command is 'init'
    /// ```
    LetAny { context: Box<Expr>, body: Box<Expr> },

    /// True when `body` holds for every candidate of `context`
    ///
    /// # Example
    /// ```text
    /// each Process/children matches Process/command is 'foo'
    /// ```
    LetEach { context: Box<Expr>, body: Box<Expr> },

    // Logic
    /// Logical negation (`not`)
    Complement(Box<Expr>),
    /// Logical AND (`and`)
    Intersection(Box<Expr>, Box<Expr>),
    /// Logical OR (`or`), records the matching branch
    Union(Box<Expr>, Box<Expr>),

    // Comparison
    /// Equality (`is`, `==`)
    Equivalence(Box<Expr>, Box<Expr>),
    /// Membership (`in`)
    Membership { needle: Box<Expr>, haystack: Box<Expr> },
    /// Every element of `subset` appears in `superset`; no surface syntax
    ContainmentOrder { subset: Box<Expr>, superset: Box<Expr> },
    /// Left is strictly greater than right (`>`, and `<` with operands swapped)
    StrictOrder(Box<Expr>, Box<Expr>),
    /// Left is greater than or equal to right (`>=`, and `<=` swapped)
    PartialOrder(Box<Expr>, Box<Expr>),
    /// Regular expression search (`=~`)
    RegexFilter { subject: Box<Expr>, pattern: Box<Expr> },
    /// Type test (`isa`)
    IsInstance { subject: Box<Expr>, type_name: String },

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Sum(Box<Expr>, Box<Expr>),
    /// Subtraction (`-`)
    Difference(Box<Expr>, Box<Expr>),
    /// Multiplication (`*`), also the desugaring of prefix `-`
    Product(Box<Expr>, Box<Expr>),
    /// Division (`/`)
    Quotient(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn binding(path: &str) -> Expr {
        Expr::Binding(Path::parse(path))
    }

    pub fn component(name: &str) -> Expr {
        Expr::ComponentLiteral(name.to_string())
    }

    pub fn let_in(context: Expr, body: Expr) -> Expr {
        Expr::Let { context: Box::new(context), body: Box::new(body) }
    }

    pub fn let_any(context: Expr, body: Expr) -> Expr {
        Expr::LetAny { context: Box::new(context), body: Box::new(body) }
    }

    pub fn let_each(context: Expr, body: Expr) -> Expr {
        Expr::LetEach { context: Box::new(context), body: Box::new(body) }
    }

    pub fn complement(expr: Expr) -> Expr {
        Expr::Complement(Box::new(expr))
    }

    pub fn intersection(left: Expr, right: Expr) -> Expr {
        Expr::Intersection(Box::new(left), Box::new(right))
    }

    pub fn union(left: Expr, right: Expr) -> Expr {
        Expr::Union(Box::new(left), Box::new(right))
    }

    pub fn equivalence(left: Expr, right: Expr) -> Expr {
        Expr::Equivalence(Box::new(left), Box::new(right))
    }

    pub fn membership(needle: Expr, haystack: Expr) -> Expr {
        Expr::Membership { needle: Box::new(needle), haystack: Box::new(haystack) }
    }

    pub fn containment(subset: Expr, superset: Expr) -> Expr {
        Expr::ContainmentOrder { subset: Box::new(subset), superset: Box::new(superset) }
    }

    pub fn strict_order(left: Expr, right: Expr) -> Expr {
        Expr::StrictOrder(Box::new(left), Box::new(right))
    }

    pub fn partial_order(left: Expr, right: Expr) -> Expr {
        Expr::PartialOrder(Box::new(left), Box::new(right))
    }

    pub fn regex_filter(subject: Expr, pattern: Expr) -> Expr {
        Expr::RegexFilter { subject: Box::new(subject), pattern: Box::new(pattern) }
    }

    pub fn is_instance(subject: Expr, type_name: &str) -> Expr {
        Expr::IsInstance { subject: Box::new(subject), type_name: type_name.to_string() }
    }

    pub fn sum(left: Expr, right: Expr) -> Expr {
        Expr::Sum(Box::new(left), Box::new(right))
    }

    pub fn difference(left: Expr, right: Expr) -> Expr {
        Expr::Difference(Box::new(left), Box::new(right))
    }

    pub fn product(left: Expr, right: Expr) -> Expr {
        Expr::Product(Box::new(left), Box::new(right))
    }

    pub fn quotient(left: Expr, right: Expr) -> Expr {
        Expr::Quotient(Box::new(left), Box::new(right))
    }

    /// Prefix `-x`, desugared to `-1 * x`.
    pub fn negation(expr: Expr) -> Expr {
        Expr::product(Expr::Literal(Value::Integer(-1)), expr)
    }

    /// The operand of a prefix `-`, when this node is one.
    pub fn negated(&self) -> Option<&Expr> {
        match self {
            Expr::Product(left, right) if **left == Expr::Literal(Value::Integer(-1)) => {
                Some(right.as_ref())
            }
            _ => None,
        }
    }

    fn is_atom(&self) -> bool {
        matches!(self, Expr::Literal(_) | Expr::Binding(_) | Expr::ComponentLiteral(_))
    }
}

/// Writes a child node, parenthesized unless it is an atom.
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.negated() {
            // `(-5)` alone reads back as a negative literal
            Some(operand @ Expr::Literal(Value::Integer(_) | Value::Float(_))) => {
                write!(f, "(-({operand}))")
            }
            _ if self.0.is_atom() => write!(f, "{}", self.0),
            _ => write!(f, "({})", self.0),
        }
    }
}

/// Writes an operand of `+` or `-`, where prefix minus reads back unchanged.
struct Term<'a>(&'a Expr);

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.negated() {
            Some(_) => write!(f, "{}", self.0),
            None => write!(f, "{}", Operand(self.0)),
        }
    }
}

/// Renders the node in query syntax.
///
/// `ContainmentOrder` has no syntax and renders as `subset(a, b)`. Negative
/// number literals render as `(-5)` and prefix minus as `-x`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Integer(n)) if *n < 0 => write!(f, "({n})"),
            Expr::Literal(value @ Value::Float(n)) if n.is_sign_negative() => write!(f, "({value})"),
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Binding(path) => write!(f, "{path}"),
            Expr::ComponentLiteral(name) => write!(f, "has component {name}"),
            Expr::Let { context, body } => write!(f, "{} -> {}", Operand(context), Operand(body)),
            Expr::LetAny { context, body } => {
                write!(f, "any {} matches {}", Operand(context), Operand(body))
            }
            Expr::LetEach { context, body } => {
                write!(f, "each {} matches {}", Operand(context), Operand(body))
            }
            Expr::Complement(inner) => match inner.as_ref() {
                Expr::Membership { needle, haystack } => {
                    write!(f, "{} not in {}", Operand(needle), Operand(haystack))
                }
                Expr::Equivalence(left, right) => {
                    write!(f, "{} is not {}", Operand(left), Operand(right))
                }
                other => write!(f, "not {}", Operand(other)),
            },
            Expr::Intersection(left, right) => write!(f, "{} and {}", Operand(left), Operand(right)),
            Expr::Union(left, right) => write!(f, "{} or {}", Operand(left), Operand(right)),
            Expr::Equivalence(left, right) => write!(f, "{} == {}", Operand(left), Operand(right)),
            Expr::Membership { needle, haystack } => {
                write!(f, "{} in {}", Operand(needle), Operand(haystack))
            }
            Expr::ContainmentOrder { subset, superset } => write!(f, "subset({subset}, {superset})"),
            Expr::StrictOrder(left, right) => write!(f, "{} > {}", Operand(left), Operand(right)),
            Expr::PartialOrder(left, right) => write!(f, "{} >= {}", Operand(left), Operand(right)),
            Expr::RegexFilter { subject, pattern } => {
                write!(f, "{} =~ {}", Operand(subject), Operand(pattern))
            }
            Expr::IsInstance { subject, type_name } => match subject.as_ref() {
                Expr::Binding(path) if path.is_current() => write!(f, "isa {type_name}"),
                other => write!(f, "{} isa {type_name}", Operand(other)),
            },
            Expr::Sum(left, right) => write!(f, "{} + {}", Term(left), Term(right)),
            Expr::Difference(left, right) => write!(f, "{} - {}", Term(left), Term(right)),
            Expr::Product(left, right) => match self.negated() {
                Some(operand) if operand.is_atom() => write!(f, "-{operand}"),
                Some(operand) => write!(f, "-({operand})"),
                None => write!(f, "{} * {}", Operand(left), Operand(right)),
            },
            Expr::Quotient(left, right) => write!(f, "{} / {}", Operand(left), Operand(right)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_separators_are_equivalent() {
        assert_eq!(Path::parse("Process.pid"), Path::parse("Process/pid"));
        assert_eq!(Path::parse("Process/parent.pid").segments(), ["Process", "parent", "pid"]);
        assert!(Path::current().is_current());
    }

    #[test]
    fn test_display() {
        let expr = Expr::union(
            Expr::equivalence(Expr::binding("Process.pid"), Expr::literal(1)),
            Expr::complement(Expr::membership(
                Expr::binding("Process/command"),
                Expr::literal(vec!["launchd", "foo"]),
            )),
        );
        assert_eq!(
            expr.to_string(),
            "(Process/pid == 1) or (Process/command not in ('launchd', 'foo'))"
        );
    }

    #[test]
    fn test_display_negative_numbers() {
        assert_eq!(Expr::literal(-5).to_string(), "(-5)");
        assert_eq!(Expr::literal(-2.5).to_string(), "(-2.5)");
        assert_eq!(Expr::negation(Expr::literal(5)).to_string(), "-5");
        assert_eq!(Expr::negation(Expr::binding("pid")).to_string(), "-pid");
        assert_eq!(
            Expr::negation(Expr::sum(Expr::literal(5), Expr::literal(5))).to_string(),
            "-(5 + 5)"
        );
        assert_eq!(
            Expr::product(Expr::negation(Expr::literal(5)), Expr::literal(2)).to_string(),
            "(-(5)) * 2"
        );
        assert_eq!(
            Expr::sum(Expr::negation(Expr::literal(5)), Expr::literal(5)).to_string(),
            "-5 + 5"
        );
        assert_eq!(
            Expr::difference(Expr::literal(5), Expr::negation(Expr::literal(2.5))).to_string(),
            "5 - -2.5"
        );
    }

    #[test]
    fn test_display_prefix_isa() {
        let expr = Expr::is_instance(Expr::Binding(Path::current()), "Process");
        assert_eq!(expr.to_string(), "isa Process");
    }
}
