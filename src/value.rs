use std::{collections::HashMap, fmt, sync::Arc};

use crate::protocols::{Associative, Candidates, Superposition};

/// A runtime value flowing through the solver.
///
/// Scalars and containers mirror JSON, with integers kept apart from floats.
/// `Record` and `Superposition` hold shared handles to application objects
/// that only expose the field-resolution and candidate-iteration protocols.
///
/// `Null` doubles as the "no value" sentinel produced when a field path does
/// not resolve.
///
/// # Examples
///
/// ```
/// use efilter::Value;
/// use std::collections::HashMap;
///
/// let pid = Value::Integer(42);
/// let name = Value::from("init");
/// let list = Value::from(vec![1, 2, 3]);
///
/// let mut process = HashMap::new();
/// process.insert("pid".to_string(), pid);
/// let object = Value::Object(process);
/// assert!(object.is_truthy());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// No value
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Ordered collection, produced by list literals like `(1, 2, 3)`
    Array(Vec<Value>),

    /// Plain key/value container
    Object(HashMap<String, Value>),

    /// Application object resolving its own fields
    Record(Arc<dyn Associative>),

    /// Several candidate values standing in for one logical value
    Superposition(Arc<dyn Superposition>),
}

impl Value {
    /// Builds a superposition over `candidates`.
    ///
    /// Zero candidates collapse to `Null` and a single candidate to itself, so
    /// a superposition always stands for at least two values.
    pub fn superposition(candidates: impl IntoIterator<Item = Value>) -> Value {
        let mut candidates: Vec<Value> = candidates.into_iter().collect();
        match candidates.len() {
            0 => Value::Null,
            1 => candidates.remove(0),
            _ => Value::Superposition(Arc::new(Candidates::new(candidates))),
        }
    }

    /// Wraps an application object.
    pub fn record(record: impl Associative + 'static) -> Value {
        Value::Record(Arc::new(record))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by `and`, `or`, `not` and the quantifiers.
    ///
    /// A superposition is truthy when it yields a candidate. That pulls from
    /// its iterator, so the solver only asks this of superpositions it has
    /// already copied out of the application.
    pub fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Null => false,
            Boolean(b) => *b,
            Float(n) => *n != 0.0,
            Integer(n) => *n != 0,
            String(s) => !s.is_empty(),
            Array(arr) => !arr.is_empty(),
            Object(obj) => !obj.is_empty(),
            Record(_) => true,
            Superposition(s) => s.candidates().next().is_some(),
        }
    }

    /// Looks up a single field, `None` when this value has no such field.
    pub fn get(&self, field: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(field).cloned(),
            Value::Record(record) => record.resolve(field),
            _ => None,
        }
    }

    /// Type name checked by `isa` and quoted in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Record(record) => record.type_name(),
            Value::Superposition(_) => "superposition",
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string, the way `=~` sees scalars
    pub fn as_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(n) => n.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            _ => self.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Record(a), Record(b)) => Arc::ptr_eq(a, b),
            (Superposition(a), Superposition(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Renders values in query syntax: strings single-quoted, arrays as `(a, b)`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.1}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::Array(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {}", map[key])?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => write!(f, "<{}>", record.type_name()),
            Value::Superposition(_) => write!(f, "<superposition>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}
