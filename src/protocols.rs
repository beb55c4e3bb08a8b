//! Capabilities the solver consumes from the host application.
//!
//! The solver never looks inside application objects. It only needs:
//!
//! - [`Associative`] to resolve a field on an object,
//! - [`Superposition`] to walk the candidates standing in for one value,
//! - [`Application`] for `isa`, `has component` and the binding policy.

use std::fmt;

use crate::value::Value;

/// Field resolution for objects that are not plain key/value containers.
///
/// # Examples
///
/// ```
/// use efilter::{Associative, Value};
///
/// #[derive(Debug)]
/// struct Process {
///     pid: i64,
/// }
///
/// impl Associative for Process {
///     fn resolve(&self, field: &str) -> Option<Value> {
///         match field {
///             "pid" => Some(Value::Integer(self.pid)),
///             _ => None,
///         }
///     }
///
///     fn type_name(&self) -> &str {
///         "Process"
///     }
/// }
///
/// let init = Value::record(Process { pid: 1 });
/// assert_eq!(init.get("pid"), Some(Value::Integer(1)));
/// ```
pub trait Associative: fmt::Debug + Send + Sync {
    /// Value of `field`, or `None` when the object has no such field.
    fn resolve(&self, field: &str) -> Option<Value>;

    /// Declared type name.
    ///
    /// A path segment equal to the type name is skipped when it does not
    /// resolve as a field, so `Process/pid` reaches `pid` on a `Process`.
    fn type_name(&self) -> &str;
}

/// Zero or more candidate values behind one logical slot.
///
/// Implementations may be single-pass. The solver calls
/// [`candidates`](Superposition::candidates) at most once on any superposition
/// the application hands it and consumes the iterator in order. A quantifier
/// over a field stops early when it short-circuits; every other use copies the
/// candidates out first and works on that copy.
pub trait Superposition: fmt::Debug + Send + Sync {
    fn candidates(&self) -> Box<dyn Iterator<Item = Value> + '_>;
}

/// Superposition backed by an owned list of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates(Vec<Value>);

impl Candidates {
    pub fn new(values: Vec<Value>) -> Self {
        Candidates(values)
    }
}

impl Superposition for Candidates {
    fn candidates(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        Box::new(self.0.iter().cloned())
    }
}

impl FromIterator<Value> for Candidates {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Candidates(iter.into_iter().collect())
    }
}

/// Application-level capabilities threaded through every solver call.
pub trait Application {
    /// Whether `value` is an instance of the type called `type_name`.
    fn is_instance(&self, value: &Value, type_name: &str) -> bool {
        value.type_name() == type_name
    }

    /// Whether `value` carries the component `name`.
    fn has_component(&self, value: &Value, name: &str) -> bool {
        value.get(name).is_some_and(|component| !component.is_null())
    }

    /// When true, a field path that resolves to nothing is an error instead
    /// of `Null`.
    fn strict_bindings(&self) -> bool {
        false
    }
}

/// The capability set used when the host supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApplication;

impl Application for DefaultApplication {}
