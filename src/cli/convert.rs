//! JSON <-> efilter Value conversion utilities

use serde_json::{Map, Number};

use super::CliError;
use crate::{Params, Value};

/// Convert serde_json::Value to an efilter Value
pub fn json_to_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(obj) => {
            Value::Object(obj.into_iter().map(|(k, v)| (k, json_to_value(v))).collect())
        }
    }
}

/// Convert an efilter Value to serde_json::Value.
///
/// Superpositions become arrays of their candidates. Records have no JSON
/// shape and are written in their display form.
pub fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(value_to_json).collect()),
        Value::Object(obj) => serde_json::Value::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Superposition(s) => {
            serde_json::Value::Array(s.candidates().map(|c| value_to_json(&c)).collect())
        }
        Value::Record(_) => serde_json::Value::String(v.to_string()),
    }
}

/// Reads template params from JSON: an array is positional, an object named.
pub fn params_from_json(source: &str) -> Result<Params, CliError> {
    match serde_json::from_str::<serde_json::Value>(source)? {
        serde_json::Value::Array(values) => {
            Ok(Params::Positional(values.into_iter().map(json_to_value).collect()))
        }
        serde_json::Value::Object(map) => Ok(Params::Named(
            map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect(),
        )),
        other => Err(CliError::InvalidParams(format!(
            "expected an array or an object, got `{other}`"
        ))),
    }
}
