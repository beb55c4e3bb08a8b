//! CLI support for efilter
//!
//! Runs queries against JSON documents. Exposed as a library module so other
//! tools can embed the same check behavior the binary has.

mod check;
mod convert;

pub use check::{CheckApplication, CheckOptions, CheckResult, execute_check};
pub use convert::{json_to_value, params_from_json, value_to_json};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// `--params` was valid JSON but neither an array nor an object
    #[error("Invalid params: {0}")]
    InvalidParams(String),
}
