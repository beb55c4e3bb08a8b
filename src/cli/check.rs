//! Execute efilter queries against JSON input

use log::info;

use super::{CliError, json_to_value, params_from_json, value_to_json};
use crate::{Application, Parser, Query, Solver, Value};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query to execute
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// JSON array or object of template parameters
    pub params: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
    /// Fail on field paths that resolve to nothing
    pub strict: bool,
    /// Report which branch of the query decided the result
    pub trace: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed successfully
    Success {
        output: serde_json::Value,
        /// The deciding subexpression, present only when tracing
        branch: Option<String>,
    },
}

/// Capabilities for plain JSON input, with strict bindings on request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckApplication {
    pub strict: bool,
}

impl Application for CheckApplication {
    fn strict_bindings(&self) -> bool {
        self.strict
    }
}

/// Execute an efilter check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = parse_query(options)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let json_value: serde_json::Value = serde_json::from_str(json_str)?;
    let input_value: Value = json_to_value(json_value);

    let app = CheckApplication { strict: options.strict };
    let solution = Solver::new(&app).solve(&query, &input_value)?;

    let branch = match solution.branch {
        Some(branch) if options.trace => Some(branch.to_string()),
        _ => None,
    };
    info!("query `{query}` solved to {}", solution.value);

    Ok(CheckResult::Success {
        output: value_to_json(&solution.value),
        branch,
    })
}

fn parse_query(options: &CheckOptions) -> Result<Query, CliError> {
    let parser = match &options.params {
        Some(params) => Parser::with_params(&options.query, params_from_json(params)?),
        None => Parser::new(&options.query),
    };
    Ok(parser.parse()?)
}
