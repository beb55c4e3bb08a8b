//! # EFILTER Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the syntax tree of the query language,
//! a small filter language for asking questions about forensic objects whose
//! fields may be missing or may hold several candidate values at once.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the tokenizer
//! - **[operators]** - Infix operators and keywords
//! - **[expressions]** - Expression nodes and binding paths
//! - **[query]** - The parsed query root and template parameters
//!
//! ## Quick Start
//!
//! ```text
//! Process/pid is 1 or any Process/children matches (Process/command is 'init')
//! ```
//!
//! This query holds for the process with pid 1, and for any process with at
//! least one child running `init`.
//!
//! ## Core Concepts
//!
//! ### Field Paths
//!
//! Bare words name fields. Segments may be separated by `/` or `.`, and both
//! spellings produce the same [`Path`]:
//!
//! ```text
//! Process/parent/pid
//! Process.parent.pid
//! ```
//!
//! A path that resolves to nothing produces no value, which is false in a
//! condition and never equal to anything.
//!
//! ### Navigation and Quantifiers
//!
//! - `A -> B` / `A matches B` - evaluate `B` against the object at `A`
//! - `any A matches B` - `B` holds for at least one candidate at `A`
//! - `each A matches B` - `B` holds for every candidate at `A`
//!
//! ### Templates
//!
//! `{}` and `{name}` placeholders are replaced by literal values at parse
//! time. A placeholder can never stand in for a field path.
//!
//! ## Examples
//!
//! ### Precedence
//!
//! ```text
//! 5 == 1 * 5 and Process/name is 'init'
//! ```
//!
//! ### Lists and Negated Membership
//!
//! ```text
//! Process/command not in ('launchd', 'foo')
//! ```
//!
//! ### Regular Expressions
//!
//! ```text
//! Process/name =~ 'ini.*'
//! ```
pub mod expressions;
pub mod operators;
pub mod query;
pub mod tokens;

pub use expressions::{Expr, Path};
pub use operators::{Infix, Keyword};
pub use query::{Params, Query};
pub use tokens::{Token, TokenKind};
