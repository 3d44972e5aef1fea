//! Query criteria processing
//!
//! Turns the `oslc.prefix` / `oslc.select` / `oslc.where` / `oslc.orderBy` parameters
//! into a single CONSTRUCT query:
//! - [`parser`]: Pest grammar for the four mini-languages plus the graph filter
//! - [`ast`]: owned trees for conditions, selections and sort keys
//! - [`compiler`]: emits the SPARQL text
//! - [`filter`]: evaluates the plain graph filter in process

pub mod ast;
pub mod compiler;
pub mod filter;
pub mod parser;

pub use ast::{
    ComparisonOp, Condition, Identifier, QueryCriteria, QueryParams, Selection, SortDirection,
    SortKey, Value,
};
pub use compiler::{compile, CompiledQuery, MATCH_VAR};
pub use filter::GraphFilter;
pub use parser::parse_criteria;

use std::fmt;
use thiserror::Error;

/// Clause an error originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Prefix,
    Select,
    Where,
    OrderBy,
    /// Graph filter `where`
    Filter,
    /// Graph filter `select`
    Projection,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Clause::Prefix => "oslc.prefix",
            Clause::Select => "oslc.select",
            Clause::Where => "oslc.where",
            Clause::OrderBy => "oslc.orderBy",
            Clause::Filter => "where",
            Clause::Projection => "select",
        };
        f.write_str(name)
    }
}

/// Query errors. Both are caller input errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Input does not match the clause grammar
    #[error("Malformed {clause} clause: {message}")]
    MalformedQuery { clause: Clause, message: String },

    /// Identifier uses an undeclared prefix
    #[error("Unknown prefix '{prefix}' in {clause} clause")]
    UnknownPrefix { clause: Clause, prefix: String },
}

pub type QueryResult<T> = Result<T, QueryError>;
