//! CLI support for artemis-query
//!
//! Provides programmatic access to the `artemis` commands so other tools can
//! embed them.

mod check;
mod convert;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, parse_binding};
pub use convert::{entity_to_json, json_to_value, load_data, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

use crate::QueryError;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A `--bind` argument not of the form `name=json`
    #[error("Invalid binding '{0}', expected name=<json value>")]
    InvalidBinding(String),

    /// Data file with an unexpected layout
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown category: '{0}'\nRun 'artemis docs' to see available categories.")]
    UnknownCategory(String),
}
