//! Execute queries against a JSON data file

use std::sync::Arc;

use super::{CliError, entity_to_json, json_to_value, load_data};
use crate::{
    DatabaseFamily, EntityRegistry, IdentityObserver, MetadataObserver, ObserverParser,
    ParserRegistry, StorageManager, Value,
};

/// Options for the check command
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// The query text
    pub query: String,
    /// Family whose parser runs the query
    pub family: DatabaseFamily,
    /// Data document loaded into an in-memory manager
    pub data: Option<String>,
    /// Entity metadata registry (JSON array)
    pub metadata: Option<String>,
    /// Parameter bindings
    pub bindings: Vec<(String, Value)>,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            query: String::new(),
            family: DatabaseFamily::Document,
            data: None,
            metadata: None,
            bindings: vec![],
            syntax_only: false,
        }
    }
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Query executed; entities as a JSON array
    Success(serde_json::Value),
}

/// Parse a `name=<json>` binding; a value that is not JSON is taken as a string
pub fn parse_binding(arg: &str) -> Result<(String, Value), CliError> {
    let (name, raw) = arg
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| CliError::InvalidBinding(arg.to_string()))?;

    let name = name.trim().trim_start_matches(['@', '?']).to_string();
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_to_value(json),
        Err(_) => Value::String(raw.to_string()),
    };
    Ok((name, value))
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let registry = ParserRegistry::with_defaults();
    let parser = registry.get(options.family)?;

    if options.syntax_only {
        parser.parse(&options.query)?;
        return Ok(CheckResult::SyntaxValid);
    }

    let manager = match &options.data {
        Some(json) => load_data(json)?,
        None => Default::default(),
    };
    let manager: Arc<dyn StorageManager> = Arc::new(manager);

    let observer: Arc<dyn ObserverParser> = match &options.metadata {
        Some(json) => Arc::new(MetadataObserver::new(Arc::new(EntityRegistry::from_json(json)?))),
        None => Arc::new(IdentityObserver),
    };

    let mut statement = parser.prepare(&options.query, manager, observer)?;
    for (name, value) in &options.bindings {
        statement.bind(name, value.clone())?;
    }

    let entities = statement.result_list()?;
    let output = entities.into_iter().map(entity_to_json).collect();
    Ok(CheckResult::Success(serde_json::Value::Array(output)))
}
