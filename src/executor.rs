//! Executes query text against a storage manager.
//!
//! A [`QueryParser`] serves one [`DatabaseFamily`]. It parses, checks that
//! the operation is one the family supports, resolves the query through the
//! binder and an [`ObserverParser`], and issues it to a manager. Queries with
//! parameters must go through [`QueryParser::prepare`].
//!
//! `delete` always yields an empty collection, whatever the manager removed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::ast::{Query, QueryKind};
use crate::convert::{DefaultConverter, ValueConverter};
use crate::error::{QueryError, QueryResult};
use crate::manager::{Callback, StorageManager, StorageManagerAsync};
use crate::observer::ObserverParser;
use crate::params::{BindingState, Params};
use crate::parser;
use crate::special::SpecialParameters;
use crate::value::{Entity, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseFamily {
    KeyValue,
    Column,
    Document,
    Graph,
}

impl DatabaseFamily {
    pub const ALL: [DatabaseFamily; 4] = [
        DatabaseFamily::KeyValue,
        DatabaseFamily::Column,
        DatabaseFamily::Document,
        DatabaseFamily::Graph,
    ];

    /// Operations a family understands.
    pub fn allowed(&self) -> &'static [QueryKind] {
        match self {
            DatabaseFamily::KeyValue => &[QueryKind::Get, QueryKind::Delete],
            DatabaseFamily::Column | DatabaseFamily::Document => &[
                QueryKind::Select,
                QueryKind::Update,
                QueryKind::Insert,
                QueryKind::Delete,
            ],
            DatabaseFamily::Graph => &[QueryKind::Select],
        }
    }

    pub fn allows(&self, kind: QueryKind) -> bool {
        self.allowed().contains(&kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseFamily::KeyValue => "key-value",
            DatabaseFamily::Column => "column",
            DatabaseFamily::Document => "document",
            DatabaseFamily::Graph => "graph",
        }
    }
}

impl fmt::Display for DatabaseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseFamily {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "key-value" | "keyvalue" | "kv" => Ok(DatabaseFamily::KeyValue),
            "column" => Ok(DatabaseFamily::Column),
            "document" => Ok(DatabaseFamily::Document),
            "graph" => Ok(DatabaseFamily::Graph),
            other => Err(QueryError::IllegalArgument(format!(
                "Unknown database family '{}'",
                other
            ))),
        }
    }
}

/// Issues a resolved query. `delete` results are discarded.
pub fn execute<M>(manager: &M, query: &Query<Value>) -> QueryResult<Vec<Entity>>
where
    M: StorageManager + ?Sized,
{
    debug!(kind = query.kind().as_str(), "execute");
    match query {
        Query::Get(get) => manager.get(&get.keys),
        Query::Delete(delete) => {
            manager.delete(&delete.keys)?;
            Ok(vec![])
        }
        Query::Select(select) => manager.select(select),
        Query::Update(update) => manager.update(update),
        Query::Insert(insert) => manager.insert(insert),
    }
}

/// Submits a resolved query; the callback gets an empty collection for `delete`.
pub fn execute_async<M>(
    manager: &M,
    query: &Query<Value>,
    callback: Callback<Vec<Entity>>,
) -> QueryResult<()>
where
    M: StorageManagerAsync + ?Sized,
{
    debug!(kind = query.kind().as_str(), "execute async");
    match query {
        Query::Get(get) => manager.get_async(&get.keys, callback),
        Query::Delete(delete) => {
            manager.delete_async(&delete.keys, Box::new(move |()| callback(vec![])))
        }
        Query::Select(select) => manager.select_async(select, callback),
        Query::Update(update) => manager.update_async(update, callback),
        Query::Insert(insert) => manager.insert_async(insert, callback),
    }
}

/// Query entry point of one database family.
#[derive(Clone)]
pub struct QueryParser {
    family: DatabaseFamily,
    converter: Arc<dyn ValueConverter>,
}

impl fmt::Debug for QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParser")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl QueryParser {
    pub fn new(family: DatabaseFamily) -> Self {
        Self::with_converter(family, Arc::new(DefaultConverter))
    }

    pub fn with_converter(family: DatabaseFamily, converter: Arc<dyn ValueConverter>) -> Self {
        QueryParser { family, converter }
    }

    pub fn family(&self) -> DatabaseFamily {
        self.family
    }

    /// Parses and checks the operation against the family.
    pub fn parse(&self, text: &str) -> QueryResult<Query> {
        if text.trim().is_empty() {
            return Err(QueryError::MissingArgument("query"));
        }

        let query = parser::parse(text)?;
        if !self.family.allows(query.kind()) {
            return Err(QueryError::query(format!(
                "The operation '{}' is not supported by {} databases",
                query.kind().as_str(),
                self.family
            )));
        }
        Ok(query)
    }

    /// Parses a query without parameters and resolves it.
    fn resolve_immediate(
        &self,
        text: &str,
        observer: &dyn ObserverParser,
    ) -> QueryResult<Query<Value>> {
        let query = self.parse(text)?;
        let params = Params::of(&query);
        if !params.declared().is_empty() {
            return Err(QueryError::query(format!(
                "To run a query with parameters use prepare instead, parameters: {:?}",
                params.declared()
            )));
        }
        params.resolve(&query, observer, self.converter.as_ref())
    }

    /// Runs a query that has no parameters.
    pub fn query(
        &self,
        text: &str,
        manager: &dyn StorageManager,
        observer: &dyn ObserverParser,
    ) -> QueryResult<Vec<Entity>> {
        debug!(family = %self.family, query = text, "query");
        let resolved = self.resolve_immediate(text, observer)?;
        execute(manager, &resolved)
    }

    /// Submits a query that has no parameters. Parse and resolution errors
    /// are returned before anything reaches the manager.
    pub fn query_async(
        &self,
        text: &str,
        manager: &dyn StorageManagerAsync,
        observer: &dyn ObserverParser,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        debug!(family = %self.family, query = text, "query async");
        let resolved = self.resolve_immediate(text, observer)?;
        execute_async(manager, &resolved, callback)
    }

    /// Parses once for repeated bind/execute cycles.
    pub fn prepare<M: ?Sized>(
        &self,
        text: &str,
        manager: Arc<M>,
        observer: Arc<dyn ObserverParser>,
    ) -> QueryResult<PreparedStatement<M>> {
        let query = self.parse(text)?;
        let params = Params::of(&query);
        debug!(family = %self.family, query = text, parameters = ?params.declared(), "prepare");
        Ok(PreparedStatement {
            query: Arc::new(query),
            params,
            special: SpecialParameters::default(),
            manager,
            observer,
            converter: Arc::clone(&self.converter),
        })
    }
}

/// A parsed query awaiting bindings.
///
/// Every execution resolves the current bindings again and issues a new
/// operation; nothing is cached between executions.
pub struct PreparedStatement<M: ?Sized = dyn StorageManager> {
    query: Arc<Query>,
    params: Params,
    special: SpecialParameters,
    manager: Arc<M>,
    observer: Arc<dyn ObserverParser>,
    converter: Arc<dyn ValueConverter>,
}

impl<M: ?Sized> PreparedStatement<M> {
    /// Binds or rebinds a declared parameter.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> QueryResult<&mut Self> {
        self.params.bind(name, value.into())?;
        Ok(self)
    }

    /// Pagination and sorts folded into every `select` this statement runs.
    pub fn with_special(&mut self, special: SpecialParameters) -> &mut Self {
        self.special = special;
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn parameters(&self) -> &[String] {
        self.params.declared()
    }

    pub fn state(&self) -> BindingState {
        self.params.state()
    }

    fn resolve(&self) -> QueryResult<Query<Value>> {
        let mut resolved =
            self.params
                .resolve(&self.query, self.observer.as_ref(), self.converter.as_ref())?;
        if let (Query::Select(select), Query::Select(logical)) = (&mut resolved, &*self.query) {
            self.special.apply(select, self.observer.as_ref(), &logical.entity);
        }
        Ok(resolved)
    }
}

impl<M: StorageManager + ?Sized> PreparedStatement<M> {
    pub fn result_list(&self) -> QueryResult<Vec<Entity>> {
        let resolved = self.resolve()?;
        execute(self.manager.as_ref(), &resolved)
    }

    /// `None` when nothing matched; more than one result is an error.
    pub fn single_result(&self) -> QueryResult<Option<Entity>> {
        let mut entities = self.result_list()?;
        match entities.len() {
            0 => Ok(None),
            1 => Ok(entities.pop()),
            n => Err(QueryError::NonUniqueResult(n)),
        }
    }
}

impl<M: StorageManagerAsync + ?Sized> PreparedStatement<M> {
    pub fn result_list_async(&self, callback: Callback<Vec<Entity>>) -> QueryResult<()> {
        let resolved = self.resolve()?;
        execute_async(self.manager.as_ref(), &resolved, callback)
    }
}

/// Query parsers by database family.
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: HashMap<DatabaseFamily, Arc<QueryParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One parser with the default converter per family.
    pub fn with_defaults() -> Self {
        let mut registry = ParserRegistry::new();
        for family in DatabaseFamily::ALL {
            registry.register(QueryParser::new(family));
        }
        registry
    }

    /// Registers a parser, replacing any parser of the same family.
    pub fn register(&mut self, parser: QueryParser) {
        self.parsers.insert(parser.family(), Arc::new(parser));
    }

    pub fn get(&self, family: DatabaseFamily) -> QueryResult<Arc<QueryParser>> {
        self.parsers
            .get(&family)
            .cloned()
            .ok_or_else(|| QueryError::query(format!("No query parser registered for {}", family)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_restrictions() {
        assert!(DatabaseFamily::KeyValue.allows(QueryKind::Get));
        assert!(!DatabaseFamily::KeyValue.allows(QueryKind::Select));
        assert!(DatabaseFamily::Document.allows(QueryKind::Insert));
        assert!(!DatabaseFamily::Graph.allows(QueryKind::Delete));

        let err = QueryParser::new(DatabaseFamily::Graph)
            .parse("update Person set age = 1")
            .unwrap_err();
        assert!(matches!(err, QueryError::Query(_)));
    }

    #[test]
    fn test_empty_text_is_missing_argument() {
        let parser = QueryParser::new(DatabaseFamily::KeyValue);
        assert_eq!(parser.parse("   ").unwrap_err(), QueryError::MissingArgument("query"));
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("key-value".parse::<DatabaseFamily>().unwrap(), DatabaseFamily::KeyValue);
        assert_eq!("Document".parse::<DatabaseFamily>().unwrap(), DatabaseFamily::Document);
        assert!("relational".parse::<DatabaseFamily>().is_err());
    }

    #[test]
    fn test_registry() {
        let registry = ParserRegistry::with_defaults();
        assert_eq!(registry.get(DatabaseFamily::Column).unwrap().family(), DatabaseFamily::Column);
        assert!(ParserRegistry::new().get(DatabaseFamily::Graph).is_err());
    }
}
