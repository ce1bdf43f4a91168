//! Error types shared by every stage of the query pipeline.

use std::fmt;

use thiserror::Error;

/// Location of a token in the query text.
///
/// `offset` counts chars from the start of the input; `line` and `column`
/// are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while parsing, binding or executing a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Lexical or grammatical malformation of the query text.
    #[error("Syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },

    /// Semantic failure: unknown operation, unbound parameter, empty key list.
    #[error("Query error: {0}")]
    Query(String),

    /// Caller misuse, e.g. binding a parameter the query never declared.
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// A required argument was missing.
    #[error("{0} is required")]
    MissingArgument(&'static str),

    /// A `convert(...)` literal or a bound value could not be coerced.
    #[error("Cannot convert {value} to {type_name}")]
    Conversion { value: String, type_name: String },

    /// `single_result` found more than one entity.
    #[error("Expected a single result, found {0}")]
    NonUniqueResult(usize),

    /// Failure reported by a storage manager implementation.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl QueryError {
    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        QueryError::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        QueryError::Query(message.into())
    }

    pub fn conversion(value: impl fmt::Display, type_name: &str) -> Self {
        QueryError::Conversion {
            value: value.to_string(),
            type_name: type_name.to_string(),
        }
    }

    /// Position of the offending token for syntax errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            QueryError::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::syntax("unterminated string", Position::new(4, 1, 5));
        assert_eq!(
            err.to_string(),
            "Syntax error at line 1, column 5: unterminated string"
        );

        let err = QueryError::query("parameter @id is not bound");
        assert_eq!(err.to_string(), "Query error: parameter @id is not bound");

        let err = QueryError::MissingArgument("query");
        assert_eq!(err.to_string(), "query is required");

        let err = QueryError::conversion("\"abc\"", "java.lang.Long");
        assert_eq!(err.to_string(), "Cannot convert \"abc\" to java.lang.Long");
    }

    #[test]
    fn test_position_only_on_syntax_errors() {
        let pos = Position::new(0, 1, 1);
        assert_eq!(QueryError::syntax("x", pos).position(), Some(pos));
        assert_eq!(QueryError::query("x").position(), None);
    }
}
