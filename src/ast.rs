//! # Abstract Syntax Tree
//!
//! This module defines the tree produced by the [parser](crate::parser) for the
//! small query language used to talk to key-value, column and document stores.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Literals, parameter references and `convert(...)` values
//! - **[operators]** - Comparison operators and sort directions
//! - **[condition]** - The boolean `where` tree
//! - **[query]** - One struct per operation kind, plus the [`Query`] union
//!
//! ## Query Kinds
//!
//! ```text
//! get "Diana", 12
//! delete @id
//! select name, age from Person where age > 10 and not name like "A%" order by age desc
//! update Person set age = 30 where name = "Ada"
//! insert Person (name = "Ada", age = 36)
//! ```
//!
//! ## Resolved Form
//!
//! Every node is generic over its operand type. The parser produces
//! `Query<QueryValue>`, where operands may still be parameters or pending
//! conversions. Binding and resolution rebuild the tree as `Query<Value>`
//! through a [`Rewriter`], which is what storage managers receive.
pub mod condition;
pub mod expressions;
pub mod operators;
pub mod query;
pub mod tokens;

pub use condition::{Condition, Where};
pub use expressions::{Literal, QueryValue};
pub use operators::{Direction, Operator};
pub use query::{
    DeleteQuery, GetQuery, InsertQuery, Query, QueryKind, Rewriter, SelectQuery, Sort,
    UpdateItem, UpdateQuery,
};
pub use tokens::{Keyword, Token, TokenCategory, TokenKind};
