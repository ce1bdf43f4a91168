pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod manager;
pub mod memory;
pub mod metadata;
pub mod observer;
pub mod params;
pub mod parser;
pub mod special;
pub mod value;

pub use ast::{Condition, Operator, Query, QueryKind, QueryValue, Token};
pub use convert::{DefaultConverter, ValueConverter};
pub use error::{Position, QueryError, QueryResult};
pub use executor::{DatabaseFamily, ParserRegistry, PreparedStatement, QueryParser};
pub use lexer::{Lexer, tokenize};
pub use manager::{Callback, StorageManager, StorageManagerAsync};
pub use memory::InMemoryManager;
pub use metadata::{EntityMetadata, EntityRegistry, FieldKind, FieldMetadata};
pub use observer::{FieldResolver, IdentityObserver, MetadataObserver, ObserverParser};
pub use params::{BindingState, Params};
pub use parser::{Parser, parse};
pub use special::{Argument, Limit, PageRequest, SpecialParameters};
pub use value::{Entity, Value};
