//! Storage managers the executor issues resolved queries against.
//!
//! Implement [`StorageManager`] (and optionally [`StorageManagerAsync`]) to
//! run queries against a backend. Queries arrive fully resolved: parameters
//! substituted, conversions applied and field names mapped to native paths.

use crate::ast::{InsertQuery, SelectQuery, UpdateQuery};
use crate::error::QueryResult;
use crate::value::{Entity, Value};

/// Receives the single result of an asynchronous operation.
pub type Callback<T> = Box<dyn FnOnce(T) + Send>;

/// Synchronous storage operations.
pub trait StorageManager: Send + Sync {
    /// Entities stored under the given keys; missing keys are skipped.
    fn get(&self, keys: &[Value]) -> QueryResult<Vec<Entity>>;

    /// Removes the entities stored under the given keys.
    fn delete(&self, keys: &[Value]) -> QueryResult<()>;

    fn select(&self, query: &SelectQuery<Value>) -> QueryResult<Vec<Entity>>;

    /// Applies the `set` items and returns the updated entities.
    fn update(&self, query: &UpdateQuery<Value>) -> QueryResult<Vec<Entity>>;

    /// Stores a new entity and returns it.
    fn insert(&self, query: &InsertQuery<Value>) -> QueryResult<Vec<Entity>>;
}

/// Callback-based storage operations.
///
/// An `Err` means the operation could not be submitted; the callback is then
/// never invoked. Otherwise the callback runs exactly once, on whatever
/// thread the implementation chooses.
pub trait StorageManagerAsync: Send + Sync {
    fn get_async(&self, keys: &[Value], callback: Callback<Vec<Entity>>) -> QueryResult<()>;

    fn delete_async(&self, keys: &[Value], callback: Callback<()>) -> QueryResult<()>;

    fn select_async(
        &self,
        query: &SelectQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()>;

    fn update_async(
        &self,
        query: &UpdateQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()>;

    fn insert_async(
        &self,
        query: &InsertQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()>;
}
