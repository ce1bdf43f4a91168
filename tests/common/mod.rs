// tests/common/mod.rs

#![allow(dead_code)]

use artemis_query::ast::{InsertQuery, SelectQuery, UpdateQuery};
use artemis_query::{
    Callback, Entity, QueryError, QueryResult, StorageManager, StorageManagerAsync, Value,
};
use parking_lot::Mutex;

/// An operation as the manager received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(Vec<Value>),
    Delete(Vec<Value>),
    Select(SelectQuery<Value>),
    Update(UpdateQuery<Value>),
    Insert(InsertQuery<Value>),
}

/// Records every operation and answers with canned entities.
#[derive(Debug, Default)]
pub struct RecordingManager {
    calls: Mutex<Vec<Call>>,
    results: Vec<Entity>,
    error: Option<QueryError>,
}

impl RecordingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn returning(results: Vec<Entity>) -> Self {
        RecordingManager {
            results,
            ..Default::default()
        }
    }

    pub fn failing(error: QueryError) -> Self {
        RecordingManager {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<Call> {
        self.calls.lock().last().cloned()
    }

    fn record(&self, call: Call) -> QueryResult<Vec<Entity>> {
        self.calls.lock().push(call);
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.results.clone()),
        }
    }
}

impl StorageManager for RecordingManager {
    fn get(&self, keys: &[Value]) -> QueryResult<Vec<Entity>> {
        self.record(Call::Get(keys.to_vec()))
    }

    fn delete(&self, keys: &[Value]) -> QueryResult<()> {
        self.record(Call::Delete(keys.to_vec())).map(|_| ())
    }

    fn select(&self, query: &SelectQuery<Value>) -> QueryResult<Vec<Entity>> {
        self.record(Call::Select(query.clone()))
    }

    fn update(&self, query: &UpdateQuery<Value>) -> QueryResult<Vec<Entity>> {
        self.record(Call::Update(query.clone()))
    }

    fn insert(&self, query: &InsertQuery<Value>) -> QueryResult<Vec<Entity>> {
        self.record(Call::Insert(query.clone()))
    }
}

impl StorageManagerAsync for RecordingManager {
    fn get_async(&self, keys: &[Value], callback: Callback<Vec<Entity>>) -> QueryResult<()> {
        callback(self.get(keys)?);
        Ok(())
    }

    fn delete_async(&self, keys: &[Value], callback: Callback<()>) -> QueryResult<()> {
        self.delete(keys)?;
        callback(());
        Ok(())
    }

    fn select_async(
        &self,
        query: &SelectQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.select(query)?);
        Ok(())
    }

    fn update_async(
        &self,
        query: &UpdateQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.update(query)?);
        Ok(())
    }

    fn insert_async(
        &self,
        query: &InsertQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.insert(query)?);
        Ok(())
    }
}

pub fn person(name: &str, age: i64) -> Entity {
    Entity::new("Person").with("name", name).with("age", age)
}
